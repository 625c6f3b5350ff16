/*!
 * Webin CLI Style System
 *
 * Styling utilities for console output: themed text, validation message
 * lists and the field catalogue tables.
 */

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use console::{style, StyledObject};
use webin_core_bundle::SubmissionBundle;
use webin_core_manifest::{FieldKind, FieldSchema, Severity, ValidationResult};

// ============================================================================
// THEME COLORS
// ============================================================================

/// Brand colors for consistent styling
pub struct Theme;

impl Theme {
    /// Primary accent color (cyan/blue)
    pub fn primary<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan()
    }

    /// Success color (green)
    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    /// Warning color (yellow)
    pub fn warning<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).yellow()
    }

    /// Error color (red)
    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red()
    }

    /// Muted/secondary text (dim)
    pub fn muted<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }

    /// Header style (bold cyan)
    pub fn header<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan().bold()
    }
}

// ============================================================================
// ICONS
// ============================================================================

/// Unicode icons for visual feedback
pub struct Icons;

impl Icons {
    pub const SUCCESS: &'static str = "✓";
    pub const ERROR: &'static str = "✗";
    pub const WARNING: &'static str = "⚠";
    pub const INFO: &'static str = "ℹ";
    pub const ARROW_RIGHT: &'static str = "→";
}

/// Draw a section header with a line
pub fn section_header(title: &str) {
    let line_len = 50 - title.len().min(40);
    println!(
        "\n{} {}",
        Theme::header(title),
        Theme::muted("─".repeat(line_len))
    );
}

// ============================================================================
// TABLES
// ============================================================================

/// Create a styled data table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Create a minimal table (no outer borders)
pub fn create_minimal_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_NO_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

/// Field catalogue of one context
pub fn field_table(schema: &FieldSchema) -> Table {
    let mut table = create_table();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Count"),
        header_cell("Synonyms"),
        header_cell("Description"),
    ]);

    for field in schema.fields() {
        let name = if field.is_required() {
            Cell::new(&field.name)
                .fg(Color::White)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(&field.name)
        };
        let kind = match field.kind {
            FieldKind::Meta => Cell::new(field.kind.as_str()),
            FieldKind::File => Cell::new(field.kind.as_str()).fg(Color::Magenta),
        };
        table.add_row(vec![
            name,
            kind,
            Cell::new(field.cardinality()),
            Cell::new(field.synonyms.join(", ")).fg(Color::DarkGrey),
            Cell::new(&field.description).fg(Color::DarkGrey),
        ]);
    }

    table
}

/// Legal data file combinations of one context
pub fn group_table(schema: &FieldSchema) -> Table {
    let mut table = create_table();
    table.set_header(vec![header_cell("File group"), header_cell("Files")]);

    for group in schema.groups() {
        table.add_row(vec![
            Cell::new(group.name().unwrap_or("-")),
            Cell::new(group.describe()),
        ]);
    }

    table
}

/// Key-value summary of a submission bundle
pub fn bundle_table(bundle: &SubmissionBundle) -> Table {
    let mut table = create_minimal_table();
    let mut rows = vec![
        ("Upload directory", bundle.upload_dir.clone()),
        ("Submit directory", bundle.submit_dir.display().to_string()),
        ("Manifest digest", bundle.manifest_digest.clone()),
    ];
    for file in &bundle.upload_files {
        let size = std::fs::metadata(&file.local_path)
            .map(|m| format_bytes(m.len()))
            .unwrap_or_else(|_| "?".to_string());
        rows.push(("Upload file", format!("{} ({})", file.remote_path, size)));
    }
    for document in &bundle.xml_documents {
        rows.push(("XML document", document.file_name.clone()));
    }

    for (key, value) in rows {
        table.add_row(vec![
            Cell::new(key).fg(Color::Cyan),
            Cell::new(value)
                .fg(Color::White)
                .add_attribute(Attribute::Bold),
        ]);
    }

    table
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Format bytes into human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let base = 1024.0_f64;
    let exp = (bytes_f.ln() / base.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);

    let value = bytes_f / base.powi(exp as i32);

    if exp == 0 {
        format!("{} {}", bytes, UNITS[exp])
    } else {
        format!("{:.2} {}", value, UNITS[exp])
    }
}

/// Print every validation message, errors in red
pub fn print_messages(validation: &ValidationResult) {
    for message in validation.messages() {
        let origin = if message.origin.is_empty() {
            String::new()
        } else {
            format!(" {}", Theme::muted(format!("[{}]", message.origin)))
        };
        match message.severity {
            Severity::Error => println!(
                "{} {}{}",
                Theme::error(Icons::ERROR),
                message.text,
                origin
            ),
            Severity::Info => println!(
                "{} {}{}",
                Theme::primary(Icons::INFO),
                message.text,
                origin
            ),
        }
    }
}

/// Print a styled error message with optional suggestion
pub fn print_error(message: &str, suggestion: Option<&str>) {
    eprintln!(
        "\n{} {}",
        Theme::error(format!("{} Error:", Icons::ERROR)),
        message
    );

    if let Some(hint) = suggestion {
        eprintln!(
            "  {} {}",
            Theme::muted(Icons::ARROW_RIGHT),
            Theme::muted(hint)
        );
    }
    eprintln!();
}

/// Print a styled warning message
pub fn print_warning(message: &str) {
    eprintln!(
        "{} {}",
        Theme::warning(Icons::WARNING.to_string()),
        Theme::warning(message)
    );
}

/// Print a styled success message
pub fn print_success(message: &str) {
    println!(
        "{} {}",
        Theme::success(Icons::SUCCESS.to_string()),
        Theme::success(message)
    );
}

/// Print a styled info message
pub fn print_info(message: &str) {
    println!("{} {}", Theme::primary(Icons::INFO.to_string()), message);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextType;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
    }

    #[test]
    fn test_field_table_lists_every_field() {
        let schema = ContextType::Reads.schema().unwrap();
        let table = field_table(&schema);
        assert_eq!(table.row_iter().count(), schema.len());
        assert!(table.to_string().contains("INSTRUMENT"));
    }

    #[test]
    fn test_group_table() {
        let schema = ContextType::Genome.schema().unwrap();
        let rendered = group_table(&schema).to_string();
        assert!(rendered.contains("Chromosomes in a flat file"));
    }

    #[test]
    fn test_bundle_table() {
        let bundle = SubmissionBundle::new("abc", "/tmp/submit", "webin-cli/reads/run1");
        let rendered = bundle_table(&bundle).to_string();
        assert!(rendered.contains("webin-cli/reads/run1"));
    }
}

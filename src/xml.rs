/*!
 * XML document assembly
 *
 * Documents are built with a small escaping writer so that the same manifest
 * always produces byte-identical XML: no timestamps, attributes in a fixed
 * order, two-space indentation.
 */

use crate::context::{reads, vocabulary, ContextType};
use crate::manifest::{FileType, Manifest};
use std::fmt::Write as _;
use webin_core_bundle::UploadFile;

/// Checksum method recorded for every file
pub const CHECKSUM_METHOD: &str = "SHA-256";

/// Escape text or attribute content
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Minimal indenting XML writer
#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
    open: Vec<String>,
}

impl XmlWriter {
    pub fn new() -> Self {
        let mut writer = Self::default();
        writer.out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        writer
    }

    fn indent(&mut self) {
        for _ in 0..self.open.len() {
            self.out.push_str("  ");
        }
    }

    fn start_tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.indent();
        let _ = write!(self.out, "<{}", name);
        for (key, value) in attrs {
            let _ = write!(self.out, " {}=\"{}\"", key, escape(value));
        }
    }

    /// Open an element that will hold children
    pub fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.start_tag(name, attrs);
        self.out.push_str(">\n");
        self.open.push(name.to_string());
        self
    }

    /// Close the innermost open element
    pub fn close(&mut self) -> &mut Self {
        if let Some(name) = self.open.pop() {
            self.indent();
            let _ = writeln!(self.out, "</{}>", name);
        }
        self
    }

    /// Element with text content
    pub fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.start_tag(name, &[]);
        let _ = writeln!(self.out, ">{}</{}>", escape(value), name);
        self
    }

    /// Element with text content, skipped when there is no value
    pub fn optional_text(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.text(name, value);
        }
        self
    }

    /// Element without content
    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.start_tag(name, attrs);
        self.out.push_str("/>\n");
        self
    }

    /// Close any open elements and return the document
    pub fn finish(mut self) -> String {
        while !self.open.is_empty() {
            self.close();
        }
        self.out
    }
}

/// Values shared by every document of one submission
#[derive(Debug, Clone)]
pub struct XmlOptions {
    /// Object alias, unique within the submission account
    pub alias: String,

    pub center_name: Option<String>,
}

/// A data file as listed in a document
#[derive(Debug, Clone, Copy)]
pub struct XmlFile<'a> {
    pub file_type: FileType,
    pub upload: &'a UploadFile,
}

/// Build every document for the manifest's context, in submission order
pub fn documents(
    manifest: &Manifest,
    files: &[XmlFile<'_>],
    options: &XmlOptions,
) -> Vec<(&'static str, String)> {
    match manifest.context {
        ContextType::Reads => vec![
            ("EXPERIMENT", experiment(manifest, options)),
            ("RUN", run(manifest, files, options)),
        ],
        _ => vec![("ANALYSIS", analysis(manifest, files, options))],
    }
}

fn object_attrs<'a>(options: &'a XmlOptions) -> Vec<(&'static str, &'a str)> {
    let mut attrs = vec![("alias", options.alias.as_str())];
    if let Some(center) = options.center_name.as_deref() {
        attrs.push(("center_name", center));
    }
    attrs
}

fn write_files(writer: &mut XmlWriter, files: &[XmlFile<'_>]) {
    writer.open("FILES", &[]);
    for file in files {
        writer.empty(
            "FILE",
            &[
                ("filename", file.upload.remote_path.as_str()),
                ("filetype", file.file_type.xml_name()),
                ("checksum_method", CHECKSUM_METHOD),
                ("checksum", file.upload.digest.as_str()),
            ],
        );
    }
    writer.close();
}

fn write_attributes(writer: &mut XmlWriter, element: &str, manifest: &Manifest) {
    let Some(tool) = manifest.submission_tool.as_ref() else {
        return;
    };
    let set = format!("{}_ATTRIBUTES", element);
    let item = format!("{}_ATTRIBUTE", element);
    writer.open(&set, &[]);
    writer.open(&item, &[]);
    writer.text("TAG", "SUBMISSION_TOOL").text("VALUE", &tool.name);
    writer.close();
    if let Some(version) = tool.version.as_deref() {
        writer.open(&item, &[]);
        writer.text("TAG", "SUBMISSION_TOOL_VERSION").text("VALUE", version);
        writer.close();
    }
    writer.close();
}

/// ANALYSIS document for the assembly and sequence contexts
pub fn analysis(manifest: &Manifest, files: &[XmlFile<'_>], options: &XmlOptions) -> String {
    let mut writer = XmlWriter::new();
    writer.open("ANALYSIS_SET", &[]);
    writer.open("ANALYSIS", &object_attrs(options));
    writer.text(
        "TITLE",
        &format!("{}: {}", manifest.context.title(), manifest.name),
    );
    writer.optional_text("DESCRIPTION", manifest.description.as_deref());

    if let Some(study) = manifest.study.as_ref() {
        writer.empty("STUDY_REF", &[("accession", study.project_id.as_str())]);
    }
    if let Some(sample) = manifest.sample.as_ref() {
        writer.empty("SAMPLE_REF", &[("accession", sample.biosample_id.as_str())]);
    }
    for run in &manifest.runs {
        writer.empty("RUN_REF", &[("accession", run.run_id.as_str())]);
    }
    for analysis in &manifest.analyses {
        writer.empty("ANALYSIS_REF", &[("accession", analysis.analysis_id.as_str())]);
    }

    writer.open("ANALYSIS_TYPE", &[]);
    match manifest.context {
        ContextType::Sequence => {
            writer.empty("SEQUENCE_FLATFILE", &[]);
        }
        context => {
            let element = if context == ContextType::Transcriptome {
                "TRANSCRIPTOME_ASSEMBLY"
            } else {
                "SEQUENCE_ASSEMBLY"
            };
            writer.open(element, &[]);
            writer.text("NAME", &manifest.name);
            writer.optional_text("TYPE", manifest.attribute("ASSEMBLY_TYPE"));
            writer.text("PARTIAL", "false");
            writer.optional_text("COVERAGE", manifest.attribute("COVERAGE"));
            writer.optional_text("PROGRAM", manifest.attribute("PROGRAM"));
            writer.optional_text("PLATFORM", manifest.attribute("PLATFORM"));
            writer.optional_text("MIN_GAP_LENGTH", manifest.attribute("MINGAPLENGTH"));
            writer.optional_text("MOL_TYPE", manifest.attribute("MOLECULETYPE"));
            if manifest.attribute("TPA") == Some("yes") {
                writer.text("TPA", "true");
            }
            writer.optional_text("AUTHORS", manifest.authors.as_deref());
            writer.optional_text("ADDRESS", manifest.address.as_deref());
            writer.close();
        }
    }
    writer.close();

    write_files(&mut writer, files);
    write_attributes(&mut writer, "ANALYSIS", manifest);
    writer.finish()
}

/// EXPERIMENT document for the reads context
pub fn experiment(manifest: &Manifest, options: &XmlOptions) -> String {
    let mut writer = XmlWriter::new();
    writer.open("EXPERIMENT_SET", &[]);
    writer.open("EXPERIMENT", &object_attrs(options));
    writer.text(
        "TITLE",
        &format!("{}: {}", manifest.context.title(), manifest.name),
    );
    if let Some(study) = manifest.study.as_ref() {
        writer.empty("STUDY_REF", &[("accession", study.study_id.as_str())]);
    }

    writer.open("DESIGN", &[]);
    writer.text(
        "DESIGN_DESCRIPTION",
        manifest.description.as_deref().unwrap_or("unspecified"),
    );
    if let Some(sample) = manifest.sample.as_ref() {
        writer.empty("SAMPLE_DESCRIPTOR", &[("accession", sample.biosample_id.as_str())]);
    }
    writer.open("LIBRARY_DESCRIPTOR", &[]);
    writer.optional_text("LIBRARY_NAME", manifest.attribute("LIBRARY_NAME"));
    writer.optional_text("LIBRARY_STRATEGY", manifest.attribute("LIBRARY_STRATEGY"));
    writer.optional_text("LIBRARY_SOURCE", manifest.attribute("LIBRARY_SOURCE"));
    writer.optional_text("LIBRARY_SELECTION", manifest.attribute("LIBRARY_SELECTION"));
    writer.open("LIBRARY_LAYOUT", &[]);
    if reads::is_paired(manifest) {
        match manifest.attribute("INSERT_SIZE") {
            Some(size) => writer.empty("PAIRED", &[("NOMINAL_LENGTH", size)]),
            None => writer.empty("PAIRED", &[]),
        };
    } else {
        writer.empty("SINGLE", &[]);
    }
    writer.close();
    writer.optional_text(
        "LIBRARY_CONSTRUCTION_PROTOCOL",
        manifest.attribute("LIBRARY_CONSTRUCTION_PROTOCOL"),
    );
    writer.close();
    writer.close();

    // Used as an element name, so only vocabulary values are written
    let platform = manifest
        .attribute("PLATFORM")
        .filter(|platform| vocabulary::PLATFORMS.contains(platform))
        .unwrap_or("UNSPECIFIED");
    writer.open("PLATFORM", &[]);
    writer.open(platform, &[]);
    writer.optional_text("INSTRUMENT_MODEL", manifest.attribute("INSTRUMENT"));
    writer.close();
    writer.close();

    write_attributes(&mut writer, "EXPERIMENT", manifest);
    writer.finish()
}

/// RUN document for the reads context
pub fn run(manifest: &Manifest, files: &[XmlFile<'_>], options: &XmlOptions) -> String {
    let mut writer = XmlWriter::new();
    writer.open("RUN_SET", &[]);
    writer.open("RUN", &object_attrs(options));
    writer.text(
        "TITLE",
        &format!("{}: {}", manifest.context.title(), manifest.name),
    );
    writer.empty("EXPERIMENT_REF", &[("refname", options.alias.as_str())]);
    writer.open("DATA_BLOCK", &[]);
    write_files(&mut writer, files);
    writer.close();
    write_attributes(&mut writer, "RUN", manifest);
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::SubmissionTool;
    use std::path::PathBuf;
    use webin_core_manifest::{Run, Sample, Study};

    fn manifest(context: ContextType) -> Manifest {
        Manifest {
            context,
            name: "asm <1>".to_string(),
            description: Some("A & B".to_string()),
            authors: None,
            address: None,
            study: Some(Study {
                study_id: "SRP000392".to_string(),
                project_id: "PRJNA28545".to_string(),
                locus_tags: vec![],
            }),
            sample: Some(Sample {
                sample_id: "ERS000001".to_string(),
                biosample_id: "SAMEA0000001".to_string(),
                organism: None,
                tax_id: None,
            }),
            runs: vec![Run {
                run_id: "ERR000001".to_string(),
                name: None,
            }],
            analyses: vec![],
            files: vec![],
            attributes: vec![
                ("COVERAGE".to_string(), "30".to_string()),
                ("PROGRAM".to_string(), "spades".to_string()),
                ("PLATFORM".to_string(), "ILLUMINA".to_string()),
            ],
            submission_tool: Some(SubmissionTool {
                name: "webin".to_string(),
                version: Some("1.0".to_string()),
            }),
            ignore_errors: false,
        }
    }

    fn upload() -> UploadFile {
        UploadFile {
            local_path: PathBuf::from("/data/asm.fasta.gz"),
            remote_path: "webin-cli/genome/asm/asm.fasta.gz".to_string(),
            digest: "ab".repeat(32),
        }
    }

    fn options() -> XmlOptions {
        XmlOptions {
            alias: "webin-genome-asm".to_string(),
            center_name: Some("EBI".to_string()),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
    }

    #[test]
    fn test_writer_nesting() {
        let mut writer = XmlWriter::new();
        writer.open("A", &[("x", "1")]).text("B", "t").empty("C", &[]);
        let xml = writer.finish();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<A x=\"1\">\n  <B>t</B>\n  <C/>\n</A>\n"
        );
    }

    #[test]
    fn test_analysis_document() {
        let upload = upload();
        let files = [XmlFile {
            file_type: FileType::Fasta,
            upload: &upload,
        }];
        let xml = analysis(&manifest(ContextType::Genome), &files, &options());

        assert!(xml.contains("<ANALYSIS alias=\"webin-genome-asm\" center_name=\"EBI\">"));
        assert!(xml.contains("<TITLE>Genome assembly: asm &lt;1&gt;</TITLE>"));
        assert!(xml.contains("<DESCRIPTION>A &amp; B</DESCRIPTION>"));
        assert!(xml.contains("<STUDY_REF accession=\"PRJNA28545\"/>"));
        assert!(xml.contains("<SAMPLE_REF accession=\"SAMEA0000001\"/>"));
        assert!(xml.contains("<RUN_REF accession=\"ERR000001\"/>"));
        assert!(xml.contains("<SEQUENCE_ASSEMBLY>"));
        assert!(xml.contains("<COVERAGE>30</COVERAGE>"));
        assert!(xml.contains("checksum_method=\"SHA-256\""));
        assert!(xml.contains("filetype=\"fasta\""));
        assert!(xml.contains("<VALUE>1.0</VALUE>"));
        assert!(xml.ends_with("</ANALYSIS_SET>\n"));
    }

    #[test]
    fn test_documents_are_deterministic() {
        let upload = upload();
        let files = [XmlFile {
            file_type: FileType::Fasta,
            upload: &upload,
        }];
        let manifest = manifest(ContextType::Transcriptome);
        let first = documents(&manifest, &files, &options());
        let second = documents(&manifest, &files, &options());
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert!(first[0].1.contains("<TRANSCRIPTOME_ASSEMBLY>"));
    }

    #[test]
    fn test_reads_documents() {
        let upload = upload();
        let files = [XmlFile {
            file_type: FileType::Fastq,
            upload: &upload,
        }];
        let mut manifest = manifest(ContextType::Reads);
        manifest.set_attribute("INSTRUMENT", "Illumina MiSeq");
        manifest.set_attribute("INSERT_SIZE", "300");

        let docs = documents(&manifest, &files, &options());
        assert_eq!(docs.iter().map(|(t, _)| *t).collect::<Vec<_>>(), vec!["EXPERIMENT", "RUN"]);

        let experiment = &docs[0].1;
        assert!(experiment.contains("<STUDY_REF accession=\"SRP000392\"/>"));
        assert!(experiment.contains("<PAIRED NOMINAL_LENGTH=\"300\"/>"));
        assert!(experiment.contains("<INSTRUMENT_MODEL>Illumina MiSeq</INSTRUMENT_MODEL>"));

        let run = &docs[1].1;
        assert!(run.contains("<EXPERIMENT_REF refname=\"webin-genome-asm\"/>"));
        assert!(run.contains("filetype=\"fastq\""));
    }

    #[test]
    fn test_unknown_platform_is_not_an_element_name() {
        let mut manifest = manifest(ContextType::Reads);
        manifest.set_attribute("PLATFORM", "foo bar");
        let experiment = experiment(&manifest, &options());
        assert!(experiment.contains("<PLATFORM>\n      <UNSPECIFIED>"));
        assert!(!experiment.contains("foo bar"));

        manifest.set_attribute("PLATFORM", "PACBIO_SMRT");
        assert!(super::experiment(&manifest, &options()).contains("<PACBIO_SMRT>"));
    }
}

//! File group matching
//!
//! A submission may accept several alternative combinations of data files.
//! Each [`FileGroup`] is one such recipe; groups are alternatives and the
//! first group (in declaration order) satisfied by the provided files wins.

use std::collections::BTreeSet;

/// Member of a file group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroupMember {
    /// Canonical file field name
    pub field: String,

    /// Whether the field must have at least one file
    pub required: bool,
}

/// One legal combination of file fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileGroup {
    name: Option<String>,
    members: Vec<FileGroupMember>,
}

impl FileGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group with a human-readable name
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            name: Some(name.into()),
            members: Vec::new(),
        }
    }

    /// Add a required member
    pub fn required<S: Into<String>>(mut self, field: S) -> Self {
        self.members.push(FileGroupMember {
            field: field.into().to_ascii_uppercase(),
            required: true,
        });
        self
    }

    /// Add an optional member
    pub fn optional<S: Into<String>>(mut self, field: S) -> Self {
        self.members.push(FileGroupMember {
            field: field.into().to_ascii_uppercase(),
            required: false,
        });
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn members(&self) -> &[FileGroupMember] {
        &self.members
    }

    /// Whether the field is a member of this group
    pub fn contains(&self, field: &str) -> bool {
        self.members.iter().any(|m| m.field == field)
    }

    /// Required members in declaration order
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(|m| m.required)
            .map(|m| m.field.as_str())
    }

    /// Every required member is present and no present field is outside the group
    pub fn is_satisfied_by(&self, present: &BTreeSet<String>) -> bool {
        self.required_fields().all(|f| present.contains(f))
            && present.iter().all(|f| self.contains(f))
    }

    /// Member list, e.g. "FASTA, AGP (optional)"
    pub fn describe(&self) -> String {
        self.members
            .iter()
            .map(|m| {
                if m.required {
                    m.field.clone()
                } else {
                    format!("{} (optional)", m.field)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Find the first group satisfied by the present file fields
pub fn match_file_groups<'a>(
    groups: &'a [FileGroup],
    present: &BTreeSet<String>,
) -> Option<(usize, &'a FileGroup)> {
    groups
        .iter()
        .enumerate()
        .find(|(_, group)| group.is_satisfied_by(present))
}

/// Error text for a file set matching no group, listing every legal group
pub fn mismatch_message(groups: &[FileGroup], present: &BTreeSet<String>) -> String {
    let provided = if present.is_empty() {
        "No data files were provided".to_string()
    } else {
        format!(
            "Invalid set of data files: {}",
            present.iter().cloned().collect::<Vec<_>>().join(", ")
        )
    };
    let valid = groups
        .iter()
        .map(|g| format!("[{}]", g.describe()))
        .collect::<Vec<_>>()
        .join("; ");
    format!("{}. Valid file groups are: {}", provided, valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(fields: &[&str]) -> BTreeSet<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn genome_groups() -> Vec<FileGroup> {
        vec![
            FileGroup::named("Sequences in a fasta file")
                .required("FASTA")
                .optional("AGP"),
            FileGroup::named("Sequences in a fasta file with a chromosome list")
                .required("FASTA")
                .required("CHROMOSOME_LIST")
                .optional("UNLOCALISED_LIST")
                .optional("AGP"),
            FileGroup::named("Sequences in a flat file").required("FLATFILE"),
        ]
    }

    #[test]
    fn test_first_satisfied_group_is_selected() {
        let groups = genome_groups();
        let (index, _) = match_file_groups(&groups, &present(&["FASTA"])).unwrap();
        assert_eq!(index, 0);

        let (index, _) =
            match_file_groups(&groups, &present(&["FASTA", "CHROMOSOME_LIST"])).unwrap();
        assert_eq!(index, 1);

        let (index, _) = match_file_groups(&groups, &present(&["FLATFILE"])).unwrap();
        assert_eq!(index, 2);
    }

    #[test]
    fn test_stray_file_field_fails_group() {
        let groups = vec![
            FileGroup::new().required("FASTA").optional("AGP"),
            FileGroup::new().required("FLATFILE"),
        ];
        assert!(match_file_groups(&groups, &present(&["FASTA", "FLATFILE"])).is_none());
    }

    #[test]
    fn test_missing_required_member_fails_group() {
        let groups = vec![FileGroup::new().required("FASTA").required("CHROMOSOME_LIST")];
        assert!(match_file_groups(&groups, &present(&["FASTA"])).is_none());
        assert!(match_file_groups(&groups, &present(&[])).is_none());
    }

    #[test]
    fn test_mismatch_lists_each_group_required_member_once() {
        let groups = genome_groups();
        let message = mismatch_message(&groups, &present(&["FASTA", "FLATFILE"]));
        assert!(message.starts_with("Invalid set of data files: FASTA, FLATFILE."));
        for group in &groups {
            assert_eq!(message.matches(&format!("[{}]", group.describe())).count(), 1);
        }
        assert!(message.contains("[FLATFILE]"));
    }

    #[test]
    fn test_mismatch_without_files() {
        let groups = vec![FileGroup::new().required("TAB")];
        let message = mismatch_message(&groups, &present(&[]));
        assert!(message.starts_with("No data files were provided."));
        assert!(message.contains("[TAB]"));
    }

    #[test]
    fn test_describe() {
        let group = FileGroup::new().required("fasta").optional("agp");
        assert_eq!(group.describe(), "FASTA, AGP (optional)");
        assert_eq!(group.required_fields().collect::<Vec<_>>(), vec!["FASTA"]);
    }
}

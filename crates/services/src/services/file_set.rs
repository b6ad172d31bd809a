//! File records and the template/generated merge step.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One file of a generated project: a relative POSIX path plus raw content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Merge generated files over the project template. A generated file replaces
/// the template file with the same path in place, keeping the template's
/// position; new paths are appended. Overriding is silent by design.
pub fn merge_project_files(
    template_files: Vec<FileRecord>,
    generated_files: Vec<FileRecord>,
) -> Vec<FileRecord> {
    let mut merged = template_files;
    for generated in generated_files {
        if let Some(existing) = merged.iter_mut().find(|f| f.path == generated.path) {
            *existing = generated;
        } else {
            merged.push(generated);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn record(path: &str, content: &str) -> FileRecord {
        FileRecord::new(path, content)
    }

    #[test]
    fn override_wins_and_keeps_position() {
        let template = vec![
            record("pubspec.yaml", "template pubspec"),
            record("lib/main.dart", "template main"),
            record("README.md", "template readme"),
        ];
        let generated = vec![
            record("lib/main.dart", "generated main"),
            record("lib/screens/home.dart", "home screen"),
        ];

        let merged = merge_project_files(template, generated);

        assert_eq!(merged.len(), 4);
        assert_eq!(merged[1].path, "lib/main.dart");
        assert_eq!(merged[1].content, "generated main");
        assert_eq!(merged[3].path, "lib/screens/home.dart");
    }

    #[test]
    fn merged_paths_are_distinct_union() {
        let template = vec![record("a", "1"), record("b", "2")];
        let generated = vec![record("b", "3"), record("c", "4"), record("c", "5")];

        let merged = merge_project_files(template, generated);

        let paths: HashSet<_> = merged.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths.len(), merged.len());
        assert_eq!(paths, HashSet::from(["a", "b", "c"]));
        // last write wins, even within the generated set
        assert_eq!(
            merged.iter().find(|f| f.path == "c").unwrap().content,
            "5"
        );
    }

    #[test]
    fn empty_overrides_leave_base_untouched() {
        let template = vec![record("a", "1"), record("b", "2")];
        let merged = merge_project_files(template.clone(), vec![]);
        assert_eq!(merged, template);
    }
}

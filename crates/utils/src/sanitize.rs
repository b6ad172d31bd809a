//! Sanitization of user-supplied project names, ids, and file paths.

use std::path::{Component, Path};

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("absolute paths not allowed: {0}")]
    Absolute(String),
    #[error("path traversal attempt detected: {0}")]
    Traversal(String),
    #[error("empty path")]
    Empty,
}

/// Reduce a user-supplied project name to `[a-z0-9_-]`, collapsing runs of
/// underscores, capping at 50 characters and trimming underscores at both
/// ends. An empty result falls back to `flutter_project`.
pub fn sanitize_project_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        let c = match c {
            'a'..='z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        };
        if c == '_' && sanitized.ends_with('_') {
            continue;
        }
        sanitized.push(c);
    }
    let capped: String = sanitized.chars().take(50).collect();
    let trimmed = capped.trim_matches('_');
    if trimmed.is_empty() {
        "flutter_project".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Project ids are directory names under the public hosting root, so anything
/// outside `[A-Za-z0-9_-]` is rejected before it ever reaches the filesystem.
pub fn is_valid_project_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Normalize a relative file path, resolving `.` and `..` components
/// lexically. Fails on absolute paths and on any path that would escape its
/// base directory. Returns the normalized `/`-separated path.
pub fn normalize_relative(path: &str) -> Result<String, PathError> {
    if path.trim().is_empty() {
        return Err(PathError::Empty);
    }
    let slashed = path.replace('\\', "/");
    if slashed.starts_with('/') || slashed.as_bytes().get(1) == Some(&b':') {
        return Err(PathError::Absolute(path.to_string()));
    }

    let mut parts: Vec<&str> = Vec::new();
    for component in Path::new(&slashed).components() {
        match component {
            Component::Normal(seg) => {
                if let Some(seg) = seg.to_str() {
                    parts.push(seg);
                }
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(PathError::Traversal(path.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(PathError::Absolute(path.to_string()));
            }
        }
    }

    if parts.is_empty() {
        return Err(PathError::Empty);
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_symbols_and_case() {
        assert_eq!(sanitize_project_name("My App!!"), "my_app");
        assert_eq!(sanitize_project_name("Cat Tracker"), "cat_tracker");
        assert_eq!(sanitize_project_name("  weird--name__ "), "weird--name");
    }

    #[test]
    fn sanitize_is_deterministic() {
        assert_eq!(
            sanitize_project_name("My App!!"),
            sanitize_project_name("My App!!")
        );
    }

    #[test]
    fn sanitize_empty_falls_back() {
        assert_eq!(sanitize_project_name(""), "flutter_project");
        assert_eq!(sanitize_project_name("!!!"), "flutter_project");
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "a".repeat(200);
        assert_eq!(sanitize_project_name(&long).len(), 50);
    }

    #[test]
    fn project_id_charset() {
        assert!(is_valid_project_id("my_app_1755000000000"));
        assert!(!is_valid_project_id("../escape"));
        assert!(!is_valid_project_id("a/b"));
        assert!(!is_valid_project_id(""));
    }

    #[test]
    fn normalize_resolves_dot_segments() {
        assert_eq!(normalize_relative("lib/./main.dart").unwrap(), "lib/main.dart");
        assert_eq!(normalize_relative("lib/../lib/app.dart").unwrap(), "lib/app.dart");
    }

    #[test]
    fn normalize_rejects_traversal() {
        assert_eq!(
            normalize_relative("../../etc/passwd"),
            Err(PathError::Traversal("../../etc/passwd".to_string()))
        );
        assert!(matches!(
            normalize_relative("lib/../../x"),
            Err(PathError::Traversal(_))
        ));
        assert!(matches!(
            normalize_relative("..\\..\\windows"),
            Err(PathError::Traversal(_))
        ));
    }

    #[test]
    fn normalize_rejects_absolute() {
        assert!(matches!(
            normalize_relative("/etc/passwd"),
            Err(PathError::Absolute(_))
        ));
        assert!(matches!(
            normalize_relative("C:\\windows\\system32"),
            Err(PathError::Absolute(_))
        ));
    }

    #[test]
    fn normalize_rejects_empty() {
        assert_eq!(normalize_relative(""), Err(PathError::Empty));
        assert_eq!(normalize_relative("./."), Err(PathError::Empty));
    }
}

//! Canonical file names.
//!
//! Everything that becomes a path inside the store goes through this module. A
//! stored name is a single path component: never empty, never `.` or `..`, free of
//! separators and control characters, and lowercase.

use crate::traits::{StorageError, StorageResult};

/// Longest stored name accepted, in bytes.
pub const MAX_FILENAME_LENGTH: usize = 255;

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Whether `name` can only refer to an entry directly inside the store directory.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name.len() <= MAX_FILENAME_LENGTH
        && !name.chars().any(|c| is_separator(c) || c.is_control())
}

/// Derive the canonical stored name from a client-declared filename.
///
/// Directory parts are dropped (both `/` and `\` count as separators) and the
/// remaining component is lowercased. Names that still cannot live inside the
/// store are rejected.
pub fn canonical_name(declared: &str) -> StorageResult<String> {
    let last = declared.rsplit(is_separator).next().unwrap_or_default();
    let name = last.to_lowercase();

    if !is_plain_name(&name) {
        return Err(StorageError::InvalidFilename(format!(
            "'{}' does not name a file",
            declared.escape_debug()
        )));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_lowercases() {
        assert_eq!(canonical_name("Cat.PNG").unwrap(), "cat.png");
        assert_eq!(canonical_name("no-extension").unwrap(), "no-extension");
    }

    #[test]
    fn canonical_name_strips_directories() {
        assert_eq!(canonical_name("../evil.png").unwrap(), "evil.png");
        assert_eq!(canonical_name("a/b/Skin.png").unwrap(), "skin.png");
        assert_eq!(canonical_name("..\\..\\win.jpg").unwrap(), "win.jpg");
        assert_eq!(canonical_name("/etc/passwd").unwrap(), "passwd");
    }

    #[test]
    fn canonical_name_rejects_non_files() {
        for bad in ["", ".", "..", "dir/", "a/..", "bad\u{0}name.png", "tab\tname.png"] {
            assert!(
                matches!(canonical_name(bad), Err(StorageError::InvalidFilename(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
        let long = format!("{}.png", "a".repeat(MAX_FILENAME_LENGTH));
        assert!(canonical_name(&long).is_err());
    }

    #[test]
    fn canonical_name_keeps_inner_dots() {
        assert_eq!(canonical_name("my..skin.png").unwrap(), "my..skin.png");
        assert_eq!(canonical_name(".hidden.png").unwrap(), ".hidden.png");
    }

    #[test]
    fn plain_name_checks() {
        assert!(is_plain_name("cat"));
        assert!(is_plain_name("Cat.png"));
        assert!(!is_plain_name("../cat"));
        assert!(!is_plain_name("a\\b"));
        assert!(!is_plain_name(".."));
    }
}

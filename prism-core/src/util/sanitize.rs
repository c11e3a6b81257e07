use crate::error::{PrismError, Result};

/// Reduce a client-supplied file name to a safe storage key.
///
/// Any directory component is dropped (both separator styles), every
/// character outside `[A-Za-z0-9._-]` becomes `_`, and empty or dot-only
/// results are refused since they would name directory entries.
pub fn clean_file_name(raw: &str) -> Result<String> {
    let base = raw
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return Err(PrismError::InvalidInput(format!(
            "unusable file name: {raw:?}"
        )));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_passes_through() {
        assert_eq!(clean_file_name("photo.png").unwrap(), "photo.png");
        assert_eq!(clean_file_name("a-b_c.1.jpg").unwrap(), "a-b_c.1.jpg");
    }

    #[test]
    fn traversal_reduces_to_bare_name() {
        assert_eq!(clean_file_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(clean_file_name("/var/www/x.png").unwrap(), "x.png");
        assert_eq!(clean_file_name("..\\..\\boot.ini").unwrap(), "boot.ini");
        assert_eq!(clean_file_name("trailing/slash/").unwrap(), "slash");
    }

    #[test]
    fn disallowed_characters_become_underscores() {
        assert_eq!(
            clean_file_name("my photo (1).png").unwrap(),
            "my_photo__1_.png"
        );
        assert_eq!(clean_file_name("naïve.gif").unwrap(), "na_ve.gif");
    }

    #[test]
    fn empty_and_dot_only_names_are_rejected() {
        assert!(clean_file_name("").is_err());
        assert!(clean_file_name("/").is_err());
        assert!(clean_file_name("..").is_err());
        assert!(clean_file_name("a/..").is_err());
        assert!(clean_file_name("...").is_err());
    }
}

//! Internal helpers for text normalization.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{LedgerError, ResultLedger};

/// Trim a display name and collapse inner whitespace runs to one space.
pub(crate) fn normalize_display_name(value: &str, label: &str) -> ResultLedger<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(LedgerError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(collapsed)
}

/// Comparison key for names: NFKD, combining marks stripped, lowercase
/// alphanumerics, any other run collapsed to a single space.
///
/// `"Café  Bar"` and `"cafe-bar"` share the key `"cafe bar"`.
pub(crate) fn name_key(value: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in value.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim_end().to_string()
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_collapses_whitespace() {
        assert_eq!(
            normalize_display_name("  Office   rent ", "category").unwrap(),
            "Office rent"
        );
        assert!(normalize_display_name("   ", "category").is_err());
    }

    #[test]
    fn name_key_folds_accents_and_punctuation() {
        assert_eq!(name_key("Café  Bar"), "cafe bar");
        assert_eq!(name_key("cafe-bar!"), "cafe bar");
        assert_eq!(name_key("ÉDUCATION"), "education");
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" hi ")), Some("hi".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }
}

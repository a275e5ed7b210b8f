use deunicode::deunicode;
use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

lazy_static! {
    /// Hyphen, non-breaking hyphen, figure dash, en dash, em dash, horizontal bar
    static ref UNICODE_DASHES: Regex = Regex::new(r"[\u{2010}-\u{2015}]").unwrap();

    /// Anything that is not a word character, whitespace or an ASCII hyphen
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s-]").unwrap();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    static ref ORCID_URL_PREFIX: Regex = Regex::new(r"(?i)^.*orcid\.org/").unwrap();

    static ref ORCID_DIGITS: Regex = Regex::new(r"^\d{15}[\dX]$").unwrap();
}

/// Normalize free text for comparison and query building.
///
/// Drops diacritics, maps Unicode dashes to `-`, transliterates whatever is
/// left to ASCII (Cyrillic, Greek and CJK included), lowercases, strips
/// punctuation and collapses whitespace. Never fails; empty input gives an
/// empty string.
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let folded: String = text
        .to_lowercase()
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect();

    let dashed = UNICODE_DASHES.replace_all(&folded, "-");
    let ascii = deunicode(&dashed).to_lowercase();
    let stripped = NON_WORD.replace_all(&ascii, "");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// Decode the HTML entities Crossref leaves in titles
pub fn unescape_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Collapse runs of whitespace and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Canonicalize an ORCID iD.
///
/// Accepts bare or URL forms (`https://orcid.org/0000-0002-1825-0097`),
/// ignores separators, and returns the hyphen-grouped form only when the
/// ISO 7064 MOD 11-2 check character is correct.
pub fn normalize_orcid(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_url = ORCID_URL_PREFIX.replace(trimmed, "");
    let cleaned: String = without_url
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X')
        .collect();

    if !ORCID_DIGITS.is_match(&cleaned) {
        return None;
    }
    if orcid_check_char(&cleaned[..15]) != cleaned.chars().last() {
        return None;
    }

    Some(format!(
        "{}-{}-{}-{}",
        &cleaned[0..4],
        &cleaned[4..8],
        &cleaned[8..12],
        &cleaned[12..16]
    ))
}

fn orcid_check_char(base_digits: &str) -> Option<char> {
    let mut total: u32 = 0;
    for ch in base_digits.chars() {
        let digit = ch.to_digit(10)?;
        total = (total + digit) * 2;
    }
    let result = (12 - total % 11) % 11;
    if result == 10 {
        Some('X')
    } else {
        char::from_digit(result, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_diacritics_and_case() {
        assert_eq!(normalize_text("Café Déjà Vu"), "cafe deja vu");
        assert_eq!(normalize_text("Straße"), "strasse");
        assert_eq!(normalize_text("Łódź"), "lodz");
        assert_eq!(normalize_text("Ærøskøbing"), "aeroskobing");
    }

    #[test]
    fn test_normalize_transliterates_non_latin_scripts() {
        assert_eq!(normalize_text("Иванов"), "ivanov");
        assert_eq!(normalize_text("α-helix folding"), "a-helix folding");

        let cjk = normalize_text("李 明");
        assert!(cjk.is_ascii());
        assert!(!cjk.is_empty());
    }

    #[test]
    fn test_normalize_strips_punctuation_keeps_hyphens() {
        assert_eq!(
            normalize_text("Deep Learning: A Review (2nd ed.)!"),
            "deep learning a review 2nd ed"
        );
        assert_eq!(normalize_text("Self\u{2013}supervised"), "self-supervised");
        assert_eq!(normalize_text("state-of-the-art"), "state-of-the-art");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  a \t b\n\nc  "), "a b c");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text("?!"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_text("Über-große  Ergebnisse, Teil II");
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape_entities("R&amp;D &lt;b&gt;"), "R&D <b>");
    }

    #[test]
    fn test_normalize_orcid_forms() {
        let expected = Some("0000-0002-1825-0097".to_string());
        assert_eq!(normalize_orcid("0000-0002-1825-0097"), expected);
        assert_eq!(normalize_orcid("https://orcid.org/0000-0002-1825-0097"), expected);
        assert_eq!(normalize_orcid("http://ORCID.org/0000000218250097"), expected);
        assert_eq!(normalize_orcid(" 0000 0002 1825 0097 "), expected);
    }

    #[test]
    fn test_normalize_orcid_x_check_char() {
        assert_eq!(
            normalize_orcid("0000-0002-9079-593x"),
            Some("0000-0002-9079-593X".to_string())
        );
    }

    #[test]
    fn test_normalize_orcid_rejects_invalid() {
        assert_eq!(normalize_orcid(""), None);
        assert_eq!(normalize_orcid("0000-0002-1825-009"), None);
        // Wrong check digit
        assert_eq!(normalize_orcid("0000-0002-1825-0098"), None);
        assert_eq!(normalize_orcid("not an orcid"), None);
    }
}

// src/matching/normalize.rs
// Strict/loose employer name normalization shared by the ranker and the
// commitment matcher.

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing legal-entity suffixes stripped from the loose form. Stripping
/// repeats until the last token no longer matches, so "Acme Company Ltd"
/// reduces to "acme".
const LEGAL_SUFFIXES: [&str; 15] = [
    "ltd",
    "limited",
    "plc",
    "llp",
    "lp",
    "inc",
    "incorporated",
    "co",
    "company",
    "corp",
    "corporation",
    "llc",
    "gmbh",
    "sa",
    "sarl",
];

static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strict normalization: lowercase, expand `&` to "and", collapse everything
/// that is not a Unicode letter/digit/whitespace to a single space, squeeze
/// whitespace. Total function; empty input yields empty output.
pub fn normalize_strict(value: &str) -> String {
    let lowered = value.to_lowercase().replace('&', " and ");
    let stripped = NON_ALNUM_RE.replace_all(&lowered, " ");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Loose normalization: strict form with trailing legal suffixes stripped.
pub fn normalize_loose(value: &str) -> String {
    let cleaned = normalize_strict(value);
    if cleaned.is_empty() {
        return cleaned;
    }

    let mut tokens: Vec<&str> = cleaned.split(' ').collect();
    while let Some(last) = tokens.last() {
        if LEGAL_SUFFIXES.contains(last) {
            tokens.pop();
        } else {
            break;
        }
    }

    tokens.join(" ")
}

/// Split an already-normalized string into its non-empty tokens.
pub fn tokenize(value: &str) -> Vec<String> {
    value.split_whitespace().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_collapses_punctuation_and_case() {
        assert_eq!(normalize_strict("  Acme, Widgets!  (UK) "), "acme widgets uk");
        assert_eq!(normalize_strict("Smith & Sons"), "smith and sons");
        assert_eq!(normalize_strict(""), "");
    }

    #[test]
    fn test_strict_keeps_unicode_letters() {
        assert_eq!(normalize_strict("Café Zürich GmbH"), "café zürich gmbh");
    }

    #[test]
    fn test_loose_strips_trailing_suffixes_repeatedly() {
        assert_eq!(normalize_loose("Acme Ltd"), "acme");
        assert_eq!(normalize_loose("Acme Company Ltd"), "acme");
        assert_eq!(normalize_loose("Acme Trading Co."), "acme trading");
    }

    #[test]
    fn test_loose_keeps_interior_suffix_tokens() {
        // "co" only strips from the tail, not the middle of the name.
        assert_eq!(normalize_loose("Co Op Stores Limited"), "co op stores");
    }

    #[test]
    fn test_loose_can_consume_entire_name() {
        assert_eq!(normalize_loose("Limited"), "");
        assert_eq!(normalize_loose("Co Ltd"), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for input in ["Acme & Sons Ltd", "  Déjà-Vu  PLC ", "78 Records Inc"] {
            let strict = normalize_strict(input);
            assert_eq!(normalize_strict(&strict), strict);
            let loose = normalize_loose(input);
            assert_eq!(normalize_loose(&loose), loose);
        }
    }
}

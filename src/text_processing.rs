//! # Text Processing Module
//!
//! This module prepares raw label text for ingredient matching.
//!
//! ## Features
//!
//! - Normalization: lowercasing, punctuation stripping and whitespace collapsing
//! - Ingredients section extraction from a larger OCR / lookup blob, using
//!   heading and stop-heading heuristics
//! - Removal of common OCR artifacts (`|`, braces, brackets) and trailing periods
//!
//! None of the functions here can fail: any string, including empty text,
//! emoji or non-Latin scripts, produces a (possibly empty) string.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

lazy_static! {
    /// Anything that is not a letter, a digit or whitespace
    static ref NON_WORD: Regex =
        Regex::new(r"[^\p{L}\p{N}\s]").expect("Invalid non-word regex pattern");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("Invalid whitespace regex pattern");
    /// "ingredient" / "ingredients", optionally followed by a colon
    static ref INGREDIENTS_HEADING: Regex =
        Regex::new(r"(?i)ingredients?\s*:?\s*").expect("Invalid ingredients heading regex pattern");
    /// Headings that close the ingredients declaration
    static ref STOP_HEADING: Regex = Regex::new(
        r"(?i)nutrition|facts|allergen|contains|net\s*wt|serving|calories"
    )
    .expect("Invalid stop heading regex pattern");
    static ref OCR_ARTIFACTS: Regex = Regex::new(r"[|{}\[\]]").expect("Invalid OCR artifact regex pattern");
    static ref TRAILING_PERIOD: Regex = Regex::new(r"\s*\.\s*$").expect("Invalid trailing period regex pattern");
}

/// Canonicalize text for comparison.
///
/// Lowercases, replaces every character that is not a letter, digit or
/// whitespace with a space, collapses whitespace runs and trims. The result
/// contains only lowercase letters, digits and single spaces, so applying
/// `normalize` twice is the same as applying it once.
///
/// # Examples
/// ```
/// use clean_scan::text_processing::normalize;
///
/// assert_eq!(normalize("  Sugar, SALT (iodized)|  "), "sugar salt iodized");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let spaced = NON_WORD.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&spaced, " ").trim().to_string()
}

/// Split normalized text into its whitespace-delimited tokens
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

/// Isolate the ingredients declaration from a larger label text.
///
/// Looks for an "ingredient(s)" heading (case-insensitive, optional colon)
/// and captures everything after it up to the first stop heading
/// ("nutrition", "facts", "allergen", "contains", "net wt", "serving",
/// "calories") or the end of the text. OCR artifacts and a single trailing
/// period are stripped from the captured span.
///
/// When no heading is present the original text is returned unchanged, since
/// the whole blob may itself be an ingredients list.
///
/// # Examples
/// ```
/// use clean_scan::text_processing::extract_ingredients_section;
///
/// let label = "Ingredients: water, sugar, salt. Nutrition Facts: calories 100";
/// assert_eq!(extract_ingredients_section(label), "water, sugar, salt");
/// assert_eq!(extract_ingredients_section("water, salt"), "water, salt");
/// ```
pub fn extract_ingredients_section(raw_text: &str) -> String {
    let flattened = WHITESPACE.replace_all(raw_text, " ");

    let heading = match INGREDIENTS_HEADING.find(&flattened) {
        Some(heading) => heading,
        None => {
            debug!(
                text_length = raw_text.len(),
                "No ingredients heading found, using whole text"
            );
            return raw_text.to_string();
        }
    };

    let remainder = &flattened[heading.end()..];
    let section = match STOP_HEADING.find(remainder) {
        Some(stop) => {
            trace!(stop_heading = %stop.as_str(), "Ingredients section closed by stop heading");
            &remainder[..stop.start()]
        }
        None => remainder,
    };

    let cleaned = OCR_ARTIFACTS.replace_all(section, "");
    let cleaned = TRAILING_PERIOD.replace(&cleaned, "");
    let extracted = WHITESPACE.replace_all(&cleaned, " ").trim().to_string();

    debug!(
        raw_length = raw_text.len(),
        extracted_length = extracted.len(),
        "Extracted ingredients section"
    );
    extracted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("Red 40 [Lake]"), "red 40 lake");
        assert_eq!(normalize("high-fructose\tcorn\nsyrup"), "high fructose corn syrup");
        assert_eq!(normalize("snake_case"), "snake case");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "   ",
            "Monosodium Glutamate (MSG)",
            "Crème fraîche, ÉPICES & sel",
            "🍓 strawberry | 🍌 banana",
            "İstanbul ǅemal",
            "食品添加物 msg",
            "e\u{301}clair",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_normalize_drops_emoji() {
        assert_eq!(normalize("🍓🍓"), "");
        assert_eq!(normalize("salt 🧂"), "salt");
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("a bc def"), vec!["a", "bc", "def"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_extract_stops_at_first_stop_heading() {
        let label = "INGREDIENTS: enriched flour, sugar, BHT. ALLERGEN INFO: wheat";
        assert_eq!(
            extract_ingredients_section(label),
            "enriched flour, sugar, BHT"
        );
    }

    #[test]
    fn test_extract_flattens_lines_and_removes_artifacts() {
        let label = "Brand X\nIngredient |water|,\n{sugar}, [salt].\nNet Wt 12 oz";
        assert_eq!(extract_ingredients_section(label), "water, sugar, salt");
    }

    #[test]
    fn test_extract_without_heading_returns_input() {
        let text = "water\nsugar | salt";
        assert_eq!(extract_ingredients_section(text), text);
        assert_eq!(extract_ingredients_section(""), "");
    }
}

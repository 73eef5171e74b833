//! # Scanner Session Tests
//!
//! Scans through the session facade: section extraction, custom ingredient
//! edits, enabled-set changes, external text sources and history.

use clean_scan::config::AppConfig;
use clean_scan::errors::{AppError, AppResult};
use clean_scan::ingredient::load_built_in_catalog;
use clean_scan::preferences::{InMemoryPreferenceStore, PreferenceStore};
use clean_scan::scan::sort_by_severity;
use clean_scan::source::{StaticTextSource, TextSource};
use clean_scan::{Ingredient, Scanner, Severity};
use std::collections::HashSet;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

struct SlowSource;

impl TextSource for SlowSource {
    fn fetch_text(&self) -> impl Future<Output = AppResult<String>> + Send {
        async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("Ingredients: msg".to_string())
        }
    }
}

struct FailingSource;

impl TextSource for FailingSource {
    fn fetch_text(&self) -> impl Future<Output = AppResult<String>> + Send {
        async { Err(AppError::Source("OCR engine unavailable".to_string())) }
    }
}

fn scanner() -> Scanner {
    Scanner::from_config(&AppConfig::default()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_label_with_nutrition_panel() {
        let scanner = scanner();
        let label = "Ingredients: Enriched Flour, Sugar, High Fructose Corn Syrup, \
                     Salt, BHT (to preserve freshness). Nutrition Facts: Sodium Benzoate 0mg";

        let result = scanner.scan_text(label);

        assert!(result.is_harmful);
        assert!(!result.extracted_text.contains("Nutrition"));
        let ids: Vec<&str> = result
            .found_ingredients
            .iter()
            .map(|m| m.ingredient.id.as_str())
            .collect();
        assert!(ids.contains(&"hfcs"));
        assert!(ids.contains(&"bht"));
        // Text after the stop heading is never scanned
        assert!(!ids.contains(&"sodium_benzoate"));
    }

    #[test]
    fn test_clean_label_is_not_harmful() {
        let result = scanner().scan_text("Ingredients: water, sugar, salt.");
        assert!(!result.is_harmful);
        assert!(result.found_ingredients.is_empty());
        assert_eq!(result.extracted_text, "water, sugar, salt");
    }

    #[test]
    fn test_findings_sorted_for_display() {
        let result = scanner().scan_text("carrageenan, aspartame, tbhq, bht");
        let mut found = result.found_ingredients;
        sort_by_severity(&mut found);

        let names: Vec<&str> = found.iter().map(|m| m.ingredient.name.as_str()).collect();
        assert_eq!(names, vec!["BHT", "TBHQ", "Aspartame", "Carrageenan"]);
    }

    #[test]
    fn test_custom_ingredient_lifecycle() {
        let scanner = scanner();
        let palm = Ingredient::new_custom("Palm Oil", "Tropical oil", Severity::Low, "").unwrap();
        let palm_id = palm.id.clone();

        assert!(!scanner.scan_text("palm oil, sugar").is_harmful);

        scanner.add_custom_ingredient(palm).unwrap();
        let result = scanner.scan_text("palm oil, sugar");
        assert_eq!(result.found_ingredients.len(), 1);
        assert_eq!(result.found_ingredients[0].ingredient.id, palm_id);
        assert!(result.found_ingredients[0].ingredient.is_custom);

        scanner.delete_custom_ingredient(&palm_id).unwrap();
        assert!(!scanner.scan_text("palm oil, sugar").is_harmful);
        assert!(!scanner.enabled().contains(&palm_id));
    }

    #[test]
    fn test_replace_custom_ingredient_changes_aliases() {
        let scanner = scanner();
        let mut ingredient =
            Ingredient::new_custom("Palm Oil", "", Severity::Low, "").unwrap();
        scanner.add_custom_ingredient(ingredient.clone()).unwrap();

        ingredient.aliases.push("elaeis guineensis".to_string());
        scanner.replace_custom_ingredient(ingredient).unwrap();

        assert!(scanner.scan_text("elaeis guineensis oil").is_harmful);
    }

    #[test]
    fn test_toggle_disables_matches() {
        let scanner = scanner();
        assert!(scanner.scan_text("contains msg").is_harmful);

        assert!(!scanner.toggle_ingredient("msg").unwrap());
        assert!(!scanner.scan_text("contains msg").is_harmful);

        assert!(scanner.toggle_ingredient("msg").unwrap());
        assert!(scanner.scan_text("contains msg").is_harmful);
    }

    #[test]
    fn test_session_restored_from_store() {
        let store = Arc::new(InMemoryPreferenceStore::new());
        let built_in = load_built_in_catalog().unwrap();

        let first = Scanner::with_store(built_in.clone(), store.clone(), &AppConfig::default())
            .unwrap();
        first
            .add_custom_ingredient(
                Ingredient::new_custom("Palm Oil", "", Severity::Low, "").unwrap(),
            )
            .unwrap();
        first.toggle_ingredient("msg").unwrap();

        let second = Scanner::with_store(built_in, store.clone(), &AppConfig::default()).unwrap();
        assert!(second.scan_text("palm oil").is_harmful);
        assert!(!second.scan_text("msg").is_harmful);
        assert_eq!(store.load_custom().unwrap().len(), 1);
    }

    #[test]
    fn test_catalog_path_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"gluten","name":"Gluten","aliases":["gluten","wheat"],"severity":"High","description":"Wheat protein"}}]"#
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.scan.catalog_path = Some(file.path().to_path_buf());
        let scanner = Scanner::from_config(&config).unwrap();

        assert_eq!(scanner.ingredients().len(), 1);
        assert!(scanner.scan_text("whole wheat flour").is_harmful);
        assert!(!scanner.scan_text("msg").is_harmful);
    }

    #[test]
    fn test_history_keeps_latest_scans() {
        let mut config = AppConfig::default();
        config.scan.history_limit = 2;
        let scanner = Scanner::from_config(&config).unwrap();

        scanner.scan_text("water");
        scanner.scan_text("msg");
        scanner.scan_text("bht");

        let history = scanner.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].extracted_text, "bht");
        assert_eq!(history[1].extracted_text, "msg");

        scanner.clear_history();
        assert!(scanner.history().is_empty());
    }

    #[tokio::test]
    async fn test_scan_from_static_source() {
        let scanner = scanner();
        let source = StaticTextSource::new("INGREDIENTS: Water, Red 40, Yellow 5.");

        let result = scanner.scan_source(&source).await.unwrap();

        assert_eq!(result.extracted_text, "Water, Red 40, Yellow 5");
        assert_eq!(result.found_ingredients.len(), 2);
    }

    #[tokio::test]
    async fn test_source_error_is_propagated() {
        let err = scanner().scan_source(&FailingSource).await.unwrap_err();
        assert!(matches!(err, AppError::Source(_)));
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let mut config = AppConfig::default();
        config.scan.source_timeout_secs = 1;
        let scanner = Scanner::from_config(&config).unwrap();

        let err = scanner.scan_source(&SlowSource).await.unwrap_err();
        assert!(matches!(err, AppError::Source(msg) if msg.contains("timed out")));
        assert!(scanner.history().is_empty());
    }

    #[tokio::test]
    async fn test_shared_scanner_across_tasks() {
        let scanner = Arc::new(scanner());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let scanner = Arc::clone(&scanner);
                tokio::spawn(async move {
                    let source = StaticTextSource::new("Ingredients: msg, aspartame");
                    scanner.scan_source(&source).await.unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().found_ingredients.len(), 2);
        }
        let history = scanner.history();
        assert_eq!(history.len(), 4);
        let ids: HashSet<&str> = history.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
    }
}

use anyhow::Result;
use clean_scan::config::AppConfig;
use clean_scan::errors::{error_logging, AppResult};
use clean_scan::observability;
use clean_scan::scan::sort_by_severity;
use clean_scan::source::TextSource;
use clean_scan::Scanner;
use std::future::Future;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::info;

/// Label text read from a file, or from stdin when no path is given
struct InputTextSource {
    path: Option<PathBuf>,
}

impl TextSource for InputTextSource {
    fn fetch_text(&self) -> impl Future<Output = AppResult<String>> + Send {
        let path = self.path.clone();
        async move {
            match path {
                Some(path) => Ok(tokio::fs::read_to_string(&path).await?),
                None => {
                    let mut text = String::new();
                    tokio::io::stdin().read_to_string(&mut text).await?;
                    Ok(text)
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; plain environment variables still apply otherwise
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    if let Err(e) = config.validate() {
        error_logging::log_config_error(&e, "AppConfig", "validate");
        return Err(e.into());
    }

    observability::init_tracing_with_config(&config.observability)?;
    info!("{}", config.summary());

    let scanner = Scanner::from_config(&config)?;
    let source = InputTextSource {
        path: std::env::args().nth(1).map(PathBuf::from),
    };

    let result = scanner.scan_source(&source).await?;
    let mut found = result.found_ingredients;
    sort_by_severity(&mut found);

    println!("Ingredients: {}", result.extracted_text);
    if found.is_empty() {
        println!("No watched ingredients found.");
        return Ok(());
    }

    println!("Found {} watched ingredient(s):", found.len());
    for matched in &found {
        println!(
            "  [{}] {} (matched \"{}\")",
            matched.ingredient.severity, matched.ingredient.name, matched.matched_alias
        );
        if !matched.ingredient.why_harmful.is_empty() {
            println!("      {}", matched.ingredient.why_harmful);
        }
    }

    Ok(())
}

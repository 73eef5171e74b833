//! # Text Sources
//!
//! The OCR engine and product-database lookup live outside this crate. They
//! reach the matcher through [`TextSource`], which yields the raw label text
//! of one scan.

use crate::errors::AppResult;
use std::future::Future;

/// Supplier of raw label text (OCR result, product lookup, manual entry)
pub trait TextSource {
    /// Fetch the raw text for one scan
    fn fetch_text(&self) -> impl Future<Output = AppResult<String>> + Send;
}

/// Text that is already available, e.g. typed in by the user
#[derive(Debug, Clone)]
pub struct StaticTextSource {
    text: String,
}

impl StaticTextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextSource for StaticTextSource {
    fn fetch_text(&self) -> impl Future<Output = AppResult<String>> + Send {
        let text = self.text.clone();
        async move { Ok(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_returns_text() {
        let source = StaticTextSource::new("Ingredients: water");
        assert_eq!(source.fetch_text().await.unwrap(), "Ingredients: water");
    }
}

//! Text normalization: best-effort Spanish detection and translation to English
//! before scoring. Never fails: any translation problem degrades to the input text.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::translation::Translator;

/// Frequent Spanish function words. A heuristic, not a language detector:
/// short or code-mixed input will be misjudged either way.
pub const SPANISH_STOP_WORDS: &[&str] = &["el", "la", "los", "las", "es", "en", "y", "de", "que", "se"];

const SOURCE_LANG: &str = "es";
const TARGET_LANG: &str = "en";

/// True when a lowercase alphabetic token of `text` is a Spanish stop word
/// and the text has more than one whitespace-delimited token.
pub fn looks_spanish(text: &str) -> bool {
    if text.split_whitespace().nth(1).is_none() {
        return false;
    }
    text.split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .any(|t| SPANISH_STOP_WORDS.contains(&t.to_lowercase().as_str()))
}

pub struct TextNormalizer {
    translator: Arc<dyn Translator>,
    timeout: Duration,
}

impl TextNormalizer {
    pub fn new(translator: Arc<dyn Translator>, timeout: Duration) -> Self {
        Self {
            translator,
            timeout,
        }
    }

    /// Returns the English text to score. Empty input and non-Spanish input
    /// come back unchanged without a translation call.
    pub async fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() || !looks_spanish(text) {
            return text.to_string();
        }

        match tokio::time::timeout(
            self.timeout,
            self.translator.translate(text, SOURCE_LANG, TARGET_LANG),
        )
        .await
        {
            Ok(Ok(translated)) if !translated.trim().is_empty() => {
                debug!("Translated comment to English");
                translated
            }
            Ok(Ok(_)) => {
                warn!("Translation came back blank, scoring original text");
                text.to_string()
            }
            Ok(Err(e)) => {
                warn!("Translation failed, scoring original text: {e}");
                text.to_string()
            }
            Err(_) => {
                warn!(
                    "Translation timed out after {}ms, scoring original text",
                    self.timeout.as_millis()
                );
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::translation::{TranslateError, Translator};

    /// Returns a fixed translation and counts calls.
    pub struct FixedTranslator {
        pub output: String,
        pub calls: AtomicUsize,
    }

    impl FixedTranslator {
        pub fn new(output: &str) -> Self {
            Self {
                output: output.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Translator for FixedTranslator {
        async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, TranslateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    /// Simulates a quota/network failure.
    pub struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, TranslateError> {
            Err(TranslateError::Api {
                status: 429,
                message: "quota exceeded".to_string(),
            })
        }
    }

    /// Never answers.
    pub struct HangingTranslator;

    #[async_trait]
    impl Translator for HangingTranslator {
        async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, TranslateError> {
            std::future::pending().await
        }
    }
}

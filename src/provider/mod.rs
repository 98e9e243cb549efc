// Translation providers
//
// The service only talks to the `TranslationProvider` trait. `GeminiProvider`
// is the production implementation; tests substitute mocks or fakes.

pub mod gemini;
pub mod languages;

use async_trait::async_trait;

pub use gemini::GeminiProvider;
pub use languages::language_name;
use crate::error::Result;

/// Remote model that turns text in one language into another
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `text` from `source_language` to `target_language`
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<String>;

    /// Short identifier for logs
    fn name(&self) -> &'static str;
}

/// Instruction prompt sent to the model for a single text
pub fn build_prompt(text: &str, target_language: &str, source_language: &str) -> String {
    format!(
        "Translate the following text from {} to {}.\n\
         \n\
         IMPORTANT:\n\
         - Preserve every placeholder of the form {{{{variable}}}} exactly as written, do not translate it.\n\
         - Preserve any HTML or markup tags exactly as they are.\n\
         - Keep the same tone and formatting.\n\
         - Return ONLY the translated text, without any explanation, notes or quotes.\n\
         \n\
         Text to translate:\n\
         {}",
        language_name(source_language),
        language_name(target_language),
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_languages_and_embeds_text() {
        let prompt = build_prompt("Your order #{{id}} is ready", "fr", "en");

        assert!(prompt.starts_with("Translate the following text from English to French."));
        assert!(prompt.contains("{{variable}}"));
        assert!(prompt.contains("HTML"));
        assert!(prompt.contains("Return ONLY the translated text"));
        assert!(prompt.ends_with("Your order #{{id}} is ready"));
    }

    #[test]
    fn test_prompt_falls_back_to_raw_code() {
        let prompt = build_prompt("Hello", "tlh", "en");
        assert!(prompt.starts_with("Translate the following text from English to tlh."));
    }
}

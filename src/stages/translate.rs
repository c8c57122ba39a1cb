use crate::error::{DublineError, Result};
use crate::stages::{CapabilityReply, TranslationRequest, TranslationResult, Translator};

/// Translate text into the requested language.
///
/// The language code is not checked against the supported list; it only has
/// to be non-empty. Source text is sent as-is, even when empty.
///
/// # Errors
///
/// [`DublineError::Translation`] for an empty target language or when the
/// service returns a missing or empty translation.
pub async fn translate(
    capability: &dyn Translator,
    request: &TranslationRequest,
) -> Result<TranslationResult> {
    let target = request.target_language.trim();
    if target.is_empty() {
        return Err(DublineError::Translation {
            message: "target language must not be empty".to_string(),
        });
    }

    tracing::debug!(
        service = capability.name(),
        target_language = target,
        chars = request.source_text.chars().count(),
        "requesting translation"
    );

    match capability.translate(&request.source_text, target).await? {
        CapabilityReply::Output(text) if !text.trim().is_empty() => Ok(TranslationResult {
            translated_text: text,
        }),
        CapabilityReply::Output(_) => Err(DublineError::Translation {
            message: "service returned an empty translation".to_string(),
        }),
        CapabilityReply::NoOutput { reason } => Err(DublineError::Translation {
            message: format!("no translation produced: {}", reason),
        }),
    }
}

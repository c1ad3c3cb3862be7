use anyhow::{Result, anyhow};
use isolang::Language;

// Language utilities for the note language.
// Cultural notes are written in a configurable language. The config may name
// it with an ISO 639-1 (2-letter) or ISO 639-3 (3-letter) code, or with its
// English name. Prompts always carry the English name.

/// Resolve a code or an English name to the English language name
pub fn resolve_language_name(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Language must not be empty"));
    }

    let lowered = trimmed.to_lowercase();
    let by_code = match lowered.len() {
        2 => Language::from_639_1(&lowered),
        3 => Language::from_639_3(&lowered),
        _ => None,
    };
    if let Some(lang) = by_code {
        return Ok(lang.to_name().to_string());
    }

    // Plain names are accepted as written
    if trimmed.len() > 3 && trimmed.chars().all(|c| c.is_alphabetic() || c == ' ' || c == '-') {
        return Ok(trimmed.to_string());
    }

    Err(anyhow!("Unrecognized language: {}", input))
}

/*!
 * Prompt templates for note extraction and classification.
 */

use super::category::CategoryVocabulary;

/// Reply meaning "no note needed"
pub const NO_NOTE_SENTINEL: &str = "-";

/// Template for the note extraction request.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Extraction prompt. Placeholders: {categories}, {target_language}, {text}
    pub const NOTE_EXTRACTION: &'static str = "Extract cultural references ({categories}) from the given text. \
Focus only on less obvious or culturally specific elements that require detailed local knowledge. \
Avoid trivial explanations or generalizations.\n\n\
For each, provide a concise explanation in {target_language}, starting directly with the explanation without repeating the source text. \
Avoid verbosity and do not explain common or widely understood expressions. If no explanation is needed, return '-'.\n\n\
Text: '{text}'";

    /// Classification prompt. Placeholders: {categories}, {note}
    pub const NOTE_CLASSIFICATION: &'static str = "Return only one word representing the category from these options: {categories}. \
No explanations, only the category name.\n\n\
Cultural Note: '{note}'";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn note_extraction() -> Self {
        Self::new(Self::NOTE_EXTRACTION)
    }

    pub fn note_classification() -> Self {
        Self::new(Self::NOTE_CLASSIFICATION)
    }

    /// Replace `{key}` placeholders
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        vars.iter().fold(self.template.clone(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        })
    }
}

/// Renders both prompts for a vocabulary and note language
#[derive(Debug, Clone)]
pub struct AnnotationPrompts {
    extraction: PromptTemplate,
    classification: PromptTemplate,
    categories: String,
    target_language: String,
}

impl AnnotationPrompts {
    pub fn new(vocabulary: &CategoryVocabulary, target_language: impl Into<String>) -> Self {
        Self {
            extraction: PromptTemplate::note_extraction(),
            classification: PromptTemplate::note_classification(),
            categories: vocabulary.joined(),
            target_language: target_language.into(),
        }
    }

    pub fn extraction(&self, subtitle_line: &str) -> String {
        self.extraction.render(&[
            ("categories", self.categories.as_str()),
            ("target_language", self.target_language.as_str()),
            ("text", subtitle_line),
        ])
    }

    pub fn classification(&self, note: &str) -> String {
        self.classification.render(&[("categories", self.categories.as_str()), ("note", note)])
    }
}

/// Strip leading dashes and spaces from a raw note.
///
/// Returns `None` when nothing is left or the reply is the sentinel.
pub fn clean_note(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NO_NOTE_SENTINEL {
        return None;
    }
    let cleaned = trimmed.trim_start_matches(['-', '–', '—', ' ']).trim();
    if cleaned.is_empty() || cleaned == NO_NOTE_SENTINEL {
        None
    } else {
        Some(cleaned.to_string())
    }
}

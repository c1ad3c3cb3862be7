/*!
 * Category vocabulary for cultural notes.
 */

use std::fmt;

/// Built-in kinds of cultural reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    SetExpression,
    Pun,
    Joke,
    Location,
    Venue,
    Event,
    Drug,
    FamousTeam,
    Food,
    Drink,
    CorporateHumor,
    Science,
    Movie,
    Song,
    Book,
}

impl Category {
    /// All built-in categories in prompt order
    pub const ALL: [Category; 15] = [
        Category::SetExpression,
        Category::Pun,
        Category::Joke,
        Category::Location,
        Category::Venue,
        Category::Event,
        Category::Drug,
        Category::FamousTeam,
        Category::Food,
        Category::Drink,
        Category::CorporateHumor,
        Category::Science,
        Category::Movie,
        Category::Song,
        Category::Book,
    ];

    /// Label used in prompts and result tables
    pub fn label(&self) -> &'static str {
        match self {
            Category::SetExpression => "set expression",
            Category::Pun => "pun",
            Category::Joke => "joke",
            Category::Location => "location",
            Category::Venue => "venue",
            Category::Event => "event",
            Category::Drug => "drug",
            Category::FamousTeam => "famous team",
            Category::Food => "food",
            Category::Drink => "drink",
            Category::CorporateHumor => "corporate humor",
            Category::Science => "science",
            Category::Movie => "movie",
            Category::Song => "song",
            Category::Book => "book",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Closed set of labels the classifier may answer with
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryVocabulary {
    labels: Vec<String>,
}

impl CategoryVocabulary {
    /// Build from configured labels, dropping blanks and duplicates
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for label in labels {
            let label = label.as_ref().trim();
            if !label.is_empty() && !unique.iter().any(|l| l.eq_ignore_ascii_case(label)) {
                unique.push(label.to_string());
            }
        }
        Self { labels: unique }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Comma separated list for prompts
    pub fn joined(&self) -> String {
        self.labels.join(", ")
    }

    /// Match a raw model reply to a canonical label.
    ///
    /// Case, surrounding quotes, trailing punctuation and `_`/`-` separators
    /// are ignored.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        let wanted = Self::normalize(raw);
        if wanted.is_empty() {
            return None;
        }
        self.labels
            .iter()
            .find(|label| Self::normalize(label) == wanted)
            .map(String::as_str)
    }

    fn normalize(text: &str) -> String {
        text.trim_matches(|c: char| c.is_whitespace() || "\"'`*.!,;:".contains(c))
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

impl Default for CategoryVocabulary {
    fn default() -> Self {
        Self::new(Category::ALL.iter().map(|c| c.label()))
    }
}

use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use log::{error, warn, debug};

use crate::errors::SubtitleError;
use crate::tokens::TokenEstimator;

// @module: Subtitle parsing and line selection

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timestamp pattern is valid")
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }
}

/// Parsed subtitle file
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Entries in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Read and parse an SRT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SubtitleError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

        let entries = Self::parse_srt_string(&content);
        if entries.is_empty() {
            return Err(SubtitleError::NoEntries(path.display().to_string()));
        }

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Parse SRT content into entries, keeping file order.
    ///
    /// Blocks are separated by blank lines. A block needs a timestamp line in
    /// its first two lines; everything after the timestamp is caption text.
    /// Blocks without a timestamp are skipped with a warning.
    pub fn parse_srt_string(content: &str) -> Vec<SubtitleEntry> {
        let content = content.trim_start_matches('\u{feff}');
        let mut entries = Vec::new();
        let mut block: Vec<&str> = Vec::new();

        for line in content.lines().chain(std::iter::once("")) {
            if !line.trim().is_empty() {
                block.push(line);
                continue;
            }
            if block.is_empty() {
                continue;
            }

            match Self::parse_block(&block, entries.len() + 1) {
                Some(entry) => entries.push(entry),
                None => warn!("Skipping malformed subtitle block: {:?}", block.first()),
            }
            block.clear();
        }

        entries
    }

    // @parses: One caption block; None when no timestamp line is found
    fn parse_block(block: &[&str], fallback_seq: usize) -> Option<SubtitleEntry> {
        let ts_index = block.iter().take(2).position(|line| TIMESTAMP_REGEX.is_match(line))?;
        let caps = TIMESTAMP_REGEX.captures(block[ts_index])?;

        let seq_num = if ts_index == 1 {
            block[0].trim().parse().unwrap_or(fallback_seq)
        } else {
            fallback_seq
        };

        let text = block[ts_index + 1..]
            .iter()
            .map(|line| line.trim_end())
            .collect::<Vec<_>>()
            .join("\n");

        Some(SubtitleEntry::new(
            seq_num,
            Self::parse_timestamp_to_ms(&caps, 1),
            Self::parse_timestamp_to_ms(&caps, 5),
            text,
        ))
    }

    /// Trimmed caption texts, empty ones removed
    pub fn retained_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn parse_timestamp_to_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
        let part = |offset: usize| -> u64 {
            caps.get(start_idx + offset)
                .map_or(0, |m| m.as_str().parse().unwrap_or(0))
        };

        (part(0) * 3600 + part(1) * 60 + part(2)) * 1000 + part(3)
    }
}

/// Lines selected from one subtitle file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtitleLines {
    /// Retained lines in file order, after percentage truncation
    pub lines: Vec<String>,
    /// Estimated tokens over `lines`
    pub total_tokens: u64,
}

/// Keep the first `percentage` percent of items, at least one when non-empty
pub fn truncate_to_percentage<T>(mut items: Vec<T>, percentage: f64) -> Result<Vec<T>, SubtitleError> {
    if !(percentage > 0.0 && percentage <= 100.0) {
        return Err(SubtitleError::InvalidPercentage(percentage));
    }
    if items.is_empty() {
        return Ok(items);
    }

    let limit = ((items.len() as f64 * percentage / 100.0).floor() as usize).clamp(1, items.len());
    items.truncate(limit);
    Ok(items)
}

/// Reads subtitle files into annotatable lines
pub struct SubtitleReader<'a> {
    estimator: &'a dyn TokenEstimator,
    percentage: f64,
}

impl<'a> SubtitleReader<'a> {
    pub fn new(estimator: &'a dyn TokenEstimator, percentage: f64) -> Self {
        Self { estimator, percentage }
    }

    /// Read one file, propagating failures
    pub fn try_read<P: AsRef<Path>>(&self, path: P) -> Result<SubtitleLines, SubtitleError> {
        let collection = SubtitleCollection::from_file(path)?;
        let lines = truncate_to_percentage(collection.retained_lines(), self.percentage)?;
        let total_tokens = self.estimator.count_all(&lines);
        Ok(SubtitleLines { lines, total_tokens })
    }

    /// Read one file; a failure is logged and yields no lines
    pub fn read<P: AsRef<Path>>(&self, path: P) -> SubtitleLines {
        let path = path.as_ref();
        match self.try_read(path) {
            Ok(lines) => {
                debug!("Counted {} tokens in {} lines of {:?}", lines.total_tokens, lines.lines.len(), path);
                lines
            }
            Err(e) => {
                error!("Error reading subtitle file: {}", e);
                SubtitleLines::default()
            }
        }
    }
}

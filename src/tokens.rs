/*!
 * Token estimation for cost reporting.
 *
 * Counts only feed the season cost estimate, so any deterministic estimator
 * that grows with the text is acceptable. When the configured model has a
 * known BPE encoding the count comes from `tiktoken-rs`; otherwise a
 * characters-per-token heuristic is used.
 */

use anyhow::Result;
use log::debug;
use tiktoken_rs::CoreBPE;

/// Maps text to an approximate model token count
pub trait TokenEstimator: Send + Sync {
    /// Token count for one piece of text
    fn count_tokens(&self, text: &str) -> usize;

    /// Total over a sequence of lines
    fn count_all(&self, lines: &[String]) -> u64 {
        lines.iter().map(|line| self.count_tokens(line) as u64).sum()
    }
}

/// Rough estimate: ~4 chars per token for English
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEstimator;

impl TokenEstimator for HeuristicEstimator {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

/// Exact BPE count for OpenAI model families
pub struct TiktokenEstimator {
    bpe: CoreBPE,
}

impl TiktokenEstimator {
    /// Load the encoding used by `model`
    pub fn for_model(model: &str) -> Result<Self> {
        let bpe = tiktoken_rs::get_bpe_from_model(model)?;
        Ok(Self { bpe })
    }
}

impl TokenEstimator for TiktokenEstimator {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Best available estimator for a model name
pub fn estimator_for_model(model: &str) -> Box<dyn TokenEstimator> {
    match TiktokenEstimator::for_model(model) {
        Ok(estimator) => Box::new(estimator),
        Err(e) => {
            debug!("No BPE encoding for model '{}' ({}), using heuristic token estimate", model, e);
            Box::new(HeuristicEstimator)
        }
    }
}

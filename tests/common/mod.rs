/*!
 * Common test utilities for the subnotes test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use subnotes::errors::ProviderError;
use subnotes::providers::mock::MockProvider;
use subnotes::providers::CompletionRequest;
use tempfile::TempDir;

/// Routes library logs through env_logger; repeated calls are ignored
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Renders SRT content with one cue per line
pub fn srt_content(lines: &[&str]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, text)| {
            format!(
                "{}\n00:00:{:02},000 --> 00:00:{:02},900\n{}\n\n",
                i + 1,
                i % 60,
                i % 60,
                text
            )
        })
        .collect()
}

/// Creates a subtitle file holding the given lines
pub fn create_srt(dir: &Path, filename: &str, lines: &[&str]) -> Result<PathBuf> {
    create_test_file(dir, filename, &srt_content(lines))
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:01,000 --> 00:00:04,000
Hello.

2
00:00:05,000 --> 00:00:09,000
TechCrunch Disrupt is happening.

3
00:00:10,000 --> 00:00:14,000
We went with middle-out compression.
"#;
    create_test_file(dir, filename, content)
}

/// True for classification requests
pub fn is_classification(request: &CompletionRequest) -> bool {
    request.prompt.starts_with("Return only one word")
}

/// Provider that notes lines mentioning TechCrunch (event) or middle-out (joke)
pub fn annotating_provider() -> MockProvider {
    MockProvider::scripted(|request: &CompletionRequest| -> Result<String, ProviderError> {
        if is_classification(request) {
            if request.prompt.contains("conference") {
                Ok("Event".to_string())
            } else {
                Ok("joke".to_string())
            }
        } else if request.prompt.contains("TechCrunch") {
            Ok("- a startup conference reference".to_string())
        } else if request.prompt.contains("middle-out") {
            Ok("a running gag about compression".to_string())
        } else {
            Ok("-".to_string())
        }
    })
}

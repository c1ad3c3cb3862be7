/*!
 * Tests for subtitle reading and percentage truncation
 */

use anyhow::Result;
use subnotes::errors::SubtitleError;
use subnotes::subtitle_processor::{truncate_to_percentage, SubtitleCollection, SubtitleReader};
use subnotes::tokens::{HeuristicEstimator, TokenEstimator};

use crate::common;

/// Test that a sample file parses into ordered entries
#[test]
fn test_from_file_withSampleSubtitle_shouldParseAllEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;

    let collection = SubtitleCollection::from_file(&path)?;
    assert_eq!(collection.entries.len(), 3);
    assert_eq!(collection.entries[1].text, "TechCrunch Disrupt is happening.");
    assert_eq!(collection.entries[2].start_time_ms, 10_000);
    assert_eq!(collection.entries[2].end_time_ms, 14_000);
    Ok(())
}

/// Test that multi-line captions stay one line of the result
#[test]
fn test_parse_withMultilineCaption_shouldKeepOneEntry() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nFirst line\nsecond line\n\n2\n00:00:03,000 --> 00:00:04,000\n   \n\n";
    let entries = SubtitleCollection::parse_srt_string(content);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "First line\nsecond line");
}

/// Test that a 10-line file at 50% keeps the first five lines in order
#[test]
fn test_reader_withHalfPercentage_shouldKeepLeadingLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let lines: Vec<String> = (1..=10).map(|i| format!("Line number {}", i)).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let path = common::create_srt(temp_dir.path(), "episode.srt", &refs)?;

    let estimator = HeuristicEstimator;
    let result = SubtitleReader::new(&estimator, 50.0).try_read(&path)?;

    assert_eq!(result.lines, lines[..5].to_vec());
    assert_eq!(result.total_tokens, estimator.count_all(&lines[..5].to_vec()));
    Ok(())
}

/// Test that a small percentage still keeps one line
#[test]
fn test_reader_withTinyPercentage_shouldKeepAtLeastOneLine() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_srt(temp_dir.path(), "episode.srt", &["A", "B", "C"])?;

    let result = SubtitleReader::new(&HeuristicEstimator, 1.0).try_read(&path)?;
    assert_eq!(result.lines, vec!["A".to_string()]);
    Ok(())
}

/// Test that unreadable files produce no lines instead of an error
#[test]
fn test_reader_withMissingFile_shouldYieldNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let reader = SubtitleReader::new(&HeuristicEstimator, 100.0);

    let missing = temp_dir.path().join("missing.srt");
    assert!(matches!(reader.try_read(&missing), Err(SubtitleError::Unreadable { .. })));

    let result = reader.read(&missing);
    assert!(result.lines.is_empty());
    assert_eq!(result.total_tokens, 0);
    Ok(())
}

/// Test the truncation bounds
#[test]
fn test_truncate_to_percentage_shouldRespectBounds() {
    let items: Vec<u32> = (0..7).collect();
    assert_eq!(truncate_to_percentage(items.clone(), 100.0).unwrap().len(), 7);
    assert_eq!(truncate_to_percentage(items.clone(), 50.0).unwrap().len(), 3);
    assert_eq!(truncate_to_percentage(Vec::<u32>::new(), 10.0).unwrap().len(), 0);
    assert!(truncate_to_percentage(items.clone(), 0.0).is_err());
    assert!(truncate_to_percentage(items, 100.5).is_err());
}

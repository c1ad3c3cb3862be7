/*!
 * End-to-end season processing tests with scripted providers
 */

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use subnotes::annotation::{Annotation, AnnotationGenerator, AnnotationOptions, CategoryVocabulary};
use subnotes::app_config::{Config, SeasonConfig};
use subnotes::providers::mock::MockProvider;
use subnotes::report::{self, table};
use subnotes::season::SeasonProcessor;
use subnotes::tokens::HeuristicEstimator;

use crate::common;

fn processor(provider: &MockProvider, concurrency: usize) -> SeasonProcessor {
    let mut config = Config::default();
    config.annotation.concurrent_requests = concurrency;
    config.processing.render_charts = false;
    let generator = AnnotationGenerator::new(
        Arc::new(provider.clone()),
        CategoryVocabulary::default(),
        "Russian",
        AnnotationOptions::default(),
    );
    SeasonProcessor::new(generator, Box::new(HeuristicEstimator), &config).with_progress(false)
}

fn season_dir(root: &Path, name: &str) -> Result<PathBuf> {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Test the two-line scenario from subtitle file to season table
#[tokio::test]
async fn test_process_season_withTwoLines_shouldProduceOneNote() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = season_dir(temp_dir.path(), "s1")?;
    common::create_srt(&dir, "e01.srt", &["Hello", "TechCrunch Disrupt is happening"])?;
    let season = SeasonConfig::new(&dir, "Season 1");
    let provider = common::annotating_provider();

    let report = processor(&provider, 4).process(&season).await?;

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].note(), "");
    assert_eq!(report.records[0].category(), "");
    assert_eq!(report.records[1].note(), "a startup conference reference");
    assert_eq!(report.records[1].category(), "event");
    assert_eq!(report.table_path, dir.join("s1_notes.xlsx"));

    let rows = table::read_season_table(&report.table_path, "Sheet1")?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].subtitle, "Hello");
    assert_eq!(rows[1].category, "event");
    Ok(())
}

/// Test that failing requests become Error rows without stopping the season
#[tokio::test]
async fn test_process_season_withIntermittentFailures_shouldKeepEveryLine() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let lines: Vec<String> = (0..12).map(|i| format!("TechCrunch line {}", i)).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let dir = season_dir(temp_dir.path(), "s1")?;
    common::create_srt(&dir, "e01.srt", &refs)?;
    let provider = MockProvider::intermittent(3).with_responder(|_| Ok("pun".to_string()));

    let report = processor(&provider, 3)
        .process_season("Season 1", &dir, &dir.join("out.xlsx"))
        .await?;

    assert_eq!(report.records.len(), 12);
    assert!(report.failed_count() > 0);
    for (record, line) in report.records.iter().zip(&lines) {
        assert_eq!(&record.subtitle, line);
    }
    let categories = table::read_category_column(&dir.join("out.xlsx"), "Sheet1")?;
    assert_eq!(categories.len(), 12);
    assert!(categories.iter().any(|c| c == "Error"));
    Ok(())
}

/// Test that concurrency does not change the output order
#[tokio::test]
async fn test_process_season_withDifferentConcurrency_shouldProduceSameRecords() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = season_dir(temp_dir.path(), "s1")?;
    common::create_srt(&dir, "e02.srt", &["We went with middle-out compression", "Hello"])?;
    common::create_srt(&dir, "e01.srt", &["TechCrunch Disrupt is happening", "Bye"])?;

    let sequential = processor(&common::annotating_provider(), 1)
        .process_season("S", &dir, &dir.join("seq.xlsx"))
        .await?;
    let concurrent = processor(&common::annotating_provider(), 8)
        .process_season("S", &dir, &dir.join("con.xlsx"))
        .await?;

    assert_eq!(sequential.records, concurrent.records);
    assert_eq!(sequential.files_processed, 2);
    // Files are processed in name order
    assert_eq!(sequential.records[0].subtitle, "TechCrunch Disrupt is happening");
    assert_eq!(sequential.records[2].category(), "joke");
    assert_eq!(sequential.total_tokens, concurrent.total_tokens);
    Ok(())
}

/// Test the cost estimate against the token total
#[tokio::test]
async fn test_process_season_shouldEstimateCostFromTokens() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = season_dir(temp_dir.path(), "s1")?;
    common::create_srt(&dir, "e01.srt", &["abcdefgh", "abcd"])?;
    let provider = MockProvider::scripted(|_| Ok("-".to_string()));

    let report = processor(&provider, 2).process_season("S", &dir, &dir.join("out.xlsx")).await?;

    // 8 chars -> 2 tokens, 4 chars -> 1 token
    assert_eq!(report.total_tokens, 3);
    assert!((report.estimated_cost - 3.0 * 2.0 / 1_000_000.0 * 1.25).abs() < 1e-12);
    assert!(report.records.iter().all(|r| r.annotation == Annotation::NotNeeded));
    Ok(())
}

/// Test the cross-season matrix built from processed seasons
#[tokio::test]
async fn test_cross_season_report_shouldCountCategoriesPerSeason() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let s1 = season_dir(temp_dir.path(), "s1")?;
    common::create_srt(&s1, "e01.srt", &["TechCrunch Disrupt is happening", "Hello"])?;
    let s2 = season_dir(temp_dir.path(), "s2")?;
    common::create_srt(&s2, "e01.srt", &["middle-out", "We went with middle-out compression"])?;
    let seasons = vec![
        SeasonConfig::new(&s1, "Season 1"),
        SeasonConfig::new(&s2, "Season 2"),
        SeasonConfig::new(temp_dir.path().join("s3"), "Season 3"),
    ];

    let processor = processor(&common::annotating_provider(), 4);
    processor.process(&seasons[0]).await?;
    processor.process(&seasons[1]).await?;

    let matrix_path = temp_dir.path().join("all_categories.xlsx");
    let heatmap_path = temp_dir.path().join("heatmap.png");
    let result = report::build_cross_season_report(&seasons, "Sheet1", matrix_path.clone(), heatmap_path.clone())?;

    assert_eq!(result.skipped, vec!["Season 3".to_string()]);
    assert_eq!(result.heatmap_path, Some(heatmap_path.clone()));
    assert!(heatmap_path.is_file());
    assert_eq!(result.matrix.seasons(), &["Season 1", "Season 2"]);
    assert_eq!(result.matrix.get("event", "Season 1"), 1);
    assert_eq!(result.matrix.get("event", "Season 2"), 0);
    assert_eq!(result.matrix.get("joke", "Season 2"), 2);

    let (seasons_read, rows) = table::read_matrix_table(&matrix_path)?;
    assert_eq!(seasons_read, vec!["Season 1".to_string(), "Season 2".to_string()]);
    assert_eq!(rows, vec![("event".to_string(), vec![1, 0]), ("joke".to_string(), vec![0, 2])]);
    Ok(())
}

/// Test that a season with charts enabled gets a bar chart next to its table
#[tokio::test]
async fn test_process_season_withChartsEnabled_shouldWriteBarChart() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = season_dir(temp_dir.path(), "s1")?;
    common::create_test_subtitle(&dir, "e01.srt")?;

    let mut config = Config::default();
    config.processing.render_charts = true;
    let generator = AnnotationGenerator::new(
        Arc::new(common::annotating_provider()),
        CategoryVocabulary::default(),
        "Russian",
        AnnotationOptions::default(),
    );
    let processor = SeasonProcessor::new(generator, Box::new(HeuristicEstimator), &config).with_progress(false);

    let season = SeasonConfig::new(&dir, "Season 1");
    let report = processor.process(&season).await?;

    let chart_path = dir.join("s1_notes.png");
    assert_eq!(report.table_path, dir.join("s1_notes.xlsx"));
    assert_eq!(report.chart_path, Some(chart_path.clone()));
    assert!(chart_path.is_file());
    Ok(())
}

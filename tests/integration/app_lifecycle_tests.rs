/*!
 * Full pipeline tests through the application controller
 */

use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use subnotes::app_config::{Config, ProviderConfig, ProviderKind, SeasonConfig};
use subnotes::app_controller::Controller;
use subnotes::providers::mock::MockProvider;
use zip::write::SimpleFileOptions;

use crate::common;

fn write_archive(path: &Path, files: &[(&str, String)]) -> Result<()> {
    let mut writer = zip::ZipWriter::new(File::create(path)?);
    for (name, content) in files {
        writer.start_file(*name, SimpleFileOptions::default())?;
        writer.write_all(content.as_bytes())?;
    }
    writer.finish()?;
    Ok(())
}

fn pipeline_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.provider = ProviderConfig::new(ProviderKind::LMStudio);
    config.archives.source_dir = root.join("archives");
    config.archives.output_dir = root.join("extracted");
    config.archives.name_filter = "Show".to_string();
    config.processing.render_charts = false;
    config.report.matrix_path = root.join("all_categories.xlsx");
    config.report.heatmap_path = root.join("category_heatmap.png");
    config.seasons = vec![
        SeasonConfig::new(root.join("extracted/Show - season 1"), "Season 1"),
        SeasonConfig::new(root.join("extracted/Show - season 2"), "Season 2"),
    ];
    config
}

/// Test archive extraction, season annotation and aggregation in one run
#[tokio::test]
async fn test_run_all_withTwoSeasonArchives_shouldWriteEveryOutput() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("archives"))?;
    write_archive(
        &root.join("archives/Show - season 1.zip"),
        &[
            ("e01.srt", common::srt_content(&["TechCrunch Disrupt is happening", "Hello"])),
            ("e02.srt", common::srt_content(&["We went with middle-out compression"])),
        ],
    )?;
    write_archive(
        &root.join("archives/Show - season 2.zip"),
        &[("e01.srt", common::srt_content(&["Hello again"]))],
    )?;

    let provider = common::annotating_provider();
    let controller = Controller::with_config(pipeline_config(root))?
        .with_provider(Arc::new(provider.clone()))
        .with_progress(false);

    let report = controller.run_all().await?;

    assert!(root.join("extracted/Show - season 1/Show - season 1_notes.xlsx").is_file());
    assert!(root.join("extracted/Show - season 2/Show - season 2_notes.xlsx").is_file());
    assert!(root.join("all_categories.xlsx").is_file());
    assert!(report.skipped.is_empty());
    assert_eq!(report.matrix.get("event", "Season 1"), 1);
    assert_eq!(report.matrix.get("joke", "Season 1"), 1);
    assert_eq!(report.matrix.get("joke", "Season 2"), 0);
    // 4 lines, 2 of them classified
    assert_eq!(provider.request_count(), 6);
    Ok(())
}

/// Test annotating an ad-hoc folder that is not in the config
#[tokio::test]
async fn test_run_annotate_withFolderArgument_shouldNameSeasonAfterFolder() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let folder = temp_dir.path().join("pilot");
    std::fs::create_dir_all(&folder)?;
    common::create_test_subtitle(&folder, "pilot.srt")?;

    let mut config = pipeline_config(temp_dir.path());
    config.processing.percentage = 50.0;
    let controller = Controller::with_config(config)?
        .with_provider(Arc::new(common::annotating_provider()))
        .with_progress(false);

    let reports = controller.run_annotate(&[folder.clone()]).await?;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "pilot");
    // 3 lines at 50% keep the first one
    assert_eq!(reports[0].records.len(), 1);
    assert!(folder.join("pilot_notes.xlsx").is_file());
    Ok(())
}

/// Test that a failing provider still produces a complete season table
#[tokio::test]
async fn test_run_annotate_withFailingProvider_shouldRecordErrors() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let folder = temp_dir.path().join("s1");
    std::fs::create_dir_all(&folder)?;
    common::create_test_subtitle(&folder, "e01.srt")?;

    let controller = Controller::with_config(pipeline_config(temp_dir.path()))?
        .with_provider(Arc::new(MockProvider::failing()))
        .with_progress(false);

    let reports = controller.run_annotate(&[folder]).await?;
    assert_eq!(reports[0].records.len(), 3);
    assert_eq!(reports[0].failed_count(), 3);
    Ok(())
}

/// Test that the heatmap command skips seasons without tables
#[test]
fn test_run_heatmap_withoutTables_shouldWriteEmptyMatrix() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(pipeline_config(temp_dir.path()))?;

    let report = controller.run_heatmap()?;
    assert_eq!(report.skipped.len(), 2);
    assert!(report.matrix.is_empty());
    assert!(report.heatmap_path.is_none());
    assert!(temp_dir.path().join("all_categories.xlsx").is_file());
    Ok(())
}

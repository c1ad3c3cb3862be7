use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::annotation::AnnotationGenerator;
use crate::app_config::{Config, SeasonConfig};
use crate::archive::{ArchiveExtractor, ExtractionSummary};
use crate::file_utils::FileManager;
use crate::providers::{self, Provider};
use crate::report::{self, CrossSeasonReport};
use crate::season::{SeasonProcessor, SeasonReport};
use crate::tokens;

// @module: Application controller for the annotation pipeline

/// Runs the pipeline stages from a loaded configuration
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Provider used instead of the configured one
    provider: Option<Arc<dyn Provider>>,

    // @field: Show progress bars while annotating
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            provider: None,
            show_progress: true,
        })
    }

    /// Use an already constructed provider
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract subtitle archives into the configured output directory
    pub fn run_extract(&self) -> Result<ExtractionSummary> {
        let extractor = ArchiveExtractor::from_config(&self.config.archives);
        let summary = extractor.extract_all().context("Archive extraction failed")?;
        info!(
            "Extracted {} archive(s), {} failed",
            summary.extracted.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    /// Annotate the given season folders, or every configured season when empty.
    ///
    /// Seasons run one after another; the first season that cannot be
    /// processed stops the run.
    pub async fn run_annotate(&self, folders: &[PathBuf]) -> Result<Vec<SeasonReport>> {
        let seasons = self.seasons_for(folders);
        if seasons.is_empty() {
            return Err(anyhow!("No seasons to annotate: pass season folders or configure 'seasons'"));
        }

        let processor = self.season_processor().await?;
        let mut reports = Vec::with_capacity(seasons.len());

        for season in &seasons {
            let report = processor
                .process(season)
                .await
                .with_context(|| format!("Failed to process season '{}'", season.name))?;
            info!(
                "Season '{}': {} lines from {} file(s), {} noted, {} failed",
                report.name,
                report.records.len(),
                report.files_processed,
                report.noted_count(),
                report.failed_count()
            );
            reports.push(report);
        }

        Ok(reports)
    }

    /// Aggregate the configured season tables into the matrix and heatmap
    pub fn run_heatmap(&self) -> Result<CrossSeasonReport> {
        if self.config.seasons.is_empty() {
            return Err(anyhow!("No seasons configured for the cross-season report"));
        }

        let report = report::build_cross_season_report(
            &self.config.seasons,
            &self.config.processing.sheet_name,
            self.config.report.matrix_path.clone(),
            self.config.report.heatmap_path.clone(),
        )?;
        if !report.skipped.is_empty() {
            warn!("Skipped seasons without a readable table: {}", report.skipped.join(", "));
        }
        Ok(report)
    }

    /// Extract, annotate every configured season, then aggregate
    pub async fn run_all(&self) -> Result<CrossSeasonReport> {
        if FileManager::dir_exists(&self.config.archives.source_dir) {
            self.run_extract()?;
        } else {
            warn!(
                "Archive directory {:?} not found, skipping extraction",
                self.config.archives.source_dir
            );
        }

        let reports = self.run_annotate(&[]).await?;
        let total_tokens: u64 = reports.iter().map(|r| r.total_tokens).sum();
        let total_cost: f64 = reports.iter().map(|r| r.estimated_cost).sum();
        info!("Total tokens for all seasons: {}", total_tokens);
        info!("Total estimated cost: ${:.4}", total_cost);
        let reported: u64 = reports.iter().map(|r| r.reported_usage.total()).sum();
        if reported > 0 {
            info!("Total provider-reported tokens: {}", reported);
        }

        self.run_heatmap()
    }

    async fn season_processor(&self) -> Result<SeasonProcessor> {
        let provider = match &self.provider {
            Some(provider) => provider.clone(),
            None => providers::create_provider(&self.config.provider)?,
        };

        let model = self.config.provider.get_model();
        if let Err(e) = provider.test_connection(&model).await {
            warn!("Connection test for {} failed: {}", self.config.provider.kind, e);
        }

        let generator = AnnotationGenerator::from_config(provider, &self.config)?;
        let estimator = tokens::estimator_for_model(&model);
        Ok(SeasonProcessor::new(generator, estimator, &self.config).with_progress(self.show_progress))
    }

    /// Configured seasons, or ad-hoc seasons named after the given folders.
    ///
    /// A folder that matches a configured season keeps its name and output.
    fn seasons_for(&self, folders: &[PathBuf]) -> Vec<SeasonConfig> {
        if folders.is_empty() {
            return self.config.seasons.clone();
        }

        folders
            .iter()
            .map(|folder| {
                self.config
                    .seasons
                    .iter()
                    .find(|season| same_path(&season.folder, folder))
                    .cloned()
                    .unwrap_or_else(|| {
                        let name = folder
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| folder.display().to_string());
                        SeasonConfig::new(folder.clone(), name)
                    })
            })
            .collect()
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/*!
 * Season processing.
 *
 * A season folder holds `.srt` files. Every file is read in name order,
 * truncated to the configured percentage and token counted; the retained
 * lines are then annotated with bounded concurrency and written, in their
 * original order, to the season table next to an optional bar chart.
 */

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::annotation::{AnnotationGenerator, AnnotationRecord};
use crate::app_config::{Config, CostConfig, SeasonConfig};
use crate::file_utils::FileManager;
use crate::providers::TokenUsage;
use crate::report::{self, CategoryCounts};
use crate::subtitle_processor::SubtitleReader;
use crate::tokens::TokenEstimator;

/// Summary of one processed season
#[derive(Debug, Clone)]
pub struct SeasonReport {
    /// Season display name
    pub name: String,
    /// One record per retained line, in file then line order
    pub records: Vec<AnnotationRecord>,
    /// Number of subtitle files that contributed lines
    pub files_processed: usize,
    pub total_tokens: u64,
    pub estimated_cost: f64,
    /// Tokens the provider reported for this season's requests
    pub reported_usage: TokenUsage,
    pub table_path: PathBuf,
    /// Bar chart location, when one was rendered
    pub chart_path: Option<PathBuf>,
}

impl SeasonReport {
    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.annotation.is_failed()).count()
    }

    pub fn noted_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.annotation.is_failed() && !r.category().is_empty())
            .count()
    }
}

/// Lines gathered from a season folder before annotation
#[derive(Debug, Default)]
pub struct SeasonLines {
    pub lines: Vec<String>,
    pub total_tokens: u64,
    pub files_processed: usize,
}

/// Runs the annotation pipeline over season folders
pub struct SeasonProcessor {
    generator: AnnotationGenerator,
    estimator: Box<dyn TokenEstimator>,
    percentage: f64,
    concurrency: usize,
    sheet_name: String,
    render_charts: bool,
    cost: CostConfig,
    show_progress: bool,
}

impl SeasonProcessor {
    pub fn new(generator: AnnotationGenerator, estimator: Box<dyn TokenEstimator>, config: &Config) -> Self {
        Self {
            generator,
            estimator,
            percentage: config.processing.percentage,
            concurrency: config.annotation.concurrent_requests.max(1),
            sheet_name: config.processing.sheet_name.clone(),
            render_charts: config.processing.render_charts,
            cost: config.cost.clone(),
            show_progress: true,
        }
    }

    /// Disable the terminal progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Read every subtitle file of a folder.
    ///
    /// Unreadable files contribute nothing; a missing folder is an error.
    pub fn collect_lines(&self, folder: &Path) -> Result<SeasonLines> {
        let files = FileManager::find_files(folder, "srt")
            .with_context(|| format!("Failed to list subtitle files in {:?}", folder))?;
        if files.is_empty() {
            warn!("No subtitle files found in {:?}", folder);
        }

        let reader = SubtitleReader::new(self.estimator.as_ref(), self.percentage);
        let mut season = SeasonLines::default();

        for file in &files {
            let file_lines = reader.read(file);
            if file_lines.lines.is_empty() {
                continue;
            }
            info!("Counted {} tokens for file: {:?}", file_lines.total_tokens, file);
            season.total_tokens += file_lines.total_tokens;
            season.files_processed += 1;
            season.lines.extend(file_lines.lines);
        }

        Ok(season)
    }

    /// Annotate lines concurrently; the output keeps input order
    pub async fn annotate_lines(&self, lines: &[String]) -> Vec<AnnotationRecord> {
        let progress = self.progress_bar(lines.len() as u64);
        let generator = &self.generator;

        let mut results = stream::iter(lines.iter().enumerate())
            .map(|(index, line)| {
                let progress = progress.clone();
                async move {
                    let annotation = generator.annotate(line).await;
                    progress.inc(1);
                    (index, annotation)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        progress.finish_with_message("done");

        results.sort_by_key(|(index, _)| *index);
        results
            .into_iter()
            .map(|(index, annotation)| AnnotationRecord::new(lines[index].clone(), annotation))
            .collect()
    }

    /// Process one season folder into `output`
    pub async fn process_season(&self, name: &str, folder: &Path, output: &Path) -> Result<SeasonReport> {
        info!("Processing season '{}' from {:?}", name, folder);
        report::table::check_sheet_name(&self.sheet_name)?;

        let season = self.collect_lines(folder)?;
        let usage_before = self.generator.reported_usage();
        let records = self.annotate_lines(&season.lines).await;
        let reported_usage = self.generator.reported_usage().since(&usage_before);

        let estimated_cost = self.cost.estimate(season.total_tokens);
        info!("Total tokens for season '{}': {}", name, season.total_tokens);
        info!("Estimated cost: ${:.4}", estimated_cost);
        if reported_usage.total() > 0 {
            info!(
                "Provider reported {} prompt and {} completion tokens",
                reported_usage.prompt_tokens, reported_usage.completion_tokens
            );
        }

        report::table::write_season_table(&records, output, &self.sheet_name)?;
        info!("Season file saved to {:?}", output);

        let chart_path = if self.render_charts {
            let chart_path = FileManager::chart_path_for(output);
            match report::charts::render_category_bar_chart(&CategoryCounts::from_records(&records), &chart_path) {
                Ok(()) => {
                    info!("Bar chart saved to {:?}", chart_path);
                    Some(chart_path)
                }
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(SeasonReport {
            name: name.to_string(),
            records,
            files_processed: season.files_processed,
            total_tokens: season.total_tokens,
            estimated_cost,
            reported_usage,
            table_path: output.to_path_buf(),
            chart_path,
        })
    }

    /// Process a configured season, writing to its table path
    pub async fn process(&self, season: &SeasonConfig) -> Result<SeasonReport> {
        self.process_season(&season.name, &season.folder, &season.table_path()).await
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress_bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lines ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }
}

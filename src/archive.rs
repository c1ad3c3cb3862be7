/*!
 * Season archive extraction.
 *
 * Subtitle packs usually arrive as one zip per season. The extractor scans a
 * source directory (immediate entries only), picks the archives whose name
 * contains a filter substring, and unpacks each into
 * `<output>/<archive stem>/`. A corrupt archive is logged and skipped.
 */

use anyhow::{Context, Result};
use log::{error, info};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::app_config::ArchiveConfig;
use crate::file_utils::FileManager;

/// Outcome of one extraction run
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    /// Directories that received the contents of an archive
    pub extracted: Vec<PathBuf>,
    /// Archives that could not be extracted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Unpacks season archives
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    source_dir: PathBuf,
    output_dir: PathBuf,
    name_filter: String,
    extension: String,
}

impl ArchiveExtractor {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        name_filter: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            name_filter: name_filter.into(),
            extension: "zip".to_string(),
        }
    }

    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self::new(&config.source_dir, &config.output_dir, &config.name_filter)
            .with_extension(&config.extension)
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Whether a file name is an archive selected by the filter
    pub fn matches(&self, file_name: &str) -> bool {
        let suffix = format!(".{}", self.extension.to_lowercase());
        file_name.to_lowercase().ends_with(&suffix) && file_name.contains(&self.name_filter)
    }

    /// Extract every matching archive.
    ///
    /// Errors creating the destination or listing the source directory are
    /// returned; errors inside a single archive are recorded in the summary.
    pub fn extract_all(&self) -> Result<ExtractionSummary> {
        FileManager::ensure_dir(&self.output_dir)?;

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(&self.source_dir)
            .with_context(|| format!("Failed to list archive directory: {:?}", self.source_dir))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| self.matches(&name.to_string_lossy()))
            })
            .collect();
        candidates.sort();

        let mut summary = ExtractionSummary::default();
        for archive_path in candidates {
            let target = self.target_dir(&archive_path);
            match Self::extract_one(&archive_path, &target) {
                Ok(()) => {
                    info!("Extracted: {:?} -> {:?}", archive_path, target);
                    summary.extracted.push(target);
                }
                Err(e) => {
                    error!("Failed to extract {:?}: {:#}", archive_path, e);
                    summary.failed.push((archive_path, format!("{:#}", e)));
                }
            }
        }

        Ok(summary)
    }

    // @returns: `<output>/<archive stem>`
    fn target_dir(&self, archive_path: &Path) -> PathBuf {
        let stem = archive_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        self.output_dir.join(stem)
    }

    fn extract_one(archive_path: &Path, target: &Path) -> Result<()> {
        let file = File::open(archive_path)
            .with_context(|| format!("Failed to open archive: {:?}", archive_path))?;
        let mut archive = zip::ZipArchive::new(file).context("Not a readable zip archive")?;
        FileManager::ensure_dir(target)?;
        archive.extract(target).context("Failed to unpack archive")?;
        Ok(())
    }
}

/*!
 * Category statistics across seasons.
 *
 * - `CategoryCounts`: frequency of each category label within one season
 * - `CategoryCountMatrix`: categories x seasons, zero-filled
 * - `table`: season result tables and the matrix spreadsheet
 * - `charts`: bar chart and heatmap images
 */

pub mod charts;
pub mod table;

use log::{error, info, warn};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::annotation::AnnotationRecord;
use crate::app_config::SeasonConfig;
use crate::errors::ReportError;

/// Category frequencies of one season.
///
/// Ordered by descending count, ties by first appearance. Empty labels are
/// not counted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCounts {
    entries: Vec<(String, usize)>,
}

impl CategoryCounts {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<(String, usize)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                continue;
            }
            match positions.get(label) {
                Some(&index) => entries[index].1 += 1,
                None => {
                    positions.insert(label.to_string(), entries.len());
                    entries.push((label.to_string(), 1));
                }
            }
        }

        // Stable sort keeps first-appearance order among equal counts
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn from_records(records: &[AnnotationRecord]) -> Self {
        Self::from_labels(records.iter().map(|r| r.category()))
    }

    pub fn get(&self, category: &str) -> usize {
        self.entries
            .iter()
            .find(|(label, _)| label == category)
            .map_or(0, |(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

/// Categories (rows) by seasons (columns), every cell present
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCountMatrix {
    categories: Vec<String>,
    seasons: Vec<String>,
    // counts[row][column]
    counts: Vec<Vec<usize>>,
}

impl CategoryCountMatrix {
    /// Assemble from per-season counts.
    ///
    /// Rows follow first appearance across seasons in order; a repeated
    /// season name adds into its existing column.
    pub fn from_season_counts<I>(seasons: I) -> Self
    where
        I: IntoIterator<Item = (String, CategoryCounts)>,
    {
        let mut matrix = Self::default();

        for (season, counts) in seasons {
            let column = match matrix.seasons.iter().position(|s| *s == season) {
                Some(column) => {
                    warn!("Season '{}' appears more than once, merging its counts", season);
                    column
                }
                None => {
                    matrix.seasons.push(season);
                    for row in matrix.counts.iter_mut() {
                        row.push(0);
                    }
                    matrix.seasons.len() - 1
                }
            };

            for (category, count) in counts.iter() {
                let row = match matrix.categories.iter().position(|c| c == category) {
                    Some(row) => row,
                    None => {
                        matrix.categories.push(category.to_string());
                        matrix.counts.push(vec![0; matrix.seasons.len()]);
                        matrix.categories.len() - 1
                    }
                };
                matrix.counts[row][column] += count;
            }
        }

        matrix
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn seasons(&self) -> &[String] {
        &self.seasons
    }

    /// Count for a category in a season; 0 for any missing combination
    pub fn get(&self, category: &str, season: &str) -> usize {
        let row = self.categories.iter().position(|c| c == category);
        let column = self.seasons.iter().position(|s| s == season);
        match (row, column) {
            (Some(row), Some(column)) => self.counts[row][column],
            _ => 0,
        }
    }

    /// Row of counts for a category index
    pub fn row(&self, index: usize) -> &[usize] {
        &self.counts[index]
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() || self.seasons.is_empty()
    }
}

/// Outputs of the cross-season aggregation
#[derive(Debug)]
pub struct CrossSeasonReport {
    pub matrix: CategoryCountMatrix,
    pub matrix_path: PathBuf,
    pub heatmap_path: Option<PathBuf>,
    /// Seasons left out because their table could not be read
    pub skipped: Vec<String>,
}

/// Read every season table and count categories.
///
/// Unreadable tables are logged and left out; they are returned by name.
pub fn collect_season_counts(seasons: &[SeasonConfig], sheet_name: &str) -> (Vec<(String, CategoryCounts)>, Vec<String>) {
    let mut counts = Vec::new();
    let mut skipped = Vec::new();

    for season in seasons {
        let path = season.table_path();
        match table::read_category_column(&path, sheet_name) {
            Ok(labels) => counts.push((season.name.clone(), CategoryCounts::from_labels(labels))),
            Err(e) => {
                error!("Error reading file {:?}: {}", path, e);
                skipped.push(season.name.clone());
            }
        }
    }

    (counts, skipped)
}

/// Build the cross-season matrix, save it as a spreadsheet and a heatmap.
///
/// A failure to write the spreadsheet is returned. A heatmap failure is
/// logged and reported as a missing image.
pub fn build_cross_season_report(
    seasons: &[SeasonConfig],
    sheet_name: &str,
    matrix_path: PathBuf,
    heatmap_path: PathBuf,
) -> Result<CrossSeasonReport, ReportError> {
    let (counts, skipped) = collect_season_counts(seasons, sheet_name);
    let matrix = CategoryCountMatrix::from_season_counts(counts);

    table::write_matrix_table(&matrix, &matrix_path)?;
    info!("All categories saved to {:?}", matrix_path);

    let heatmap_path = if matrix.is_empty() {
        warn!("No category counts to plot, skipping heatmap");
        None
    } else {
        match charts::render_heatmap(&matrix, &heatmap_path) {
            Ok(()) => {
                info!("Heatmap saved to {:?}", heatmap_path);
                Some(heatmap_path)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    };

    Ok(CrossSeasonReport {
        matrix,
        matrix_path,
        heatmap_path,
        skipped,
    })
}

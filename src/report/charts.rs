/*!
 * Chart rendering with plotters.
 *
 * Both charts use continuous axes with one unit per bar or cell and tick
 * marks pinned to the cell centres, so every slot on an axis holds data.
 */

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

use super::{CategoryCountMatrix, CategoryCounts};
use crate::errors::ReportError;
use crate::file_utils::FileManager;

const BAR_CHART_SIZE: (u32, u32) = (1000, 650);
const HEATMAP_SIZE: (u32, u32) = (1200, 800);
const FONT: &str = "sans-serif";
const BAR_MARGIN: f64 = 0.12;

fn chart_error(path: &Path, e: impl std::fmt::Display) -> ReportError {
    ReportError::Chart {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Centre of every unit slot in `0..slots`
fn slot_centers(slots: usize) -> Vec<f64> {
    (0..slots).map(|slot| slot as f64 + 0.5).collect()
}

/// Slot index for an axis value, `None` outside `0..slots`
fn slot_of(value: f64, slots: usize) -> Option<usize> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let slot = value.floor() as usize;
    (slot < slots).then_some(slot)
}

/// Bar chart of category frequencies in one season
pub fn render_category_bar_chart(counts: &CategoryCounts, path: &Path) -> Result<(), ReportError> {
    FileManager::ensure_parent_dir(path).map_err(|e| chart_error(path, e))?;

    let labels: Vec<String> = counts.iter().map(|(label, _)| label.to_string()).collect();
    let bars = labels.len().max(1);
    let max = counts.iter().map(|(_, count)| count).max().unwrap_or(0);
    let top = max + max / 10 + 1;

    let root = BitMapBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_error(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of Cultural Note Categories", (FONT, 26))
        .margin(20)
        .x_label_area_size(150)
        .y_label_area_size(60)
        .build_cartesian_2d((0f64..bars as f64).with_key_points(slot_centers(bars)), 0usize..top)
        .map_err(|e| chart_error(path, e))?;

    let label_formatter = |value: &f64| {
        slot_of(*value, labels.len())
            .map(|slot| labels[slot].clone())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Category")
        .y_desc("Count")
        .x_label_formatter(&label_formatter)
        .x_label_style((FONT, 13).into_font().transform(FontTransform::Rotate90))
        .draw()
        .map_err(|e| chart_error(path, e))?;

    let bar_style = RGBColor(70, 130, 180).filled();
    chart
        .draw_series(counts.iter().enumerate().map(|(index, (_, count))| {
            let left = index as f64;
            Rectangle::new([(left + BAR_MARGIN, 0), (left + 1.0 - BAR_MARGIN, count)], bar_style)
        }))
        .map_err(|e| chart_error(path, e))?;

    chart
        .draw_series(counts.iter().enumerate().map(|(index, (_, count))| {
            EmptyElement::at((index as f64 + 0.5, count))
                + Text::new(count.to_string(), (-6, -18), (FONT, 14).into_font())
        }))
        .map_err(|e| chart_error(path, e))?;

    root.present().map_err(|e| chart_error(path, e))
}

/// Colour for a heatmap cell, from pale yellow (0.0) through teal to navy (1.0)
pub fn heat_color(intensity: f64) -> RGBColor {
    const STOPS: [(f64, (u8, u8, u8)); 3] = [(0.0, (255, 255, 217)), (0.5, (65, 182, 196)), (1.0, (8, 29, 88))];

    let t = if intensity.is_finite() { intensity.clamp(0.0, 1.0) } else { 0.0 };
    let ((from, (r0, g0, b0)), (to, (r1, g1, b1))) =
        if t <= STOPS[1].0 { (STOPS[0], STOPS[1]) } else { (STOPS[1], STOPS[2]) };
    let span = (t - from) / (to - from);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * span).round() as u8;

    RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

/// Annotated heatmap of the category x season matrix.
///
/// The first category is drawn on the top row.
pub fn render_heatmap(matrix: &CategoryCountMatrix, path: &Path) -> Result<(), ReportError> {
    if matrix.is_empty() {
        return Err(chart_error(path, "no categories to plot"));
    }
    FileManager::ensure_parent_dir(path).map_err(|e| chart_error(path, e))?;

    let seasons = matrix.seasons();
    let categories = matrix.categories();
    let columns = seasons.len().max(1);
    let rows = categories.len();
    let max = matrix.max_count().max(1) as f64;

    let root = BitMapBackend::new(path, HEATMAP_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_error(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Category Distribution Heatmap", (FONT, 26))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(170)
        .build_cartesian_2d(
            (0f64..columns as f64).with_key_points(slot_centers(columns)),
            (0f64..rows as f64).with_key_points(slot_centers(rows)),
        )
        .map_err(|e| chart_error(path, e))?;

    let x_formatter = |value: &f64| {
        slot_of(*value, seasons.len())
            .map(|slot| seasons[slot].clone())
            .unwrap_or_default()
    };
    let y_formatter = |value: &f64| {
        slot_of(*value, rows)
            .map(|position| categories[rows - 1 - position].clone())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Season")
        .y_desc("Category")
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .label_style((FONT, 14))
        .draw()
        .map_err(|e| chart_error(path, e))?;

    let cells: Vec<(f64, f64, usize)> = (0..rows)
        .flat_map(|row| {
            matrix
                .row(row)
                .iter()
                .enumerate()
                .map(move |(column, count)| (column as f64, (rows - 1 - row) as f64, *count))
        })
        .collect();

    chart
        .draw_series(cells.iter().map(|&(column, position, count)| {
            Rectangle::new(
                [(column, position), (column + 1.0, position + 1.0)],
                heat_color(count as f64 / max).filled(),
            )
        }))
        .map_err(|e| chart_error(path, e))?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    chart
        .draw_series(cells.iter().map(|&(column, position, count)| {
            let color: &'static RGBColor = if (count as f64 / max) > 0.6 { &WHITE } else { &BLACK };
            Text::new(
                count.to_string(),
                (column + 0.5, position + 0.5),
                TextStyle::from((FONT, 16).into_font()).pos(centered).color(color),
            )
        }))
        .map_err(|e| chart_error(path, e))?;

    root.present().map_err(|e| chart_error(path, e))
}

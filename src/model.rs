//! Bar/segment model built from the host matrix.
//!
//! Extraction walks the first level of both hierarchies into raw bars; the
//! builder then derives totals, percentages and width fractions. A model is
//! rebuilt from scratch on every update and never patched.

use std::collections::HashMap;

use log::{debug, trace};

use crate::dataview::DataView;
use crate::host::{ColorPalette, SelectionId, SelectionIdBuilder};

/// Fallback series palette, cycled by column index when the host has none.
pub const DEFAULT_COLORS: [&str; 15] = [
    "#01B8AA", "#374649", "#FD625E", "#F2C80F", "#5F6B6D", "#8AD4EB", "#FE9666", "#A66999",
    "#3599B8", "#DFBFBF", "#4AC5BB", "#5F6B6D", "#FB8281", "#F4D25A", "#7F898A",
];

const MISSING_SERIES_COLOR: &str = "#999999";

#[derive(Debug, Clone)]
pub struct Segment {
    pub series_name: String,
    pub absolute_value: f64,
    pub percent_of_bar: f64,
    pub percent_of_total: f64,
    pub color: String,
    pub selection_id: Option<SelectionId>,
}

#[derive(Debug, Clone)]
pub struct Bar {
    pub category_name: String,
    pub bar_total: f64,
    pub bar_percent_of_total: f64,
    pub bar_width_fraction: f64,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    pub bars: Vec<Bar>,
    /// Legend order: first-seen column order.
    pub series_names: Vec<String>,
    pub series_colors: HashMap<String, String>,
    pub grand_total: f64,
    pub has_data: bool,
}

/// A segment before percentages are known.
#[derive(Debug, Clone)]
pub struct RawSegment {
    pub series_name: String,
    pub value: f64,
    pub selection_id: Option<SelectionId>,
}

#[derive(Debug, Clone)]
pub struct RawBar {
    pub category_name: String,
    pub segments: Vec<RawSegment>,
}

impl Model {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn color_of(&self, series_name: &str) -> &str {
        self.series_colors
            .get(series_name)
            .map(String::as_str)
            .unwrap_or(MISSING_SERIES_COLOR)
    }

    /// Derive totals and percentages from raw bars.
    ///
    /// The grand total is the signed sum of every segment, so negative inputs
    /// can push percentages outside `[0, 1]`. A non-positive grand total makes
    /// every percent-of-total zero and every bar equally wide.
    pub fn from_raw(
        raw_bars: Vec<RawBar>,
        series_names: Vec<String>,
        series_colors: HashMap<String, String>,
    ) -> Self {
        let grand_total: f64 = raw_bars
            .iter()
            .flat_map(|bar| bar.segments.iter())
            .map(|segment| segment.value)
            .sum();
        let bar_count = raw_bars.len();

        let bars: Vec<Bar> = raw_bars
            .into_iter()
            .map(|raw| {
                let bar_total: f64 = raw.segments.iter().map(|segment| segment.value).sum();
                let segments = raw
                    .segments
                    .into_iter()
                    .map(|segment| Segment {
                        color: series_colors
                            .get(&segment.series_name)
                            .cloned()
                            .unwrap_or_else(|| MISSING_SERIES_COLOR.to_string()),
                        percent_of_bar: ratio(segment.value, bar_total),
                        percent_of_total: ratio(segment.value, grand_total),
                        absolute_value: segment.value,
                        series_name: segment.series_name,
                        selection_id: segment.selection_id,
                    })
                    .collect();
                Bar {
                    category_name: raw.category_name,
                    bar_total,
                    bar_percent_of_total: ratio(bar_total, grand_total),
                    bar_width_fraction: if grand_total > 0.0 {
                        bar_total / grand_total
                    } else {
                        1.0 / bar_count as f64
                    },
                    segments,
                }
            })
            .collect();

        Self {
            has_data: !bars.is_empty(),
            bars,
            series_names,
            series_colors,
            grand_total,
        }
    }

    /// Strip percentages back off, e.g. to regroup bars before rebuilding.
    pub fn to_raw(&self) -> Vec<RawBar> {
        self.bars
            .iter()
            .map(|bar| RawBar {
                category_name: bar.category_name.clone(),
                segments: bar
                    .segments
                    .iter()
                    .map(|segment| RawSegment {
                        series_name: segment.series_name.clone(),
                        value: segment.absolute_value,
                        selection_id: segment.selection_id.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}

/// `value / total`, defined as exactly 0 when the total is not positive.
pub fn ratio(value: f64, total: f64) -> f64 {
    if total > 0.0 { value / total } else { 0.0 }
}

/// Build the model for one update. Absent or row-less input yields the empty
/// model; this never fails.
pub fn build_model(
    data_view: Option<&DataView>,
    palette: Option<&dyn ColorPalette>,
    identities: Option<&dyn SelectionIdBuilder>,
) -> Model {
    let Some(view) = data_view else {
        debug!("no data view supplied; using empty model");
        return Model::empty();
    };
    let rows = view.category_rows();
    if rows.is_empty() {
        debug!("data view has no category rows; using empty model");
        return Model::empty();
    }

    // One name per column for the segments; the legend keeps each name once.
    let mut column_names = Vec::new();
    let mut series_names = Vec::new();
    let mut series_colors = HashMap::new();
    for (column_index, column) in view.series_columns().iter().enumerate() {
        let name = column
            .display_value()
            .unwrap_or_else(|| format!("Series {column_index}"));
        if !series_colors.contains_key(&name) {
            let color = match palette {
                Some(palette) => palette.get_color(&name),
                None => DEFAULT_COLORS[column_index % DEFAULT_COLORS.len()].to_string(),
            };
            series_colors.insert(name.clone(), color);
            series_names.push(name.clone());
        }
        column_names.push(name);
    }

    let mut raw_bars = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        let category_name = row.display_value().unwrap_or_default();
        let mut segments = Vec::with_capacity(column_names.len());
        if !row.values.is_empty() {
            for (column_index, series_name) in column_names.iter().enumerate() {
                let selection_id = identities.and_then(|builder| {
                    builder
                        .create_for_row(row, row_index, column_index)
                        .map_err(|err| trace!("segment {row_index}/{column_index}: {err}"))
                        .ok()
                });
                segments.push(RawSegment {
                    series_name: series_name.clone(),
                    value: row.numeric_value(column_index),
                    selection_id,
                });
            }
        }
        raw_bars.push(RawBar {
            category_name,
            segments,
        });
    }

    debug!(
        "extracted {} bars across {} series",
        raw_bars.len(),
        series_names.len()
    );
    Model::from_raw(raw_bars, series_names, series_colors)
}

//! Top-N category truncation with an optional "Other" bucket.

use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;

use crate::model::{Model, RawBar, RawSegment};
use crate::settings::{SortByMode, TopNSettings};

/// Index reserved for the synthetic "Other" category; no real category uses it.
pub const OTHER_CATEGORY_INDEX: usize = usize::MAX;

#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryData {
    pub category: String,
    pub category_index: usize,
    pub width_value: f64,
    pub total_value: f64,
    pub custom_sort_value: Option<SortKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopNResult {
    pub top_categories: Vec<CategoryData>,
    pub other_category: Option<CategoryData>,
    pub should_show_other: bool,
}

impl CategoryData {
    pub fn is_other(&self) -> bool {
        self.category_index == OTHER_CATEGORY_INDEX
    }
}

/// Stable sort; ties keep their input order.
pub fn sort_categories(categories: &[CategoryData], mode: SortByMode) -> Vec<CategoryData> {
    let mut sorted = categories.to_vec();
    match mode {
        SortByMode::WidthValue => sorted.sort_by(|a, b| {
            b.width_value
                .partial_cmp(&a.width_value)
                .unwrap_or(Ordering::Equal)
        }),
        SortByMode::Alphabetical => sorted.sort_by(|a, b| {
            a.category
                .to_lowercase()
                .cmp(&b.category.to_lowercase())
                .then_with(|| a.category.cmp(&b.category))
        }),
        SortByMode::Custom => sorted.sort_by(|a, b| {
            match (&a.custom_sort_value, &b.custom_sort_value) {
                (Some(SortKey::Number(x)), Some(SortKey::Number(y))) => {
                    x.partial_cmp(y).unwrap_or(Ordering::Equal)
                }
                (Some(x), Some(y)) => sort_key_text(x).cmp(&sort_key_text(y)),
                _ => Ordering::Equal,
            }
        }),
    }
    sorted
}

fn sort_key_text(key: &SortKey) -> String {
    match key {
        SortKey::Number(value) => value.to_string(),
        SortKey::Text(text) => text.clone(),
    }
}

/// Keep the first `top_n` categories and fold the tail into "Other".
pub fn apply_top_n(
    categories: &[CategoryData],
    top_n: usize,
    show_other: bool,
    other_label: &str,
) -> TopNResult {
    if categories.len() <= top_n {
        return TopNResult {
            top_categories: categories.to_vec(),
            other_category: None,
            should_show_other: false,
        };
    }

    let (top, remaining) = categories.split_at(top_n);
    if !show_other || remaining.is_empty() {
        return TopNResult {
            top_categories: top.to_vec(),
            other_category: None,
            should_show_other: false,
        };
    }

    let other = CategoryData {
        category: other_label.to_string(),
        category_index: OTHER_CATEGORY_INDEX,
        width_value: remaining.iter().map(|category| category.width_value).sum(),
        total_value: remaining.iter().map(|category| category.total_value).sum(),
        custom_sort_value: None,
    };
    TopNResult {
        top_categories: top.to_vec(),
        other_category: Some(other),
        should_show_other: true,
    }
}

/// Clamp to `[1, total_categories]` and drop any fraction.
pub fn validate_top_n_settings(top_n: f64, total_categories: usize) -> usize {
    if top_n < 1.0 {
        1
    } else if top_n > total_categories as f64 {
        total_categories
    } else {
        top_n.floor() as usize
    }
}

pub fn should_apply_top_n(enabled: bool, top_n: f64, total_categories: usize) -> bool {
    enabled && top_n > 0.0 && top_n < total_categories as f64
}

pub fn category_data(model: &Model) -> Vec<CategoryData> {
    model
        .bars
        .iter()
        .enumerate()
        .map(|(index, bar)| CategoryData {
            category: bar.category_name.clone(),
            category_index: index,
            width_value: bar.bar_total,
            total_value: bar.bar_total,
            custom_sort_value: None,
        })
        .collect()
}

/// Rebuild the model keeping only the top categories, plus "Other" when asked.
///
/// The "Other" bar sums the dropped bars series by series and carries no
/// selection identity. Totals and percentages are recomputed over the result.
pub fn apply_top_n_to_model(model: Model, settings: &TopNSettings) -> Model {
    let bar_count = model.bars.len();
    if !should_apply_top_n(settings.enabled, settings.count, bar_count) {
        return model;
    }
    let top_n = validate_top_n_settings(settings.count, bar_count);
    let sorted = sort_categories(&category_data(&model), settings.sort_by);
    let result = apply_top_n(&sorted, top_n, settings.show_other, &settings.other_label);
    debug!(
        "top-n kept {} of {} categories (other: {})",
        result.top_categories.len(),
        bar_count,
        result.should_show_other
    );

    let mut raw = model.to_raw();
    let mut bars: Vec<RawBar> = result
        .top_categories
        .iter()
        .map(|category| std::mem::replace(&mut raw[category.category_index], empty_bar()))
        .collect();

    if let Some(other) = &result.other_category {
        let kept: Vec<usize> = result
            .top_categories
            .iter()
            .map(|category| category.category_index)
            .collect();
        let mut sums: HashMap<&str, f64> = HashMap::new();
        for (index, bar) in model.bars.iter().enumerate() {
            if kept.contains(&index) {
                continue;
            }
            for segment in &bar.segments {
                *sums.entry(segment.series_name.as_str()).or_insert(0.0) += segment.absolute_value;
            }
        }
        let segments = model
            .series_names
            .iter()
            .filter_map(|name| {
                sums.get(name.as_str()).map(|value| RawSegment {
                    series_name: name.clone(),
                    value: *value,
                    selection_id: None,
                })
            })
            .collect();
        bars.push(RawBar {
            category_name: other.category.clone(),
            segments,
        });
    }

    Model::from_raw(bars, model.series_names, model.series_colors)
}

fn empty_bar() -> RawBar {
    RawBar {
        category_name: String::new(),
        segments: Vec::new(),
    }
}

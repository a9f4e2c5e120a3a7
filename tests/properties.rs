use std::collections::HashMap;

use mekko_renderer::config::LayoutConfig;
use mekko_renderer::format::{DisplayUnits, LabelContentMode, format_percent};
use mekko_renderer::layout::bar_widths;
use mekko_renderer::layout::text::wrap_text;
use mekko_renderer::model::{Model, RawBar, RawSegment, ratio};
use mekko_renderer::settings::{LabelPosition, LegendPosition, Settings, SortByMode};
use mekko_renderer::text_metrics::FixedAdvanceMeasurer;
use mekko_renderer::topn::{CategoryData, apply_top_n, sort_categories};
use proptest::prelude::*;

fn model_from(values: &[Vec<f64>]) -> Model {
    let series = values.iter().map(Vec::len).max().unwrap_or(0);
    let series_names: Vec<String> = (0..series).map(|s| format!("S{s}")).collect();
    let raw = values
        .iter()
        .enumerate()
        .map(|(c, row)| RawBar {
            category_name: format!("C{c}"),
            segments: row
                .iter()
                .enumerate()
                .map(|(s, value)| RawSegment {
                    series_name: format!("S{s}"),
                    value: *value,
                    selection_id: None,
                })
                .collect(),
        })
        .collect();
    Model::from_raw(raw, series_names, HashMap::new())
}

fn categories_from(widths: &[f64]) -> Vec<CategoryData> {
    widths
        .iter()
        .enumerate()
        .map(|(index, width)| CategoryData {
            category: format!("C{index}"),
            category_index: index,
            width_value: *width,
            total_value: *width,
            custom_sort_value: None,
        })
        .collect()
}

fn non_whitespace(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

proptest! {
    #[test]
    fn prop_segment_percents_fill_each_bar(
        values in prop::collection::vec(prop::collection::vec(0.5f64..1000.0, 1..6), 1..8)
    ) {
        let model = model_from(&values);
        for bar in &model.bars {
            let sum: f64 = bar.segments.iter().map(|segment| segment.percent_of_bar).sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
        let widths: f64 = model.bars.iter().map(|bar| bar.bar_width_fraction).sum();
        prop_assert!((widths - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prop_ratio_against_non_positive_total_is_zero(value in -1e6f64..1e6, total in -1e6f64..=0.0) {
        prop_assert_eq!(ratio(value, total), 0.0);
    }

    #[test]
    fn prop_zero_valued_bars_have_zero_percentages(series in 1usize..6, bars in 1usize..6) {
        let model = model_from(&vec![vec![0.0; series]; bars]);
        for bar in &model.bars {
            prop_assert_eq!(bar.bar_percent_of_total, 0.0);
            for segment in &bar.segments {
                prop_assert_eq!(segment.percent_of_bar, 0.0);
                prop_assert_eq!(segment.percent_of_total, 0.0);
            }
        }
    }

    #[test]
    fn prop_bar_widths_respect_the_floor(
        values in prop::collection::vec(prop::collection::vec(0.0f64..1000.0, 1..4), 1..12),
        available in 10.0f32..2000.0
    ) {
        let config = LayoutConfig::default();
        let model = model_from(&values);
        for width in bar_widths(&model, available, &config) {
            prop_assert!(width >= config.min_bar_width);
        }
    }

    #[test]
    fn prop_wrapped_lines_fit_and_keep_text(
        text in "[a-zA-Z0-9|() ]{0,60}",
        max_width in 6.0f32..200.0
    ) {
        let measurer = FixedAdvanceMeasurer { advance_em: 0.5 };
        let font_size = 10.0;
        if let Some(lines) = wrap_text(&text, max_width, font_size, &measurer) {
            for line in &lines {
                prop_assert!(line.chars().count() as f32 * 5.0 <= max_width);
            }
            prop_assert_eq!(non_whitespace(&lines.concat()), non_whitespace(&text));
        }
    }

    #[test]
    fn prop_settings_survive_the_property_bag(
        show_labels in any::<bool>(),
        decimal_places in 0u32..5,
        font_size in 6u32..30,
        position in prop::sample::select(vec![
            LegendPosition::Top,
            LegendPosition::Bottom,
            LegendPosition::Left,
            LegendPosition::Right,
        ]),
        label_position in prop::sample::select(vec![
            LabelPosition::Inside,
            LabelPosition::Outside,
            LabelPosition::Centered,
        ]),
        mode in prop::sample::select(vec![
            LabelContentMode::Amount,
            LabelContentMode::PercentWithinBar,
            LabelContentMode::CategoryAmountAndPercent,
        ]),
        units in prop::sample::select(vec![DisplayUnits::Auto, DisplayUnits::Thousands, DisplayUnits::None]),
        sort_by in prop::sample::select(vec![SortByMode::WidthValue, SortByMode::Alphabetical, SortByMode::Custom]),
        count in 1u32..50
    ) {
        let mut settings = Settings::default();
        settings.segment_labels.show = show_labels;
        settings.segment_labels.decimal_places = decimal_places;
        settings.segment_labels.label_position = label_position;
        settings.segment_labels.label_content_mode = mode;
        settings.bar_totals.display_units = units;
        settings.legend.position = position;
        settings.legend.font_size = font_size as f64;
        settings.top_n.count = count as f64;
        settings.top_n.sort_by = sort_by;
        let bag = settings.to_property_bag();
        prop_assert_eq!(Settings::resolve(Some(&bag)), settings);
    }

    #[test]
    fn prop_top_n_preserves_total_width(
        widths in prop::collection::vec(0.0f64..500.0, 1..20),
        top_n in 1usize..20
    ) {
        let categories = categories_from(&widths);
        let sorted = sort_categories(&categories, SortByMode::WidthValue);
        let result = apply_top_n(&sorted, top_n, true, "Other");
        prop_assert_eq!(result.top_categories.len(), top_n.min(widths.len()));
        let kept: f64 = result.top_categories.iter().map(|c| c.width_value).sum();
        let other = result.other_category.as_ref().map_or(0.0, |c| c.width_value);
        let total: f64 = widths.iter().sum();
        prop_assert!((kept + other - total).abs() < 1e-6);
        prop_assert_eq!(result.should_show_other, widths.len() > top_n);
    }

    #[test]
    fn prop_width_sort_is_descending(widths in prop::collection::vec(0.0f64..500.0, 0..20)) {
        let sorted = sort_categories(&categories_from(&widths), SortByMode::WidthValue);
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].width_value >= pair[1].width_value);
        }
    }
}

#[test]
fn percent_formatting_examples() {
    assert_eq!(format_percent(0.25, 0), "25%");
    assert_eq!(format_percent(0.1234, 2), "12.34%");
    assert_eq!(format_percent(0.0, 1), "0.0%");
}

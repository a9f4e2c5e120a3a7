//! Pixel geometry for one update.
//!
//! The layout is a pure function of the model, the resolved settings and the
//! viewport. Every update computes it from scratch.

mod bars;
mod legend;
pub mod text;
mod types;

pub use bars::bar_widths;
pub use legend::{flow_items, legend_height, legend_item_width};
pub use types::*;

use log::debug;

use crate::config::LayoutConfig;
use crate::model::Model;
use crate::settings::{LegendPosition, Settings};
use crate::text_metrics::TextMeasurer;
use crate::theme::Theme;

use bars::{BarContext, layout_bars};
use legend::layout_legend;
use text::{pt_to_px, single_line_block};

pub fn compute_layout(
    model: &Model,
    settings: &Settings,
    theme: &Theme,
    config: &LayoutConfig,
    width: f32,
    height: f32,
    measurer: &dyn TextMeasurer,
) -> Layout {
    let content = if model.has_data {
        chart_content(model, settings, theme, config, width, height, measurer)
    } else {
        placeholder_content(theme, config, width, height, measurer)
    };
    Layout {
        width,
        height,
        content,
    }
}

fn placeholder_content(
    theme: &Theme,
    config: &LayoutConfig,
    width: f32,
    height: f32,
    measurer: &dyn TextMeasurer,
) -> LayoutContent {
    let font_size = pt_to_px(f64::from(config.placeholder_font_size));
    LayoutContent::Placeholder {
        label: LabelLayout {
            x: width / 2.0,
            first_line_y: height / 2.0,
            block: single_line_block(
                &config.placeholder_text,
                font_size,
                config.label_line_height,
                measurer,
            ),
            font_size,
            line_height: font_size * config.label_line_height,
            color: theme.placeholder_color.clone(),
            anchor: TextAnchor::Middle,
            baseline: Baseline::Central,
            bold: false,
        },
    }
}

fn chart_content(
    model: &Model,
    settings: &Settings,
    theme: &Theme,
    config: &LayoutConfig,
    width: f32,
    height: f32,
    measurer: &dyn TextMeasurer,
) -> LayoutContent {
    let mut left = config.margin_left;
    let mut right = width - config.margin_right;
    let mut top = config.margin_top;
    let mut bottom = height - config.margin_bottom;

    let legend_band = legend_height(model, &settings.legend, &config.legend, right - left);
    let legend_bounds = (legend_band > 0.0).then(|| match settings.legend.position {
        LegendPosition::Top => {
            top += legend_band;
            Rect {
                x: left,
                y: 0.0,
                width: right - left,
                height: legend_band,
            }
        }
        LegendPosition::Bottom => {
            bottom -= legend_band;
            Rect {
                x: left,
                y: height - legend_band,
                width: right - left,
                height: legend_band,
            }
        }
        LegendPosition::Left => {
            let band = Rect {
                x: left,
                y: config.margin_top,
                width: config.legend.side_width,
                height: legend_band,
            };
            left += config.legend.side_width;
            band
        }
        LegendPosition::Right => {
            right -= config.legend.side_width;
            Rect {
                x: right + config.margin_right,
                y: config.margin_top,
                width: config.legend.side_width - config.margin_right,
                height: legend_band,
            }
        }
    });

    let plot = Rect {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    };
    if plot.width <= 0.0 || plot.height <= 0.0 {
        debug!(
            "viewport {width}x{height} leaves no plot area ({}x{}); skipping render",
            plot.width, plot.height
        );
        return LayoutContent::Blank;
    }

    let legend = legend_bounds.map(|bounds| {
        layout_legend(model, &settings.legend, theme, &config.legend, bounds, measurer)
    });
    let bars = layout_bars(&BarContext {
        model,
        settings,
        config,
        measurer,
        plot,
    });
    debug!(
        "laid out {} bars in {}x{} plot at ({}, {})",
        bars.len(),
        plot.width,
        plot.height,
        plot.x,
        plot.y
    );

    LayoutContent::Chart(ChartLayout { plot, bars, legend })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawBar, RawSegment};
    use crate::text_metrics::FixedAdvanceMeasurer;
    use std::collections::HashMap;

    fn sample() -> Model {
        let series = vec!["Labour".to_string(), "Material".to_string()];
        let colors: HashMap<String, String> = series
            .iter()
            .map(|name| (name.clone(), "#01B8AA".to_string()))
            .collect();
        let raw = [("PDC", 60.0, 20.0), ("MAT", 10.0, 10.0)]
            .into_iter()
            .map(|(name, first, second)| RawBar {
                category_name: name.to_string(),
                segments: vec![
                    RawSegment {
                        series_name: "Labour".into(),
                        value: first,
                        selection_id: None,
                    },
                    RawSegment {
                        series_name: "Material".into(),
                        value: second,
                        selection_id: None,
                    },
                ],
            })
            .collect();
        Model::from_raw(raw, series, colors)
    }

    fn layout(model: &Model, settings: &Settings, width: f32, height: f32) -> Layout {
        compute_layout(
            model,
            settings,
            &Theme::standard(),
            &LayoutConfig::default(),
            width,
            height,
            &FixedAdvanceMeasurer::default(),
        )
    }

    #[test]
    fn empty_model_renders_the_placeholder() {
        let result = layout(&Model::empty(), &Settings::default(), 400.0, 300.0);
        let LayoutContent::Placeholder { label } = &result.content else {
            panic!("expected placeholder, got {:?}", result.content);
        };
        assert_eq!(
            label.block.lines,
            vec!["No data available. Add Category, Series, and Values."]
        );
        assert_eq!((label.x, label.first_line_y), (200.0, 150.0));
        assert_eq!(label.color, "#999999");
    }

    #[test]
    fn top_legend_pushes_the_plot_down() {
        let result = layout(&sample(), &Settings::default(), 600.0, 400.0);
        let chart = result.chart().unwrap();
        let legend = chart.legend.as_ref().unwrap();
        assert_eq!(legend.bounds.y, 0.0);
        assert_eq!(legend.bounds.height, 26.0);
        assert_eq!(chart.plot.y, 26.0 + 30.0);
        assert_eq!(chart.plot.bottom(), 360.0);
        assert_eq!(chart.plot.x, 10.0);
        assert_eq!(chart.plot.width, 580.0);
    }

    #[test]
    fn bottom_legend_sits_under_the_plot() {
        let mut settings = Settings::default();
        settings.legend.position = LegendPosition::Bottom;
        let result = layout(&sample(), &settings, 600.0, 400.0);
        let chart = result.chart().unwrap();
        let legend = chart.legend.as_ref().unwrap();
        assert_eq!(legend.bounds.y, 400.0 - 26.0);
        assert_eq!(chart.plot.y, 30.0);
        assert_eq!(chart.plot.bottom(), 400.0 - 26.0 - 40.0);
    }

    #[test]
    fn side_legend_narrows_the_plot() {
        let mut settings = Settings::default();
        settings.legend.position = LegendPosition::Left;
        let result = layout(&sample(), &settings, 600.0, 400.0);
        let chart = result.chart().unwrap();
        assert_eq!(chart.plot.x, 130.0);
        assert_eq!(chart.plot.right(), 590.0);
        assert_eq!(chart.legend.as_ref().unwrap().rows, 2);
    }

    #[test]
    fn hidden_legend_takes_no_room() {
        let mut settings = Settings::default();
        settings.legend.show = false;
        let result = layout(&sample(), &settings, 600.0, 400.0);
        let chart = result.chart().unwrap();
        assert!(chart.legend.is_none());
        assert_eq!(chart.plot.y, 30.0);
    }

    #[test]
    fn tiny_viewport_aborts_the_chart() {
        let result = layout(&sample(), &Settings::default(), 15.0, 60.0);
        assert_eq!(result.content, LayoutContent::Blank);
        assert!(result.segment_at(5.0, 5.0).is_none());
    }

    #[test]
    fn hit_testing_finds_the_segment_under_the_pointer() {
        let result = layout(&sample(), &Settings::default(), 600.0, 400.0);
        let chart = result.chart().unwrap();
        let segment = &chart.bars[1].segments[1];
        let (x, y) = (
            segment.rect.x + segment.rect.width / 2.0,
            segment.rect.y + 1.0,
        );
        assert_eq!(result.segment_at(x, y), Some((1, 1)));
        assert_eq!(result.segment_at(1.0, 1.0), None);
    }
}

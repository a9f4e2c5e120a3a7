use crate::config::LegendConfig;
use crate::model::Model;
use crate::settings::{LegendPosition, LegendSettings};
use crate::text_metrics::TextMeasurer;
use crate::theme::Theme;

use super::text::{pt_to_px, single_line_block};
use super::{Baseline, LabelLayout, LegendItemLayout, LegendLayout, Rect, TextAnchor};

/// Estimated width of one legend entry: swatch, gap, text and trailing padding.
pub fn legend_item_width(name: &str, font_size: f32, config: &LegendConfig) -> f32 {
    let text_width = name.chars().count() as f32 * font_size * config.char_width_factor;
    config.swatch_size + config.swatch_gap + text_width + config.item_padding
}

/// Row and x offset of each item flowed left to right into `available`.
///
/// An item that would overrun the row starts a new one, unless it is the
/// first on its row.
pub fn flow_items(widths: &[f32], available: f32) -> Vec<(usize, f32)> {
    let mut placed = Vec::with_capacity(widths.len());
    let mut row = 0;
    let mut x = 0.0f32;
    for &width in widths {
        if x + width > available && x > 0.0 {
            row += 1;
            x = 0.0;
        }
        placed.push((row, x));
        x += width;
    }
    placed
}

fn row_count(model: &Model, settings: &LegendSettings, config: &LegendConfig, available: f32) -> usize {
    if matches!(settings.position, LegendPosition::Left | LegendPosition::Right) {
        return model.series_names.len();
    }
    let font_size = pt_to_px(settings.font_size);
    let widths: Vec<f32> = model
        .series_names
        .iter()
        .map(|name| legend_item_width(name, font_size, config))
        .collect();
    flow_items(&widths, available)
        .last()
        .map(|(row, _)| row + 1)
        .unwrap_or(0)
}

/// Height of the legend band; zero when hidden or there is nothing to list.
pub fn legend_height(
    model: &Model,
    settings: &LegendSettings,
    config: &LegendConfig,
    available_width: f32,
) -> f32 {
    if !settings.show {
        return 0.0;
    }
    match row_count(model, settings, config, available_width) {
        0 => 0.0,
        rows => rows as f32 * config.item_height + config.band_padding,
    }
}

pub fn layout_legend(
    model: &Model,
    settings: &LegendSettings,
    theme: &Theme,
    config: &LegendConfig,
    bounds: Rect,
    measurer: &dyn TextMeasurer,
) -> LegendLayout {
    let font_size = pt_to_px(settings.font_size);
    let vertical = matches!(settings.position, LegendPosition::Left | LegendPosition::Right);
    let offsets: Vec<(usize, f32)> = if vertical {
        (0..model.series_names.len()).map(|row| (row, 0.0)).collect()
    } else {
        let widths: Vec<f32> = model
            .series_names
            .iter()
            .map(|name| legend_item_width(name, font_size, config))
            .collect();
        flow_items(&widths, bounds.width)
    };
    let top = bounds.y + config.band_padding / 2.0;

    let items = model
        .series_names
        .iter()
        .zip(offsets.iter())
        .map(|(name, &(row, dx))| {
            let swatch = Rect {
                x: bounds.x + dx,
                y: top + row as f32 * config.item_height,
                width: config.swatch_size,
                height: config.swatch_size,
            };
            LegendItemLayout {
                series_name: name.clone(),
                color: model.color_of(name).to_string(),
                label: LabelLayout {
                    x: swatch.right() + config.swatch_gap,
                    first_line_y: swatch.y + config.swatch_size / 2.0,
                    block: single_line_block(name, font_size, 1.0, measurer),
                    font_size,
                    line_height: font_size,
                    color: theme.legend_text_color.clone(),
                    anchor: TextAnchor::Start,
                    baseline: Baseline::Central,
                    bold: false,
                },
                swatch,
            }
        })
        .collect();

    LegendLayout {
        bounds,
        rows: offsets.last().map(|(row, _)| row + 1).unwrap_or(0),
        items,
    }
}

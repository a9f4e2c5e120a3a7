use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pixel constants of the chart layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub bar_gap: f32,
    /// Minimum rendered width of any bar, so zero-total bars stay visible.
    pub min_bar_width: f32,
    pub label_line_height: f32,
    /// Horizontal room an inside label gives up to the bar edges.
    pub label_inset_x: f32,
    pub label_inset_y: f32,
    pub outside_label_offset: f32,
    pub bar_total_offset: f32,
    pub axis_label_offset: f32,
    pub legend: LegendConfig,
    pub placeholder_text: String,
    pub placeholder_font_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_top: 30.0,
            margin_right: 10.0,
            margin_bottom: 40.0,
            margin_left: 10.0,
            bar_gap: 2.0,
            min_bar_width: 1.0,
            label_line_height: 1.2,
            label_inset_x: 4.0,
            label_inset_y: 2.0,
            outside_label_offset: 2.0,
            bar_total_offset: 6.0,
            axis_label_offset: 14.0,
            legend: LegendConfig::default(),
            placeholder_text: "No data available. Add Category, Series, and Values.".to_string(),
            placeholder_font_size: 14.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendConfig {
    pub item_height: f32,
    pub swatch_size: f32,
    pub swatch_gap: f32,
    pub item_padding: f32,
    pub band_padding: f32,
    pub char_width_factor: f32,
    /// Width of the side band for left/right legends.
    pub side_width: f32,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            item_height: 18.0,
            swatch_size: 12.0,
            swatch_gap: 4.0,
            item_padding: 16.0,
            band_padding: 8.0,
            char_width_factor: 0.6,
            side_width: 120.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<String>,
    legend_text_color: Option<String>,
    placeholder_color: Option<String>,
    segment_stroke: Option<String>,
    segment_stroke_width: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegendConfigFile {
    item_height: Option<f32>,
    swatch_size: Option<f32>,
    swatch_gap: Option<f32>,
    item_padding: Option<f32>,
    band_padding: Option<f32>,
    char_width_factor: Option<f32>,
    side_width: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    margin_top: Option<f32>,
    margin_right: Option<f32>,
    margin_bottom: Option<f32>,
    margin_left: Option<f32>,
    bar_gap: Option<f32>,
    min_bar_width: Option<f32>,
    label_line_height: Option<f32>,
    placeholder_text: Option<String>,
    placeholder_font_size: Option<f32>,
    legend: Option<LegendConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    width: Option<f32>,
    height: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "standard" || theme_name == "default" {
            config.theme = Theme::standard();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.legend_text_color {
            config.theme.legend_text_color = v;
        }
        if let Some(v) = vars.placeholder_color {
            config.theme.placeholder_color = v;
        }
        if let Some(v) = vars.segment_stroke {
            config.theme.segment_stroke = v;
        }
        if let Some(v) = vars.segment_stroke_width {
            config.theme.segment_stroke_width = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.margin_top {
            target.margin_top = v;
        }
        if let Some(v) = layout.margin_right {
            target.margin_right = v;
        }
        if let Some(v) = layout.margin_bottom {
            target.margin_bottom = v;
        }
        if let Some(v) = layout.margin_left {
            target.margin_left = v;
        }
        if let Some(v) = layout.bar_gap {
            target.bar_gap = v.max(0.0);
        }
        if let Some(v) = layout.min_bar_width {
            target.min_bar_width = v.max(0.0);
        }
        if let Some(v) = layout.label_line_height {
            target.label_line_height = v;
        }
        if let Some(v) = layout.placeholder_text {
            target.placeholder_text = v;
        }
        if let Some(v) = layout.placeholder_font_size {
            target.placeholder_font_size = v;
        }
        if let Some(legend) = layout.legend {
            let target = &mut target.legend;
            if let Some(v) = legend.item_height {
                target.item_height = v;
            }
            if let Some(v) = legend.swatch_size {
                target.swatch_size = v;
            }
            if let Some(v) = legend.swatch_gap {
                target.swatch_gap = v;
            }
            if let Some(v) = legend.item_padding {
                target.item_padding = v;
            }
            if let Some(v) = legend.band_padding {
                target.band_padding = v;
            }
            if let Some(v) = legend.char_width_factor {
                target.char_width_factor = v;
            }
            if let Some(v) = legend.side_width {
                target.side_width = v;
            }
        }
    }

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.margin_top, 30.0);
        assert_eq!(config.layout.legend.item_height, 18.0);
        assert_eq!(config.theme.placeholder_color, "#999999");
    }

    #[test]
    fn overlays_only_present_fields() {
        let config = parse_config(
            r##"{
                "theme": "modern",
                "themeVariables": { "background": "#000000" },
                "layout": { "barGap": 6, "legend": { "itemHeight": 24 } },
                "height": 320
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.font_family, Theme::modern().font_family);
        assert_eq!(config.theme.background, "#000000");
        assert_eq!(config.layout.bar_gap, 6.0);
        assert_eq!(config.layout.margin_left, 10.0);
        assert_eq!(config.layout.legend.item_height, 24.0);
        assert_eq!(config.layout.legend.swatch_size, 12.0);
        assert_eq!(config.render.height, 320.0);
        assert_eq!(config.render.width, 800.0);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(parse_config("{ not json").is_err());
    }
}

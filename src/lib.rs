#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataview;
pub mod error;
pub mod format;
pub mod host;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod settings;
pub mod text_metrics;
pub mod theme;
pub mod topn;
pub mod visual;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use dataview::DataView;
pub use error::{HostError, MekkoError};
pub use host::{StaticHost, VisualHost};
pub use layout::compute_layout;
pub use model::{Model, build_model};
pub use render::render_svg;
pub use settings::Settings;
pub use theme::Theme;
pub use visual::{MekkoVisual, Viewport};

use text_metrics::{FontMeasurer, HeuristicMeasurer, TextMeasurer};

/// Everything a one-shot render needs besides the data.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub config: Config,
    /// Measure with the built-in width table instead of system fonts.
    pub fast_text: bool,
}

impl RenderOptions {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        let mut options = Self::default();
        options.config.theme = Theme::modern();
        options
    }

    pub fn measurer(&self) -> Box<dyn TextMeasurer> {
        if self.fast_text {
            Box::new(HeuristicMeasurer)
        } else {
            Box::new(FontMeasurer::new(self.config.theme.font_family.clone()))
        }
    }
}

/// Render a JSON data view at the configured size through a headless host.
///
/// Blank input or a data view of the wrong shape renders the no-data
/// placeholder; only text that is not JSON fails.
pub fn render_with_options(data_view_json: &str, options: RenderOptions) -> Result<String, MekkoError> {
    let data_view = if data_view_json.trim().is_empty() {
        None
    } else {
        Some(DataView::from_json(data_view_json)?)
    };
    Ok(render_data_view(data_view.as_ref(), &options))
}

pub fn render_data_view(data_view: Option<&DataView>, options: &RenderOptions) -> String {
    let viewport = Viewport {
        width: options.config.render.width,
        height: options.config.render.height,
    };
    let mut visual =
        MekkoVisual::with_measurer(StaticHost::new(), options.config.clone(), options.measurer());
    visual.update(data_view, viewport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_renders_placeholder() {
        let svg = render_with_options("  ", RenderOptions::standard()).unwrap();
        assert!(svg.contains("No data available"));
    }

    #[test]
    fn wrong_shape_degrades_instead_of_failing() {
        let svg = render_with_options(
            r#"{"matrix":{"rows":{"root":{"children":[{"value":"A","values":{"0":5}}]}}}}"#,
            RenderOptions::standard(),
        )
        .unwrap();
        assert!(svg.ends_with("</svg>"));
        assert!(!svg.contains("mekko-segment"));
        let svg = render_with_options("[1, 2, 3]", RenderOptions::standard()).unwrap();
        assert!(svg.contains("No data available"));
    }

    #[test]
    fn non_json_input_is_reported() {
        let err = render_with_options("{ nope", RenderOptions::standard()).unwrap_err();
        assert!(matches!(err, MekkoError::Json(_)));
    }
}

use mekko_renderer::{RenderOptions, Settings, render_with_options};
use serde::Deserialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MekkoRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    fast_text: Option<bool>,
}

fn build_render_options(options: MekkoRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::standard()
    };

    if let Some(font_family) = options.font_family {
        render_options.config.theme.font_family = font_family;
    }
    if let Some(width) = options.width {
        render_options.config.render.width = width;
    }
    if let Some(height) = options.height {
        render_options.config.render.height = height;
    }
    // No system fonts inside the browser sandbox.
    render_options.fast_text = options.fast_text.unwrap_or(true);

    render_options
}

fn to_js_error(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen]
pub fn render_mekko_svg(data_view_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<MekkoRenderOptions>(&raw_options).map_err(to_js_error)?
    } else {
        MekkoRenderOptions::default()
    };

    render_with_options(data_view_json, build_render_options(options)).map_err(to_js_error)
}

/// Format-pane instances for one object, as a JSON array.
#[wasm_bindgen]
pub fn enumerate_objects(settings_json: &str, object_name: &str) -> Result<String, JsValue> {
    let bag = if settings_json.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str::<Value>(settings_json).map_err(to_js_error)?)
    };
    let settings = Settings::resolve(bag.as_ref());
    serde_json::to_string(&settings.enumerate(object_name)).map_err(to_js_error)
}

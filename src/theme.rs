use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub legend_text_color: String,
    pub placeholder_color: String,
    pub segment_stroke: String,
    pub segment_stroke_width: f32,
}

impl Theme {
    pub fn standard() -> Self {
        Self {
            font_family: "\"Segoe UI\", wf_segoe-ui_normal, helvetica, arial, sans-serif"
                .to_string(),
            background: "#FFFFFF".to_string(),
            legend_text_color: "#333333".to_string(),
            placeholder_color: "#999999".to_string(),
            segment_stroke: "#ffffff".to_string(),
            segment_stroke_width: 0.5,
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            background: "#FFFFFF".to_string(),
            legend_text_color: "#1C2430".to_string(),
            placeholder_color: "#7A8AA6".to_string(),
            segment_stroke: "#F8FAFF".to_string(),
            segment_stroke_width: 1.0,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::standard()
    }
}

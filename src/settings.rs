//! Format-pane settings.
//!
//! The host persists settings as a property bag: object name -> property
//! name -> value. Every field resolves independently against the defaults,
//! so a missing, null or mistyped entry never affects its neighbours.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::format::{DisplayUnits, LabelContentMode, TotalLabelFormat};

pub const SEGMENT_LABELS: &str = "segmentLabels";
pub const BAR_TOTALS: &str = "barTotals";
pub const LEGEND: &str = "legend";
pub const CATEGORY_AXIS: &str = "categoryAxis";
pub const TOP_N: &str = "topN";

pub const OBJECT_NAMES: [&str; 5] = [SEGMENT_LABELS, BAR_TOTALS, LEGEND, CATEGORY_AXIS, TOP_N];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum LabelPosition {
    #[default]
    Inside,
    Outside,
    Centered,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum LegendPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortByMode {
    #[default]
    WidthValue,
    Alphabetical,
    /// Orders by per-category sort keys. Category extraction does not supply
    /// keys yet, so in a rendered chart this keeps input order.
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLabelSettings {
    pub show: bool,
    pub label_content_mode: LabelContentMode,
    pub label_position: LabelPosition,
    pub font_size: f64,
    pub font_color: String,
    pub decimal_places: u32,
    pub display_units: DisplayUnits,
    pub currency_symbol: String,
    pub min_threshold: f64,
    pub custom_label_text: String,
}

impl Default for SegmentLabelSettings {
    fn default() -> Self {
        Self {
            show: true,
            label_content_mode: LabelContentMode::Amount,
            label_position: LabelPosition::Inside,
            font_size: 9.0,
            font_color: "#333333".to_string(),
            decimal_places: 0,
            display_units: DisplayUnits::Auto,
            currency_symbol: String::new(),
            min_threshold: 3.0,
            custom_label_text: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarTotalSettings {
    pub show: bool,
    pub total_label_format: TotalLabelFormat,
    pub font_size: f64,
    pub font_color: String,
    pub decimal_places: u32,
    pub display_units: DisplayUnits,
    pub currency_symbol: String,
}

impl Default for BarTotalSettings {
    fn default() -> Self {
        Self {
            show: true,
            total_label_format: TotalLabelFormat::Amount,
            font_size: 10.0,
            font_color: "#333333".to_string(),
            decimal_places: 0,
            display_units: DisplayUnits::Auto,
            currency_symbol: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendSettings {
    pub show: bool,
    pub position: LegendPosition,
    pub font_size: f64,
}

impl Default for LegendSettings {
    fn default() -> Self {
        Self {
            show: true,
            position: LegendPosition::Top,
            font_size: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAxisSettings {
    pub show: bool,
    pub font_size: f64,
    pub font_color: String,
}

impl Default for CategoryAxisSettings {
    fn default() -> Self {
        Self {
            show: true,
            font_size: 10.0,
            font_color: "#333333".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopNSettings {
    pub enabled: bool,
    pub count: f64,
    pub show_other: bool,
    pub other_label: String,
    pub sort_by: SortByMode,
}

impl Default for TopNSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            count: 10.0,
            show_other: true,
            other_label: "Other".to_string(),
            sort_by: SortByMode::WidthValue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub segment_labels: SegmentLabelSettings,
    pub bar_totals: BarTotalSettings,
    pub legend: LegendSettings,
    pub category_axis: CategoryAxisSettings,
    pub top_n: TopNSettings,
}

/// Look up one property; absent, null and mistyped values yield the default.
pub fn resolve_field<T: DeserializeOwned>(
    bag: &Value,
    object: &str,
    property: &str,
    default: T,
) -> T {
    match bag.get(object).and_then(|group| group.get(property)) {
        None | Some(Value::Null) => default,
        Some(value) => T::deserialize(value).unwrap_or(default),
    }
}

/// Colors arrive wrapped as `{ "solid": { "color": "#rrggbb" } }`.
pub fn resolve_color(bag: &Value, object: &str, property: &str, default: &str) -> String {
    bag.get(object)
        .and_then(|group| group.get(property))
        .and_then(|fill| fill.get("solid"))
        .and_then(|solid| solid.get("color"))
        .and_then(Value::as_str)
        .filter(|color| !color.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn wrap_color(color: &str) -> Value {
    json!({ "solid": { "color": color } })
}

impl Settings {
    /// Resolve the host's property bag; an absent bag yields the defaults.
    pub fn resolve(bag: Option<&Value>) -> Self {
        let Some(bag) = bag else {
            return Self::default();
        };
        let d = Self::default();
        let seg = SEGMENT_LABELS;
        let bt = BAR_TOTALS;
        Self {
            segment_labels: SegmentLabelSettings {
                show: resolve_field(bag, seg, "show", d.segment_labels.show),
                label_content_mode: resolve_field(
                    bag,
                    seg,
                    "labelContentMode",
                    d.segment_labels.label_content_mode,
                ),
                label_position: resolve_field(
                    bag,
                    seg,
                    "labelPosition",
                    d.segment_labels.label_position,
                ),
                font_size: resolve_field(bag, seg, "fontSize", d.segment_labels.font_size),
                font_color: resolve_color(bag, seg, "fontColor", &d.segment_labels.font_color),
                decimal_places: resolve_field(
                    bag,
                    seg,
                    "decimalPlaces",
                    d.segment_labels.decimal_places,
                ),
                display_units: resolve_field(
                    bag,
                    seg,
                    "displayUnits",
                    d.segment_labels.display_units,
                ),
                currency_symbol: resolve_field(
                    bag,
                    seg,
                    "currencySymbol",
                    d.segment_labels.currency_symbol,
                ),
                min_threshold: resolve_field(
                    bag,
                    seg,
                    "minThreshold",
                    d.segment_labels.min_threshold,
                ),
                custom_label_text: resolve_field(
                    bag,
                    seg,
                    "customLabelText",
                    d.segment_labels.custom_label_text,
                ),
            },
            bar_totals: BarTotalSettings {
                show: resolve_field(bag, bt, "show", d.bar_totals.show),
                total_label_format: resolve_field(
                    bag,
                    bt,
                    "totalLabelFormat",
                    d.bar_totals.total_label_format,
                ),
                font_size: resolve_field(bag, bt, "fontSize", d.bar_totals.font_size),
                font_color: resolve_color(bag, bt, "fontColor", &d.bar_totals.font_color),
                decimal_places: resolve_field(
                    bag,
                    bt,
                    "decimalPlaces",
                    d.bar_totals.decimal_places,
                ),
                display_units: resolve_field(bag, bt, "displayUnits", d.bar_totals.display_units),
                currency_symbol: resolve_field(
                    bag,
                    bt,
                    "currencySymbol",
                    d.bar_totals.currency_symbol,
                ),
            },
            legend: LegendSettings {
                show: resolve_field(bag, LEGEND, "show", d.legend.show),
                position: resolve_field(bag, LEGEND, "position", d.legend.position),
                font_size: resolve_field(bag, LEGEND, "fontSize", d.legend.font_size),
            },
            category_axis: CategoryAxisSettings {
                show: resolve_field(bag, CATEGORY_AXIS, "show", d.category_axis.show),
                font_size: resolve_field(bag, CATEGORY_AXIS, "fontSize", d.category_axis.font_size),
                font_color: resolve_color(
                    bag,
                    CATEGORY_AXIS,
                    "fontColor",
                    &d.category_axis.font_color,
                ),
            },
            top_n: TopNSettings {
                enabled: resolve_field(bag, TOP_N, "enabled", d.top_n.enabled),
                count: resolve_field(bag, TOP_N, "count", d.top_n.count),
                show_other: resolve_field(bag, TOP_N, "showOther", d.top_n.show_other),
                other_label: resolve_field(bag, TOP_N, "otherLabel", d.top_n.other_label),
                sort_by: resolve_field(bag, TOP_N, "sortBy", d.top_n.sort_by),
            },
        }
    }

    /// Current values of one object in the property-bag shape, colors re-wrapped.
    pub fn enumerate(&self, object_name: &str) -> Vec<ObjectInstance> {
        let properties = match object_name {
            SEGMENT_LABELS => {
                let s = &self.segment_labels;
                json!({
                    "show": s.show,
                    "labelContentMode": s.label_content_mode,
                    "labelPosition": s.label_position,
                    "fontSize": s.font_size,
                    "fontColor": wrap_color(&s.font_color),
                    "decimalPlaces": s.decimal_places,
                    "displayUnits": s.display_units,
                    "currencySymbol": s.currency_symbol,
                    "minThreshold": s.min_threshold,
                    "customLabelText": s.custom_label_text,
                })
            }
            BAR_TOTALS => {
                let b = &self.bar_totals;
                json!({
                    "show": b.show,
                    "totalLabelFormat": b.total_label_format,
                    "fontSize": b.font_size,
                    "fontColor": wrap_color(&b.font_color),
                    "decimalPlaces": b.decimal_places,
                    "displayUnits": b.display_units,
                    "currencySymbol": b.currency_symbol,
                })
            }
            LEGEND => json!({
                "show": self.legend.show,
                "position": self.legend.position,
                "fontSize": self.legend.font_size,
            }),
            CATEGORY_AXIS => json!({
                "show": self.category_axis.show,
                "fontSize": self.category_axis.font_size,
                "fontColor": wrap_color(&self.category_axis.font_color),
            }),
            TOP_N => json!({
                "enabled": self.top_n.enabled,
                "count": self.top_n.count,
                "showOther": self.top_n.show_other,
                "otherLabel": self.top_n.other_label,
                "sortBy": self.top_n.sort_by,
            }),
            _ => return Vec::new(),
        };
        let Value::Object(properties) = properties else {
            return Vec::new();
        };
        vec![ObjectInstance {
            object_name: object_name.to_string(),
            selector: None,
            properties,
        }]
    }

    /// Every object folded back into one property bag.
    pub fn to_property_bag(&self) -> Value {
        let mut bag = Map::new();
        for name in OBJECT_NAMES {
            for instance in self.enumerate(name) {
                bag.insert(instance.object_name, Value::Object(instance.properties));
            }
        }
        Value::Object(bag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInstance {
    pub object_name: String,
    pub selector: Option<Value>,
    pub properties: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_bag_is_the_default_constant() {
        assert_eq!(Settings::resolve(None), Settings::default());
        assert_eq!(Settings::resolve(Some(&json!({}))), Settings::default());
    }

    #[test]
    fn fields_default_individually() {
        let bag = json!({
            "segmentLabels": {
                "show": false,
                "labelContentMode": "categoryPercentBar",
                "fontSize": null,
                "decimalPlaces": "two",
                "minThreshold": 7.5
            },
            "legend": { "position": "bottom" }
        });
        let settings = Settings::resolve(Some(&bag));
        assert!(!settings.segment_labels.show);
        assert_eq!(
            settings.segment_labels.label_content_mode,
            LabelContentMode::CategoryPercentBar
        );
        assert_eq!(settings.segment_labels.font_size, 9.0);
        assert_eq!(settings.segment_labels.decimal_places, 0);
        assert_eq!(settings.segment_labels.min_threshold, 7.5);
        assert_eq!(settings.legend.position, LegendPosition::Bottom);
        assert_eq!(settings.bar_totals, BarTotalSettings::default());
    }

    #[test]
    fn min_threshold_is_not_clamped() {
        let bag = json!({ "segmentLabels": { "minThreshold": -40 } });
        assert_eq!(Settings::resolve(Some(&bag)).segment_labels.min_threshold, -40.0);
    }

    #[test]
    fn colors_unwrap_from_solid_fill() {
        let bag = json!({
            "barTotals": { "fontColor": { "solid": { "color": "#ff0000" } } },
            "categoryAxis": { "fontColor": "#00ff00" },
            "segmentLabels": { "fontColor": { "solid": {} } }
        });
        let settings = Settings::resolve(Some(&bag));
        assert_eq!(settings.bar_totals.font_color, "#ff0000");
        assert_eq!(settings.category_axis.font_color, "#333333");
        assert_eq!(settings.segment_labels.font_color, "#333333");
    }

    #[test]
    fn legacy_content_mode_names_are_accepted() {
        let bag = json!({ "segmentLabels": { "labelContentMode": "amountPercentTotal" } });
        assert_eq!(
            Settings::resolve(Some(&bag)).segment_labels.label_content_mode,
            LabelContentMode::AmountAndPercent
        );
    }

    #[test]
    fn enumerate_rewraps_colors() {
        let settings = Settings::default();
        let instances = settings.enumerate(CATEGORY_AXIS);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].selector, None);
        assert_eq!(
            instances[0].properties["fontColor"],
            json!({ "solid": { "color": "#333333" } })
        );
        assert!(settings.enumerate("dataPoint").is_empty());
    }

    #[test]
    fn enumerate_inverts_resolve() {
        let bag = json!({
            "segmentLabels": { "labelPosition": "outside", "currencySymbol": "€", "decimalPlaces": 2 },
            "barTotals": { "totalLabelFormat": "amountPercentTotal", "displayUnits": "millions" },
            "legend": { "show": false, "position": "right", "fontSize": 12 },
            "topN": { "enabled": true, "count": 4, "sortBy": "alphabetical" }
        });
        let settings = Settings::resolve(Some(&bag));
        let round_tripped = Settings::resolve(Some(&settings.to_property_bag()));
        assert_eq!(round_tripped, settings);
    }
}

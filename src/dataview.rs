//! Host tabular input.
//!
//! The host hands the visual a matrix: a row hierarchy (categories), a column
//! hierarchy (series) and per-row cell values keyed by column index. Only the
//! first level of each hierarchy is read; deeper traversal belongs to the host.

use std::collections::BTreeMap;

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataView {
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Metadata,
    #[serde(default, deserialize_with = "lenient")]
    pub matrix: Option<Matrix>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Persisted settings blob: object name -> property name -> value.
    #[serde(default)]
    pub objects: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matrix {
    #[serde(default, deserialize_with = "lenient")]
    pub rows: Hierarchy,
    #[serde(default, deserialize_with = "lenient")]
    pub columns: Hierarchy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    #[serde(default, deserialize_with = "lenient")]
    pub root: MatrixNode,
    #[serde(default, deserialize_with = "lenient")]
    pub levels: Vec<HierarchyLevel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyLevel {
    #[serde(default, deserialize_with = "lenient")]
    pub sources: Vec<ColumnSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSource {
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub query_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixNode {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, deserialize_with = "lenient_nodes")]
    pub children: Vec<MatrixNode>,
    #[serde(default, deserialize_with = "lenient_cells")]
    pub values: BTreeMap<usize, MatrixCell>,
    #[serde(default)]
    pub identity: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub level: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixCell {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub value_source_index: Option<usize>,
}

/// A field of the wrong JSON shape reads as its default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Like [`lenient`], but per node, so one bad child keeps its position.
fn lenient_nodes<'de, D>(deserializer: D) -> Result<Vec<MatrixNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Cells keyed by column index; non-numeric keys are dropped, malformed cells are empty.
fn lenient_cells<'de, D>(deserializer: D) -> Result<BTreeMap<usize, MatrixCell>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, cell)| {
            let column = key.parse::<usize>().ok()?;
            Some((column, serde_json::from_value(cell).unwrap_or_default()))
        })
        .collect())
}

impl DataView {
    /// Fails only on text that is not JSON; any JSON value yields a data view.
    pub fn from_json(input: &str) -> Result<Self, crate::error::MekkoError> {
        let value: Value = serde_json::from_str(input)?;
        Ok(Self::from_value(value))
    }

    /// A value that is not a data-view object becomes the empty data view.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|err| {
            debug!("data view has an unexpected shape ({err}); treating it as empty");
            Self::default()
        })
    }

    /// Category rows, or an empty slice when the matrix is absent.
    pub fn category_rows(&self) -> &[MatrixNode] {
        self.matrix
            .as_ref()
            .map(|matrix| matrix.rows.root.children.as_slice())
            .unwrap_or(&[])
    }

    /// Series columns, or an empty slice when the matrix is absent.
    pub fn series_columns(&self) -> &[MatrixNode] {
        self.matrix
            .as_ref()
            .map(|matrix| matrix.columns.root.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn objects(&self) -> Option<&Value> {
        self.metadata.objects.as_ref()
    }
}

impl MatrixNode {
    /// Numeric cell value for a column; anything that is not a JSON number reads as 0.
    pub fn numeric_value(&self, column: usize) -> f64 {
        self.values
            .get(&column)
            .and_then(|cell| cell.value.as_ref())
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    pub fn display_value(&self) -> Option<String> {
        self.value.as_ref().and_then(primitive_to_string)
    }
}

/// Render a primitive the way the host stringifies it. `null` counts as absent.
pub fn primitive_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(match number.as_f64() {
            Some(float) if number.is_f64() => float.to_string(),
            _ => number.to_string(),
        }),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_matrix_has_no_rows() {
        let view = DataView::default();
        assert!(view.category_rows().is_empty());
        assert!(view.series_columns().is_empty());
    }

    #[test]
    fn numeric_value_ignores_non_numbers() {
        let view: DataView = serde_json::from_value(json!({
            "matrix": {
                "rows": { "root": { "children": [
                    { "value": "A", "values": { "0": { "value": 12.5 }, "1": { "value": "x" } } }
                ] } },
                "columns": { "root": { "children": [ { "value": "S1" }, { "value": "S2" } ] } }
            }
        }))
        .unwrap();
        let row = &view.category_rows()[0];
        assert_eq!(row.numeric_value(0), 12.5);
        assert_eq!(row.numeric_value(1), 0.0);
        assert_eq!(row.numeric_value(7), 0.0);
    }

    #[test]
    fn wrong_shapes_degrade_instead_of_failing() {
        let view = DataView::from_json(
            r#"{ "matrix": { "rows": { "root": { "children": [
                { "value": "A", "values": { "0": 5, "1": { "value": 3 }, "x": {} } },
                "stray",
                { "value": "C", "children": null, "level": "deep" }
            ] } }, "columns": { "root": { "children": null } } } }"#,
        )
        .unwrap();
        let rows = view.category_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].numeric_value(0), 0.0);
        assert_eq!(rows[0].numeric_value(1), 3.0);
        assert_eq!(rows[0].values.len(), 2);
        assert!(rows[1].display_value().is_none());
        assert!(rows[2].children.is_empty());
        assert_eq!(rows[2].level, None);
        assert!(view.series_columns().is_empty());
    }

    #[test]
    fn non_object_input_is_the_empty_view() {
        assert!(DataView::from_json("[1, 2]").unwrap().matrix.is_none());
        assert!(DataView::from_json(r#"{ "matrix": 7 }"#).unwrap().matrix.is_none());
        assert!(DataView::from_json("{ nope").is_err());
    }

    #[test]
    fn primitives_render_like_the_host() {
        assert_eq!(primitive_to_string(&json!(2024)), Some("2024".to_string()));
        assert_eq!(primitive_to_string(&json!(1.5)), Some("1.5".to_string()));
        assert_eq!(primitive_to_string(&json!("PDC")), Some("PDC".to_string()));
        assert_eq!(primitive_to_string(&json!(true)), Some("true".to_string()));
        assert_eq!(primitive_to_string(&Value::Null), None);
    }
}

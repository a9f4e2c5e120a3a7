//! Capabilities the embedding host lends to the visual.
//!
//! None of these are implemented by the core. `StaticHost` is a headless
//! stand-in used by the CLI, the WASM wrapper and tests.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::dataview::MatrixNode;
use crate::error::HostError;

/// Opaque selection identity owned by the host.
///
/// The core only stores and hands these back; it never inspects or compares
/// them. Hosts recover their own value with [`SelectionId::downcast_ref`].
#[derive(Clone)]
pub struct SelectionId(Arc<dyn Any + Send + Sync>);

impl SelectionId {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SelectionId(..)")
    }
}

pub trait ColorPalette {
    fn get_color(&self, key: &str) -> String;
}

pub trait SelectionIdBuilder {
    fn create_for_row(
        &self,
        row: &MatrixNode,
        row_index: usize,
        column_index: usize,
    ) -> Result<SelectionId, HostError>;
}

/// Selection requests are fire-and-forget: the host resolves them on its own schedule.
pub trait SelectionManager {
    fn select(&self, id: &SelectionId, multi_select: bool);
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipItem {
    pub display_name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct TooltipShowOptions {
    pub data_items: Vec<TooltipItem>,
    pub identities: Vec<SelectionId>,
    pub coordinates: (f32, f32),
    pub is_touch_event: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipHideOptions {
    pub immediately: bool,
    pub is_touch_event: bool,
}

pub trait TooltipService {
    fn show(&self, options: TooltipShowOptions);
    fn hide(&self, options: TooltipHideOptions);
}

pub trait VisualHost {
    fn color_palette(&self) -> Option<&dyn ColorPalette>;
    fn selection_id_builder(&self) -> Option<&dyn SelectionIdBuilder>;
    fn selection_manager(&self) -> &dyn SelectionManager;
    fn tooltip_service(&self) -> &dyn TooltipService;
}

/// Identity minted by [`StaticHost`]: the row a segment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowIdentity {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub enum HostEvent {
    Selected(SelectionId),
    TooltipShown(Vec<TooltipItem>),
    TooltipHidden { immediately: bool },
}

/// Headless host: default palette, row-index identities, and an event log in
/// place of real selection and tooltip services. Rows whose `identity` is
/// `false` are treated as not selectable.
#[derive(Debug, Default)]
pub struct StaticHost {
    palette: Option<Vec<(String, String)>>,
    events: Mutex<Vec<HostEvent>>,
}

impl StaticHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed colors per series name; unknown names fall back to grey.
    pub fn with_palette(entries: Vec<(String, String)>) -> Self {
        Self {
            palette: Some(entries),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn record(&self, event: HostEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

struct FixedPalette<'a>(&'a [(String, String)]);

impl ColorPalette for FixedPalette<'_> {
    fn get_color(&self, key: &str) -> String {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, color)| color.clone())
            .unwrap_or_else(|| "#999999".to_string())
    }
}

impl ColorPalette for StaticHost {
    fn get_color(&self, key: &str) -> String {
        FixedPalette(self.palette.as_deref().unwrap_or(&[])).get_color(key)
    }
}

impl SelectionIdBuilder for StaticHost {
    fn create_for_row(
        &self,
        row: &MatrixNode,
        row_index: usize,
        column_index: usize,
    ) -> Result<SelectionId, HostError> {
        if matches!(row.identity, Some(serde_json::Value::Bool(false))) {
            return Err(HostError::IdentityUnavailable(format!(
                "row {row_index} is not selectable"
            )));
        }
        Ok(SelectionId::new(RowIdentity {
            row: row_index,
            column: column_index,
        }))
    }
}

impl SelectionManager for StaticHost {
    fn select(&self, id: &SelectionId, _multi_select: bool) {
        self.record(HostEvent::Selected(id.clone()));
    }
}

impl TooltipService for StaticHost {
    fn show(&self, options: TooltipShowOptions) {
        self.record(HostEvent::TooltipShown(options.data_items));
    }

    fn hide(&self, options: TooltipHideOptions) {
        self.record(HostEvent::TooltipHidden {
            immediately: options.immediately,
        });
    }
}

impl VisualHost for StaticHost {
    fn color_palette(&self) -> Option<&dyn ColorPalette> {
        self.palette.as_ref().map(|_| self as &dyn ColorPalette)
    }

    fn selection_id_builder(&self) -> Option<&dyn SelectionIdBuilder> {
        Some(self)
    }

    fn selection_manager(&self) -> &dyn SelectionManager {
        self
    }

    fn tooltip_service(&self) -> &dyn TooltipService {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_id_round_trips_host_value() {
        let id = SelectionId::new(RowIdentity { row: 3, column: 1 });
        assert_eq!(
            id.downcast_ref::<RowIdentity>(),
            Some(&RowIdentity { row: 3, column: 1 })
        );
        assert!(id.downcast_ref::<String>().is_none());
    }

    #[test]
    fn static_host_without_palette_exposes_none() {
        let host = StaticHost::new();
        assert!(host.color_palette().is_none());
        let host = StaticHost::with_palette(vec![("A".into(), "#123456".into())]);
        let palette = host.color_palette().unwrap();
        assert_eq!(palette.get_color("A"), "#123456");
        assert_eq!(palette.get_color("B"), "#999999");
    }

    #[test]
    fn unselectable_row_identity_fails() {
        let host = StaticHost::new();
        let row = MatrixNode {
            identity: Some(serde_json::Value::Bool(false)),
            ..MatrixNode::default()
        };
        assert!(host.create_for_row(&row, 0, 0).is_err());
        assert!(host.create_for_row(&MatrixNode::default(), 0, 0).is_ok());
    }
}

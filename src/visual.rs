//! The host-facing visual: one `update` per data or viewport change.
//!
//! Each update resolves settings, rebuilds the model, recomputes the layout
//! and re-renders the whole SVG. Only the last settings, model and layout are
//! kept, and only so interaction callbacks and the format panel can read them.

use log::debug;

use crate::config::Config;
use crate::dataview::DataView;
use crate::host::{TooltipHideOptions, TooltipItem, TooltipShowOptions, VisualHost};
use crate::layout::{Layout, compute_layout};
use crate::model::{Model, build_model};
use crate::render::render_svg;
use crate::settings::{ObjectInstance, Settings};
use crate::text_metrics::{FontMeasurer, TextMeasurer};
use crate::topn::apply_top_n_to_model;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

pub struct MekkoVisual<H: VisualHost> {
    host: H,
    config: Config,
    measurer: Box<dyn TextMeasurer>,
    settings: Settings,
    model: Model,
    layout: Option<Layout>,
}

impl<H: VisualHost> MekkoVisual<H> {
    /// Measures label text with the theme's font.
    pub fn new(host: H, config: Config) -> Self {
        let measurer = FontMeasurer::new(config.theme.font_family.clone());
        Self::with_measurer(host, config, Box::new(measurer))
    }

    pub fn with_measurer(host: H, config: Config, measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            host,
            config,
            measurer,
            settings: Settings::default(),
            model: Model::empty(),
            layout: None,
        }
    }

    /// Re-render from scratch. Never fails: bad input yields the placeholder.
    pub fn update(&mut self, data_view: Option<&DataView>, viewport: Viewport) -> String {
        self.settings = Settings::resolve(data_view.and_then(DataView::objects));
        let model = build_model(
            data_view,
            self.host.color_palette(),
            self.host.selection_id_builder(),
        );
        self.model = apply_top_n_to_model(model, &self.settings.top_n);
        let layout = compute_layout(
            &self.model,
            &self.settings,
            &self.config.theme,
            &self.config.layout,
            viewport.width,
            viewport.height,
            self.measurer.as_ref(),
        );
        let svg = render_svg(&layout, &self.config.theme);
        debug!(
            "update {}x{}: {} bars, {} bytes of svg",
            viewport.width,
            viewport.height,
            self.model.bars.len(),
            svg.len()
        );
        self.layout = Some(layout);
        svg
    }

    pub fn enumerate_object_instances(&self, object_name: &str) -> Vec<ObjectInstance> {
        self.settings.enumerate(object_name)
    }

    /// `(bar, segment)` drawn under a viewport coordinate.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        self.layout.as_ref()?.segment_at(x, y)
    }

    /// Forward a click to the selection manager. Returns whether a selection
    /// was requested; segments without an identity are ignored.
    pub fn segment_click(&self, bar: usize, segment: usize, multi_select: bool) -> bool {
        let Some(id) = self
            .model
            .bars
            .get(bar)
            .and_then(|bar| bar.segments.get(segment))
            .and_then(|segment| segment.selection_id.as_ref())
        else {
            return false;
        };
        self.host.selection_manager().select(id, multi_select);
        true
    }

    pub fn segment_hover(&self, bar: usize, segment: usize, coordinates: (f32, f32)) -> bool {
        let Some(bar) = self.model.bars.get(bar) else {
            return false;
        };
        let Some(segment) = bar.segments.get(segment) else {
            return false;
        };
        self.host.tooltip_service().show(TooltipShowOptions {
            data_items: vec![
                TooltipItem {
                    display_name: bar.category_name.clone(),
                    value: String::new(),
                },
                TooltipItem {
                    display_name: segment.series_name.clone(),
                    value: format!("{}", segment.absolute_value.abs()),
                },
            ],
            identities: segment.selection_id.iter().cloned().collect(),
            coordinates,
            is_touch_event: false,
        });
        true
    }

    pub fn segment_leave(&self) {
        self.host.tooltip_service().hide(TooltipHideOptions {
            immediately: true,
            is_touch_event: false,
        });
    }

    /// Drop everything rendered; the next update starts clean.
    pub fn destroy(&mut self) {
        self.layout = None;
        self.model = Model::empty();
        self.settings = Settings::default();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostEvent, RowIdentity, StaticHost};
    use crate::text_metrics::FixedAdvanceMeasurer;
    use serde_json::json;

    fn visual() -> MekkoVisual<StaticHost> {
        MekkoVisual::with_measurer(
            StaticHost::new(),
            Config::default(),
            Box::new(FixedAdvanceMeasurer::default()),
        )
    }

    fn data() -> DataView {
        serde_json::from_value(json!({
            "metadata": { "objects": { "legend": { "position": "bottom" } } },
            "matrix": {
                "rows": { "root": { "children": [
                    { "value": "PDC", "values": { "0": { "value": 60 }, "1": { "value": 20 } } },
                    { "value": "MAT", "identity": false, "values": { "0": { "value": 10 }, "1": { "value": 10 } } }
                ] } },
                "columns": { "root": { "children": [ { "value": "Labour" }, { "value": "Material" } ] } }
            }
        }))
        .unwrap()
    }

    const VIEWPORT: Viewport = Viewport {
        width: 640.0,
        height: 400.0,
    };

    #[test]
    fn update_resolves_settings_and_renders() {
        let mut visual = visual();
        let svg = visual.update(Some(&data()), VIEWPORT);
        assert!(svg.contains("mekko-segment"));
        assert_eq!(
            visual.settings().legend.position,
            crate::settings::LegendPosition::Bottom
        );
        let legend = &visual.enumerate_object_instances("legend")[0];
        assert_eq!(legend.properties["position"], "bottom");
    }

    #[test]
    fn oversized_decimal_places_still_render() {
        let mut data = data();
        data.metadata.objects = Some(json!({
            "segmentLabels": { "decimalPlaces": 70000, "labelContentMode": "amountAndPercent" },
            "barTotals": { "decimalPlaces": 4294967295u64 }
        }));
        let mut visual = visual();
        let svg = visual.update(Some(&data), VIEWPORT);
        assert!(svg.contains("mekko-segment"));
        assert!(svg.len() < 200_000);
    }

    #[test]
    fn absent_data_renders_the_placeholder() {
        let mut visual = visual();
        let svg = visual.update(None, VIEWPORT);
        assert!(svg.contains("No data available"));
        assert!(!visual.model().has_data);
        assert_eq!(visual.hit_test(320.0, 200.0), None);
    }

    #[test]
    fn click_selects_only_segments_with_identity() {
        let mut visual = visual();
        visual.update(Some(&data()), VIEWPORT);
        assert!(visual.segment_click(0, 1, false));
        assert!(!visual.segment_click(1, 0, false));
        assert!(!visual.segment_click(9, 0, false));

        let events = visual.host().events();
        assert_eq!(events.len(), 1);
        let HostEvent::Selected(id) = &events[0] else {
            panic!("expected a selection, got {events:?}");
        };
        assert_eq!(
            id.downcast_ref::<RowIdentity>(),
            Some(&RowIdentity { row: 0, column: 1 })
        );
    }

    #[test]
    fn hover_and_leave_drive_the_tooltip() {
        let mut visual = visual();
        visual.update(Some(&data()), VIEWPORT);
        assert!(visual.segment_hover(0, 0, (12.0, 34.0)));
        visual.segment_leave();

        let events = visual.host().events();
        let HostEvent::TooltipShown(items) = &events[0] else {
            panic!("expected a tooltip, got {events:?}");
        };
        assert_eq!(items[0].display_name, "PDC");
        assert_eq!(items[0].value, "");
        assert_eq!(items[1].display_name, "Labour");
        assert_eq!(items[1].value, "60");
        assert!(matches!(
            events[1],
            HostEvent::TooltipHidden { immediately: true }
        ));
    }

    #[test]
    fn hit_test_maps_back_to_model_indices() {
        let mut visual = visual();
        visual.update(Some(&data()), VIEWPORT);
        let segment = visual.layout().and_then(|layout| layout.chart()).unwrap().bars[0]
            .segments[0]
            .rect;
        let hit = visual.hit_test(segment.x + 1.0, segment.bottom() - 1.0);
        assert_eq!(hit, Some((0, 0)));
    }

    #[test]
    fn top_n_runs_between_model_and_layout() {
        let mut data = data();
        data.metadata.objects = Some(json!({ "topN": { "enabled": true, "count": 1 } }));
        let mut visual = visual();
        visual.update(Some(&data), VIEWPORT);
        let names: Vec<&str> = visual
            .model()
            .bars
            .iter()
            .map(|bar| bar.category_name.as_str())
            .collect();
        assert_eq!(names, vec!["PDC", "Other"]);
    }

    #[test]
    fn destroy_forgets_the_last_update() {
        let mut visual = visual();
        visual.update(Some(&data()), VIEWPORT);
        visual.destroy();
        assert!(visual.layout().is_none());
        assert!(!visual.segment_click(0, 0, false));
    }
}

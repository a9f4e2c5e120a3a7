use crate::config::RenderConfig;
use crate::layout::{BarLayout, ChartLayout, LabelLayout, Layout, LayoutContent, LegendLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &Layout, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = layout.width.max(0.0);
    let height = layout.height.max(0.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" role=\"img\" aria-label=\"Mekko / Marimekko Chart\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str("<g class=\"mekko-container\">");

    match &layout.content {
        LayoutContent::Placeholder { label } => {
            svg.push_str(&label_svg("placeholder", label, theme));
        }
        LayoutContent::Chart(chart) => render_chart(&mut svg, chart, theme),
        LayoutContent::Blank => {}
    }

    svg.push_str("</g></svg>");
    svg
}

fn render_chart(svg: &mut String, chart: &ChartLayout, theme: &Theme) {
    if let Some(legend) = &chart.legend {
        render_legend(svg, legend, theme);
    }

    svg.push_str("<g class=\"mekko-bars\">");
    for bar in &chart.bars {
        render_bar(svg, bar, theme);
    }
    for label in chart.bars.iter().filter_map(|bar| bar.total_label.as_ref()) {
        svg.push_str(&label_svg("bar-total-label", label, theme));
    }
    svg.push_str("</g>");

    let axis: Vec<&LabelLayout> = chart
        .bars
        .iter()
        .filter_map(|bar| bar.axis_label.as_ref())
        .collect();
    if !axis.is_empty() {
        svg.push_str("<g class=\"mekko-axis\">");
        for label in axis {
            svg.push_str(&label_svg("axis-label", label, theme));
        }
        svg.push_str("</g>");
    }
}

fn render_bar(svg: &mut String, bar: &BarLayout, theme: &Theme) {
    svg.push_str(&format!(
        "<g class=\"mekko-bar\" data-bar=\"{}\" aria-label=\"{}: {}\">",
        bar.index,
        escape_xml(&bar.category),
        bar.total
    ));
    for segment in &bar.segments {
        svg.push_str(&format!(
            "<rect class=\"mekko-segment\" data-bar=\"{}\" data-segment=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" role=\"graphics-symbol\" aria-label=\"{}: {}\" tabindex=\"0\"/>",
            segment.bar_index,
            segment.segment_index,
            segment.rect.x,
            segment.rect.y,
            segment.rect.width,
            segment.rect.height.max(0.0),
            escape_xml(&segment.color),
            theme.segment_stroke,
            theme.segment_stroke_width,
            escape_xml(&segment.series_name),
            segment.value
        ));
    }
    for label in bar.segments.iter().filter_map(|segment| segment.label.as_ref()) {
        svg.push_str(&label_svg("segment-label", label, theme));
    }
    svg.push_str("</g>");
}

fn render_legend(svg: &mut String, legend: &LegendLayout, theme: &Theme) {
    svg.push_str("<g class=\"mekko-legend\" role=\"list\" aria-label=\"Chart legend\">");
    for item in &legend.items {
        svg.push_str(&format!(
            "<g role=\"listitem\" aria-label=\"{}\">",
            escape_xml(&item.series_name)
        ));
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"2\" fill=\"{}\"/>",
            item.swatch.x,
            item.swatch.y,
            item.swatch.width,
            item.swatch.height,
            escape_xml(&item.color)
        ));
        svg.push_str(&label_svg("legend-label", &item.label, theme));
        svg.push_str("</g>");
    }
    svg.push_str("</g>");
}

fn label_svg(class: &str, label: &LabelLayout, theme: &Theme) -> String {
    let mut text = String::new();
    let weight = if label.bold { " font-weight=\"600\"" } else { "" };
    text.push_str(&format!(
        "<text class=\"{class}\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" dominant-baseline=\"{}\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{}\"{weight} pointer-events=\"none\">",
        label.x,
        label.first_line_y,
        label.anchor.as_svg(),
        label.baseline.as_svg(),
        escape_xml(&theme.font_family),
        label.font_size,
        escape_xml(&label.color),
    ));

    for (idx, line) in label.block.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { label.line_height };
        text.push_str(&format!(
            "<tspan x=\"{:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            label.x,
            escape_xml(line)
        ));
    }

    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 500.0))
        .ok_or_else(|| anyhow::anyhow!("invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(crate::error::MekkoError::Raster("built without the `png` feature".to_string()).into())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::model::{Model, RawBar, RawSegment};
    use crate::settings::Settings;
    use crate::text_metrics::FixedAdvanceMeasurer;
    use std::collections::HashMap;

    fn render(model: &Model) -> String {
        let theme = Theme::standard();
        let layout = compute_layout(
            model,
            &Settings::default(),
            &theme,
            &LayoutConfig::default(),
            640.0,
            360.0,
            &FixedAdvanceMeasurer::default(),
        );
        render_svg(&layout, &theme)
    }

    #[test]
    fn empty_model_renders_only_the_placeholder() {
        let svg = render(&Model::empty());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("No data available. Add Category, Series, and Values."));
        assert!(!svg.contains("mekko-segment"));
        assert!(!svg.contains("mekko-legend"));
    }

    #[test]
    fn chart_carries_segment_hooks_and_escapes_text() {
        let raw = vec![RawBar {
            category_name: "R&D <core>".to_string(),
            segments: vec![RawSegment {
                series_name: "Labour".to_string(),
                value: 42.0,
                selection_id: None,
            }],
        }];
        let colors = HashMap::from([("Labour".to_string(), "#01B8AA".to_string())]);
        let model = Model::from_raw(raw, vec!["Labour".to_string()], colors);
        let svg = render(&model);
        assert!(svg.contains("data-bar=\"0\" data-segment=\"0\""));
        assert!(svg.contains("aria-label=\"Labour: 42\""));
        assert!(svg.contains("R&amp;D &lt;core&gt;"));
        assert!(svg.contains("font-weight=\"600\""));
        assert!(svg.contains("stroke=\"#ffffff\" stroke-width=\"0.5\""));
    }

    #[test]
    fn escape_xml_covers_markup_characters() {
        assert_eq!(escape_xml("<a & 'b'>\""), "&lt;a &amp; &apos;b&apos;&gt;&quot;");
    }
}

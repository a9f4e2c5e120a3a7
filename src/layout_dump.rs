use crate::layout::{LabelLayout, Layout, LayoutContent, Rect};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub kind: String,
    pub width: f32,
    pub height: f32,
    pub plot: Option<[f32; 4]>,
    pub placeholder: Option<LabelDump>,
    pub bars: Vec<BarDump>,
    pub legend: Vec<LegendItemDump>,
}

#[derive(Debug, Serialize)]
pub struct BarDump {
    pub index: usize,
    pub category: String,
    pub total: f64,
    pub x: f32,
    pub width: f32,
    pub segments: Vec<SegmentDump>,
    pub total_label: Option<LabelDump>,
    pub axis_label: Option<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct SegmentDump {
    pub segment_index: usize,
    pub series: String,
    pub value: f64,
    pub rect: [f32; 4],
    pub color: String,
    pub label: Option<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub x: f32,
    pub y: f32,
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
}

#[derive(Debug, Serialize)]
pub struct LegendItemDump {
    pub series: String,
    pub color: String,
    pub swatch: [f32; 4],
}

fn rect_dump(rect: &Rect) -> [f32; 4] {
    [rect.x, rect.y, rect.width, rect.height]
}

impl From<&LabelLayout> for LabelDump {
    fn from(label: &LabelLayout) -> Self {
        Self {
            x: label.x,
            y: label.first_line_y,
            lines: label.block.lines.clone(),
            width: label.block.width,
            height: label.block.height,
            font_size: label.font_size,
        }
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let mut dump = LayoutDump {
            kind: String::new(),
            width: layout.width,
            height: layout.height,
            plot: None,
            placeholder: None,
            bars: Vec::new(),
            legend: Vec::new(),
        };
        match &layout.content {
            LayoutContent::Placeholder { label } => {
                dump.kind = "placeholder".to_string();
                dump.placeholder = Some(label.into());
            }
            LayoutContent::Blank => dump.kind = "blank".to_string(),
            LayoutContent::Chart(chart) => {
                dump.kind = "chart".to_string();
                dump.plot = Some(rect_dump(&chart.plot));
                dump.bars = chart
                    .bars
                    .iter()
                    .map(|bar| BarDump {
                        index: bar.index,
                        category: bar.category.clone(),
                        total: bar.total,
                        x: bar.x,
                        width: bar.width,
                        segments: bar
                            .segments
                            .iter()
                            .map(|segment| SegmentDump {
                                segment_index: segment.segment_index,
                                series: segment.series_name.clone(),
                                value: segment.value,
                                rect: rect_dump(&segment.rect),
                                color: segment.color.clone(),
                                label: segment.label.as_ref().map(LabelDump::from),
                            })
                            .collect(),
                        total_label: bar.total_label.as_ref().map(LabelDump::from),
                        axis_label: bar.axis_label.as_ref().map(LabelDump::from),
                    })
                    .collect();
                dump.legend = chart
                    .legend
                    .iter()
                    .flat_map(|legend| legend.items.iter())
                    .map(|item| LegendItemDump {
                        series: item.series_name.clone(),
                        color: item.color.clone(),
                        swatch: rect_dump(&item.swatch),
                    })
                    .collect();
            }
        }
        dump
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

use log::trace;

use crate::config::LayoutConfig;
use crate::format::{bar_total_label, segment_label};
use crate::model::{Bar, Model, Segment};
use crate::settings::{LabelPosition, Settings};
use crate::text_metrics::TextMeasurer;

use super::text::{pt_to_px, single_line_block, wrap_block};
use super::{BarLayout, Baseline, LabelLayout, Rect, SegmentLayout, TextAnchor};

/// Pixel width of each bar across `available_width`, gaps excluded.
pub fn bar_widths(model: &Model, available_width: f32, config: &LayoutConfig) -> Vec<f32> {
    let gaps = config.bar_gap * model.bars.len().saturating_sub(1) as f32;
    let distributable = available_width - gaps;
    model
        .bars
        .iter()
        .map(|bar| (bar.bar_width_fraction as f32 * distributable).max(config.min_bar_width))
        .collect()
}

pub(super) struct BarContext<'a> {
    pub model: &'a Model,
    pub settings: &'a Settings,
    pub config: &'a LayoutConfig,
    pub measurer: &'a dyn TextMeasurer,
    pub plot: Rect,
}

pub(super) fn layout_bars(ctx: &BarContext<'_>) -> Vec<BarLayout> {
    let widths = bar_widths(ctx.model, ctx.plot.width, ctx.config);
    let mut x = ctx.plot.x;
    let mut bars = Vec::with_capacity(widths.len());
    for (index, (bar, width)) in ctx.model.bars.iter().zip(widths).enumerate() {
        bars.push(layout_bar(ctx, index, bar, x, width));
        x += width + ctx.config.bar_gap;
    }
    bars
}

fn layout_bar(ctx: &BarContext<'_>, index: usize, bar: &Bar, x: f32, width: f32) -> BarLayout {
    let plot = ctx.plot;
    let mut y = plot.bottom();
    let mut segments = Vec::with_capacity(bar.segments.len());
    for (segment_index, segment) in bar.segments.iter().enumerate() {
        if segment.absolute_value <= 0.0 {
            continue;
        }
        let height = (segment.percent_of_bar as f32 * plot.height).max(0.0);
        y -= height;
        let rect = Rect {
            x,
            y,
            width,
            height,
        };
        let label = if ctx.settings.segment_labels.show {
            segment_label_layout(ctx, segment, bar, rect)
        } else {
            None
        };
        segments.push(SegmentLayout {
            bar_index: index,
            segment_index,
            series_name: segment.series_name.clone(),
            value: segment.absolute_value,
            rect,
            color: segment.color.clone(),
            label,
        });
    }

    let total_label = if ctx.settings.bar_totals.show {
        bar_total_layout(ctx, bar, x, width)
    } else {
        None
    };
    let axis_label = if ctx.settings.category_axis.show {
        axis_label_layout(ctx, bar, x, width)
    } else {
        None
    };

    BarLayout {
        index,
        category: bar.category_name.clone(),
        total: bar.bar_total,
        x,
        width,
        segments,
        total_label,
        axis_label,
    }
}

fn segment_label_layout(
    ctx: &BarContext<'_>,
    segment: &Segment,
    bar: &Bar,
    rect: Rect,
) -> Option<LabelLayout> {
    let settings = &ctx.settings.segment_labels;
    if segment.percent_of_bar * 100.0 < settings.min_threshold {
        trace!(
            "segment {}/{} below label threshold",
            bar.category_name, segment.series_name
        );
        return None;
    }
    let text = segment_label(segment, bar, ctx.model.grand_total, settings);
    let font_size = pt_to_px(settings.font_size);
    let line_height = font_size * ctx.config.label_line_height;

    if settings.label_position == LabelPosition::Outside {
        return Some(LabelLayout {
            x: rect.x + rect.width / 2.0,
            first_line_y: rect.y - ctx.config.outside_label_offset,
            block: single_line_block(
                &text,
                font_size,
                ctx.config.label_line_height,
                ctx.measurer,
            ),
            font_size,
            line_height,
            color: settings.font_color.clone(),
            anchor: TextAnchor::Middle,
            baseline: Baseline::Auto,
            bold: false,
        });
    }

    let block = wrap_block(
        &text,
        rect.width - ctx.config.label_inset_x,
        font_size,
        ctx.config.label_line_height,
        ctx.measurer,
    );
    let Some(block) = block.filter(|block| !block.lines.is_empty()) else {
        trace!("label {text:?} does not fit bar width {}", rect.width);
        return None;
    };
    if block.height > rect.height - ctx.config.label_inset_y {
        trace!("label {text:?} does not fit segment height {}", rect.height);
        return None;
    }
    let center_y = rect.y + rect.height / 2.0;
    Some(LabelLayout {
        x: rect.x + rect.width / 2.0,
        first_line_y: center_y - block.height / 2.0 + line_height / 2.0,
        block,
        font_size,
        line_height,
        color: settings.font_color.clone(),
        anchor: TextAnchor::Middle,
        baseline: Baseline::Central,
        bold: false,
    })
}

/// The last line sits just above the plot; extra lines push the label upward.
fn bar_total_layout(ctx: &BarContext<'_>, bar: &Bar, x: f32, width: f32) -> Option<LabelLayout> {
    let settings = &ctx.settings.bar_totals;
    let text = bar_total_label(bar, ctx.model.grand_total, settings);
    let font_size = pt_to_px(settings.font_size);
    let line_height = font_size * ctx.config.label_line_height;
    let block = wrap_block(
        &text,
        width,
        font_size,
        ctx.config.label_line_height,
        ctx.measurer,
    )
    .filter(|block| !block.lines.is_empty())?;
    let last_line_y = ctx.plot.y - ctx.config.bar_total_offset;
    Some(LabelLayout {
        x: x + width / 2.0,
        first_line_y: last_line_y - (block.lines.len() - 1) as f32 * line_height,
        block,
        font_size,
        line_height,
        color: settings.font_color.clone(),
        anchor: TextAnchor::Middle,
        baseline: Baseline::Auto,
        bold: true,
    })
}

/// The first line hangs below the plot; extra lines grow downward.
fn axis_label_layout(ctx: &BarContext<'_>, bar: &Bar, x: f32, width: f32) -> Option<LabelLayout> {
    let settings = &ctx.settings.category_axis;
    let font_size = pt_to_px(settings.font_size);
    let block = wrap_block(
        &bar.category_name,
        width,
        font_size,
        ctx.config.label_line_height,
        ctx.measurer,
    )
    .filter(|block| !block.lines.is_empty())?;
    Some(LabelLayout {
        x: x + width / 2.0,
        first_line_y: ctx.plot.bottom() + ctx.config.axis_label_offset,
        block,
        font_size,
        line_height: font_size * ctx.config.label_line_height,
        color: settings.font_color.clone(),
        anchor: TextAnchor::Middle,
        baseline: Baseline::Hanging,
        bold: false,
    })
}

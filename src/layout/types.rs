#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Half-open on the far edges so adjacent rectangles never both claim a point.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    Auto,
    Central,
    Hanging,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
        }
    }
}

impl Baseline {
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Central => "central",
            Self::Hanging => "hanging",
        }
    }
}

/// A positioned label. Line `i` sits at `first_line_y + i * line_height`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub x: f32,
    pub first_line_y: f32,
    pub block: TextBlock,
    pub font_size: f32,
    pub line_height: f32,
    pub color: String,
    pub anchor: TextAnchor,
    pub baseline: Baseline,
    pub bold: bool,
}

impl LabelLayout {
    pub fn line_y(&self, index: usize) -> f32 {
        self.first_line_y + index as f32 * self.line_height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLayout {
    pub bar_index: usize,
    /// Index into the model bar's segment list; skipped segments leave gaps.
    pub segment_index: usize,
    pub series_name: String,
    pub value: f64,
    pub rect: Rect,
    pub color: String,
    pub label: Option<LabelLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub index: usize,
    pub category: String,
    pub total: f64,
    pub x: f32,
    pub width: f32,
    pub segments: Vec<SegmentLayout>,
    pub total_label: Option<LabelLayout>,
    pub axis_label: Option<LabelLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItemLayout {
    pub series_name: String,
    pub color: String,
    pub swatch: Rect,
    pub label: LabelLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    pub bounds: Rect,
    pub rows: usize,
    pub items: Vec<LegendItemLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub plot: Rect,
    pub bars: Vec<BarLayout>,
    pub legend: Option<LegendLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutContent {
    /// No data: only the placeholder message is drawn.
    Placeholder { label: LabelLayout },
    Chart(ChartLayout),
    /// The viewport left no room for a plot; nothing is drawn this update.
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub content: LayoutContent,
}

impl Layout {
    pub fn chart(&self) -> Option<&ChartLayout> {
        match &self.content {
            LayoutContent::Chart(chart) => Some(chart),
            _ => None,
        }
    }

    /// The segment drawn under a point, as `(bar_index, segment_index)`.
    pub fn segment_at(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        self.chart()?
            .bars
            .iter()
            .flat_map(|bar| bar.segments.iter())
            .find(|segment| segment.rect.contains(x, y))
            .map(|segment| (segment.bar_index, segment.segment_index))
    }
}

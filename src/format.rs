//! Label text: unit-scaled amounts, percentages and their composites.

use log::trace;
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

use crate::model::{Bar, Segment, ratio};
use crate::settings::{BarTotalSettings, SegmentLabelSettings};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum DisplayUnits {
    #[default]
    Auto,
    None,
    Thousands,
    Millions,
    Billions,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum LabelContentMode {
    #[default]
    Amount,
    #[serde(alias = "percentTotal")]
    PercentOfTotal,
    #[serde(alias = "percentBar")]
    PercentWithinBar,
    #[serde(alias = "amountPercentTotal")]
    AmountAndPercent,
    CategoryAmount,
    CategoryPercentTotal,
    CategoryPercentBar,
    #[serde(alias = "categoryAmountPercentTotal")]
    CategoryAmountAndPercent,
    Custom,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TotalLabelFormat {
    #[default]
    Amount,
    AmountPercentTotal,
}

impl DisplayUnits {
    /// Divisor and suffix applied to `value`.
    pub fn scale_for(self, value: f64) -> (f64, &'static str) {
        match self {
            Self::Auto => {
                let magnitude = value.abs();
                if magnitude >= 1.0e9 {
                    (1.0e9, "B")
                } else if magnitude >= 1.0e6 {
                    (1.0e6, "M")
                } else if magnitude >= 1.0e4 {
                    (1.0e3, "k")
                } else {
                    (1.0, "")
                }
            }
            Self::None => (1.0, ""),
            Self::Thousands => (1.0e3, "k"),
            Self::Millions => (1.0e6, "M"),
            Self::Billions => (1.0e9, "B"),
        }
    }
}

/// Scale, fix the precision, group the integer digits and prefix the currency.
pub fn format_amount(
    value: f64,
    units: DisplayUnits,
    decimal_places: u32,
    currency_symbol: &str,
) -> String {
    let (divisor, suffix) = units.scale_for(value);
    let formatted = with_thousands_separator(value / divisor, decimal_places);
    if currency_symbol.is_empty() {
        format!("{formatted}{suffix}")
    } else {
        format!("{currency_symbol} {formatted}{suffix}")
    }
}

pub fn format_percent(fraction: f64, decimal_places: u32) -> String {
    format!("{}%", to_fixed(fraction * 100.0, decimal_places))
}

/// Upper bound on fraction digits; larger settings are clamped.
pub const MAX_DECIMAL_PLACES: u32 = 100;

/// Fixed-point text with ties rounded away from zero.
///
/// `{:.N}` alone rounds ties to even, so `2.5` would print as `2`.
pub fn to_fixed(value: f64, decimal_places: u32) -> String {
    let places = decimal_places.min(MAX_DECIMAL_PLACES);
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    // Past 2^52 every f64 is already a whole number and there is no tie left.
    let rounded = if scaled.is_finite() && scaled.abs() < 4_503_599_627_370_496.0 {
        scaled.round() / factor
    } else {
        value
    };
    format!("{:.*}", places as usize, rounded)
}

/// Separators go into the integer digits only; the fraction is left as printed.
fn with_thousands_separator(value: f64, decimal_places: u32) -> String {
    let fixed = to_fixed(value, decimal_places);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    let grouped = integer
        .parse::<u128>()
        .map(|digits| digits.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| integer.to_string());
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Everything a label needs to know about the value it describes.
#[derive(Debug, Clone, Default)]
pub struct LabelContext<'a> {
    /// Raw, unnormalized value; preferred when present.
    pub value_original: Option<f64>,
    pub value_absolute: Option<f64>,
    pub value: Option<f64>,
    pub category_name: &'a str,
    pub grand_total: f64,
    pub bar_total: f64,
    pub custom_label_text: &'a str,
    pub display_units: DisplayUnits,
    pub decimal_places: u32,
    pub currency_symbol: &'a str,
}

impl LabelContext<'_> {
    /// Magnitude of the first available value source; sign is never shown.
    pub fn amount(&self) -> f64 {
        self.value_original
            .or(self.value_absolute)
            .or(self.value)
            .unwrap_or(0.0)
            .abs()
    }
}

pub fn format_label(context: &LabelContext<'_>, mode: LabelContentMode) -> String {
    let amount = context.amount();
    trace!(
        "label mode={mode:?} original={:?} absolute={:?} value={:?} amount={amount}",
        context.value_original, context.value_absolute, context.value
    );
    let dp = context.decimal_places;
    let amt = || format_amount(amount, context.display_units, dp, context.currency_symbol);
    let pct_total = || format_percent(ratio(amount, context.grand_total), dp);
    let pct_bar = || format_percent(ratio(amount, context.bar_total), dp);
    let cat = context.category_name;

    match mode {
        LabelContentMode::Amount => amt(),
        LabelContentMode::PercentOfTotal => pct_total(),
        LabelContentMode::PercentWithinBar => pct_bar(),
        LabelContentMode::AmountAndPercent => format!("{} | {}", amt(), pct_total()),
        LabelContentMode::CategoryAmount => format!("{cat} ({})", amt()),
        LabelContentMode::CategoryPercentTotal => format!("{cat} ({})", pct_total()),
        LabelContentMode::CategoryPercentBar => format!("{cat} ({})", pct_bar()),
        LabelContentMode::CategoryAmountAndPercent => {
            format!("{cat} ({} | {})", amt(), pct_total())
        }
        LabelContentMode::Custom if !context.custom_label_text.is_empty() => {
            context.custom_label_text.to_string()
        }
        LabelContentMode::Custom => amt(),
    }
}

/// Segment label, qualified by the segment's series name in the category modes.
pub fn segment_label(
    segment: &Segment,
    bar: &Bar,
    grand_total: f64,
    settings: &SegmentLabelSettings,
) -> String {
    let context = LabelContext {
        value_original: Some(segment.absolute_value),
        category_name: &segment.series_name,
        grand_total,
        bar_total: bar.bar_total,
        custom_label_text: &settings.custom_label_text,
        display_units: settings.display_units,
        decimal_places: settings.decimal_places,
        currency_symbol: &settings.currency_symbol,
        ..LabelContext::default()
    };
    format_label(&context, settings.label_content_mode)
}

pub fn bar_total_label(bar: &Bar, grand_total: f64, settings: &BarTotalSettings) -> String {
    let context = LabelContext {
        value_original: Some(bar.bar_total),
        category_name: &bar.category_name,
        grand_total,
        bar_total: bar.bar_total,
        display_units: settings.display_units,
        decimal_places: settings.decimal_places,
        currency_symbol: &settings.currency_symbol,
        ..LabelContext::default()
    };
    let mode = match settings.total_label_format {
        TotalLabelFormat::Amount => LabelContentMode::Amount,
        TotalLabelFormat::AmountPercentTotal => LabelContentMode::AmountAndPercent,
    };
    format_label(&context, mode)
}

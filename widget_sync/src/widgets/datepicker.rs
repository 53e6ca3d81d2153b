use crate::behavior_any;
use crate::error::{Result, WidgetError};
use crate::options::OptionBag;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior, WidgetMut};
use chrono::{Datelike, NaiveDate, Utc};
use types::{OptionType, OptionValue, Priority};

/// Client default for `dateFormat`.
pub const DEFAULT_DATE_FORMAT: &str = "mm/dd/yy";

static DATEPICKER_OPTIONS: OptionSchema = OptionSchema {
    widget: "datepicker",
    specs: &[
        OptionSpec::new("AltField", "altField", OptionType::String),
        OptionSpec::new("AltFormat", "altFormat", OptionType::String),
        OptionSpec::new("AutoSize", "autoSize", OptionType::Bool),
        OptionSpec::new("ChangeMonth", "changeMonth", OptionType::Bool),
        OptionSpec::new("ChangeYear", "changeYear", OptionType::Bool),
        OptionSpec::new("DateFormat", "dateFormat", OptionType::String),
        OptionSpec::new("DefaultDate", "defaultDate", OptionType::Any),
        OptionSpec::new("FirstDay", "firstDay", OptionType::Integer),
        OptionSpec::new("MaxDate", "maxDate", OptionType::Any),
        OptionSpec::new("MinDate", "minDate", OptionType::Any),
        OptionSpec::new("NumberOfMonths", "numberOfMonths", OptionType::Any),
        OptionSpec::new("ShortYearCutoff", "shortYearCutoff", OptionType::Any),
        OptionSpec::new("ShowButtonPanel", "showButtonPanel", OptionType::Bool),
        OptionSpec::new("YearRange", "yearRange", OptionType::String),
    ],
    parent: Some(&COMMON_OPTIONS),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Parse,
    Format,
}

// Translate a client date format (`dd`, `mm`, `yy`, `'literal'`, ...) into
// a chrono format string.
fn chrono_format(client_format: &str, direction: Direction) -> String {
    let chars: Vec<char> = client_format.chars().collect();
    let mut out = String::with_capacity(client_format.len() * 2);
    let mut i = 0;

    let push_literal = |out: &mut String, c: char| {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    };

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        let doubled = chars.get(i + 1) == Some(&c);
        let unpadded = |padded: &'static str, bare: &'static str| {
            if direction == Direction::Parse {
                padded
            } else {
                bare
            }
        };

        let spec = match (c, doubled) {
            ('d', true) => "%d",
            ('d', false) => unpadded("%d", "%-d"),
            ('o', true) => "%j",
            ('o', false) => unpadded("%j", "%-j"),
            ('D', true) => "%A",
            ('D', false) => "%a",
            ('m', true) => "%m",
            ('m', false) => unpadded("%m", "%-m"),
            ('M', true) => "%B",
            ('M', false) => "%b",
            ('y', true) => "%Y",
            ('y', false) => "%y",
            _ => {
                push_literal(&mut out, c);
                i += 1;
                continue;
            }
        };

        out.push_str(spec);
        i += if doubled { 2 } else { 1 };
    }

    out
}

/// Century rule for two-digit (`y`) years.
///
/// A number is an absolute cutoff. A string such as `"+10"` is added to the
/// last two digits of the current year. Two-digit years at or below the
/// cutoff fall in the current century, later ones in the previous century.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortYearCutoff {
    Absolute(i32),
    Relative(i32),
}

impl Default for ShortYearCutoff {
    fn default() -> Self {
        Self::Relative(10)
    }
}

impl ShortYearCutoff {
    /// Read the `shortYearCutoff` option; anything unusable is the default.
    pub fn from_option(value: &OptionValue) -> Self {
        match value {
            OptionValue::Integer(cutoff) => {
                i32::try_from(*cutoff).map_or_else(|_| Self::default(), Self::Absolute)
            }
            OptionValue::String(offset) => offset
                .trim()
                .parse::<i32>()
                .map_or_else(|_| Self::default(), Self::Relative),
            _ => Self::default(),
        }
    }

    /// Full year for the two digits `short` (0 to 99).
    pub fn expand(self, short: i32, current_year: i32) -> i32 {
        let cutoff = match self {
            Self::Absolute(cutoff) => cutoff,
            Self::Relative(offset) => current_year.rem_euclid(100) + offset,
        };
        let century = current_year - current_year.rem_euclid(100);

        if short <= cutoff {
            century + short
        } else {
            century - 100 + short
        }
    }
}

fn uses_short_year(chrono_format: &str) -> bool {
    let mut chars = chrono_format.chars();
    while let Some(c) = chars.next() {
        if c == '%' && chars.next() == Some('y') {
            return true;
        }
    }
    false
}

/// Parse `text` according to a client date format. Two-digit years use the
/// default cutoff as of today.
pub fn parse_date(text: &str, client_format: &str) -> Option<NaiveDate> {
    parse_date_with_cutoff(
        text,
        client_format,
        ShortYearCutoff::default(),
        Utc::now().year(),
    )
}

/// Parse `text` according to a client date format, expanding two-digit
/// years with `cutoff` as of `current_year`.
pub fn parse_date_with_cutoff(
    text: &str,
    client_format: &str,
    cutoff: ShortYearCutoff,
    current_year: i32,
) -> Option<NaiveDate> {
    let format = chrono_format(client_format, Direction::Parse);
    let date = NaiveDate::parse_from_str(text.trim(), &format).ok()?;

    if !uses_short_year(&format) {
        return Some(date);
    }

    // chrono reads `%y` with a fixed pivot year; re-centre on the cutoff.
    date.with_year(cutoff.expand(date.year().rem_euclid(100), current_year))
}

/// Render `date` according to a client date format.
pub fn format_date(date: NaiveDate, client_format: &str) -> String {
    date.format(&chrono_format(client_format, Direction::Format))
        .to_string()
}

/// Date picker bound to a text input.
///
/// `_DateTime` carries the input text. Unparsable or out-of-range text
/// leaves the picker without a selection and yields a validation message.
#[derive(Debug, Default)]
pub struct Datepicker {
    date: Option<NaiveDate>,
}

impl Datepicker {
    pub const fn new() -> Self {
        Self { date: None }
    }

    pub fn date(widget: &Widget) -> Option<NaiveDate> {
        widget.behavior::<Self>().ok().and_then(|picker| picker.date)
    }

    fn date_format(options: &OptionBag) -> String {
        options
            .get("DateFormat")
            .ok()
            .and_then(OptionValue::as_str)
            .unwrap_or(DEFAULT_DATE_FORMAT)
            .to_string()
    }

    fn short_year_cutoff(options: &OptionBag) -> ShortYearCutoff {
        options
            .get("ShortYearCutoff")
            .map_or_else(|_| ShortYearCutoff::default(), ShortYearCutoff::from_option)
    }

    fn bound(
        options: &OptionBag,
        name: &str,
        parse: impl Fn(&str) -> Option<NaiveDate>,
    ) -> Option<NaiveDate> {
        options
            .get(name)
            .ok()
            .and_then(OptionValue::as_str)
            .and_then(parse)
    }

    /// Select `date` (or clear the selection) on both sides.
    ///
    /// # Errors
    ///
    /// `WrongWidgetType` if the widget is not a datepicker.
    pub fn set_date(widget: &mut WidgetMut<'_>, date: Option<NaiveDate>) -> Result<()> {
        widget.behavior_mut::<Self>()?.date = date;

        let format = Self::date_format(widget.widget().options());
        let text = date.map(|date| format_date(date, &format));

        widget.store_option("DefaultDate", text.clone())?;
        widget.call("setDate", vec![OptionValue::from(text)], Priority::Low);

        Ok(())
    }
}

impl WidgetBehavior for Datepicker {
    fn schema(&self) -> &'static OptionSchema {
        &DATEPICKER_OPTIONS
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        &["_DateTime"]
    }

    fn apply_feedback(
        &mut self,
        field: &str,
        raw: &str,
        options: &mut OptionBag,
    ) -> Result<()> {
        self.date = None;
        options.set("DefaultDate", OptionValue::Null)?;

        if raw.trim().is_empty() {
            return Ok(());
        }

        let format = Self::date_format(options);
        let cutoff = Self::short_year_cutoff(options);
        let current_year = Utc::now().year();
        let parse =
            |text: &str| parse_date_with_cutoff(text, &format, cutoff, current_year);

        let date = parse(raw).ok_or_else(|| {
            WidgetError::malformed(field, format!("{raw:?} is not a valid date"))
        })?;

        if Self::bound(options, "MinDate", parse).is_some_and(|min| date < min)
            || Self::bound(options, "MaxDate", parse).is_some_and(|max| date > max)
        {
            return Err(WidgetError::malformed(
                field,
                format!("{raw} is outside the allowed range"),
            ));
        }

        self.date = Some(date);
        options.set("DefaultDate", raw.trim())?;

        Ok(())
    }

    behavior_any!();
}

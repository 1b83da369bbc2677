//! Slicer implementations

use super::types::{Slicer, Slices, StreamSlice};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

// ============================================================================
// Single Slicer
// ============================================================================

/// One trivial slice per read
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleSlicer;

impl Slicer for SingleSlicer {
    fn slices(&self, _stream_state: &JsonValue) -> Result<Slices<'_>> {
        Ok(Box::new(std::iter::once(StreamSlice::new())))
    }
}

// ============================================================================
// List Slicer
// ============================================================================

/// One slice per value of a static list, e.g. regions or account ids
#[derive(Debug, Clone)]
pub struct ListSlicer {
    values: Vec<JsonValue>,
    field: String,
}

impl ListSlicer {
    /// Create a new list slicer
    pub fn new<V: Into<JsonValue>>(
        values: impl IntoIterator<Item = V>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            field: field.into(),
        }
    }
}

impl Slicer for ListSlicer {
    fn slices(&self, _stream_state: &JsonValue) -> Result<Slices<'_>> {
        Ok(Box::new(self.values.iter().map(move |v| {
            StreamSlice::new().with_value(self.field.clone(), v.clone())
        })))
    }
}

// ============================================================================
// Datetime Slicer
// ============================================================================

/// How window bounds are written into a slice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatetimeFormat {
    /// RFC 3339 strings
    #[default]
    Rfc3339,
    /// Integer epoch seconds
    EpochSeconds,
    /// A chrono `strftime` pattern
    Pattern(String),
}

/// Date-range slicer
///
/// Emits consecutive `{start, end}` windows of `step` from the later of the
/// configured start date and the cursor value in the stream state, up to
/// the end date (now when unset). A state at or past the end yields no
/// slices. Windows are generated as they are pulled, so a small step over
/// a long range costs nothing up front.
#[derive(Debug, Clone)]
pub struct DatetimeSlicer {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    step: Duration,
    cursor_field: Option<String>,
    format: DatetimeFormat,
    start_key: String,
    end_key: String,
}

impl DatetimeSlicer {
    /// Create a new datetime slicer
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            start,
            end: None,
            step,
            cursor_field: None,
            format: DatetimeFormat::default(),
            start_key: "start".to_string(),
            end_key: "end".to_string(),
        }
    }

    /// Create from string values such as `"2024-01-01"` and `"1d"`
    pub fn from_strings(start: &str, step: &str) -> Result<Self> {
        Ok(Self::new(parse_datetime(start)?, parse_duration(step)?))
    }

    /// Fix the end of the range instead of using the current time
    #[must_use]
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Resume from this field of the stream state
    #[must_use]
    pub fn with_cursor_field(mut self, field: impl Into<String>) -> Self {
        self.cursor_field = Some(field.into());
        self
    }

    /// Set the output format of window bounds
    #[must_use]
    pub fn with_format(mut self, format: DatetimeFormat) -> Self {
        self.format = format;
        self
    }

    /// Rename the window keys
    #[must_use]
    pub fn with_keys(mut self, start_key: impl Into<String>, end_key: impl Into<String>) -> Self {
        self.start_key = start_key.into();
        self.end_key = end_key.into();
        self
    }

    fn resume_point(&self, stream_state: &JsonValue) -> Option<DateTime<Utc>> {
        let field = self.cursor_field.as_deref()?;
        stream_state.get(field).and_then(datetime_from_value)
    }

    fn format_bound(&self, dt: DateTime<Utc>) -> JsonValue {
        match &self.format {
            DatetimeFormat::Rfc3339 => JsonValue::String(dt.to_rfc3339()),
            DatetimeFormat::EpochSeconds => JsonValue::from(dt.timestamp()),
            DatetimeFormat::Pattern(pattern) => JsonValue::String(dt.format(pattern).to_string()),
        }
    }
}

impl Slicer for DatetimeSlicer {
    fn slices(&self, stream_state: &JsonValue) -> Result<Slices<'_>> {
        if self.step <= Duration::zero() {
            return Err(Error::config(format!(
                "Datetime slice step must be positive, got {}",
                self.step
            )));
        }

        let current = match self.resume_point(stream_state) {
            Some(resume) if resume > self.start => resume,
            _ => self.start,
        };

        Ok(Box::new(DatetimeWindows {
            slicer: self,
            current,
            end: self.end.unwrap_or_else(Utc::now),
        }))
    }
}

struct DatetimeWindows<'a> {
    slicer: &'a DatetimeSlicer,
    current: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Iterator for DatetimeWindows<'_> {
    type Item = StreamSlice;

    fn next(&mut self) -> Option<StreamSlice> {
        if self.current >= self.end {
            return None;
        }

        // past the representable range the window runs to the end
        let next = self
            .current
            .checked_add_signed(self.slicer.step)
            .map_or(self.end, |next| std::cmp::min(next, self.end));
        let slice = StreamSlice::new()
            .with_value(
                self.slicer.start_key.clone(),
                self.slicer.format_bound(self.current),
            )
            .with_value(self.slicer.end_key.clone(), self.slicer.format_bound(next));
        self.current = next;
        Some(slice)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a datetime string into UTC DateTime
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ndt.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Some(ndt) = NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|nd| nd.and_hms_opt(0, 0, 0))
        {
            return Ok(ndt.and_utc());
        }
    }

    Err(Error::config(format!("Invalid datetime format: {s}")))
}

/// Interpret a cursor value as a point in time
///
/// Accepts datetime strings and epoch seconds, either as a number or as a
/// numeric string such as Slack's `"1601234567.000200"`.
pub fn datetime_from_value(value: &JsonValue) -> Option<DateTime<Utc>> {
    let epoch = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => match s.parse::<f64>() {
            Ok(secs) => Some(secs),
            Err(_) => return parse_datetime(s).ok(),
        },
        _ => None,
    }?;

    #[allow(clippy::cast_possible_truncation)]
    DateTime::from_timestamp_millis((epoch * 1000.0).round() as i64)
}

/// Parse a duration string like "1d", "2h", "30m"; bare numbers are days
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let (num_str, unit) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&s[..i], c),
        _ => (s, 'd'),
    };

    let num: i64 = num_str
        .parse()
        .map_err(|_| Error::config(format!("Invalid duration number: {num_str}")))?;

    let duration = match unit {
        'w' => Duration::try_weeks(num),
        'd' => Duration::try_days(num),
        'h' => Duration::try_hours(num),
        'm' => Duration::try_minutes(num),
        's' => Duration::try_seconds(num),
        _ => return Err(Error::config(format!("Invalid duration suffix: {unit}"))),
    };
    duration.ok_or_else(|| Error::config(format!("Duration out of range: {s}")))
}

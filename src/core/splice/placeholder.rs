use serde::{Deserialize, Serialize};

use super::{SpliceError, SpliceResult};

/// One replacement instruction against the base recording's timeline.
///
/// `text_value` may be empty, in which case the window is cut and nothing is
/// inserted in its place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Window start in seconds
    pub start_time: f64,
    /// Window end in seconds (exclusive)
    pub end_time: f64,
    /// Replacement text
    pub text_value: String,
}

impl Placeholder {
    pub fn new(start_time: f64, end_time: f64, text_value: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text_value: text_value.into(),
        }
    }

    /// Whether this placeholder only removes audio.
    pub fn is_cut(&self) -> bool {
        self.text_value.trim().is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Parse the wire form: a JSON array of placeholder objects.
///
/// Types are strict. Numeric strings for times, a non-string `text_value`,
/// or a missing field are errors.
pub fn parse_placeholders(json: &str) -> SpliceResult<Vec<Placeholder>> {
    serde_json::from_str(json)
        .map_err(|e| SpliceError::Validation(format!("malformed placeholders: {e}")))
}

/// Stable-sort by `start_time` and check every window.
///
/// Ties keep input order. Rejects non-finite, negative, empty or inverted
/// windows, and any window that starts before the previous one ends.
pub fn validate_and_sort(mut placeholders: Vec<Placeholder>) -> SpliceResult<Vec<Placeholder>> {
    for (index, placeholder) in placeholders.iter().enumerate() {
        let Placeholder {
            start_time,
            end_time,
            ..
        } = *placeholder;

        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(SpliceError::Validation(format!(
                "placeholder {index}: times must be finite numbers"
            )));
        }
        if start_time < 0.0 {
            return Err(SpliceError::Validation(format!(
                "placeholder {index}: start_time {start_time} is negative"
            )));
        }
        if start_time >= end_time {
            return Err(SpliceError::Validation(format!(
                "placeholder {index}: start_time {start_time} must be before end_time {end_time}"
            )));
        }
    }

    placeholders.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    for pair in placeholders.windows(2) {
        if pair[1].start_time < pair[0].end_time {
            return Err(SpliceError::Validation(format!(
                "placeholder [{}, {}) overlaps [{}, {})",
                pair[1].start_time, pair[1].end_time, pair[0].start_time, pair[0].end_time
            )));
        }
    }

    Ok(placeholders)
}

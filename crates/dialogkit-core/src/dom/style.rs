//! CSS transition timing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The computed `transition-property` / `transition-duration` pair of an
/// element, as comma-separated CSS lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionStyle {
    pub property: String,
    pub duration: String,
}

impl TransitionStyle {
    pub fn new(property: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            duration: duration.into(),
        }
    }
}

/// Parse a single CSS `<time>` value (`0.3s`, `250ms`, `.5s`).
pub fn parse_time(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (number, scale) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 0.001)
    } else if let Some(s) = value.strip_suffix('s') {
        (s, 1.0)
    } else {
        return None;
    };

    let seconds = number.trim().parse::<f64>().ok()? * scale;
    if seconds < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(seconds).ok()
}

/// Longest transition duration among the transitioned properties.
///
/// Follows the CSS list rules: the duration list repeats to cover every
/// property, `none` entries do not transition, and an empty property list
/// means `all`. Unparseable durations count as zero.
pub fn longest_transition(style: &TransitionStyle) -> Duration {
    let durations: Vec<Duration> = style
        .duration
        .split(',')
        .map(|d| parse_time(d).unwrap_or(Duration::ZERO))
        .collect();

    let properties: Vec<&str> = if style.property.trim().is_empty() {
        vec!["all"]
    } else {
        style.property.split(',').map(str::trim).collect()
    };

    properties
        .iter()
        .enumerate()
        .filter(|(_, property)| !property.eq_ignore_ascii_case("none"))
        .map(|(i, _)| durations[i % durations.len()])
        .max()
        .unwrap_or(Duration::ZERO)
}

//! Chart Configuration
//!
//! Every field has a default, so a configuration document only needs to
//! name what it changes:
//!
//! ```json
//! { "width": 300, "margin": 20, "x_domain": [-3, 3], "durations": { "exit_ms": 0 } }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::join::Durations;

/// Per-side margins between the plot area and the outer box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Sides {
    fn default() -> Self {
        // Room for the tick labels of the bottom and left axes.
        Self {
            top: 10.0,
            right: 10.0,
            bottom: 35.0,
            left: 45.0,
        }
    }
}

/// A margin given either as one number for all sides or side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Margin {
    Uniform(f64),
    Sides(Sides),
}

impl Margin {
    pub fn sides(&self) -> Sides {
        match *self {
            Margin::Uniform(m) => Sides {
                top: m,
                right: m,
                bottom: m,
                left: m,
            },
            Margin::Sides(sides) => sides,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Margin::Sides(Sides::default())
    }
}

/// Layout, domain and timing options for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Outer width, margins included.
    pub width: f64,

    /// Outer height, margins included.
    pub height: f64,

    pub margin: Margin,

    /// Fixed x domain. Derived from the data when absent.
    pub x_domain: Option<[f64; 2]>,

    /// Fixed y domain. Derived from the data when absent.
    pub y_domain: Option<[f64; 2]>,

    /// Growth applied to a data-derived domain's span.
    pub domain_extend_factor: f64,

    /// Round data-derived domains outward to tick boundaries.
    pub nice: bool,

    pub tick_count: usize,

    /// Suffix of the `layer-<id>` group that holds the chart's marks.
    pub layer: String,

    pub durations: Durations,

    /// Frame period of the driver, in milliseconds.
    pub frame_ms: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 400.0,
            margin: Margin::default(),
            x_domain: None,
            y_domain: None,
            domain_extend_factor: 2.0,
            nice: true,
            tick_count: 10,
            layer: "points".to_owned(),
            durations: Durations::default(),
            frame_ms: 1000.0 / 60.0,
        }
    }
}

impl ChartConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(Error::Config)
    }

    /// Width of the plot area.
    pub fn inner_width(&self) -> f64 {
        let sides = self.margin.sides();
        (self.width - sides.left - sides.right).max(0.0)
    }

    /// Height of the plot area.
    pub fn inner_height(&self) -> f64 {
        let sides = self.margin.sides();
        (self.height - sides.top - sides.bottom).max(0.0)
    }

    /// The driver's frame period.
    pub fn frame_period(&self) -> Result<Duration> {
        millis(self.frame_ms)
    }
}

/// Convert fractional milliseconds to a duration.
pub fn millis(ms: f64) -> Result<Duration> {
    if !ms.is_finite() || ms < 0.0 {
        return Err(Error::InvalidDuration(ms));
    }
    Ok(Duration::from_secs_f64(ms / 1000.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = ChartConfig::from_json("{}").unwrap();
        assert_eq!(config, ChartConfig::default());
        assert_eq!(config.inner_width(), 445.0);
        assert_eq!(config.inner_height(), 355.0);
    }

    #[test]
    fn margin_accepts_number_or_sides() {
        let uniform = ChartConfig::from_json(r#"{"margin": 20}"#).unwrap();
        assert_eq!(uniform.margin.sides().left, 20.0);

        let sides = ChartConfig::from_json(r#"{"margin": {"left": 60}}"#).unwrap();
        assert_eq!(sides.margin.sides().left, 60.0);
        assert_eq!(sides.margin.sides().bottom, 35.0);
    }

    #[test]
    fn partial_durations_keep_defaults() {
        let json = r#"{"durations": {"exit_ms": 0}, "x_domain": [-3, 3]}"#;
        let config = ChartConfig::from_json(json).unwrap();
        assert_eq!(config.durations.exit, Duration::ZERO);
        assert_eq!(config.durations.enter, Duration::from_millis(500));
        assert_eq!(config.x_domain, Some([-3.0, 3.0]));
    }

    #[test]
    fn malformed_documents_are_config_errors() {
        assert!(matches!(ChartConfig::from_json(r#"{"width": "wide"}"#), Err(Error::Config(_))));
        assert!(matches!(ChartConfig::from_json("["), Err(Error::Config(_))));
    }

    #[test]
    fn frame_period_rejects_negative_values() {
        let config = ChartConfig {
            frame_ms: -1.0,
            ..ChartConfig::default()
        };
        assert!(matches!(config.frame_period(), Err(Error::InvalidDuration(_))));
        assert_eq!(millis(250.0).unwrap(), Duration::from_millis(250));
    }
}

//! Gauge math: clamping, circular stroke offsets and severity thresholds.

use std::f64::consts::PI;

/// Radius of the circular gauge the stroke offset is computed for.
pub const GAUGE_RADIUS: f64 = 54.0;

pub const ALERT_ABOVE: f64 = 80.0;
pub const WARNING_ABOVE: f64 = 60.0;

/// Network gauges treat this many Mbps as a full dial.
pub const NET_FULL_SCALE_MBPS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Nominal,
    Warning,
    Alert,
}

impl Severity {
    pub fn for_percent(pct: f64) -> Self {
        if pct > ALERT_ABOVE {
            Severity::Alert
        } else if pct > WARNING_ABOVE {
            Severity::Warning
        } else {
            Severity::Nominal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Nominal => "nominal",
            Severity::Warning => "warning",
            Severity::Alert => "alert",
        }
    }
}

/// NaN counts as 0.
pub fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 100.0)
    }
}

pub fn circumference(radius: f64) -> f64 {
    2.0 * PI * radius
}

/// Dash offset that leaves `pct` of the ring drawn.
pub fn stroke_offset(pct: f64, radius: f64) -> f64 {
    let c = circumference(radius);
    c - clamp_percent(pct) / 100.0 * c
}

/// Everything a gauge widget needs for one value.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReading {
    pub percent: f64,
    pub offset: f64,
    pub severity: Severity,
    pub label: String,
}

impl GaugeReading {
    pub fn from_percent(raw: f64) -> Self {
        let percent = clamp_percent(raw);
        Self {
            percent,
            offset: stroke_offset(percent, GAUGE_RADIUS),
            severity: Severity::for_percent(percent),
            label: format!("{}%", percent.round() as i64),
        }
    }

    /// Network dial: load is out_mbps against a 100 Mbps scale, label keeps the raw rate.
    pub fn from_mbps(mbps: f64) -> Self {
        let load = clamp_percent(mbps.min(NET_FULL_SCALE_MBPS));
        Self {
            percent: load,
            offset: stroke_offset(load, GAUGE_RADIUS),
            severity: Severity::for_percent(load),
            label: format!("{:.1} Mbps", mbps.max(0.0)),
        }
    }

    /// Ratio for widgets that want 0.0..=1.0.
    pub fn ratio(&self) -> f64 {
        self.percent / 100.0
    }
}

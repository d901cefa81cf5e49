#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    /// Seconds since the session started
    pub t: f64,
    /// Reaction time for the hit landed at `t`
    pub reaction_ms: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, reaction_ms: f64) -> Self {
        Self { t, reaction_ms }
    }
}

impl From<(f64, f64)> for TimeSeriesPoint {
    fn from(v: (f64, f64)) -> Self {
        TimeSeriesPoint {
            t: v.0,
            reaction_ms: v.1,
        }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.reaction_ms)
    }
}

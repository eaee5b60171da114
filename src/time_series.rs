/// Accepted live WPM reading, `t` seconds after the first keystroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Highest reading in the series, 0 when empty
pub fn peak_wpm(points: &[TimeSeriesPoint]) -> f64 {
    points.iter().map(|p| p.wpm).fold(0.0, f64::max)
}

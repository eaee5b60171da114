use essaytype::time_series::{peak_wpm, TimeSeriesPoint};

/// X (seconds) and Y (WPM) upper bounds for the results chart
pub fn compute_chart_params(samples: &[TimeSeriesPoint], time_limit: Option<u64>) -> (f64, f64) {
    let duration = samples
        .last()
        .map(|p| p.t)
        .or(time_limit.map(|secs| secs as f64))
        .unwrap_or(1.0)
        .max(1.0);

    (duration, peak_wpm(samples).round())
}

pub fn chart_data(samples: &[TimeSeriesPoint]) -> Vec<(f64, f64)> {
    samples.iter().copied().map(Into::into).collect()
}

/// Whole numbers without decimals, anything else to two places
pub fn format_label(val: f64) -> String {
    if val.fract().abs() < f64::EPSILON {
        format!("{val:.0}")
    } else {
        format!("{val:.2}")
    }
}

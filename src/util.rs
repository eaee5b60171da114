pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let variance = data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / data.len() as f64;
    Some(variance.sqrt())
}

/// Integer percentage `part / whole`, rounded; `None` when `whole` is zero
pub fn percent(part: usize, whole: usize) -> Option<u32> {
    if whole == 0 {
        return None;
    }
    Some((part as f64 * 100.0 / whole as f64).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[-10.0, 0.0, 10.0]), Some(0.0));
        assert_eq!(mean(&[42.0]), Some(42.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        let sd = std_dev(&[100., 120., 90., 102., 94.]).unwrap();
        assert!((sd - 10.322790320451151).abs() < 1e-9);
        assert_eq!(std_dev(&[42.0]), Some(0.0));
        assert_eq!(std_dev(&[5.0, 5.0, 5.0]), Some(0.0));
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(9, 10), Some(90));
        assert_eq!(percent(2, 3), Some(67));
        assert_eq!(percent(1, 200), Some(1)); // 0.5 rounds up
        assert_eq!(percent(0, 5), Some(0));
        assert_eq!(percent(3, 0), None);
    }
}

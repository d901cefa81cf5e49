/// Compute X (seconds) and Y (reaction ms) bounds for the results chart
pub fn compute_chart_params(reaction_coords: &[(f64, f64)]) -> (f64, f64) {
    let mut slowest = 0.0;
    for &(_, reaction) in reaction_coords {
        if reaction > slowest {
            slowest = reaction;
        }
    }

    let mut overall_duration = match reaction_coords.last() {
        Some(x) => x.0,
        None => 1.0,
    };
    if overall_duration < 1.0 {
        overall_duration = 1.0;
    }

    // headroom so the slowest hit doesn't sit on the frame
    (overall_duration, (slowest * 1.1).round().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[]);
        assert_eq!(x, 1.0);
        assert_eq!(y, 1.0);
    }

    #[test]
    fn test_compute_chart_params_scales_to_data() {
        let coords = vec![(1.0, 400.0), (5.0, 250.0), (12.0, 600.0)];
        let (x, y) = compute_chart_params(&coords);
        assert_eq!(x, 12.0);
        assert_eq!(y, 660.0);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}

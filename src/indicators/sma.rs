// =============================================================================
// Simple Moving Average (SMA) — shrink-window variant
// =============================================================================
//
// For bar i the average covers the last `min(window, i + 1)` values, so the
// first bars average over whatever prefix exists instead of being undefined:
//
//   SMA_i = sum(values[max(0, i + 1 - window) ..= i]) / len
//
// A window whose values are all equal averages to exactly that value. Other
// windows use compensated (Neumaier) summation, so fractional prices do not
// pick up rounding drift that differs between a short and a long window.
// =============================================================================

/// Shrink-window SMA of `values`, one output per input.
///
/// Returns an empty `Vec` when `window == 0`.
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            window_mean(&values[start..=i])
        })
        .collect()
}

/// Shrink-window SMA of bar volumes. Same policy as [`simple_moving_average`].
pub fn volume_moving_average(volumes: &[f64], window: usize) -> Vec<f64> {
    simple_moving_average(volumes, window)
}

/// Mean of a non-empty slice.
fn window_mean(slice: &[f64]) -> f64 {
    let first = slice[0];
    if slice.iter().all(|&v| v == first) {
        return first;
    }

    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for &v in slice {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    (sum + compensation) / slice.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_empty_input() {
        assert!(simple_moving_average(&[], 21).is_empty());
    }

    #[test]
    fn sma_window_zero() {
        assert!(simple_moving_average(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn sma_first_bar_is_its_own_close() {
        let closes = [10.0, 12.0, 14.0, 16.0, 18.0];
        let sma = simple_moving_average(&closes, 21);
        assert_eq!(sma.len(), 5);
        assert_eq!(sma[0], 10.0);
        assert!(sma.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn sma_shrinks_then_slides() {
        let values: Vec<f64> = (1..=6).map(|x| x as f64).collect();
        let sma = simple_moving_average(&values, 3);
        // Prefix averages 1, 1.5 then full windows 2, 3, 4, 5.
        assert_eq!(sma, vec![1.0, 1.5, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn sma_constant_input_is_exact() {
        let values = vec![2000.0; 60];
        let sma = simple_moving_average(&values, 21);
        assert!(sma.iter().all(|&v| v == 2000.0));
    }

    #[test]
    fn sma_fractional_constant_is_exact() {
        let values = vec![2341.7; 60];
        for window in [3, 21, 50] {
            assert!(simple_moving_average(&values, window)
                .iter()
                .all(|&v| v == 2341.7));
        }
        assert!(volume_moving_average(&vec![1234.56; 40], 20)
            .iter()
            .all(|&v| v == 1234.56));
    }

    #[test]
    fn sma_settles_after_a_step() {
        let mut values = vec![2300.3; 10];
        values.extend(vec![2341.7; 30]);
        let sma = simple_moving_average(&values, 21);
        // Windows ending at index 30 and later contain only the second level.
        assert!(sma[30..].iter().all(|&v| v == 2341.7));
        assert!(sma[29] < 2341.7);
    }

    #[test]
    fn sma_fractional_window_is_close() {
        let values = [0.1, 0.2, 0.3, 0.4];
        let sma = simple_moving_average(&values, 4);
        assert!((sma[3] - 0.25).abs() < 1e-15);
    }

    #[test]
    fn volume_average_matches_sma() {
        let volumes = [100.0, 300.0, 200.0];
        assert_eq!(
            volume_moving_average(&volumes, 20),
            vec![100.0, 200.0, 200.0]
        );
    }
}

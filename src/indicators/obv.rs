// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Running total of volume signed by the direction of the close:
//   close_t <  close_{t-1}  => subtract volume_t
//   otherwise               => add volume_t
// The first bar has no predecessor and adds its volume.

/// OBV series, one value per bar. Inputs of different length are truncated
/// to the shorter one.
pub fn on_balance_volume(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let len = closes.len().min(volumes.len());
    let mut result = Vec::with_capacity(len);
    let mut total = 0.0;

    for i in 0..len {
        let falling = i > 0 && closes[i] < closes[i - 1];
        if falling {
            total -= volumes[i];
        } else {
            total += volumes[i];
        }
        result.push(total);
    }
    result
}

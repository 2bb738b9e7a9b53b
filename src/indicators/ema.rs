// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (window + 1)
//   EMA_0      = value_0
//   EMA_t      = EMA_{t-1} + multiplier * (value_t - EMA_{t-1})
//
// Seeding with the first value means there is no warm-up period: the output
// has exactly one value per input.
// =============================================================================

/// Compute the EMA series for `values` with look-back `window`.
///
/// # Edge cases
/// - `window == 0` => empty vec
/// - empty input   => empty vec
/// - A constant input produces exactly that constant (the increment form
///   adds `multiplier * 0.0`).
pub fn exponential_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    if window == 0 {
        return Vec::new();
    }

    let multiplier = 2.0 / (window as f64 + 1.0);

    let mut result = Vec::with_capacity(values.len());
    let mut prev = first;
    result.push(prev);
    for &value in &values[1..] {
        prev += multiplier * (value - prev);
        result.push(prev);
    }
    result
}

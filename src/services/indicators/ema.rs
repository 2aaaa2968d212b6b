//! Exponential Moving Average (EMA).

/// Recursive EMA with `alpha = 2 / (span + 1)`, seeded with the first value.
///
/// Non-adjusted definition `EMA_t = α·x_t + (1-α)·EMA_{t-1}`, evaluated in
/// that order so results match pandas `ewm(adjust=False)` bit for bit.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    values
        .iter()
        .scan(None::<f64>, |state, &x| {
            let next = match *state {
                None => x,
                Some(prev) => alpha * x + (1.0 - alpha) * prev,
            };
            *state = Some(next);
            Some(next)
        })
        .collect()
}

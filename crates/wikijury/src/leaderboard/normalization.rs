/// Min-max scaling onto `[0, 1]`.
///
/// A degenerate column (every value equal, including a single row) maps to
/// `1.0` everywhere instead of dividing by zero.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(min, f64::max);

    if min == max {
        return vec![1.0; values.len()];
    }

    let range = max - min;
    values
        .iter()
        .map(|value| ((value - min) / range).clamp(0.0, 1.0))
        .collect()
}

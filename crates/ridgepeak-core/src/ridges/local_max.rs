//! Local maxima of one coefficient row

/// Indices where `row` equals the maximum of the centered window.
///
/// The window is forced odd (an even size grows by one, zero becomes one).
/// The `window / 2` samples at either edge never qualify. Plateaus report
/// every index on the plateau. Indices come back ascending.
pub fn local_maxima(row: &[f64], window: usize) -> Vec<usize> {
    let window = if window % 2 == 0 { window + 1 } else { window };
    let half = window / 2;
    let n = row.len();
    if n < window {
        return Vec::new();
    }

    (half..n - half)
        .filter(|&i| {
            let max = row[i - half..=i + half]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            row[i] == max
        })
        .collect()
}

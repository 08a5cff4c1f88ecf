//! Trailing-window mean and sample standard deviation.
//!
//! Each window is recomputed from scratch (two passes over `window` values),
//! with deviations taken from the window's first value. Identical closes then
//! produce exact zero deviations whatever their binary representation, so a
//! flat window always has `std_dev == 0.0` and no z-score.

/// Mean and sample standard deviation of one window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl WindowStats {
    /// `(value - mean) / std_dev`, or `None` when the window has no spread.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if self.std_dev == 0.0 {
            return None;
        }
        let z = (value - self.mean) / self.std_dev;
        z.is_finite().then_some(z)
    }
}

/// Statistics for a single window. `values` must hold at least two points.
pub fn window_stats(values: &[f64]) -> WindowStats {
    let Some(&pivot) = values.first() else {
        return WindowStats {
            mean: f64::NAN,
            std_dev: f64::NAN,
        };
    };
    let n = values.len() as f64;
    let shifted_mean = values.iter().map(|v| v - pivot).sum::<f64>() / n;
    let sq_diff: f64 = values
        .iter()
        .map(|v| (v - pivot - shifted_mean).powi(2))
        .sum();
    WindowStats {
        mean: pivot + shifted_mean,
        std_dev: (sq_diff / (n - 1.0)).sqrt(),
    }
}

/// One entry per input value: `None` for the first `window - 1` positions,
/// then the stats of the trailing inclusive window ending there.
///
/// A `window` below 2 has no sample deviation, so every entry is `None`.
pub fn rolling_stats(values: &[f64], window: usize) -> Vec<Option<WindowStats>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    out.extend(std::iter::repeat_n(None, values.len().min(window - 1)));
    out.extend(values.windows(window).map(|w| Some(window_stats(w))));
    out
}

/// Easing curves for reveal sweeps, mapping progress `t ∈ [0, 1]` to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    InOutQuad,
    InOutCubic,
    OutCubic,
}

impl Ease {
    /// Eased value for `t`, clamped to `[0, 1]`. Exact at both endpoints.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }

    /// Progress of a sweep that started at `elapsed_ms == 0` and lasts `duration_ms`.
    pub fn progress(elapsed_ms: u64, duration_ms: u64) -> f64 {
        if duration_ms == 0 {
            return 1.0;
        }
        (elapsed_ms as f64 / duration_ms as f64).min(1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;

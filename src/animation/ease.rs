/// Easing curves applied to normalized transition progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// No easing.
    Linear,
    /// Quadratic ease-in (slow start).
    InQuad,
    /// Quadratic ease-out (slow end).
    OutQuad,
    /// Quadratic ease-in-out.
    InOutQuad,
}

impl Ease {
    /// Map progress `t` in `[0, 1]` through the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;

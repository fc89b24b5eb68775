/// Easing curves for presentational transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EasingFunction {
    Linear,
    #[default]
    EaseOutQuad,
    EaseOutCubic,
    /// Overshoots slightly before settling; used for callout entrances
    EaseOutBack,
}

/// Overshoot of [`EasingFunction::EaseOutBack`]
const BACK_OVERSHOOT: f64 = 1.70158;

impl EasingFunction {
    /// Maps linear progress to eased progress. Input is clamped to `[0, 1]`;
    /// every curve starts at `0` and ends at `1`.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let rest = 1.0 - t;
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseOutQuad => 1.0 - rest * rest,
            EasingFunction::EaseOutCubic => 1.0 - rest.powi(3),
            EasingFunction::EaseOutBack => {
                1.0 - (BACK_OVERSHOOT + 1.0) * rest.powi(3) + BACK_OVERSHOOT * rest.powi(2)
            }
        }
    }

    /// Value between `from` and `to` at linear progress `t`
    pub fn interpolate(&self, from: f64, to: f64, t: f64) -> f64 {
        lerp(from, to, self.apply(t))
    }
}

pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

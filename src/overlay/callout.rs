use crate::animation::interpolation::EasingFunction;
use crate::core::constants::CALLOUT_TRANSITION_MS;
use instant::Instant;
use std::time::Duration;

/// Scale a callout starts its entrance from
const ENTRANCE_START_SCALE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutPhase {
    Appearing,
    Shown,
}

/// Entrance transition of a callout.
///
/// Purely presentational: the callout's rectangle and hit-testing do not
/// change while it runs. A transition that was never started reports
/// [`CalloutPhase::Shown`].
#[derive(Debug, Clone)]
pub struct CalloutTransition {
    started: Option<Instant>,
    duration: Duration,
    easing: EasingFunction,
}

impl Default for CalloutTransition {
    fn default() -> Self {
        Self::new(Duration::from_millis(CALLOUT_TRANSITION_MS))
    }
}

impl CalloutTransition {
    pub fn new(duration: Duration) -> Self {
        Self {
            started: None,
            duration,
            easing: EasingFunction::EaseOutBack,
        }
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Starts (or restarts) the entrance now
    pub fn transition_in(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        self.started = Some(now);
    }

    pub fn is_started(&self) -> bool {
        self.started.is_some()
    }

    /// Linear progress in `[0, 1]`
    pub fn progress_at(&self, now: Instant) -> f64 {
        match self.started {
            None => 1.0,
            Some(_) if self.duration.is_zero() => 1.0,
            Some(started) => {
                let elapsed = now.saturating_duration_since(started);
                (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
            }
        }
    }

    pub fn phase_at(&self, now: Instant) -> CalloutPhase {
        if self.progress_at(now) < 1.0 {
            CalloutPhase::Appearing
        } else {
            CalloutPhase::Shown
        }
    }

    pub fn opacity_at(&self, now: Instant) -> f32 {
        EasingFunction::EaseOutQuad.apply(self.progress_at(now)) as f32
    }

    pub fn scale_at(&self, now: Instant) -> f32 {
        self.easing.interpolate(ENTRANCE_START_SCALE, 1.0, self.progress_at(now)) as f32
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating_at(Instant::now())
    }

    pub fn is_animating_at(&self, now: Instant) -> bool {
        self.phase_at(now) == CalloutPhase::Appearing
    }
}

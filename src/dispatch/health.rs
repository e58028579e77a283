use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::HealthState;

#[derive(Debug)]
struct HealthInner {
    state: HealthState,
    failure_streak: u32,
    degraded_until: Option<Instant>,
}

/// Failure streak and tagged health for one endpoint.
///
/// A demotion expires on its own; the endpoint then reads as `Unknown` until
/// its next call completes.
#[derive(Debug)]
pub struct EndpointHealth {
    inner: Mutex<HealthInner>,
}

impl Default for EndpointHealth {
    fn default() -> Self {
        Self {
            inner: Mutex::new(HealthInner {
                state: HealthState::Unknown,
                failure_streak: 0,
                degraded_until: None,
            }),
        }
    }
}

impl EndpointHealth {
    pub fn state(&self) -> HealthState {
        let mut inner = self.inner.lock();
        Self::expire(&mut inner);
        inner.state
    }

    pub fn failure_streak(&self) -> u32 {
        self.inner.lock().failure_streak
    }

    pub fn is_degraded(&self) -> bool {
        self.state() == HealthState::Degraded
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.state = HealthState::Healthy;
        inner.failure_streak = 0;
        inner.degraded_until = None;
    }

    /// Returns true when this failure demoted the endpoint.
    pub fn record_failure(&self, degrade_after: Option<u32>, cooldown: Duration) -> bool {
        let mut inner = self.inner.lock();
        Self::expire(&mut inner);
        inner.failure_streak = inner.failure_streak.saturating_add(1);

        match degrade_after {
            Some(threshold) if inner.failure_streak >= threshold => {
                let newly = inner.state != HealthState::Degraded;
                inner.state = HealthState::Degraded;
                inner.degraded_until = Some(Instant::now() + cooldown);
                newly
            }
            _ => false,
        }
    }

    fn expire(inner: &mut HealthInner) {
        if let Some(until) = inner.degraded_until {
            if Instant::now() >= until {
                inner.state = HealthState::Unknown;
                inner.failure_streak = 0;
                inner.degraded_until = None;
            }
        }
    }
}

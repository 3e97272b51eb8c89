use super::{Check, CheckOutcome, CheckTarget};
use crate::session::BrowserSession;
use crate::{Result, scripts};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Navigation Timing values as reported by the page, in epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTiming {
    #[serde(default)]
    pub navigation_start: f64,
    #[serde(default)]
    pub load_event_end: f64,
}

impl LoadTiming {
    /// `None` until the load event has completed.
    pub fn load_time(&self) -> Option<Duration> {
        if self.navigation_start > 0.0 && self.load_event_end >= self.navigation_start {
            Some(Duration::from_secs_f64(
                (self.load_event_end - self.navigation_start) / 1000.0,
            ))
        } else {
            None
        }
    }
}

/// Page load time stays under `max_load_time_ms`.
///
/// Uses Navigation Timing when the page reports it, otherwise the time the
/// readiness probe took.
pub struct PerformanceCheck;

#[async_trait]
impl Check for PerformanceCheck {
    fn name(&self) -> &str {
        "performance"
    }

    async fn run(&self, session: &mut dyn BrowserSession, target: &CheckTarget) -> Result<CheckOutcome> {
        let value = session.evaluate(scripts::NAVIGATION_TIMING).await?;
        let timing: LoadTiming = serde_json::from_value(value)?;

        let (load_time, source) = match timing.load_time() {
            Some(load_time) => (load_time, "navigation timing"),
            None => (target.ready_after, "readiness probe"),
        };
        let threshold = target.thresholds.max_load_time();

        tracing::debug!("Load time {:?} from {}", load_time, source);

        if load_time > threshold {
            Ok(CheckOutcome::Fail(format!(
                "Page load time of {:.2}s exceeds {:.2}s threshold ({})",
                load_time.as_secs_f64(),
                threshold.as_secs_f64(),
                source
            )))
        } else {
            Ok(CheckOutcome::Pass(format!(
                "Page load time of {:.2}s within {:.2}s threshold ({})",
                load_time.as_secs_f64(),
                threshold.as_secs_f64(),
                source
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_time_from_navigation_timing() {
        let timing: LoadTiming = serde_json::from_value(serde_json::json!({
            "navigationStart": 1_700_000_000_000u64,
            "loadEventEnd": 1_700_000_012_000u64
        }))
        .unwrap();
        assert_eq!(timing.load_time(), Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_incomplete_timing_has_no_load_time() {
        let timing: LoadTiming = serde_json::from_value(serde_json::json!({
            "navigationStart": 1_700_000_000_000u64,
            "loadEventEnd": 0
        }))
        .unwrap();
        assert_eq!(timing.load_time(), None);
        assert_eq!(LoadTiming::default().load_time(), None);
    }
}

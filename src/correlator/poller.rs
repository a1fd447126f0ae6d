// src/correlator/poller.rs
// Adaptive polling state machine (4.5): starts at base_interval, backs off
// exponentially after a quiet-poll threshold, resets on a fresh finding.

use crate::config::polling::PollingConfig;
use crate::error::RicochetResult;
use crate::model::{Finding, Severity};
use crate::store::{FindingsQuery, Store};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Fixed quiet-poll threshold before backoff kicks in (4.5).
const QUIET_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy)]
pub struct PollerState {
    pub current_interval: f64,
    pub quiet_polls: u32,
}

pub struct Poller {
    store: Store,
    config: PollingConfig,
    state: PollerState,
    last_poll_time: f64,
    start: Instant,
}

impl Poller {
    pub fn new(store: Store, config: PollingConfig) -> Self {
        let base = config.base_interval;
        Self {
            store,
            config,
            state: PollerState {
                current_interval: base,
                quiet_polls: 0,
            },
            last_poll_time: wall_clock_now(),
            start: Instant::now(),
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn is_timed_out(&self) -> bool {
        self.elapsed_seconds() > self.config.timeout
    }

    /// Run until `timeout` elapses or `cancel` fires, calling `on_findings`
    /// for every non-empty poll. Cancellation is propagated to the caller
    /// as `Ok(())` - the loop observes it the same way the reference loop
    /// observes an interrupt.
    pub async fn run(
        &mut self,
        min_severity: Option<Severity>,
        cancel: CancellationToken,
        mut on_findings: impl FnMut(Vec<Finding>),
    ) -> RicochetResult<()> {
        loop {
            if self.is_timed_out() || cancel.is_cancelled() {
                return Ok(());
            }

            let findings = self.poll_once(min_severity).await?;
            let got_findings = !findings.is_empty();
            if got_findings {
                on_findings(findings);
            }
            self.advance(got_findings);

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs_f64(self.state.current_interval)) => {}
                _ = cancel.cancelled() => return Ok(()),
            }
        }
    }

    /// One iteration: query since the last poll, then advance
    /// `last_poll_time` to now (after the query, matching the happens-before
    /// ordering in 4.5).
    async fn poll_once(&mut self, min_severity: Option<Severity>) -> RicochetResult<Vec<Finding>> {
        let query = FindingsQuery {
            since: Some(self.last_poll_time),
            min_severity,
        };
        let findings = self.store.get_findings(query).await?;
        self.last_poll_time = wall_clock_now();
        debug!(count = findings.len(), "poll iteration complete");
        Ok(findings)
    }

    fn advance(&mut self, got_findings: bool) {
        if got_findings && self.config.reset_on_callback {
            self.state.current_interval = self.config.base_interval;
            self.state.quiet_polls = 0;
            info!("new findings observed, polling interval reset");
        } else {
            self.state.quiet_polls += 1;
            if self.state.quiet_polls > QUIET_THRESHOLD {
                self.state.current_interval =
                    (self.state.current_interval * self.config.backoff_factor).min(self.config.max_interval);
            }
        }
    }
}

fn wall_clock_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

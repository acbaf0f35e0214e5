//! Update orchestrator.
//!
//! Owns the periodic refresh timer and drives every [`RefreshUnit`]
//! concurrently. A unit's failure is contained: it is logged, raised as a
//! notification, and flagged on the unit's section, while sibling units and
//! later ticks carry on. A panicking unit is caught as a last resort and
//! reported once per cycle.
//!
//! State machine: `Stopped` ⇄ `Running`. At most one timer is ever armed.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use futures::future::{join_all, FutureExt};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::notify::Notifier;
use crate::units::{RefreshUnit, UnitContext};
use crate::view::SectionId;

/// Default refresh cadence.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Outcome of one refresh cycle, by unit name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub succeeded: Vec<&'static str>,
    pub failed: Vec<&'static str>,
    pub panicked: Vec<&'static str>,
}

impl RefreshReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.panicked.is_empty()
    }
}

enum UnitOutcome {
    Rendered,
    Failed,
    Panicked,
}

struct Inner {
    units: Vec<Arc<dyn RefreshUnit>>,
    ctx: UnitContext,
    notifier: Notifier,
    interval: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
    refreshes: AtomicU64,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            handle.abort();
        }
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("units", &self.inner.units.len())
            .field("interval", &self.inner.interval)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    #[must_use]
    pub fn new(
        units: Vec<Arc<dyn RefreshUnit>>,
        ctx: UnitContext,
        notifier: Notifier,
        interval: Duration,
    ) -> Self {
        assert!(!interval.is_zero(), "refresh interval must be non-zero");
        Self {
            inner: Arc::new(Inner {
                units,
                ctx,
                notifier,
                interval,
                timer: Mutex::new(None),
                refreshes: AtomicU64::new(0),
            }),
        }
    }

    /// Arms the periodic timer. Returns `false` if it was already armed.
    ///
    /// The first tick fires one interval after arming. Each tick spawns its
    /// refresh, so a slow cycle may overlap the next one.
    pub fn start(&self) -> bool {
        let mut timer = self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if timer.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.interval;
        *timer = Some(tokio::spawn(run_timer(weak, period)));
        tracing::info!(
            interval_secs = period.as_secs_f64(),
            "orchestrator: auto-refresh started"
        );
        true
    }

    /// Disarms the timer. Returns `false` if it was not armed.
    pub fn stop(&self) -> bool {
        let handle = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle {
            Some(handle) => {
                handle.abort();
                tracing::info!("orchestrator: auto-refresh stopped");
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Number of full refresh cycles started so far.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.inner.refreshes.load(Ordering::Relaxed)
    }

    /// Runs every unit concurrently and waits for all of them to settle.
    ///
    /// Updates the view's `last_updated` timestamp unless a unit panicked.
    pub async fn refresh(&self) -> RefreshReport {
        self.inner.refresh_all().await
    }

    /// Re-runs only the units that depend on the user location.
    pub async fn refresh_dependent(&self) -> RefreshReport {
        self.inner.run_units(|unit| unit.reads_location()).await
    }

    /// Re-runs the units rendering the given sections.
    pub async fn refresh_sections(&self, sections: &[SectionId]) -> RefreshReport {
        self.inner
            .run_units(|unit| sections.contains(&unit.section()))
            .await
    }

    /// Initial load: render everything once and arm the timer.
    pub async fn on_load(&self) -> RefreshReport {
        self.start();
        self.refresh().await
    }

    /// Hidden pages stop polling; a page becoming visible resumes polling and
    /// refreshes immediately, outside the regular cadence.
    pub async fn on_visibility_change(&self, visibility: Visibility) -> Option<RefreshReport> {
        match visibility {
            Visibility::Hidden => {
                self.stop();
                None
            }
            Visibility::Visible => {
                self.start();
                Some(self.refresh().await)
            }
        }
    }

    pub fn on_unload(&self) {
        self.stop();
    }
}

async fn run_timer(inner: Weak<Inner>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        tokio::spawn(async move {
            inner.refresh_all().await;
        });
    }
}

impl Inner {
    async fn refresh_all(&self) -> RefreshReport {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        let report = self.run_units(|_| true).await;

        if report.panicked.is_empty() {
            self.ctx.view.update(|v| v.last_updated = Some(Utc::now()));
        } else {
            tracing::error!(
                units = ?report.panicked,
                "orchestrator: refresh cycle aborted by crashed units"
            );
            self.notifier.error("Error loading dashboard data");
        }

        tracing::debug!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "orchestrator: refresh cycle settled"
        );
        report
    }

    async fn run_units(&self, select: impl Fn(&dyn RefreshUnit) -> bool) -> RefreshReport {
        let selected = self.units.iter().filter(|&unit| select(&**unit));
        let outcomes = join_all(selected.map(|unit| async move {
            let outcome = self.run_unit(&**unit).await;
            (unit.name(), outcome)
        }))
        .await;

        let mut report = RefreshReport::default();
        for (name, outcome) in outcomes {
            match outcome {
                UnitOutcome::Rendered => report.succeeded.push(name),
                UnitOutcome::Failed => report.failed.push(name),
                UnitOutcome::Panicked => report.panicked.push(name),
            }
        }
        report
    }

    async fn run_unit(&self, unit: &dyn RefreshUnit) -> UnitOutcome {
        match AssertUnwindSafe(unit.run(&self.ctx)).catch_unwind().await {
            Ok(Ok(())) => UnitOutcome::Rendered,
            Ok(Err(e)) => {
                tracing::error!(unit = %unit.name(), error = %e, "orchestrator: unit refresh failed");
                let section = unit.section();
                self.notifier
                    .error(format!("Failed to load {}", section.label()));
                self.ctx
                    .view
                    .update(|v| v.mark_failed(section, e.to_string()));
                UnitOutcome::Failed
            }
            Err(panic) => {
                tracing::error!(
                    unit = %unit.name(),
                    panic = %panic_message(panic.as_ref()),
                    "orchestrator: unit panicked"
                );
                UnitOutcome::Panicked
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;

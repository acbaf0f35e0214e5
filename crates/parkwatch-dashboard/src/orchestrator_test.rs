use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use parkwatch_api::{ApiError, ParkingApiClient, SystemStats};
use parkwatch_core::UserLocation;
use tokio::sync::watch;

use super::*;
use crate::notify::NotificationLevel;
use crate::view::ViewHandle;

struct CountingUnit {
    name: &'static str,
    section: SectionId,
    reads_location: bool,
    runs: Arc<AtomicUsize>,
}

impl CountingUnit {
    fn new(name: &'static str, section: SectionId) -> (Self, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let unit = Self {
            name,
            section,
            reads_location: false,
            runs: Arc::clone(&runs),
        };
        (unit, runs)
    }

    fn reading_location(mut self) -> Self {
        self.reads_location = true;
        self
    }
}

impl RefreshUnit for CountingUnit {
    fn name(&self) -> &'static str {
        self.name
    }

    fn section(&self) -> SectionId {
        self.section
    }

    fn reads_location(&self) -> bool {
        self.reads_location
    }

    fn run<'a>(&'a self, _ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(Ok(())).boxed()
    }
}

struct StatsUnit;

impl RefreshUnit for StatsUnit {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn section(&self) -> SectionId {
        SectionId::SystemStats
    }

    fn run<'a>(&'a self, ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>> {
        async move {
            ctx.view.update(|v| {
                v.system_stats.render(SystemStats {
                    total_spots: 42,
                    ..SystemStats::default()
                });
            });
            Ok(())
        }
        .boxed()
    }
}

struct FailingUnit;

impl RefreshUnit for FailingUnit {
    fn name(&self) -> &'static str {
        "predictions"
    }

    fn section(&self) -> SectionId {
        SectionId::Predictions
    }

    fn run<'a>(&'a self, _ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>> {
        futures::future::ready(Err(ApiError::BadResponse {
            endpoint: "/api/predictions".to_string(),
            status: Some(503),
            message: "model offline".to_string(),
        }))
        .boxed()
    }
}

struct PanickingUnit;

impl RefreshUnit for PanickingUnit {
    fn name(&self) -> &'static str {
        "map-data"
    }

    fn section(&self) -> SectionId {
        SectionId::Map
    }

    fn run<'a>(&'a self, _ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>> {
        futures::future::lazy(|_| -> Result<(), ApiError> { panic!("marker layer exploded") })
            .boxed()
    }
}

fn boxed_unit(unit: impl RefreshUnit + 'static) -> Arc<dyn RefreshUnit> {
    Arc::new(unit)
}

fn test_context() -> UnitContext {
    let (_tx, rx) = watch::channel(UserLocation::default());
    UnitContext {
        api: ParkingApiClient::new("http://127.0.0.1:1", 1, "parkwatch-test")
            .expect("client construction should not fail"),
        view: ViewHandle::default(),
        location: rx,
    }
}

fn orchestrator(units: Vec<Arc<dyn RefreshUnit>>) -> (Orchestrator, ViewHandle, Notifier) {
    let ctx = test_context();
    let view = ctx.view.clone();
    let notifier = Notifier::default();
    let orch = Orchestrator::new(units, ctx, notifier.clone(), DEFAULT_REFRESH_INTERVAL);
    (orch, view, notifier)
}

#[tokio::test(start_paused = true)]
async fn repeated_start_arms_a_single_timer() {
    let (unit, runs) = CountingUnit::new("counter", SectionId::SystemStats);
    let (orch, _, _) = orchestrator(vec![boxed_unit(unit)]);

    assert!(!orch.stop());
    assert!(orch.start());
    assert!(!orch.start());
    assert!(orch.is_running());

    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(orch.refresh_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_disarms_the_timer() {
    let (unit, runs) = CountingUnit::new("counter", SectionId::SystemStats);
    let (orch, _, _) = orchestrator(vec![boxed_unit(unit)]);

    orch.start();
    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert!(orch.stop());
    assert!(!orch.stop());
    assert!(!orch.is_running());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_orchestrator_stops_polling() {
    let (unit, runs) = CountingUnit::new("counter", SectionId::SystemStats);
    let (orch, _, _) = orchestrator(vec![boxed_unit(unit)]);

    orch.start();
    drop(orch);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_unit_is_contained() {
    let (orch, view, notifier) =
        orchestrator(vec![boxed_unit(StatsUnit), boxed_unit(FailingUnit)]);

    let report = orch.refresh().await;

    assert_eq!(report.succeeded, ["stats"]);
    assert_eq!(report.failed, ["predictions"]);
    assert!(report.panicked.is_empty());

    let snapshot = view.snapshot();
    assert!(snapshot.is_failed(SectionId::Predictions));
    assert!(!snapshot.is_failed(SectionId::SystemStats));
    assert_eq!(
        snapshot.system_stats.data.as_ref().map(|s| s.total_spots),
        Some(42)
    );
    assert!(snapshot.last_updated.is_some());

    let recent = notifier.recent();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].level, NotificationLevel::Error);
    assert_eq!(recent[0].message, "Failed to load predictions");
}

#[tokio::test]
async fn panicking_unit_takes_the_aggregate_path() {
    let (orch, view, notifier) = orchestrator(vec![
        boxed_unit(StatsUnit),
        boxed_unit(PanickingUnit),
        boxed_unit(FailingUnit),
    ]);

    let report = orch.refresh().await;

    assert_eq!(report.panicked, ["map-data"]);
    assert_eq!(report.succeeded, ["stats"]);
    assert!(!report.is_clean());

    let snapshot = view.snapshot();
    assert!(snapshot.last_updated.is_none());
    assert!(snapshot.system_stats.data.is_some());

    let aggregate = notifier
        .recent()
        .into_iter()
        .filter(|n| n.message == "Error loading dashboard data")
        .count();
    assert_eq!(aggregate, 1);
}

#[tokio::test]
async fn refresh_dependent_runs_only_location_readers() {
    let (stats, stats_runs) = CountingUnit::new("system-stats", SectionId::SystemStats);
    let (recs, recs_runs) = CountingUnit::new("recommendations", SectionId::Recommendations);
    let (map, map_runs) = CountingUnit::new("map-data", SectionId::Map);
    let (orch, view, _) = orchestrator(vec![
        boxed_unit(stats),
        boxed_unit(recs.reading_location()),
        boxed_unit(map.reading_location()),
    ]);

    let report = orch.refresh_dependent().await;

    assert_eq!(report.succeeded, ["recommendations", "map-data"]);
    assert_eq!(stats_runs.load(Ordering::SeqCst), 0);
    assert_eq!(recs_runs.load(Ordering::SeqCst), 1);
    assert_eq!(map_runs.load(Ordering::SeqCst), 1);
    assert!(view.snapshot().last_updated.is_none());
    assert_eq!(orch.refresh_count(), 0);
}

#[tokio::test]
async fn refresh_sections_selects_by_section() {
    let (stats, stats_runs) = CountingUnit::new("system-stats", SectionId::SystemStats);
    let (parking, parking_runs) = CountingUnit::new("parking-status", SectionId::ParkingStatus);
    let (junctions, junction_runs) = CountingUnit::new("junction-status", SectionId::Junctions);
    let (orch, _, _) = orchestrator(vec![
        boxed_unit(stats),
        boxed_unit(parking),
        boxed_unit(junctions),
    ]);

    orch.refresh_sections(&[SectionId::ParkingStatus, SectionId::SystemStats])
        .await;

    assert_eq!(stats_runs.load(Ordering::SeqCst), 1);
    assert_eq!(parking_runs.load(Ordering::SeqCst), 1);
    assert_eq!(junction_runs.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn visibility_changes_drive_the_state_machine() {
    let (unit, runs) = CountingUnit::new("counter", SectionId::SystemStats);
    let (orch, _, _) = orchestrator(vec![boxed_unit(unit)]);

    let report = orch.on_load().await;
    assert!(report.is_clean());
    assert!(orch.is_running());
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    assert!(orch.on_visibility_change(Visibility::Hidden).await.is_none());
    assert!(!orch.is_running());
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // Becoming visible refreshes at once, before the first tick.
    let report = orch.on_visibility_change(Visibility::Visible).await;
    assert!(report.is_some());
    assert!(orch.is_running());
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    orch.on_unload();
    assert!(!orch.is_running());
}

//! End-to-end refresh behaviour against a mocked parking backend.

use std::sync::Arc;
use std::time::Duration;

use parkwatch_api::ParkingApiClient;
use parkwatch_core::Gazetteer;
use parkwatch_dashboard::{
    default_units, Dashboard, GpsOptions, LocationService, NotificationLevel, Notifier, SectionId,
    StaticGpsProvider,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dashboard_for(server: &MockServer) -> Dashboard {
    let api = ParkingApiClient::new(&server.uri(), 5, "parkwatch-test")
        .expect("client construction should not fail");
    let notifier = Notifier::default();
    let gazetteer = Arc::new(Gazetteer::embedded().expect("embedded gazetteer"));
    let location = LocationService::with_rng(gazetteer, notifier.clone(), StdRng::seed_from_u64(3));
    Dashboard::new(
        api,
        location,
        notifier,
        default_units(),
        Duration::from_secs(3),
        GpsOptions::default(),
    )
}

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_static_feeds(server: &MockServer) {
    mount_get(
        server,
        "/api/system-stats",
        serde_json::json!({
            "total_spots": 300,
            "available_spots": 120,
            "occupied_spots": 180,
            "occupancy_rate": 60.0,
            "active_junctions": 4
        }),
    )
    .await;
    mount_get(
        server,
        "/api/parking-status",
        serde_json::json!({
            "parking_lots": [
                { "id": "A", "name": "Lot A", "capacity": 100, "occupied": 40, "available": 60 }
            ]
        }),
    )
    .await;
    mount_get(
        server,
        "/api/junction-status",
        serde_json::json!({
            "junctions": [
                { "id": "J1", "name": "Main & 1st", "traffic_level": "high", "wait_time": 45 }
            ]
        }),
    )
    .await;
    mount_get(
        server,
        "/api/map-data",
        serde_json::json!({
            "parking_lots": [{ "id": "A", "name": "Lot A", "lat": 9.0, "lng": 8.0, "kind": "lot" }],
            "junctions": []
        }),
    )
    .await;
}

#[tokio::test]
async fn one_failing_feed_leaves_the_rest_rendered() {
    let server = MockServer::start().await;
    mount_static_feeds(&server).await;
    mount_get(
        &server,
        "/api/recommendations",
        serde_json::json!({ "recommendations": [] }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/predictions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "prediction model unavailable"
        })))
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    let report = dashboard.orchestrator().refresh().await;

    assert_eq!(report.failed, ["predictions"]);
    assert_eq!(report.succeeded.len(), 5);

    let snapshot = dashboard.snapshot();
    assert!(snapshot.view.last_updated.is_some());
    assert!(snapshot.view.is_failed(SectionId::Predictions));
    for id in SectionId::ALL {
        if id != SectionId::Predictions {
            assert!(!snapshot.view.is_failed(id), "{} should render", id.label());
        }
    }
    assert_eq!(
        snapshot.view.system_stats.data.as_ref().map(|s| s.available_spots),
        Some(120)
    );
    assert_eq!(
        snapshot.view.map.data.as_ref().map(|m| m.user.name.as_str()),
        Some("City Center")
    );

    let errors: Vec<String> = snapshot
        .notifications
        .into_iter()
        .filter(|n| n.level == NotificationLevel::Error)
        .map(|n| n.message)
        .collect();
    assert_eq!(errors, ["Failed to load predictions"]);
}

#[tokio::test]
async fn failed_feed_keeps_previous_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/system-stats"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "total_spots": 300 })),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/system-stats"))
        .respond_with(ResponseTemplate::new(503))
        .with_priority(2)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    dashboard
        .orchestrator()
        .refresh_sections(&[SectionId::SystemStats])
        .await;
    let report = dashboard
        .orchestrator()
        .refresh_sections(&[SectionId::SystemStats])
        .await;

    assert_eq!(report.failed, ["system-stats"]);
    let view = dashboard.snapshot().view;
    assert!(view.is_failed(SectionId::SystemStats));
    assert_eq!(
        view.system_stats.data.as_ref().map(|s| s.total_spots),
        Some(300)
    );
}

#[tokio::test]
async fn search_refreshes_recommendations_for_the_new_location() {
    let server = MockServer::start().await;
    mount_static_feeds(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/recommendations"))
        .and(query_param("lat", "18"))
        .and(query_param("lng", "13"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "recommendations": [
                { "lot_id": "T1", "name": "Terminal Garage", "distance": 0.4, "available_spots": 80 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/system-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .with_priority(1)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    let resolved = dashboard
        .search_location("airport")
        .await
        .expect("airport resolves");
    assert_eq!(resolved.name, "airport");

    let snapshot = dashboard.snapshot();
    let recs = snapshot
        .view
        .recommendations
        .data
        .expect("recommendations rendered");
    assert_eq!(recs.location.name, "airport");
    assert_eq!(recs.items.recommendations[0].name, "Terminal Garage");
    assert_eq!(
        snapshot.view.map.data.map(|m| m.user.name),
        Some("airport".to_string())
    );
    assert!(snapshot.view.last_updated.is_none());
}

#[tokio::test]
async fn blank_search_does_not_touch_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    let err = dashboard.search_location("  ").await.expect_err("blank");

    assert_eq!(err.code(), "empty_input");
    assert_eq!(dashboard.location().name, "City Center");
}

#[tokio::test]
async fn gps_fix_refreshes_location_dependent_sections() {
    let server = MockServer::start().await;
    mount_static_feeds(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/recommendations"))
        .and(query_param("lat", "10"))
        .and(query_param("lng", "7.5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "recommendations": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    let resolution = dashboard
        .locate_gps(&StaticGpsProvider::fix(40.0, -74.0))
        .await
        .expect("fix");

    assert_eq!(resolution.nearest.name, "downtown");
    assert_eq!(dashboard.location().name, "downtown");
}

#[tokio::test]
async fn parking_refreshes_occupancy_sections_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/park-vehicle"))
        .and(body_json(serde_json::json!({ "destination": "city mall" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Vehicle parked at Mall Deck",
            "lot_id": "M2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/parking-status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "parking_lots": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/system-stats"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "total_spots": 300 })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/predictions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    let result = dashboard
        .park_vehicle("  city mall ")
        .await
        .expect("park succeeds");

    assert_eq!(result.lot_id.as_deref(), Some("M2"));
    let last = dashboard
        .notifier()
        .recent()
        .pop()
        .expect("notification");
    assert_eq!(last.level, NotificationLevel::Success);
    assert_eq!(last.message, "Vehicle parked at Mall Deck");
}

#[tokio::test]
async fn rejected_parking_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/park-vehicle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "No spots available"
        })))
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    let err = dashboard
        .park_vehicle("stadium")
        .await
        .expect_err("rejected");

    assert_eq!(err.code(), "bad_response");
    let last = dashboard
        .notifier()
        .recent()
        .pop()
        .expect("notification");
    assert_eq!(last.level, NotificationLevel::Error);
    assert!(last.message.contains("No spots available"), "{}", last.message);
}

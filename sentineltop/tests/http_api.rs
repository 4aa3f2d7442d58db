//! ApiClient and MetricsPoller against an in-process HTTP server.
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use sentineltop::cache::SnapshotCache;
use sentineltop::config::Settings;
use sentineltop::dashboard::ServerStatus;
use sentineltop::{ApiClient, FetchError, MetricsPoller, MetricsSource, PollOutcome};

/// What `/api/metrics/` answers, switchable per test.
const MODE_OK: usize = 0;
const MODE_500: usize = 1;
const MODE_GARBAGE: usize = 2;
const MODE_SLOW: usize = 3;
const MODE_REJECTED: usize = 4;

#[derive(Clone, Default)]
struct Backend {
    mode: Arc<AtomicUsize>,
    metrics_hits: Arc<AtomicUsize>,
}

async fn metrics(State(b): State<Backend>) -> axum::response::Response {
    b.metrics_hits.fetch_add(1, Ordering::SeqCst);
    match b.mode.load(Ordering::SeqCst) {
        MODE_500 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        MODE_GARBAGE => (StatusCode::OK, "{not json").into_response(),
        MODE_SLOW => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"success": true, "servers": []})).into_response()
        }
        MODE_REJECTED => Json(json!({"success": false})).into_response(),
        _ => Json(json!({
            "success": true,
            "servers": [
                {
                    "name": "pve-1",
                    "online": true,
                    "metrics": {
                        "cpu": {"usage": 72.4, "cores": 16},
                        "memory": {"percent": 91, "total_gb": 64},
                        "disk": {"percent": 30, "total_gb": 2048, "total_tb": 2.0},
                        "network": {"out_mbps": 12.5}
                    },
                    "history": {"timestamps": ["10:00", "10:05"], "cpu": [60.0, 72.4], "memory": [90.0, 91.0]},
                    "vms": {"active": 4},
                    "uptime": "3d 4h"
                },
                {"name": "pve-2", "online": false}
            ]
        }))
        .into_response(),
    }
}

async fn predictions(Path(idx): Path<usize>) -> axum::response::Response {
    if idx != 1 {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "predictions": {
            "cpu": {"labels": ["10:10", "10:15"], "data": [75.0, 78.0]},
            "memory": {"labels": ["10:10", "10:15"], "data": [92.0, 93.0]}
        }
    }))
    .into_response()
}

async fn server_vms(Path(idx): Path<usize>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "vms": [
            {"vmid": 100 + idx, "node": "pve-1", "name": "web", "status": "running", "cpu": 5.0, "mem": 20.0},
            {"vmid": 200 + idx, "node": "pve-1", "name": "db", "status": "stopped"}
        ]
    }))
}

async fn vm_metrics() -> Json<serde_json::Value> {
    Json(json!({
        "vms": [{"vmid": 101, "node": "pve-1", "name": "web", "status": "running", "cpu": 55.0, "memory": 33.0}]
    }))
}

async fn spawn_backend() -> (SocketAddr, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/metrics/", get(metrics))
        .route("/api/predictions/:idx/", get(predictions))
        .route("/api/server/:idx/vms/", get(server_vms))
        .route("/api/vms/metrics/", get(vm_metrics))
        .with_state(backend.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, backend)
}

fn client(addr: SocketAddr, timeout: Duration) -> ApiClient {
    // no trailing slash on purpose: the client must still hit /prefix/api/...
    ApiClient::new(&format!("http://{addr}"), timeout, None).unwrap()
}

fn poller(addr: SocketAddr) -> MetricsPoller<ApiClient> {
    let settings = Settings {
        server_slots: 2,
        ..Settings::default()
    };
    MetricsPoller::new(
        client(addr, settings.request_timeout()),
        settings,
        SnapshotCache::new(),
        Instant::now(),
    )
}

#[tokio::test]
async fn client_decodes_every_endpoint() {
    let (addr, _b) = spawn_backend().await;
    let c = client(addr, Duration::from_secs(5));

    let snap = c.metrics().await.unwrap();
    assert!(snap.is_usable());
    assert_eq!(snap.servers().len(), 2);

    let p = c.predictions(1).await.unwrap();
    assert_eq!(p.predictions.cpu.unwrap().data, vec![Some(75.0), Some(78.0)]);
    assert!(matches!(c.predictions(2).await, Err(FetchError::Status(404))));

    let vms = c.server_vms(1).await.unwrap();
    assert_eq!(vms.vms.unwrap().len(), 2);

    let m = c.vm_metrics().await.unwrap();
    assert_eq!(m.vms[0].mem, Some(33.0));
}

#[tokio::test]
async fn client_classifies_failures() {
    let (addr, b) = spawn_backend().await;
    let c = client(addr, Duration::from_millis(200));

    b.mode.store(MODE_500, Ordering::SeqCst);
    assert!(matches!(c.metrics().await, Err(FetchError::Status(500))));

    b.mode.store(MODE_GARBAGE, Ordering::SeqCst);
    assert!(matches!(c.metrics().await, Err(FetchError::Decode(_))));

    b.mode.store(MODE_SLOW, Ordering::SeqCst);
    assert!(matches!(c.metrics().await, Err(FetchError::Timeout(_))));
}

#[tokio::test]
async fn poller_renders_metrics_and_predictions() {
    let (addr, _b) = spawn_backend().await;
    let mut p = poller(addr);

    assert_eq!(p.tick(Instant::now()).await, Some(PollOutcome::Fresh));

    let one = p.dashboard.card(1).unwrap();
    assert_eq!(one.name, "pve-1");
    assert_eq!(one.status, ServerStatus::Online);
    assert_eq!(one.memory.as_ref().unwrap().label, "91%");
    assert_eq!(one.vms_active, "4");
    // 2 history points then 2 predicted points
    assert_eq!(one.cpu_chart.len(), 4);
    assert_eq!(one.cpu_chart.prediction[1], Some(72.4));

    let two = p.dashboard.card(2).unwrap();
    assert_eq!(two.status, ServerStatus::Offline);
    assert_eq!(two.cpu_chart.len(), 0);
}

#[tokio::test]
async fn poller_falls_back_then_gives_up() {
    let (addr, b) = spawn_backend().await;
    let mut p = poller(addr);
    assert_eq!(p.fetch_snapshot().await, PollOutcome::Fresh);

    b.mode.store(MODE_500, Ordering::SeqCst);
    assert_eq!(
        p.fetch_snapshot().await,
        PollOutcome::Fallback { retry_in: Duration::from_secs(5) }
    );
    assert_eq!(p.dashboard.card(1).unwrap().status, ServerStatus::Online);

    b.mode.store(MODE_REJECTED, Ordering::SeqCst);
    assert_eq!(
        p.fetch_snapshot().await,
        PollOutcome::Fallback { retry_in: Duration::from_secs(10) }
    );
    assert_eq!(p.fetch_snapshot().await, PollOutcome::Errored);
    assert!(p
        .dashboard
        .cards()
        .iter()
        .all(|c| c.status == ServerStatus::ConnectionError));

    b.mode.store(MODE_OK, Ordering::SeqCst);
    assert_eq!(p.fetch_snapshot().await, PollOutcome::Fresh);
    assert_eq!(p.retry_count(), 0);
    assert_eq!(b.metrics_hits.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn expanded_vm_panel_picks_up_metric_updates() {
    let (addr, _b) = spawn_backend().await;
    let mut p = poller(addr);
    let start = Instant::now();
    p.tick(start).await;

    p.toggle_vms(1).await;
    let shown = p.vms.shown(1).unwrap();
    assert_eq!(shown.len(), 2);
    assert_eq!(p.dashboard.card(1).unwrap().vms_active, "1");

    p.tick(start + Duration::from_secs(9)).await;
    let web = &p.vms.shown(1).unwrap()[0];
    assert_eq!(web.cpu, Some(55.0));
    assert_eq!(web.mem, Some(33.0));

    p.toggle_vms(1).await;
    assert!(!p.vms.any_expanded());
}

use anyhow::Result;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::ml::ResourcePredictor;
use crate::nfv::VnfManager;
use crate::slicing::{PerformanceMetrics, ResourceArbiter, ResourceKind, ServiceType, SliceId};
use super::api;
use super::websocket::WebSocketHandler;

#[derive(Clone)]
pub struct DashboardServer {
    pub arbiter: Arc<ResourceArbiter>,
    pub vnf_manager: Arc<VnfManager>,
    pub predictor: Option<Arc<ResourcePredictor>>,
    websocket_handler: Arc<WebSocketHandler>,
    dashboard_state: Arc<RwLock<DashboardState>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardState {
    pub system: SystemOverview,
    pub capacity: HashMap<ResourceKind, CapacityUsage>,
    pub slices: Vec<SliceOverview>,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemOverview {
    pub total_slices: u32,
    pub active_slices: u32,
    pub active_vnfs: u32,
    pub qos_violations: u32,
    pub dashboard_clients: u32,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityUsage {
    pub total: f64,
    pub available: f64,
    pub utilization_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SliceOverview {
    pub slice_id: SliceId,
    pub name: String,
    pub service_type: ServiceType,
    pub active: bool,
    pub meets_qos: bool,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub slice_id: Option<SliceId>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            system: SystemOverview {
                total_slices: 0,
                active_slices: 0,
                active_vnfs: 0,
                qos_violations: 0,
                dashboard_clients: 0,
                last_updated: Utc::now(),
            },
            capacity: HashMap::new(),
            slices: Vec::new(),
            alerts: Vec::new(),
        }
    }
}

impl DashboardServer {
    pub fn new(
        arbiter: Arc<ResourceArbiter>,
        vnf_manager: Arc<VnfManager>,
        predictor: Option<Arc<ResourcePredictor>>,
    ) -> Self {
        Self {
            arbiter,
            vnf_manager,
            predictor,
            websocket_handler: Arc::new(WebSocketHandler::new()),
            dashboard_state: Arc::new(RwLock::new(DashboardState::default())),
        }
    }

    pub async fn start(&self, port: u16) -> Result<()> {
        info!("Starting slice dashboard on port {}", port);

        let state_updater = self.clone();
        tokio::spawn(async move {
            state_updater.update_dashboard_state_loop().await;
        });

        let app = Router::new()
            .route("/", get(serve_dashboard))
            .route("/health", get(health))
            .merge(api::routes())
            .route("/api/v1/dashboard", get(get_dashboard_state))
            .route("/ws", get(websocket_upgrade))
            .nest_service("/static", ServeDir::new("static"))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        info!("Dashboard server listening on http://0.0.0.0:{}", port);

        axum::serve(listener, app).await?;
        Ok(())
    }

    async fn update_dashboard_state_loop(&self) {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(1));

        loop {
            interval.tick().await;

            if let Err(e) = self.update_dashboard_state().await {
                warn!("Failed to update dashboard state: {}", e);
            }
        }
    }

    async fn update_dashboard_state(&self) -> Result<()> {
        let ledger = self.arbiter.ledger().await;
        let slices = self.arbiter.list_slices().await;
        let now = Utc::now();

        let mut capacity = HashMap::new();
        let mut alerts = Vec::new();

        for kind in ResourceKind::ALL {
            let total = ledger.total(kind);
            let available = ledger.available(kind);
            let utilization_pct = if total > 0.0 {
                (total - available) / total * 100.0
            } else {
                0.0
            };

            if utilization_pct > 90.0 {
                alerts.push(Alert {
                    id: format!("capacity-{kind}"),
                    severity: AlertSeverity::Critical,
                    message: format!(
                        "{} capacity nearly exhausted: {:.1}% allocated",
                        kind, utilization_pct
                    ),
                    slice_id: None,
                    timestamp: now,
                });
            }

            capacity.insert(
                kind,
                CapacityUsage {
                    total,
                    available,
                    utilization_pct,
                },
            );
        }

        let mut overviews = Vec::with_capacity(slices.len());
        let mut active_slices = 0;
        let mut qos_violations = 0;

        for slice in &slices {
            let meets_qos = slice.meets_qos();
            if slice.active {
                active_slices += 1;
                if !meets_qos {
                    qos_violations += 1;
                    alerts.push(Alert {
                        id: format!("qos-{}", slice.id),
                        severity: AlertSeverity::Warning,
                        message: format!("Slice '{}' is violating its QoS contract", slice.name),
                        slice_id: Some(slice.id),
                        timestamp: now,
                    });
                }
            }

            overviews.push(SliceOverview {
                slice_id: slice.id,
                name: slice.name.clone(),
                service_type: slice.service_type,
                active: slice.active,
                meets_qos,
                metrics: slice.metrics.clone(),
            });
        }

        let mut state = self.dashboard_state.write().await;
        state.system = SystemOverview {
            total_slices: slices.len() as u32,
            active_slices,
            active_vnfs: self.vnf_manager.list_active().len() as u32,
            qos_violations,
            dashboard_clients: self.websocket_handler.subscriber_count() as u32,
            last_updated: now,
        };
        state.capacity = capacity;
        state.slices = overviews;
        state.alerts = alerts;

        let state_json = serde_json::to_string(&*state)?;
        drop(state);
        self.websocket_handler.broadcast(state_json);

        Ok(())
    }
}

async fn serve_dashboard() -> Html<&'static str> {
    Html(include_str!("../../static/dashboard.html"))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "Network slicing service is running" }))
}

async fn get_dashboard_state(State(server): State<DashboardServer>) -> impl IntoResponse {
    let state = server.dashboard_state.read().await;
    Json(state.clone())
}

async fn websocket_upgrade(
    ws: WebSocketUpgrade,
    State(server): State<DashboardServer>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        server.websocket_handler.handle_connection(socket).await;
    })
}

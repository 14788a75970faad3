use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

pub type SliceId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Bandwidth,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Cpu,
        ResourceKind::Memory,
        ResourceKind::Bandwidth,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Cpu => write!(f, "cpu"),
            ResourceKind::Memory => write!(f, "memory"),
            ResourceKind::Bandwidth => write!(f, "bandwidth"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationLevel {
    Shared,
    Isolated,
    Dedicated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "eMBB")]
    Embb,
    #[serde(rename = "URLLC")]
    Urllc,
    #[serde(rename = "mMTC")]
    Mmtc,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Embb => write!(f, "eMBB"),
            ServiceType::Urllc => write!(f, "URLLC"),
            ServiceType::Mmtc => write!(f, "mMTC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QosSpec {
    pub latency_ms: f64,
    pub bandwidth_mbps: f64,
    pub reliability: f64,
    pub isolation_level: IsolationLevel,
}

impl QosSpec {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.latency_ms > 0.0) {
            return Err(format!("latency_ms must be positive, got {}", self.latency_ms));
        }
        if !(self.bandwidth_mbps > 0.0) {
            return Err(format!(
                "bandwidth_mbps must be positive, got {}",
                self.bandwidth_mbps
            ));
        }
        if !(self.reliability > 0.0 && self.reliability <= 100.0) {
            return Err(format!(
                "reliability must be in (0, 100], got {}",
                self.reliability
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(rename = "current_latency")]
    pub current_latency_ms: f64,
    #[serde(rename = "current_bandwidth")]
    pub current_bandwidth_mbps: f64,
    pub reliability_score: f64,
    #[serde(rename = "resource_utilization")]
    pub utilization_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkSlice {
    #[serde(rename = "slice_id")]
    pub id: SliceId,
    pub name: String,
    pub service_type: ServiceType,
    #[serde(rename = "qos_requirements")]
    pub qos: QosSpec,
    #[serde(rename = "allocated_resources")]
    pub allocated: HashMap<ResourceKind, f64>,
    #[serde(rename = "virtual_functions")]
    pub vnf_refs: Vec<String>,
    pub active: bool,
    #[serde(rename = "performance_metrics")]
    pub metrics: PerformanceMetrics,
}

impl NetworkSlice {
    // Slices are only ever constructed by the arbiter.
    pub(crate) fn new(name: String, qos: QosSpec, service_type: ServiceType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            service_type,
            qos,
            allocated: HashMap::new(),
            vnf_refs: Vec::new(),
            active: false,
            metrics: PerformanceMetrics::default(),
        }
    }

    pub fn meets_qos(&self) -> bool {
        self.metrics.current_latency_ms <= self.qos.latency_ms
            && self.metrics.current_bandwidth_mbps >= self.qos.bandwidth_mbps
            && self.metrics.reliability_score >= self.qos.reliability
    }

    pub(crate) fn add_virtual_function(&mut self, vnf_id: &str) -> bool {
        if self.vnf_refs.iter().any(|v| v == vnf_id) {
            return false;
        }
        self.vnf_refs.push(vnf_id.to_string());
        true
    }

    pub(crate) fn remove_virtual_function(&mut self, vnf_id: &str) -> bool {
        match self.vnf_refs.iter().position(|v| v == vnf_id) {
            Some(idx) => {
                self.vnf_refs.remove(idx);
                true
            }
            None => false,
        }
    }
}

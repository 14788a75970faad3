use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::AdmissionError;
use super::registry::SliceRegistry;
use super::slice::{NetworkSlice, PerformanceMetrics, QosSpec, ResourceKind, ServiceType, SliceId};

pub type ResourceDemand = HashMap<ResourceKind, f64>;

/// Strategy for deriving a resource demand from a QoS contract. The
/// default linear mapping is a policy placeholder; the ML predictor
/// provides an alternative implementation behind the same trait.
pub trait DemandModel: Send + Sync {
    fn required_resources(&self, qos: &QosSpec, service_type: ServiceType) -> ResourceDemand;
}

pub struct LinearDemandModel;

impl DemandModel for LinearDemandModel {
    fn required_resources(&self, qos: &QosSpec, _service_type: ServiceType) -> ResourceDemand {
        HashMap::from([
            (ResourceKind::Cpu, qos.bandwidth_mbps * 0.1),
            (ResourceKind::Memory, qos.bandwidth_mbps * 10.0),
            (ResourceKind::Bandwidth, qos.bandwidth_mbps),
        ])
    }
}

/// Cross-slice rebalancing hook. No implementation ships; installing one
/// gives it a read-only view after each explicit optimization request.
pub trait AllocationOptimizer: Send + Sync {
    fn optimize(&self, slices: &[NetworkSlice], ledger: &CapacityLedger);
}

/// Total and available capacity per resource kind. Only the arbiter
/// mutates these counters, and only while holding its write guard, so
/// `total - available` always equals the sum of active allocations.
#[derive(Debug, Clone, Serialize)]
pub struct CapacityLedger {
    total: HashMap<ResourceKind, f64>,
    available: HashMap<ResourceKind, f64>,
}

impl CapacityLedger {
    fn new(total: HashMap<ResourceKind, f64>) -> Self {
        let available = total.clone();
        Self { total, available }
    }

    pub fn total(&self, kind: ResourceKind) -> f64 {
        self.total.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn available(&self, kind: ResourceKind) -> f64 {
        self.available.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn can_accommodate(&self, demand: &ResourceDemand) -> bool {
        self.first_shortfall(demand).is_none()
    }

    fn first_shortfall(&self, demand: &ResourceDemand) -> Option<(ResourceKind, f64, f64)> {
        for kind in ResourceKind::ALL {
            let requested = match demand.get(&kind) {
                Some(amount) => *amount,
                None => continue,
            };
            let available = self.available(kind);
            if available < requested {
                return Some((kind, requested, available));
            }
        }
        None
    }

    fn debit(&mut self, demand: &ResourceDemand) {
        for (kind, amount) in demand {
            *self.available.entry(*kind).or_insert(0.0) -= amount;
        }
    }

    fn credit(&mut self, demand: &ResourceDemand) {
        for (kind, amount) in demand {
            *self.available.entry(*kind).or_insert(0.0) += amount;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SliceStatus {
    pub slice: NetworkSlice,
    #[serde(rename = "resource_utilization")]
    pub utilization: HashMap<ResourceKind, f64>,
}

struct ArbiterInner {
    ledger: CapacityLedger,
    registry: SliceRegistry,
}

/// Admission control and capacity accounting for network slices. The
/// single write lock spans every check-then-commit sequence so that two
/// concurrent admissions can never both pass a check against the same
/// transiently available capacity.
pub struct ResourceArbiter {
    inner: RwLock<ArbiterInner>,
    demand_model: Arc<dyn DemandModel>,
    optimizer: Option<Arc<dyn AllocationOptimizer>>,
}

impl ResourceArbiter {
    pub fn new(total_capacity: HashMap<ResourceKind, f64>, demand_model: Arc<dyn DemandModel>) -> Self {
        Self {
            inner: RwLock::new(ArbiterInner {
                ledger: CapacityLedger::new(total_capacity),
                registry: SliceRegistry::new(),
            }),
            demand_model,
            optimizer: None,
        }
    }

    pub fn with_optimizer(mut self, optimizer: Arc<dyn AllocationOptimizer>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    pub async fn create_slice(
        &self,
        name: &str,
        qos: QosSpec,
        service_type: ServiceType,
    ) -> Result<SliceId, AdmissionError> {
        qos.validate().map_err(AdmissionError::InvalidQos)?;

        let required = self.demand_model.required_resources(&qos, service_type);
        let mut inner = self.inner.write().await;

        if let Some((kind, requested, available)) = inner.ledger.first_shortfall(&required) {
            warn!(
                "Rejected slice '{}': insufficient {} capacity ({:.2} requested, {:.2} available)",
                name, kind, requested, available
            );
            return Err(AdmissionError::InsufficientCapacity {
                kind,
                requested,
                available,
            });
        }

        let mut slice = NetworkSlice::new(name.to_string(), qos, service_type);
        let id = slice.id;
        if inner.registry.contains(&id) {
            return Err(AdmissionError::DuplicateId(id));
        }

        inner.ledger.debit(&required);
        slice.allocated = required.clone();
        slice.active = true;
        if let Err(err) = inner.registry.insert(slice) {
            inner.ledger.credit(&required);
            return Err(err.into());
        }

        info!("Created {} slice '{}' ({})", service_type, name, id);
        Ok(id)
    }

    pub async fn delete_slice(&self, id: SliceId) -> Result<(), AdmissionError> {
        let mut inner = self.inner.write().await;
        let ArbiterInner { ledger, registry } = &mut *inner;

        let slice = registry.get(&id).ok_or(AdmissionError::NotFound(id))?;
        if slice.active {
            let released = slice.allocated.clone();
            ledger.credit(&released);
        }
        registry.remove(&id);

        info!("Deleted slice {}", id);
        Ok(())
    }

    pub async fn update_slice(
        &self,
        id: SliceId,
        new_qos: Option<QosSpec>,
        new_service_type: Option<ServiceType>,
    ) -> Result<(), AdmissionError> {
        if let Some(qos) = &new_qos {
            qos.validate().map_err(AdmissionError::InvalidQos)?;
        }

        let mut inner = self.inner.write().await;
        let ArbiterInner { ledger, registry } = &mut *inner;

        let slice = registry.get(&id).ok_or(AdmissionError::NotFound(id))?;
        let service_type = slice.service_type;

        if let Some(qos) = new_qos {
            let old_allocation = slice.allocated.clone();
            let ledger_before = ledger.clone();

            // Release the old share first so shrink and no-op updates
            // always pass, and growth competes for the freed capacity.
            ledger.credit(&old_allocation);

            let required = self.demand_model.required_resources(&qos, service_type);
            match ledger.first_shortfall(&required) {
                None => {
                    ledger.debit(&required);
                    registry.update(&id, |slice| {
                        slice.allocated = required;
                        slice.qos = qos;
                    })?;
                    debug!("Reallocated slice {}", id);
                }
                Some((kind, requested, available)) => {
                    // Restore the exact pre-update ledger state.
                    *ledger = ledger_before;
                    warn!(
                        "Rejected update of slice {}: insufficient {} capacity \
                         ({:.2} requested, {:.2} available)",
                        id, kind, requested, available
                    );
                    return Err(AdmissionError::InsufficientCapacity {
                        kind,
                        requested,
                        available,
                    });
                }
            }
        }

        // The service type never affects admission.
        if let Some(service_type) = new_service_type {
            registry.update(&id, |slice| slice.service_type = service_type)?;
        }

        Ok(())
    }

    pub async fn get_slice_status(&self, id: SliceId) -> Result<SliceStatus, AdmissionError> {
        let inner = self.inner.read().await;
        let slice = inner.registry.get(&id).ok_or(AdmissionError::NotFound(id))?;

        let mut utilization = HashMap::new();
        for (kind, amount) in &slice.allocated {
            // Denominator is the capacity that would exist if this slice
            // released its share, matching the external contract.
            let pool = inner.ledger.available(*kind) + amount;
            let share = if pool > 0.0 { amount / pool * 100.0 } else { 0.0 };
            utilization.insert(*kind, share);
        }

        Ok(SliceStatus {
            slice: slice.clone(),
            utilization,
        })
    }

    pub async fn get_slice(&self, id: SliceId) -> Option<NetworkSlice> {
        let inner = self.inner.read().await;
        inner.registry.get(&id).cloned()
    }

    pub async fn list_slices(&self) -> Vec<NetworkSlice> {
        let inner = self.inner.read().await;
        inner.registry.iter().cloned().collect()
    }

    pub async fn slice_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.registry.len()
    }

    pub async fn record_metrics(
        &self,
        id: SliceId,
        metrics: PerformanceMetrics,
    ) -> Result<(), AdmissionError> {
        let mut inner = self.inner.write().await;
        inner.registry.update(&id, |slice| slice.metrics = metrics)?;
        Ok(())
    }

    pub async fn attach_vnf(&self, id: SliceId, vnf_id: &str) -> Result<bool, AdmissionError> {
        let mut inner = self.inner.write().await;
        let mut attached = false;
        inner.registry.update(&id, |slice| {
            attached = slice.add_virtual_function(vnf_id);
        })?;
        Ok(attached)
    }

    pub async fn detach_vnf(&self, id: SliceId, vnf_id: &str) -> Result<bool, AdmissionError> {
        let mut inner = self.inner.write().await;
        let mut detached = false;
        inner.registry.update(&id, |slice| {
            detached = slice.remove_virtual_function(vnf_id);
        })?;
        Ok(detached)
    }

    pub async fn ledger(&self) -> CapacityLedger {
        let inner = self.inner.read().await;
        inner.ledger.clone()
    }

    pub fn required_resources(&self, qos: &QosSpec, service_type: ServiceType) -> ResourceDemand {
        self.demand_model.required_resources(qos, service_type)
    }

    pub async fn optimize_allocations(&self) {
        if let Some(optimizer) = &self.optimizer {
            let inner = self.inner.read().await;
            let slices: Vec<NetworkSlice> = inner.registry.iter().cloned().collect();
            optimizer.optimize(&slices, &inner.ledger);
        }
    }
}

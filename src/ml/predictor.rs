use nalgebra::DVector;
use statrs::statistics::Statistics;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::slicing::{DemandModel, QosSpec, ResourceDemand, ResourceKind, ServiceType};
use super::models::DemandNet;

/// Learned alternative to the linear demand placeholder. Plugs into the
/// arbiter through the `DemandModel` trait; admission and rollback logic
/// never see the difference.
pub struct ResourcePredictor {
    net: DemandNet,
    history: Mutex<Vec<PredictionRecord>>,
}

#[derive(Debug, Clone)]
struct PredictionRecord {
    actual: ResourceDemand,
    error: HashMap<ResourceKind, f64>,
}

impl ResourcePredictor {
    pub fn new(net: DemandNet) -> Self {
        Self {
            net,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn model_version(&self) -> &str {
        &self.net.model_version
    }

    fn feature_vector(qos: &QosSpec, service_type: ServiceType) -> DVector<f64> {
        let one_hot = match service_type {
            ServiceType::Embb => [1.0, 0.0, 0.0],
            ServiceType::Urllc => [0.0, 1.0, 0.0],
            ServiceType::Mmtc => [0.0, 0.0, 1.0],
        };
        DVector::from_vec(vec![
            qos.latency_ms,
            qos.bandwidth_mbps,
            qos.reliability,
            one_hot[0],
            one_hot[1],
            one_hot[2],
        ])
    }

    /// Feeds an observed usage sample back into the accuracy window.
    pub fn record_observation(&self, predicted: &ResourceDemand, actual: &ResourceDemand) {
        let error = ResourceKind::ALL
            .iter()
            .map(|kind| {
                let predicted = predicted.get(kind).copied().unwrap_or(0.0);
                let actual = actual.get(kind).copied().unwrap_or(0.0);
                (*kind, (predicted - actual).abs())
            })
            .collect();

        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push(PredictionRecord {
            actual: actual.clone(),
            error,
        });
    }

    /// Mean relative prediction error per resource kind, in percent.
    pub fn accuracy(&self) -> HashMap<ResourceKind, f64> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.is_empty() {
            return HashMap::new();
        }

        let mut report = HashMap::new();
        for kind in ResourceKind::ALL {
            let relative_errors: Vec<f64> = history
                .iter()
                .filter_map(|record| {
                    let actual = record.actual.get(&kind).copied().unwrap_or(0.0);
                    let error = record.error.get(&kind).copied().unwrap_or(0.0);
                    (actual > 0.0).then(|| error / actual * 100.0)
                })
                .collect();
            if !relative_errors.is_empty() {
                report.insert(kind, relative_errors.mean());
            }
        }
        report
    }
}

impl DemandModel for ResourcePredictor {
    fn required_resources(&self, qos: &QosSpec, service_type: ServiceType) -> ResourceDemand {
        let features = Self::feature_vector(qos, service_type);
        let prediction = self.net.forward(&features);
        debug!("Predicted demand for {} slice", service_type);

        HashMap::from([
            (ResourceKind::Cpu, prediction[0].max(0.0)),
            (ResourceKind::Memory, prediction[1].max(0.0)),
            (ResourceKind::Bandwidth, prediction[2].max(0.0)),
        ])
    }
}

use anyhow::Result;
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::config::TelemetryConfig;
use crate::ml::ResourcePredictor;
use crate::slicing::{
    NetworkSlice, PerformanceMetrics, QosSpec, ResourceArbiter, ResourceDemand, ResourceKind,
};

/// Periodically samples live performance metrics for every active slice
/// and records them through the arbiter. Stands in for the measurement
/// plane of a deployed control loop; sampling is centered on each slice's
/// QoS contract with Gaussian jitter.
pub struct TelemetryCollector {
    config: TelemetryConfig,
    arbiter: Arc<ResourceArbiter>,
    predictor: Option<Arc<ResourcePredictor>>,
}

impl TelemetryCollector {
    pub fn new(
        config: &TelemetryConfig,
        arbiter: Arc<ResourceArbiter>,
        predictor: Option<Arc<ResourcePredictor>>,
    ) -> Self {
        Self {
            config: config.clone(),
            arbiter,
            predictor,
        }
    }

    pub async fn start_collection(&self) -> Result<()> {
        info!("Starting slice telemetry collection");

        let mut interval = interval(Duration::from_secs(self.config.collection_interval_seconds));

        loop {
            interval.tick().await;

            if let Err(e) = self.collect_cycle().await {
                error!("Telemetry cycle failed: {}", e);
            }
        }
    }

    async fn collect_cycle(&self) -> Result<()> {
        let slices = self.arbiter.list_slices().await;
        debug!("Collecting telemetry for {} slices", slices.len());

        for slice in slices {
            if !slice.active {
                continue;
            }

            let metrics = sample_metrics(&slice.qos)?;
            let observed = observed_usage(&slice, &metrics);

            if metrics.current_latency_ms > slice.qos.latency_ms {
                warn!(
                    "Slice {} exceeded its latency budget: {:.1}ms > {:.1}ms",
                    slice.id, metrics.current_latency_ms, slice.qos.latency_ms
                );
            }

            // The slice may have been deleted between the snapshot and
            // this write; a stale sample is not an error.
            if self.arbiter.record_metrics(slice.id, metrics).await.is_err() {
                debug!("Dropped telemetry for removed slice {}", slice.id);
                continue;
            }

            if let Some(predictor) = &self.predictor {
                predictor.record_observation(&slice.allocated, &observed);
            }
        }

        Ok(())
    }
}

fn sample_metrics(qos: &QosSpec) -> Result<PerformanceMetrics> {
    let mut rng = rand::thread_rng();

    let latency = Normal::new(qos.latency_ms * 0.8, qos.latency_ms * 0.08)?;
    let bandwidth = Normal::new(qos.bandwidth_mbps * 0.95, qos.bandwidth_mbps * 0.05)?;
    let reliability_loss = Normal::<f64>::new(0.0, 0.05)?;
    let utilization = Normal::<f64>::new(65.0, 10.0)?;

    Ok(PerformanceMetrics {
        current_latency_ms: latency.sample(&mut rng).max(0.1),
        current_bandwidth_mbps: bandwidth.sample(&mut rng).max(0.0),
        reliability_score: (qos.reliability - reliability_loss.sample(&mut rng).abs())
            .clamp(0.0, 100.0),
        utilization_pct: utilization.sample(&mut rng).clamp(0.0, 100.0),
    })
}

fn observed_usage(slice: &NetworkSlice, metrics: &PerformanceMetrics) -> ResourceDemand {
    let scale = metrics.utilization_pct / 100.0;
    let mut usage = HashMap::new();
    for kind in ResourceKind::ALL {
        let allocated = slice.allocated.get(&kind).copied().unwrap_or(0.0);
        let used = match kind {
            ResourceKind::Bandwidth => metrics.current_bandwidth_mbps.min(allocated),
            _ => allocated * scale,
        };
        usage.insert(kind, used);
    }
    usage
}

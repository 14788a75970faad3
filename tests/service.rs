use std::collections::HashMap;
use std::sync::Arc;

use netslice::config::Config;
use netslice::error::VnfError;
use netslice::ml::{DemandNet, ResourcePredictor};
use netslice::nfv::{VnfDescriptor, VnfManager};
use netslice::slicing::{
    DemandModel, IsolationLevel, QosSpec, ResourceArbiter, ResourceKind, ServiceType,
};

fn firewall_descriptor() -> VnfDescriptor {
    VnfDescriptor {
        image: "nginx:latest".to_string(),
        resource_requirements: HashMap::from([
            (ResourceKind::Cpu, 1.0),
            (ResourceKind::Memory, 512.0),
            (ResourceKind::Bandwidth, 100.0),
        ]),
        config: HashMap::from([("ports".to_string(), "80/tcp:8080".to_string())]),
    }
}

fn qos() -> QosSpec {
    QosSpec {
        latency_ms: 20.0,
        bandwidth_mbps: 1000.0,
        reliability: 99.9,
        isolation_level: IsolationLevel::Shared,
    }
}

#[test]
fn vnf_catalog_rejects_duplicate_types() {
    let manager = VnfManager::new();

    manager.register_vnf("firewall", firewall_descriptor()).unwrap();
    let err = manager
        .register_vnf("firewall", firewall_descriptor())
        .unwrap_err();
    assert!(matches!(err, VnfError::DuplicateType(_)));
}

#[test]
fn vnf_instance_lifecycle() {
    let manager = VnfManager::new();
    manager.register_vnf("firewall", firewall_descriptor()).unwrap();

    let err = manager
        .instantiate_vnf("dpi", "edge-dpi", "default", None)
        .unwrap_err();
    assert!(matches!(err, VnfError::UnknownType(_)));

    let instance_id = manager
        .instantiate_vnf("firewall", "edge-fw", "slice-net", None)
        .unwrap();
    assert!(manager.exists(&instance_id));

    let status = manager.vnf_status(&instance_id).unwrap();
    assert_eq!(status.vnf_type, "firewall");
    assert_eq!(status.network, "slice-net");
    assert_eq!(status.status, "running");
    assert!(status.uptime_seconds >= 0.0);
    assert_eq!(status.resources[&ResourceKind::Memory], 512.0);

    let summaries = manager.list_active();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "edge-fw");

    manager.terminate_vnf(&instance_id).unwrap();
    assert!(!manager.exists(&instance_id));
    let err = manager.terminate_vnf(&instance_id).unwrap_err();
    assert!(matches!(err, VnfError::InstanceNotFound(_)));
}

#[test]
fn vnf_config_update_patches_catalog_entry() {
    let manager = VnfManager::new();
    manager.register_vnf("firewall", firewall_descriptor()).unwrap();
    let instance_id = manager
        .instantiate_vnf("firewall", "edge-fw", "default", None)
        .unwrap();

    manager
        .update_vnf(
            &instance_id,
            HashMap::from([("log_level".to_string(), "debug".to_string())]),
        )
        .unwrap();

    let err = manager
        .update_vnf("missing", HashMap::new())
        .unwrap_err();
    assert!(matches!(err, VnfError::InstanceNotFound(_)));
}

#[tokio::test]
async fn predictor_demand_is_nonnegative_and_complete() {
    let net = DemandNet::load_from_file("unused-model-path").await.unwrap();
    let predictor = ResourcePredictor::new(net);

    for service_type in [ServiceType::Embb, ServiceType::Urllc, ServiceType::Mmtc] {
        let demand = predictor.required_resources(&qos(), service_type);
        for kind in ResourceKind::ALL {
            let amount = demand[&kind];
            assert!(amount >= 0.0, "{kind} prediction went negative: {amount}");
        }
    }
}

#[tokio::test]
async fn predictor_backed_admission_keeps_ledger_conserved() {
    let net = DemandNet::load_from_file("unused-model-path").await.unwrap();
    let predictor = Arc::new(ResourcePredictor::new(net));

    let capacity = HashMap::from([
        (ResourceKind::Cpu, 1_000_000.0),
        (ResourceKind::Memory, 1_000_000.0),
        (ResourceKind::Bandwidth, 1_000_000.0),
    ]);
    let arbiter = ResourceArbiter::new(capacity, predictor.clone());

    let id = arbiter
        .create_slice("predicted", qos(), ServiceType::Embb)
        .await
        .unwrap();

    let slice = arbiter.get_slice(id).await.unwrap();
    let ledger = arbiter.ledger().await;
    for kind in ResourceKind::ALL {
        let allocated = slice.allocated.get(&kind).copied().unwrap_or(0.0);
        let committed = ledger.total(kind) - ledger.available(kind);
        assert!((committed - allocated).abs() < 1e-9);
    }
}

#[tokio::test]
async fn predictor_accuracy_reports_mean_relative_error() {
    let net = DemandNet::load_from_file("unused-model-path").await.unwrap();
    let predictor = ResourcePredictor::new(net);

    assert!(predictor.accuracy().is_empty());

    let predicted = HashMap::from([
        (ResourceKind::Cpu, 10.0),
        (ResourceKind::Memory, 100.0),
        (ResourceKind::Bandwidth, 50.0),
    ]);
    let actual = HashMap::from([
        (ResourceKind::Cpu, 8.0),
        (ResourceKind::Memory, 100.0),
        (ResourceKind::Bandwidth, 25.0),
    ]);
    predictor.record_observation(&predicted, &actual);

    let report = predictor.accuracy();
    assert!((report[&ResourceKind::Cpu] - 25.0).abs() < 1e-9);
    assert!((report[&ResourceKind::Memory] - 0.0).abs() < 1e-9);
    assert!((report[&ResourceKind::Bandwidth] - 100.0).abs() < 1e-9);
}

#[test]
fn config_defaults_match_reference_capacity() {
    let config = Config::default();
    let totals = config.capacity.as_totals();

    assert_eq!(totals[&ResourceKind::Cpu], 100.0);
    assert_eq!(totals[&ResourceKind::Memory], 1_024_000.0);
    assert_eq!(totals[&ResourceKind::Bandwidth], 10_000.0);
    assert!(!config.predictor.enabled);
}

#[test]
fn config_parses_from_toml_file() {
    let path = std::env::temp_dir().join("netslice-test-config.toml");
    std::fs::write(
        &path,
        r#"
[capacity]
cpu_units = 64.0
memory_mb = 512000.0
bandwidth_mbps = 40000.0

[telemetry]
collection_interval_seconds = 2

[predictor]
enabled = true
model_path = "models/test.bin"
"#,
    )
    .unwrap();

    let config = Config::from_file(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.capacity.cpu_units, 64.0);
    assert_eq!(config.capacity.bandwidth_mbps, 40_000.0);
    assert_eq!(config.telemetry.collection_interval_seconds, 2);
    assert!(config.predictor.enabled);
    assert_eq!(config.predictor.model_path, "models/test.bin");
}

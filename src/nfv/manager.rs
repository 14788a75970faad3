use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::error::VnfError;
use crate::slicing::ResourceKind;

/// Catalog entry describing a deployable VNF type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VnfDescriptor {
    pub image: String,
    pub resource_requirements: HashMap<ResourceKind, f64>,
    #[serde(default)]
    pub config: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VnfInstance {
    pub id: String,
    pub vnf_type: String,
    pub name: String,
    pub network: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub environment: HashMap<String, String>,
    pub resource_usage: HashMap<ResourceKind, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VnfStatus {
    pub id: String,
    #[serde(rename = "type")]
    pub vnf_type: String,
    pub name: String,
    pub status: String,
    pub network: String,
    pub uptime_seconds: f64,
    pub resources: HashMap<ResourceKind, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VnfSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub vnf_type: String,
    pub name: String,
    pub network: String,
    pub status: String,
}

/// Tracks the VNF catalog and running instances. The slice core only ever
/// holds instance identifiers handed out here; instance lifecycle stays
/// the manager's concern.
#[derive(Debug, Default)]
pub struct VnfManager {
    catalog: DashMap<String, VnfDescriptor>,
    active: DashMap<String, VnfInstance>,
}

impl VnfManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_vnf(&self, vnf_type: &str, descriptor: VnfDescriptor) -> Result<(), VnfError> {
        if self.catalog.contains_key(vnf_type) {
            return Err(VnfError::DuplicateType(vnf_type.to_string()));
        }
        self.catalog.insert(vnf_type.to_string(), descriptor);
        info!("Registered VNF type '{}'", vnf_type);
        Ok(())
    }

    pub fn instantiate_vnf(
        &self,
        vnf_type: &str,
        instance_name: &str,
        network: &str,
        environment: Option<HashMap<String, String>>,
    ) -> Result<String, VnfError> {
        let descriptor = self
            .catalog
            .get(vnf_type)
            .ok_or_else(|| VnfError::UnknownType(vnf_type.to_string()))?;

        let instance_id = Uuid::new_v4().to_string();
        let instance = VnfInstance {
            id: instance_id.clone(),
            vnf_type: vnf_type.to_string(),
            name: instance_name.to_string(),
            network: network.to_string(),
            status: "running".to_string(),
            started_at: Utc::now(),
            environment: environment.unwrap_or_default(),
            resource_usage: descriptor.resource_requirements.clone(),
        };
        drop(descriptor);

        self.active.insert(instance_id.clone(), instance);
        info!("Instantiated VNF '{}' ({})", instance_name, instance_id);
        Ok(instance_id)
    }

    pub fn terminate_vnf(&self, instance_id: &str) -> Result<(), VnfError> {
        self.active
            .remove(instance_id)
            .ok_or_else(|| VnfError::InstanceNotFound(instance_id.to_string()))?;
        info!("Terminated VNF instance {}", instance_id);
        Ok(())
    }

    pub fn update_vnf(
        &self,
        instance_id: &str,
        config_updates: HashMap<String, String>,
    ) -> Result<(), VnfError> {
        let vnf_type = self
            .active
            .get(instance_id)
            .map(|instance| instance.vnf_type.clone())
            .ok_or_else(|| VnfError::InstanceNotFound(instance_id.to_string()))?;

        let mut descriptor = self
            .catalog
            .get_mut(&vnf_type)
            .ok_or_else(|| VnfError::UnknownType(vnf_type.clone()))?;
        descriptor.config.extend(config_updates);
        Ok(())
    }

    pub fn vnf_status(&self, instance_id: &str) -> Option<VnfStatus> {
        self.active.get(instance_id).map(|instance| VnfStatus {
            id: instance.id.clone(),
            vnf_type: instance.vnf_type.clone(),
            name: instance.name.clone(),
            status: instance.status.clone(),
            network: instance.network.clone(),
            uptime_seconds: (Utc::now() - instance.started_at).num_milliseconds() as f64 / 1000.0,
            resources: instance.resource_usage.clone(),
        })
    }

    pub fn exists(&self, instance_id: &str) -> bool {
        self.active.contains_key(instance_id)
    }

    pub fn list_active(&self) -> Vec<VnfSummary> {
        self.active
            .iter()
            .map(|entry| VnfSummary {
                id: entry.id.clone(),
                vnf_type: entry.vnf_type.clone(),
                name: entry.name.clone(),
                network: entry.network.clone(),
                status: entry.status.clone(),
            })
            .collect()
    }
}

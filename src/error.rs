use thiserror::Error;

use crate::slicing::slice::{ResourceKind, SliceId};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Duplicate slice id: {0}")]
    DuplicateId(SliceId),

    #[error("Slice not found: {0}")]
    NotFound(SliceId),
}

#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error("Slice not found: {0}")]
    NotFound(SliceId),

    #[error("Duplicate slice id: {0}")]
    DuplicateId(SliceId),

    #[error("Insufficient {kind} capacity: requested {requested:.2}, available {available:.2}")]
    InsufficientCapacity {
        kind: ResourceKind,
        requested: f64,
        available: f64,
    },

    #[error("Invalid QoS requirements: {0}")]
    InvalidQos(String),
}

impl From<RegistryError> for AdmissionError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateId(id) => AdmissionError::DuplicateId(id),
            RegistryError::NotFound(id) => AdmissionError::NotFound(id),
        }
    }
}

#[derive(Error, Debug)]
pub enum VnfError {
    #[error("VNF type already registered: {0}")]
    DuplicateType(String),

    #[error("Unknown VNF type: {0}")]
    UnknownType(String),

    #[error("VNF instance not found: {0}")]
    InstanceNotFound(String),
}

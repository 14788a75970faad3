pub mod manager;

pub use manager::{VnfDescriptor, VnfInstance, VnfManager, VnfStatus, VnfSummary};

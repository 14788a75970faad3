pub mod arbiter;
pub mod registry;
pub mod slice;

pub use arbiter::{
    AllocationOptimizer, CapacityLedger, DemandModel, LinearDemandModel, ResourceArbiter,
    ResourceDemand, SliceStatus,
};
pub use registry::SliceRegistry;
pub use slice::{
    IsolationLevel, NetworkSlice, PerformanceMetrics, QosSpec, ResourceKind, ServiceType, SliceId,
};

pub mod api;
pub mod dashboard;
pub mod websocket;

pub use dashboard::DashboardServer;

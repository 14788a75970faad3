pub mod models;
pub mod predictor;

pub use models::DemandNet;
pub use predictor::ResourcePredictor;

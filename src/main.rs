use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use netslice::config::Config;
use netslice::metrics::TelemetryCollector;
use netslice::ml::{DemandNet, ResourcePredictor};
use netslice::nfv::VnfManager;
use netslice::slicing::{DemandModel, LinearDemandModel, ResourceArbiter};
use netslice::web::DashboardServer;

#[derive(Parser)]
#[command(name = "netslice")]
#[command(about = "5G/6G network slice admission control and resource arbitration service")]
struct Cli {
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[arg(long, default_value = "8080")]
    dashboard_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;

    info!("Starting network slice management service");

    // Demand strategy: learned predictor when enabled, linear placeholder
    // otherwise.
    let predictor = if config.predictor.enabled {
        let net = DemandNet::load_from_file(&config.predictor.model_path).await?;
        Some(Arc::new(ResourcePredictor::new(net)))
    } else {
        None
    };

    let demand_model: Arc<dyn DemandModel> = match &predictor {
        Some(predictor) => predictor.clone(),
        None => Arc::new(LinearDemandModel),
    };

    let arbiter = Arc::new(ResourceArbiter::new(
        config.capacity.as_totals(),
        demand_model,
    ));

    let vnf_manager = Arc::new(VnfManager::new());

    let telemetry = TelemetryCollector::new(&config.telemetry, arbiter.clone(), predictor.clone());

    let dashboard_server = DashboardServer::new(arbiter.clone(), vnf_manager.clone(), predictor);

    // Start services
    let telemetry_handle = tokio::spawn(async move {
        if let Err(e) = telemetry.start_collection().await {
            warn!("Telemetry collection error: {}", e);
        }
    });

    let dashboard_handle = tokio::spawn({
        let server = dashboard_server;
        async move {
            if let Err(e) = server.start(cli.dashboard_port).await {
                warn!("Dashboard server error: {}", e);
            }
        }
    });

    info!("All services started successfully");
    info!("Dashboard available at http://localhost:{}", cli.dashboard_port);

    // Wait for shutdown signal
    signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping services...");

    telemetry_handle.abort();
    dashboard_handle.abort();

    Ok(())
}

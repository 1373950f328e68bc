mod adapters;
mod application;
mod config;
mod domain;
mod error;
mod ports;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adapters::{ProcfsAdapter, ProcfsConfig, WalkdirSizeEstimator};
use application::{Backend, CollectorService, MountDiscovery, ProcessDiscovery, SelfExclusion};
use config::{BackendKind, Config};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run());

    // Do not wait for a size walk stuck in a syscall after it timed out
    runtime.shutdown_background();
    result
}

async fn run() -> Result<(), BoxError> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging; stdout is reserved for the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("kubedisk={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting kubedisk v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    // Initialize adapters
    let procfs_adapter = ProcfsAdapter::new(ProcfsConfig::new(config.proc_path.clone()));
    let estimator = Arc::new(WalkdirSizeEstimator::new(config.walk_timeout()));

    let backend = match config.backend {
        BackendKind::Process => Backend::Process(ProcessDiscovery::new(
            Arc::new(procfs_adapter.process_source()),
            estimator,
        )),
        BackendKind::Mount => Backend::Mount(MountDiscovery::new(
            Arc::new(procfs_adapter.system_source()),
            estimator,
            config.rootfs_suffix.clone(),
        )),
    };

    let collector = CollectorService::new(
        Arc::new(procfs_adapter.system_source()),
        config.root_path.clone(),
        backend,
        SelfExclusion::from_config(&config),
    );

    let report = match collector.collect().await {
        Ok(report) => report,
        Err(e) => {
            error!("Collection aborted: {}", e);
            return Err(e.into());
        }
    };

    let output = if config.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}

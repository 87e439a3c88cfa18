use clap::Parser;
use pulse_api::{create_router, AppState};
use pulse_config::ConfigLoader;
use pulse_monitor::{HealthMonitor, HostMetricsCollector, SharedProviderStats, SystemHostCollector};
use pulse_notify::{MailTransport, MemorySink, SmtpMailer};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "healthcheck.toml")]
    config: String,

    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    tracing::info!("Starting PULSE healthcheck service with config: {}", args.config);

    let config = ConfigLoader::new(&args.config).load()?;

    let collector: Arc<dyn HostMetricsCollector> = Arc::new(SystemHostCollector::new());
    let provider_stats = SharedProviderStats::new();
    let sink = Arc::new(MemorySink::new());
    let mailer: Option<Arc<dyn MailTransport>> = config
        .smtp
        .clone()
        .map(|smtp| Arc::new(SmtpMailer::new(smtp)) as Arc<dyn MailTransport>);

    let monitor = HealthMonitor::new(
        config,
        collector.clone(),
        Arc::new(provider_stats.clone()),
        sink,
        mailer,
    );
    monitor.start().await;

    let app = create_router(AppState {
        status: monitor.status(),
        stats: provider_stats,
        collector,
    });

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    tracing::info!("Listening on {}", args.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // HTTP 停了再停调度器，在途检查允许跑完
    monitor.stop().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// 等待 SIGTERM / Ctrl+C
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
            _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl+C"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Received Ctrl+C");
    }
}

use print_server::{Config, Server, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logging
    dotenv::dotenv().ok();
    let config = Config::from_env();

    let log_dir = config.log_to_file.then(|| config.log_dir());
    init_logger(&config.log_level, log_dir.as_deref())?;

    tracing::info!("Print server starting...");
    if config.simulate {
        tracing::warn!("PRINT_SIMULATE is set, jobs are encoded but never printed");
    }
    match &config.default_printer {
        Some(name) => tracing::info!(printer = %name, "default printer"),
        None => tracing::info!("no default printer, requests must name one"),
    }

    // 2. Serve until Ctrl-C
    if let Err(e) = Server::new(config).run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}

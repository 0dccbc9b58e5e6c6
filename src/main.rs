use std::sync::{Arc, PoisonError};

mod config;
mod domain;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config path (without extension) as the first argument
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;

    logger::init(&cfg)?;

    // Create Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("Using {workers} worker threads"));
    } else {
        logger::log_info("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::bind_listener(addr, cfg.server.backlog)?;

    let state = Arc::new(config::AppState::new(&cfg)?);

    logger::log_server_start(&addr, &cfg);
    logger::log_info(&format!(
        "Loaded {} searchable user(s){}",
        state.directory.len(),
        cfg.search
            .users_file
            .as_deref()
            .map(|path| format!(" from {path}"))
            .unwrap_or_default()
    ));
    if state.directory.is_empty() {
        logger::log_warning("User list is empty, every search will return no rows");
    }
    let initial_price = state
        .price
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .current();
    logger::log_info(&format!("Price ticker starts at ${initial_price:.1}"));
    logger::log_info(&format!(
        "Limits: max body {} bytes, max connections {:?}",
        cfg.http.max_body_size, cfg.performance.max_connections
    ));

    server::start_signal_handler(Arc::clone(&state.shutdown));
    server::run_server_loop(listener, state).await;
    Ok(())
}

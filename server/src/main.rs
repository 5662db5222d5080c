//! FILENAME: server/src/main.rs
// PURPOSE: Service entry point - config, logging, listener.

use std::path::Path;
use std::sync::Arc;

use server::{create_app_state, router, ServerConfig};
use server::{log_error, log_info};

#[tokio::main]
async fn main() {
    // Optional first argument: path to a JSON config file.
    let config = match std::env::args().nth(1) {
        Some(path) => match ServerConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{}", err);
                std::process::exit(1);
            }
        },
        None => ServerConfig::default(),
    };

    if let Some(path) = &config.log_file {
        if let Err(err) = server::logging::init_log_file(path) {
            eprintln!("[LOG_INIT] {}", err);
        }
    }

    log_info!(
        "BOOT",
        "engine host: {} ({} / {} -> {})",
        config.engine.command,
        config.engine.workbook,
        config.engine.input_sheet,
        config.engine.output_sheet
    );
    log_info!(
        "BOOT",
        "pool size {}, output region {} ({}x{})",
        config.pool_size,
        config.output_range,
        config.output_rows,
        config.output_cols
    );

    let state = Arc::new(create_app_state(&config));
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            log_error!("BOOT", "failed to bind {}: {}", config.bind_addr, err);
            std::process::exit(1);
        }
    };
    log_info!("BOOT", "listening on {}", config.bind_addr);

    if let Err(err) = axum::serve(listener, app).await {
        log_error!("BOOT", "server error: {}", err);
    }
}

use render_gate::config::Config;
use render_gate::{logger, server};

const CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Size the runtime from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr, server::DEFAULT_BACKLOG)?;

    logger::log_server_start(&addr, &cfg);

    let state = render_gate::build_state(cfg)?;
    server::start_signal_handler(std::sync::Arc::clone(&state.shutdown))?;

    // Use LocalSet for spawn_local support
    server::serve(listener, state).await;
    Ok(())
}

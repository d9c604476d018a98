use anyhow::Context;
use simple_http_server::config::Config;
use simple_http_server::{http, logging};

fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    logging::init(&cfg)?;

    let server = http::server::bind(&cfg).context("cannot start server")?;

    let shutdown = server.shutdown_handle();
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        shutdown.stop();
    })
    .context("cannot install signal handler")?;

    let reaper = server.spawn_reaper()?;
    server.run();

    if reaper.join().is_err() {
        tracing::error!("reaper panicked");
    }
    tracing::info!("Program terminated");
    Ok(())
}

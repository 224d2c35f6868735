use xox::config;
use xox::http::routes::{self, AppState};
use xox::room::manager::RoomManager;
use xox::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let rooms = RoomManager::new(config::grace_period());
    let grace_secs = rooms.grace_period().as_secs();
    let state = AppState { rooms };
    let static_dir = config::static_dir();
    let app = routes::router(state, &static_dir);

    let addr = config::server_addr();
    tracing::info!(%addr, static_dir = %static_dir.display(), grace_secs, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

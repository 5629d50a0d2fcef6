use chirp_social::settings;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let settings = settings::load_settings().expect("Failed to load settings");
    chirp_social::init_tracing(&settings);
    let port = settings.port.unwrap_or(3000);

    let app = chirp_social::setup_router(&settings).await?;
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    debug!(
        "Server running on http://{}",
        listener.local_addr().expect("listener has a local address")
    );

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }

    Ok(())
}

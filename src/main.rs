use crew_portal_backend::{
    config::Config,
    database::pool::{create_pool, run_migrations},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;

    let app_state = AppState::new(pool, &config)?;

    if let (Some(email), Some(password)) = (
        config.bootstrap_admin_email.as_deref(),
        config.bootstrap_admin_password.as_deref(),
    ) {
        match app_state.admin_service.bootstrap(email, password).await {
            Ok(Some(_)) => info!("Bootstrap admin account created for {}", email),
            Ok(None) => info!("Admin accounts already exist, skipping bootstrap"),
            Err(e) => tracing::error!(error = %e, "Failed to create bootstrap admin"),
        }
    }

    info!(
        visibility = ?config.crew_visibility,
        uploads_dir = %config.uploads_dir,
        "Crew portal configured"
    );

    let app = routes::router(app_state, &config)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

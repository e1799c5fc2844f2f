use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::info;

use cohortly::jobs::live_session_reminder::spawn_live_session_reminder;
use cohortly::logging::init_tracing;
use cohortly::metrics::{init_metrics, metrics_app};
use cohortly::router::init_router;
use cohortly::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    init_tracing();

    let state = init_app_state().await;

    sqlx::migrate!()
        .run(&state.db)
        .await
        .expect("Failed to run database migrations");

    if let Some(handle) = init_metrics() {
        let metrics_port: u16 = std::env::var("METRICS_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(9100);
        let metrics_router = metrics_app(handle);
        tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(("0.0.0.0", metrics_port))
                .await
                .expect("Failed to bind metrics listener");
            info!("Metrics available on http://localhost:{}/metrics", metrics_port);
            axum::serve(listener, metrics_router)
                .await
                .expect("Metrics server failed");
        });
    }

    spawn_live_session_reminder(state.clone());

    let app = init_router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind listener");

    info!("🚀 Server running on http://localhost:{}", port);
    info!("📚 Swagger UI available at http://localhost:{}/swagger-ui", port);
    info!("📖 Scalar UI available at http://localhost:{}/scalar", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server failed");
}

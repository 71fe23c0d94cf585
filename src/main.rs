use axum::{
    routing::{get, post},
    Router,
};
use reviewbox_backend::services::{
    review_customer_service::ReviewCustomerService, review_message_service::ReviewMessageService,
    review_scheduler::ReviewScheduler, whatsapp_service::WhatsAppService,
};
use reviewbox_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool.clone());

    let shutdown = CancellationToken::new();
    let scheduler_handle = {
        let scheduler = ReviewScheduler::new(
            ReviewCustomerService::new(pool.clone()),
            WhatsAppService::new(config.whatsapp.clone()),
            ReviewMessageService::new(config.whatsapp.clone()),
            config.schedule.clone(),
            config.whatsapp.clone(),
        );
        let token = shutdown.clone();
        tokio::spawn(scheduler.run(token))
    };

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/review/customer", post(routes::review::add_customers))
        .route(
            "/api/review/customers/:company_id",
            get(routes::review::list_by_company),
        )
        .route(
            "/api/review/customer/:id",
            get(routes::review::get_by_id).delete(routes::review::deactivate),
        )
        .route(
            "/api/company",
            get(routes::company::list_companies).post(routes::company::create_company),
        )
        .route(
            "/api/company/:id",
            get(routes::company::get_company).put(routes::company::update_company),
        )
        .route("/r/:id", get(routes::redirect::redirect_to_review))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the scheduler and let any in-flight send finish.
    shutdown.cancel();
    let _ = scheduler_handle.await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

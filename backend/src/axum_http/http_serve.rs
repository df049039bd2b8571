use crate::{
    axum_http::{default_routers, error_responses, routers, webhook_guard::WebhookGuard},
    config::config_model::DotEnvyConfig,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::get,
};
use crates::{
    domain::repositories::{payment_gateway::PaymentGateway, payments::PaymentRepository},
    infra::db::{
        postgres::postgres_connection,
        repositories::{payments::PaymentPostgres, payments_in_memory::PaymentInMemory},
    },
    payments::pix_gateway::{PixGatewayConfig, PixPaymentGateway},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

/// Assembles the HTTP surface around an already-built payment gateway.
pub fn build_router<G>(config: &DotEnvyConfig, payment_gateway: Arc<G>) -> Result<Router>
where
    G: PaymentGateway + Send + Sync + 'static,
{
    let webhook_guard = Arc::new(WebhookGuard::new(config.webhook.token.clone()));

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/payment",
            routers::payments::routes(payment_gateway, webhook_guard),
        )
        .route(
            "/health",
            get(default_routers::health_check).post(default_routers::health_check),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([
                    AUTHORIZATION,
                    CONTENT_TYPE,
                    HeaderName::from_static("x-webhook-token"),
                ])
                .allow_origin(Any),
        )
        .layer(middleware::from_fn(error_responses::error_envelope))
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn build_app<R>(config: &DotEnvyConfig, payment_repository: Arc<R>) -> Result<Router>
where
    R: PaymentRepository + Send + Sync + 'static,
{
    let payment_gateway = PixPaymentGateway::new(
        PixGatewayConfig {
            base_url: config.payment_provider.base_url.clone(),
            access_token: config.payment_provider.access_token.clone(),
            webhook_url: config.payment_provider.webhook_url.clone(),
        },
        payment_repository,
    )?;

    build_router(config, Arc::new(payment_gateway))
}

pub async fn start(config: Arc<DotEnvyConfig>) -> Result<()> {
    let app = if config.database.is_in_memory() {
        warn!("Payments are kept in memory and lost on restart");
        build_app(&config, Arc::new(PaymentInMemory::new()))?
    } else {
        let postgres_pool = postgres_connection::establish_connection(&config.database.url)?;
        info!("Postgres connection has been established");
        build_app(
            &config,
            Arc::new(PaymentPostgres::new(Arc::new(postgres_pool))),
        )?
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}

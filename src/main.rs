mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::{self, AccessService};
use crate::features::changes::{routes as changes_routes, ChangeFeed, ChangesState};
use crate::features::files::repositories::{PgFavoriteRepository, PgFileRepository};
use crate::features::files::{routes as files_routes, FileService};
use crate::features::users::repositories::PgUserRepository;
use crate::features::users::{routes as users_routes, UserService};
use crate::features::webhooks::{routes as webhooks_routes, WebhookService, WebhookVerifier};
use crate::modules::storage::MinIOClient;
use axum::{middleware::from_fn_with_state, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // Auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.jwks_url,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configured for issuer {}", jwt_validator.issuer());

    // Storage
    let minio_client = Arc::new(
        MinIOClient::new(config.storage.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?,
    );
    minio_client
        .ensure_bucket_exists()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to ensure MinIO bucket exists: {}", e))?;
    tracing::info!(
        "MinIO client initialized for bucket: {}",
        minio_client.bucket_name()
    );

    // Repositories
    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
    let file_repository = Arc::new(PgFileRepository::new(pool.clone()));
    let favorite_repository = Arc::new(PgFavoriteRepository::new(pool.clone()));

    // Services
    let change_feed = Arc::new(ChangeFeed::new(config.change_feed.capacity));
    let access_service = Arc::new(AccessService::new(
        user_repository.clone(),
        file_repository.clone(),
    ));
    let user_service = Arc::new(UserService::new(user_repository));
    let file_service = Arc::new(FileService::new(
        Arc::clone(&access_service),
        file_repository,
        favorite_repository,
        minio_client,
        Arc::clone(&change_feed),
        config.app.public_url.clone(),
    ));

    let webhook_verifier = WebhookVerifier::new(
        &config.webhook.signing_secret,
        config.webhook.tolerance,
    )
    .map_err(|e| anyhow::anyhow!("Invalid WEBHOOK_SIGNING_SECRET: {}", e))?;
    let webhook_service = Arc::new(WebhookService::new(
        webhook_verifier,
        Arc::clone(&user_service),
        config.auth.issuer.clone(),
    ));
    tracing::info!("Services initialized");

    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn_with_state(
                Arc::new(credentials),
                middleware::basic_auth_middleware,
            ))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Routes where a bearer token is optional; each operation decides what
    // an anonymous caller gets
    let api_routes = Router::new()
        .merge(files_routes::routes(file_service))
        .merge(users_routes::routes(user_service))
        .merge(changes_routes::routes(ChangesState {
            access: access_service,
            feed: change_feed,
        }))
        .route_layer(from_fn_with_state(
            jwt_validator,
            middleware::optional_auth_middleware,
        ));

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Authenticated by signature instead of bearer token
    let webhook_routes = webhooks_routes::routes(webhook_service);

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(webhook_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    // SSE subscribers hold connections open; detect dead peers
    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

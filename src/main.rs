use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use nivaran_core::core::config::Config;
use nivaran_core::core::openapi::{ApiDoc, SwaggerInfoModifier};
use nivaran_core::core::{database, middleware};
use nivaran_core::features::ai_proxy::{routes as ai_proxy_routes, AiProxyService};
use nivaran_core::features::auth::clients::GoTrueClient;
use nivaran_core::features::auth::routes as auth_routes;
use nivaran_core::features::auth::services::AuthService;
use nivaran_core::features::auth::JwtValidator;
use nivaran_core::features::health::{
    routes as health_routes, AiServiceProbe, DatabaseProbe, HealthService,
};
use nivaran_core::features::issues::{routes as issues_routes, IssueService};
use nivaran_core::features::rewards::{routes as rewards_routes, RewardService};
use nivaran_core::features::users::{routes as users_routes, UserProfileService};
use nivaran_core::shared::constants::BACKEND_USER_AGENT;
use nivaran_core::shared::recent_logs::RecentLogs;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
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
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    let recent_logs = RecentLogs::default();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(recent_logs.layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
        worker_threads,
        std::process::id()
    );
    tracing::info!(
        "Configuration loaded (environment={}, version={})",
        config.app.environment,
        config.app.version
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        database::run_migrations(&pool)
            .await
            .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
        tracing::info!("Database migrations completed successfully");
    }

    // Auth
    let jwt_validator = Arc::new(JwtValidator::new(&config.auth));
    let gotrue_client = Arc::new(GoTrueClient::new(&config.auth));
    let auth_service = Arc::new(AuthService::new(gotrue_client));
    tracing::info!("Auth initialized (issuer: {})", config.auth.issuer());

    // Domain services
    let user_profile_service = Arc::new(UserProfileService::new(pool.clone()));
    let issue_service = Arc::new(IssueService::new(pool.clone()));
    let reward_service = Arc::new(RewardService::new(pool.clone()));
    tracing::info!("Domain services initialized");

    // One outbound client for the AI service, shared by the proxy and the health probe
    let ai_http_client = reqwest::Client::builder()
        .user_agent(BACKEND_USER_AGENT)
        .build()?;
    let ai_proxy_service = Arc::new(AiProxyService::new(
        ai_http_client.clone(),
        &config.ai,
        config.app.environment,
    ));
    match config.ai.service_url.as_deref() {
        Some(url) => tracing::info!("AI proxy forwarding to {}", url),
        None => tracing::warn!("AI_SERVICE_URL not set; /api/ai requests will return 500"),
    }

    let health_service = Arc::new(HealthService::new(
        config.app.version.clone(),
        config.app.environment,
        Arc::new(DatabaseProbe::new(pool.clone(), config.ai.probe_timeout)),
        Arc::new(AiServiceProbe::new(
            ai_http_client,
            config.ai.service_url.clone(),
            config.ai.probe_timeout,
        )),
    ));

    // Build application router with dynamic swagger config
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
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(users_routes::routes(user_profile_service))
        .merge(issues_routes::protected_routes(Arc::clone(&issue_service)))
        .merge(rewards_routes::protected_routes(Arc::clone(&reward_service)))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator,
            middleware::auth_middleware,
        ));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(auth_service))
        .merge(issues_routes::public_routes(issue_service))
        .merge(rewards_routes::public_routes(reward_service))
        .merge(health_routes::routes(health_service))
        .merge(ai_proxy_routes::routes(
            ai_proxy_service,
            config.ai.client_api_key.clone(),
        ));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .fallback(middleware::not_found)
        .layer(axum::middleware::from_fn_with_state(
            config.app.environment,
            middleware::expose_error_detail,
        ))
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(CatchPanicLayer::custom(middleware::PanicResponder {
            environment: config.app.environment,
        }))
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
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(
        "Server stopped ({} recent log entries buffered)",
        recent_logs.len()
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

//! Registry Console Server
//!
//! Serves the admin console APIs:
//! - Audit trail: `/api/admin/audit-trail`
//! - Apps: `/api/admin/apps`
//! - Health: `/health`, `/health/live`, `/health/ready`
//!
//! Configuration comes from a TOML file with `REGISTRY_CONSOLE_*`
//! environment overrides (see `rc_config`). `RUST_LOG` sets the log level
//! and `LOG_FORMAT=json` switches to JSON logs.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::HeaderValue;
use axum::Router;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use rc_config::AppConfig;
use rc_console::api::{
    apps_router, audit_trail_router, health_router, AppState, AppsState, AuditTrailState, AuthLayer,
    HealthState,
};
use rc_console::app::DetailOptions;
use rc_console::auth::AuthConfig;
use rc_console::idp::{Auth0Client, Auth0Settings, UnconfiguredProvider};
use rc_console::shared::permissions::roles;
use rc_console::{
    AppRepository, AppSyncService, AuditTrailResolver, AuthService, AuthorizationService, CapabilityCheck,
    IdentityProviderSync, PermissionPolicy, UserRepository, VersionRepository,
};

const DEV_SECRET_KEY: &str = "registry-console-dev-secret";

#[tokio::main]
async fn main() -> Result<()> {
    rc_common::logging::init_logging("rc-console-server");

    info!("Starting Registry Console Server");

    let config = AppConfig::load()?;
    config.validate()?;
    info!(port = config.http.port, dev_mode = config.dev_mode, "Configuration loaded");

    // Connect to MongoDB
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
    let db = mongo_client.database(&config.mongodb.database);
    info!(database = %config.mongodb.database, "Connected to MongoDB");

    // Initialize repositories
    let version_repo = Arc::new(VersionRepository::new(&db));
    let user_repo = Arc::new(UserRepository::new(&db));
    let app_repo = Arc::new(AppRepository::new(&db));

    // Operator authentication
    let secret_key = if config.auth.secret_key.is_empty() {
        warn!("auth.secret_key is empty, using the development secret");
        DEV_SECRET_KEY.to_string()
    } else {
        config.auth.secret_key.clone()
    };
    let auth_service = Arc::new(AuthService::new(AuthConfig {
        secret_key,
        issuer: config.auth.issuer.clone(),
        audience: config.auth.audience.clone(),
        ..Default::default()
    }));
    let authz_service = Arc::new(AuthorizationService::new());
    let capabilities: Arc<dyn CapabilityCheck> = Arc::new(PermissionPolicy);

    if config.dev_mode {
        let token = auth_service.generate_token("dev-admin", "Development Admin", None, &[roles::ADMIN])?;
        info!(%token, "Development admin token");
    }

    // Identity provider
    let provider: Arc<dyn IdentityProviderSync> = if config.auth0.is_configured() {
        info!(base_url = %config.auth0.effective_base_url(), "Auth0 sync enabled");
        Arc::new(Auth0Client::new(Auth0Settings {
            base_url: config.auth0.effective_base_url(),
            client_id: config.auth0.client_id.clone(),
            client_secret: config.auth0.client_secret.clone(),
            audience: config.auth0.effective_audience(),
            request_timeout: Duration::from_secs(config.auth0.request_timeout_secs),
        })?)
    } else {
        warn!("Auth0 is not configured, app sync will report an error");
        Arc::new(UnconfiguredProvider)
    };

    let auth0_dashboard = (!config.auth0.dashboard_tenant.is_empty())
        .then(|| (config.auth0.dashboard_region.clone(), config.auth0.dashboard_tenant.clone()));

    // Build API states
    let resolver = Arc::new(AuditTrailResolver::new(user_repo, app_repo.clone(), version_repo));
    let audit_trail_state = AuditTrailState {
        resolver,
        capabilities: capabilities.clone(),
        default_page_size: config.console.default_page_size,
    };

    let sync_service = Arc::new(AppSyncService::new(app_repo.clone(), provider, capabilities.clone()));
    let apps_state = AppsState {
        app_repo,
        sync_service,
        capabilities,
        detail_options: DetailOptions {
            show_client_secrets: config.console.show_client_secrets,
            auth0_dashboard,
        },
        default_page_size: config.console.default_page_size,
    };

    let health_state = HealthState::new(Some(db), Some(env!("CARGO_PKG_VERSION").to_string()));

    let app_state = AppState::new(auth_service, authz_service)
        .with_session_cookie_name(config.auth.session_cookie_name.clone());

    // Build API router using OpenApiRouter for auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/admin/audit-trail", audit_trail_router(audit_trail_state))
        .nest("/api/admin/apps", apps_router(apps_state))
        .split_for_parts();

    openapi.info.title = "Registry Console API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("Audit trail and app registry administration".to_string());

    let app = Router::new()
        .merge(router)
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(AuthLayer::new(app_state))
        .nest("/health", health_router(health_state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    health_state.set_ready();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Registry Console Server shutdown complete");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins.iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(parsed)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use http::HeaderValue;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use shipowl_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);

    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("failed running migrations: {}", e);
            e
        })?;
    }
    let db_arc = Arc::new(db_pool);

    // Courier tracking client (refresh endpoint reports failures when unset)
    let courier: Arc<dyn api::couriers::CourierClient> = match &cfg.courier_api_url {
        Some(url) => Arc::new(api::couriers::HttpCourierClient::new(
            url,
            cfg.courier_api_key.clone(),
            Duration::from_secs(cfg.courier_timeout_secs),
        )?),
        None => {
            info!("courier API not configured; tracking refresh disabled");
            Arc::new(api::couriers::UnconfiguredCourier)
        }
    };

    // Mail delivery (logged-only without a relay)
    let mailer: Arc<dyn api::services::email::Mailer> = match &cfg.mail_relay_url {
        Some(url) => {
            info!("mail relay configured");
            Arc::new(api::services::email::HttpRelayMailer::new(
                url.clone(),
                cfg.mail_relay_secret.clone(),
            )?)
        }
        None => {
            info!("mail relay not configured; email delivery is log-only");
            Arc::new(api::services::email::NoopMailer)
        }
    };

    let uploads = Arc::new(api::services::uploads::UploadStore::new(
        cfg.upload_dir.clone(),
        cfg.upload_max_bytes,
    ));

    // Aggregate app services used by HTTP handlers
    let services = api::handlers::AppServices::new(db_arc.clone(), courier, mailer, uploads);

    // Seed the permission catalogue so role management works out of the box.
    services.roles.seed_permissions().await?;

    let app_state = api::AppState {
        db: db_arc,
        config: cfg.clone(),
        services,
    };

    // Build CORS layer from config
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    let cors_layer = if let Some(origins) = configured_origins {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        info!("using permissive CORS (no explicit origins configured)");
        CorsLayer::permissive()
    } else {
        error!("missing CORS configuration; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
        anyhow::bail!(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
        );
    };

    // Build router: health + full v1 API + Swagger UI + uploaded files
    let app = Router::new()
        .nest("/api/v1", api::api_v1_routes())
        .merge(api::openapi::swagger_ui())
        .nest_service("/uploads", ServeDir::new(&cfg.upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            cfg.request_timeout_secs,
        )))
        .layer(cors_layer)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(app_state);

    // Bind and serve
    let addr = SocketAddr::new(
        cfg.host.parse().context("invalid host address")?,
        cfg.port,
    );
    info!("shipowl-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

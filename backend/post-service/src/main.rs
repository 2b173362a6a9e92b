use actix_cors::Cors;
use actix_middleware::Logging;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use crypto_core::jwt::TokenGuard;
use post_service::db::{
    InMemoryPostRepository, InMemoryUserRepository, PgPostRepository, PgUserRepository,
    PostRepository, UserRepository,
};
use post_service::{handlers, AppState, Config};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(production: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    if production {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn build_repositories(
    config: &Config,
) -> anyhow::Result<(Arc<dyn PostRepository>, Arc<dyn UserRepository>)> {
    let Some(url) = config.database.url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using in-memory stores; data is lost on restart");
        return Ok((
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        ));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;
    tracing::info!("database migrations applied");

    Ok((
        Arc::new(PgPostRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
    ))
}

fn build_cors(allowed_origins: &str) -> Cors {
    let mut cors = Cors::default();
    for origin in allowed_origins.split(',') {
        let origin = origin.trim();
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
        }
    }
    cors.allow_any_method().allow_any_header().max_age(3600)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Post Service
///
/// # Routes
///
/// - `/api/users`, `/api/auth` - registration, login, current user
/// - `/api/posts/*` - posts, likes and comments
/// - `/health`, `/ready` - liveness and readiness
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let production = std::env::var("APP_ENV")
        .map(|env| env.eq_ignore_ascii_case("production"))
        .unwrap_or(false);
    init_tracing(production);

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!(env = %config.app.env, "starting post-service");

    let guard = Arc::new(TokenGuard::new(&config.jwt_config()));
    let (post_repo, user_repo) = build_repositories(&config).await?;
    let state = web::Data::new(AppState::new(post_repo, user_repo, guard));

    let bind_addr = (config.app.host.clone(), config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&allowed_origins))
            .wrap(Logging)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure(state.clone()))
    })
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}:{}", bind_addr.0, bind_addr.1))?
    .run();

    tracing::info!("listening on {}:{}", bind_addr.0, bind_addr.1);

    let handle = server.handle();
    tokio::select! {
        result = server => {
            result.context("HTTP server error")?;
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, stopping HTTP server");
            handle.stop(true).await;
        }
    }

    Ok(())
}

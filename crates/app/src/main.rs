use std::path::PathBuf;

use accounts::Accounts;
use migration::{Migrator, MigratorTrait};
use server::{CookieSettings, ServerConfig};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spa_sessions={level},server={level},accounts={level},migration={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no server settings found, nothing to run");
        return Ok(());
    };

    let db = parse_database(&server.database).await?;
    let accounts = Accounts::builder()
        .database(db)
        .session_ttl(chrono::Duration::seconds(settings.session.ttl_secs))
        .build()?;

    let config = ServerConfig {
        templates: PathBuf::from(&server.templates),
        static_dir: PathBuf::from(&server.static_dir),
        allowed_origins: server.allowed_origins.clone(),
        cookie: CookieSettings {
            name: settings.session.cookie_name,
            same_site: settings.session.same_site.into(),
            secure: settings.session.secure,
        },
    };

    let state = server::ServerState::new(accounts.clone(), &config);
    let app = server::router(state, &config)?;
    let listener = bind(&server).await?;

    if settings.session.sweep_interval_secs > 0 {
        let every = std::time::Duration::from_secs(settings.session.sweep_interval_secs);
        tasks.spawn(sweep_expired_sessions(accounts, every));
    }

    tasks.spawn(async move {
        if let Err(err) = server::serve(app, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn bind(server: &settings::Server) -> Result<tokio::net::TcpListener, std::io::Error> {
    let bind = server.bind.as_deref().unwrap_or("127.0.0.1");
    let addr = format!("{}:{}", bind, server.port);
    tokio::net::TcpListener::bind(&addr).await.map_err(|err| {
        tracing::error!("failed to bind server listener on {addr}: {err}");
        err
    })
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

async fn sweep_expired_sessions(accounts: Accounts, every: std::time::Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        match accounts.clear_expired().await {
            Ok(0) => {}
            Ok(removed) => tracing::info!("removed {removed} expired sessions"),
            Err(err) => tracing::error!("failed to clear expired sessions: {err}"),
        }
    }
}

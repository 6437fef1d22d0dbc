use exam_portal::{
    exam::repository::{ExamRepository, InMemoryExamRepository, PostgresExamRepository},
    user::{InMemoryUserRepository, PostgresUserRepository, UserRepository},
    AppConfig, AppState,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn UserRepository + Send + Sync>,
    Arc<dyn ExamRepository + Send + Sync>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exam_portal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(
        environment = config.environment.as_str(),
        base_path = %config.api_base_path,
        "Starting exam portal server"
    );

    let (user_repository, exam_repository) = repositories(&config).await?;
    let bind_addr = config.bind_addr;
    let app_state = AppState::new(config, user_repository, exam_repository);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, exam_portal::app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn repositories(config: &AppConfig) -> Result<Repositories, Box<dyn std::error::Error>> {
    let Some(database_url) = &config.database_url else {
        warn!("DATABASE_URL not set, using empty in-memory storage (development only)");
        let users: Arc<dyn UserRepository + Send + Sync> = Arc::new(InMemoryUserRepository::new());
        let exams: Arc<dyn ExamRepository + Send + Sync> = Arc::new(InMemoryExamRepository::new());
        return Ok((users, exams));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(database_url)
        .await?;
    info!(max_connections = config.db_max_connections, "Connected to database");

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    let users: Arc<dyn UserRepository + Send + Sync> =
        Arc::new(PostgresUserRepository::new(pool.clone()));
    let exams: Arc<dyn ExamRepository + Send + Sync> = Arc::new(PostgresExamRepository::new(pool));
    Ok((users, exams))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler, run until the process is killed
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

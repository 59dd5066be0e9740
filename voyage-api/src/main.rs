use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voyage_api::{app, AppState, AuthConfig};
use voyage_booking::AdjacencyPolicy;
use voyage_store::app_config::Config;
use voyage_store::{DbClient, EventProducer, PostgresReservationLedger, PostgresTripCatalog, RedisClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voyage_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Voyage API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let policy = if config.booking_rules.enforce_gender_adjacency {
        AdjacencyPolicy::Enforce
    } else {
        AdjacencyPolicy::Advisory
    };
    tracing::info!("Gender adjacency policy: {:?}", policy);

    let mut state = AppState::new(
        Arc::new(PostgresTripCatalog::new(db.pool.clone())),
        Arc::new(PostgresReservationLedger::new(db.pool.clone())),
        policy,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    );

    // Redis (rate limiting only)
    if let Some(redis) = &config.redis {
        let client = RedisClient::new(&redis.url)
            .await
            .context("Failed to configure Redis")?;
        state = state.with_redis(Arc::new(client), config.booking_rules.rate_limit_per_minute);
    } else {
        tracing::warn!("No Redis configured, rate limiting disabled");
    }

    // Kafka
    if let Some(kafka) = &config.kafka {
        let producer = EventProducer::new(&kafka.brokers).context("Failed to create Kafka producer")?;
        state = state.with_events(Arc::new(producer));
    } else {
        tracing::warn!("No Kafka configured, reservation events will not be published");
    }

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

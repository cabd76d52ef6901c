//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{
    MentionService, MentionServiceImpl, MessageService, MessageServiceImpl, ReactionService,
    ReactionServiceImpl, RelayService, RelayServiceImpl, UserService, UserServiceImpl,
};
use crate::config::{Settings, StorageBackend};
use crate::domain::{
    Channel, ChannelRepository, MentionRepository, MessageRepository, NotificationSink, User,
    UserDirectory,
};
use crate::infrastructure::database;
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::repositories::{
    PgChannelRepository, PgMessageRepository, PgUserRepository,
};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::{Dispatcher, Gateway};
use crate::shared::snowflake::SnowflakeGenerator;

/// Storage handles the services are wired over
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserDirectory>,
    pub channels: Arc<dyn ChannelRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub mentions: Arc<dyn MentionRepository>,
}

impl Repositories {
    /// Every repository backed by one in-process store
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            channels: store.clone(),
            messages: store.clone(),
            mentions: store,
        }
    }

    /// PostgreSQL repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        let messages = Arc::new(PgMessageRepository::new(pool.clone()));
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            channels: Arc::new(PgChannelRepository::new(pool)),
            messages: messages.clone(),
            mentions: messages,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<dyn MessageService>,
    pub reactions: Arc<dyn ReactionService>,
    pub mentions: Arc<dyn MentionService>,
    pub users: Arc<dyn UserService>,
    pub relay: Arc<dyn RelayService>,
    pub directory: Arc<dyn UserDirectory>,
    pub gateway: Arc<Gateway>,
    pub dispatcher: Arc<Dispatcher>,
    pub settings: Arc<Settings>,
    /// Present only for the PostgreSQL backend
    pub db: Option<PgPool>,
}

impl AppState {
    /// Wire services over the given repositories. The gateway is the
    /// notification sink for every service that publishes.
    pub fn new(settings: Settings, repos: Repositories, db: Option<PgPool>) -> Self {
        let gateway = Arc::new(Gateway::new(
            settings.websocket.heartbeat_interval_ms,
            settings.websocket.event_buffer,
        ));
        let sink: Arc<dyn NotificationSink> = gateway.clone();

        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            settings.snowflake.epoch,
        ));

        let messages = Arc::new(MessageServiceImpl::new(
            repos.messages.clone(),
            repos.channels.clone(),
            repos.users.clone(),
            sink.clone(),
            snowflake,
        ));
        let reactions = Arc::new(ReactionServiceImpl::new(
            repos.messages,
            sink.clone(),
            settings.reactions.max_retries,
        ));
        let mentions = Arc::new(MentionServiceImpl::new(
            repos.mentions,
            settings.inbox.page_size,
        ));
        let users = Arc::new(UserServiceImpl::new(repos.users.clone()));
        let relay = Arc::new(RelayServiceImpl::new(repos.channels, sink));

        Self {
            messages,
            reactions,
            mentions,
            users,
            relay,
            directory: repos.users,
            gateway,
            dispatcher: Arc::new(Dispatcher::with_default_handlers()),
            settings: Arc::new(settings),
            db,
        }
    }

    /// State over a single in-memory store
    pub fn in_memory(settings: Settings, store: Arc<MemoryStore>) -> Self {
        Self::new(settings, Repositories::memory(store), None)
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let state = match settings.storage.backend {
            StorageBackend::Memory => {
                let store = Arc::new(seeded_store(&settings));
                tracing::info!(
                    users = settings.storage.seed_users.len(),
                    channels = settings.storage.seed_channels.len(),
                    "In-memory store seeded"
                );
                AppState::in_memory(settings.clone(), store)
            }
            StorageBackend::Postgres => {
                let db = database::create_pool(&settings.database).await?;
                tracing::info!("Database connection pool created");

                if settings.database.run_migrations {
                    database::run_migrations(&db).await?;
                    tracing::info!("Database migrations applied");
                }

                AppState::new(
                    settings.clone(),
                    Repositories::postgres(db.clone()),
                    Some(db),
                )
            }
        };

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        // Bind to address
        let addr = settings.server.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        health::init_server_start();
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Build a memory store holding the configured seed users and channels
pub fn seeded_store(settings: &Settings) -> MemoryStore {
    let store = MemoryStore::new();
    for seed in &settings.storage.seed_users {
        let mut user = User::new(seed.id, seed.username.clone());
        user.avatar_url = seed.avatar_url.clone();
        store.insert_user(user);
    }
    for seed in &settings.storage.seed_channels {
        store.insert_channel(Channel::new(seed.id, seed.name.clone()));
    }
    store
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

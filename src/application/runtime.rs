//! Service lifecycle: wiring, startup ordering and cooperative shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::cache::OrderCache;
use super::consumer::OrderConsumer;
use super::publisher::publish_sample;
use super::query::OrderQuery;
use super::recovery::{recover, RecoveryReport};
use crate::adapter::inbound::http;
use crate::adapter::outbound::broker::JetStreamBroker;
use crate::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteOrderStore};
use crate::error::Result;
use crate::infrastructure::config::database::DatabaseConfig;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::config::stream::StreamConfig;
use crate::port::outbound::store::OrderStore;
use crate::port::outbound::stream::{MessagePublisher, MessageStream};

/// Switches that are not part of the persisted configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Publish the demonstration order once the consumer is running.
    pub publish_sample: bool,
}

/// Open the pool, apply migrations and wrap the pool in a store.
///
/// # Errors
/// Returns an error if the database cannot be opened or migrated.
pub fn open_store(config: &DatabaseConfig) -> Result<SqliteOrderStore> {
    let pool = create_pool(config)?;
    run_migrations(&pool)?;
    Ok(SqliteOrderStore::new(pool))
}

/// Broker handles the service consumes from and publishes to.
#[derive(Clone)]
pub struct StreamEndpoint {
    stream: Arc<dyn MessageStream>,
    publisher: Arc<dyn MessagePublisher>,
}

impl StreamEndpoint {
    /// Use one broker for both subscribing and publishing.
    pub fn new<B>(broker: B) -> Self
    where
        B: MessageStream + MessagePublisher + 'static,
    {
        let broker = Arc::new(broker);
        Self {
            stream: Arc::clone(&broker) as Arc<dyn MessageStream>,
            publisher: broker,
        }
    }

    /// Connect to the NATS server named in `config`.
    ///
    /// # Errors
    /// Returns an error if the server cannot be reached.
    pub async fn connect(config: &StreamConfig) -> Result<Self> {
        Ok(Self::new(JetStreamBroker::connect(config).await?))
    }

    #[must_use]
    pub fn publisher(&self) -> &Arc<dyn MessagePublisher> {
        &self.publisher
    }
}

/// A started service.
pub struct Service {
    addr: SocketAddr,
    endpoint: StreamEndpoint,
    store: Arc<dyn OrderStore>,
    cache: Arc<OrderCache>,
    recovery: RecoveryReport,
    consumer: JoinHandle<Result<()>>,
    server: JoinHandle<Result<()>>,
}

impl Service {
    /// Connect to the configured NATS server, then start every component.
    ///
    /// # Errors
    /// Returns an error if the stream is unreachable or any startup step
    /// fails.
    pub async fn start(
        config: &Config,
        options: RunOptions,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let endpoint = StreamEndpoint::connect(&config.stream).await?;
        Self::start_with(config, options, endpoint, shutdown).await
    }

    /// Start every component in order against an already open stream.
    ///
    /// The cache is recovered before the consumer subscribes and before the
    /// listener accepts requests.
    ///
    /// # Errors
    /// Returns an error if any startup step fails.
    pub async fn start_with(
        config: &Config,
        options: RunOptions,
        endpoint: StreamEndpoint,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let app_key = config.app_key();
        info!(app_key = %app_key, database = %config.database.url, "Starting ordercache");

        let database = config.database.clone();
        let store: Arc<dyn OrderStore> =
            Arc::new(tokio::task::spawn_blocking(move || open_store(&database)).await??);
        info!(pool_max_size = config.database.pool_max_size, "Database initialized");

        let cache = Arc::new(OrderCache::new(config.cache.capacity));
        let recovery = {
            let store = Arc::clone(&store);
            let cache = Arc::clone(&cache);
            let app_key = app_key.clone();
            let prune = config.cache.prune_unrecoverable;
            tokio::task::spawn_blocking(move || recover(&*store, &cache, &app_key, prune)).await??
        };

        let subscription = endpoint
            .stream
            .subscribe(
                &config.stream.subject,
                &config.stream.durable_name,
                config.stream.subscribe_options(),
            )
            .await?;
        info!(
            subject = %config.stream.subject,
            durable_name = %config.stream.durable_name,
            "Subscribed to order stream"
        );

        let consumer = OrderConsumer::new(Arc::clone(&store), Arc::clone(&cache), app_key);
        let consumer_shutdown = shutdown.clone();
        let consumer =
            tokio::spawn(async move { consumer.run(subscription, consumer_shutdown).await });

        if options.publish_sample {
            publish_sample(endpoint.publisher.as_ref(), &config.stream.subject).await?;
        }

        let query = Arc::new(OrderQuery::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            config.cache.read_through,
        ));
        let listener = TcpListener::bind(config.http_addr()?).await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(http::serve(listener, http::router(query), shutdown));

        Ok(Self {
            addr,
            endpoint,
            store,
            cache,
            recovery,
            consumer,
            server,
        })
    }

    /// Address the read endpoint is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Publisher on the stream the service consumes.
    #[must_use]
    pub fn publisher(&self) -> &Arc<dyn MessagePublisher> {
        self.endpoint.publisher()
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<OrderCache> {
        &self.cache
    }

    #[must_use]
    pub fn recovery(&self) -> RecoveryReport {
        self.recovery
    }

    /// Wait for the consumer and the server to stop.
    ///
    /// # Errors
    /// Returns the first error either task reported.
    pub async fn join(self) -> Result<()> {
        let consumer = self.consumer.await;
        let server = self.server.await;

        consumer??;
        server??;
        info!("ordercache stopped");
        Ok(())
    }
}

/// Run until `shutdown` flips to true.
///
/// # Errors
/// Returns an error if startup fails or a component stops with an error.
pub async fn run_with_shutdown(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    Service::start(&config, RunOptions::default(), shutdown)
        .await?
        .join()
        .await
}

/// Run until Ctrl+C.
///
/// # Errors
/// Returns an error if startup fails or a component stops with an error.
pub async fn run(config: Config, options: RunOptions) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let service = Service::start(&config, options, shutdown_rx).await?;

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        }
        let _ = shutdown_tx.send(true);
    });

    service.join().await
}

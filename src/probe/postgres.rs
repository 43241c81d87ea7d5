//! PostgreSQL connectivity check.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info, instrument, warn};

use crate::config::DatabaseSettings;

use super::{DependencyProbe, DependencyStatus};

/// Query used for the round trip. The cast keeps the column a plain string.
const PROBE_QUERY: &str = "SELECT NOW()::text";

/// Probe that asks PostgreSQL for its current time.
///
/// The client is created once and kept for the life of the process. A new
/// connection is only opened when there is none yet or the previous one has
/// closed; concurrent checks wait for that single connect instead of opening
/// their own. Checks never retry and never set a timeout of their own.
pub struct PostgresProbe {
    config: tokio_postgres::Config,
    client: Mutex<Option<Arc<Client>>>,
}

impl fmt::Debug for PostgresProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresProbe")
            .field("host", &self.config.get_hosts())
            .field("port", &self.config.get_ports())
            .field("dbname", &self.config.get_dbname())
            .finish_non_exhaustive()
    }
}

impl PostgresProbe {
    /// Create a probe without connecting.
    pub fn new(settings: &DatabaseSettings) -> Self {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&settings.host)
            .port(settings.port)
            .user(&settings.user)
            .password(&settings.password)
            .dbname(&settings.name);

        Self {
            config,
            client: Mutex::new(None),
        }
    }

    /// Create a probe and open its connection.
    ///
    /// A failed connection is only logged; the next check opens a new one.
    pub async fn connect(settings: &DatabaseSettings) -> Self {
        let probe = Self::new(settings);
        match probe.client().await {
            Ok(_) => info!(host = %settings.host, port = settings.port, "Connected to database"),
            Err(e) => warn!(
                host = %settings.host,
                port = settings.port,
                error = %e,
                "Database not reachable at startup"
            ),
        }
        probe
    }

    async fn client(&self) -> Result<Arc<Client>, tokio_postgres::Error> {
        // Held across the connect so only one task opens a connection.
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref().filter(|c| !c.is_closed()) {
            return Ok(client.clone());
        }

        let (client, connection) = self.config.connect(NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "Database connection closed");
            }
        });

        let client = Arc::new(client);
        *slot = Some(client.clone());
        debug!("Opened database connection");
        Ok(client)
    }

    async fn server_time(&self) -> Result<String, tokio_postgres::Error> {
        let client = self.client().await?;
        let row = client.query_one(PROBE_QUERY, &[]).await?;
        row.try_get(0)
    }
}

#[async_trait]
impl DependencyProbe for PostgresProbe {
    #[instrument(skip(self), level = "debug")]
    async fn check(&self) -> DependencyStatus {
        match self.server_time().await {
            Ok(server_time) => DependencyStatus::Reachable { server_time },
            Err(e) => {
                warn!(error = %e, "Database probe failed");
                DependencyStatus::Unreachable
            }
        }
    }
}

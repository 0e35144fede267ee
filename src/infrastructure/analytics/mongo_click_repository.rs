//! MongoDB implementation of the click log.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{AnalyticsError, ClickRepository};

/// Stored shape of a click, one document per redirect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub short_code: String,
    pub timestamp: bson::DateTime,
    pub ip_address: Option<String>,
}

impl From<&ClickEvent> for ClickDocument {
    fn from(event: &ClickEvent) -> Self {
        Self {
            id: None,
            short_code: event.short_code.clone(),
            timestamp: bson::DateTime::from_millis(event.timestamp.timestamp_millis()),
            ip_address: event.client_address.clone(),
        }
    }
}

fn to_analytics_error(e: mongodb::error::Error) -> AnalyticsError {
    AnalyticsError(e.to_string())
}

/// Runs one MongoDB call under `limit`.
async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, AnalyticsError>
where
    F: IntoFuture<Output = mongodb::error::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(to_analytics_error),
        Err(_) => Err(AnalyticsError(format!(
            "mongodb call timed out after {}ms",
            limit.as_millis()
        ))),
    }
}

/// Click log backed by a MongoDB collection.
///
/// The collection carries no indexes beyond `_id`. Every call is bounded by
/// the connect timeout.
pub struct MongoClickRepository {
    database: Database,
    clicks: Collection<ClickDocument>,
    timeout: Duration,
}

impl MongoClickRepository {
    /// Connects to MongoDB and verifies the server with a `ping`.
    ///
    /// `timeout` bounds server selection and each later call, so an
    /// unreachable or stalled server fails fast.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the URI is invalid or the server does not
    /// answer the ping.
    pub async fn connect(
        mongo_url: &str,
        database: &str,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self, AnalyticsError> {
        info!("Connecting to MongoDB");

        let mut options = ClientOptions::parse(mongo_url)
            .await
            .map_err(to_analytics_error)?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options).map_err(to_analytics_error)?;
        let database = client.database(database);

        bounded(timeout, database.run_command(doc! { "ping": 1 })).await?;

        info!("✓ Connected to MongoDB");

        Ok(Self {
            clicks: database.collection::<ClickDocument>(collection),
            database,
            timeout,
        })
    }
}

#[async_trait]
impl ClickRepository for MongoClickRepository {
    async fn record(&self, event: ClickEvent) -> Result<(), AnalyticsError> {
        let document = ClickDocument::from(&event);

        bounded(self.timeout, self.clicks.insert_one(&document)).await?;

        Ok(())
    }

    async fn count_by_code(&self, short_code: &str) -> Result<u64, AnalyticsError> {
        bounded(
            self.timeout,
            self.clicks
                .count_documents(doc! { "short_code": short_code }),
        )
        .await
    }

    async fn count_all(&self) -> Result<u64, AnalyticsError> {
        bounded(self.timeout, self.clicks.estimated_document_count()).await
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn health_check(&self) -> bool {
        bounded(self.timeout, self.database.run_command(doc! { "ping": 1 }))
            .await
            .is_ok()
    }
}

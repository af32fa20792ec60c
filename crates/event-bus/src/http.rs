use std::time::Duration;

use async_trait::async_trait;

use crate::{BusError, BusEvent, EventPublisher, Result};

/// Publishes events by POSTing the JSON envelope to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpEventPublisher {
    client: reqwest::Client,
    url: String,
}

impl HttpEventPublisher {
    /// Creates a publisher for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, url))
    }

    /// Creates a publisher sharing an existing client.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for HttpEventPublisher {
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id, url = %self.url))]
    async fn publish(&self, event: &BusEvent) -> Result<()> {
        let response = self.client.post(&self.url).json(event).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BusError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!(%status, "event accepted by bus");
        Ok(())
    }
}

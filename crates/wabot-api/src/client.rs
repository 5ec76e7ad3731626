//! Backend API seam and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{
    ApiConfig, DefaultMessage, MessageId, QrPayload, Restriction, RestrictionId, RestrictionPatch,
    Result,
    types::{Body, MessageBody, SessionStatus},
};

/// Backend operations, one per endpoint.
///
/// Calls are single-shot: no retry, no backoff, no batching. Failures are
/// returned to the caller.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// `GET connect`: request a QR pairing payload.
    async fn connect(&self) -> Result<QrPayload>;

    /// `GET status`: whether the WhatsApp session is logged in.
    async fn status(&self) -> Result<bool>;

    /// `GET disconnect`: drop the current session.
    async fn disconnect(&self) -> Result<()>;

    /// `GET restriction`: list every restriction row.
    async fn restrictions(&self) -> Result<Vec<Restriction>>;

    /// `PUT restriction/{id}`: partial update of one row.
    async fn update_restriction(
        &self,
        id: RestrictionId,
        patch: &RestrictionPatch,
    ) -> Result<Restriction>;

    /// `GET default_messages/`: list every default message.
    async fn default_messages(&self) -> Result<Vec<DefaultMessage>>;

    /// `POST default_messages/`: create a message.
    async fn create_default_message(&self, text: &str) -> Result<DefaultMessage>;

    /// `PUT default_messages/{id}`: replace a message's text.
    async fn update_default_message(&self, id: MessageId, text: &str) -> Result<DefaultMessage>;

    /// `DELETE default_messages/{id}`: delete a message.
    async fn delete_default_message(&self, id: MessageId) -> Result<()>;
}

/// [`AdminApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl HttpClient {
    /// Build a client for the configured backend.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, config })
    }

    /// Backend settings in use.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.config.endpoint(path)?;
        tracing::debug!(%method, %url, "backend request");
        Ok(self.http.request(method, url))
    }

    /// Send and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "backend rejected request");
            return Err(crate::ApiError::Status { status: status.as_u16(), body });
        }
        Ok(body)
    }

    /// Send and decode the body, with or without its `{ data }` envelope.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?;
        Ok(serde_json::from_str::<Body<T>>(&body)?.into_inner())
    }
}

#[async_trait]
impl AdminApi for HttpClient {
    async fn connect(&self) -> Result<QrPayload> {
        let body = self.send(self.request(Method::GET, "connect")?).await?;
        let trimmed = body.trim();

        // Anything that does not open like JSON is the pairing payload itself
        let payload = if trimmed.is_empty() || trimmed.starts_with(['{', '"']) {
            serde_json::from_str::<Body<String>>(trimmed)?.into_inner()
        } else {
            trimmed.to_string()
        };
        Ok(QrPayload::parse(payload))
    }

    async fn status(&self) -> Result<bool> {
        let status: SessionStatus = self.fetch(self.request(Method::GET, "status")?).await?;
        Ok(status.is_loged)
    }

    async fn disconnect(&self) -> Result<()> {
        self.send(self.request(Method::GET, "disconnect")?).await?;
        Ok(())
    }

    /// Rows that break the one-value rule are logged and left out, so a single
    /// bad row does not hide the rest of the table.
    async fn restrictions(&self) -> Result<Vec<Restriction>> {
        let rows: Vec<serde_json::Value> =
            self.fetch(self.request(Method::GET, "restriction")?).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Restriction>(row) {
                Ok(restriction) => Some(restriction),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed restriction row");
                    None
                },
            })
            .collect())
    }

    async fn update_restriction(
        &self,
        id: RestrictionId,
        patch: &RestrictionPatch,
    ) -> Result<Restriction> {
        let request = self.request(Method::PUT, &format!("restriction/{id}"))?.json(patch);
        self.fetch(request).await
    }

    async fn default_messages(&self) -> Result<Vec<DefaultMessage>> {
        self.fetch(self.request(Method::GET, "default_messages/")?).await
    }

    async fn create_default_message(&self, text: &str) -> Result<DefaultMessage> {
        let request =
            self.request(Method::POST, "default_messages/")?.json(&MessageBody { message: text });
        self.fetch(request).await
    }

    async fn update_default_message(&self, id: MessageId, text: &str) -> Result<DefaultMessage> {
        let request = self
            .request(Method::PUT, &format!("default_messages/{id}"))?
            .json(&MessageBody { message: text });
        self.fetch(request).await
    }

    async fn delete_default_message(&self, id: MessageId) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("default_messages/{id}"))?).await?;
        Ok(())
    }
}

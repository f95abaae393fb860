//! Remote API client.
//!
//! `Api` performs one authenticated HTTP request per operation and never
//! retries; retrying is the offline provider's job. Transport failures become
//! `TripError::Network`, non-2xx responses `TripError::Server`.

pub mod protocol;
pub mod wire;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use url::Url;

use crate::api::protocol::{
    ApiRequest, CreatePoint, DeletePoint, GetDestinations, GetOffers, GetPoints, SyncPoints,
    UpdatePoint,
};
use crate::api::wire::{RawPoint, SyncOutcome};
use crate::error::{TripError, TripResult};
use crate::event::{Destination, Event, OfferGroup};

const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// The CRUD contract the offline provider builds on.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn get_events(&self) -> TripResult<Vec<Event>>;
    async fn get_destinations(&self) -> TripResult<Vec<Destination>>;
    async fn get_offers(&self) -> TripResult<Vec<OfferGroup>>;
    async fn create_event(&self, event: &Event) -> TripResult<Event>;
    async fn update_event(&self, event: &Event) -> TripResult<Event>;
    async fn delete_event(&self, id: &str) -> TripResult<()>;
    /// Send the full local event set; the server answers with what it accepted.
    async fn sync(&self, events: &[Event]) -> TripResult<SyncOutcome>;
}

/// HTTP client for the trip server
pub struct Api {
    http: reqwest::Client,
    end_point: Url,
    authorization: String,
}

impl Api {
    pub fn new(end_point: &str, authorization: &str) -> TripResult<Self> {
        // Url::join drops the last segment unless the base ends with a slash
        let normalized = if end_point.ends_with('/') {
            end_point.to_string()
        } else {
            format!("{end_point}/")
        };

        let end_point = Url::parse(&normalized)
            .map_err(|e| TripError::Config(format!("Invalid end point '{end_point}': {e}")))?;

        Ok(Api {
            http: reqwest::Client::new(),
            end_point,
            authorization: authorization.to_string(),
        })
    }

    pub fn end_point(&self) -> &Url {
        &self.end_point
    }

    /// Run a typed request and decode the server's answer.
    pub async fn call<R: ApiRequest>(&self, request: R) -> TripResult<R::Response> {
        self.send(&request, None).await
    }

    /// Cheap reachability check used by the connectivity probe.
    pub async fn ping(&self) -> TripResult<()> {
        self.send(&GetDestinations, Some(PING_TIMEOUT)).await.map(|_| ())
    }

    async fn send<R: ApiRequest>(
        &self,
        request: &R,
        timeout: Option<Duration>,
    ) -> TripResult<R::Response> {
        let url = self
            .end_point
            .join(&request.path())
            .map_err(|e| TripError::Config(format!("Invalid request path: {e}")))?;

        tracing::debug!(method = %request.method(), %url, "api request");

        let mut builder = self
            .http
            .request(request.method(), url)
            .header(AUTHORIZATION, &self.authorization);

        if let Some(body) = request.body()? {
            builder = builder.json(&body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| TripError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TripError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            };
            return Err(TripError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(body)
            .map_err(|e| TripError::Serialization(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl RemoteApi for Api {
    async fn get_events(&self) -> TripResult<Vec<Event>> {
        let points = self.call(GetPoints).await?;
        Ok(points.into_iter().map(Event::from).collect())
    }

    async fn get_destinations(&self) -> TripResult<Vec<Destination>> {
        self.call(GetDestinations).await
    }

    async fn get_offers(&self) -> TripResult<Vec<OfferGroup>> {
        let groups = self.call(GetOffers).await?;
        Ok(groups.into_iter().map(OfferGroup::from).collect())
    }

    async fn create_event(&self, event: &Event) -> TripResult<Event> {
        let created = self
            .call(CreatePoint {
                point: RawPoint::from(event),
            })
            .await?;
        Ok(created.into())
    }

    async fn update_event(&self, event: &Event) -> TripResult<Event> {
        let updated = self
            .call(UpdatePoint {
                point: RawPoint::from(event),
            })
            .await?;
        Ok(updated.into())
    }

    async fn delete_event(&self, id: &str) -> TripResult<()> {
        self.call(DeletePoint { id: id.to_string() }).await
    }

    async fn sync(&self, events: &[Event]) -> TripResult<SyncOutcome> {
        let response = self
            .call(SyncPoints {
                points: events.iter().map(RawPoint::from).collect(),
            })
            .await?;
        Ok(response.into())
    }
}

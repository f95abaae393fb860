//! Server wire format and conversions to and from crate types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{Destination, Event, EventType, Offer, OfferGroup};

/// An event as the server sends and expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub base_price: u32,
    #[serde(default)]
    pub is_favorite: bool,
    pub destination: Destination,
    #[serde(default)]
    pub offers: Vec<Offer>,
}

impl From<&Event> for RawPoint {
    fn from(event: &Event) -> Self {
        RawPoint {
            id: event.id.clone(),
            event_type: event.event_type,
            date_from: event.start,
            date_to: event.end,
            base_price: event.price,
            is_favorite: event.is_favorite,
            destination: event.destination.clone(),
            offers: event.offers.clone(),
        }
    }
}

impl From<RawPoint> for Event {
    fn from(raw: RawPoint) -> Self {
        Event {
            id: raw.id,
            event_type: raw.event_type,
            destination: raw.destination,
            start: raw.date_from,
            end: raw.date_to,
            price: raw.base_price,
            offers: raw.offers,
            is_favorite: raw.is_favorite,
            // Anything that came from the server matches the server
            is_synchronized: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOfferGroup {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub offers: Vec<Offer>,
}

impl From<RawOfferGroup> for OfferGroup {
    fn from(raw: RawOfferGroup) -> Self {
        OfferGroup {
            event_type: raw.event_type,
            offers: raw.offers,
        }
    }
}

/// Response of `POST points/sync`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSyncResponse {
    #[serde(default)]
    pub created: Vec<RawPoint>,
    #[serde(default)]
    pub updated: Vec<RawSyncItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSyncItem {
    pub success: bool,
    #[serde(default)]
    pub payload: Option<RawSyncPayload>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSyncPayload {
    pub point: RawPoint,
}

/// What the server accepted during a bulk sync.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOutcome {
    /// Created and successfully updated events, as the server now has them
    pub events: Vec<Event>,
    /// Updates the server refused
    pub rejected: usize,
}

impl From<RawSyncResponse> for SyncOutcome {
    fn from(raw: RawSyncResponse) -> Self {
        let mut outcome = SyncOutcome {
            events: raw.created.into_iter().map(Event::from).collect(),
            rejected: 0,
        };

        for item in raw.updated {
            match (item.success, item.payload) {
                (true, Some(payload)) => outcome.events.push(payload.point.into()),
                _ => {
                    tracing::warn!(error = ?item.error, "server rejected a synced event");
                    outcome.rejected += 1;
                }
            }
        }

        outcome
    }
}

//! Trip event types.
//!
//! These are the types the rest of the crate works with. The API layer
//! converts the server's wire format into them (see `api::wire`), and the
//! local store persists them as-is, including the `is_synchronized` flag.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Kind of trip event. Transfers move you somewhere, activities happen somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    Taxi,
    Bus,
    Train,
    Ship,
    Transport,
    Drive,
    Flight,
    CheckIn,
    Sightseeing,
    Restaurant,
}

impl EventType {
    pub const TRANSFERS: [EventType; 7] = [
        EventType::Taxi,
        EventType::Bus,
        EventType::Train,
        EventType::Ship,
        EventType::Transport,
        EventType::Drive,
        EventType::Flight,
    ];

    pub const ACTIVITIES: [EventType; 3] = [
        EventType::CheckIn,
        EventType::Sightseeing,
        EventType::Restaurant,
    ];

    pub fn all() -> impl Iterator<Item = EventType> {
        Self::TRANSFERS.into_iter().chain(Self::ACTIVITIES)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Taxi => "taxi",
            EventType::Bus => "bus",
            EventType::Train => "train",
            EventType::Ship => "ship",
            EventType::Transport => "transport",
            EventType::Drive => "drive",
            EventType::Flight => "flight",
            EventType::CheckIn => "check-in",
            EventType::Sightseeing => "sightseeing",
            EventType::Restaurant => "restaurant",
        }
    }

    pub fn is_transfer(&self) -> bool {
        Self::TRANSFERS.contains(self)
    }

    /// Leading words of an event title, e.g. "Taxi to" or "Check-in in".
    pub fn placeholder(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        let preposition = if self.is_transfer() { "to" } else { "in" };
        format!("{capitalized} {preposition}")
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        EventType::all()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| {
                let known: Vec<_> = EventType::all().map(|t| t.as_str()).collect();
                format!("Unknown event type '{}'. Expected one of: {}", s, known.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    pub src: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub description: String,
    /// Display order matters
    #[serde(default)]
    pub pictures: Vec<Picture>,
}

impl Destination {
    pub fn named(name: &str) -> Self {
        Destination {
            name: name.to_string(),
            description: String::new(),
            pictures: Vec::new(),
        }
    }
}

/// A paid add-on for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub title: String,
    pub price: u32,
}

/// The offers available for one event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferGroup {
    pub event_type: EventType,
    pub offers: Vec<Offer>,
}

/// Event type → available offers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffersCatalog(BTreeMap<EventType, Vec<Offer>>);

impl OffersCatalog {
    pub fn offers_for(&self, event_type: EventType) -> &[Offer] {
        self.0.get(&event_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up an offer by title (case-insensitive) within an event type.
    pub fn find(&self, event_type: EventType, title: &str) -> Option<&Offer> {
        self.offers_for(event_type)
            .iter()
            .find(|o| o.title.eq_ignore_ascii_case(title.trim()))
    }
}

impl From<Vec<OfferGroup>> for OffersCatalog {
    fn from(groups: Vec<OfferGroup>) -> Self {
        OffersCatalog(
            groups
                .into_iter()
                .map(|g| (g.event_type, g.offers))
                .collect(),
        )
    }
}

fn default_synchronized() -> bool {
    true
}

/// A single trip itinerary item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Server-assigned id, or a local UUID for events created offline
    pub id: String,
    pub event_type: EventType,
    pub destination: Destination,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Base price, without offers
    pub price: u32,
    /// Selected offers
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub is_favorite: bool,
    /// False while a queued offline change to this event awaits the server
    #[serde(default = "default_synchronized")]
    pub is_synchronized: bool,
}

impl Event {
    /// A new event without an id. The server (or the offline provider) assigns one.
    pub fn draft(
        event_type: EventType,
        destination: Destination,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        price: u32,
    ) -> Self {
        Event {
            id: String::new(),
            event_type,
            destination,
            start,
            end,
            price,
            offers: Vec::new(),
            is_favorite: false,
            is_synchronized: true,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn total_price(&self) -> u64 {
        u64::from(self.price) + self.offers.iter().map(|o| u64::from(o.price)).sum::<u64>()
    }

    pub fn title(&self) -> String {
        format!("{} {}", self.event_type.placeholder(), self.destination.name)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title())
    }
}

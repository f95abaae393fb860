//! In-memory events model with change notifications.
//!
//! Views subscribe with `EventsModel::subscribe` and re-render on each
//! `ModelChange`. The model itself never talks to the network; callers feed it
//! what the provider returns.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::event::Event;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChange {
    /// The whole list was replaced
    Reset,
    Added(String),
    Updated(String),
    Removed(String),
    FilterChanged(FilterType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    Everything,
    Future,
    Past,
}

impl FilterType {
    pub fn matches(&self, event: &Event, now: DateTime<Utc>) -> bool {
        match self {
            FilterType::Everything => true,
            FilterType::Future => event.start > now,
            FilterType::Past => event.end < now,
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterType::Everything => f.write_str("everything"),
            FilterType::Future => f.write_str("future"),
            FilterType::Past => f.write_str("past"),
        }
    }
}

impl FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "everything" => Ok(FilterType::Everything),
            "future" => Ok(FilterType::Future),
            "past" => Ok(FilterType::Past),
            other => Err(format!("Unknown filter '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortType {
    /// Chronological, by start
    #[default]
    Event,
    /// Longest first
    Time,
    /// Most expensive first
    Price,
}

impl SortType {
    pub fn sort(&self, events: &mut [Event]) {
        match self {
            SortType::Event => events.sort_by(|a, b| a.start.cmp(&b.start)),
            SortType::Time => events.sort_by(|a, b| b.duration().cmp(&a.duration())),
            SortType::Price => events.sort_by(|a, b| b.price.cmp(&a.price)),
        }
    }
}

impl FromStr for SortType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "event" => Ok(SortType::Event),
            "time" => Ok(SortType::Time),
            "price" => Ok(SortType::Price),
            other => Err(format!("Unknown sort order '{other}'")),
        }
    }
}

pub struct EventsModel {
    events: Vec<Event>,
    filter: FilterType,
    tx: broadcast::Sender<ModelChange>,
}

impl Default for EventsModel {
    fn default() -> Self {
        Self::new()
    }
}

impl EventsModel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        EventsModel {
            events: Vec::new(),
            filter: FilterType::default(),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ModelChange> {
        self.tx.subscribe()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn set_events(&mut self, events: Vec<Event>) {
        self.events = events;
        self.notify(ModelChange::Reset);
    }

    pub fn add_event(&mut self, event: Event) {
        let id = event.id.clone();
        self.events.push(event);
        self.notify(ModelChange::Added(id));
    }

    /// Replace the event with `id`. Returns false if there is none.
    pub fn update_event(&mut self, id: &str, event: Event) -> bool {
        let Some(slot) = self.events.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        *slot = event;
        self.notify(ModelChange::Updated(id.to_string()));
        true
    }

    pub fn remove_event(&mut self, id: &str) -> bool {
        let Some(index) = self.events.iter().position(|e| e.id == id) else {
            return false;
        };
        self.events.remove(index);
        self.notify(ModelChange::Removed(id.to_string()));
        true
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    pub fn set_filter(&mut self, filter: FilterType) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.notify(ModelChange::FilterChanged(filter));
    }

    /// Events passing the current filter, in stored order.
    pub fn filtered_events(&self, now: DateTime<Utc>) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| self.filter.matches(e, now))
            .cloned()
            .collect()
    }

    fn notify(&self, change: ModelChange) {
        // No subscribers is fine
        let _ = self.tx.send(change);
    }
}

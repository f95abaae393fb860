//! Test fixtures shared across modules.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tokio::sync::Notify;

use crate::api::RemoteApi;
use crate::api::wire::SyncOutcome;
use crate::error::{TripError, TripResult};
use crate::event::{Destination, Event, EventType, Offer, OfferGroup, Picture};

pub fn make_test_event(id: &str, price: u32) -> Event {
    let start = Utc.with_ymd_and_hms(2025, 3, 18, 10, 0, 0).unwrap();
    Event {
        id: id.to_string(),
        event_type: EventType::Taxi,
        destination: Destination {
            name: "Amsterdam".to_string(),
            description: "Canals and bikes.".to_string(),
            pictures: vec![Picture {
                src: "http://picsum.photos/248/152?r=1".to_string(),
                description: "Amsterdam canal".to_string(),
            }],
        },
        start,
        end: start + Duration::hours(1),
        price,
        offers: vec![],
        is_favorite: false,
        is_synchronized: true,
    }
}

/// In-memory stand-in for the trip server.
#[derive(Default)]
pub struct FakeRemote {
    pub events: Mutex<BTreeMap<String, Event>>,
    /// Error returned by every call while set
    pub failure: Mutex<Option<fn() -> TripError>>,
    /// Ids the bulk sync refuses to update
    pub reject_updates: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
    pub synced_with: Mutex<Vec<Vec<Event>>>,
    next_id: AtomicUsize,
    /// Hold the next `get_events` or `sync` response, after the server
    /// has applied it, until `release` is called
    hold_next: AtomicBool,
    held: Notify,
    released: Notify,
}

impl FakeRemote {
    pub fn with_events(events: Vec<Event>) -> Self {
        let remote = FakeRemote::default();
        *remote.events.lock().unwrap() = events.into_iter().map(|e| (e.id.clone(), e)).collect();
        remote
    }

    pub fn fail_with(&self, failure: fn() -> TripError) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn event(&self, id: &str) -> Option<Event> {
        self.events.lock().unwrap().get(id).cloned()
    }

    pub fn hold_next_response(&self) {
        self.hold_next.store(true, Ordering::SeqCst);
    }

    /// Resolves once a held request is waiting for `release`.
    pub async fn wait_until_held(&self) {
        self.held.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }

    async fn hold_if_requested(&self) {
        if self.hold_next.swap(false, Ordering::SeqCst) {
            self.held.notify_one();
            self.released.notified().await;
        }
    }

    fn enter(&self) -> TripResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match *self.failure.lock().unwrap() {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }

    fn assign_id(&self) -> String {
        format!("srv-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn get_events(&self) -> TripResult<Vec<Event>> {
        self.enter()?;
        let events: Vec<Event> = self.events.lock().unwrap().values().cloned().collect();
        self.hold_if_requested().await;
        Ok(events)
    }

    async fn get_destinations(&self) -> TripResult<Vec<Destination>> {
        self.enter()?;
        Ok(vec![Destination::named("Amsterdam"), Destination::named("Geneva")])
    }

    async fn get_offers(&self) -> TripResult<Vec<OfferGroup>> {
        self.enter()?;
        Ok(vec![OfferGroup {
            event_type: EventType::Taxi,
            offers: vec![Offer {
                title: "Upgrade".into(),
                price: 50,
            }],
        }])
    }

    async fn create_event(&self, event: &Event) -> TripResult<Event> {
        self.enter()?;
        let mut created = event.clone();
        created.id = self.assign_id();
        created.is_synchronized = true;
        self.events
            .lock()
            .unwrap()
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_event(&self, event: &Event) -> TripResult<Event> {
        self.enter()?;
        let mut events = self.events.lock().unwrap();
        if !events.contains_key(&event.id) {
            return Err(TripError::Server {
                status: 404,
                message: "Not found".into(),
            });
        }
        let mut updated = event.clone();
        updated.is_synchronized = true;
        events.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete_event(&self, id: &str) -> TripResult<()> {
        self.enter()?;
        match self.events.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(TripError::Server {
                status: 404,
                message: "Not found".into(),
            }),
        }
    }

    async fn sync(&self, events: &[Event]) -> TripResult<SyncOutcome> {
        self.enter()?;
        self.synced_with.lock().unwrap().push(events.to_vec());

        let outcome = {
            let rejected_ids = self.reject_updates.lock().unwrap().clone();
            let mut stored = self.events.lock().unwrap();
            let mut outcome = SyncOutcome::default();

            for event in events {
                let mut accepted = event.clone();
                accepted.is_synchronized = true;

                if stored.contains_key(&event.id) {
                    if rejected_ids.contains(&event.id) {
                        outcome.rejected += 1;
                        continue;
                    }
                } else {
                    accepted.id = self.assign_id();
                }

                stored.insert(accepted.id.clone(), accepted.clone());
                outcome.events.push(accepted);
            }
            outcome
        };

        self.hold_if_requested().await;
        Ok(outcome)
    }
}

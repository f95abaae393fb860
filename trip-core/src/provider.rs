//! Offline-aware façade over the remote API.
//!
//! `Provider` offers the same operations as `RemoteApi`. Online, calls go to
//! the server and the result is written through to the local store. Offline,
//! changes are applied to the cached copy, marked unsynchronized and queued;
//! `sync` later reconciles them with the server.
//!
//! Connectivity is read from the watch receiver on every call. Anything can
//! happen while a request is in flight (the network may drop, the user may
//! edit offline), so state is re-read after each await and store updates never
//! span one.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use uuid::Uuid;

use crate::api::RemoteApi;
use crate::connectivity::{NetworkStatus, Transition};
use crate::error::{TripError, TripResult};
use crate::event::{Destination, Event, OfferGroup};
use crate::queue::{OperationKind, OperationQueue, PendingOperation};
use crate::store::{Storage, Store};

/// Prefix of ids given to events created offline.
pub const LOCAL_ID_PREFIX: &str = "local-";

pub struct Provider<R> {
    api: R,
    events: Store<Event>,
    destinations: Store<Destination>,
    offers: Store<OfferGroup>,
    queue: OperationQueue,
    network: watch::Receiver<NetworkStatus>,
    synchronize_needed: AtomicBool,
    /// Bumped on every local change to events or the queue
    generation: AtomicU64,
    /// Ids changed locally, per bulk sync in flight
    in_flight_syncs: Mutex<HashMap<u64, HashSet<String>>>,
    next_sync: AtomicU64,
}

impl<R: RemoteApi> Provider<R> {
    pub fn new(
        api: R,
        storage: Arc<dyn Storage>,
        store_name: &str,
        network: watch::Receiver<NetworkStatus>,
    ) -> Self {
        let events: Store<Event> = Store::new(format!("{store_name}-events"), storage.clone());
        let queue = OperationQueue::new(format!("{store_name}-queue"), storage.clone());

        // Offline work from an earlier session is still pending
        let pending =
            !queue.is_empty() || events.get_items().values().any(|e| !e.is_synchronized);

        Provider {
            api,
            events,
            destinations: Store::new(format!("{store_name}-destinations"), storage.clone()),
            offers: Store::new(format!("{store_name}-offers"), storage),
            queue,
            network,
            synchronize_needed: AtomicBool::new(pending),
            generation: AtomicU64::new(0),
            in_flight_syncs: Mutex::new(HashMap::new()),
            next_sync: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &R {
        &self.api
    }

    pub fn is_online(&self) -> bool {
        self.network.borrow().is_online()
    }

    /// False while offline changes wait to be sent to the server.
    pub fn is_synchronized(&self) -> bool {
        !self.synchronize_needed.load(Ordering::SeqCst)
    }

    /// True if any local store had to fall back because storage was unusable.
    pub fn is_degraded(&self) -> bool {
        self.events.is_degraded()
            || self.destinations.is_degraded()
            || self.offers.is_degraded()
            || self.queue.is_degraded()
    }

    pub fn pending_operations(&self) -> Vec<PendingOperation> {
        self.queue.pending()
    }

    /// Locally cached events, by start time.
    pub fn cached_events(&self) -> Vec<Event> {
        let mut events: Vec<_> = self.events.get_items().into_values().collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        events
    }

    // READS:

    pub async fn get_events(&self) -> TripResult<Vec<Event>> {
        if !self.is_online() {
            return Ok(self.cached_events());
        }

        // An unreadable queue can't be synced; serve the server's copy instead
        let queue_readable = self.queue.is_readable();

        // A plain fetch would overwrite pending offline work
        if !self.is_synchronized() && queue_readable {
            return Ok(self.sync().await);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let events = self.api.get_events().await?;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("local change during fetch, keeping local events");
            return Ok(self.cached_events());
        }

        if self.is_synchronized() && self.queue.is_readable() {
            self.events
                .set_items(events.iter().map(|e| (e.id.clone(), e.clone())).collect());
        } else {
            tracing::debug!("pending changes unreadable, fetched events not cached");
        }
        Ok(events)
    }

    pub async fn get_destinations(&self) -> TripResult<Vec<Destination>> {
        if !self.is_online() {
            return Ok(self.destinations.get_items().into_values().collect());
        }

        let destinations = self.api.get_destinations().await?;
        self.destinations.set_items(
            destinations
                .iter()
                .map(|d| (d.name.clone(), d.clone()))
                .collect(),
        );
        Ok(destinations)
    }

    pub async fn get_offers(&self) -> TripResult<Vec<OfferGroup>> {
        if !self.is_online() {
            return Ok(self.offers.get_items().into_values().collect());
        }

        let offers = self.api.get_offers().await?;
        self.offers.set_items(
            offers
                .iter()
                .map(|g| (g.event_type.to_string(), g.clone()))
                .collect(),
        );
        Ok(offers)
    }

    // MUTATIONS:

    pub async fn create_event(&self, event: Event) -> TripResult<Event> {
        if !self.is_online() {
            let mut event = event;
            if event.id.is_empty() {
                event.id = format!("{LOCAL_ID_PREFIX}{}", Uuid::new_v4());
            }
            return Ok(self.apply_offline(OperationKind::Create, event));
        }

        let created = self.api.create_event(&event).await?;
        self.events.set_item(&created.id, created.clone());
        self.note_change(&created.id);
        Ok(created)
    }

    pub async fn update_event(&self, event: Event) -> TripResult<Event> {
        let pending = self.queue.get(&event.id);

        // The server has never seen an event created offline
        let local_only = pending
            .as_ref()
            .is_some_and(|op| op.kind == OperationKind::Create);

        if !self.is_online() || local_only {
            if self.events.get_item(&event.id).is_none() {
                return Err(TripError::EventNotFound(event.id));
            }
            return Ok(self.apply_offline(OperationKind::Update, event));
        }

        let updated = self.api.update_event(&event).await?;
        self.events.set_item(&updated.id, updated.clone());
        self.note_change(&updated.id);
        self.acknowledge_if_unchanged(&updated.id, pending.as_ref());
        Ok(updated)
    }

    pub async fn delete_event(&self, id: &str) -> TripResult<()> {
        let pending = self.queue.get(id);
        let local_only = pending
            .as_ref()
            .is_some_and(|op| op.kind == OperationKind::Create);

        if !self.is_online() || local_only {
            let event = self
                .events
                .get_item(id)
                .ok_or_else(|| TripError::EventNotFound(id.to_string()))?;
            self.events.remove_item(id);
            self.enqueue(OperationKind::Delete, &event);
            return Ok(());
        }

        self.api.delete_event(id).await?;
        self.events.remove_item(id);
        self.note_change(id);
        self.acknowledge_if_unchanged(id, pending.as_ref());
        Ok(())
    }

    // SYNC:

    /// Reconcile offline changes with the server. Failures are logged and
    /// leave everything queued; the cached events are returned either way.
    pub async fn sync(&self) -> Vec<Event> {
        match self.try_sync().await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, "sync failed, offline changes stay queued");
                self.cached_events()
            }
        }
    }

    /// Like `sync`, but reports failures.
    pub async fn try_sync(&self) -> TripResult<Vec<Event>> {
        if self.is_synchronized() {
            return Ok(self.cached_events());
        }
        if !self.is_online() {
            return Err(TripError::Offline);
        }
        if !self.queue.is_readable() {
            return Err(TripError::StorageUnavailable(
                "pending changes can't be read, nothing sent".into(),
            ));
        }

        // The bulk endpoint only creates and updates, so deletions go first
        for op in self.queue.pending() {
            if op.kind != OperationKind::Delete {
                continue;
            }
            match self.api.delete_event(&op.event_id).await {
                Ok(()) => {}
                Err(e) if e.is_status(404) => {
                    tracing::debug!(event_id = %op.event_id, "already gone on the server");
                }
                Err(e) => return Err(e),
            }
            self.acknowledge_if_unchanged(&op.event_id, Some(&op));
        }

        let sent_ops: HashMap<String, PendingOperation> = self
            .queue
            .pending()
            .into_iter()
            .map(|op| (op.event_id.clone(), op))
            .collect();

        let ticket = self.next_sync.fetch_add(1, Ordering::SeqCst);
        self.in_flight_syncs().insert(ticket, HashSet::new());
        let outcome = self.api.sync(&self.cached_events()).await;
        let touched = self.in_flight_syncs().remove(&ticket).unwrap_or_default();
        let outcome = outcome?;

        // Everything below is synchronous: no other operation can interleave
        let accepted_ids: HashSet<String> = outcome.events.iter().map(|e| e.id.clone()).collect();

        let mut next: BTreeMap<String, Event> = outcome
            .events
            .into_iter()
            .map(|mut e| {
                e.is_synchronized = true;
                (e.id.clone(), e)
            })
            .collect();

        let local_events = self.events.get_items();
        for (id, local) in &local_events {
            // The local copy is newer than anything the server echoed
            if touched.contains(id) {
                next.insert(id.clone(), local.clone());
                continue;
            }
            if accepted_ids.contains(id) {
                continue;
            }
            match sent_ops.get(id) {
                // Came back from the server under its own id
                Some(op) if op.kind == OperationKind::Create => {}
                // Unchanged events the server didn't echo, and rejected updates
                _ => {
                    next.insert(id.clone(), local.clone());
                }
            }
        }

        // Deleted while the request was in flight
        for id in &touched {
            if !local_events.contains_key(id) {
                next.remove(id);
            }
        }

        let rejected = outcome.rejected;
        let rejected_update = |id: &str| {
            let was_update = sent_ops
                .get(id)
                .is_some_and(|op| op.kind == OperationKind::Update);
            was_update && !accepted_ids.contains(id)
        };
        self.queue.retain(|id| touched.contains(id) || rejected_update(id));
        self.events.set_items(next);
        self.refresh_synchronize_flag();

        tracing::info!(
            accepted = accepted_ids.len(),
            rejected,
            still_pending = self.queue.len(),
            "sync finished"
        );

        Ok(self.cached_events())
    }

    /// Run `sync` each time connectivity goes from offline to online while
    /// changes are pending, handing the synced events to `on_synced`.
    /// Returns when the connectivity sender is dropped.
    pub async fn sync_on_reconnect(
        &self,
        mut network: watch::Receiver<NetworkStatus>,
        mut on_synced: impl FnMut(Vec<Event>),
    ) {
        let mut previous = *network.borrow_and_update();

        while network.changed().await.is_ok() {
            let current = *network.borrow_and_update();
            let transition = Transition::between(previous, current);
            previous = current;

            if transition != Some(Transition::WentOnline) || self.is_synchronized() {
                continue;
            }

            match self.try_sync().await {
                Ok(events) => on_synced(events),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "sync after reconnect failed, retrying on next reconnect"
                    );
                }
            }
        }
    }

    fn apply_offline(&self, kind: OperationKind, mut event: Event) -> Event {
        event.is_synchronized = false;
        self.events.set_item(&event.id, event.clone());
        self.enqueue(kind, &event);
        event
    }

    fn enqueue(&self, kind: OperationKind, event: &Event) {
        self.queue.enqueue(kind, event);
        self.note_change(&event.id);
        self.refresh_synchronize_flag();
    }

    // Lets fetches and syncs that are awaiting the server notice local work.
    fn note_change(&self, id: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        for ids in self.in_flight_syncs().values_mut() {
            ids.insert(id.to_string());
        }
    }

    fn in_flight_syncs(&self) -> MutexGuard<'_, HashMap<u64, HashSet<String>>> {
        self.in_flight_syncs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Drop a queue entry the server has now caught up with, unless it was
    // replaced while the request was in flight.
    fn acknowledge_if_unchanged(&self, id: &str, before: Option<&PendingOperation>) {
        let Some(before) = before else {
            return;
        };
        if self.queue.get(id).as_ref() == Some(before) {
            self.queue.acknowledge(id);
            self.refresh_synchronize_flag();
        }
    }

    fn refresh_synchronize_flag(&self) {
        // Without a readable queue we can't prove nothing is pending
        let needed = !self.queue.is_empty() || self.queue.is_degraded();
        self.synchronize_needed.store(needed, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::Connectivity;
    use crate::store::MemoryStorage;
    use crate::testing::{FakeRemote, make_test_event};

    const STORE: &str = "trip-test";

    struct Harness {
        connectivity: Connectivity,
        storage: Arc<MemoryStorage>,
        provider: Provider<FakeRemote>,
    }

    impl Harness {
        fn new(remote: FakeRemote, status: NetworkStatus) -> Self {
            let connectivity = Connectivity::new(status);
            let storage = Arc::new(MemoryStorage::new());
            let provider = Provider::new(
                remote,
                storage.clone() as Arc<dyn Storage>,
                STORE,
                connectivity.subscribe(),
            );
            Harness {
                connectivity,
                storage,
                provider,
            }
        }

        fn remote(&self) -> &FakeRemote {
            self.provider.api()
        }

        fn go_offline(&self) {
            self.connectivity.set_status(NetworkStatus::Offline);
        }

        fn go_online(&self) {
            self.connectivity.set_status(NetworkStatus::Online);
        }

        fn cached(&self, id: &str) -> Option<Event> {
            self.provider.cached_events().into_iter().find(|e| e.id == id)
        }

        /// Remote and local hold the same events, ignoring the sync flag.
        fn assert_converged(&self) {
            let local: BTreeMap<_, _> = self
                .provider
                .cached_events()
                .into_iter()
                .map(|e| (e.id.clone(), e))
                .collect();
            let remote = self.remote().events.lock().unwrap().clone();
            assert_eq!(local, remote);
            assert!(local.values().all(|e| e.is_synchronized));
        }
    }

    fn seeded_remote() -> FakeRemote {
        FakeRemote::with_events(vec![
            make_test_event("5", 100),
            make_test_event("6", 60),
            make_test_event("7", 70),
        ])
    }

    #[tokio::test]
    async fn test_online_get_events_writes_through() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);

        let events = h.provider.get_events().await.unwrap();
        assert_eq!(events.len(), 3);

        h.go_offline();
        let calls = h.remote().calls();
        let cached = h.provider.get_events().await.unwrap();
        assert_eq!(cached.len(), 3);
        assert_eq!(h.remote().calls(), calls);
    }

    #[tokio::test]
    async fn test_offline_create_then_get_events_uses_store_only() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Offline);

        let created = h
            .provider
            .create_event(make_test_event("", 42))
            .await
            .unwrap();
        let events = h.provider.get_events().await.unwrap();

        assert!(created.id.starts_with(LOCAL_ID_PREFIX));
        assert!(!created.is_synchronized);
        assert_eq!(events, vec![created]);
        assert_eq!(h.remote().calls(), 0);
        assert!(!h.provider.is_synchronized());
    }

    #[tokio::test]
    async fn test_offline_update_then_reconnect_syncs_automatically() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();

        h.go_offline();
        let mut event = h.cached("5").unwrap();
        event.price = 200;
        h.provider.update_event(event).await.unwrap();

        let stored = h.cached("5").unwrap();
        assert_eq!(stored.price, 200);
        assert!(!stored.is_synchronized);
        assert!(!h.provider.is_synchronized());

        let mut synced = Vec::new();
        let network = h.connectivity.subscribe();
        let Harness {
            connectivity,
            provider,
            ..
        } = h;

        // Dropping the sender ends the reconnect loop once the change is seen
        tokio::join!(
            provider.sync_on_reconnect(network, |events| synced = events),
            async move {
                tokio::task::yield_now().await;
                connectivity.set_status(NetworkStatus::Online);
                drop(connectivity);
            },
        );

        let five = synced.iter().find(|e| e.id == "5").unwrap();
        assert_eq!(five.price, 200);
        assert!(five.is_synchronized);
        assert!(provider.is_synchronized());
        assert_eq!(provider.api().event("5").map(|e| e.price), Some(200));
    }

    #[tokio::test]
    async fn test_sync_when_synchronized_is_noop() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        let calls = h.remote().calls();

        let events = h.provider.sync().await;

        assert_eq!(events.len(), 3);
        assert_eq!(h.remote().calls(), calls);
    }

    #[tokio::test]
    async fn test_online_delete_server_error_leaves_store_unchanged() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.remote().fail_with(|| TripError::Server {
            status: 500,
            message: "boom".into(),
        });

        let err = h.provider.delete_event("7").await.unwrap_err();

        assert!(err.is_status(500));
        assert!(h.cached("7").is_some());
        assert_eq!(h.provider.cached_events().len(), 3);
    }

    #[tokio::test]
    async fn test_online_errors_propagate_for_reads() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.remote()
            .fail_with(|| TripError::Network("connection refused".into()));

        assert!(matches!(
            h.provider.get_events().await,
            Err(TripError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_mutations_then_sync_converge() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.go_offline();

        // update, delete, create, create-then-update, create-then-delete
        let mut five = h.cached("5").unwrap();
        five.price = 200;
        h.provider.update_event(five).await.unwrap();
        h.provider.delete_event("6").await.unwrap();
        h.provider
            .create_event(make_test_event("", 11))
            .await
            .unwrap();
        let mut edited = h
            .provider
            .create_event(make_test_event("", 12))
            .await
            .unwrap();
        edited.is_favorite = true;
        h.provider.update_event(edited).await.unwrap();
        let dropped = h
            .provider
            .create_event(make_test_event("", 13))
            .await
            .unwrap();
        h.provider.delete_event(&dropped.id).await.unwrap();

        assert_eq!(h.provider.pending_operations().len(), 4);
        assert_eq!(h.remote().calls(), 1);

        h.go_online();
        let events = h.provider.try_sync().await.unwrap();

        assert_eq!(events.len(), 4);
        assert!(h.provider.is_synchronized());
        assert!(h.provider.pending_operations().is_empty());
        assert!(h.remote().event("6").is_none());
        assert_eq!(h.remote().event("5").map(|e| e.price), Some(200));
        assert!(events.iter().all(|e| !e.id.starts_with(LOCAL_ID_PREFIX)));
        assert!(events.iter().any(|e| e.price == 12 && e.is_favorite));
        h.assert_converged();
    }

    #[tokio::test]
    async fn test_sync_failure_keeps_queue() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.go_offline();
        h.provider.delete_event("6").await.unwrap();
        let mut five = h.cached("5").unwrap();
        five.price = 1;
        h.provider.update_event(five).await.unwrap();

        h.go_online();
        h.remote().fail_with(|| TripError::Network("timeout".into()));
        let before = h.provider.pending_operations();

        let events = h.provider.sync().await;

        assert_eq!(events.len(), 2);
        assert_eq!(h.provider.pending_operations(), before);
        assert!(!h.provider.is_synchronized());
        assert!(!h.cached("5").unwrap().is_synchronized);

        h.remote().recover();
        h.provider.try_sync().await.unwrap();
        h.assert_converged();
    }

    #[tokio::test]
    async fn test_try_sync_offline_reports_offline() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Offline);
        h.provider
            .create_event(make_test_event("", 1))
            .await
            .unwrap();

        assert!(matches!(h.provider.try_sync().await, Err(TripError::Offline)));
        assert_eq!(h.remote().calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_update_stays_unsynchronized() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.go_offline();
        let mut five = h.cached("5").unwrap();
        five.price = 999;
        h.provider.update_event(five).await.unwrap();
        h.remote().reject_updates.lock().unwrap().push("5".into());

        h.go_online();
        h.provider.try_sync().await.unwrap();

        let five = h.cached("5").unwrap();
        assert_eq!(five.price, 999);
        assert!(!five.is_synchronized);
        assert!(!h.provider.is_synchronized());
        assert_eq!(h.provider.pending_operations().len(), 1);
        assert!(h.cached("6").unwrap().is_synchronized);
    }

    #[tokio::test]
    async fn test_deleted_on_server_counts_as_done() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.go_offline();
        h.provider.delete_event("7").await.unwrap();
        h.remote().events.lock().unwrap().remove("7");

        h.go_online();
        h.provider.try_sync().await.unwrap();

        assert!(h.provider.is_synchronized());
        h.assert_converged();
    }

    #[tokio::test]
    async fn test_online_update_of_offline_created_event_stays_local() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Offline);
        let mut created = h
            .provider
            .create_event(make_test_event("", 5))
            .await
            .unwrap();

        h.go_online();
        created.price = 6;
        let calls = h.remote().calls();
        h.provider.update_event(created.clone()).await.unwrap();

        assert_eq!(h.remote().calls(), calls);
        let pending = h.provider.pending_operations();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, OperationKind::Create);
        assert_eq!(pending[0].payload.as_ref().map(|e| e.price), Some(6));
    }

    #[tokio::test]
    async fn test_online_update_acknowledges_pending_update() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.go_offline();
        let mut five = h.cached("5").unwrap();
        five.price = 300;
        h.provider.update_event(five.clone()).await.unwrap();

        h.go_online();
        five.price = 301;
        let updated = h.provider.update_event(five).await.unwrap();

        assert!(updated.is_synchronized);
        assert!(h.provider.is_synchronized());
        assert_eq!(h.remote().event("5").map(|e| e.price), Some(301));
    }

    #[tokio::test]
    async fn test_get_events_online_with_pending_changes_syncs_first() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.go_offline();
        h.provider
            .create_event(make_test_event("", 77))
            .await
            .unwrap();

        h.go_online();
        let events = h.provider.get_events().await.unwrap();

        assert_eq!(events.len(), 4);
        assert!(h.provider.is_synchronized());
        assert_eq!(h.remote().synced_with.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pending_state_survives_restart() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Offline);
        h.provider
            .create_event(make_test_event("", 1))
            .await
            .unwrap();

        let restarted = Provider::new(
            FakeRemote::default(),
            h.storage.clone() as Arc<dyn Storage>,
            STORE,
            h.connectivity.subscribe(),
        );

        assert!(!restarted.is_synchronized());
        assert_eq!(restarted.pending_operations().len(), 1);
        assert_eq!(restarted.cached_events().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_storage_degrades_reads() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Offline);
        h.storage.set_available(false);

        let events = h.provider.get_events().await.unwrap();
        let destinations = h.provider.get_destinations().await.unwrap();

        assert!(events.is_empty());
        assert!(destinations.is_empty());
        assert!(h.provider.is_degraded());
    }

    #[tokio::test]
    async fn test_unavailable_storage_still_serves_server_events_online() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Offline);
        h.storage.set_available(false);
        h.provider
            .create_event(make_test_event("", 42))
            .await
            .unwrap();

        h.go_online();
        let first = h.provider.get_events().await.unwrap();
        let second = h.provider.get_events().await.unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 3);
        assert!(h.remote().synced_with.lock().unwrap().is_empty());
        assert!(h.provider.is_degraded());
    }

    #[tokio::test]
    async fn test_try_sync_with_unreadable_queue_sends_nothing() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Offline);
        h.provider
            .create_event(make_test_event("", 42))
            .await
            .unwrap();
        h.storage.set_item("trip-test-queue", "not json").unwrap();

        h.go_online();
        let result = h.provider.try_sync().await;

        assert!(matches!(result, Err(TripError::StorageUnavailable(_))));
        assert_eq!(h.remote().calls(), 0);
        assert!(!h.provider.is_synchronized());

        // Fresh data is still served, but not cached over the offline work
        let events = h.provider.get_events().await.unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(h.provider.cached_events().len(), 1);
    }

    #[tokio::test]
    async fn test_offline_edit_during_fetch_is_kept() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.remote().hold_next_response();

        let (fetched, ()) = tokio::join!(h.provider.get_events(), async {
            h.remote().wait_until_held().await;
            h.go_offline();
            let mut five = h.cached("5").unwrap();
            five.price = 200;
            h.provider.update_event(five).await.unwrap();
            h.go_online();
            h.remote().release();
        });

        let fetched = fetched.unwrap();
        let five = fetched.iter().find(|e| e.id == "5").unwrap();
        assert_eq!(five.price, 200);
        assert!(!five.is_synchronized);
        assert_eq!(h.cached("5").map(|e| e.price), Some(200));
        assert!(!h.provider.is_synchronized());
        assert_eq!(h.provider.pending_operations().len(), 1);
    }

    #[tokio::test]
    async fn test_offline_edit_during_sync_stays_queued() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.go_offline();
        let mut five = h.cached("5").unwrap();
        five.price = 200;
        h.provider.update_event(five).await.unwrap();

        h.go_online();
        h.remote().hold_next_response();
        let (synced, ()) = tokio::join!(h.provider.try_sync(), async {
            h.remote().wait_until_held().await;
            h.go_offline();
            let mut five = h.cached("5").unwrap();
            five.price = 250;
            h.provider.update_event(five).await.unwrap();
            h.go_online();
            h.remote().release();
        });
        synced.unwrap();

        let five = h.cached("5").unwrap();
        assert_eq!(five.price, 250);
        assert!(!five.is_synchronized);
        assert!(!h.provider.is_synchronized());
        let pending = h.provider.pending_operations();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].payload.as_ref().map(|e| e.price), Some(250));

        h.provider.try_sync().await.unwrap();
        assert_eq!(h.remote().event("5").map(|e| e.price), Some(250));
        h.assert_converged();
    }

    #[tokio::test]
    async fn test_online_edit_during_sync_wins_over_echo() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.go_offline();
        let mut five = h.cached("5").unwrap();
        five.price = 200;
        h.provider.update_event(five).await.unwrap();

        h.go_online();
        h.remote().hold_next_response();
        let (synced, ()) = tokio::join!(h.provider.try_sync(), async {
            h.remote().wait_until_held().await;
            let mut five = h.cached("5").unwrap();
            five.price = 300;
            h.provider.update_event(five).await.unwrap();
            h.remote().release();
        });
        synced.unwrap();

        let five = h.cached("5").unwrap();
        assert_eq!(five.price, 300);
        assert_eq!(h.remote().event("5").map(|e| e.price), Some(300));
        assert!(h.provider.is_synchronized());
        h.assert_converged();
    }

    #[tokio::test]
    async fn test_delete_during_sync_is_not_resurrected() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_events().await.unwrap();
        h.go_offline();
        let mut five = h.cached("5").unwrap();
        five.price = 200;
        h.provider.update_event(five).await.unwrap();

        h.go_online();
        h.remote().hold_next_response();
        let (synced, ()) = tokio::join!(h.provider.try_sync(), async {
            h.remote().wait_until_held().await;
            h.provider.delete_event("6").await.unwrap();
            h.remote().release();
        });
        let synced = synced.unwrap();

        assert!(synced.iter().all(|e| e.id != "6"));
        assert!(h.cached("6").is_none());
        assert!(h.remote().event("6").is_none());
        assert!(h.provider.is_synchronized());
        h.assert_converged();
    }

    #[tokio::test]
    async fn test_offline_update_of_unknown_event_fails() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Offline);
        let err = h
            .provider
            .update_event(make_test_event("nope", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, TripError::EventNotFound(_)));
    }

    #[tokio::test]
    async fn test_destinations_and_offers_are_cached() {
        let h = Harness::new(seeded_remote(), NetworkStatus::Online);
        h.provider.get_destinations().await.unwrap();
        h.provider.get_offers().await.unwrap();

        h.go_offline();
        let destinations = h.provider.get_destinations().await.unwrap();
        let offers = h.provider.get_offers().await.unwrap();

        assert_eq!(destinations.len(), 2);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].offers[0].title, "Upgrade");
    }
}

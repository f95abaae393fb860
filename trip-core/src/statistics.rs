//! Per-type totals for the stats view.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::event::{Event, EventType};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statistics {
    /// Money spent per type, offers included
    pub money: Vec<(EventType, u64)>,
    /// How many times each transfer type was used
    pub transport: Vec<(EventType, usize)>,
    pub time_spent: Vec<(EventType, Duration)>,
}

impl Statistics {
    /// Every list is sorted by value, largest first. Types without events are left out.
    pub fn from_events(events: &[Event]) -> Self {
        let mut money: BTreeMap<EventType, u64> = BTreeMap::new();
        let mut transport: BTreeMap<EventType, usize> = BTreeMap::new();
        let mut time_spent: BTreeMap<EventType, Duration> = BTreeMap::new();

        for event in events {
            *money.entry(event.event_type).or_default() += event.total_price();
            *time_spent.entry(event.event_type).or_insert_with(Duration::zero) += event.duration();
            if event.event_type.is_transfer() {
                *transport.entry(event.event_type).or_default() += 1;
            }
        }

        Statistics {
            money: sorted_desc(money),
            transport: sorted_desc(transport),
            time_spent: sorted_desc(time_spent),
        }
    }
}

// Stable sort keeps ties in type order
fn sorted_desc<V: Ord>(totals: BTreeMap<EventType, V>) -> Vec<(EventType, V)> {
    let mut entries: Vec<_> = totals.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

//! Trip overview: route, dates and cost.

use chrono::Datelike;

use crate::event::Event;

const SHOWN_DESTINATIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSummary {
    /// `Amsterdam - Geneva - Chamonix`, or `Amsterdam — ... — Chamonix` for longer trips
    pub title: String,
    /// `Mar 18 — 20`
    pub dates: String,
    pub total_cost: u64,
}

impl TripSummary {
    /// Summarize events in trip order. Returns `None` for an empty trip.
    pub fn from_events(events: &[Event]) -> Option<Self> {
        let mut ordered: Vec<&Event> = events.iter().collect();
        ordered.sort_by_key(|e| e.start);

        let first = ordered.first()?;
        let last = ordered.last()?;

        let title = if ordered.len() > SHOWN_DESTINATIONS {
            format!("{} — ... — {}", first.destination.name, last.destination.name)
        } else {
            ordered
                .iter()
                .map(|e| e.destination.name.as_str())
                .collect::<Vec<_>>()
                .join(" - ")
        };

        let dates = format!(
            "{} {} — {}",
            first.start.format("%b"),
            first.start.day(),
            last.end.day()
        );

        Some(TripSummary {
            title,
            dates,
            total_cost: events.iter().map(Event::total_price).sum(),
        })
    }
}

pub mod add;
pub mod delete;
pub mod destinations;
pub mod favorite;
pub mod info;
pub mod list;
pub mod offers;
pub mod stats;
pub mod status;
pub mod sync;
pub mod update;
pub mod watch;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use owo_colors::OwoColorize;
use trip_core::Event;

use crate::app::App;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse "2025-03-18T10:00" (local time), "2025-03-18" (local midnight) or RFC 3339.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| anyhow::anyhow!("Could not parse date '{input}' (try 2025-03-18T10:00)"))?;

    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => Ok(local.with_timezone(&Utc)),
        None => anyhow::bail!("'{input}' does not exist in the local time zone"),
    }
}

pub fn check_period(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end < start {
        anyhow::bail!("The event ends before it starts");
    }
    Ok(())
}

/// Look an event up among those the provider currently knows.
pub async fn find_event(app: &App, id: &str) -> Result<Event> {
    let events = app.provider.get_events().await?;
    events
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| anyhow::anyhow!("No event with id '{id}'"))
}

/// Printed after a change that only reached the local store.
pub fn print_offline_note(app: &App) {
    if !app.status().is_online() {
        println!(
            "{}",
            "Saved offline. It will be sent to the server on the next sync.".yellow()
        );
    }
}

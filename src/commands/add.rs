use anyhow::Result;
use owo_colors::OwoColorize;
use trip_core::event::{Destination, Event, EventType, OffersCatalog};

use super::{check_period, parse_datetime, print_offline_note};
use crate::app::App;
use crate::render::Render;

pub struct Draft {
    pub event_type: EventType,
    pub destination: String,
    pub start: String,
    pub end: String,
    pub price: u32,
    pub offers: Vec<String>,
}

pub async fn run(app: &App, draft: Draft) -> Result<()> {
    let start = parse_datetime(&draft.start)?;
    let end = parse_datetime(&draft.end)?;
    check_period(start, end)?;

    let destination = resolve_destination(app, &draft.destination).await?;

    let mut event = Event::draft(draft.event_type, destination, start, end, draft.price);

    if !draft.offers.is_empty() {
        let catalog = OffersCatalog::from(app.provider.get_offers().await?);
        for title in &draft.offers {
            let offer = catalog.find(draft.event_type, title).ok_or_else(|| {
                anyhow::anyhow!("No offer '{title}' for {}", draft.event_type)
            })?;
            event.offers.push(offer.clone());
        }
    }

    let created = app.provider.create_event(event).await?;

    println!("{} {}", "Created".green(), created.render());
    print_offline_note(app);

    Ok(())
}

/// Match a destination the server knows. Without any cached list (first run
/// offline) the name is taken as given.
async fn resolve_destination(app: &App, name: &str) -> Result<Destination> {
    let known = app.provider.get_destinations().await?;

    if known.is_empty() {
        return Ok(Destination::named(name));
    }

    if let Some(destination) = known.iter().find(|d| d.name.eq_ignore_ascii_case(name)) {
        return Ok(destination.clone());
    }

    let mut available: Vec<_> = known.iter().map(|d| d.name.as_str()).collect();
    available.sort();
    anyhow::bail!(
        "Destination '{}' not found. Available: {}",
        name,
        available.join(", ")
    );
}

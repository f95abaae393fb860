use anyhow::Result;
use owo_colors::OwoColorize;

use super::{check_period, find_event, parse_datetime, print_offline_note};
use crate::app::App;
use crate::render::Render;

#[derive(Default)]
pub struct Changes {
    pub price: Option<u32>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub favorite: Option<bool>,
}

pub async fn run(app: &App, id: &str, changes: Changes) -> Result<()> {
    let mut event = find_event(app, id).await?;

    if let Some(price) = changes.price {
        event.price = price;
    }
    if let Some(start) = &changes.start {
        event.start = parse_datetime(start)?;
    }
    if let Some(end) = &changes.end {
        event.end = parse_datetime(end)?;
    }
    if let Some(favorite) = changes.favorite {
        event.is_favorite = favorite;
    }
    check_period(event.start, event.end)?;

    let updated = app.provider.update_event(event).await?;

    println!("{} {}", "Updated".yellow(), updated.render());
    print_offline_note(app);

    Ok(())
}

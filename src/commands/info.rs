use anyhow::Result;
use owo_colors::OwoColorize;
use trip_core::summary::TripSummary;

use crate::app::App;
use crate::render::Render;

pub async fn run(app: &App) -> Result<()> {
    let events = app.provider.get_events().await?;

    match TripSummary::from_events(&events) {
        Some(summary) => println!("{}", summary.render()),
        None => println!("{}", "No events yet".dimmed()),
    }

    Ok(())
}

use anyhow::Result;
use owo_colors::OwoColorize;
use trip_core::statistics::Statistics;

use crate::app::App;
use crate::render::Render;

pub async fn run(app: &App) -> Result<()> {
    let events = app.provider.get_events().await?;

    if events.is_empty() {
        println!("{}", "No events yet".dimmed());
        return Ok(());
    }

    println!("{}", Statistics::from_events(&events).render());
    Ok(())
}

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;

pub async fn run(app: &App) -> Result<()> {
    let mut destinations = app.provider.get_destinations().await?;
    destinations.sort_by(|a, b| a.name.cmp(&b.name));

    if destinations.is_empty() {
        println!("{}", "No destinations known yet".dimmed());
        return Ok(());
    }

    for destination in &destinations {
        println!("{}", destination.render());
    }

    Ok(())
}

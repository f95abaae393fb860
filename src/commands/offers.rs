use anyhow::Result;
use owo_colors::OwoColorize;
use trip_core::EventType;

use crate::app::App;
use crate::render::Render;

pub async fn run(app: &App, event_type: Option<EventType>) -> Result<()> {
    let mut groups = app.provider.get_offers().await?;
    groups.retain(|g| event_type.is_none_or(|t| g.event_type == t));
    groups.sort_by_key(|g| g.event_type);

    if groups.is_empty() {
        println!("{}", "No offers".dimmed());
        return Ok(());
    }

    for (i, group) in groups.iter().enumerate() {
        println!("{}", group.render());
        if i < groups.len() - 1 {
            println!();
        }
    }

    Ok(())
}

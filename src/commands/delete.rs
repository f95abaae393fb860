use anyhow::Result;
use owo_colors::OwoColorize;

use super::{find_event, print_offline_note};
use crate::app::App;

pub async fn run(app: &App, id: &str) -> Result<()> {
    let event = find_event(app, id).await?;

    app.provider.delete_event(&event.id).await?;

    println!("{} {}", "Deleted".red(), event.title());
    print_offline_note(app);

    Ok(())
}

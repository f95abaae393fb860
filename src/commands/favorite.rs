use anyhow::Result;

use super::{find_event, print_offline_note};
use crate::app::App;

pub async fn run(app: &App, id: &str) -> Result<()> {
    let mut event = find_event(app, id).await?;
    event.is_favorite = !event.is_favorite;

    let updated = app.provider.update_event(event).await?;

    if updated.is_favorite {
        println!("★ {} added to favorites", updated.title());
    } else {
        println!("{} removed from favorites", updated.title());
    }
    print_offline_note(app);

    Ok(())
}

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::{Render, pluralize};
use crate::utils::tui;

pub async fn run(app: &App) -> Result<()> {
    if app.provider.is_synchronized() {
        println!("{}", "Nothing to sync".dimmed());
        return Ok(());
    }

    let pending = app.provider.pending_operations();
    for op in &pending {
        println!("   {}", op.render());
    }

    let spinner = tui::create_spinner(format!(
        "Syncing {} {}",
        pending.len(),
        pluralize("change", pending.len())
    ));
    let result = app.provider.try_sync().await;
    spinner.finish_and_clear();

    let events = result?;
    let left = app.provider.pending_operations();

    println!(
        "\nSynced: {} {} on the server",
        events.len(),
        pluralize("event", events.len())
    );

    if !left.is_empty() {
        println!(
            "{}",
            format!(
                "{} {} rejected by the server, kept locally:",
                left.len(),
                pluralize("change", left.len())
            )
            .yellow()
        );
        for op in &left {
            println!("   {}", op.render());
        }
    }

    Ok(())
}

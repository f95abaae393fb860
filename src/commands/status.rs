use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::{Render, pluralize};

pub fn run(app: &App) -> Result<()> {
    let provider = &app.provider;

    let mut network = app.status().render();
    if app.forced_offline {
        network.push_str(&format!(" {}", "(--offline)".dimmed()));
    }
    println!("Server:    {} {}", app.config.end_point, network);

    let sync_state = if provider.is_synchronized() {
        "up to date".green().to_string()
    } else {
        "changes pending".yellow().to_string()
    };
    println!("Sync:      {sync_state}");

    if provider.is_degraded() {
        println!(
            "Storage:   {}",
            "unavailable, offline changes won't survive this run".red()
        );
    } else {
        println!("Storage:   {}", app.config.data_path().display());
    }

    let pending = provider.pending_operations();
    if pending.is_empty() {
        return Ok(());
    }

    println!(
        "\n{} queued {}:",
        pending.len(),
        pluralize("change", pending.len())
    );
    for op in &pending {
        println!("   {}", op.render());
    }

    Ok(())
}

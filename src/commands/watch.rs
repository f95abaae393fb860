use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;
use trip_core::connectivity::run_probe;
use trip_core::model::EventsModel;
use trip_core::summary::TripSummary;

use crate::app::App;
use crate::render::{Render, pluralize};

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

pub async fn run(app: &App) -> Result<()> {
    if app.forced_offline {
        anyhow::bail!("`trip watch` needs the server; run it without --offline");
    }

    let interval = app.config.probe_interval()?;

    let mut model = EventsModel::new();
    model.set_events(app.provider.get_events().await?);

    println!(
        "{} {} with {} {}, checking every {}. Ctrl-C to stop.",
        timestamp().dimmed(),
        app.status().render(),
        model.events().len(),
        pluralize("event", model.events().len()),
        app.config.probe_interval
    );

    let mut network = app.connectivity.subscribe();
    let report_transitions = async {
        while network.changed().await.is_ok() {
            let status = *network.borrow_and_update();
            println!("{} {}", timestamp().dimmed(), status.render());
        }
    };

    let probe = run_probe(app.provider.api(), &app.connectivity, interval);

    let resync = app
        .provider
        .sync_on_reconnect(app.connectivity.subscribe(), |events| {
            model.set_events(events);
            let total = TripSummary::from_events(model.events())
                .map(|s| s.total_cost)
                .unwrap_or_default();
            println!(
                "{} synced {} {}, trip total €{}",
                timestamp().dimmed(),
                model.events().len(),
                pluralize("event", model.events().len()),
                total
            );
        });

    tokio::select! {
        _ = probe => {}
        _ = resync => {}
        _ = report_transitions => {}
        result = tokio::signal::ctrl_c() => result?,
    }

    Ok(())
}

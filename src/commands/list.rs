use anyhow::Result;
use chrono::{Local, NaiveDate, Utc};
use owo_colors::OwoColorize;
use trip_core::model::{EventsModel, FilterType, SortType};

use crate::app::App;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(app: &App, filter: FilterType, sort: SortType) -> Result<()> {
    let spinner = tui::create_spinner("Loading events".into());
    let result = app.provider.get_events().await;
    spinner.finish_and_clear();

    let mut model = EventsModel::new();
    model.set_events(result?);
    model.set_filter(filter);

    let mut events = model.filtered_events(Utc::now());
    sort.sort(&mut events);

    if !app.status().is_online() {
        println!("{}\n", "[offline] showing the local copy".yellow());
    }

    if events.is_empty() {
        let message = match filter {
            FilterType::Everything => "No events yet. Add one with `trip add`".to_string(),
            other => format!("No {other} events"),
        };
        println!("{}", message.dimmed());
        return Ok(());
    }

    // Day groups only make sense in chronological order
    if sort != SortType::Event {
        for event in &events {
            println!("{}", event.render());
        }
        return Ok(());
    }

    let mut current_day: Option<NaiveDate> = None;
    let mut day_number = 0;

    for event in &events {
        let day = event.start.with_timezone(&Local).date_naive();

        if current_day != Some(day) {
            if current_day.is_some() {
                println!();
            }
            day_number += 1;
            println!("{} {}", day_number.to_string().dimmed(), day.format("%b %-d").bold());
            current_day = Some(day);
        }

        println!("{}", event.render());
    }

    Ok(())
}

//! TUI rendering traits for trip types.
//!
//! Extension traits that add colored terminal rendering to trip-core types
//! using owo_colors.

use chrono::{Duration, Local};
use owo_colors::OwoColorize;
use trip_core::NetworkStatus;
use trip_core::event::{Destination, Event, OfferGroup};
use trip_core::queue::{OperationKind, PendingOperation};
use trip_core::statistics::Statistics;
use trip_core::summary::TripSummary;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for OperationKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            OperationKind::Create => symbol.green().to_string(),
            OperationKind::Update => symbol.yellow().to_string(),
            OperationKind::Delete => symbol.red().to_string(),
        }
    }
}

impl Render for PendingOperation {
    fn render(&self) -> String {
        let what = match &self.payload {
            Some(event) => event.title(),
            None => self.event_id.clone(),
        };
        let queued = self.queued_at.with_timezone(&Local).format("%b %-d %H:%M");

        format!(
            "{} {} {}",
            self.kind.render(),
            what,
            format!("queued {queued}").dimmed()
        )
    }
}

impl Render for NetworkStatus {
    fn render(&self) -> String {
        match self {
            NetworkStatus::Online => "online".green().to_string(),
            NetworkStatus::Offline => "offline".red().to_string(),
        }
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let start = self.start.with_timezone(&Local);
        let end = self.end.with_timezone(&Local);
        let time = format!(
            "{} {}–{} ({})",
            start.format("%b %-d"),
            start.format("%H:%M"),
            end.format("%H:%M"),
            format_duration(self.duration())
        );

        let mut line = format!("{:>7} {}", format!("€{}", self.price), self.title());
        if self.is_favorite {
            line.push_str(&format!(" {}", "★".yellow()));
        }
        line.push_str(&format!("  {}", time.dimmed()));
        if !self.is_synchronized {
            line.push_str(&format!(" {}", "(not synced)".yellow()));
        }
        line.push_str(&format!(" {}", format!("[{}]", self.id).dimmed()));

        for offer in &self.offers {
            line.push_str(&format!("\n        + {} €{}", offer.title, offer.price));
        }
        line
    }
}

impl Render for Destination {
    fn render(&self) -> String {
        if self.description.is_empty() {
            return self.name.bold().to_string();
        }
        format!("{}\n   {}", self.name.bold(), self.description.dimmed())
    }
}

impl Render for OfferGroup {
    fn render(&self) -> String {
        let mut lines = vec![self.event_type.to_string().bold().to_string()];
        if self.offers.is_empty() {
            lines.push(format!("   {}", "No offers".dimmed()));
        }
        for offer in &self.offers {
            lines.push(format!("   {} €{}", offer.title, offer.price));
        }
        lines.join("\n")
    }
}

impl Render for TripSummary {
    fn render(&self) -> String {
        format!(
            "{}\n{}\nTotal: €{}",
            self.title.bold(),
            self.dates.dimmed(),
            self.total_cost
        )
    }
}

impl Render for Statistics {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        lines.push("Money".bold().to_string());
        for (event_type, amount) in &self.money {
            lines.push(format!("   {:<12} €{}", event_type.as_str(), amount));
        }

        lines.push(String::new());
        lines.push("Transport".bold().to_string());
        for (event_type, count) in &self.transport {
            lines.push(format!("   {:<12} {}x", event_type.as_str(), count));
        }

        lines.push(String::new());
        lines.push("Time spent".bold().to_string());
        for (event_type, spent) in &self.time_spent {
            lines.push(format!("   {:<12} {}", event_type.as_str(), format_duration(*spent)));
        }

        lines.join("\n")
    }
}

/// "45M", "02H 30M", "01D 02H 30M"
pub fn format_duration(duration: Duration) -> String {
    let days = duration.num_days();
    let hours = duration.num_hours() % 24;
    let minutes = duration.num_minutes() % 60;

    if days > 0 {
        format!("{days:02}D {hours:02}H {minutes:02}M")
    } else if hours > 0 {
        format!("{hours:02}H {minutes:02}M")
    } else {
        format!("{minutes:02}M")
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

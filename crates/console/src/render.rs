// Terminal rendering (tables and colors)

use chrono::DateTime;
use colored::Colorize;
use queuesmart_core::domain::{
    DisplayStatus, HistoryRecord, Outcome, QueueSnapshot, Service, ServicePriority,
};
use tabled::{Table, Tabled};

use crate::script::StepReport;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Joined")]
    joined: String,
    #[tabled(rename = "Est. wait")]
    wait: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Service")]
    name: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Waiting")]
    waiting: usize,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Waited")]
    waited: String,
    #[tabled(rename = "Left at")]
    departed: String,
}

fn clock_time(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn status_label(status: DisplayStatus) -> String {
    let text = status.to_string();
    match status {
        DisplayStatus::Serving => text.blue().bold().to_string(),
        DisplayStatus::AlmostReady => text.yellow().to_string(),
        DisplayStatus::Waiting => text.dimmed().to_string(),
    }
}

fn priority_label(priority: ServicePriority) -> String {
    let text = priority.to_string();
    match priority {
        ServicePriority::High => text.red().to_string(),
        ServicePriority::Medium => text.yellow().to_string(),
        ServicePriority::Low => text.green().to_string(),
    }
}

pub fn print_queue(service: &Service, snapshot: &QueueSnapshot) {
    println!(
        "{} {}",
        service.name.cyan().bold(),
        format!(
            "- {} in queue, {} served",
            snapshot.len(),
            snapshot.served_count
        )
        .dimmed()
    );

    if snapshot.is_empty() {
        println!("  Queue is empty");
        println!();
        return;
    }

    let rows: Vec<EntryRow> = snapshot
        .entries
        .iter()
        .map(|e| EntryRow {
            position: e.position,
            name: e.display_name.clone(),
            joined: clock_time(e.joined_at),
            wait: format!("{} min", e.estimated_wait_minutes),
            status: status_label(e.status),
        })
        .collect();
    println!("{}", Table::new(rows));
    println!();
}

pub fn print_services(services: &[Service], snapshots: &[QueueSnapshot]) {
    let rows: Vec<ServiceRow> = services
        .iter()
        .map(|s| ServiceRow {
            id: s.id.clone(),
            name: s.name.clone(),
            duration: format!("~{} min", s.expected_duration_minutes),
            priority: priority_label(s.priority),
            state: if s.is_open {
                "open".green().to_string()
            } else {
                "closed".red().to_string()
            },
            waiting: snapshots
                .iter()
                .find(|q| q.service_id == s.id)
                .map_or(0, QueueSnapshot::len),
        })
        .collect();
    println!("{}", Table::new(rows));
}

pub fn print_history(history: &[HistoryRecord]) {
    if history.is_empty() {
        println!("{}", "No departures recorded".yellow());
        return;
    }

    let rows: Vec<HistoryRow> = history
        .iter()
        .map(|r| HistoryRow {
            name: r.display_name.clone(),
            service: r.service_name.clone(),
            outcome: match r.outcome {
                Outcome::Completed => r.outcome.to_string().green().to_string(),
                Outcome::Cancelled => r.outcome.to_string().red().to_string(),
                Outcome::NoShow => r.outcome.to_string().yellow().to_string(),
            },
            waited: format!("{} min", r.waited_minutes),
            departed: clock_time(r.departed_at),
        })
        .collect();
    println!("{}", Table::new(rows));
}

pub fn print_step(report: &StepReport) {
    let marker = if report.ok { "✓".green() } else { "✗".red() };
    println!(
        "{} {} {}",
        marker,
        format!("[{}] {}", report.line, report.input).dimmed(),
        report.message
    );
}

//! Line-oriented replay scripts
//!
//! ```text
//! # comment
//! join billing-inquiry Ada Lovelace
//! serve billing-inquiry
//! up billing-inquiry #3
//! down billing-inquiry Lisa Wong
//! leave billing-inquiry #2
//! noshow billing-inquiry #1
//! close billing-inquiry
//! show billing-inquiry
//! history
//! ```
//!
//! `<who>` is `#<position>` or a display name (first match, case-insensitive).

use anyhow::{anyhow, bail, Context, Result};
use queuesmart_core::application::QueueDesk;
use queuesmart_core::domain::QueueSnapshot;
use queuesmart_core::AppError;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Who {
    Position(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join { service: String, name: String },
    Leave { service: String, who: Who },
    NoShow { service: String, who: Who },
    Serve { service: String },
    Up { service: String, who: Who },
    Down { service: String, who: Who },
    Open { service: String },
    Close { service: String },
    Show { service: String },
    History,
}

/// Parse one script line; blank lines and comments yield None
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    if verb == "history" {
        return Ok(Some(Command::History));
    }

    let service = words
        .next()
        .ok_or_else(|| anyhow!("'{}' needs a service id", verb))?
        .to_string();
    let rest = words.collect::<Vec<_>>().join(" ");

    let command = match verb.as_str() {
        "join" => Command::Join {
            service,
            name: required(rest, "join", "a display name")?,
        },
        "leave" => Command::Leave {
            service,
            who: parse_who(required(rest, "leave", "an entry")?)?,
        },
        "noshow" => Command::NoShow {
            service,
            who: parse_who(required(rest, "noshow", "an entry")?)?,
        },
        "up" => Command::Up {
            service,
            who: parse_who(required(rest, "up", "an entry")?)?,
        },
        "down" => Command::Down {
            service,
            who: parse_who(required(rest, "down", "an entry")?)?,
        },
        "serve" => Command::Serve { service },
        "open" => Command::Open { service },
        "close" => Command::Close { service },
        "show" => Command::Show { service },
        other => bail!("Unknown command '{}'", other),
    };
    Ok(Some(command))
}

fn required(rest: String, verb: &str, what: &str) -> Result<String> {
    if rest.is_empty() {
        bail!("'{}' needs {}", verb, what);
    }
    Ok(rest)
}

fn parse_who(text: String) -> Result<Who> {
    match text.strip_prefix('#') {
        Some(n) => {
            let position: usize = n
                .parse()
                .with_context(|| format!("Invalid position '{}'", text))?;
            if position == 0 {
                bail!("Positions start at 1");
            }
            Ok(Who::Position(position))
        }
        None => Ok(Who::Name(text)),
    }
}

/// Result of one executed script line
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub line: usize,
    pub input: String,
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<QueueSnapshot>,
}

/// Run a whole script against the desk.
///
/// Recoverable failures (missing entry, empty queue, closed service) are
/// reported and the script carries on; anything else aborts.
pub fn run(desk: &QueueDesk, script: &str) -> Result<Vec<StepReport>> {
    let mut reports = Vec::new();

    for (index, raw) in script.lines().enumerate() {
        let line = index + 1;
        let Some(command) = parse_line(raw).with_context(|| format!("line {}", line))? else {
            continue;
        };

        let report = match execute(desk, &command) {
            Ok((message, snapshot)) => StepReport {
                line,
                input: raw.trim().to_string(),
                ok: true,
                message,
                snapshot,
            },
            Err(StepError::Recoverable(e)) => {
                warn!(line, error = %e, "Script step rejected");
                StepReport {
                    line,
                    input: raw.trim().to_string(),
                    ok: false,
                    message: e.to_string(),
                    snapshot: None,
                }
            }
            Err(StepError::Fatal(e)) => {
                return Err(e).with_context(|| format!("line {}", line));
            }
        };
        reports.push(report);
    }

    Ok(reports)
}

enum StepError {
    Recoverable(AppError),
    Fatal(anyhow::Error),
}

impl From<AppError> for StepError {
    fn from(err: AppError) -> Self {
        if err.is_recoverable() {
            StepError::Recoverable(err)
        } else {
            StepError::Fatal(err.into())
        }
    }
}

type StepResult = std::result::Result<(String, Option<QueueSnapshot>), StepError>;

fn execute(desk: &QueueDesk, command: &Command) -> StepResult {
    let message = match command {
        Command::Join { service, name } => {
            let entry = desk.join(service, name)?;
            let service_name = desk.service(service)?.name;
            format!(
                "{} joined the queue for {} at position {}.",
                entry.display_name, service_name, entry.position
            )
        }
        Command::Leave { service, who } => {
            let entry_id = resolve(desk, service, who)?;
            let entry = desk.leave(service, &entry_id)?;
            format!("{} has been removed from the queue.", entry.display_name)
        }
        Command::NoShow { service, who } => {
            let entry_id = resolve(desk, service, who)?;
            let entry = desk.dismiss_no_show(service, &entry_id)?;
            format!("{} was marked as a no-show.", entry.display_name)
        }
        Command::Serve { service } => {
            let entry = desk.serve_next(service)?;
            format!(
                "{} has been served and removed from the queue.",
                entry.display_name
            )
        }
        Command::Up { service, who } => {
            let entry_id = resolve(desk, service, who)?;
            desk.move_up(service, &entry_id)?;
            moved(desk, service, &entry_id)?
        }
        Command::Down { service, who } => {
            let entry_id = resolve(desk, service, who)?;
            desk.move_down(service, &entry_id)?;
            moved(desk, service, &entry_id)?
        }
        Command::Open { service } => {
            desk.set_service_open(service, true)?;
            format!("{} is now open.", desk.service(service)?.name)
        }
        Command::Close { service } => {
            desk.set_service_open(service, false)?;
            format!("{} is now closed.", desk.service(service)?.name)
        }
        Command::Show { service } => {
            let snapshot = desk.snapshot(service)?;
            let message = format!("{} in queue", snapshot.len());
            return Ok((message, Some(snapshot)));
        }
        Command::History => {
            let count = desk.history()?.len();
            format!("{} departures recorded", count)
        }
    };
    Ok((message, None))
}

/// Turn a `<who>` reference into an entry id using the current snapshot
fn resolve(desk: &QueueDesk, service: &str, who: &Who) -> Result<String, AppError> {
    let snapshot = desk.snapshot(service)?;
    let found = match who {
        Who::Position(position) => snapshot.entries.iter().find(|e| e.position == *position),
        Who::Name(name) => snapshot
            .entries
            .iter()
            .find(|e| e.display_name.eq_ignore_ascii_case(name)),
    };

    found.map(|e| e.id.clone()).ok_or_else(|| {
        AppError::NotFound(match who {
            Who::Position(p) => format!("No entry at position {} in {}", p, service),
            Who::Name(n) => format!("No entry named {} in {}", n, service),
        })
    })
}

fn moved(desk: &QueueDesk, service: &str, entry_id: &str) -> Result<String, AppError> {
    let snapshot = desk.snapshot(service)?;
    let entry = snapshot
        .entries
        .iter()
        .find(|e| e.id == entry_id)
        .ok_or_else(|| AppError::Internal(format!("Entry {} vanished after move", entry_id)))?;
    Ok(format!(
        "{} is now at position {}.",
        entry.display_name, entry.position
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use queuesmart_core::port::id_provider::UuidProvider;
    use queuesmart_core::port::time_provider::SystemTimeProvider;
    use std::sync::Arc;

    fn seeded_desk() -> QueueDesk {
        let settings = Settings::default();
        let desk = QueueDesk::new(
            Arc::new(UuidProvider),
            Arc::new(SystemTimeProvider),
            settings.engine.clone(),
        );
        settings.seed(&desk).unwrap();
        desk
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line("  # note").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(
            parse_line("join billing-inquiry Ada  Lovelace").unwrap(),
            Some(Command::Join {
                service: "billing-inquiry".to_string(),
                name: "Ada Lovelace".to_string(),
            })
        );
        assert_eq!(
            parse_line("UP billing-inquiry #3").unwrap(),
            Some(Command::Up {
                service: "billing-inquiry".to_string(),
                who: Who::Position(3),
            })
        );
        assert_eq!(parse_line("history").unwrap(), Some(Command::History));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("teleport billing").is_err());
        assert!(parse_line("serve").is_err());
        assert!(parse_line("join billing").is_err());
        assert!(parse_line("leave billing #0").is_err());
        assert!(parse_line("leave billing #two").is_err());
    }

    #[test]
    fn test_run_reorders_and_serves() {
        let desk = seeded_desk();
        let script = "\
# Billing Inquiry starts as Tom Baker, Lisa Wong, David Kim
down billing-inquiry lisa wong
serve billing-inquiry
show billing-inquiry
";
        let reports = run(&desk, script).unwrap();
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.ok));
        assert_eq!(reports[0].line, 2);
        assert_eq!(reports[0].message, "Lisa Wong is now at position 3.");

        let snapshot = reports[2].snapshot.as_ref().unwrap();
        assert_eq!(snapshot.names(), vec!["David Kim", "Lisa Wong"]);
    }

    #[test]
    fn test_run_continues_after_recoverable_error() {
        let desk = seeded_desk();
        let script = "\
join account-management Someone
leave billing-inquiry #9
serve technical-assistance
";
        let reports = run(&desk, script).unwrap();
        assert!(!reports[0].ok);
        assert!(reports[0].message.contains("closed"));
        assert!(!reports[1].ok);
        assert!(reports[2].ok);
        assert_eq!(
            reports[2].message,
            "Mike Johnson has been served and removed from the queue."
        );
    }

    #[test]
    fn test_run_rejects_bad_syntax() {
        let desk = seeded_desk();
        let err = run(&desk, "serve billing-inquiry\nfly away\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_run_no_show_hands_counter_to_next() {
        let desk = seeded_desk();
        let script = "\
noshow technical-assistance #1
noshow technical-assistance #1
noshow technical-assistance #1
history
";
        let reports = run(&desk, script).unwrap();
        assert_eq!(reports[0].message, "Mike Johnson was marked as a no-show.");
        assert!(reports[1].ok);
        assert!(!reports[2].ok);
        assert_eq!(reports[3].message, "2 departures recorded");
        assert!(desk.snapshot("technical-assistance").unwrap().is_empty());
    }
}

use chrono::Utc;
use clap::Args;
use focuspet_core::{
    Config, Event, NextPhase, Phase, ProgressStore, SessionConfig, SessionEngine, Snapshot,
};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use super::format_mmss;

#[derive(Args)]
pub struct RunArgs {
    /// Focus length in minutes (default from config)
    #[arg(long)]
    focus: Option<String>,
    /// Number of focus intervals (default from config)
    #[arg(long)]
    cycles: Option<String>,
    /// Break length in minutes (default from config)
    #[arg(long = "break")]
    break_minutes: Option<String>,
    /// Print JSON lines instead of a status line
    #[arg(long)]
    json: bool,
}

/// What the stdin reader asked for.
enum Command {
    Start,
    Pause,
    Stop,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let word = line.trim().to_lowercase();
        match word.as_str() {
            "" => None,
            "start" | "resume" => Some(Command::Start),
            "pause" => Some(Command::Pause),
            "stop" => Some(Command::Stop),
            "quit" | "exit" => Some(Command::Quit),
            _ => Some(Command::Unknown(word)),
        }
    }
}

struct Printer {
    json: bool,
    last_line: Option<String>,
}

impl Printer {
    fn event(&self, event: &Event) -> Result<(), Box<dyn std::error::Error>> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
        }
        Ok(())
    }

    /// Prints only when the rendered line changes (about once a second).
    fn snapshot(&mut self, snap: &Snapshot) -> Result<(), Box<dyn std::error::Error>> {
        let line = status_line(snap);
        if self.last_line.as_deref() == Some(line.as_str()) {
            return Ok(());
        }
        if self.json {
            println!("{}", serde_json::to_string(snap)?);
        } else {
            println!("{line}");
        }
        self.last_line = Some(line);
        Ok(())
    }
}

fn status_line(snap: &Snapshot) -> String {
    let phase = match snap.phase {
        Phase::Idle => "idle",
        Phase::Focusing => "focus",
        Phase::Break => "break",
    };
    format!(
        "[{phase} {}/{}] {}  points {:.1}  {}  {}",
        snap.current_cycle,
        snap.total_cycles,
        format_mmss(snap.remaining_secs),
        snap.points,
        snap.scene_key,
        snap.status.text,
    )
}

pub fn run(args: RunArgs, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(dir);
    let defaults = &config.session;
    let session = SessionConfig::parse(
        args.focus
            .as_deref()
            .unwrap_or(&defaults.focus_minutes.to_string()),
        args.cycles
            .as_deref()
            .unwrap_or(&defaults.total_cycles.to_string()),
        args.break_minutes
            .as_deref()
            .unwrap_or(&defaults.break_minutes.to_string()),
        defaults,
    );

    tracing::debug!(
        focus = session.focus_minutes,
        cycles = session.total_cycles,
        brk = session.break_minutes,
        "starting run"
    );
    let engine = SessionEngine::new(ProgressStore::in_dir(dir), &config, Utc::now());
    let printer = Printer {
        json: args.json,
        last_line: None,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(drive(engine, session, config.companion.tick_interval(), printer));
    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_background();
    result
}

/// Polls the engine on a fixed cadence until the run finishes or the user quits.
async fn drive(
    mut engine: SessionEngine,
    session: SessionConfig,
    cadence: std::time::Duration,
    mut printer: Printer,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(event) = engine.start(session, Utc::now()) {
        printer.event(&event)?;
    }

    let mut interval = tokio::time::interval(cadence);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Utc::now();
                let event = engine.tick(now);
                if let Some(event) = &event {
                    printer.event(event)?;
                }
                printer.snapshot(&engine.frame(now))?;

                let finished = matches!(
                    event,
                    Some(Event::FocusCompleted { next: NextPhase::Finished, .. })
                );
                // Paused with no way to resume.
                let stranded = !stdin_open && engine.phase() == Phase::Idle;
                if finished || stranded {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                let now = Utc::now();
                engine.mark_active(now);
                let event = match Command::parse(&line) {
                    None => None,
                    Some(Command::Start) => engine.start(session, now),
                    Some(Command::Pause) => engine.pause(now),
                    Some(Command::Stop) => engine.stop(now),
                    Some(Command::Quit) => {
                        if let Some(event) = engine.stop(now) {
                            printer.event(&event)?;
                        }
                        break;
                    }
                    Some(Command::Unknown(word)) => {
                        eprintln!("unknown command '{word}' (start, pause, stop, quit)");
                        None
                    }
                };
                if let Some(event) = &event {
                    printer.event(event)?;
                }
                printer.snapshot(&engine.frame(now))?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping run");
                if let Some(event) = engine.stop(Utc::now()) {
                    printer.event(&event)?;
                }
                break;
            }
        }
    }

    printer.snapshot(&engine.snapshot(Utc::now()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert!(matches!(Command::parse(" Pause\n"), Some(Command::Pause)));
        assert!(matches!(Command::parse("resume"), Some(Command::Start)));
        assert!(matches!(Command::parse("exit"), Some(Command::Quit)));
        assert!(Command::parse("   ").is_none());
        assert!(matches!(Command::parse("dance"), Some(Command::Unknown(w)) if w == "dance"));
    }
}

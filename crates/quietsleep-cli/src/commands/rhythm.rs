use clap::Subcommand;
use quietsleep_core::{format_clock, PRESETS, TIMER_OPTIONS_MIN};

#[derive(Subcommand)]
pub enum RhythmAction {
    /// List rhythm presets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List sleep timer options
    Timers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: RhythmAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RhythmAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&PRESETS)?);
            } else {
                for p in PRESETS {
                    println!(
                        "{:<6} {:<14} {}-{}-{} ({}s/cycle)",
                        p.id,
                        p.label,
                        p.rhythm.inhale_secs,
                        p.rhythm.hold_secs,
                        p.rhythm.exhale_secs,
                        p.rhythm.cycle_secs()
                    );
                }
            }
        }
        RhythmAction::Timers { json } => {
            if json {
                println!("{}", serde_json::to_string(&TIMER_OPTIONS_MIN)?);
            } else {
                for minutes in TIMER_OPTIONS_MIN {
                    println!("{minutes:>4} min  {}", format_clock(minutes * 60));
                }
            }
        }
    }
    Ok(())
}

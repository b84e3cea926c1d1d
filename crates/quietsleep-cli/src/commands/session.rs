//! `session run` drives the controller in real time; `session simulate`
//! drives it on a virtual clock. Both print one JSON event per line.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use quietsleep_core::rhythm;
use quietsleep_core::{
    AudioSink, Config, ControllerSettings, Event, Language, NoiseKind, NoiseRequest,
    RecordingSink, Rhythm, SessionController, SessionOptions,
};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a session in real time until Ctrl-C, timer expiry or --seconds
    Run {
        #[command(flatten)]
        opts: SessionArgs,
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Run a session on a virtual clock and print every event
    Simulate {
        #[command(flatten)]
        opts: SessionArgs,
        /// Virtual seconds to advance
        #[arg(long, default_value = "60")]
        seconds: u64,
        /// Print a state snapshot before stopping
        #[arg(long)]
        snapshot: bool,
    },
}

/// Overrides on top of the saved preferences.
#[derive(Args)]
pub struct SessionArgs {
    /// Preset id (box, 478, relax) or inhale-hold-exhale seconds, e.g. 4-7-8
    #[arg(long, value_parser = parse_rhythm)]
    rhythm: Option<Rhythm>,
    /// Background noise kind
    #[arg(long)]
    noise: Option<NoiseKind>,
    /// Disable background noise
    #[arg(long, conflicts_with = "noise")]
    no_noise: bool,
    /// Noise volume in [0, 1]
    #[arg(long)]
    volume: Option<f32>,
    /// Sleep timer in minutes
    #[arg(long)]
    timer: Option<u32>,
    /// Enable spoken breath guidance
    #[arg(long)]
    guide: bool,
    /// Disable spoken breath guidance
    #[arg(long, conflicts_with = "guide")]
    no_guide: bool,
    /// Cue language (en, zh)
    #[arg(long)]
    language: Option<Language>,
    /// Directory holding the audio/ assets
    #[arg(long)]
    asset_root: Option<PathBuf>,
    /// Report missing asset files as audio warnings
    #[arg(long)]
    verify_assets: bool,
    /// Fixed noise seed
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_rhythm(s: &str) -> Result<Rhythm, String> {
    if let Some(p) = rhythm::preset(s) {
        return Ok(p.rhythm);
    }
    s.parse::<Rhythm>().map_err(|e| e.to_string())
}

impl SessionArgs {
    fn resolve(&self, config: &Config) -> (SessionOptions, ControllerSettings) {
        let mut options = config.session_options();
        let mut settings = config.controller_settings();

        if let Some(r) = self.rhythm {
            options.rhythm = r;
        }
        let volume = self
            .volume
            .unwrap_or(config.preferences.volume as f32);
        if self.no_noise {
            options.noise = None;
        } else if let Some(kind) = self.noise {
            options.noise = Some(NoiseRequest::new(kind, volume));
        } else if let Some(noise) = options.noise.as_mut() {
            *noise = NoiseRequest::new(noise.kind, volume);
        }
        if let Some(minutes) = self.timer {
            options.timer_minutes = Some(minutes);
        }
        if self.guide {
            options.guide_enabled = true;
        }
        if self.no_guide {
            options.guide_enabled = false;
        }
        if let Some(language) = self.language {
            options.language = language;
        }
        if let Some(root) = &self.asset_root {
            settings.asset_root = root.clone();
        }
        settings.noise_seed = self.seed;
        (options, settings)
    }

    fn sink(&self) -> RecordingSink {
        if self.verify_assets {
            RecordingSink::verifying_files()
        } else {
            RecordingSink::new()
        }
    }
}

fn emit(events: Vec<Event>) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    match action {
        SessionAction::Run { opts, seconds } => {
            let (options, settings) = opts.resolve(&config);
            let controller = SessionController::new(opts.sink(), settings);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_realtime(controller, options, seconds))
        }
        SessionAction::Simulate {
            opts,
            seconds,
            snapshot,
        } => {
            let (options, settings) = opts.resolve(&config);
            let mut controller = SessionController::new(opts.sink(), settings);
            emit(controller.start(options)?)?;
            emit(controller.advance(seconds.saturating_mul(1_000)))?;
            if snapshot {
                emit(vec![controller.snapshot()])?;
            }
            emit(controller.stop())
        }
    }
}

/// Sleep until the next timer deadline, advance to it, repeat. Ctrl-C and
/// the optional time limit both end in `stop()`.
async fn run_realtime<S: AudioSink>(
    mut controller: SessionController<S>,
    options: SessionOptions,
    limit_secs: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let origin = tokio::time::Instant::now();
    let limit_ms = limit_secs.map(|s| s.saturating_mul(1_000));
    emit(controller.start(options)?)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while controller.is_running() {
        let next = match (controller.next_deadline_ms(), limit_ms) {
            (Some(deadline), Some(limit)) => Some(deadline.min(limit)),
            (deadline, limit) => deadline.or(limit),
        };
        let wait = async {
            match next {
                Some(ms) => tokio::time::sleep_until(origin + Duration::from_millis(ms)).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("received Ctrl-C, stopping session");
                break;
            }
            _ = wait => {
                let Some(ms) = next else { continue };
                emit(controller.advance_to(ms))?;
                if limit_ms.is_some_and(|limit| ms >= limit) {
                    break;
                }
            }
        }
    }

    emit(controller.stop())
}

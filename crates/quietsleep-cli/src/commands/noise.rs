use std::path::PathBuf;

use clap::Subcommand;
use quietsleep_core::noise::{write_wav, DEFAULT_SAMPLE_RATE};
use quietsleep_core::{NoiseKind, NoiseSynthesizer};

#[derive(Subcommand)]
pub enum NoiseAction {
    /// Render synthesised noise to a WAV file
    Render {
        /// Noise kind (white or pink)
        #[arg(long, default_value = "pink")]
        kind: NoiseKind,
        /// Length in seconds
        #[arg(long, default_value = "2")]
        seconds: f32,
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,
        /// Fixed RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Output path
        #[arg(long, short)]
        out: PathBuf,
    },
    /// List noise kinds
    List,
}

pub fn run(action: NoiseAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        NoiseAction::Render {
            kind,
            seconds,
            sample_rate,
            seed,
            out,
        } => {
            if !(seconds > 0.0 && seconds.is_finite()) {
                return Err(format!("seconds must be positive (got {seconds})").into());
            }
            let buffer = NoiseSynthesizer::new(seed)
                .render(kind, sample_rate, seconds)
                .ok_or_else(|| format!("{} is a recorded track, not synthesised", kind.as_str()))??;
            write_wav(&buffer, &out)?;
            println!(
                "{}",
                serde_json::json!({
                    "path": out,
                    "kind": kind,
                    "sample_rate": buffer.sample_rate,
                    "samples": buffer.samples.len(),
                })
            );
        }
        NoiseAction::List => {
            for kind in NoiseKind::ALL {
                match kind.track_path() {
                    Some(path) => println!("{:<13} {path}", kind.as_str()),
                    None => println!("{:<13} synthesised", kind.as_str()),
                }
            }
        }
    }
    Ok(())
}

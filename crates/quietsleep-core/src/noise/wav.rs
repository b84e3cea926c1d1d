//! WAV export of synthesised noise.

use std::path::Path;

use super::{NoiseBuffer, NoiseKind};
use crate::error::SynthesisError;

/// Write `buffer` as 32-bit float mono WAV.
pub fn write_wav(buffer: &NoiseBuffer, path: &Path) -> Result<(), SynthesisError> {
    let wav_err = |e: hound::Error| SynthesisError::Wav {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(wav_err)?;
    for sample in &buffer.samples {
        writer.write_sample(*sample).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)?;
    tracing::info!(
        path = %path.display(),
        kind = buffer.kind.as_str(),
        samples = buffer.samples.len(),
        "wrote noise buffer"
    );
    Ok(())
}

/// Read back a float mono WAV written by [`write_wav`].
pub fn read_wav(path: &Path, kind: NoiseKind) -> Result<NoiseBuffer, SynthesisError> {
    let wav_err = |e: hound::Error| SynthesisError::Wav {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut reader = hound::WavReader::open(path).map_err(wav_err)?;
    let sample_rate = reader.spec().sample_rate;
    let samples = reader
        .samples::<f32>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(wav_err)?;
    Ok(NoiseBuffer {
        kind,
        sample_rate,
        samples,
    })
}

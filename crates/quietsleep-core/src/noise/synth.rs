//! White and pink noise synthesis.
//!
//! Buffers are meant to be looped by the playback layer. The loop seam is
//! not smoothed.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::NoiseKind;
use crate::error::SynthesisError;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_BUFFER_SECS: f32 = 2.0;

/// Post-filter gain that keeps pink output clear of clipping.
const PINK_GAIN: f32 = 0.11;

/// A synthesised mono block ready to loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseBuffer {
    pub kind: NoiseKind,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl NoiseBuffer {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Number of samples covering `seconds` at `sample_rate`.
pub fn buffer_len(sample_rate: u32, seconds: f32) -> usize {
    (sample_rate as f64 * seconds.max(0.0) as f64).round() as usize
}

pub struct NoiseSynthesizer {
    rng: Mcg128Xsl64,
}

impl NoiseSynthesizer {
    /// Seeded synthesizers repeat their output; `None` draws from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self { rng }
    }

    pub fn with_rng(rng: Mcg128Xsl64) -> Self {
        Self { rng }
    }

    /// Independent uniform samples in `[-1, 1]`.
    pub fn generate_white(&mut self, sample_count: usize) -> Result<Vec<f32>, SynthesisError> {
        let mut out = alloc(sample_count)?;
        out.extend((0..sample_count).map(|_| self.white()));
        Ok(out)
    }

    /// Paul Kellet's refined pink filter over a fresh white stream.
    ///
    /// `b6` enters the sum one sample late: it is added from the previous
    /// iteration and only then overwritten from the current white sample.
    pub fn generate_pink(&mut self, sample_count: usize) -> Result<Vec<f32>, SynthesisError> {
        let mut out = alloc(sample_count)?;
        let (mut b0, mut b1, mut b2, mut b3, mut b4, mut b5, mut b6) =
            (0.0f32, 0.0f32, 0.0f32, 0.0f32, 0.0f32, 0.0f32, 0.0f32);

        for _ in 0..sample_count {
            let white = self.white();
            b0 = 0.99886 * b0 + white * 0.0555179;
            b1 = 0.99332 * b1 + white * 0.0750759;
            b2 = 0.96900 * b2 + white * 0.1538520;
            b3 = 0.86650 * b3 + white * 0.3104856;
            b4 = 0.55000 * b4 + white * 0.5329522;
            b5 = -0.7616 * b5 - white * 0.0168980;
            let pink = b0 + b1 + b2 + b3 + b4 + b5 + b6 + white * 0.5362;
            b6 = white * 0.115926;
            out.push(pink * PINK_GAIN);
        }
        Ok(out)
    }

    /// Synthesise a loop buffer for `kind`. Returns `None` for kinds that
    /// are pre-recorded tracks.
    pub fn render(
        &mut self,
        kind: NoiseKind,
        sample_rate: u32,
        seconds: f32,
    ) -> Option<Result<NoiseBuffer, SynthesisError>> {
        let len = buffer_len(sample_rate, seconds);
        let samples = match kind {
            NoiseKind::White => self.generate_white(len),
            NoiseKind::Pink => self.generate_pink(len),
            _ => return None,
        };
        Some(samples.map(|samples| NoiseBuffer {
            kind,
            sample_rate,
            samples,
        }))
    }

    fn white(&mut self) -> f32 {
        self.rng.gen_range(-1.0f32..=1.0)
    }
}

impl Default for NoiseSynthesizer {
    fn default() -> Self {
        Self::new(None)
    }
}

fn alloc(samples: usize) -> Result<Vec<f32>, SynthesisError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(samples)
        .map_err(|_| SynthesisError::BufferTooLarge { samples })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_bounded_and_centred() {
        let mut synth = NoiseSynthesizer::new(Some(1));
        let samples = synth.generate_white(65_536).unwrap();
        assert_eq!(samples.len(), 65_536);
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
        let mean = samples.iter().map(|s| *s as f64).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.02, "mean was {mean}");
    }

    #[test]
    fn pink_matches_reference_recursion() {
        let rng = Mcg128Xsl64::seed_from_u64(7);
        let mut reference = rng.clone();
        let mut synth = NoiseSynthesizer::with_rng(rng);
        let got = synth.generate_pink(64).unwrap();

        let mut b = [0.0f32; 7];
        for (i, sample) in got.iter().enumerate() {
            let white: f32 = reference.gen_range(-1.0f32..=1.0);
            b[0] = 0.99886 * b[0] + white * 0.0555179;
            b[1] = 0.99332 * b[1] + white * 0.0750759;
            b[2] = 0.96900 * b[2] + white * 0.1538520;
            b[3] = 0.86650 * b[3] + white * 0.3104856;
            b[4] = 0.55000 * b[4] + white * 0.5329522;
            b[5] = -0.7616 * b[5] - white * 0.0168980;
            let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
            b[6] = white * 0.115926;
            assert_eq!(*sample, pink * 0.11, "sample {i} diverged");
        }
    }

    #[test]
    fn first_pink_sample_has_no_b6_contribution() {
        let rng = Mcg128Xsl64::seed_from_u64(3);
        let mut reference = rng.clone();
        let mut synth = NoiseSynthesizer::with_rng(rng);
        let first = synth.generate_pink(1).unwrap()[0];

        let white: f32 = reference.gen_range(-1.0f32..=1.0);
        let taps = 0.0555179 + 0.0750759 + 0.1538520 + 0.3104856 + 0.5329522 - 0.0168980;
        let expected = (white * taps + white * 0.5362) * 0.11;
        assert!((first - expected).abs() < 1e-6);
    }

    #[test]
    fn filter_state_resets_between_calls() {
        let mut a = NoiseSynthesizer::new(Some(11));
        let mut b = NoiseSynthesizer::new(Some(11));
        let _ = a.generate_pink(100).unwrap();
        // Same RNG position, so only leftover filter state could differ.
        let _ = b.generate_white(100).unwrap();
        assert_eq!(a.generate_pink(32).unwrap(), b.generate_pink(32).unwrap());
    }

    #[test]
    fn huge_buffers_fail_without_panicking() {
        let mut synth = NoiseSynthesizer::new(Some(0));
        let err = synth.generate_white(usize::MAX).unwrap_err();
        assert!(matches!(err, SynthesisError::BufferTooLarge { samples } if samples == usize::MAX));
    }

    #[test]
    fn render_covers_requested_duration() {
        let mut synth = NoiseSynthesizer::new(Some(5));
        let buf = synth
            .render(NoiseKind::Pink, DEFAULT_SAMPLE_RATE, DEFAULT_BUFFER_SECS)
            .unwrap()
            .unwrap();
        assert_eq!(buf.samples.len(), 88_200);
        assert!((buf.duration_secs() - 2.0).abs() < 1e-6);
        assert!(synth.render(NoiseKind::Rain, DEFAULT_SAMPLE_RATE, 2.0).is_none());
    }
}

//! Test-sound fixtures
//!
//! Six short reference sounds used to exercise the pipeline by ear and in
//! tests. Noise-based fixtures draw from a seeded RNG so the set is
//! reproducible.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dsp::standard_normal;
use crate::engine::buffer::AudioBuffer;
use crate::engine::io::write_wav;
use crate::error::Result;

/// Length of every fixture
pub const FIXTURE_DURATION_SECS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    /// Clean 55 Hz sine at 0.5
    SubBass,
    /// Two detuned saws, soft clipped
    GrittyBass,
    /// Smoothed noise under a rising envelope
    WarmPad,
    /// 440 Hz sine with exponential decay
    Pluck,
    /// 200-sample linear ramp down from 1.0
    Hit,
    /// Hann-windowed noise bursts every 300 ms
    VocalChop,
}

impl Fixture {
    pub const ALL: [Fixture; 6] = [
        Fixture::SubBass,
        Fixture::GrittyBass,
        Fixture::WarmPad,
        Fixture::Pluck,
        Fixture::Hit,
        Fixture::VocalChop,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Fixture::SubBass => "sub_bass",
            Fixture::GrittyBass => "gritty_bass",
            Fixture::WarmPad => "warm_pad",
            Fixture::Pluck => "pluck",
            Fixture::Hit => "hit",
            Fixture::VocalChop => "vocal_chop",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.wav", self.name())
    }

    /// Synthesise this fixture
    pub fn generate<R: Rng + ?Sized>(&self, sample_rate: u32, rng: &mut R) -> AudioBuffer {
        let sr = sample_rate as f64;
        let n = (sr * FIXTURE_DURATION_SECS) as usize;
        let t = |i: usize| i as f64 / sr;

        let samples: Vec<f64> = match self {
            Fixture::SubBass => (0..n).map(|i| 0.5 * (2.0 * PI * 55.0 * t(i)).sin()).collect(),
            Fixture::GrittyBass => (0..n)
                .map(|i| {
                    let mix = 0.25 * saw(t(i) * 100.0) + 0.25 * saw(t(i) * 101.0);
                    (mix * 3.0).tanh()
                })
                .collect(),
            Fixture::WarmPad => {
                let enveloped: Vec<f64> = (0..n)
                    .map(|i| {
                        let env = if n > 1 { (i as f64 / (n - 1) as f64).powf(0.6) } else { 0.0 };
                        0.2 * standard_normal(rng) * env
                    })
                    .collect();
                moving_average_same(&enveloped, 500)
            }
            Fixture::Pluck => (0..n)
                .map(|i| (2.0 * PI * 440.0 * t(i)).sin() * (-6.0 * t(i)).exp())
                .collect(),
            Fixture::Hit => (0..n)
                .map(|i| if i < 200 { 1.0 - i as f64 / 199.0 } else { 0.0 })
                .collect(),
            Fixture::VocalChop => {
                let mut out = vec![0.0; n];
                let burst = 300;
                for k in 0..6 {
                    let start = (k as f64 * sr * 0.3) as usize;
                    let end = start + burst;
                    if end < n {
                        for (j, sample) in out[start..end].iter_mut().enumerate() {
                            *sample += 0.6 * standard_normal(rng) * hann(j, burst);
                        }
                    }
                }
                out
            }
        };

        AudioBuffer::new(samples.into_iter().map(|s| s as f32).collect(), sample_rate)
    }
}

/// Bipolar sawtooth in [-1, 1) for phase `x` in cycles
fn saw(x: f64) -> f64 {
    2.0 * (x - (0.5 + x).floor())
}

/// Symmetric Hann window value at `j` of `len`
fn hann(j: usize, len: usize) -> f64 {
    if len < 2 {
        return 1.0;
    }
    0.5 - 0.5 * (2.0 * PI * j as f64 / (len - 1) as f64).cos()
}

/// Box-filter smoothing, output centred and the same length as the input
fn moving_average_same(input: &[f64], width: usize) -> Vec<f64> {
    let n = input.len();
    let mut prefix = vec![0.0; n + 1];
    for (i, x) in input.iter().enumerate() {
        prefix[i + 1] = prefix[i] + x;
    }
    let back = width / 2;
    let forward = width - back;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(back);
            let hi = (i + forward).min(n);
            (prefix[hi] - prefix[lo]) / width as f64
        })
        .collect()
}

/// Generate every fixture with one seeded RNG
pub fn generate_all(sample_rate: u32, seed: u64) -> Vec<(Fixture, AudioBuffer)> {
    let mut rng = StdRng::seed_from_u64(seed);
    Fixture::ALL
        .iter()
        .map(|f| (*f, f.generate(sample_rate, &mut rng)))
        .collect()
}

/// Write every fixture as `<name>.wav` into `dir`
pub fn write_fixtures(dir: &Path, sample_rate: u32, seed: u64) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(Fixture::ALL.len());
    for (fixture, buffer) in generate_all(sample_rate, seed) {
        let path = dir.join(fixture.file_name());
        write_wav(&buffer, &path)?;
        written.push(path);
    }
    info!("Wrote {} fixtures to {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_all_fixtures_two_seconds() {
        for (fixture, buffer) in generate_all(22050, 7) {
            assert_eq!(buffer.len(), 44100, "{}", fixture.name());
            assert!(buffer.is_finite(), "{}", fixture.name());
        }
    }

    #[test]
    fn test_sub_bass_level() {
        let mut rng = StdRng::seed_from_u64(0);
        let buffer = Fixture::SubBass.generate(22050, &mut rng);
        assert_relative_eq!(buffer.peak(), 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_hit_ramp() {
        let mut rng = StdRng::seed_from_u64(0);
        let buffer = Fixture::Hit.generate(22050, &mut rng);
        assert_eq!(buffer.samples()[0], 1.0);
        assert_eq!(buffer.samples()[199], 0.0);
        assert_eq!(buffer.samples()[1000], 0.0);
    }

    #[test]
    fn test_seeded_generation_reproducible() {
        let a = generate_all(22050, 11);
        let b = generate_all(22050, 11);
        for ((_, x), (_, y)) in a.iter().zip(b.iter()) {
            assert!(x.is_identical_to(y));
        }
    }

    #[test]
    fn test_saw_range() {
        assert_relative_eq!(saw(0.0), 0.0);
        assert_relative_eq!(saw(0.25), 0.5);
        assert_relative_eq!(saw(0.75), -0.5);
    }

    #[test]
    fn test_moving_average_constant() {
        let smoothed = moving_average_same(&[1.0; 2000], 500);
        assert_relative_eq!(smoothed[1000], 1.0, epsilon = 1e-12);
        assert!(smoothed[0] < 1.0);
    }

    #[test]
    fn test_write_fixtures() {
        let dir = TempDir::new().unwrap();
        let written = write_fixtures(dir.path(), 8000, 7).unwrap();
        assert_eq!(written.len(), 6);
        assert!(dir.path().join("vocal_chop.wav").exists());
    }
}

//! Render entry point
//!
//! Load, run the fixed effect chain, write. Parameters are clamped and the
//! default patch substituted here as well, so the engine is safe to call
//! without going through the gateway.

use std::path::{Path, PathBuf};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::RenderSettings;
use crate::dsp::EffectChain;
use crate::engine::buffer::AudioBuffer;
use crate::engine::io::{load_mono, write_wav};
use crate::error::Result;
use crate::patch::ParameterSet;

/// Result of a successful render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// File written
    pub path: PathBuf,
    /// Parameters actually applied, after clamping and fallback
    pub params: ParameterSet,
}

/// Render `input` through `params` into `output`
///
/// Noise draws from a `StdRng` seeded with `seed`, or from entropy when no
/// seed is given.
pub fn render(
    input: &Path,
    output: &Path,
    params: &ParameterSet,
    settings: &RenderSettings,
    seed: Option<u64>,
) -> Result<RenderOutput> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    render_with_rng(input, output, params, settings, &mut rng)
}

/// Render with a caller-supplied random source
pub fn render_with_rng<R: RngCore + Send>(
    input: &Path,
    output: &Path,
    params: &ParameterSet,
    settings: &RenderSettings,
    rng: &mut R,
) -> Result<RenderOutput> {
    let mut buffer = load_mono(input, settings.sample_rate)?;
    let applied = process_buffer(&mut buffer, params, settings.mix_ratio, rng)?;
    write_wav(&buffer, output)?;

    info!(
        "Rendered {} -> {} [{}]",
        input.display(),
        output.display(),
        applied.enabled_stages().join(", ")
    );

    Ok(RenderOutput {
        path: output.to_path_buf(),
        params: applied,
    })
}

/// Run the effect chain over an in-memory buffer
///
/// Returns the parameter set actually applied.
pub fn process_buffer<R: RngCore + Send>(
    buffer: &mut AudioBuffer,
    params: &ParameterSet,
    mix_ratio: f32,
    rng: &mut R,
) -> Result<ParameterSet> {
    let applied = params.effective(buffer.sample_rate());
    let mut chain = EffectChain::for_patch(&applied, mix_ratio, buffer.sample_rate(), rng);
    debug!(
        "Effect chain [{}]: {}",
        chain.stage_names().join(" -> "),
        chain.to_json()
    );
    chain.process(buffer)?;
    Ok(applied)
}

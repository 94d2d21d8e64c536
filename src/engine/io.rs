//! Audio file I/O for Patchbay
//!
//! Loading decodes any common format to mono f32 and resamples it to the
//! render rate. WAV goes through hound; everything else (MP3, FLAC,
//! OGG/Vorbis, AAC/M4A) goes through symphonia. Channels are averaged.
//!
//! Output is always a mono 32-bit float WAV.

use std::fs::File;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::engine::buffer::AudioBuffer;
use crate::error::{PatchbayError, Result};

/// Load an audio file as mono at `target_sample_rate`
///
/// # Errors
/// * `FileNotFound` - the path does not exist
/// * `InvalidAudio` / `UnsupportedFormat` - the file cannot be decoded
/// * `EmptyAudio` - the file decodes to zero samples
/// * `ResampleError` - sample rate conversion failed
pub fn load_mono(path: &Path, target_sample_rate: u32) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(PatchbayError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let (samples, source_rate) = if has_extension(path, "wav") {
        decode_wav(path)?
    } else {
        decode_with_symphonia(path)?
    };

    if samples.is_empty() {
        return Err(PatchbayError::EmptyAudio);
    }

    let samples = resample(samples, source_rate, target_sample_rate)?;
    let buffer = AudioBuffer::new(samples, target_sample_rate);
    info!(
        "Loaded {} ({:.2}s, {} Hz -> {} Hz)",
        path.display(),
        buffer.duration(),
        source_rate,
        target_sample_rate
    );
    Ok(buffer)
}

/// Write a buffer as a mono 32-bit float WAV, creating parent directories
pub fn write_wav(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    if !has_extension(path, "wav") {
        return Err(PatchbayError::UnsupportedFormat {
            format: format!(
                "output must be .wav, got {}",
                path.extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "no extension".to_string())
            ),
        });
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let write_err = |source: hound::Error| PatchbayError::AudioWriteError {
        path: path.display().to_string(),
        source,
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_err)?;
    for &sample in buffer.samples() {
        writer.write_sample(sample).map_err(write_err)?;
    }
    writer.finalize().map_err(write_err)?;

    info!(
        "Wrote {} ({} samples @ {} Hz)",
        path.display(),
        buffer.len(),
        buffer.sample_rate()
    );
    Ok(())
}

/// Resample mono samples with a windowed-sinc resampler
///
/// The result holds `ceil(n * to / from)` samples. Equal rates return the
/// input unchanged.
pub fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples);
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(PatchbayError::ResampleError {
            reason: format!("invalid sample rates {} -> {}", from_rate, to_rate),
        });
    }

    let expected = resampled_len(samples.len(), from_rate, to_rate);
    let ratio = to_rate as f64 / from_rate as f64;
    debug!("Resampling {} -> {} Hz ({} -> {} samples)", from_rate, to_rate, samples.len(), expected);

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, samples.len(), 1)
        .map_err(resample_error)?;
    let delay = resampler.output_delay();

    let waves_in = vec![samples];
    let mut output = resampler
        .process(&waves_in, None)
        .map_err(resample_error)?
        .into_iter()
        .next()
        .unwrap_or_default();

    // Flush the filter tail until the delayed signal has fully emerged
    while output.len() < expected + delay {
        let tail = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(resample_error)?
            .into_iter()
            .next()
            .unwrap_or_default();
        if tail.is_empty() {
            break;
        }
        output.extend(tail);
    }

    let mut output: Vec<f32> = output.into_iter().skip(delay).collect();
    output.resize(expected, 0.0);
    Ok(output)
}

/// Output length for a rate conversion, rounded up
pub fn resampled_len(len: usize, from_rate: u32, to_rate: u32) -> usize {
    let num = len as u128 * to_rate as u128;
    let den = from_rate as u128;
    ((num + den - 1) / den) as usize
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn resample_error(e: impl std::fmt::Display) -> PatchbayError {
    PatchbayError::ResampleError {
        reason: e.to_string(),
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Decode a WAV file to mono f32
fn decode_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let reader = WavReader::open(path).map_err(|e| PatchbayError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;
    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    Ok((downmix(&interleaved, channels), spec.sample_rate))
}

/// Read samples from a WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let read_err = |e: hound::Error| PatchbayError::InvalidAudio {
        reason: format!("Failed to read {}-bit samples: {}", bits_per_sample, e),
        source: Some(Box::new(e)),
    };

    match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err),
        // 24-bit is stored as i32 in hound
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2147483648.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err),
        (SampleFormat::Int, bits) => Err(PatchbayError::UnsupportedFormat {
            format: format!("{}-bit integer audio", bits),
        }),
    }
}

/// Decode any symphonia-supported file to mono f32
fn decode_with_symphonia(path: &Path) -> Result<(Vec<f32>, u32)> {
    let invalid = |reason: String, e: SymphoniaError| PatchbayError::InvalidAudio {
        reason,
        source: Some(Box::new(e)),
    };

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| match e {
            SymphoniaError::Unsupported(what) => PatchbayError::UnsupportedFormat {
                format: format!("{}: {}", path.display(), what),
            },
            other => invalid(format!("Failed to probe {}", path.display()), other),
        })?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PatchbayError::InvalidAudio {
            reason: format!("{} has no audio track", path.display()),
            source: None,
        })?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| invalid("Failed to create decoder".to_string(), e))?;

    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(_)) => break,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(invalid("Failed to read packet".to_string(), e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(invalid("Failed to decode packet".to_string(), e)),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        let channels = spec.channels.count().max(1);

        let needs_alloc = sample_buf
            .as_ref()
            .map_or(true, |b| b.capacity() < decoded.capacity() * channels);
        if needs_alloc {
            sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        }
        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            samples.extend(downmix(buf.samples(), channels));
        }
    }

    let sample_rate = sample_rate.ok_or_else(|| PatchbayError::InvalidAudio {
        reason: format!("{} has an unknown sample rate", path.display()),
        source: None,
    })?;
    Ok((samples, sample_rate))
}

/// Average interleaved frames down to one channel
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

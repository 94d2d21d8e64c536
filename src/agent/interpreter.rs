//! Instruction interpreter
//!
//! Turns a free-text instruction ("sub bass at 80hz with drive=2.5") into a
//! bounded [`ParameterSet`] using keyword tables and fixed numeral patterns.
//! Pure: no randomness, no I/O, never fails.

use std::ops::Range;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::patch::{
    DelayParams, DistortionParams, NoiseParams, ParameterSet, SubSineParams, DEFAULT_DELAY_MS,
    DEFAULT_DRIVE, DEFAULT_FEEDBACK, DEFAULT_NOISE_AMP, DEFAULT_SUB_FREQ_HZ,
};

/// Sub-sine amplitude used when the layer comes from a keyword
pub const KEYWORD_SUB_AMP: f64 = 0.45;

/// Sub-layer lowpass when "lowpass" has no numeral
pub const DEFAULT_SUB_LOWPASS_HZ: f64 = 120.0;

/// Global lowpass when "lowpass" has no numeral
pub const DEFAULT_GLOBAL_LOWPASS_HZ: f64 = 8000.0;

/// Global highpass when "highpass" has no numeral
pub const DEFAULT_GLOBAL_HIGHPASS_HZ: f64 = 20.0;

const SUB_KEYWORDS: &[&str] = &["sub", "one octave", "octave below"];
const DISTORTION_KEYWORDS: &[&str] = &["distort", "distortion", "drive"];
const NOISE_KEYWORDS: &[&str] = &["noise"];
const DELAY_KEYWORDS: &[&str] = &["delay", "echo"];
const LOWPASS_KEYWORDS: &[&str] = &["lowpass", "low-pass", "low pass"];
const HIGHPASS_KEYWORDS: &[&str] = &["highpass", "high-pass", "high pass"];

static HZ_RE: Lazy<Regex> = Lazy::new(|| compile(r"\b(\d+(?:\.\d+)?)\s*hz\b"));

static LOWPASS_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"low[\s-]?pass(?:\s+filter)?\s*(?:at|@|=|:|to)?\s*(\d+(?:\.\d+)?)\s*(khz|hz)?")
});

static HIGHPASS_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"high[\s-]?pass(?:\s+filter)?\s*(?:at|@|=|:|to)?\s*(\d+(?:\.\d+)?)\s*(khz|hz)?")
});

static DRIVE_RE: Lazy<Regex> = Lazy::new(|| compile(r"drive\s*[=:]?\s*(\d+(?:\.\d+)?)"));

static NOISE_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"noise\s*(?:amp)?\s*[=:]?\s*(\d*\.\d+|\d+)"));

static MS_RE: Lazy<Regex> = Lazy::new(|| compile(r"\b(\d+(?:\.\d+)?)\s*ms\b"));

static FEEDBACK_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"feedback\s*[=:]?\s*(\d*\.\d+|\d+)"));

/// Patterns are literals; a failure here is a programming error caught by tests
fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("invalid interpreter pattern {pattern:?}: {e}"),
    }
}

/// Derive a parameter set from instruction text
///
/// Each keyword family switches on one stage; numerals are taken from the
/// first matching pattern. Text with no recognised keyword yields the
/// default patch. The result is already clamped for `sample_rate`.
pub fn interpret(text: &str, sample_rate: u32) -> ParameterSet {
    let lower = text.to_lowercase();
    let mut params = ParameterSet::default();

    let has_sub = contains_any(&lower, SUB_KEYWORDS);
    let has_lowpass = contains_any(&lower, LOWPASS_KEYWORDS);
    let has_highpass = contains_any(&lower, HIGHPASS_KEYWORDS);

    if has_sub {
        let freq_hz = sub_frequency(&lower).unwrap_or(DEFAULT_SUB_FREQ_HZ);
        let mut sub = SubSineParams::enabled(freq_hz, KEYWORD_SUB_AMP);
        if has_lowpass {
            sub.lowpass_cutoff = Some(filter_cutoff(&LOWPASS_RE, &lower).unwrap_or(DEFAULT_SUB_LOWPASS_HZ));
        }
        params.sub_sine = Some(sub);
    }

    if contains_any(&lower, DISTORTION_KEYWORDS) {
        let drive = first_number(&DRIVE_RE, &lower).unwrap_or(DEFAULT_DRIVE);
        params.distortion = Some(DistortionParams::enabled(drive));
    }

    if contains_any(&lower, NOISE_KEYWORDS) {
        let amp = first_number(&NOISE_RE, &lower).unwrap_or(DEFAULT_NOISE_AMP);
        params.noise = Some(NoiseParams::enabled(amp));
    }

    if contains_any(&lower, DELAY_KEYWORDS) {
        let ms = first_number(&MS_RE, &lower)
            .map(crate::patch::clamp_delay_ms)
            .unwrap_or(DEFAULT_DELAY_MS);
        let feedback = first_number(&FEEDBACK_RE, &lower).unwrap_or(DEFAULT_FEEDBACK);
        params.delay = Some(DelayParams::enabled(ms, feedback));
    }

    // Only the literal word suppresses the global lowpass; "octave below" does not
    if has_lowpass && !lower.contains("sub") {
        params.global_lowpass =
            Some(filter_cutoff(&LOWPASS_RE, &lower).unwrap_or(DEFAULT_GLOBAL_LOWPASS_HZ));
    }

    if has_highpass {
        params.global_highpass =
            Some(filter_cutoff(&HIGHPASS_RE, &lower).unwrap_or(DEFAULT_GLOBAL_HIGHPASS_HZ));
    }

    let params = params.effective(sample_rate);
    debug!("Interpreted {:?} -> stages {:?}", text, params.enabled_stages());
    params
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn first_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Cutoff numeral anchored to a filter keyword, honouring a "khz" unit
fn filter_cutoff(re: &Regex, text: &str) -> Option<f64> {
    let caps = re.captures(text)?;
    let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
    match caps.get(2).map(|m| m.as_str()) {
        Some("khz") => Some(value * 1000.0),
        _ => Some(value),
    }
}

/// First "NNhz" numeral that is not part of a filter phrase
fn sub_frequency(text: &str) -> Option<f64> {
    let filter_spans: Vec<Range<usize>> = LOWPASS_RE
        .find_iter(text)
        .chain(HIGHPASS_RE.find_iter(text))
        .map(|m| m.range())
        .collect();

    HZ_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find(|m| !filter_spans.iter().any(|span| span.contains(&m.start())))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

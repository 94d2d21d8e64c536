//! Interpreter Tests
//!
//! Free-text instructions to parameter sets, as a planner would send them.

use patchbay::agent::{interpret, KEYWORD_SUB_AMP};
use patchbay::patch::{
    DelayParams, DistortionParams, NoiseParams, ParameterSet, SubSineParams,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test]
fn test_sub_bass_with_drive() {
    let params = interpret("sub bass at 80hz with distortion drive=2.5", 22050);
    assert_eq!(
        params,
        ParameterSet {
            sub_sine: Some(SubSineParams::enabled(80.0, KEYWORD_SUB_AMP)),
            distortion: Some(DistortionParams::enabled(2.5)),
            ..Default::default()
        }
    );
}

#[test]
fn test_empty_is_default_patch() {
    let params = interpret("", 22050);
    let sub = params.sub_sine.as_ref().unwrap();
    assert!(sub.enabled);
    assert_eq!(sub.freq_hz, 55.0);
    assert_eq!(sub.amp, 0.4);
    assert_eq!(params.enabled_stages(), vec!["sub_sine"]);
}

#[test]
fn test_everything_at_once() {
    let params = interpret(
        "Add a sub one octave below at 41hz, lowpass 90hz, some noise amp=0.03, \
         drive: 1.8 and a 250ms echo with feedback=0.35, plus highpass 25hz",
        44100,
    );
    assert_eq!(
        params,
        ParameterSet {
            sub_sine: Some(SubSineParams {
                enabled: true,
                freq_hz: 41.0,
                amp: KEYWORD_SUB_AMP,
                lowpass_cutoff: Some(90.0),
            }),
            noise: Some(NoiseParams::enabled(0.03)),
            distortion: Some(DistortionParams::enabled(1.8)),
            delay: Some(DelayParams::enabled(250, 0.35)),
            global_lowpass: None,
            global_highpass: Some(25.0),
        }
    );
}

#[test_case("echo" ; "echo keyword")]
#[test_case("tape delay" ; "delay keyword")]
fn test_delay_keywords(text: &str) {
    let delay = interpret(text, 22050).delay.unwrap();
    assert_eq!(delay, DelayParams::enabled(60, 0.15));
}

#[test_case("distort it", 1.0 ; "distort default")]
#[test_case("more drive=3", 3.0 ; "drive equals")]
#[test_case("drive: 0.7", 0.7 ; "drive colon")]
fn test_drive_values(text: &str, expected: f64) {
    assert_eq!(interpret(text, 22050).distortion.unwrap().drive, expected);
}

#[test]
fn test_first_numeral_wins() {
    let params = interpret("echo 90ms then 300ms, feedback=0.2 feedback=0.6", 22050);
    assert_eq!(params.delay.unwrap(), DelayParams::enabled(90, 0.2));
}

#[test]
fn test_sub_frequency_limited_by_nyquist() {
    let freq_hz = interpret("sub at 9000hz", 8000).sub_sine.unwrap().freq_hz;
    assert!(freq_hz < 4000.0);
    assert!((freq_hz - 3996.0).abs() < 1e-9);
}

#[test]
fn test_octave_phrase_sets_both_lowpasses() {
    let params = interpret("one octave below with a lowpass 300hz", 22050);
    assert_eq!(params.sub_sine.as_ref().unwrap().lowpass_cutoff, Some(300.0));
    assert_eq!(params.global_lowpass, Some(300.0));
    assert_eq!(
        params.enabled_stages(),
        vec!["sub_sine", "global_lowpass"]
    );
}

#[test_case("drive=25", 25.0 ; "drive above typical range")]
#[test_case("drive=0.2", 0.2 ; "light drive")]
fn test_drive_not_capped(text: &str, expected: f64) {
    assert_eq!(interpret(text, 22050).distortion.unwrap().drive, expected);
}

#[test]
fn test_global_lowpass_only_without_sub() {
    let params = interpret("darken it with a lowpass at 2500hz", 22050);
    assert_eq!(params.global_lowpass, Some(2500.0));
    assert!(params.sub_sine.is_none());
}

#[test]
fn test_deterministic() {
    let text = "sub 45hz, noise, delay 120ms feedback=0.3, highpass";
    let first = serde_json::to_string(&interpret(text, 22050)).unwrap();
    let second = serde_json::to_string(&interpret(text, 22050)).unwrap();
    assert_eq!(first, second);
}

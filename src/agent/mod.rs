//! Planner-facing helpers
//!
//! The planner itself is external. This module only turns its free-text
//! instructions into bounded parameters.

mod interpreter;

pub use interpreter::{
    interpret, DEFAULT_GLOBAL_HIGHPASS_HZ, DEFAULT_GLOBAL_LOWPASS_HZ, DEFAULT_SUB_LOWPASS_HZ,
    KEYWORD_SUB_AMP,
};

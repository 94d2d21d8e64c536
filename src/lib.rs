//! Patchbay - sandboxed audio patch rendering
//!
//! An external planner asks for an audio recording to be transformed, either
//! with free-text instructions or a structured parameter object. Patchbay
//! renders the request through a fixed, safety-validated effect chain.
//!
//! # Architecture
//!
//! - `agent`: instruction interpreter (text -> bounded `ParameterSet`)
//! - `gateway`: trust boundary (allow-list, path confinement, structured results)
//! - `engine` + `dsp`: load, fixed-order effect chain, write
//!
//! ```no_run
//! use std::path::Path;
//! use serde_json::json;
//!
//! let result = patchbay::gateway::execute(
//!     "apply_patch",
//!     &json!({"input_audio_path": "x", "out_path": "y", "instructions": "sub at 60hz"}),
//!     Path::new("uploads/take.wav"),
//!     Path::new("renders/take_sub.wav"),
//! );
//! println!("{}", result.to_json());
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod patch;

pub use config::RenderSettings;
pub use error::{ErrorKind, PatchbayError, Result};
pub use patch::ParameterSet;

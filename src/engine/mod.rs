//! Effect Chain Engine
//!
//! - Mono audio buffer
//! - File I/O (decode, resample, WAV export)
//! - Render entry point
//! - Reference test sounds

pub mod buffer;
pub mod fixtures;
pub mod io;
pub mod render;

pub use buffer::AudioBuffer;
pub use fixtures::{generate_all, write_fixtures, Fixture};
pub use io::{load_mono, resample, write_wav};
pub use render::{process_buffer, render, render_with_rng, RenderOutput};

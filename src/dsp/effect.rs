//! Effect trait definition
//!
//! Every pipeline stage implements [`Effect`]. Stages work in place on a
//! mono [`AudioBuffer`] and report their settings as JSON for logging.

use serde_json::Value;

use crate::engine::AudioBuffer;
use crate::error::Result;

/// One stage of the render pipeline
pub trait Effect: Send {
    /// Process the buffer in place
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()>;

    /// Clear any internal state (filter history and the like)
    fn reset(&mut self) {}

    /// Stable stage identifier, used in logs and overflow errors
    fn effect_type(&self) -> &'static str;

    /// Current settings as JSON
    fn get_params(&self) -> Value;
}

//! Error handling for Patchbay
//!
//! Every failure carries a stable error code and maps onto one of the
//! gateway-level error kinds. Out-of-range numerics are never errors; they
//! are clamped in `patch`.

use thiserror::Error;

/// Result type alias for Patchbay operations
pub type Result<T> = std::result::Result<T, PatchbayError>;

/// Coarse error taxonomy reported at the tool boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Requested operation is not on the allow-list
    UnsupportedFunction,
    /// A required path argument was absent
    MissingArgument,
    /// Envelope or argument has the wrong shape or type
    InvalidRequest,
    /// I/O, decode, resample or DSP failure during a render
    ProcessingFailure,
}

/// Main error type for Patchbay operations
#[derive(Error, Debug)]
pub enum PatchbayError {
    // Gateway Errors
    #[error("Function {function} not allowed.")]
    UnsupportedFunction { function: String },

    #[error("Unsupported tool: {tool}")]
    UnsupportedTool { tool: String },

    #[error("Missing required args: {names}")]
    MissingArgument { names: String },

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("{reason}")]
    MalformedToolCall { reason: String },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    #[error("Failed to write audio file: {path}")]
    AudioWriteError {
        path: String,
        #[source]
        source: hound::Error,
    },

    // Processing Errors
    #[error("Resampling failed: {reason}")]
    ResampleError { reason: String },

    #[error("DSP overflow: stage '{stage}' produced invalid audio (NaN/Inf)")]
    DspOverflow { stage: String },

    #[error("Internal error: {reason}")]
    Internal { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PatchbayError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            PatchbayError::UnsupportedFunction { .. } => "UNSUPPORTED_FUNCTION",
            PatchbayError::UnsupportedTool { .. } => "UNSUPPORTED_TOOL",
            PatchbayError::MissingArgument { .. } => "MISSING_ARGUMENT",
            PatchbayError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            PatchbayError::MalformedToolCall { .. } => "MALFORMED_TOOL_CALL",
            PatchbayError::FileNotFound { .. } => "FILE_NOT_FOUND",
            PatchbayError::InvalidAudio { .. } => "INVALID_AUDIO",
            PatchbayError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            PatchbayError::EmptyAudio => "EMPTY_AUDIO",
            PatchbayError::AudioWriteError { .. } => "AUDIO_WRITE_ERROR",
            PatchbayError::ResampleError { .. } => "RESAMPLE_ERROR",
            PatchbayError::DspOverflow { .. } => "DSP_OVERFLOW",
            PatchbayError::Internal { .. } => "INTERNAL_ERROR",
            PatchbayError::Io(_) => "IO_ERROR",
            PatchbayError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Classify this error for the tool boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            PatchbayError::UnsupportedFunction { .. } => ErrorKind::UnsupportedFunction,
            PatchbayError::MissingArgument { .. } => ErrorKind::MissingArgument,
            PatchbayError::UnsupportedTool { .. }
            | PatchbayError::InvalidArgument { .. }
            | PatchbayError::MalformedToolCall { .. }
            | PatchbayError::Serialization(_) => ErrorKind::InvalidRequest,
            _ => ErrorKind::ProcessingFailure,
        }
    }

    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::UnsupportedFunction { .. } => "Call one of the registered functions (apply_patch)",
            Self::UnsupportedTool { .. } => "Address the call to synthesis_tool",
            Self::MissingArgument { .. } => "Provide input_audio_path and out_path",
            Self::InvalidArgument { .. } => "Send numbers as JSON numbers and params as an object",
            Self::FileNotFound { .. } => "Check that the input file exists",
            Self::InvalidAudio { .. } | Self::UnsupportedFormat { .. } => {
                "Convert the input to WAV, FLAC, MP3 or OGG"
            }
            Self::EmptyAudio => "Supply a recording with at least one sample",
            Self::DspOverflow { .. } => "Reduce drive, feedback or amplitude settings",
            _ => "Check the error details and try again",
        }
    }
}

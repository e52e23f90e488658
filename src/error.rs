//! # Error Types
//!
//! This module defines all error types for the braille transcriber.
//!
//! The three transcription errors carry a [`Position`] (part, segment and
//! measure index) so callers can point the user at the offending event.
//! Lower layers (sign generation, segmentation) raise them with an empty
//! position; the transcriber fills in what it knows with [`BrailleError::at`].
//!
//! ## Error Types
//! - `MalformedTimeline` - structural precondition of the event timeline violated
//! - `UnsupportedNotation` - a known gap in the braille tables (e.g. the 4-tuplet sign)
//! - `InvariantViolation` - a value outside a closed set of kinds
//! - `OptionsError` - invalid configuration
//! - `TimelineError` - the timeline document could not be decoded
//! - `ExportError` - text that has no Braille ASCII form
//!
//! ## Usage
//! ```rust
//! use brlmusic::{transcribe_yaml, BrailleError, ErrorKind, Options};
//!
//! let source = "parts: []";
//! match transcribe_yaml(source, &Options::default()) {
//!     Ok(braille) => println!("{}", braille),
//!     Err(e) if e.kind() == ErrorKind::UnsupportedNotation => {
//!         eprintln!("Cannot express this in braille yet: {}", e);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Where in the score an error was raised. Indices are zero-based; they are
/// displayed one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub part: Option<usize>,
    pub segment: Option<usize>,
    pub measure: Option<usize>,
}

impl Position {
    pub fn part(part: usize) -> Self {
        Self {
            part: Some(part),
            ..Self::default()
        }
    }

    pub fn with_segment(self, segment: usize) -> Self {
        Self {
            segment: Some(segment),
            ..self
        }
    }

    pub fn with_measure(self, measure: usize) -> Self {
        Self {
            measure: Some(measure),
            ..self
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.part.is_none() && self.segment.is_none() && self.measure.is_none()
    }

    /// Fill every unset field from `outer`.
    fn merge(self, outer: Position) -> Self {
        Self {
            part: self.part.or(outer.part),
            segment: self.segment.or(outer.segment),
            measure: self.measure.or(outer.measure),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return write!(f, "unknown position");
        }
        let mut parts = Vec::new();
        if let Some(part) = self.part {
            parts.push(format!("part {}", part + 1));
        }
        if let Some(segment) = self.segment {
            parts.push(format!("segment {}", segment + 1));
        }
        if let Some(measure) = self.measure {
            parts.push(format!("measure {}", measure + 1));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// The kind of a [`BrailleError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedTimeline,
    UnsupportedNotation,
    InvariantViolation,
    Options,
    Timeline,
    Export,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrailleError {
    /// Structural precondition of the event timeline violated.
    ///
    /// Raised when an `EndBar` is not followed by a `StartBar`, or when the
    /// staff names of a segment do not fit its declared staff count. Fatal.
    ///
    /// # Example
    /// ```
    /// # use brlmusic::{BrailleError, Position};
    /// let err = BrailleError::MalformedTimeline {
    ///     position: Position::part(0).with_segment(1),
    ///     message: "expected a start bar after an end bar".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Malformed timeline at part 1, segment 2: expected a start bar after an end bar"
    /// );
    /// ```
    #[error("Malformed timeline at {position}: {message}")]
    MalformedTimeline { position: Position, message: String },

    /// A recognized value that the braille tables cannot express yet.
    ///
    /// Callers may degrade gracefully, see [`crate::UnsupportedPolicy`].
    #[error("Unsupported notation at {position}: {message}")]
    UnsupportedNotation { position: Position, message: String },

    /// An event carries a kind outside the closed set the sign catalog knows.
    #[error("Invariant violation at {position}: {message}")]
    InvariantViolation { position: Position, message: String },

    /// Invalid configuration.
    ///
    /// # Example
    /// ```
    /// # use brlmusic::BrailleError;
    /// let err = BrailleError::OptionsError("page-width must be at least 8".to_string());
    /// assert_eq!(err.to_string(), "Invalid options: page-width must be at least 8");
    /// ```
    #[error("Invalid options: {0}")]
    OptionsError(String),

    /// The timeline document could not be decoded.
    #[error("Invalid timeline document: {0}")]
    TimelineError(String),

    /// Transcribed text that cannot be written as Braille ASCII, such as a
    /// part name with accented letters.
    ///
    /// # Example
    /// ```
    /// # use brlmusic::BrailleError;
    /// let err = BrailleError::ExportError("line 1, column 4: 'û' has no BRF form".to_string());
    /// assert_eq!(err.to_string(), "Cannot export to BRF at line 1, column 4: 'û' has no BRF form");
    /// ```
    #[error("Cannot export to BRF at {0}")]
    ExportError(String),
}

impl BrailleError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTimeline {
            position: Position::default(),
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedNotation {
            position: Position::default(),
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            position: Position::default(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedTimeline { .. } => ErrorKind::MalformedTimeline,
            Self::UnsupportedNotation { .. } => ErrorKind::UnsupportedNotation,
            Self::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            Self::OptionsError(_) => ErrorKind::Options,
            Self::TimelineError(_) => ErrorKind::Timeline,
            Self::ExportError(_) => ErrorKind::Export,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Self::MalformedTimeline { position, .. }
            | Self::UnsupportedNotation { position, .. }
            | Self::InvariantViolation { position, .. } => Some(*position),
            Self::OptionsError(_) | Self::TimelineError(_) | Self::ExportError(_) => None,
        }
    }

    /// Attach location information. Fields already set by an inner layer win.
    pub fn at(self, outer: Position) -> Self {
        match self {
            Self::MalformedTimeline { position, message } => Self::MalformedTimeline {
                position: position.merge(outer),
                message,
            },
            Self::UnsupportedNotation { position, message } => Self::UnsupportedNotation {
                position: position.merge(outer),
                message,
            },
            Self::InvariantViolation { position, message } => Self::InvariantViolation {
                position: position.merge(outer),
                message,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, BrailleError>;

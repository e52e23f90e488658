pub mod braille;
pub mod error;
pub mod model;
pub mod options;
pub mod page;
pub mod segment;
pub mod timeline;
pub mod transcriber;

pub use error::*;
pub use model::Score;
pub use options::{Options, UnsupportedPolicy};
pub use transcriber::Transcriber;

/// Transcribe a score to paginated braille music.
/// This is the main entry point for the library.
pub fn transcribe(score: &Score, options: &Options) -> Result<String> {
    Transcriber::new(options.clone()).transcribe(score)
}

/// Load a YAML event timeline and transcribe it
pub fn transcribe_yaml(source: &str, options: &Options) -> Result<String> {
    let score = timeline::load(source)?;
    transcribe(&score, options)
}

/// Transcribe to Braille ASCII (BRF) instead of Unicode braille
pub fn transcribe_to_brf(score: &Score, options: &Options) -> Result<String> {
    braille::brf::to_brf(&transcribe(score, options)?)
}

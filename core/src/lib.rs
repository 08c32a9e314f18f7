//! Core of the Fluency conversation tutor: scenario catalog, transcript,
//! prompt building, correction extraction and the session state machine.

pub mod analysis;
pub mod corrections;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod render;
pub mod requests;
pub mod scenarios;
pub mod session;
pub mod turns;
pub mod voice;

pub use error::Error;

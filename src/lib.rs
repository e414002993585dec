//! Tolmach - media to text to translation pipeline
//!
//! Extracts text from uploaded media through a speech-to-text/OCR backend,
//! translates it into several languages and keeps a searchable local history.

pub mod cli;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod extract;
pub mod history;
pub mod search;
pub mod session;
pub mod translate;

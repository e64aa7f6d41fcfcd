// src/config/options.rs
use std::path::PathBuf;

use super::consts::{DEFAULT_OUT_FILE, REQUEST_PAUSE_MS};

/// Where the page HTML comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Url(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrichOptions {
    pub input: Option<InputSource>, // required; parse_cli rejects None
    pub out: PathBuf,               // enriched HTML destination
    pub pause_ms: u64,              // pause between catalog fetches
    pub list_only: bool,            // print candidate codes, no network, no rewrite
    pub quiet: bool,                // suppress per-code progress lines
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            input: None,
            out: PathBuf::from(DEFAULT_OUT_FILE),
            pause_ms: REQUEST_PAUSE_MS,
            list_only: false,
            quiet: false,
        }
    }
}

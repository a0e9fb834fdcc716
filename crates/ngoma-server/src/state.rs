//! Shared application state.

use ngoma_core::{MusicEngine, ResponseMode};
use std::sync::Arc;

/// Shared state handed to every handler. The engine is process-wide and
/// read-mostly; it serializes pipeline access internally.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MusicEngine>,
    pub response_mode: ResponseMode,
}

impl AppState {
    pub fn new(engine: MusicEngine, response_mode: ResponseMode) -> Self {
        Self {
            engine: Arc::new(engine),
            response_mode,
        }
    }
}

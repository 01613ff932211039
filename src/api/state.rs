use std::sync::Arc;

use crate::services::{Recommender, DEFAULT_TOP_K};

/// Shared application state.
///
/// The recommender only reads its data, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    /// Result size used when a request omits `top_k`
    pub default_top_k: usize,
}

impl AppState {
    pub fn new(recommender: Recommender) -> Self {
        Self {
            recommender: Arc::new(recommender),
            default_top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }
}

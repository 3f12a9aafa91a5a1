use std::sync::Arc;

use crate::services::Tracker;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Tracker>,
}

impl AppState {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker: Arc::new(tracker),
        }
    }
}

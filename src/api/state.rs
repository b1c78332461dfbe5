use std::sync::Arc;

use crate::models::HeroCatalog;
use crate::poll::MatchPoller;

#[derive(Clone)]
pub struct AppState {
    pub poller: Arc<MatchPoller>,
    pub heroes: Arc<HeroCatalog>,
}

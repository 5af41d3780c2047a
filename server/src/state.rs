//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::cpc::CpcParser;
use crate::source::SourceStore;

/// State shared by all HTTP routes
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SourceStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = Arc::new(SourceStore::new(config.annotation.max_points_per_image));
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// A CPC parser configured with this deployment's limits
    pub fn cpc_parser(&self) -> CpcParser {
        CpcParser::with_limits(self.config.cpc.max_file_size, self.config.cpc.max_points)
    }
}

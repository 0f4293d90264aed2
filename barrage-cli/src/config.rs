//! Configuration module
//!
//! Handles CLI configuration including the orchestrator URL.

use barrage_client::BarrageClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the orchestrator service
    pub orchestrator_url: String,
}

impl Config {
    pub fn client(&self) -> BarrageClient {
        BarrageClient::new(&self.orchestrator_url)
    }
}

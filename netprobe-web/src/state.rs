use netprobe_toolbox::ToolboxService;

use crate::config::Config;
use crate::rate_limit::RateLimits;

/// Shared application state, cloned into every worker.
#[derive(Debug, Clone)]
pub struct AppState {
    pub toolbox: ToolboxService,
    pub trust_proxy: bool,
    pub limits: RateLimits,
}

impl AppState {
    pub fn new(toolbox: ToolboxService, trust_proxy: bool, limits: RateLimits) -> Self {
        Self {
            toolbox,
            trust_proxy,
            limits,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let toolbox = ToolboxService::new(&config.dns.toolbox_options())?;
        Ok(Self::new(
            toolbox,
            config.server.trust_proxy,
            RateLimits::from_config(&config.rate_limit),
        ))
    }
}

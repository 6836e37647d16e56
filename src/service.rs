use anyhow::Result;
use std::sync::Arc;
use ureq::Agent;

use crate::config::Config;
use crate::http_verifier::ResponseAuthenticator;

#[derive(Debug, Clone)]
pub struct Service {
    pub config: Arc<Config>,
    pub agent: Agent,
    pub authenticator: ResponseAuthenticator,
}

impl Service {
    pub fn new(config: Config) -> Result<Service> {
        // the key is decoded once here and shared read-only afterwards
        let authenticator = ResponseAuthenticator::new(&config)?;
        let config = Arc::new(config);
        info!(
            "api at: https://{}, verifying {} signatures",
            config.host,
            authenticator.algorithm().token()
        );
        // Note that Agent uses Arc internally so it will safely
        // be shared between threads
        let agent: Agent = ureq::AgentBuilder::new()
            .timeout_read(config.timeout)
            .timeout_write(config.timeout)
            .build();

        Ok(Service {
            config,
            agent,
            authenticator,
        })
    }
}

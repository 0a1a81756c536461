use regionkit_core::source::status_error;
use regionkit_core::{DocumentSource, RetrievalError, RetrievedDocument};
use std::time::Duration;
use tracing::debug;

/// Retrieves page markup from the site's page API:
/// `GET <base_url>/<endpoint>?path=<page path>` answering `{"text": "..."}`.
pub struct HttpSource {
    agent: ureq::Agent,
    url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, endpoint: &str, timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .build();
        Self {
            agent,
            url: endpoint_url(base_url, endpoint),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

impl DocumentSource for HttpSource {
    fn fetch(&self, path: &str) -> Result<RetrievedDocument, RetrievalError> {
        debug!(url = %self.url, path, "requesting page");
        match self.agent.get(&self.url).query("path", path).call() {
            Ok(response) => {
                let body = response.into_string()?;
                RetrievedDocument::from_json(&body)
            }
            Err(ureq::Error::Status(code, response)) => {
                // An unreadable error body still yields the status-line message
                let body = response.into_string().unwrap_or_default();
                Err(status_error(code, &body))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(RetrievalError::Transport(transport.to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

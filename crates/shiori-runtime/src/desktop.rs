//! Desktop integration: deep links, sharing, connectivity probe.

use std::time::Duration;

use url::Url;

use crate::RuntimeError;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a catalog page in the system browser.
pub fn open_link(link: &str) -> Result<(), RuntimeError> {
    let url = Url::parse(link).map_err(|e| RuntimeError::Link(e.to_string()))?;
    open::that(url.as_str()).map_err(|e| RuntimeError::Desktop(e.to_string()))
}

/// Put a shareable link on the system clipboard.
pub fn share_link(link: &str) -> Result<(), RuntimeError> {
    let url = Url::parse(link).map_err(|e| RuntimeError::Link(e.to_string()))?;
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| RuntimeError::Desktop(e.to_string()))?;
    clipboard
        .set_text(url.to_string())
        .map_err(|e| RuntimeError::Desktop(e.to_string()))
}

/// Probe connectivity against the catalog API. An HTTP error status still
/// means the network is reachable; only a transport failure counts as
/// offline.
pub async fn is_online(base_url: &str) -> bool {
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "failed to build probe client");
            return false;
        }
    };
    match client.head(base_url).send().await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(error = %e, "connectivity probe failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_link_rejects_invalid_url() {
        assert!(matches!(
            open_link("not a url"),
            Err(RuntimeError::Link(_))
        ));
    }

    #[test]
    fn test_share_link_rejects_invalid_url() {
        assert!(matches!(
            share_link("://missing-scheme"),
            Err(RuntimeError::Link(_))
        ));
    }

    #[tokio::test]
    async fn test_is_online_false_when_connection_refused() {
        assert!(!is_online("http://127.0.0.1:1").await);
    }
}

//! Content-addressed fetch through an IPFS HTTP gateway.

use async_trait::async_trait;
use bioverify_core::{AdapterError, ContentStore};
use tracing::debug;

use crate::http::{ensure_success, transport};

/// `GET {base}/{cid}`.
pub struct IpfsGateway {
    base_url: String,
    client: reqwest::Client,
}

impl IpfsGateway {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn url_for(&self, cid: &str) -> String {
        format!("{}/{}", self.base_url, cid)
    }
}

#[async_trait]
impl ContentStore for IpfsGateway {
    async fn fetch(&self, cid: &str) -> Result<Vec<u8>, AdapterError> {
        let url = self.url_for(cid);
        let target = format!("gateway {cid}");
        debug!(%url, "fetching content");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(&target, e))?;
        let response = ensure_success(&target, response)?;
        let bytes = response.bytes().await.map_err(|e| transport(&target, e))?;
        Ok(bytes.to_vec())
    }
}

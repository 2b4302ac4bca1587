//! Elasticsearch index over its REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tessera_core::{IndexError, RecordView, TesseraResult};

use crate::SearchIndex;

/// Search index backed by an Elasticsearch cluster.
#[derive(Debug, Clone)]
pub struct ElasticsearchIndex {
    base_url: Url,
    client: reqwest::Client,
}

impl ElasticsearchIndex {
    /// Create a client for the cluster at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> TesseraResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| IndexError::Unavailable {
            reason: format!("invalid Elasticsearch URL {}: {}", base_url, e),
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::Unavailable {
                reason: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { base_url, client })
    }

    /// `{base}/{index}`
    pub fn index_url(&self, index: &str) -> TesseraResult<Url> {
        self.url_with(&[index])
    }

    /// `{base}/{index}/_doc/{id}`
    pub fn document_url(&self, index: &str, id: &str) -> TesseraResult<Url> {
        self.url_with(&[index, "_doc", id])
    }

    fn url_with(&self, segments: &[&str]) -> TesseraResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IndexError::Unavailable {
                reason: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn delete_index(&self, index: &str) -> TesseraResult<()> {
        let url = self.index_url(index)?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| IndexError::DeleteFailed {
                index: index.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(IndexError::DeleteFailed {
            index: index.to_string(),
            reason: format!("status {}: {}", status, body),
        }
        .into())
    }

    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &RecordView,
    ) -> TesseraResult<()> {
        let url = self.document_url(index, id)?;
        let failed = |reason: String| IndexError::DocumentFailed {
            index: index.to_string(),
            id: id.to_string(),
            reason,
        };

        let response = self
            .client
            .put(url)
            .json(document)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(failed(format!("status {}: {}", status, body)).into())
    }
}

//! DORA HTTP client.
//!
//! One pooled reqwest client, one outbound GET per operation. Nothing is
//! cached and nothing is retried; every failure is classified into a
//! [`ClientError`] for the caller to report.

pub mod html;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use reqwest::Client;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AbstractResult, FulltextResult, Lookup, PublicationId, PublicationNotFound,
};
use crate::query;

/// DORA repository client.
#[derive(Clone)]
pub struct DoraClient {
    /// HTTP client.
    client: Client,

    /// Upstream configuration.
    config: Config,
}

impl DoraClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(api::USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Configured DORA base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Run the weighted multi-field search for a free-text term.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status or invalid JSON.
    pub async fn search(&self, term: &str) -> ClientResult<serde_json::Value> {
        let url = format!("{}/{}", self.config.search_url(), query::build_search_query(term));
        let params = vec![
            ("search_string".to_string(), term.to_string()),
            ("extension".to_string(), "false".to_string()),
        ];

        tracing::info!(search_string = %term, "Searching DORA");
        self.get_json(&url, &params).await
    }

    /// Run a raw Solr query with optional filter queries.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status or invalid JSON.
    pub async fn search_filtered(
        &self,
        raw_query: &str,
        filters: &[String],
    ) -> ClientResult<serde_json::Value> {
        let url = format!("{}/{}", self.config.search_url(), query::encode_raw_query(raw_query));
        let params = query::filter_params(filters);

        tracing::info!(query = %raw_query, filters = filters.len(), "Searching DORA with filters");
        self.get_json(&url, &params).await
    }

    /// Search publications issued in a calendar year.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_by_year(&self, year: i32) -> ClientResult<serde_json::Value> {
        let filter = query::year_filter(year)
            .ok_or_else(|| ClientError::bad_request(format!("year {year} is out of range")))?;
        self.search_filtered(query::MATCH_ALL, &[filter]).await
    }

    /// Search publications issued within a date range.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ClientResult<serde_json::Value> {
        self.search_filtered(query::MATCH_ALL, &[query::date_filter(start, end)]).await
    }

    /// Fetch the abstract of a publication from its object page.
    ///
    /// A missing page or missing description markup is reported as
    /// [`Lookup::NotFound`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-404 error status.
    pub async fn get_abstract(&self, id: &PublicationId) -> ClientResult<Lookup<AbstractResult>> {
        let url = self.config.object_url(id.as_str());
        let Some(page) = self.fetch_page(id, &url).await? else {
            return Ok(Lookup::NotFound(PublicationNotFound::new(
                id.clone(),
                url,
                "publication page not found",
            )));
        };

        Ok(match html::extract_abstract(&page) {
            Some(abstract_text) => {
                Lookup::Found(AbstractResult { publication_id: id.clone(), url, abstract_text })
            }
            None => Lookup::NotFound(PublicationNotFound::new(
                id.clone(),
                url,
                "no abstract on publication page",
            )),
        })
    }

    /// Locate and download the full-text PDF of a publication.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-404 error status.
    pub async fn download_fulltext(
        &self,
        id: &PublicationId,
        include_content: bool,
    ) -> ClientResult<Lookup<FulltextResult>> {
        let page_url = self.config.object_url(id.as_str());
        let Some(page) = self.fetch_page(id, &page_url).await? else {
            return Ok(Lookup::NotFound(PublicationNotFound::new(
                id.clone(),
                page_url,
                "publication page not found",
            )));
        };

        let Some(pdf_url) = html::find_pdf_link(&page, &page_url) else {
            return Ok(Lookup::NotFound(PublicationNotFound::new(
                id.clone(),
                page_url,
                format!("no '{}' link on publication page", html::PDF_LINK_LABEL),
            )));
        };

        tracing::info!(publication_id = %id, url = %pdf_url, "Downloading full text");

        let timeout = self.config.download_timeout;
        let response = self
            .client
            .get(&pdf_url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, timeout))?;
        let response = match Self::handle_response(response).await {
            Ok(response) => response,
            Err(ClientError::NotFound { .. }) => {
                return Ok(Lookup::NotFound(PublicationNotFound::new(
                    id.clone(),
                    pdf_url,
                    "full text not found",
                )));
            }
            Err(e) => return Err(e),
        };

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let limit = self.config.max_download_bytes;
        let declared = response.content_length();
        if declared.is_some_and(|len| len > limit) {
            return Err(ClientError::TooLarge { limit });
        }

        let (size_bytes, content_base64) = match (include_content, declared) {
            (false, Some(len)) => (len, None),
            _ => {
                let body = read_capped(response, limit, timeout).await?;
                (body.len() as u64, include_content.then(|| STANDARD.encode(&body)))
            }
        };

        Ok(Lookup::Found(FulltextResult {
            publication_id: id.clone(),
            page_url,
            pdf_url,
            content_type,
            size_bytes,
            content_base64,
        }))
    }

    /// GET an object page. `None` if DORA answers 404.
    async fn fetch_page(&self, id: &PublicationId, url: &str) -> ClientResult<Option<String>> {
        tracing::debug!(publication_id = %id, url = %url, "Fetching publication page");

        let timeout = self.config.request_timeout;
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, timeout))?;

        match Self::handle_response(response).await {
            Ok(response) => {
                let text =
                    response.text().await.map_err(|e| ClientError::from_transport(e, timeout))?;
                Ok(Some(text))
            }
            Err(ClientError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Make a GET request and parse the body as JSON.
    async fn get_json(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> ClientResult<serde_json::Value> {
        let timeout = self.config.request_timeout;
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, timeout))?;

        let response = Self::handle_response(response).await?;
        let body = response.bytes().await.map_err(|e| ClientError::from_transport(e, timeout))?;

        serde_json::from_slice(&body).map_err(ClientError::from)
    }

    /// Handle DORA response status codes.
    async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let text = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), url = %url, "DORA returned error status");

        match status.as_u16() {
            404 => Err(ClientError::not_found(url)),
            400 => Err(ClientError::bad_request(text)),
            500..=599 => Err(ClientError::server(status.as_u16(), text)),
            _ => Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text }),
        }
    }

}

/// Read a body chunk by chunk, giving up once it passes `limit` bytes.
async fn read_capped(
    mut response: reqwest::Response,
    limit: u64,
    timeout: Duration,
) -> ClientResult<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) =
        response.chunk().await.map_err(|e| ClientError::from_transport(e, timeout))?
    {
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(ClientError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

impl std::fmt::Debug for DoraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoraClient").field("base_url", &self.config.base_url).finish()
    }
}

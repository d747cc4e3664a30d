//! GitHub GraphQL client: one search page per call

use starlab_core::{CollectError, HttpConfig, SHARED_RUNTIME};

use crate::query::{GraphQlRequest, search_filter};
use crate::schema::{RawPage, parse_page};

pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";

/// Anything that can serve search results one page at a time.
///
/// The paginator only talks to this trait, so tests and replays can stand in
/// for the network.
pub trait PageSource {
    /// Fetch the page following `cursor` (`None` = first page).
    fn fetch_page(&mut self, cursor: Option<&str>, page_size: usize) -> Result<RawPage, CollectError>;
}

/// Live GitHub GraphQL search.
#[derive(Debug)]
pub struct GraphQlSource {
    client: reqwest::Client,
    api_url: String,
    token: String,
    search_query: String,
    requests: usize,
}

impl GraphQlSource {
    /// `token` is a precondition: it is sent as-is and validated by GitHub.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>, min_stars: u64, http: &HttpConfig) -> Result<Self, CollectError> {
        Ok(Self {
            client: http.build_client()?,
            api_url: api_url.into(),
            token: token.into(),
            search_query: search_filter(min_stars),
            requests: 0,
        })
    }

    #[cfg(test)]
    fn requests(&self) -> usize {
        self.requests
    }
}

impl PageSource for GraphQlSource {
    fn fetch_page(&mut self, cursor: Option<&str>, page_size: usize) -> Result<RawPage, CollectError> {
        self.requests += 1;
        log::debug!("GraphQL request #{} (cursor: {})", self.requests, cursor.unwrap_or("start"));
        let request = GraphQlRequest::search(&self.search_query, page_size, cursor);

        let body = SHARED_RUNTIME.handle().block_on(async {
            let resp = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.token)
                .json(&request)
                .send()
                .await
                .map_err(|e| CollectError::from_reqwest(&e))?;

            let status = resp.status();
            let text = resp.text().await.map_err(|e| CollectError::from_reqwest(&e))?;
            if !status.is_success() {
                return Err(CollectError::from_status(status.as_u16(), &text));
            }
            Ok(text)
        })?;

        parse_page(&body)
    }
}

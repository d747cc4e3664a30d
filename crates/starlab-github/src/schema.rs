//! GitHub GraphQL search response, parsed only as far as pagination needs.
//!
//! Repository nodes stay untyped JSON here; the normalizer owns their shape.

use serde::Deserialize;
use serde_json::Value;
use starlab_core::CollectError;

/// One raw repository node as returned by the search connection.
pub type RawRecord = Value;

/// Result of one paginated request.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    /// Records in source order (stars descending)
    pub records: Vec<RawRecord>,
    /// Cursor to request the following page, absent on the last page
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<SearchData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: SearchConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchConnection {
    #[serde(default)]
    edges: Vec<Edge>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct Edge {
    #[serde(default)]
    node: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    message: String,
}

impl GraphQlError {
    /// GitHub reports secondary rate limits and scope problems in-band with HTTP 200.
    fn is_access_problem(&self) -> bool {
        matches!(self.kind.as_deref(), Some("RATE_LIMITED" | "FORBIDDEN" | "INSUFFICIENT_SCOPES"))
    }
}

/// Parse a GraphQL response body into a [`RawPage`].
///
/// Any entry in `errors` fails the page, even if `data` is also present.
pub fn parse_page(body: &str) -> Result<RawPage, CollectError> {
    let response: GraphQlResponse =
        serde_json::from_str(body).map_err(|e| CollectError::malformed(format!("invalid JSON: {e}")))?;

    if let Some(errors) = response.errors.filter(|errs| !errs.is_empty()) {
        let message = errors
            .iter()
            .map(|e| match &e.kind {
                Some(kind) => format!("{kind}: {}", e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        if errors.iter().any(GraphQlError::is_access_problem) {
            return Err(CollectError::Authentication { status: None, message });
        }
        return Err(CollectError::malformed(format!("GraphQL errors: {message}")));
    }

    let search = response
        .data
        .ok_or_else(|| CollectError::malformed("response has neither data nor errors"))?
        .search;

    Ok(RawPage {
        records: search.edges.into_iter().map(|e| e.node).collect(),
        next_cursor: search.page_info.end_cursor,
        has_more: search.page_info.has_next_page,
    })
}

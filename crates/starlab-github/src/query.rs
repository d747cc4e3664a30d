//! GraphQL search document and its variables

use serde::Serialize;

/// Repository search, one page per request.
///
/// Cursor, page size and search filter travel as variables; the document
/// itself is constant.
pub const SEARCH_REPOSITORIES: &str = r#"
query SearchRepositories($searchQuery: String!, $first: Int!, $after: String) {
  search(query: $searchQuery, type: REPOSITORY, first: $first, after: $after) {
    edges {
      node {
        ... on Repository {
          nameWithOwner
          name
          owner { login }
          url
          createdAt
          updatedAt
          stargazerCount
          primaryLanguage { name }
          pullRequests(states: MERGED) { totalCount }
          releases { totalCount }
          issues { totalCount }
          closedIssues: issues(states: CLOSED) { totalCount }
        }
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}
"#;

/// Search filter: repositories above the star threshold, most-starred first.
pub fn search_filter(min_stars: u64) -> String {
    format!("stars:>{min_stars} sort:stars-desc")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchVariables<'a> {
    pub search_query: &'a str,
    pub first: usize,
    pub after: Option<&'a str>,
}

/// POST body for the GraphQL endpoint.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'static str,
    pub variables: SearchVariables<'a>,
}

impl<'a> GraphQlRequest<'a> {
    pub fn search(search_query: &'a str, first: usize, after: Option<&'a str>) -> Self {
        Self {
            query: SEARCH_REPOSITORIES,
            variables: SearchVariables {
                search_query,
                first,
                after,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_sorts_by_stars() {
        assert_eq!(search_filter(1000), "stars:>1000 sort:stars-desc");
    }

    #[test]
    fn first_page_sends_null_cursor() {
        let filter = search_filter(1000);
        let body = serde_json::to_value(GraphQlRequest::search(&filter, 10, None)).unwrap();
        assert_eq!(body["variables"]["first"], 10);
        assert!(body["variables"]["after"].is_null());
        assert_eq!(body["variables"]["searchQuery"], "stars:>1000 sort:stars-desc");
    }

    #[test]
    fn cursor_is_a_variable_not_interpolated() {
        let filter = search_filter(1000);
        let body = serde_json::to_value(GraphQlRequest::search(&filter, 10, Some("Y3Vyc29yOjEw"))).unwrap();
        assert_eq!(body["variables"]["after"], "Y3Vyc29yOjEw");
        assert!(!body["query"].as_str().unwrap().contains("Y3Vyc29yOjEw"));
    }

    #[test]
    fn document_selects_analysis_fields() {
        for field in [
            "createdAt",
            "updatedAt",
            "stargazerCount",
            "primaryLanguage",
            "pullRequests(states: MERGED)",
            "releases",
            "closedIssues: issues(states: CLOSED)",
            "endCursor",
            "hasNextPage",
        ] {
            assert!(SEARCH_REPOSITORIES.contains(field), "missing {field}");
        }
    }
}

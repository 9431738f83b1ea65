use tracing::debug;

use super::types::{SearchResponse, SearchResultItem, SearchResultSet};

pub fn extract_result_set(response: SearchResponse) -> SearchResultSet {
    let Some(items) = response.items else {
        debug!("response carries no items, treating as zero results");
        return SearchResultSet::default();
    };

    let items = items
        .into_iter()
        .map(|item| SearchResultItem {
            title: item.title.unwrap_or_default(),
            snippet: item.html_snippet.unwrap_or_default(),
        })
        .collect();

    SearchResultSet { items }
}

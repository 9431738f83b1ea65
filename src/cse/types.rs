use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub items: Option<Vec<Item>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub title: Option<String>,
    pub html_snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: Option<u16>,
    pub message: Option<String>,
}

/// One hit as recorded by the pipeline. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResultItem {
    pub title: String,
    pub snippet: String,
}

/// Ordered hits for one query. Empty is a valid outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResultSet {
    pub items: Vec<SearchResultItem>,
}

impl SearchResultSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn snippets(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.snippet.as_str())
    }
}

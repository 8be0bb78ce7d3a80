//! Query result and response types.

use serde::{Deserialize, Serialize};

/// A stored document ranked against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedDocument {
    pub path: String,
    pub title: String,
    pub score: f32,
    pub links: Vec<String>,
}

/// Response body for a find-related query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedResponse {
    pub query: String,
    pub results: Vec<RelatedDocument>,
    pub count: usize,
}

impl RelatedResponse {
    pub fn new(query: impl Into<String>, results: Vec<RelatedDocument>) -> Self {
        Self { query: query.into(), count: results.len(), results }
    }
}

/// Response body for a suggest-references query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<RelatedDocument>,
    pub count: usize,
}

impl SuggestionResponse {
    pub fn new(suggestions: Vec<RelatedDocument>) -> Self {
        Self { count: suggestions.len(), suggestions }
    }
}

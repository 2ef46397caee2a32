//! Ranked query results.

use serde::{Deserialize, Serialize};

/// A ranked match returned by a query. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Identity of the matched record.
    pub id: u16,
    /// Dot-product similarity between probe and record.
    pub similarity: f32,
    /// Label stored with the record; empty when none was given.
    pub name: String,
}

impl QueryResult {
    /// Create a new QueryResult.
    #[inline]
    pub fn new(id: u16, similarity: f32, name: impl Into<String>) -> Self {
        Self {
            id,
            similarity,
            name: name.into(),
        }
    }

    /// Convert to a raw (id, similarity) tuple.
    #[inline]
    pub fn to_tuple(&self) -> (u16, f32) {
        (self.id, self.similarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_result() {
        let result = QueryResult::new(1, 0.9, "alice");
        assert_eq!(result.to_tuple(), (1, 0.9));
        assert_eq!(result.name, "alice");
    }

    #[test]
    fn test_query_result_serializes() {
        let result = QueryResult::new(2, 0.5, "bob");
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"id":2,"similarity":0.5,"name":"bob"}"#);
    }
}

//! Pagination parameter types for list operations

use serde::Deserialize;

/// Pagination parameters (from query string)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_per_page")]
    pub per_page: i64,

    /// Offset (alternative to page)
    pub offset: Option<i64>,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            offset: None,
        }
    }
}

impl PaginationParams {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
            offset: None,
        }
    }

    /// Calculate the SQL offset
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or((self.page - 1) * self.per_page)
    }

    /// Calculate the SQL limit
    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_from_page() {
        let params = PaginationParams::new(3, 10);
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_clamping() {
        let params = PaginationParams::new(0, 100_000);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 1000);
    }
}

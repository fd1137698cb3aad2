use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) page: i64,
    pub(crate) page_size: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default = "default_page")]
    pub(crate) page: i64,
    #[serde(default = "default_page_size")]
    #[serde(alias = "pageSize")]
    pub(crate) page_size: i64,
}

impl PageQuery {
    /// Validates against the configured cap and yields (offset, limit).
    pub(crate) fn offset_limit(&self, max_page_size: i64) -> Result<(i64, i64), ApiError> {
        if self.page < 1 {
            return Err(ApiError::BadRequest("page must be at least 1".to_string()));
        }
        if self.page_size < 1 || self.page_size > max_page_size {
            return Err(ApiError::BadRequest(format!(
                "page_size must be between 1 and {max_page_size}"
            )));
        }
        Ok(((self.page - 1) * self.page_size, self.page_size))
    }
}

pub(crate) const fn default_page() -> i64 {
    1
}

pub(crate) const fn default_page_size() -> i64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_limit_computes_window() {
        let query = PageQuery { page: 3, page_size: 20 };
        assert_eq!(query.offset_limit(100).unwrap(), (40, 20));
    }

    #[test]
    fn first_page_starts_at_zero() {
        let query = PageQuery { page: 1, page_size: 10 };
        assert_eq!(query.offset_limit(100).unwrap(), (0, 10));
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        assert!(PageQuery { page: 0, page_size: 10 }.offset_limit(100).is_err());
        assert!(PageQuery { page: 1, page_size: 0 }.offset_limit(100).is_err());
        assert!(PageQuery { page: 1, page_size: 101 }.offset_limit(100).is_err());
    }

    #[test]
    fn defaults_apply_when_absent() {
        let query: PageQuery = serde_json::from_value(serde_json::json!({})).expect("query");
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
    }
}

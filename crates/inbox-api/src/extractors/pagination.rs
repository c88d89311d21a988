//! Pagination extractor
//!
//! Extracts `?page=&page_size=` from the query string and validates the bounds.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use inbox_service::dto::PaginationQuery;
use validator::Validate;

use crate::response::ApiError;

/// Validated page request (1-based page, `page_size` 1-100, default 20)
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        PaginationQuery::default().into()
    }
}

impl From<PaginationQuery> for Pagination {
    fn from(query: PaginationQuery) -> Self {
        Self {
            page: query.page(),
            page_size: query.page_size(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        query.validate()?;
        Ok(query.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(uri: &str) -> Result<Pagination, ApiError> {
        let (mut parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        Pagination::from_request_parts(&mut parts, &()).await
    }

    #[test]
    fn test_default_pagination() {
        let pagination = Pagination::default();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.page_size, 20);
    }

    #[tokio::test]
    async fn test_query_is_parsed() {
        let pagination = extract("/x?page=3&page_size=50").await.unwrap();
        assert_eq!(pagination.page, 3);
        assert_eq!(pagination.page_size, 50);
    }

    #[tokio::test]
    async fn test_out_of_range_is_rejected() {
        assert!(matches!(
            extract("/x?page_size=500").await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(extract("/x?page=0").await, Err(ApiError::Validation(_))));
        assert!(matches!(
            extract("/x?page=abc").await,
            Err(ApiError::InvalidQuery(_))
        ));
    }
}

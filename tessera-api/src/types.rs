//! Request/Response types for the REST layer.

use serde::{Deserialize, Serialize};
use tessera_core::{Page, PageMetadata, PageRequest, Record, RecordFilter, RecordView, RECORD_MODEL};

/// Query parameters for `GET /api/v1/todos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRecordsQuery {
    /// 1-based page; missing or non-positive means 1
    pub page: Option<i64>,
    /// Page size; missing or non-positive means the default
    pub limit: Option<i64>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Exact creator id
    pub created_by: Option<String>,
}

impl ListRecordsQuery {
    pub fn to_page_request(&self) -> PageRequest {
        PageRequest::new(
            RECORD_MODEL,
            self.page.unwrap_or(0),
            self.limit.unwrap_or(0),
        )
        .with_filter(RecordFilter {
            name: self.name.clone().filter(|s| !s.is_empty()),
            created_by: self.created_by.clone().filter(|s| !s.is_empty()),
        })
    }
}

/// Body of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRecordsResponse {
    pub data: Vec<RecordView>,
    pub meta: PageMetadata,
}

impl From<Page<Record>> for ListRecordsResponse {
    fn from(page: Page<Record>) -> Self {
        let page = page.map(RecordView::from);
        Self {
            data: page.records,
            meta: page.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_map_to_zero() {
        let request = ListRecordsQuery::default().to_page_request();
        assert_eq!(request.model, RECORD_MODEL);
        assert_eq!(request.page, 0);
        assert_eq!(request.limit, 0);
        assert!(request.filter.is_empty());
    }

    #[test]
    fn test_blank_filters_are_dropped() {
        let query = ListRecordsQuery {
            name: Some(String::new()),
            created_by: Some("alice".to_string()),
            ..Default::default()
        };
        let request = query.to_page_request();
        assert_eq!(request.filter.name, None);
        assert_eq!(request.filter.created_by.as_deref(), Some("alice"));
    }

    #[test]
    fn test_list_response_keeps_order_and_metadata() {
        use chrono::Utc;
        use tessera_core::{Actor, RecordInput};

        let now = Utc::now();
        let records = vec![
            Record::candidate(&RecordInput::new("a"), &Actor::new("alice"), now),
            Record::candidate(&RecordInput::new("b"), &Actor::new("bob"), now),
        ];
        let metadata = PageMetadata::compute(1, 10, 2);
        let ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();

        let response = ListRecordsResponse::from(Page { records, metadata });

        assert_eq!(response.meta, metadata);
        assert_eq!(
            response.data.iter().map(|v| v.id.clone()).collect::<Vec<_>>(),
            ids
        );
        assert_eq!(response.data[1].created_by, "bob");
    }
}

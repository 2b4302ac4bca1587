//! Pagination engine properties over arbitrary page/limit pairs.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use tessera_storage::paginate;
use tessera_test_utils::*;
use tokio::runtime::Runtime;

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The returned slice always agrees with the computed metadata and starts
    /// at the request's offset in creation order.
    #[test]
    fn prop_page_matches_metadata(request in page_request_strategy(), n in 0usize..30) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let store = seeded_store(n).await?;
            let page = paginate(store.as_ref(), &request).await?;

            prop_assert_eq!(
                page.metadata,
                PageMetadata::compute(request.page, request.limit, n as i64)
            );
            prop_assert_eq!(page.records.len() as i64, page.metadata.record);
            if page.metadata.record > 0 {
                prop_assert_eq!(
                    &page.records[0].name,
                    &format!("record {}", request.offset())
                );
            } else {
                prop_assert_eq!(store.calls().fetch_page, 0);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}

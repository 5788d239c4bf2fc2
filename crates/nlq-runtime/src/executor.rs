//! Paginated execution of vetted statements.

use crate::adapter::RowStore;
use nlq_core::{PageStrategy, ResultPage};
use nlq_guard::PageWindow;
use std::sync::Arc;
use std::time::Duration;

/// Runs a SELECT through a [`RowStore`] one page at a time.
#[derive(Clone)]
pub struct PaginationExecutor {
    store: Arc<dyn RowStore>,
    window: PageWindow,
    strategy: PageStrategy,
    timeout: Duration,
}

impl PaginationExecutor {
    pub fn new(store: Arc<dyn RowStore>, strategy: PageStrategy, timeout: Duration) -> Self {
        Self {
            store,
            window: PageWindow::new(),
            strategy,
            timeout,
        }
    }

    pub fn strategy(&self) -> PageStrategy {
        self.strategy
    }

    /// Fetch the page starting at `offset`.
    ///
    /// Errors carry the database's own message; a timeout is reported as an
    /// error of its own.
    pub async fn execute(
        &self,
        sql: &str,
        page_size: u32,
        offset: u64,
    ) -> anyhow::Result<ResultPage> {
        let page_size_rows = u64::from(page_size);
        let limit = match self.strategy {
            PageStrategy::FullPage => page_size_rows,
            PageStrategy::OverFetch => page_size_rows + 1,
        };
        let statement = self.window.apply(sql, limit, offset)?;

        tracing::debug!(sql = %statement.sql, limit, offset, "Executing paged statement");

        let mut rows = tokio::time::timeout(self.timeout, self.store.fetch_page(&statement))
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Query timed out after {} seconds",
                    self.timeout.as_secs_f64()
                )
            })??;

        let page = match self.strategy {
            PageStrategy::FullPage => {
                rows.truncate(page_size as usize);
                ResultPage::from_rows(rows, page_size, offset)
            }
            PageStrategy::OverFetch => {
                let has_more = rows.len() > page_size as usize;
                rows.truncate(page_size as usize);
                ResultPage {
                    rows,
                    next_offset: if has_more {
                        offset.checked_add(page_size_rows)
                    } else {
                        None
                    },
                }
            }
        };
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nlq_core::Row;
    use nlq_guard::PagedStatement;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves `total` numbered rows and records the statements it saw.
    struct CountingStore {
        total: u64,
        seen: Mutex<Vec<PagedStatement>>,
    }

    impl CountingStore {
        fn new(total: u64) -> Arc<Self> {
            Arc::new(Self {
                total,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RowStore for CountingStore {
        async fn fetch_page(&self, statement: &PagedStatement) -> anyhow::Result<Vec<Row>> {
            self.seen.lock().unwrap().push(statement.clone());
            let end = (statement.offset + statement.limit).min(self.total);
            Ok((statement.offset.min(end)..end)
                .map(|i| {
                    let mut row = Row::new();
                    row.insert("id".to_string(), json!(i));
                    row
                })
                .collect())
        }
    }

    /// Always returns as many rows as asked for.
    struct FullStore;

    #[async_trait]
    impl RowStore for FullStore {
        async fn fetch_page(&self, statement: &PagedStatement) -> anyhow::Result<Vec<Row>> {
            Ok((0..statement.limit).map(|_| Row::new()).collect())
        }
    }

    struct SlowStore;

    #[async_trait]
    impl RowStore for SlowStore {
        async fn fetch_page(&self, _statement: &PagedStatement) -> anyhow::Result<Vec<Row>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    fn executor(store: Arc<dyn RowStore>, strategy: PageStrategy) -> PaginationExecutor {
        PaginationExecutor::new(store, strategy, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_full_page_sets_next_offset() {
        let store = CountingStore::new(25);
        let exec = executor(store.clone(), PageStrategy::FullPage);

        let page = exec.execute("SELECT id FROM t;", 10, 10).await.unwrap();
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.next_offset, Some(20));

        let seen = store.seen.lock().unwrap();
        assert_eq!(seen[0].sql, "SELECT id FROM t LIMIT 10 OFFSET 10");
    }

    #[tokio::test]
    async fn test_short_page_is_last() {
        let exec = executor(CountingStore::new(7), PageStrategy::FullPage);
        let page = exec.execute("SELECT id FROM t", 10, 0).await.unwrap();
        assert_eq!(page.rows.len(), 7);
        assert_eq!(page.next_offset, None);
    }

    #[tokio::test]
    async fn test_full_page_assumes_more_on_exact_multiple() {
        let exec = executor(CountingStore::new(20), PageStrategy::FullPage);
        let page = exec.execute("SELECT id FROM t", 10, 10).await.unwrap();
        assert_eq!(page.next_offset, Some(20));

        let after = exec.execute("SELECT id FROM t", 10, 20).await.unwrap();
        assert!(after.rows.is_empty());
        assert_eq!(after.next_offset, None);
    }

    #[tokio::test]
    async fn test_over_fetch_detects_last_page() {
        let store = CountingStore::new(20);
        let exec = executor(store.clone(), PageStrategy::OverFetch);

        let first = exec.execute("SELECT id FROM t", 10, 0).await.unwrap();
        assert_eq!(first.rows.len(), 10);
        assert_eq!(first.next_offset, Some(10));

        let second = exec.execute("SELECT id FROM t", 10, 10).await.unwrap();
        assert_eq!(second.rows.len(), 10);
        assert_eq!(second.next_offset, None);

        let seen = store.seen.lock().unwrap();
        assert_eq!(seen[1].sql, "SELECT id FROM t LIMIT 11 OFFSET 10");
    }

    #[tokio::test]
    async fn test_trailing_comment_keeps_the_window() {
        let store = CountingStore::new(25);
        let exec = executor(store.clone(), PageStrategy::FullPage);

        let page = exec
            .execute("SELECT id FROM t -- all ids", 10, 0)
            .await
            .unwrap();
        assert_eq!(page.rows.len(), 10);
        assert_eq!(store.seen.lock().unwrap()[0].sql, "SELECT id FROM t LIMIT 10 OFFSET 0");
    }

    #[tokio::test]
    async fn test_multiple_statements_fail_before_the_store() {
        let store = CountingStore::new(5);
        let exec = executor(store.clone(), PageStrategy::FullPage);
        assert!(exec.execute("SELECT 1; SELECT 2", 10, 0).await.is_err());
        assert!(store.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offset_at_the_top_of_the_range_has_no_successor() {
        let exec = executor(Arc::new(FullStore), PageStrategy::OverFetch);
        let page = exec.execute("SELECT id FROM t", 10, u64::MAX - 5).await.unwrap();
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.next_offset, None);
    }

    #[tokio::test]
    async fn test_timeout_is_an_error() {
        let exec = PaginationExecutor::new(
            Arc::new(SlowStore),
            PageStrategy::FullPage,
            Duration::from_millis(20),
        );
        let err = exec.execute("SELECT 1", 10, 0).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}

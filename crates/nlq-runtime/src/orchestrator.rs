use crate::adapter::{RowStore, SchemaSource};
use crate::error::{QueryError, SchemaError};
use crate::executor::PaginationExecutor;
use crate::generator::{SqlGenerator, is_error_sentinel};
use nlq_audit::{AuditError, QueryLogEntry, QueryLogger};
use nlq_core::{NlqConfig, PaginationConfig, QueryRequest, QueryResponse, SchemaSnapshot};
use nlq_guard::SecurityGate;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives one question through schema fetch, generation, the security gate,
/// paged execution and logging.
#[derive(Clone)]
pub struct QueryOrchestrator {
    schema: Arc<dyn SchemaSource>,
    generator: Arc<dyn SqlGenerator>,
    executor: PaginationExecutor,
    gate: SecurityGate,
    logger: QueryLogger,
    pagination: PaginationConfig,
    generation_timeout: Duration,
}

impl QueryOrchestrator {
    /// Orchestrator with the default gate, pagination and timeouts.
    pub fn new(
        schema: Arc<dyn SchemaSource>,
        generator: Arc<dyn SqlGenerator>,
        store: Arc<dyn RowStore>,
        logger: QueryLogger,
    ) -> Self {
        let pagination = PaginationConfig::default();
        Self {
            schema,
            generator,
            executor: PaginationExecutor::new(store, pagination.strategy, DEFAULT_QUERY_TIMEOUT),
            gate: SecurityGate::default(),
            logger,
            pagination,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Orchestrator configured from the security, pagination and timeout
    /// settings of `config`.
    pub fn from_config(
        config: &NlqConfig,
        schema: Arc<dyn SchemaSource>,
        generator: Arc<dyn SqlGenerator>,
        store: Arc<dyn RowStore>,
        logger: QueryLogger,
    ) -> Self {
        Self {
            schema,
            generator,
            executor: PaginationExecutor::new(
                store,
                config.pagination.strategy,
                config.database.query_timeout(),
            ),
            gate: SecurityGate::with_forbidden_fields(&config.security.forbidden_fields),
            logger,
            pagination: config.pagination.clone(),
            generation_timeout: config.llm.timeout(),
        }
    }

    pub fn with_gate(mut self, gate: SecurityGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    /// Answer `question` with the page of results starting at `offset`.
    pub async fn submit_query(
        &self,
        question: &str,
        page_size: u32,
        offset: u64,
    ) -> Result<QueryResponse, QueryError> {
        let request = QueryRequest::new(question, page_size, offset)?;
        self.submit(&request).await
    }

    /// Run a validated request through the pipeline.
    pub async fn submit(&self, request: &QueryRequest) -> Result<QueryResponse, QueryError> {
        request.ensure_page_size_at_most(self.pagination.max_page_size)?;
        let question = request.question();

        // 1. Schema
        let schema = match self.schema.fetch_schema(None).await {
            Ok(schema) if !schema.is_empty() => schema,
            Ok(_) => {
                tracing::error!("Schema source returned no tables");
                return Err(QueryError::SchemaUnavailable);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch schema");
                return Err(QueryError::SchemaUnavailable);
            }
        };

        // 2. Generation
        let generated_sql = self.generate(question, &schema).await?;
        tracing::info!(sql = %generated_sql, "Generated SQL");

        // 3. Security gate
        let verdict = self.gate.check(question, &generated_sql);
        if let Some(rejection) = verdict.rejection() {
            tracing::warn!(
                question = %question,
                sql = %generated_sql,
                reason = %rejection,
                "Query rejected by security gate"
            );
            return Err(QueryError::SecurityRejection {
                rejection,
                generated_sql,
            });
        }

        // 4 + 5. Execute and log. Runs detached so a dropped request still
        // records the outcome of a dispatched query.
        let executor = self.executor.clone();
        let logger = self.logger.clone();
        let question = question.to_string();
        let sql = generated_sql.clone();
        let (page_size, offset) = (request.page_size(), request.offset());

        let outcome = tokio::spawn(async move {
            match executor.execute(&sql, page_size, offset).await {
                Ok(page) => {
                    record(&logger, QueryLogEntry::success(&question, &sql)).await;
                    Ok(page)
                }
                Err(e) => {
                    let detail = e.to_string();
                    tracing::error!(sql = %sql, error = %detail, "Query execution failed");
                    record(&logger, QueryLogEntry::failure(&question, &sql, &detail)).await;
                    Err(detail)
                }
            }
        })
        .await;

        match outcome {
            Ok(Ok(page)) => {
                tracing::info!(
                    rows = page.rows.len(),
                    next_offset = ?page.next_offset,
                    "Query executed"
                );
                Ok(QueryResponse::new(generated_sql, page))
            }
            Ok(Err(detail)) => Err(QueryError::ExecutionFailure {
                detail,
                generated_sql,
            }),
            Err(e) => {
                tracing::error!(error = %e, "Query task aborted");
                Err(QueryError::ExecutionFailure {
                    detail: e.to_string(),
                    generated_sql,
                })
            }
        }
    }

    /// Schema for every table, or for `table` only.
    pub async fn fetch_schema(&self, table: Option<&str>) -> Result<SchemaSnapshot, SchemaError> {
        let schema = self.schema.fetch_schema(table).await.map_err(|e| {
            tracing::error!(error = %e, table = ?table, "Failed to fetch schema");
            SchemaError::Source(e.to_string())
        })?;

        match table {
            Some(table) if schema.is_empty() => Err(SchemaError::TableNotFound {
                table: table.to_string(),
            }),
            _ => Ok(schema),
        }
    }

    /// Every query log entry so far, oldest first.
    pub async fn fetch_logs(&self) -> Result<Vec<QueryLogEntry>, AuditError> {
        self.logger.entries().await
    }

    async fn generate(&self, question: &str, schema: &SchemaSnapshot) -> Result<String, QueryError> {
        let generated =
            tokio::time::timeout(self.generation_timeout, self.generator.generate(question, schema))
                .await;

        match generated {
            Ok(Ok(text)) if is_error_sentinel(&text) => {
                tracing::warn!(message = %text.trim(), "Generator reported an error");
                Err(QueryError::GenerationFailure {
                    message: text.trim().to_string(),
                })
            }
            Ok(Ok(text)) => Ok(text.trim().to_string()),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "SQL generation failed");
                Err(QueryError::GenerationFailure {
                    message: format!("Error: {}", e),
                })
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.generation_timeout.as_secs(),
                    "SQL generation timed out"
                );
                Err(QueryError::GenerationFailure {
                    message: format!(
                        "Error: SQL generation timed out after {} seconds.",
                        self.generation_timeout.as_secs()
                    ),
                })
            }
        }
    }
}

async fn record(logger: &QueryLogger, entry: QueryLogEntry) {
    if let Err(e) = logger.log(entry).await {
        tracing::error!(error = %e, "Failed to append query log entry");
    }
}

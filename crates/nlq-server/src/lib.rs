//! # nlq-server
//!
//! HTTP transport for the query pipeline.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /query` | `{prompt, page_size?, offset?}` to one page of results |
//! | `GET /schema?table_name=` | `CREATE TABLE` text by table |
//! | `GET /logs` | query log entries, oldest first |
//! | `GET /health` | liveness |

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ServerError;
pub use routes::create_router;
pub use server::NlqServer;
pub use state::AppState;

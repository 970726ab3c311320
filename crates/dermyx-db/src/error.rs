//! Data access error types.
//!
//! Every variant means "the store was configured but could not answer". An
//! unconfigured store is not an error; see `provider::DataMode`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Remote store request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Remote store request timed out")]
    Timeout,

    #[error("Remote store returned {status} for {table}: {body}")]
    Status { status: u16, table: String, body: String },

    #[error("Malformed {table} rows: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Client(#[from] dermyx_common::DermyxError),
}

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DbError::Timeout
        } else {
            DbError::Http(err)
        }
    }
}

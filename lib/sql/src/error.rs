use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("connection error: {0}")]
    Connection(String),

    /// A uniqueness or other integrity constraint rejected the write.
    ///
    /// Surfaced as its own variant so callers can branch on it: inside
    /// `with_tx` a constraint failure does not poison the transaction,
    /// and the caller may continue with other statements.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

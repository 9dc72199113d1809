use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("query index mismatch: left={left} right={right}")]
    QueryIndexMismatch { left: usize, right: usize },

    #[error("query index mismatch: reference={reference} expected={expected}")]
    ReferenceIndexMismatch { reference: usize, expected: usize },
}

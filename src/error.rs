//! Error types for the two error channels: parsing GLSL signatures and compiling graphs.

use thiserror::Error;

use crate::types::DataType;

/// Raised by the signature extractor. Any definitions produced before the
/// error must not be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid syntax at {line}:{column}: {message}")]
    InvalidSyntax {
        line: usize,
        column: usize,
        message: String,
    },
}

impl ParseError {
    pub(crate) fn invalid(line: usize, column: usize, message: impl Into<String>) -> Self {
        ParseError::InvalidSyntax {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Non-fatal problem recorded while compiling one node. Traversal continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("node {node_id} ({operator}) expects {expected} inputs, got {found}")]
    InsufficientInputs {
        node_id: String,
        operator: String,
        expected: usize,
        found: usize,
    },
    #[error("node {node_id} reads input node {source_id} which declared nothing")]
    UndeclaredInput { node_id: String, source_id: String },
    #[error("node {node_id} cannot preview a value of type {data_type}")]
    UnsupportedOutputType { node_id: String, data_type: DataType },
}

/// Fatal condition that aborts a compilation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("node {node_id} has unknown kind `{kind}`")]
    UnknownNodeKind { node_id: String, kind: String },
    #[error("cycle detected in graph at node {node_id}")]
    CyclicGraph { node_id: String },
}

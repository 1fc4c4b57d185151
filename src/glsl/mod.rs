//! GLSL source handling: tokenizing and function signature extraction.

pub mod lexer;
pub mod signature;

pub use signature::{
    FunctionSignature, FunctionSignatures, SUPPORTED_RETURN_TYPES, extract_functions,
    parse_functions,
};

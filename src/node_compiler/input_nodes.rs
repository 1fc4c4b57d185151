//! Source nodes with no graph inputs: float literals and UV coordinates.

use super::{NodeKind, prototype, value_instruction};
use crate::compiler::Compiler;
use crate::error::RunError;
use crate::graph::Node;
use crate::types::{DataType, Instruction, NodeDefinition, Socket};
use crate::utils::format_float_literal;

/// Literal emitted when a float node carries no number.
const DEFAULT_LITERAL: &str = "1.";

/// `float` nodes: a constant, or a `uniform float` when bound to a uniform.
///
/// # Output
/// ```glsl
/// float speed = 0.5;
/// ```
pub struct FloatLiteral {
    definition: NodeDefinition,
}

impl FloatLiteral {
    pub fn new() -> Self {
        Self {
            definition: prototype("float output(float input);"),
        }
    }
}

impl Default for FloatLiteral {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKind for FloatLiteral {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    fn generate(&self, node: &Node, compiler: &mut Compiler<'_>) -> Result<(), RunError> {
        let literal = node
            .data
            .literal_value()
            .map(format_float_literal)
            .unwrap_or_else(|| DEFAULT_LITERAL.to_string());
        compiler.add_instruction(&node.id, value_instruction(node, DataType::Float, literal));
        Ok(())
    }
}

/// `uv` nodes: the interpolated texture coordinate written by the vertex stage.
pub struct UvCoordinates {
    definition: NodeDefinition,
}

impl UvCoordinates {
    pub fn new() -> Self {
        Self {
            definition: NodeDefinition {
                inputs: Vec::new(),
                outputs: vec![Socket::new(DataType::Vec2, "vec2")],
            },
        }
    }
}

impl Default for UvCoordinates {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKind for UvCoordinates {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    fn generate(&self, node: &Node, compiler: &mut Compiler<'_>) -> Result<(), RunError> {
        compiler.add_instruction(&node.id, Instruction::varying(DataType::Vec2, "vUv"));
        Ok(())
    }
}

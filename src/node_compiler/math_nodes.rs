//! Binary arithmetic nodes (`multiply`, `add`).

use super::{NodeKind, prototype, value_instruction};
use crate::compiler::Compiler;
use crate::error::{CompileError, RunError};
use crate::graph::Node;
use crate::types::NodeDefinition;

/// Combine exactly two inputs with an infix operator.
///
/// The result takes the data type of the first input.
///
/// # Output
/// ```glsl
/// float product = a * b;
/// ```
pub struct BinaryOperation {
    operator: &'static str,
    definition: NodeDefinition,
}

impl BinaryOperation {
    pub fn new(operator: &'static str) -> Self {
        Self {
            operator,
            definition: prototype("float output(float a, float b);"),
        }
    }

    pub fn multiply() -> Self {
        Self::new("*")
    }

    pub fn add() -> Self {
        Self::new("+")
    }

    pub fn operator(&self) -> &str {
        self.operator
    }
}

impl NodeKind for BinaryOperation {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    fn generate(&self, node: &Node, compiler: &mut Compiler<'_>) -> Result<(), RunError> {
        let edges = compiler.input_edges(&node.id);
        if edges.len() != 2 {
            compiler.add_error(CompileError::InsufficientInputs {
                node_id: node.id.clone(),
                operator: self.operator.to_string(),
                expected: 2,
                found: edges.len(),
            });
            return Ok(());
        }

        let (lhs, rhs) = (&edges[0].source, &edges[1].source);
        let Some(left) = compiler.declaration(lhs).cloned() else {
            compiler.add_error(CompileError::UndeclaredInput {
                node_id: node.id.clone(),
                source_id: lhs.clone(),
            });
            return Ok(());
        };
        let Some(right) = compiler.node_variable_name(rhs).map(str::to_string) else {
            compiler.add_error(CompileError::UndeclaredInput {
                node_id: node.id.clone(),
                source_id: rhs.clone(),
            });
            return Ok(());
        };

        let value = format!("{} {} {}", left.name, self.operator, right);
        compiler.add_instruction(&node.id, value_instruction(node, left.data_type, value));
        Ok(())
    }
}

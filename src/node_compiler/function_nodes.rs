//! User function nodes: a GLSL function imported once and called per node.

use super::NodeKind;
use crate::compiler::Compiler;
use crate::error::RunError;
use crate::graph::{Node, NodePayload};
use crate::types::{Block, Instruction, NodeDefinition};
use crate::utils::edges_by_handle;

/// Call the function stored on the node.
///
/// The node's own `definitions` decide the sockets. Arguments are the
/// variables connected to those inputs, in declared order; unconnected inputs
/// are left out of the call. A function without an output emits nothing.
///
/// # Output
/// ```glsl
/// float wave(vec2 uv, float time) { ... }   // import, top level
/// float w = wave(uv, time_1);               // assign, inside main
/// ```
pub struct FunctionCall {
    definition: NodeDefinition,
    blocks: Vec<Block>,
}

impl FunctionCall {
    pub fn new() -> Self {
        Self {
            definition: NodeDefinition::default(),
            blocks: vec![Block {
                kind: "function".to_string(),
            }],
        }
    }
}

impl Default for FunctionCall {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKind for FunctionCall {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn generate(&self, node: &Node, compiler: &mut Compiler<'_>) -> Result<(), RunError> {
        let NodePayload::Function { definition, code } = &node.data.payload else {
            log::warn!("function node {} carries no function", node.id);
            return Ok(());
        };
        let Some(output) = definition.output() else {
            return Ok(());
        };

        let edges = compiler.input_edges(&node.id);
        let by_handle = edges_by_handle(&edges);
        let args: Vec<String> = definition
            .inputs
            .iter()
            .filter_map(|input| {
                let edge = by_handle.get(input.name.as_str())?;
                compiler.node_variable_name(&edge.source).map(str::to_string)
            })
            .collect();

        compiler.add_instruction(
            &node.id,
            Instruction::import(output.data_type.clone(), node.name(), code.as_str()),
        );
        compiler.add_instruction(
            &node.id,
            Instruction::assign(
                output.data_type.clone(),
                node.name(),
                format!("{}({})", output.name, args.join(", ")),
            ),
        );
        Ok(())
    }
}

//! The preview sink: assembles the final vertex and fragment programs.

use super::{NodeKind, prototype};
use crate::compiler::Compiler;
use crate::error::{CompileError, RunError};
use crate::graph::Node;
use crate::types::{Block, DataType, Instruction, InstructionKind, NodeDefinition};

/// Vertex stage shared by every preview. Writes the `vUv` varying.
pub const VERTEX_PASSTHROUGH: &str = "varying vec2 vUv;
void main() {
    vUv = uv;
    gl_Position = projectionMatrix * modelViewMatrix * vec4(position, 1.0);
}
";

const DEFAULT_ALPHA: &str = "1.";

/// Sink node with a `color` and an `alpha` input.
///
/// Colour comes from the first input edge and is widened to `vec3`; alpha from
/// the second, defaulting to `1.`. Without any input edge nothing is produced.
pub struct PreviewSink {
    definition: NodeDefinition,
    blocks: Vec<Block>,
}

impl PreviewSink {
    pub fn new() -> Self {
        Self {
            definition: prototype("void output(vec3 color, float alpha);"),
            blocks: vec![Block {
                kind: "preview".to_string(),
            }],
        }
    }
}

impl Default for PreviewSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKind for PreviewSink {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn generate(&self, node: &Node, compiler: &mut Compiler<'_>) -> Result<(), RunError> {
        let edges = compiler.input_edges(&node.id);
        let Some(first) = edges.first() else {
            return Ok(());
        };

        let Some(source) = compiler.declaration(&first.source).cloned() else {
            compiler.add_error(CompileError::UndeclaredInput {
                node_id: node.id.clone(),
                source_id: first.source.clone(),
            });
            return Ok(());
        };
        let color = match source.data_type {
            DataType::Float => format!("vec3({})", source.name),
            DataType::Vec2 => format!("vec3({}, 1)", source.name),
            DataType::Vec3 => source.name,
            other => {
                compiler.add_error(CompileError::UnsupportedOutputType {
                    node_id: node.id.clone(),
                    data_type: other,
                });
                return Ok(());
            }
        };
        let alpha = edges
            .get(1)
            .and_then(|edge| compiler.node_variable_name(&edge.source))
            .unwrap_or(DEFAULT_ALPHA)
            .to_string();

        let fragment = render_fragment(compiler.instructions(), &color, &alpha);
        let result = compiler.result_mut();
        result.vertex = VERTEX_PASSTHROUGH.to_string();
        result.fragment = fragment;
        Ok(())
    }
}

/// Lay out the instruction stream as a fragment program.
///
/// Imports are spliced verbatim and every other non-`assign` instruction
/// becomes a top-level `<kind> <type> <name>;` line, in stream order.
/// Assignments become statements of `main`.
pub fn render_fragment(instructions: &[Instruction], color: &str, alpha: &str) -> String {
    let mut header = String::new();
    let mut body = String::new();

    for instruction in instructions {
        let value = instruction.value.as_deref().unwrap_or_default();
        match instruction.kind {
            InstructionKind::Import => {
                header.push_str(value.trim_end());
                header.push('\n');
            }
            InstructionKind::Assign => {
                body.push_str(&format!(
                    "    {} {} = {};\n",
                    instruction.data_type, instruction.name, value
                ));
            }
            InstructionKind::Uniform | InstructionKind::Varying | InstructionKind::Reassign => {
                header.push_str(&format!(
                    "{} {} {};\n",
                    instruction.kind, instruction.data_type, instruction.name
                ));
            }
        }
    }

    format!("{header}void main() {{\n{body}    gl_FragColor = vec4({color}, {alpha});\n}}\n")
}

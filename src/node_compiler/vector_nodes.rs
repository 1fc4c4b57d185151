//! Vector constructors (`vec2`, `vec3`) built from float components.

use super::{NodeKind, prototype, value_instruction};
use crate::compiler::Compiler;
use crate::error::RunError;
use crate::graph::Node;
use crate::types::{DataType, NodeDefinition};
use crate::utils::edges_by_handle;

/// Value of a component with nothing connected.
const DEFAULT_COMPONENT: &str = "1.";

/// Build a vector from the inputs connected to its `x`, `y` (and `z`) sockets.
///
/// # Output
/// ```glsl
/// vec3 tint = vec3(r, 1., b);
/// ```
pub struct VectorBuilder {
    data_type: DataType,
    components: &'static [&'static str],
    definition: NodeDefinition,
}

impl VectorBuilder {
    pub fn vec2() -> Self {
        Self {
            data_type: DataType::Vec2,
            components: &["x", "y"],
            definition: prototype("vec2 output(float x, float y);"),
        }
    }

    pub fn vec3() -> Self {
        Self {
            data_type: DataType::Vec3,
            components: &["x", "y", "z"],
            definition: prototype("vec3 output(float x, float y, float z);"),
        }
    }
}

impl NodeKind for VectorBuilder {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    fn generate(&self, node: &Node, compiler: &mut Compiler<'_>) -> Result<(), RunError> {
        let edges = compiler.input_edges(&node.id);
        let by_handle = edges_by_handle(&edges);

        let components: Vec<&str> = self
            .components
            .iter()
            .map(|socket| {
                by_handle
                    .get(*socket)
                    .and_then(|edge| compiler.node_variable_name(&edge.source))
                    .unwrap_or(DEFAULT_COMPONENT)
            })
            .collect();
        let value = format!("{}({})", self.data_type, components.join(", "));

        compiler.add_instruction(&node.id, value_instruction(node, self.data_type.clone(), value));
        Ok(())
    }
}

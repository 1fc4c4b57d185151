//! Uniform-backed nodes: time, colour, and references to a graph uniform.

use super::NodeKind;
use crate::compiler::Compiler;
use crate::error::RunError;
use crate::graph::{Node, NodeData, NodePayload, Uniform};
use crate::types::{DataType, Instruction, NodeDefinition, Socket};
use crate::uniforms::{FrameState, UniformValue, color_or_black};

/// `time` nodes: `uniform float <name>` fed with the elapsed seconds.
pub struct TimeUniform {
    definition: NodeDefinition,
}

impl TimeUniform {
    pub fn new() -> Self {
        Self {
            definition: NodeDefinition {
                inputs: Vec::new(),
                outputs: vec![Socket::new(DataType::Float, "elapsed")],
            },
        }
    }
}

impl Default for TimeUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKind for TimeUniform {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    fn generate(&self, node: &Node, compiler: &mut Compiler<'_>) -> Result<(), RunError> {
        compiler.add_instruction(&node.id, Instruction::uniform(DataType::Float, node.name()));
        Ok(())
    }

    fn live_value(
        &self,
        _node: &Node,
        _uniform: &Uniform,
        frame: &FrameState,
    ) -> Option<UniformValue> {
        Some(UniformValue::Float(frame.elapsed))
    }
}

/// `color` nodes: `uniform vec3 <name>` fed with the parsed colour.
pub struct ColorUniform {
    definition: NodeDefinition,
}

impl ColorUniform {
    pub fn new() -> Self {
        Self {
            definition: NodeDefinition {
                inputs: Vec::new(),
                outputs: vec![Socket::new(DataType::Vec3, "color")],
            },
        }
    }
}

impl Default for ColorUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKind for ColorUniform {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    fn generate(&self, node: &Node, compiler: &mut Compiler<'_>) -> Result<(), RunError> {
        compiler.add_instruction(&node.id, Instruction::uniform(DataType::Vec3, node.name()));
        Ok(())
    }

    fn live_value(
        &self,
        _node: &Node,
        uniform: &Uniform,
        _frame: &FrameState,
    ) -> Option<UniformValue> {
        Some(UniformValue::Vec3(color_or_black(uniform)))
    }
}

/// `uniform` nodes: look up the referenced uniform and compile the node as
/// that uniform's kind, with the uniform's type and value.
#[derive(Default)]
pub struct UniformReference {
    definition: NodeDefinition,
}

impl UniformReference {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeKind for UniformReference {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    fn generate(&self, node: &Node, compiler: &mut Compiler<'_>) -> Result<(), RunError> {
        let NodePayload::Uniform { uniform_id, .. } = &node.data.payload else {
            log::warn!("uniform node {} has no uniformId", node.id);
            return Ok(());
        };
        let Some(uniform) = compiler.uniform(uniform_id) else {
            log::warn!("uniform node {} references missing uniform {uniform_id}", node.id);
            return Ok(());
        };

        let kind = uniform.kind.as_str();
        let target = compiler
            .registry()
            .get(kind)
            .ok_or_else(|| RunError::UnknownNodeKind {
                node_id: node.id.clone(),
                kind: kind.to_string(),
            })?;

        let resolved = Node {
            data: NodeData::resolved_uniform(node.name(), uniform),
            ..node.clone()
        };
        target.generate(&resolved, compiler)
    }
}

#[cfg(test)]
mod tests {
    use super::super::Registry;
    use super::super::test_utils::{test_graph, test_graph_with_uniforms, test_node};
    use super::*;
    use crate::graph::UniformKind;
    use serde_json::json;

    fn reference(id: &str, name: &str, uniform_id: &str) -> Node {
        test_node(id, "uniform", json!({"name": name, "uniformId": uniform_id}))
    }

    #[test]
    fn test_time_declares_uniform() {
        let graph = test_graph(
            vec![test_node(
                "t",
                "uniform",
                json!({"name": "time_1", "type": "time", "uniformId": "1"}),
            )],
            vec![],
        );
        let registry = Registry::builtin();
        let mut compiler = Compiler::new(&graph, &registry);
        compiler.run("t").unwrap();
        assert_eq!(compiler.instructions(), &[Instruction::uniform("float", "time_1")]);
    }

    #[test]
    fn test_reference_dispatches_on_uniform_type() {
        let mut uniform = Uniform::with_default("4", UniformKind::Float);
        uniform.value = json!(0.25);
        let graph = test_graph_with_uniforms(
            vec![reference("n", "gain", "4")],
            vec![],
            vec![uniform, Uniform::with_default("5", UniformKind::Color)],
        );
        let registry = Registry::builtin();
        let mut compiler = Compiler::new(&graph, &registry);
        compiler.run("n").unwrap();
        assert_eq!(compiler.instructions(), &[Instruction::uniform("float", "gain")]);
        assert_eq!(compiler.declaration("n").unwrap().name, "gain");
    }

    #[test]
    fn test_reference_to_color_is_vec3() {
        let graph = test_graph_with_uniforms(
            vec![reference("n", "tint", "5")],
            vec![],
            vec![Uniform::with_default("5", UniformKind::Color)],
        );
        let registry = Registry::builtin();
        let mut compiler = Compiler::new(&graph, &registry);
        compiler.run("n").unwrap();
        assert_eq!(compiler.node_data_type("n"), Some(&DataType::Vec3));
    }

    #[test]
    fn test_missing_uniform_emits_nothing() {
        let graph = test_graph(vec![reference("n", "gone", "404")], vec![]);
        let registry = Registry::builtin();
        let mut compiler = Compiler::new(&graph, &registry);
        compiler.run("n").unwrap();
        assert!(compiler.instructions().is_empty());
        assert!(!compiler.has_errors());
    }

    #[test]
    fn test_live_values() {
        let node = reference("n", "c", "1");
        let frame = FrameState {
            elapsed: 2.5,
            delta: 0.016,
        };
        let mut color = Uniform::with_default("1", UniformKind::Color);
        color.value = json!("#ffffff");

        assert_eq!(
            TimeUniform::new().live_value(&node, &color, &frame),
            Some(UniformValue::Float(2.5))
        );
        assert_eq!(
            ColorUniform::new().live_value(&node, &color, &frame),
            Some(UniformValue::Vec3([1.0, 1.0, 1.0]))
        );
    }
}

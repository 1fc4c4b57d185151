//! Node kinds and the registry the compiler dispatches through.
//!
//! Every node kind implements [`NodeKind`]: it describes its sockets and turns
//! one node into instructions on the [`Compiler`]. The registry maps the
//! effective kind string of a node (`data.type`, falling back to `type`) to
//! its implementation.

pub mod function_nodes;
pub mod input_nodes;
pub mod math_nodes;
pub mod preview;
pub mod uniform_nodes;
pub mod vector_nodes;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::compiler::Compiler;
use crate::error::RunError;
use crate::glsl::parse_functions;
use crate::graph::{Node, Uniform};
use crate::types::{Block, DataType, Instruction, NodeDefinition};
use crate::uniforms::{FrameState, UniformValue};

pub use function_nodes::FunctionCall;
pub use input_nodes::{FloatLiteral, UvCoordinates};
pub use math_nodes::BinaryOperation;
pub use preview::PreviewSink;
pub use uniform_nodes::{ColorUniform, TimeUniform, UniformReference};
pub use vector_nodes::VectorBuilder;

pub trait NodeKind: Send + Sync {
    /// Sockets the editor offers for nodes of this kind.
    fn definition(&self) -> &NodeDefinition;

    /// UI hints; the compiler never reads them.
    fn blocks(&self) -> &[Block] {
        &[]
    }

    /// Emit the instructions for `node`. Its inputs have already been compiled.
    ///
    /// Recoverable problems go through [`Compiler::add_error`]; an `Err` aborts
    /// the whole pass.
    fn generate(&self, node: &Node, compiler: &mut Compiler<'_>) -> Result<(), RunError>;

    /// Per-frame value of a uniform of this kind, when it is not just the
    /// stored value.
    fn live_value(
        &self,
        _node: &Node,
        _uniform: &Uniform,
        _frame: &FrameState,
    ) -> Option<UniformValue> {
        None
    }
}

#[derive(Clone, Default)]
pub struct Registry {
    kinds: HashMap<String, Arc<dyn NodeKind>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in node kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("float", FloatLiteral::new());
        registry.register("multiply", BinaryOperation::multiply());
        registry.register("add", BinaryOperation::add());
        registry.register("vec2", VectorBuilder::vec2());
        registry.register("vec3", VectorBuilder::vec3());
        registry.register("time", TimeUniform::new());
        registry.register("color", ColorUniform::new());
        registry.register("uniform", UniformReference::new());
        registry.register("function", FunctionCall::new());
        registry.register("uv", UvCoordinates::new());
        registry.register("preview", PreviewSink::new());
        registry
    }

    /// Add or replace a kind. Returns the implementation it replaced.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        node_kind: impl NodeKind + 'static,
    ) -> Option<Arc<dyn NodeKind>> {
        self.kinds.insert(kind.into(), Arc::new(node_kind))
    }

    pub fn get(&self, kind: &str) -> Option<&dyn NodeKind> {
        self.kinds.get(kind).map(|k| k.as_ref())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Definition of a built-in kind, written as a GLSL prototype.
pub(crate) fn prototype(source: &str) -> NodeDefinition {
    parse_functions(source)
        .expect("built-in prototype parses")
        .into_iter()
        .next()
        .expect("built-in prototype declares one function")
}

/// `uniform <type> <name>` for uniform-bound nodes, otherwise
/// `<type> <name> = <value>`.
pub(crate) fn value_instruction(
    node: &Node,
    data_type: impl Into<DataType>,
    value: impl Into<String>,
) -> Instruction {
    if node.is_uniform_node() {
        Instruction::uniform(data_type, node.name())
    } else {
        Instruction::assign(data_type, node.name(), value)
    }
}

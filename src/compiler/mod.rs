//! Graph compiler: walks the node graph from a sink and collects instructions.
//!
//! A [`Compiler`] owns everything one compilation pass mutates (instruction
//! stream, declaration table, error list). Node kinds drive it through
//! [`Compiler::add_instruction`] and read back what their inputs declared.

pub mod index;

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::{CompileError, RunError};
use crate::graph::{Edge, GraphSnapshot, Node, Uniform};
use crate::node_compiler::Registry;
use crate::types::{DataType, Declaration, Instruction, InstructionKind, ShaderSource};

pub use index::GraphIndex;

pub struct Compiler<'a> {
    index: GraphIndex<'a>,
    registry: &'a Registry,
    instructions: Vec<Instruction>,
    declarations: HashMap<String, Declaration>,
    errors: Vec<CompileError>,
    visiting: HashSet<String>,
    result: ShaderSource,
}

impl<'a> Compiler<'a> {
    pub fn new(snapshot: &'a GraphSnapshot, registry: &'a Registry) -> Self {
        Self {
            index: GraphIndex::new(snapshot),
            registry,
            instructions: Vec::new(),
            declarations: HashMap::new(),
            errors: Vec::new(),
            visiting: HashSet::new(),
            result: ShaderSource::default(),
        }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.index.node(id)
    }

    pub fn edge(&self, id: &str) -> Option<&'a Edge> {
        self.index.edge(id)
    }

    pub fn uniform(&self, id: &str) -> Option<&'a Uniform> {
        self.index.uniform(id)
    }

    pub fn input_nodes(&self, node_id: &str) -> Vec<&'a Node> {
        self.index.input_nodes(node_id)
    }

    pub fn input_edges(&self, node_id: &str) -> Vec<&'a Edge> {
        self.index.input_edges(node_id)
    }

    /// Record `instruction` for `node_id` and append it to the stream.
    ///
    /// `uniform`, `varying` and `import` declare once: a repeat for a node
    /// that already has a declaration is dropped. An `assign` over an existing
    /// assignment is rewritten to `reassign`.
    pub fn add_instruction(&mut self, node_id: &str, mut instruction: Instruction) {
        let declared = self.declarations.get(node_id);

        if instruction.kind.is_declare_once() && declared.is_some() {
            log::trace!("node {node_id}: dropping repeated {}", instruction.kind);
            return;
        }

        if instruction.kind == InstructionKind::Assign
            && declared.is_some_and(|d| d.kind.is_assignment())
        {
            log::trace!("node {node_id}: {} becomes a reassign", instruction.name);
            instruction.kind = InstructionKind::Reassign;
        }

        self.declarations.insert(
            node_id.to_string(),
            Declaration {
                kind: instruction.kind,
                data_type: instruction.data_type.clone(),
                name: instruction.name.clone(),
            },
        );
        self.instructions.push(instruction);
    }

    pub fn add_error(&mut self, error: CompileError) {
        log::debug!("compile error: {error}");
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn declaration(&self, node_id: &str) -> Option<&Declaration> {
        self.declarations.get(node_id)
    }

    pub fn node_data_type(&self, node_id: &str) -> Option<&DataType> {
        self.declaration(node_id).map(|d| &d.data_type)
    }

    pub fn node_variable_name(&self, node_id: &str) -> Option<&str> {
        self.declaration(node_id).map(|d| d.name.as_str())
    }

    pub fn result(&self) -> &ShaderSource {
        &self.result
    }

    pub fn result_mut(&mut self) -> &mut ShaderSource {
        &mut self.result
    }

    /// Compile `node_id` after recursively compiling every node feeding it.
    ///
    /// Inputs run depth-first in edge order, with no memoization: a node
    /// reachable along two paths is compiled twice and its second assignment
    /// becomes a `reassign`. An id missing from the snapshot is a no-op.
    pub fn run(&mut self, node_id: &str) -> Result<&mut Self, RunError> {
        let Some(node) = self.index.node(node_id) else {
            log::warn!("run: node {node_id} is not in the graph");
            return Ok(self);
        };

        if !self.visiting.insert(node.id.clone()) {
            return Err(RunError::CyclicGraph {
                node_id: node.id.clone(),
            });
        }
        let outcome = self.run_node(node);
        self.visiting.remove(&node.id);
        outcome?;

        Ok(self)
    }

    fn run_node(&mut self, node: &'a Node) -> Result<(), RunError> {
        for input in self.index.input_nodes(&node.id) {
            self.run(&input.id)?;
        }

        let kind = node.effective_kind();
        let registry = self.registry;
        let generator = registry.get(kind).ok_or_else(|| RunError::UnknownNodeKind {
            node_id: node.id.clone(),
            kind: kind.to_string(),
        })?;

        log::debug!("compiling node {} ({kind})", node.id);
        generator.generate(node, self)
    }

    /// Finish the pass. Sources are blanked when any error was recorded.
    pub fn finish(self) -> CompiledShader {
        let ShaderSource { vertex, fragment } = self.result;
        if self.errors.is_empty() {
            CompiledShader {
                vertex,
                fragment,
                errors: Vec::new(),
            }
        } else {
            CompiledShader {
                vertex: String::new(),
                fragment: String::new(),
                errors: self.errors,
            }
        }
    }
}

/// Output of one compilation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompiledShader {
    pub vertex: String,
    pub fragment: String,
    #[serde(skip)]
    pub errors: Vec<CompileError>,
}

impl CompiledShader {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Empty sources mean there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.vertex.is_empty() && self.fragment.is_empty()
    }
}

/// Compile the graph into shader sources, starting at `sink_id`.
pub fn compile(
    snapshot: &GraphSnapshot,
    registry: &Registry,
    sink_id: &str,
) -> Result<CompiledShader, RunError> {
    let mut compiler = Compiler::new(snapshot, registry);
    compiler.run(sink_id)?;
    Ok(compiler.finish())
}

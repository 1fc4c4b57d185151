//! Compile node graphs into GLSL vertex and fragment programs.
//!
//! A [`GraphSnapshot`] is compiled from a sink node with [`compile`], using a
//! [`Registry`] of node kinds. User functions are described by
//! [`glsl::parse_functions`], which recovers node definitions from GLSL source.

pub mod compiler;
pub mod error;
pub mod glsl;
pub mod graph;
pub mod node_compiler;
pub mod types;
pub mod uniforms;
pub mod utils;

pub use compiler::{CompiledShader, Compiler, compile};
pub use error::{CompileError, ParseError, RunError};
pub use graph::{
    Edge, GraphSnapshot, Node, NodeData, NodePayload, Uniform, UniformKind, load_default_graph,
    load_graph_from_path,
};
pub use node_compiler::{NodeKind, Registry};
pub use types::{
    Block, DataType, Declaration, Instruction, InstructionKind, NodeDefinition, ShaderSource,
    Socket,
};
pub use uniforms::{FrameState, UniformValue, resolve_uniform_values};

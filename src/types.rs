//! Core type definitions shared by the signature extractor and the compiler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// GLSL value type carried by sockets, declarations and instructions.
///
/// Only the types the compiler reasons about get their own variant; anything
/// else a user function declares (matrices, samplers, structs) is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Other(String),
}

impl DataType {
    /// Returns the GLSL spelling of this type.
    pub fn glsl(&self) -> &str {
        match self {
            DataType::Float => "float",
            DataType::Vec2 => "vec2",
            DataType::Vec3 => "vec3",
            DataType::Vec4 => "vec4",
            DataType::Other(name) => name,
        }
    }
}

impl From<&str> for DataType {
    fn from(s: &str) -> Self {
        match s {
            "float" => DataType::Float,
            "vec2" => DataType::Vec2,
            "vec3" => DataType::Vec3,
            "vec4" => DataType::Vec4,
            other => DataType::Other(other.to_string()),
        }
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        match DataType::from(s.as_str()) {
            DataType::Other(_) => DataType::Other(s),
            known => known,
        }
    }
}

impl From<DataType> for String {
    fn from(ty: DataType) -> Self {
        match ty {
            DataType::Other(name) => name,
            known => known.glsl().to_string(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl())
    }
}

/// A named, typed input or output of a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Socket {
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub name: String,
}

impl Socket {
    pub fn new(data_type: impl Into<DataType>, name: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            name: name.into(),
        }
    }
}

/// Type-level shape of a node kind or of one user function.
///
/// `outputs` holds at most one socket: the compiler only supports functions
/// with zero or one return value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeDefinition {
    #[serde(default)]
    pub inputs: Vec<Socket>,
    #[serde(default)]
    pub outputs: Vec<Socket>,
}

impl NodeDefinition {
    /// The single output socket, if the definition returns a value.
    pub fn output(&self) -> Option<&Socket> {
        self.outputs.first()
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.inputs.iter().any(|s| s.name == name)
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.iter().any(|s| s.name == name)
    }
}

/// UI hint attached to a node kind. Ignored by the compiler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionKind {
    Assign,
    Reassign,
    Uniform,
    Varying,
    Import,
}

impl InstructionKind {
    /// Kinds that declare something exactly once per node; repeats are dropped.
    pub fn is_declare_once(self) -> bool {
        matches!(
            self,
            InstructionKind::Uniform | InstructionKind::Varying | InstructionKind::Import
        )
    }

    pub fn is_assignment(self) -> bool {
        matches!(self, InstructionKind::Assign | InstructionKind::Reassign)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstructionKind::Assign => "assign",
            InstructionKind::Reassign => "reassign",
            InstructionKind::Uniform => "uniform",
            InstructionKind::Varying => "varying",
            InstructionKind::Import => "import",
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted unit of generated source.
///
/// `value` is an expression for assignments and the raw function source for imports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(rename = "type")]
    pub kind: InstructionKind,
    #[serde(rename = "dataType")]
    pub data_type: DataType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Instruction {
    pub fn assign(
        data_type: impl Into<DataType>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            kind: InstructionKind::Assign,
            data_type: data_type.into(),
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn uniform(data_type: impl Into<DataType>, name: impl Into<String>) -> Self {
        Self {
            kind: InstructionKind::Uniform,
            data_type: data_type.into(),
            name: name.into(),
            value: None,
        }
    }

    pub fn varying(data_type: impl Into<DataType>, name: impl Into<String>) -> Self {
        Self {
            kind: InstructionKind::Varying,
            data_type: data_type.into(),
            name: name.into(),
            value: None,
        }
    }

    pub fn import(
        data_type: impl Into<DataType>,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            kind: InstructionKind::Import,
            data_type: data_type.into(),
            name: name.into(),
            value: Some(code.into()),
        }
    }
}

/// How and as what a node's output was first emitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Declaration {
    #[serde(rename = "type")]
    pub kind: InstructionKind,
    #[serde(rename = "dataType")]
    pub data_type: DataType,
    pub name: String,
}

/// Vertex and fragment source produced by a sink node.
///
/// Empty strings mean "nothing to render".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

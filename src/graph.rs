//! Graph snapshot: the nodes, edges and uniforms the editor persists.
//!
//! Every type here round-trips the editor's JSON without loss. Fields the
//! compiler does not read (positions, edge styles, ...) are kept in `extra`.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::types::NodeDefinition;

const DEFAULT_GRAPH_JSON: &str = include_str!("../assets/default-graph.json");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub uniforms: Vec<Uniform>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Editor-level node type (`node`, `function`, `uniform`, `preview`, ...).
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub data: NodeData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Registry key used to compile this node: `data.type` when present,
    /// otherwise the node's own type.
    pub fn effective_kind(&self) -> &str {
        self.data.kind.as_deref().unwrap_or(&self.node_type)
    }

    /// Whether the node is bound to a uniform rather than computed.
    pub fn is_uniform_node(&self) -> bool {
        self.node_type == "uniform"
    }

    /// Variable name emitted for this node.
    pub fn name(&self) -> &str {
        &self.data.name
    }
}

/// Per-node payload, typed by what the node's generator needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNodeData", into = "RawNodeData")]
pub struct NodeData {
    pub name: String,
    /// `data.type` on the wire.
    pub kind: Option<String>,
    pub payload: NodePayload,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum NodePayload {
    #[default]
    Empty,
    /// A `float` node's literal.
    Literal { value: Option<f64> },
    /// Any node referencing a uniform by id. `value` is the editor's cached copy.
    Uniform {
        uniform_id: String,
        value: Option<Value>,
    },
    /// A user function: the selected definition plus the raw source.
    Function {
        definition: NodeDefinition,
        code: String,
    },
}

impl NodeData {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind.into()),
            payload: NodePayload::Empty,
            extra: Map::new(),
        }
    }

    pub fn with_payload(mut self, payload: NodePayload) -> Self {
        self.payload = payload;
        self
    }

    /// Data a uniform node compiles as: `{name, type: uniform.type, value: uniform.value}`.
    pub fn resolved_uniform(name: &str, uniform: &Uniform) -> Self {
        NodeData::from(RawNodeData {
            name: name.to_string(),
            kind: Some(uniform.kind.as_str().to_string()),
            value: Some(uniform.value.clone()),
            ..RawNodeData::default()
        })
    }

    /// Numeric literal carried by the node, wherever the wire shape put it.
    pub fn literal_value(&self) -> Option<f64> {
        match &self.payload {
            NodePayload::Literal { value } => *value,
            NodePayload::Uniform { value, .. } => value.as_ref().and_then(Value::as_f64),
            _ => self.extra.get("value").and_then(Value::as_f64),
        }
    }
}

/// Wire mirror of [`NodeData`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawNodeData {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(rename = "uniformId", default, skip_serializing_if = "Option::is_none")]
    uniform_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    definitions: Option<NodeDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawNodeData> for NodeData {
    fn from(raw: RawNodeData) -> Self {
        let RawNodeData {
            name,
            kind,
            value,
            uniform_id,
            definitions,
            code,
            mut extra,
        } = raw;

        let payload = if let Some(uniform_id) = uniform_id {
            NodePayload::Uniform { uniform_id, value }
        } else if kind.as_deref() == Some("function") || definitions.is_some() || code.is_some() {
            if let Some(value) = value {
                extra.insert("value".to_string(), value);
            }
            NodePayload::Function {
                definition: definitions.unwrap_or_default(),
                code: code.unwrap_or_default(),
            }
        } else if kind.as_deref() == Some("float") {
            match value {
                Some(v) if v.is_number() => NodePayload::Literal { value: v.as_f64() },
                Some(other) => {
                    extra.insert("value".to_string(), other);
                    NodePayload::Literal { value: None }
                }
                None => NodePayload::Literal { value: None },
            }
        } else {
            if let Some(value) = value {
                extra.insert("value".to_string(), value);
            }
            NodePayload::Empty
        };

        NodeData {
            name,
            kind,
            payload,
            extra,
        }
    }
}

impl From<NodeData> for RawNodeData {
    fn from(data: NodeData) -> Self {
        let NodeData {
            name,
            kind,
            payload,
            mut extra,
        } = data;

        let mut raw = RawNodeData {
            name,
            kind,
            value: extra.remove("value"),
            ..RawNodeData::default()
        };
        match payload {
            NodePayload::Empty => {}
            NodePayload::Literal { value } => {
                if let Some(v) = value {
                    raw.value = Some(number_value(v));
                }
            }
            NodePayload::Uniform { uniform_id, value } => {
                raw.uniform_id = Some(uniform_id);
                raw.value = value;
            }
            NodePayload::Function { definition, code } => {
                raw.definitions = Some(definition);
                raw.code = Some(code);
            }
        }
        raw.extra = extra;
        raw
    }
}

/// A field that is present deserializes to `Some`, `null` included, so an
/// explicit `null` is written back.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Write whole numbers back as JSON integers so `1` does not become `1.0`.
fn number_value(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Value::from(v as i64)
    } else {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "sourceHandle", default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(rename = "targetHandle", default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Color,
    Time,
}

impl UniformKind {
    /// Registry key of the node kind that compiles this uniform.
    pub fn as_str(self) -> &'static str {
        match self {
            UniformKind::Float => "float",
            UniformKind::Vec2 => "vec2",
            UniformKind::Vec3 => "vec3",
            UniformKind::Color => "color",
            UniformKind::Time => "time",
        }
    }

    /// Value a freshly added uniform of this kind starts with.
    pub fn default_value(self) -> Value {
        match self {
            UniformKind::Float | UniformKind::Time => Value::from(0),
            UniformKind::Vec2 => Value::from(vec![0, 0]),
            UniformKind::Vec3 => Value::from(vec![0, 0, 0]),
            UniformKind::Color => Value::from("#000000"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uniform {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: UniformKind,
    /// Absent and `null` are the same; neither is written back.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Uniform {
    /// A new uniform named `<type>_<id>` holding the kind's default value.
    pub fn with_default(id: impl Into<String>, kind: UniformKind) -> Self {
        let id = id.into();
        Self {
            name: format!("{}_{}", kind.as_str(), id),
            id,
            kind,
            value: kind.default_value(),
            extra: Map::new(),
        }
    }
}

impl GraphSnapshot {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse graph json")
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize graph json")
    }

    /// First node whose kind is `preview`, the usual compilation sink.
    pub fn find_preview_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.effective_kind() == "preview")
    }

    /// Drop edges attached to `node_id` through sockets the node's new
    /// definition no longer has.
    ///
    /// Incoming edges must target one of `definition.inputs`, outgoing edges
    /// must leave through one of `definition.outputs`. Returns how many edges
    /// were removed.
    pub fn retain_valid_edges(&mut self, node_id: &str, definition: &NodeDefinition) -> usize {
        let before = self.edges.len();
        self.edges.retain(|edge| {
            if edge.target == node_id {
                return edge
                    .target_handle
                    .as_deref()
                    .is_some_and(|h| definition.has_input(h));
            }
            if edge.source == node_id {
                return edge
                    .source_handle
                    .as_deref()
                    .is_some_and(|h| definition.has_output(h));
            }
            true
        });
        let removed = before - self.edges.len();
        if removed > 0 {
            log::debug!("dropped {removed} stale edges of node {node_id}");
        }
        removed
    }
}

pub fn load_graph_from_path(path: impl AsRef<std::path::Path>) -> Result<GraphSnapshot> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read graph json at {}", path.display()))?;
    GraphSnapshot::from_json_str(&text)
        .with_context(|| format!("invalid graph json in {}", path.display()))
}

/// The sample graph bundled with the crate.
pub fn load_default_graph() -> Result<GraphSnapshot> {
    GraphSnapshot::from_json_str(DEFAULT_GRAPH_JSON).context("bundled default graph is invalid")
}

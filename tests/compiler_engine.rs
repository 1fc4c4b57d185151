use node_forge_shader_compiler::{
    CompileError, Compiler, DataType, GraphSnapshot, Instruction, InstructionKind, Registry,
    RunError, compile,
};
use serde_json::{Value, json};

fn graph(value: Value) -> GraphSnapshot {
    serde_json::from_value(value).unwrap()
}

fn float(id: &str, name: &str, value: f64) -> Value {
    json!({"id": id, "type": "node", "data": {"name": name, "type": "float", "value": value}})
}

fn op(id: &str, name: &str, kind: &str) -> Value {
    json!({"id": id, "type": "node", "data": {"name": name, "type": kind}})
}

fn edge(source: &str, target: &str, handle: &str) -> Value {
    json!({
        "id": format!("{source}-{target}-{handle}"),
        "source": source,
        "target": target,
        "targetHandle": handle
    })
}

#[test]
fn empty_graph_has_nothing() {
    let snapshot = GraphSnapshot::default();
    let registry = Registry::builtin();
    let compiler = Compiler::new(&snapshot, &registry);

    assert!(compiler.node("1").is_none());
    assert!(compiler.edge("1").is_none());
    assert!(compiler.uniform("1").is_none());
    assert!(compiler.input_nodes("1").is_empty());
    assert!(!compiler.has_errors());
}

#[test]
fn lookups_and_input_nodes() {
    let snapshot = graph(json!({
        "nodes": [
            {"id": "1", "type": "node", "position": {"x": 0, "y": 0}, "data": {"name": "Variable 1", "type": "anything"}},
            {"id": "2", "type": "node", "position": {"x": 0, "y": 0}, "data": {"name": "hello", "type": "anything"}}
        ],
        "edges": [{"id": "1", "source": "1", "target": "2"}],
        "uniforms": [{"id": "1", "name": "float", "type": "float", "value": 1}]
    }));
    let registry = Registry::builtin();
    let compiler = Compiler::new(&snapshot, &registry);

    assert_eq!(compiler.node("1").unwrap().id, "1");
    assert_eq!(compiler.edge("1").unwrap().target, "2");
    assert_eq!(compiler.uniform("1").unwrap().name, "float");

    let inputs = compiler.input_nodes("2");
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].name(), "Variable 1");
}

#[test]
fn declare_once_kinds_are_idempotent() {
    let snapshot = GraphSnapshot::default();
    let registry = Registry::builtin();
    let mut compiler = Compiler::new(&snapshot, &registry);

    let cases = [
        (
            "t",
            Instruction::uniform("float", "time_1"),
            Instruction::uniform("vec3", "color_2"),
        ),
        (
            "uv",
            Instruction::varying("vec2", "vUv"),
            Instruction::varying("vec3", "vNormal"),
        ),
        (
            "fn",
            Instruction::import("float", "wave", "float wave() { return 1.; }"),
            Instruction::import("vec2", "other", "vec2 other() { return vec2(0.); }"),
        ),
    ];
    for (id, first, second) in &cases {
        compiler.add_instruction(id, first.clone());
        compiler.add_instruction(id, second.clone());
    }

    let emitted: Vec<Instruction> = cases.iter().map(|(_, first, _)| first.clone()).collect();
    assert_eq!(compiler.instructions(), emitted.as_slice());
    for (id, first, _) in &cases {
        let declaration = compiler.declaration(id).unwrap();
        assert_eq!(declaration.kind, first.kind);
        assert_eq!(declaration.data_type, first.data_type);
        assert_eq!(declaration.name, first.name);
    }
}

#[test]
fn repeated_assign_becomes_reassign() {
    let snapshot = GraphSnapshot::default();
    let registry = Registry::builtin();
    let mut compiler = Compiler::new(&snapshot, &registry);

    compiler.add_instruction("n", Instruction::assign("float", "x", "1."));
    compiler.add_instruction("n", Instruction::assign("float", "x", "2."));
    compiler.add_instruction("n", Instruction::assign("float", "x", "3."));

    let kinds: Vec<InstructionKind> = compiler.instructions().iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            InstructionKind::Assign,
            InstructionKind::Reassign,
            InstructionKind::Reassign
        ]
    );
    assert_eq!(
        compiler.declaration("n").unwrap().kind,
        InstructionKind::Reassign
    );
    assert_eq!(compiler.instructions()[2].value.as_deref(), Some("3."));
}

#[test]
fn chain_compiles_inputs_first() {
    // A -> B -> C
    let snapshot = graph(json!({
        "nodes": [
            float("a", "a", 1.0),
            op("b", "b", "vec2"),
            op("c", "c", "vec3")
        ],
        "edges": [edge("a", "b", "x"), edge("b", "c", "y")]
    }));
    let registry = Registry::builtin();
    let mut compiler = Compiler::new(&snapshot, &registry);
    compiler.run("c").unwrap();

    let names: Vec<&str> = compiler.instructions().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(
        compiler.instructions()[2].value.as_deref(),
        Some("vec3(1., b, 1.)")
    );
}

#[test]
fn shared_input_is_reemitted_as_reassign() {
    let snapshot = graph(json!({
        "nodes": [float("s", "shared", 2.0), op("m", "m", "multiply")],
        "edges": [edge("s", "m", "a"), edge("s", "m", "b")]
    }));
    let registry = Registry::builtin();
    let mut compiler = Compiler::new(&snapshot, &registry);
    compiler.run("m").unwrap();

    assert_eq!(
        compiler.instructions(),
        &[
            Instruction::assign("float", "shared", "2."),
            Instruction {
                kind: InstructionKind::Reassign,
                data_type: DataType::Float,
                name: "shared".to_string(),
                value: Some("2.".to_string()),
            },
            Instruction::assign("float", "m", "shared * shared"),
        ]
    );
}

#[test]
fn binary_operators_need_exactly_two_inputs() {
    for count in [0usize, 1, 2, 3] {
        let mut nodes = vec![op("m", "m", "add")];
        let mut edges = Vec::new();
        for i in 0..count {
            let id = format!("f{i}");
            nodes.push(float(&id, &id, i as f64));
            edges.push(edge(&id, "m", if i == 0 { "a" } else { "b" }));
        }
        let snapshot = graph(json!({"nodes": nodes, "edges": edges}));
        let registry = Registry::builtin();
        let mut compiler = Compiler::new(&snapshot, &registry);
        compiler.run("m").unwrap();

        if count == 2 {
            assert!(!compiler.has_errors());
            assert_eq!(compiler.node_variable_name("m"), Some("m"));
        } else {
            assert!(matches!(
                compiler.errors(),
                [CompileError::InsufficientInputs { found, .. }] if *found == count
            ));
        }
    }
}

#[test]
fn unknown_kind_aborts_the_pass() {
    let snapshot = graph(json!({"nodes": [op("x", "x", "sparkle")]}));
    let err = compile(&snapshot, &Registry::builtin(), "x").unwrap_err();
    assert_eq!(
        err,
        RunError::UnknownNodeKind {
            node_id: "x".to_string(),
            kind: "sparkle".to_string(),
        }
    );
}

#[test]
fn cycles_are_reported() {
    let snapshot = graph(json!({
        "nodes": [op("a", "a", "add"), op("b", "b", "add")],
        "edges": [edge("a", "b", "a"), edge("b", "a", "a")]
    }));
    let err = compile(&snapshot, &Registry::builtin(), "a").unwrap_err();
    assert!(matches!(err, RunError::CyclicGraph { .. }));
}

#[test]
fn missing_sink_is_a_no_op() {
    let snapshot = GraphSnapshot::default();
    let shader = compile(&snapshot, &Registry::builtin(), "nope").unwrap();
    assert!(shader.is_empty());
    assert!(!shader.has_errors());
}

#[test]
fn errors_blank_the_sources() {
    let snapshot = graph(json!({
        "nodes": [
            op("m", "m", "multiply"),
            {"id": "p", "type": "node", "data": {"name": "p", "type": "preview"}}
        ],
        "edges": [edge("m", "p", "color")]
    }));
    let shader = compile(&snapshot, &Registry::builtin(), "p").unwrap();

    assert!(shader.has_errors());
    assert!(shader.is_empty());
    assert_eq!(
        shader.errors,
        vec![
            CompileError::InsufficientInputs {
                node_id: "m".to_string(),
                operator: "*".to_string(),
                expected: 2,
                found: 0,
            },
            CompileError::UndeclaredInput {
                node_id: "p".to_string(),
                source_id: "m".to_string(),
            },
        ]
    );
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use node_forge_shader_compiler::{
    CompiledShader, GraphSnapshot, Registry, compile, glsl, load_default_graph,
    load_graph_from_path,
};

#[derive(Debug, Default, Clone)]
struct Cli {
    graph: Option<PathBuf>,
    node: Option<String>,
    output_dir: Option<PathBuf>,
    signatures: Option<PathBuf>,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--graph" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --graph"));
                };
                cli.graph = Some(PathBuf::from(v));
                i += 2;
            }
            "--node" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --node"));
                };
                cli.node = Some(v.clone());
                i += 2;
            }
            "--outputdir" | "--output-dir" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --output-dir"));
                };
                cli.output_dir = Some(PathBuf::from(v));
                i += 2;
            }
            "--signatures" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --signatures"));
                };
                cli.signatures = Some(PathBuf::from(v));
                i += 2;
            }
            other => {
                return Err(anyhow!(
                    "unknown argument: {other} (supported: --graph <graph.json>, --node <id>, --output-dir <dir>, --signatures <file.glsl>)"
                ));
            }
        }
    }
    Ok(cli)
}

fn print_signatures(path: &Path) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read glsl source {}", path.display()))?;
    let definitions = glsl::parse_functions(&source)
        .with_context(|| format!("failed to extract functions from {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&definitions)?);
    Ok(())
}

fn sink_id(graph: &GraphSnapshot, requested: Option<&str>) -> Result<String> {
    match requested {
        Some(id) => {
            if !graph.nodes.iter().any(|n| n.id == id) {
                bail!("node {id} is not in the graph");
            }
            Ok(id.to_string())
        }
        None => graph
            .find_preview_node()
            .map(|n| n.id.clone())
            .ok_or_else(|| anyhow!("graph has no preview node; pass --node <id>")),
    }
}

fn write_sources(output_dir: &Path, sink: &str, shader: &CompiledShader) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    for (ext, source) in [("vert", &shader.vertex), ("frag", &shader.fragment)] {
        let path = output_dir.join(format!("{sink}.{ext}"));
        std::fs::write(&path, source)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("[compile] saved: {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&argv)?;

    if let Some(path) = cli.signatures.as_deref() {
        return print_signatures(path);
    }

    let graph = match cli.graph.as_deref() {
        Some(path) => load_graph_from_path(path)?,
        None => load_default_graph()?,
    };
    let sink = sink_id(&graph, cli.node.as_deref())?;

    let registry = Registry::builtin();
    let shader = compile(&graph, &registry, &sink)
        .with_context(|| format!("failed to compile graph from node {sink}"))?;

    if shader.has_errors() {
        for error in &shader.errors {
            log::error!("{error}");
        }
        bail!(
            "compilation of node {sink} recorded {} error(s)",
            shader.errors.len()
        );
    }

    match cli.output_dir.as_deref() {
        Some(dir) => write_sources(dir, &sink, &shader)?,
        None => {
            println!("// {sink}.vert\n{}", shader.vertex);
            println!("// {sink}.frag\n{}", shader.fragment);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cli_graph_node_outputdir() {
        let args = vec![
            "--graph".to_string(),
            "graph.json".to_string(),
            "--node".to_string(),
            "9".to_string(),
            "--outputdir".to_string(),
            "out".to_string(),
        ];
        let cli = parse_cli(&args).unwrap();
        assert_eq!(cli.graph.as_ref().unwrap(), &PathBuf::from("graph.json"));
        assert_eq!(cli.node.as_deref(), Some("9"));
        assert_eq!(cli.output_dir.as_ref().unwrap(), &PathBuf::from("out"));
        assert!(cli.signatures.is_none());
    }

    #[test]
    fn parse_cli_rejects_missing_value_and_unknown_flag() {
        assert!(parse_cli(&["--graph".to_string()]).is_err());
        assert!(parse_cli(&["--headless".to_string()]).is_err());
    }

    #[test]
    fn sink_defaults_to_preview_node() {
        let graph = load_default_graph().unwrap();
        let sink = sink_id(&graph, None).unwrap();
        assert_eq!(graph.find_preview_node().unwrap().id, sink);
        assert!(sink_id(&graph, Some("missing")).is_err());
    }
}

//! Recover function prototypes and definitions from GLSL source.
//!
//! This is a best-effort parser over a simplified top-level grammar: it
//! understands function headers and skips everything else (globals, structs,
//! precision statements, directives) by bracket matching. Function bodies are
//! not parsed beyond checking that their brackets balance.

use crate::error::ParseError;
use crate::glsl::lexer::{Lexer, Token, TokenKind};
use crate::types::{NodeDefinition, Socket};

/// Return types a node can be built from. Anything else is silently dropped.
pub const SUPPORTED_RETURN_TYPES: &[&str] = &["void", "float", "vec2", "vec3"];

const QUALIFIERS: &[&str] = &[
    "const",
    "uniform",
    "varying",
    "attribute",
    "in",
    "out",
    "inout",
    "highp",
    "mediump",
    "lowp",
    "invariant",
    "precise",
    "flat",
    "smooth",
    "noperspective",
    "centroid",
    "buffer",
    "shared",
];

/// A function header found at the top level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSignature {
    pub return_type: String,
    pub name: String,
    pub params: Vec<Socket>,
    /// `false` for a bare prototype ending in `;`.
    pub has_body: bool,
}

impl FunctionSignature {
    pub fn is_supported(&self) -> bool {
        SUPPORTED_RETURN_TYPES.contains(&self.return_type.as_str())
    }

    /// The node shape of this function: its parameters as inputs and, unless it
    /// returns `void`, one output named after the function itself.
    pub fn to_definition(&self) -> NodeDefinition {
        let outputs = if self.return_type == "void" {
            Vec::new()
        } else {
            vec![Socket::new(self.return_type.as_str(), self.name.as_str())]
        };
        NodeDefinition {
            inputs: self.params.clone(),
            outputs,
        }
    }
}

enum Item {
    Function(FunctionSignature),
    Skipped,
}

/// One-token lookahead over the lexer.
#[derive(Clone, Debug)]
struct Cursor<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token<'a>>,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            peeked: None,
        }
    }

    fn next(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        if let Some(tok) = self.peeked.take() {
            return Ok(Some(tok));
        }
        self.lexer.next().transpose()
    }

    fn peek(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next().transpose()?;
        }
        Ok(self.peeked)
    }

    fn end_of_input(&self, expected: &str) -> ParseError {
        let (line, column) = self.lexer.location();
        ParseError::invalid(line, column, format!("unexpected end of input, expected {expected}"))
    }

    fn expect_any(&mut self, expected: &str) -> Result<Token<'a>, ParseError> {
        self.next()?.ok_or_else(|| self.end_of_input(expected))
    }

    fn expect_ident(&mut self, expected: &str) -> Result<Token<'a>, ParseError> {
        let tok = self.expect_any(expected)?;
        if tok.kind != TokenKind::Ident {
            return Err(unexpected(&tok, expected));
        }
        Ok(tok)
    }

    fn expect_punct(&mut self, p: &str) -> Result<Token<'a>, ParseError> {
        let expected = format!("`{p}`");
        let tok = self.expect_any(&expected)?;
        if !tok.is_punct(p) {
            return Err(unexpected(&tok, &expected));
        }
        Ok(tok)
    }

    fn eat_punct(&mut self, p: &str) -> Result<bool, ParseError> {
        if self.peek()?.is_some_and(|t| t.is_punct(p)) {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consume tokens up to and including the bracket that closes `open`,
    /// which has already been consumed.
    fn skip_balanced(&mut self, open: Token<'a>) -> Result<(), ParseError> {
        let mut stack: Vec<Token<'a>> = vec![open];
        while let Some(top) = stack.last().copied() {
            let Some(tok) = self.next()? else {
                return Err(ParseError::invalid(
                    top.line,
                    top.column,
                    format!("unclosed `{}`", top.text),
                ));
            };
            if tok.kind != TokenKind::Punct {
                continue;
            }
            match tok.text {
                "{" | "(" | "[" => stack.push(tok),
                "}" | ")" | "]" => {
                    if closer_of(top.text) != tok.text {
                        return Err(unexpected(&tok, &format!("`{}`", closer_of(top.text))));
                    }
                    stack.pop();
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Consume a top-level statement up to and including its `;`.
    fn skip_statement(&mut self) -> Result<(), ParseError> {
        loop {
            let tok = self.expect_any("`;`")?;
            if tok.kind != TokenKind::Punct {
                continue;
            }
            match tok.text {
                ";" => return Ok(()),
                "{" | "(" | "[" => self.skip_balanced(tok)?,
                "}" | ")" | "]" => return Err(unexpected(&tok, "`;`")),
                _ => {}
            }
        }
    }

    /// Read an optional `[...]` suffix and append it to `ty`.
    fn array_suffix(&mut self, ty: &mut String) -> Result<(), ParseError> {
        while self.eat_punct("[")? {
            ty.push('[');
            loop {
                let tok = self.expect_any("`]`")?;
                if tok.is_punct("]") {
                    break;
                }
                if tok.kind == TokenKind::Punct && !matches!(tok.text, "+" | "-" | "*" | "/") {
                    return Err(unexpected(&tok, "`]`"));
                }
                ty.push_str(tok.text);
            }
            ty.push(']');
        }
        Ok(())
    }

    /// Skip storage/precision qualifiers and `layout(...)`, returning the first other token.
    fn skip_qualifiers(
        &mut self,
        mut tok: Token<'a>,
        expected: &str,
    ) -> Result<Token<'a>, ParseError> {
        loop {
            if tok.kind == TokenKind::Ident && QUALIFIERS.contains(&tok.text) {
                tok = self.expect_any(expected)?;
            } else if tok.is_ident("layout") {
                let open = self.expect_punct("(")?;
                self.skip_balanced(open)?;
                tok = self.expect_any(expected)?;
            } else {
                return Ok(tok);
            }
        }
    }
}

fn closer_of(open: &str) -> &'static str {
    match open {
        "{" => "}",
        "(" => ")",
        _ => "]",
    }
}

fn unexpected(tok: &Token<'_>, expected: &str) -> ParseError {
    ParseError::invalid(
        tok.line,
        tok.column,
        format!("unexpected `{}`, expected {expected}", tok.text),
    )
}

/// Lazy, restartable sequence of the supported function definitions in a source
/// text, in source order.
///
/// Cloning the iterator restarts parsing from the clone's position; calling
/// [`extract_functions`] again restarts from the top. After the first
/// [`ParseError`] the iterator is exhausted.
#[derive(Clone, Debug)]
pub struct FunctionSignatures<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> FunctionSignatures<'a> {
    fn parse_item(&mut self) -> Result<Option<Item>, ParseError> {
        let cursor = &mut self.cursor;
        let Some(first) = cursor.next()? else {
            return Ok(None);
        };

        match first.kind {
            TokenKind::Directive => return Ok(Some(Item::Skipped)),
            TokenKind::Punct if first.text == ";" => return Ok(Some(Item::Skipped)),
            TokenKind::Ident => {}
            _ => return Err(unexpected(&first, "a declaration")),
        }

        if first.is_ident("precision") {
            cursor.skip_statement()?;
            return Ok(Some(Item::Skipped));
        }

        let ty = cursor.skip_qualifiers(first, "a type")?;
        if ty.kind != TokenKind::Ident {
            return Err(unexpected(&ty, "a type"));
        }

        // `struct S { ... } s;` and interface blocks `uniform Block { ... } b;`
        if ty.is_ident("struct") && cursor.peek()?.is_some_and(|t| t.kind == TokenKind::Ident) {
            cursor.next()?;
        }
        if cursor.peek()?.is_some_and(|t| t.is_punct("{")) {
            let open = cursor.expect_punct("{")?;
            cursor.skip_balanced(open)?;
            cursor.skip_statement()?;
            return Ok(Some(Item::Skipped));
        }

        let mut return_type = ty.text.to_string();
        cursor.array_suffix(&mut return_type)?;

        let name = cursor.expect_ident("a name")?;
        if !cursor.eat_punct("(")? {
            // Global variable declaration.
            cursor.skip_statement()?;
            return Ok(Some(Item::Skipped));
        }

        let params = self.parse_params()?;
        let cursor = &mut self.cursor;
        let after = cursor.expect_any("`;` or `{`")?;
        let has_body = if after.is_punct(";") {
            false
        } else if after.is_punct("{") {
            cursor.skip_balanced(after)?;
            true
        } else {
            return Err(unexpected(&after, "`;` or `{`"));
        };

        Ok(Some(Item::Function(FunctionSignature {
            return_type,
            name: name.text.to_string(),
            params,
            has_body,
        })))
    }

    /// Parse a parameter list; the opening `(` has been consumed.
    fn parse_params(&mut self) -> Result<Vec<Socket>, ParseError> {
        let cursor = &mut self.cursor;
        if cursor.eat_punct(")")? {
            return Ok(Vec::new());
        }

        // `(void)` declares no parameters.
        let mut lookahead = cursor.clone();
        if lookahead.next()?.is_some_and(|t| t.is_ident("void"))
            && lookahead.next()?.is_some_and(|t| t.is_punct(")"))
        {
            *cursor = lookahead;
            return Ok(Vec::new());
        }

        let mut params = Vec::new();
        loop {
            let first = cursor.expect_any("a parameter type")?;
            let ty = cursor.skip_qualifiers(first, "a parameter type")?;
            if ty.kind != TokenKind::Ident {
                return Err(unexpected(&ty, "a parameter type"));
            }
            let mut data_type = ty.text.to_string();
            cursor.array_suffix(&mut data_type)?;

            let name = cursor.expect_any("a parameter name")?;
            if name.kind != TokenKind::Ident {
                return Err(ParseError::invalid(
                    name.line,
                    name.column,
                    format!("parameter of type `{data_type}` has no name"),
                ));
            }
            cursor.array_suffix(&mut data_type)?;

            if cursor.eat_punct("=")? {
                skip_default_value(cursor)?;
            }

            params.push(Socket::new(data_type, name.text));

            let sep = cursor.expect_any("`,` or `)`")?;
            if sep.is_punct(")") {
                return Ok(params);
            }
            if !sep.is_punct(",") {
                return Err(unexpected(&sep, "`,` or `)`"));
            }
        }
    }
}

/// Skip a parameter default value, stopping before the `,` or `)` that ends it.
fn skip_default_value(cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
    loop {
        let Some(tok) = cursor.peek()? else {
            return Err(cursor.end_of_input("`)`"));
        };
        if tok.is_punct(",") || tok.is_punct(")") {
            return Ok(());
        }
        cursor.next()?;
        if tok.is_punct("(") || tok.is_punct("[") || tok.is_punct("{") {
            cursor.skip_balanced(tok)?;
        } else if tok.is_punct("]") || tok.is_punct("}") || tok.is_punct(";") {
            return Err(unexpected(&tok, "`)`"));
        }
    }
}

impl Iterator for FunctionSignatures<'_> {
    type Item = Result<NodeDefinition, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.parse_item() {
                Ok(Some(Item::Function(signature))) => {
                    if signature.is_supported() {
                        log::debug!(
                            "extracted {} {}({} params)",
                            signature.return_type,
                            signature.name,
                            signature.params.len()
                        );
                        return Some(Ok(signature.to_definition()));
                    }
                    log::debug!(
                        "skipping {} with unsupported return type {}",
                        signature.name,
                        signature.return_type
                    );
                }
                Ok(Some(Item::Skipped)) => {}
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Extract the function prototypes and definitions declared by `source`.
///
/// Only functions returning `void`, `float`, `vec2` or `vec3` are yielded.
pub fn extract_functions(source: &str) -> FunctionSignatures<'_> {
    FunctionSignatures {
        cursor: Cursor::new(source),
        done: false,
    }
}

/// Collect [`extract_functions`], failing on the first syntax error.
pub fn parse_functions(source: &str) -> Result<Vec<NodeDefinition>, ParseError> {
    extract_functions(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn only(source: &str) -> NodeDefinition {
        let mut defs = parse_functions(source).unwrap();
        assert_eq!(defs.len(), 1, "expected one definition in {source:?}");
        defs.remove(0)
    }

    #[test]
    fn prototype_and_definition() {
        let proto = only("vec3 circle(vec3 abc, float x);");
        let def = only("vec3 circle(vec3 abc, float x){}");
        assert_eq!(proto, def);
        assert_eq!(
            def.inputs,
            vec![Socket::new("vec3", "abc"), Socket::new("float", "x")]
        );
        assert_eq!(def.outputs, vec![Socket::new(DataType::Vec3, "circle")]);
    }

    #[test]
    fn void_and_empty_parameter_lists() {
        let def = only("void main() {}");
        assert!(def.inputs.is_empty());
        assert!(def.outputs.is_empty());
        assert!(only("float f(void);").inputs.is_empty());
    }

    #[test]
    fn qualifiers_arrays_and_defaults_are_reduced() {
        let def = only("highp float f(in float a, const inout vec2 b, float c[3], vec3 d = vec3(1.0, 2.0, 3.0)) { return a; }");
        assert_eq!(
            def.inputs,
            vec![
                Socket::new("float", "a"),
                Socket::new("vec2", "b"),
                Socket::new("float[3]", "c"),
                Socket::new("vec3", "d"),
            ]
        );
    }

    #[test]
    fn unsupported_return_types_are_dropped() {
        let defs = parse_functions("vec4 a(); mat3 b(float x); float c();").unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].outputs[0].name, "c");
    }

    #[test]
    fn globals_structs_and_directives_are_skipped() {
        let source = r#"
#version 100
precision mediump float;
uniform float time;
const vec3 tint = vec3(1.0, 0.5, 0.25);
struct Light { vec3 color; float power; };
uniform Params { float scale; } params;
layout(location = 0) out vec4 fragColor;
float shade(float x) { return x * time; }
"#;
        let defs = parse_functions(source).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].outputs[0].name, "shade");
    }

    #[test]
    fn nested_braces_in_bodies() {
        let defs = parse_functions(
            "float f(float x) { if (x > 0.0) { return x; } else { return -x; } } void g() {}",
        )
        .unwrap();
        assert_eq!(defs.len(), 2);
    }

    #[test]
    fn header_reports_has_body() {
        let mut sig = FunctionSignatures {
            cursor: Cursor::new("float f(); float g() {}"),
            done: false,
        };
        let Ok(Some(Item::Function(f))) = sig.parse_item() else {
            panic!("expected f");
        };
        let Ok(Some(Item::Function(g))) = sig.parse_item() else {
            panic!("expected g");
        };
        assert!(!f.has_body);
        assert!(g.has_body);
    }

    #[test]
    fn malformed_sources_are_invalid_syntax() {
        for source in [
            "float f(float x {",
            "float f(float x) { return x;",
            "float f(float) ;",
            "float f(float x,) {}",
            "float f(float x) return x;",
            "float x = 1.0",
            "}",
            "42;",
            "float f(float x) { return x; ]",
        ] {
            let result = parse_functions(source);
            assert!(
                matches!(result, Err(ParseError::InvalidSyntax { .. })),
                "expected syntax error for {source:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn empty_source_is_not_an_error() {
        assert!(parse_functions("").unwrap().is_empty());
        assert!(parse_functions("  // nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn iteration_is_lazy_and_stops_after_error() {
        let mut it = extract_functions("float ok(); float broken(");
        assert!(it.next().unwrap().is_ok());
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    fn clones_restart_from_their_position() {
        let it = extract_functions("float a(); float b();");
        let first: Vec<_> = it.clone().collect::<Result<_, _>>().unwrap();
        let second: Vec<_> = it.collect::<Result<_, _>>().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}

//! Tokenizer for the subset of GLSL the signature extractor understands.
//!
//! Comments and whitespace are dropped, preprocessor lines come out as a single
//! [`TokenKind::Directive`] token. Characters that cannot appear in GLSL source
//! are reported as [`ParseError::InvalidSyntax`].

use crate::error::ParseError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Punct,
    Directive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: usize,
    pub column: usize,
}

impl Token<'_> {
    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }
}

const PUNCT_3: &[&str] = &["<<=", ">>="];
const PUNCT_2: &[&str] = &[
    "++", "--", "<=", ">=", "==", "!=", "&&", "||", "^^", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "<<", ">>",
];
const PUNCT_1: &str = "+-*/%=<>!&|^~?:;,.()[]{}";

#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    at_line_start: bool,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            at_line_start: true,
            failed: false,
        }
    }

    /// Current `(line, column)`; at end of input this points just past the last character.
    pub fn location(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn bump_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
    }

    fn error(&mut self, line: usize, column: usize, message: impl Into<String>) -> ParseError {
        self.failed = true;
        ParseError::invalid(line, column, message)
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek_char(), self.peek_second()) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    self.bump_while(|c| c != '\n');
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = self.location();
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek_char() {
                            None => {
                                return Err(self.error(line, column, "unterminated block comment"));
                            }
                            Some('*') if self.peek_second() == Some('/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_directive(&mut self) {
        // Directives run to the end of the line; a trailing `\` continues them.
        loop {
            self.bump_while(|c| c != '\n');
            if !self.source[..self.pos].trim_end_matches('\r').ends_with('\\') {
                break;
            }
            if self.bump().is_none() {
                break;
            }
        }
    }

    fn lex_number(&mut self) {
        let hex = self.rest().starts_with("0x") || self.rest().starts_with("0X");
        let mut prev = '\0';
        while let Some(ch) = self.peek_char() {
            let exponent_sign = !hex && (ch == '+' || ch == '-') && (prev == 'e' || prev == 'E');
            if ch.is_ascii_alphanumeric() || ch == '.' || exponent_sign {
                prev = ch;
                self.bump();
            } else {
                break;
            }
        }
    }

    fn lex_punct(&mut self) -> bool {
        let rest = self.rest();
        let width = PUNCT_3
            .iter()
            .find(|p| rest.starts_with(**p))
            .or_else(|| PUNCT_2.iter().find(|p| rest.starts_with(**p)))
            .map(|p| p.len())
            .or_else(|| {
                rest.chars()
                    .next()
                    .filter(|c| PUNCT_1.contains(*c))
                    .map(|_| 1)
            });
        match width {
            Some(n) => {
                for _ in 0..n {
                    self.bump();
                }
                true
            }
            None => false,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        self.skip_trivia()?;
        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };

        let (line, column) = self.location();
        let start = self.pos;
        let kind = if ch == '#' {
            if !self.at_line_start {
                return Err(self.error(line, column, "`#` must start a preprocessor line"));
            }
            self.lex_directive();
            TokenKind::Directive
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            self.bump_while(|c| c.is_ascii_alphanumeric() || c == '_');
            TokenKind::Ident
        } else if ch.is_ascii_digit()
            || (ch == '.' && self.peek_second().is_some_and(|c| c.is_ascii_digit()))
        {
            self.lex_number();
            TokenKind::Number
        } else if self.lex_punct() {
            TokenKind::Punct
        } else {
            return Err(self.error(line, column, format!("unexpected character `{ch}`")));
        };

        self.at_line_start = false;
        Ok(Some(Token {
            kind,
            text: &self.source[start..self.pos],
            line,
            column,
        }))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_texts(source: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(source)
            .map(|t| t.map(|t| (t.kind, t.text.to_string())))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn skips_comments_and_whitespace() {
        let tokens = kinds_and_texts("float /* a */ x; // trailing\n");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Ident, "float".to_string()),
                (TokenKind::Ident, "x".to_string()),
                (TokenKind::Punct, ";".to_string()),
            ]
        );
    }

    #[test]
    fn lexes_numbers_and_operators() {
        let tokens = kinds_and_texts("a += 1.5e-3 * .5 >>= 0x1F;");
        let texts: Vec<&str> = tokens.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", "+=", "1.5e-3", "*", ".5", ">>=", "0x1F", ";"]);
        assert_eq!(tokens[2].0, TokenKind::Number);
    }

    #[test]
    fn directives_span_the_line() {
        let tokens = kinds_and_texts("#define FOO \\\n  1\nfloat");
        assert_eq!(tokens[0].0, TokenKind::Directive);
        assert_eq!(tokens[0].1, "#define FOO \\\n  1");
        assert_eq!(tokens[1], (TokenKind::Ident, "float".to_string()));
    }

    #[test]
    fn reports_positions() {
        let mut lexer = Lexer::new("\n  vec3 @");
        let t = lexer.next().unwrap().unwrap();
        assert_eq!((t.line, t.column), (2, 3));
        let err = lexer.next().unwrap().unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidSyntax {
                line: 2,
                column: 8,
                message: "unexpected character `@`".to_string()
            }
        );
        assert!(lexer.next().is_none());
    }

    #[test]
    fn location_tracks_consumed_input() {
        let mut lexer = Lexer::new("float\n  x");
        assert_eq!(lexer.location(), (1, 1));
        lexer.next().unwrap().unwrap();
        assert_eq!(lexer.location(), (1, 6));
        lexer.next().unwrap().unwrap();
        assert_eq!(lexer.location(), (2, 4));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        let result: Result<Vec<_>, _> = Lexer::new("float x; /* never closed").collect();
        assert!(result.is_err());
    }

    #[test]
    fn hash_inside_a_line_is_an_error() {
        let result: Result<Vec<_>, _> = Lexer::new("float # x").collect();
        assert!(result.is_err());
    }
}

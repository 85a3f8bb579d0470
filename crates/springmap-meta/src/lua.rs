//! mapinfo.lua table-expression parsing.
//!
//! Parses `return { ... }` with a hand-written lexer and recursive-descent
//! parser. The lexer never fails (unknown bytes are skipped, unterminated
//! strings run to end of input); the parser fails only when the outer
//! table structure itself is missing. Inside a table, a malformed field is
//! skipped up to the next separator and omitted from the result.

use std::collections::BTreeMap;

use crate::{Error, Result, Value};

/// Parse a `mapinfo.lua` byte buffer into a [`Value::Table`].
pub fn parse_mapinfo(input: &[u8]) -> Result<Value> {
    let tokens = Lexer::new(input).tokenize();
    Parser::new(tokens).parse_document()
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Eq,
    Comma,
    Semi,
    Minus,
    Ident(String),
    Str(String),
    Num(f64),
    Eof,
}

struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    fn tokenize(mut self) -> Vec<(usize, Token)> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let offset = self.pos;
            let Some(&b) = self.src.get(self.pos) else {
                tokens.push((offset, Token::Eof));
                return tokens;
            };

            let token = match b {
                b'{' => {
                    self.pos += 1;
                    Token::LBrace
                }
                b'}' => {
                    self.pos += 1;
                    Token::RBrace
                }
                b'[' if self.src.get(self.pos + 1) == Some(&b'[') => {
                    Token::Str(self.lex_long_string())
                }
                b'[' => {
                    self.pos += 1;
                    Token::LBracket
                }
                b']' => {
                    self.pos += 1;
                    Token::RBracket
                }
                b'=' => {
                    self.pos += 1;
                    Token::Eq
                }
                b',' => {
                    self.pos += 1;
                    Token::Comma
                }
                b';' => {
                    self.pos += 1;
                    Token::Semi
                }
                b'-' => {
                    self.pos += 1;
                    Token::Minus
                }
                b'"' | b'\'' => Token::Str(self.lex_string(b)),
                b'.' if self
                    .src
                    .get(self.pos + 1)
                    .is_some_and(|c| c.is_ascii_digit()) =>
                {
                    Token::Num(self.lex_number())
                }
                b if b.is_ascii_digit() => Token::Num(self.lex_number()),
                b if b.is_ascii_alphabetic() || b == b'_' => Token::Ident(self.lex_ident()),
                _ => {
                    // Unknown byte: drop it and keep lexing.
                    self.pos += 1;
                    continue;
                }
            };
            tokens.push((offset, token));
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.src.get(self.pos) {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'-') if self.src.get(self.pos + 1) == Some(&b'-') => {
                    self.pos += 2;
                    if self.src[self.pos..].starts_with(b"[[") {
                        self.pos += 2;
                        self.skip_until(b"]]");
                    } else {
                        while self
                            .src
                            .get(self.pos)
                            .is_some_and(|&b| b != b'\n')
                        {
                            self.pos += 1;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn skip_until(&mut self, needle: &[u8]) {
        while self.pos < self.src.len() {
            if self.src[self.pos..].starts_with(needle) {
                self.pos += needle.len();
                return;
            }
            self.pos += 1;
        }
    }

    fn lex_string(&mut self, quote: u8) -> String {
        self.pos += 1; // opening quote
        let mut out = String::new();
        while let Some(&b) = self.src.get(self.pos) {
            self.pos += 1;
            match b {
                b if b == quote => return out,
                b'\\' => {
                    let Some(&esc) = self.src.get(self.pos) else {
                        return out;
                    };
                    self.pos += 1;
                    out.push(match esc {
                        b'n' => '\n',
                        b't' => '\t',
                        b'r' => '\r',
                        other => other as char,
                    });
                }
                _ => out.push(b as char),
            }
        }
        out // unterminated: everything up to end of input
    }

    fn lex_long_string(&mut self) -> String {
        self.pos += 2; // opening [[
        let start = self.pos;
        while self.pos < self.src.len() {
            if self.src[self.pos..].starts_with(b"]]") {
                let s = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
                self.pos += 2;
                return s;
            }
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.src[start..]).into_owned()
    }

    fn lex_number(&mut self) -> f64 {
        let start = self.pos;
        if self.src[self.pos..].starts_with(b"0x") || self.src[self.pos..].starts_with(b"0X") {
            self.pos += 2;
            let hex_start = self.pos;
            while self
                .src
                .get(self.pos)
                .is_some_and(|b| b.is_ascii_hexdigit())
            {
                self.pos += 1;
            }
            let text = std::str::from_utf8(&self.src[hex_start..self.pos]).unwrap_or("");
            return u64::from_str_radix(text, 16).unwrap_or(0) as f64;
        }

        while self
            .src
            .get(self.pos)
            .is_some_and(|&b| b.is_ascii_digit() || b == b'.')
        {
            self.pos += 1;
        }
        if self
            .src
            .get(self.pos)
            .is_some_and(|&b| b == b'e' || b == b'E')
        {
            self.pos += 1;
            if self
                .src
                .get(self.pos)
                .is_some_and(|&b| b == b'+' || b == b'-')
            {
                self.pos += 1;
            }
            while self.src.get(self.pos).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        std::str::from_utf8(&self.src[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0)
    }

    fn lex_ident(&mut self) -> String {
        let start = self.pos;
        while self
            .src
            .get(self.pos)
            .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }
}

/// A table key before normalization.
#[derive(Debug)]
enum Key {
    Int(i64),
    Name(String),
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<(usize, Token)>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|(_, t)| t)
            .unwrap_or(&Token::Eof)
    }

    fn peek2(&self) -> &Token {
        self.tokens
            .get(self.pos + 1)
            .map(|(_, t)| t)
            .unwrap_or(&Token::Eof)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(o, _)| *o).unwrap_or(0)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn syntax(&self, message: impl Into<String>) -> Error {
        Error::Syntax {
            offset: self.offset(),
            message: message.into(),
        }
    }

    fn parse_document(mut self) -> Result<Value> {
        if matches!(self.peek(), Token::Ident(kw) if kw == "return") {
            self.bump();
        }
        if !matches!(self.peek(), Token::LBrace) {
            return Err(Error::NotATable);
        }
        self.parse_table()
    }

    fn parse_table(&mut self) -> Result<Value> {
        self.bump(); // {
        let mut entries: Vec<(Option<Key>, Value)> = Vec::new();

        loop {
            match self.peek() {
                Token::RBrace => {
                    self.bump();
                    break;
                }
                Token::Eof => break, // unterminated table: keep what we have
                Token::Comma | Token::Semi => {
                    self.bump();
                }
                _ => match self.parse_field() {
                    Ok(Some(entry)) => entries.push(entry),
                    Ok(None) => {} // nil-valued field: omitted
                    Err(_) => self.recover(),
                },
            }
        }

        Ok(finalize(entries))
    }

    fn parse_field(&mut self) -> Result<Option<(Option<Key>, Value)>> {
        match (self.peek(), self.peek2()) {
            (Token::LBracket, _) => {
                self.bump();
                let key = self.parse_key()?;
                if !matches!(self.bump(), Token::RBracket) {
                    return Err(self.syntax("expected ']' after table key"));
                }
                if !matches!(self.bump(), Token::Eq) {
                    return Err(self.syntax("expected '=' after table key"));
                }
                Ok(self.parse_value()?.map(|v| (Some(key), v)))
            }
            (Token::Ident(_), Token::Eq) => {
                let Token::Ident(name) = self.bump() else {
                    unreachable!()
                };
                self.bump(); // =
                Ok(self.parse_value()?.map(|v| (Some(Key::Name(name)), v)))
            }
            _ => Ok(self.parse_value()?.map(|v| (None, v))),
        }
    }

    fn parse_key(&mut self) -> Result<Key> {
        match self.bump() {
            Token::Num(n) if n.fract() == 0.0 => Ok(Key::Int(n as i64)),
            Token::Num(n) => Ok(Key::Name(n.to_string())),
            Token::Minus => match self.bump() {
                Token::Num(n) => Ok(Key::Int(-n as i64)),
                _ => Err(self.syntax("expected number after '-'")),
            },
            Token::Str(s) => Ok(Key::Name(s)),
            _ => Err(self.syntax("unsupported table key")),
        }
    }

    /// Parse one value; `Ok(None)` means an explicit `nil`.
    fn parse_value(&mut self) -> Result<Option<Value>> {
        match self.peek() {
            Token::LBrace => self.parse_table().map(Some),
            Token::Str(_) => {
                let Token::Str(s) = self.bump() else {
                    unreachable!()
                };
                Ok(Some(Value::String(s)))
            }
            Token::Num(_) => {
                let Token::Num(n) = self.bump() else {
                    unreachable!()
                };
                Ok(Some(Value::Number(n)))
            }
            Token::Minus => {
                self.bump();
                match self.bump() {
                    Token::Num(n) => Ok(Some(Value::Number(-n))),
                    _ => Err(self.syntax("expected number after unary '-'")),
                }
            }
            Token::Ident(kw) if kw == "true" => {
                self.bump();
                Ok(Some(Value::Bool(true)))
            }
            Token::Ident(kw) if kw == "false" => {
                self.bump();
                Ok(Some(Value::Bool(false)))
            }
            Token::Ident(kw) if kw == "nil" => {
                self.bump();
                Ok(None)
            }
            _ => Err(self.syntax("expected a value")),
        }
    }

    /// Skip to the next field separator (or table end) at the current
    /// nesting depth, dropping the malformed field.
    fn recover(&mut self) {
        let mut depth = 0i32;
        loop {
            match self.peek() {
                Token::Eof => return,
                Token::LBrace | Token::LBracket => {
                    depth += 1;
                    self.bump();
                }
                // Only an unmatched '}' may close the enclosing table; a
                // stray ']' is part of the malformed field and is skipped.
                Token::RBrace if depth == 0 => return,
                Token::RBrace | Token::RBracket => {
                    depth = (depth - 1).max(0);
                    self.bump();
                }
                Token::Comma | Token::Semi if depth == 0 => return,
                _ => {
                    self.bump();
                }
            }
        }
    }
}

/// Normalize collected entries: dense integer-keyed tables become lists,
/// everything else becomes a string-keyed table.
fn finalize(entries: Vec<(Option<Key>, Value)>) -> Value {
    let mut ints: BTreeMap<i64, Value> = BTreeMap::new();
    let mut named: BTreeMap<String, Value> = BTreeMap::new();
    let mut next_index = 1i64;

    for (key, value) in entries {
        match key {
            None => {
                ints.insert(next_index, value);
                next_index += 1;
            }
            Some(Key::Int(i)) => {
                ints.insert(i, value);
            }
            Some(Key::Name(name)) => {
                named.insert(name, value);
            }
        }
    }

    if named.is_empty() && !ints.is_empty() {
        let dense = ints
            .keys()
            .enumerate()
            .all(|(i, &k)| k == i as i64 + 1);
        if dense {
            return Value::List(ints.into_values().collect());
        }
    }

    for (k, v) in ints {
        named.insert(k.to_string(), v);
    }
    Value::Table(named)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_mapinfo() {
        let src = br#"
            -- map description
            return {
                name = "Red Comet",
                version = "1.3.1",
                mapHardness = 100,
                extractorRadius = 100,
                autoShowMetal = true,
            }
        "#;
        let v = parse_mapinfo(src).unwrap();

        assert_eq!(v.str_at("name"), Some("Red Comet"));
        assert_eq!(v.f64_at("extractorRadius"), Some(100.0));
        assert_eq!(v.lookup("autoShowMetal").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_nested_tables_and_lists() {
        let src = br#"return {
            atmosphere = { skyBox = "sprites/sky.dds", cloudColor = { 0.9, 0.9, 0.95 } },
            teams = {
                [0] = { startPos = { x = 100, z = 200 } },
                [1] = { startPos = { x = 7000, z = 6500 } },
            },
        }"#;
        let v = parse_mapinfo(src).unwrap();

        assert_eq!(v.str_at("atmosphere.skyBox"), Some("sprites/sky.dds"));
        let clouds = v.lookup("atmosphere.cloudColor").unwrap().as_list().unwrap();
        assert_eq!(clouds.len(), 3);
        assert_eq!(clouds[0].as_f64(), Some(0.9));
        // [0]-based keys are not dense from 1, so teams stays a table.
        assert_eq!(v.f64_at("teams.0.startPos.x"), Some(100.0));
        assert_eq!(v.f64_at("teams.1.startPos.z"), Some(6500.0));
    }

    #[test]
    fn test_unary_minus_and_numbers() {
        let src = b"return { minHeight = -50, maxHeight = 2.5e2, mask = 0xFF, half = .5 }";
        let v = parse_mapinfo(src).unwrap();

        assert_eq!(v.f64_at("minHeight"), Some(-50.0));
        assert_eq!(v.f64_at("maxHeight"), Some(250.0));
        assert_eq!(v.f64_at("mask"), Some(255.0));
        assert_eq!(v.f64_at("half"), Some(0.5));
    }

    #[test]
    fn test_malformed_field_is_omitted() {
        // `voidWater = f(3)` is not a literal; the field is dropped but
        // its neighbours survive.
        let src = b"return { before = 1, voidWater = f(3), after = 2 }";
        let v = parse_mapinfo(src).unwrap();

        assert_eq!(v.f64_at("before"), Some(1.0));
        assert_eq!(v.lookup("voidWater"), None);
        assert_eq!(v.f64_at("after"), Some(2.0));
    }

    #[test]
    fn test_comments_and_strings() {
        let src = br#"return {
            --[[ block
                 comment ]]
            description = [[long 'quoted' text]],
            quote = 'it\'s',
        }"#;
        let v = parse_mapinfo(src).unwrap();

        assert_eq!(v.str_at("description"), Some("long 'quoted' text"));
        assert_eq!(v.str_at("quote"), Some("it's"));
    }

    #[test]
    fn test_not_a_table() {
        assert!(matches!(
            parse_mapinfo(b"print('hello')"),
            Err(Error::NotATable)
        ));
        assert!(matches!(parse_mapinfo(b""), Err(Error::NotATable)));
    }

    #[test]
    fn test_nil_field_omitted() {
        let v = parse_mapinfo(b"return { a = nil, b = 1 }").unwrap();
        assert_eq!(v.lookup("a"), None);
        assert_eq!(v.f64_at("b"), Some(1.0));
    }

    #[test]
    fn test_dense_list_detection() {
        let v = parse_mapinfo(b"return { list = { 'a', 'b', 'c' } }").unwrap();
        let items = v.lookup("list").unwrap().as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].as_str(), Some("c"));

        // Sparse integer keys stay a table.
        let v = parse_mapinfo(b"return { sparse = { [1] = 'a', [3] = 'c' } }").unwrap();
        assert!(v.lookup("sparse").unwrap().as_table().is_some());
        assert_eq!(v.str_at("sparse.3"), Some("c"));
    }
}

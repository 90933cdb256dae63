//! Parser for Rust-style function signature text

use super::{FunctionSignature, Parameter, TypeAnnotation};
use crate::error::{Error, Result};
use serde_json::Value;

pub(super) fn parse_signature(source: &str) -> Result<FunctionSignature> {
    let mut parser = Parser { src: source, pos: 0 };
    let signature = parser.signature()?;
    tracing::trace!(name = %signature.name, params = signature.params.len(), "parsed signature");
    Ok(signature)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::SignatureParse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            let found = self.peek().map_or_else(|| "end of input".to_string(), |f| format!("'{f}'"));
            Err(self.error(format!("expected '{c}', found {found}")))
        }
    }

    fn ident(&mut self) -> Result<String> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .char_indices()
            .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .unwrap_or(0);
        let ident = &rest[..len];
        if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(self.error("expected identifier"));
        }
        self.pos += len;
        Ok(ident.to_string())
    }

    /// Consume `word` only when it stands alone as a keyword
    fn keyword(&mut self, word: &str) -> bool {
        self.skip_ws();
        let standalone = match self.rest().strip_prefix(word) {
            Some(after) => after
                .chars()
                .next()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_')),
            None => false,
        };
        if standalone {
            self.pos += word.len();
        }
        standalone
    }

    fn lifetime(&mut self) -> Result<bool> {
        if self.eat('\'') {
            self.ident()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn string_literal(&mut self) -> Result<String> {
        if self.peek() != Some('"') {
            return Err(self.error("expected string literal"));
        }
        let start = self.pos;
        let mut escaped = false;
        for (i, c) in self.rest().char_indices().skip(1) {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => {
                    let end = start + i + 1;
                    let literal = &self.src[start..end];
                    let value: String = serde_json::from_str(literal)
                        .map_err(|e| self.error(format!("invalid string literal: {e}")))?;
                    self.pos = end;
                    return Ok(value);
                }
                _ => {}
            }
        }
        Err(self.error("unterminated string literal"))
    }

    fn signature(&mut self) -> Result<FunctionSignature> {
        if self.keyword("pub") && self.peek() == Some('(') {
            self.skip_balanced('(', ')')?;
        }
        for qualifier in ["const", "async", "unsafe"] {
            self.keyword(qualifier);
        }
        self.keyword("fn");
        let name = self.ident()?;
        if self.peek() == Some('<') {
            self.skip_balanced('<', '>')?;
        }
        self.expect('(')?;
        let params = self.params()?;
        if self.eat_str("->") {
            self.type_annotation()?;
        }

        self.skip_ws();
        let rest = self.rest().trim();
        if !(rest.is_empty() || rest == ";" || rest.starts_with('{') || rest.starts_with("where")) {
            return Err(self.error(format!("unexpected trailing input '{rest}'")));
        }

        Ok(FunctionSignature { name, params })
    }

    fn params(&mut self) -> Result<Vec<Parameter>> {
        let mut params = Vec::new();
        loop {
            if self.eat(')') {
                return Ok(params);
            }
            if let Some(param) = self.param()? {
                if params.iter().any(|p: &Parameter| p.name == param.name) {
                    return Err(self.error(format!("duplicate parameter '{}'", param.name)));
                }
                params.push(param);
            }
            if !self.eat(',') {
                self.expect(')')?;
                return Ok(params);
            }
        }
    }

    /// One parameter, or `None` for a `self` receiver
    fn param(&mut self) -> Result<Option<Parameter>> {
        let start = self.pos;
        if self.eat('&') {
            self.lifetime()?;
        }
        self.keyword("mut");
        if self.keyword("self") {
            if self.eat(':') {
                self.type_annotation()?;
            }
            return Ok(None);
        }
        self.pos = start;

        self.keyword("mut");
        let name = self.ident()?;
        self.expect(':')?;
        let annotation = self.type_annotation()?;
        let default = if self.eat('=') { Some(self.default_value()?) } else { None };
        Ok(Some(Parameter {
            name,
            annotation,
            default,
        }))
    }

    /// Raw default text up to the next top-level `,` or `)`, read as JSON
    fn default_value(&mut self) -> Result<Value> {
        self.skip_ws();
        let start = self.pos;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut end = self.src.len();

        for (i, c) in self.rest().char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '[' | '{' | '(' => depth += 1,
                ']' | '}' if depth > 0 => depth -= 1,
                ')' if depth > 0 => depth -= 1,
                ',' | ')' if depth == 0 => {
                    end = start + i;
                    break;
                }
                _ => {}
            }
        }

        let text = self.src[start..end].trim();
        if text.is_empty() {
            return Err(self.error("missing default value after '='"));
        }
        let value = match text {
            "None" => Value::Null,
            _ => serde_json::from_str(text)
                .map_err(|e| self.error(format!("default '{text}' is not a JSON value: {e}")))?,
        };
        self.pos = end;
        Ok(value)
    }

    fn type_annotation(&mut self) -> Result<TypeAnnotation> {
        match self.peek() {
            Some('"') => {
                let mut values = vec![self.string_literal()?];
                while self.eat('|') {
                    values.push(self.string_literal()?);
                }
                Ok(TypeAnnotation::Literal(values))
            }
            Some('&') => {
                self.eat('&');
                self.lifetime()?;
                self.keyword("mut");
                self.type_annotation()
            }
            Some('[') => {
                self.eat('[');
                let inner = self.type_annotation()?;
                if self.eat(';') {
                    self.skip_until(']')?;
                }
                self.expect(']')?;
                Ok(TypeAnnotation::Slice(Box::new(inner)))
            }
            Some('(') => {
                self.eat('(');
                let mut items = Vec::new();
                while !self.eat(')') {
                    items.push(self.type_annotation()?);
                    if !self.eat(',') {
                        self.expect(')')?;
                        break;
                    }
                }
                Ok(TypeAnnotation::Tuple(items))
            }
            Some('{') => {
                self.eat('{');
                let mut fields = Vec::new();
                while !self.eat('}') {
                    let name = self.ident()?;
                    self.expect(':')?;
                    let ty = self.type_annotation()?;
                    fields.push((name, ty));
                    if !self.eat(',') {
                        self.expect('}')?;
                        break;
                    }
                }
                Ok(TypeAnnotation::Struct(fields))
            }
            Some(_) => {
                self.keyword("dyn");
                self.keyword("impl");
                let mut segments = vec![self.ident()?];
                while self.eat_str("::") {
                    segments.push(self.ident()?);
                }
                let mut args = Vec::new();
                if self.eat('<') {
                    while !self.eat('>') {
                        if !self.lifetime()? {
                            args.push(self.type_annotation()?);
                        }
                        if !self.eat(',') {
                            self.expect('>')?;
                            break;
                        }
                    }
                }
                Ok(TypeAnnotation::Path { segments, args })
            }
            None => Err(self.error("expected a type")),
        }
    }

    fn skip_until(&mut self, close: char) -> Result<()> {
        match self.rest().find(close) {
            Some(offset) => {
                self.pos += offset;
                Ok(())
            }
            None => Err(self.error(format!("expected '{close}'"))),
        }
    }

    fn skip_balanced(&mut self, open: char, close: char) -> Result<()> {
        self.expect(open)?;
        let mut depth = 1usize;
        for (i, c) in self.rest().char_indices() {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    self.pos += i + c.len_utf8();
                    return Ok(());
                }
            }
        }
        Err(self.error(format!("unbalanced '{open}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_signature() {
        let signature = parse_signature(
            r#"pub async fn create_user(&self, name: String, age: i64, rating: f64 = 4.5,
                status: "new" | "active" = "active", tags: Option<Vec<String>>) -> Result<(), Error>"#,
        )
        .unwrap();
        assert_eq!(signature.name, "create_user");
        let names: Vec<_> = signature.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age", "rating", "status", "tags"]);
        assert_eq!(signature.params[2].default, Some(json!(4.5)));
        assert_eq!(
            signature.params[3].annotation,
            TypeAnnotation::Literal(vec!["new".into(), "active".into()])
        );
        assert_eq!(signature.params[3].default, Some(json!("active")));
    }

    #[test]
    fn test_parse_references_and_structs() {
        let signature = parse_signature(
            "fn f<'a>(label: &'a str, meta: HashMap<String, serde_json::Value> = {\"a\": [1, 2]}, \
             profile: { first: String, age: u8 }, raw: [u8; 16])",
        )
        .unwrap();
        assert_eq!(signature.params[0].annotation, TypeAnnotation::named("str"));
        assert_eq!(signature.params[1].default, Some(json!({"a": [1, 2]})));
        assert!(matches!(signature.params[2].annotation, TypeAnnotation::Struct(ref fields) if fields.len() == 2));
        assert!(matches!(signature.params[3].annotation, TypeAnnotation::Slice(_)));
    }

    #[test]
    fn test_parse_errors_carry_offset() {
        let err = parse_signature("fn broken(a: i64 b: i64)").unwrap_err();
        match err {
            Error::SignatureParse { offset, .. } => assert_eq!(offset, 17),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(parse_signature("fn f(a: i64 = )").is_err());
        assert!(parse_signature("fn f(a: i64, a: bool)").is_err());
        assert!(parse_signature("fn f(a: \"x\" | )").is_err());
    }

    #[test]
    fn test_none_default_is_null() {
        let signature = parse_signature("fn f(birthday: Option<NaiveDate> = None)").unwrap();
        assert_eq!(signature.params[0].default, Some(Value::Null));
    }
}

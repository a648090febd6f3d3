//! Unresolved type signatures
//!
//! Source-level type text is encoded the way an unresolved (not
//! type-checked) signature is written: `QName;` for reference types,
//! generic arguments between `<` and `>`, `[` per array dimension and a
//! single letter per primitive. `Map<String, Object>` becomes
//! `QMap<QString;QObject;>;`.

use std::iter::Peekable;
use std::str::Chars;

/// Encode a Java type as written in source
pub fn encode_type(text: &str) -> String {
    let mut cursor = Cursor {
        chars: text.chars().peekable(),
        consumed: 0,
    };
    cursor.type_signature()
}

/// Single-letter code of a primitive type
pub fn primitive_code(name: &str) -> Option<char> {
    Some(match name {
        "byte" => 'B',
        "char" => 'C',
        "double" => 'D',
        "float" => 'F',
        "int" => 'I',
        "long" => 'J',
        "short" => 'S',
        "boolean" => 'Z',
        "void" => 'V',
        _ => return None,
    })
}

struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    consumed: usize,
}

impl Cursor<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.consumed += 1;
        }
        c
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Skip whitespace and type annotations such as `@NonNull`
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('@') => {
                    self.bump();
                    self.qualified_name();
                    self.skip_whitespace();
                    if self.peek() == Some('(') {
                        self.skip_parenthesized();
                    }
                }
                _ => return,
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_parenthesized(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                ident.push(c);
                self.bump();
            } else {
                break;
            }
        }
        ident
    }

    fn qualified_name(&mut self) -> String {
        let mut name = self.identifier();
        loop {
            self.skip_whitespace();
            if self.peek() != Some('.') {
                return name;
            }
            self.bump();
            self.skip_trivia();
            name.push('.');
            name.push_str(&self.identifier());
        }
    }

    fn type_signature(&mut self) -> String {
        self.skip_trivia();

        if self.eat('?') {
            self.skip_trivia();
            return match self.identifier().as_str() {
                "extends" => format!("+{}", self.type_signature()),
                "super" => format!("-{}", self.type_signature()),
                _ => "*".to_string(),
            };
        }

        let base = self.base_type();

        let mut dimensions = 0;
        loop {
            self.skip_trivia();
            if self.eat('[') {
                self.skip_whitespace();
                self.eat(']');
                dimensions += 1;
            } else {
                break;
            }
        }

        format!("{}{}", "[".repeat(dimensions), base)
    }

    fn base_type(&mut self) -> String {
        let name = self.qualified_name();
        if let Some(code) = primitive_code(&name) {
            return code.to_string();
        }

        let mut out = format!("Q{}", name);
        loop {
            self.skip_whitespace();
            if self.eat('<') {
                out.push('<');
                self.type_arguments(&mut out);
                out.push('>');
                continue;
            }
            // Member type of a parameterized type: `Outer<T>.Inner`
            if out.ends_with('>') && self.eat('.') {
                out.push('.');
                out.push_str(&self.identifier());
                continue;
            }
            break;
        }
        out.push(';');
        out
    }

    fn type_arguments(&mut self, out: &mut String) {
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return,
                Some('>') => {
                    self.bump();
                    return;
                }
                Some(',') => {
                    self.bump();
                }
                Some(_) => {
                    let before = self.consumed;
                    out.push_str(&self.type_signature());
                    if self.consumed == before {
                        // Unknown character, drop it
                        self.bump();
                    }
                }
            }
        }
    }
}

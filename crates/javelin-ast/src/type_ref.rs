//! Syntax-level type references.
//!
//! These are what the source wrote, before any name resolution: `List<String>`
//! stays a bare `List` segment with one argument until a resolver decides which
//! `List` is meant.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl PrimitiveKind {
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "boolean" => PrimitiveKind::Boolean,
            "byte" => PrimitiveKind::Byte,
            "short" => PrimitiveKind::Short,
            "int" => PrimitiveKind::Int,
            "long" => PrimitiveKind::Long,
            "char" => PrimitiveKind::Char,
            "float" => PrimitiveKind::Float,
            "double" => PrimitiveKind::Double,
            _ => return None,
        })
    }

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassTypeSegment {
    pub name: String,
    /// `None` when no `<...>` was written, `Some(vec![])` for the diamond `<>`.
    pub type_args: Option<Vec<TypeRef>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassTypeRef {
    pub segments: Vec<ClassTypeSegment>,
}

impl ClassTypeRef {
    /// Dotted name with type arguments stripped (`java.util.Map.Entry`).
    #[must_use]
    pub fn name(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Type arguments of the innermost segment.
    #[must_use]
    pub fn type_args(&self) -> &[TypeRef] {
        self.segments
            .last()
            .and_then(|segment| segment.type_args.as_deref())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardRef {
    Unbounded,
    Extends(Box<TypeRef>),
    Super(Box<TypeRef>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    Void,
    Class(ClassTypeRef),
    Array(Box<TypeRef>),
    Wildcard(WildcardRef),
}

impl TypeRef {
    /// A class type without arguments, for each dotted segment of `name`.
    #[must_use]
    pub fn named(name: &str) -> TypeRef {
        TypeRef::Class(ClassTypeRef {
            segments: name
                .split('.')
                .map(|segment| ClassTypeSegment {
                    name: segment.to_string(),
                    type_args: None,
                })
                .collect(),
        })
    }

    #[must_use]
    pub fn array_of(component: TypeRef) -> TypeRef {
        TypeRef::Array(Box::new(component))
    }

    /// Parses a type from the start of `text`, returning the unconsumed rest.
    pub fn parse_prefix(text: &str) -> Result<(TypeRef, &str), ParseTypeRefError> {
        let mut parser = Parser { text, pos: 0 };
        let ty = parser.parse_type(true)?;
        Ok((ty, &text[parser.pos..]))
    }
}

impl FromStr for TypeRef {
    type Err = ParseTypeRefError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (ty, rest) = TypeRef::parse_prefix(text)?;
        if !rest.trim().is_empty() {
            return Err(ParseTypeRefError::TrailingInput {
                text: text.to_string(),
                rest: rest.trim().to_string(),
            });
        }
        Ok(ty)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(kind) => f.write_str(kind.keyword()),
            TypeRef::Void => f.write_str("void"),
            TypeRef::Class(class) => {
                for (idx, segment) in class.segments.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&segment.name)?;
                    if let Some(args) = &segment.type_args {
                        f.write_str("<")?;
                        for (arg_idx, arg) in args.iter().enumerate() {
                            if arg_idx > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{arg}")?;
                        }
                        f.write_str(">")?;
                    }
                }
                Ok(())
            }
            TypeRef::Array(component) => write!(f, "{component}[]"),
            TypeRef::Wildcard(WildcardRef::Unbounded) => f.write_str("?"),
            TypeRef::Wildcard(WildcardRef::Extends(bound)) => write!(f, "? extends {bound}"),
            TypeRef::Wildcard(WildcardRef::Super(bound)) => write!(f, "? super {bound}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseTypeRefError {
    #[error("expected {expected} at offset {offset} in `{text}`")]
    Expected {
        expected: &'static str,
        offset: usize,
        text: String,
    },
    #[error("unexpected trailing input `{rest}` in `{text}`")]
    TrailingInput { text: String, rest: String },
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse_type(&mut self, allow_void: bool) -> Result<TypeRef, ParseTypeRefError> {
        self.skip_ws();
        if self.consume_char('?') {
            return self.parse_wildcard_tail();
        }

        let word = self.ident().ok_or_else(|| self.expected("a type"))?;
        let mut ty = if word == "void" && allow_void {
            TypeRef::Void
        } else if let Some(kind) = PrimitiveKind::from_keyword(word) {
            TypeRef::Primitive(kind)
        } else {
            TypeRef::Class(self.parse_class_type(word)?)
        };

        loop {
            self.skip_ws();
            if !self.rest().starts_with("[]") {
                break;
            }
            self.pos += 2;
            ty = TypeRef::array_of(ty);
        }
        Ok(ty)
    }

    fn parse_wildcard_tail(&mut self) -> Result<TypeRef, ParseTypeRefError> {
        self.skip_ws();
        let checkpoint = self.pos;
        let bound = match self.ident() {
            Some("extends") => WildcardRef::Extends(Box::new(self.parse_type(false)?)),
            Some("super") => WildcardRef::Super(Box::new(self.parse_type(false)?)),
            _ => {
                self.pos = checkpoint;
                WildcardRef::Unbounded
            }
        };
        Ok(TypeRef::Wildcard(bound))
    }

    fn parse_class_type(&mut self, first: &str) -> Result<ClassTypeRef, ParseTypeRefError> {
        let mut segments = vec![ClassTypeSegment {
            name: first.to_string(),
            type_args: self.parse_type_args()?,
        }];
        loop {
            self.skip_ws();
            // `...` is a varargs marker, not a qualified name separator.
            if !self.rest().starts_with('.') || self.rest().starts_with("...") {
                break;
            }
            self.pos += 1;
            self.skip_ws();
            let name = self.ident().ok_or_else(|| self.expected("an identifier"))?;
            segments.push(ClassTypeSegment {
                name: name.to_string(),
                type_args: self.parse_type_args()?,
            });
        }
        Ok(ClassTypeRef { segments })
    }

    fn parse_type_args(&mut self) -> Result<Option<Vec<TypeRef>>, ParseTypeRefError> {
        self.skip_ws();
        if !self.consume_char('<') {
            return Ok(None);
        }
        let mut args = Vec::new();
        self.skip_ws();
        if self.consume_char('>') {
            return Ok(Some(args));
        }
        loop {
            args.push(self.parse_type(false)?);
            self.skip_ws();
            if self.consume_char(',') {
                continue;
            }
            if self.consume_char('>') {
                return Ok(Some(args));
            }
            return Err(self.expected("`,` or `>`"));
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        let (_, first) = chars.next()?;
        if !(unicode_ident::is_xid_start(first) || first == '_' || first == '$') {
            return None;
        }
        let end = chars
            .find(|&(_, ch)| !(unicode_ident::is_xid_continue(ch) || ch == '$'))
            .map_or(rest.len(), |(idx, _)| idx);
        self.pos += end;
        Some(&rest[..end])
    }

    fn consume_char(&mut self, ch: char) -> bool {
        if self.rest().starts_with(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn expected(&self, expected: &'static str) -> ParseTypeRefError {
        ParseTypeRefError::Expected {
            expected,
            offset: self.pos,
            text: self.text.to_string(),
        }
    }
}

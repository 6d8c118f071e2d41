//! The generic `Signature` attribute grammar (JVMS 4.7.9.1).
//!
//! Parsing is strict: anything the grammar does not describe, including
//! trailing characters after a complete signature, is an error. Callers that
//! can live without generics fall back to the erased descriptor themselves.

use crate::descriptor::BaseType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Class(ClassTypeSignature),
    TypeVariable(String),
    Array(Box<TypeSignature>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// Package in internal form (`java/util`), empty for the default package.
    pub package: String,
    /// Outermost class first; nested classes follow `.` suffixes.
    pub segments: Vec<SimpleClassTypeSignature>,
}

impl ClassTypeSignature {
    /// Binary internal name, e.g. `java/util/Map$Entry`.
    #[must_use]
    pub fn internal_name(&self) -> String {
        let nested = self
            .segments
            .iter()
            .map(|segment| segment.name.as_str())
            .collect::<Vec<_>>()
            .join("$");
        if self.package.is_empty() {
            nested
        } else {
            format!("{}/{}", self.package, nested)
        }
    }

    /// Arguments applied to the innermost class.
    #[must_use]
    pub fn type_arguments(&self) -> &[TypeArgument] {
        self.segments
            .last()
            .map_or(&[], |segment| segment.type_arguments.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleClassTypeSignature {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Any,
    Exact(TypeSignature),
    Extends(TypeSignature),
    Super(TypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

impl TypeParameter {
    /// Class bound followed by interface bounds.
    pub fn bounds(&self) -> impl Iterator<Item = &TypeSignature> {
        self.class_bound.iter().chain(&self.interface_bounds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `V`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<TypeSignature>,
}

pub fn parse_class_signature(signature: &str) -> Result<ClassSignature> {
    let mut parser = Parser::new(signature);
    let type_parameters = parser.type_parameters()?;
    let super_class = parser.class_type()?;
    let mut interfaces = Vec::new();
    while !parser.at_end() {
        interfaces.push(parser.class_type()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

pub fn parse_method_signature(signature: &str) -> Result<MethodSignature> {
    let mut parser = Parser::new(signature);
    let type_parameters = parser.type_parameters()?;
    parser.expect(b'(')?;
    let mut parameters = Vec::new();
    while !parser.eat(b')') {
        parameters.push(parser.java_type()?);
    }
    let return_type = if parser.eat(b'V') {
        None
    } else {
        Some(parser.java_type()?)
    };
    let mut throws = Vec::new();
    while parser.eat(b'^') {
        throws.push(parser.reference_type()?);
    }
    parser.finish()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

pub fn parse_field_signature(signature: &str) -> Result<TypeSignature> {
    let mut parser = Parser::new(signature);
    let ty = parser.reference_type()?;
    parser.finish()?;
    Ok(ty)
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Parser { text, pos: 0 }
    }

    fn error(&self) -> Error {
        Error::InvalidSignature {
            signature: self.text.to_string(),
            offset: self.pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn identifier(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if matches!(byte, b'.' | b';' | b'[' | b'/' | b'<' | b'>' | b':') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(&self.text[start..self.pos])
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        let mut params = Vec::new();
        if !self.eat(b'<') {
            return Ok(params);
        }
        loop {
            let name = self.identifier()?.to_string();
            self.expect(b':')?;
            let class_bound = match self.peek() {
                Some(b'L' | b'T' | b'[') => Some(self.reference_type()?),
                _ => None,
            };
            let mut interface_bounds = Vec::new();
            while self.eat(b':') {
                interface_bounds.push(self.reference_type()?);
            }
            params.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
            if self.eat(b'>') {
                break;
            }
        }
        Ok(params)
    }

    fn java_type(&mut self) -> Result<TypeSignature> {
        if let Some(base) = self.peek().and_then(BaseType::from_code) {
            self.pos += 1;
            return Ok(TypeSignature::Base(base));
        }
        self.reference_type()
    }

    fn reference_type(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some(b'L') => Ok(TypeSignature::Class(self.class_type()?)),
            Some(b'T') => {
                self.pos += 1;
                let name = self.identifier()?.to_string();
                self.expect(b';')?;
                Ok(TypeSignature::TypeVariable(name))
            }
            Some(b'[') => {
                self.pos += 1;
                Ok(TypeSignature::Array(Box::new(self.java_type()?)))
            }
            _ => Err(self.error()),
        }
    }

    fn class_type(&mut self) -> Result<ClassTypeSignature> {
        self.expect(b'L')?;
        let mut package_parts = Vec::new();
        let mut name = self.identifier()?;
        while self.eat(b'/') {
            package_parts.push(name);
            name = self.identifier()?;
        }
        let mut segments = vec![SimpleClassTypeSignature {
            name: name.to_string(),
            type_arguments: self.type_arguments()?,
        }];
        while self.eat(b'.') {
            let name = self.identifier()?.to_string();
            segments.push(SimpleClassTypeSignature {
                name,
                type_arguments: self.type_arguments()?,
            });
        }
        self.expect(b';')?;
        Ok(ClassTypeSignature {
            package: package_parts.join("/"),
            segments,
        })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        let mut args = Vec::new();
        if !self.eat(b'<') {
            return Ok(args);
        }
        while !self.eat(b'>') {
            let arg = match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    TypeArgument::Any
                }
                Some(b'+') => {
                    self.pos += 1;
                    TypeArgument::Extends(self.reference_type()?)
                }
                Some(b'-') => {
                    self.pos += 1;
                    TypeArgument::Super(self.reference_type()?)
                }
                Some(_) => TypeArgument::Exact(self.reference_type()?),
                None => return Err(self.error()),
            };
            args.push(arg);
        }
        if args.is_empty() {
            return Err(self.error());
        }
        Ok(args)
    }
}

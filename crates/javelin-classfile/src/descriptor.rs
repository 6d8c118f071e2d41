use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub(crate) fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    /// Internal name, e.g. `java/lang/String`.
    Object(String),
    Array(Box<FieldType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let mut pos = 0;
    let ty = parse_field_type(desc, &mut pos)?;
    if pos != desc.len() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let invalid = || Error::InvalidDescriptor(desc.to_string());
    let bytes = desc.as_bytes();
    if bytes.first() != Some(&b'(') {
        return Err(invalid());
    }

    let mut pos = 1;
    let mut params = Vec::new();
    loop {
        match bytes.get(pos) {
            Some(b')') => {
                pos += 1;
                break;
            }
            Some(_) => params.push(parse_field_type(desc, &mut pos)?),
            None => return Err(invalid()),
        }
    }

    let return_type = if bytes.get(pos) == Some(&b'V') {
        pos += 1;
        ReturnType::Void
    } else {
        ReturnType::Type(parse_field_type(desc, &mut pos)?)
    };

    if pos != desc.len() {
        return Err(invalid());
    }
    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

fn parse_field_type(desc: &str, pos: &mut usize) -> Result<FieldType> {
    let bytes = desc.as_bytes();
    let Some(&code) = bytes.get(*pos) else {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    };
    *pos += 1;
    if let Some(base) = BaseType::from_code(code) {
        return Ok(FieldType::Base(base));
    }
    match code {
        b'L' => {
            let rest = &desc[*pos..];
            let end = rest
                .find(';')
                .ok_or_else(|| Error::InvalidDescriptor(desc.to_string()))?;
            *pos += end + 1;
            Ok(FieldType::Object(rest[..end].to_string()))
        }
        b'[' => Ok(FieldType::Array(Box::new(parse_field_type(desc, pos)?))),
        _ => Err(Error::InvalidDescriptor(desc.to_string())),
    }
}

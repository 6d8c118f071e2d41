//! Minimal class file assembler.
//!
//! Emits just the structures [`ClassFile::parse`](crate::ClassFile::parse)
//! reads: no `Code` attributes, no stack maps. Useful for producing metadata
//! fixtures without a Java compiler.

use std::collections::HashMap;

use crate::classfile::InnerClassInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSpec {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub exceptions: Vec<String>,
}

impl MemberSpec {
    #[must_use]
    pub fn new(access_flags: u16, name: &str, descriptor: &str) -> Self {
        MemberSpec {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            exceptions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    #[must_use]
    pub fn with_exceptions(mut self, exceptions: &[&str]) -> Self {
        self.exceptions = exceptions.iter().map(|name| name.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone)]
pub struct ClassWriter {
    access_flags: u16,
    this_class: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    fields: Vec<MemberSpec>,
    methods: Vec<MemberSpec>,
    inner_classes: Vec<InnerClassInfo>,
}

impl ClassWriter {
    /// A class extending `java/lang/Object`.
    #[must_use]
    pub fn new(access_flags: u16, internal_name: &str) -> Self {
        ClassWriter {
            access_flags,
            this_class: internal_name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    #[must_use]
    pub fn super_class(mut self, super_class: Option<&str>) -> Self {
        self.super_class = super_class.map(str::to_string);
        self
    }

    #[must_use]
    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    #[must_use]
    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    #[must_use]
    pub fn field(mut self, field: MemberSpec) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn method(mut self, method: MemberSpec) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn inner_class(mut self, info: InnerClassInfo) -> Self {
        self.inner_classes.push(info);
        self
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut pool = PoolBuilder::default();
        let mut body = Vec::new();

        put_u2(&mut body, self.access_flags);
        put_u2(&mut body, pool.class(&self.this_class));
        let super_index = self.super_class.as_deref().map_or(0, |name| pool.class(name));
        put_u2(&mut body, super_index);

        put_u2(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            put_u2(&mut body, pool.class(interface));
        }

        for members in [&self.fields, &self.methods] {
            put_u2(&mut body, members.len() as u16);
            for member in members {
                write_member(&mut body, &mut pool, member);
            }
        }

        let mut attributes = Vec::new();
        if let Some(signature) = &self.signature {
            attributes.push(signature_attribute(&mut pool, signature));
        }
        if !self.inner_classes.is_empty() {
            let mut info = Vec::new();
            put_u2(&mut info, self.inner_classes.len() as u16);
            for inner in &self.inner_classes {
                put_u2(&mut info, pool.class(&inner.inner_class));
                put_u2(
                    &mut info,
                    inner.outer_class.as_deref().map_or(0, |name| pool.class(name)),
                );
                put_u2(
                    &mut info,
                    inner.inner_name.as_deref().map_or(0, |name| pool.utf8(name)),
                );
                put_u2(&mut info, inner.access_flags);
            }
            attributes.push((pool.utf8("InnerClasses"), info));
        }
        write_attributes(&mut body, &attributes);

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABE_u32.to_be_bytes());
        put_u2(&mut out, 0);
        put_u2(&mut out, 52);
        put_u2(&mut out, pool.count());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

fn write_member(out: &mut Vec<u8>, pool: &mut PoolBuilder, member: &MemberSpec) {
    put_u2(out, member.access_flags);
    put_u2(out, pool.utf8(&member.name));
    put_u2(out, pool.utf8(&member.descriptor));

    let mut attributes = Vec::new();
    if let Some(signature) = &member.signature {
        attributes.push(signature_attribute(pool, signature));
    }
    if !member.exceptions.is_empty() {
        let mut info = Vec::new();
        put_u2(&mut info, member.exceptions.len() as u16);
        for exception in &member.exceptions {
            put_u2(&mut info, pool.class(exception));
        }
        attributes.push((pool.utf8("Exceptions"), info));
    }
    write_attributes(out, &attributes);
}

fn signature_attribute(pool: &mut PoolBuilder, signature: &str) -> (u16, Vec<u8>) {
    let name = pool.utf8("Signature");
    let mut info = Vec::new();
    put_u2(&mut info, pool.utf8(signature));
    (name, info)
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    put_u2(out, attributes.len() as u16);
    for (name, info) in attributes {
        put_u2(out, *name);
        out.extend_from_slice(&(info.len() as u32).to_be_bytes());
        out.extend_from_slice(info);
    }
}

fn put_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

#[derive(Default)]
struct PoolBuilder {
    bytes: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl PoolBuilder {
    fn allocate(&mut self) -> u16 {
        self.next_index += 1;
        self.next_index
    }

    fn count(&self) -> u16 {
        self.next_index + 1
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8.get(value) {
            return index;
        }
        let encoded = encode_modified_utf8(value);
        self.bytes.push(1);
        put_u2(&mut self.bytes, encoded.len() as u16);
        self.bytes.extend_from_slice(&encoded);
        let index = self.allocate();
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(&index) = self.classes.get(internal_name) {
            return index;
        }
        let name_index = self.utf8(internal_name);
        self.bytes.push(7);
        put_u2(&mut self.bytes, name_index);
        let index = self.allocate();
        self.classes.insert(internal_name.to_string(), index);
        index
    }
}

fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

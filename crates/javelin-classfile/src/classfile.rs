use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

const MAGIC: u32 = 0xCAFE_BABE;

/// The structural part of a class file, with constant pool references
/// already resolved to strings.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    pub this_class: String,
    /// `None` only for `java/lang/Object` and module descriptors.
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub signature: Option<String>,
    pub inner_classes: Vec<InnerClassInfo>,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Internal names from the `Exceptions` attribute (methods only).
    pub exceptions: Vec<String>,
}

/// One `InnerClasses` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassInfo {
    pub inner_class: String,
    pub outer_class: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        match reader.read_u4()? {
            MAGIC => {}
            other => return Err(Error::InvalidMagic(other)),
        }
        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let pool = ConstantPool::parse(&mut reader)?;
        let mut cursor = Cursor::new(reader, &pool);

        let access_flags = cursor.u2()?;
        let this_class = cursor.class_ref()?;
        let super_class = cursor.optional_class_ref()?;
        let interfaces = cursor.counted(Cursor::class_ref)?;
        let fields = cursor.counted(Cursor::member)?;
        let methods = cursor.counted(Cursor::member)?;

        let mut signature = None;
        let mut inner_classes = Vec::new();
        cursor.attributes(|name, body| {
            match name {
                "Signature" => signature = Some(body.utf8()?),
                "InnerClasses" => inner_classes = body.counted(Cursor::inner_class)?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        cursor.reader.ensure_empty()?;

        Ok(ClassFile {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            signature,
            inner_classes,
        })
    }
}

/// Reads pool-indexed values out of a byte range.
struct Cursor<'a, 'p> {
    reader: Reader<'a>,
    pool: &'p ConstantPool,
}

impl<'a, 'p> Cursor<'a, 'p> {
    fn new(reader: Reader<'a>, pool: &'p ConstantPool) -> Self {
        Cursor { reader, pool }
    }

    fn u2(&mut self) -> Result<u16> {
        self.reader.read_u2()
    }

    fn utf8(&mut self) -> Result<String> {
        let index = self.u2()?;
        Ok(self.pool.get_utf8(index)?.to_string())
    }

    fn optional_utf8(&mut self) -> Result<Option<String>> {
        match self.u2()? {
            0 => Ok(None),
            index => Ok(Some(self.pool.get_utf8(index)?.to_string())),
        }
    }

    fn class_ref(&mut self) -> Result<String> {
        let index = self.u2()?;
        self.pool.get_class_name(index)
    }

    fn optional_class_ref(&mut self) -> Result<Option<String>> {
        match self.u2()? {
            0 => Ok(None),
            index => self.pool.get_class_name(index).map(Some),
        }
    }

    /// A `u2` count followed by that many items.
    fn counted<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.u2()?;
        (0..count).map(|_| item(self)).collect()
    }

    /// Hands each attribute body to `visit`. A body the visitor claims
    /// (returns `true` for) must be consumed exactly; the rest are skipped.
    fn attributes(
        &mut self,
        mut visit: impl FnMut(&str, &mut Cursor<'a, 'p>) -> Result<bool>,
    ) -> Result<()> {
        let pool = self.pool;
        for _ in 0..self.u2()? {
            let name_index = self.u2()?;
            let name = pool.get_utf8(name_index)?;
            let length = self.reader.read_u4()? as usize;
            let mut body = Cursor::new(Reader::new(self.reader.read_bytes(length)?), pool);
            if visit(name, &mut body)? {
                body.reader.ensure_empty()?;
            }
        }
        Ok(())
    }

    fn member(&mut self) -> Result<ClassMember> {
        let mut member = ClassMember {
            access_flags: self.u2()?,
            name: self.utf8()?,
            descriptor: self.utf8()?,
            signature: None,
            exceptions: Vec::new(),
        };
        self.attributes(|name, body| {
            match name {
                "Signature" => member.signature = Some(body.utf8()?),
                "Exceptions" => member.exceptions = body.counted(Cursor::class_ref)?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(member)
    }

    fn inner_class(&mut self) -> Result<InnerClassInfo> {
        Ok(InnerClassInfo {
            inner_class: self.class_ref()?,
            outer_class: self.optional_class_ref()?,
            inner_name: self.optional_utf8()?,
            access_flags: self.u2()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::access::ACC_PUBLIC;
    use crate::writer::{ClassWriter, MemberSpec};

    #[test]
    fn header_members_and_attributes_are_decoded() {
        let bytes = ClassWriter::new(ACC_PUBLIC, "demo/Reader")
            .interface("java/lang/AutoCloseable")
            .interface("java/lang/Readable")
            .signature("Ljava/lang/Object;")
            .method(
                MemberSpec::new(ACC_PUBLIC, "close", "()V")
                    .with_exceptions(&["java/io/IOException"]),
            )
            .inner_class(InnerClassInfo {
                inner_class: "demo/Reader$1".to_string(),
                outer_class: None,
                inner_name: None,
                access_flags: 0,
            })
            .to_bytes();

        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!((class.major_version, class.minor_version), (52, 0));
        assert_eq!(class.this_class, "demo/Reader");
        assert_eq!(class.interfaces, ["java/lang/AutoCloseable", "java/lang/Readable"]);
        assert_eq!(class.signature.as_deref(), Some("Ljava/lang/Object;"));
        assert_eq!(class.methods[0].exceptions, ["java/io/IOException"]);
        assert_eq!(class.methods[0].signature, None);
        assert_eq!(class.inner_classes[0].inner_name, None);
    }

    #[test]
    fn a_missing_super_class_is_none() {
        let bytes = ClassWriter::new(ACC_PUBLIC, "java/lang/Object")
            .super_class(None)
            .to_bytes();
        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(class.super_class, None);
        assert!(class.fields.is_empty() && class.methods.is_empty());
    }

    #[test]
    fn trailing_bytes_after_the_class_are_rejected() {
        let mut bytes = ClassWriter::new(ACC_PUBLIC, "demo/A").to_bytes();
        bytes.push(0);
        assert_eq!(ClassFile::parse(&bytes).unwrap_err(), Error::TrailingBytes(1));
    }
}

use crate::error::{Error, Result};
use crate::reader::Reader;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

#[derive(Debug, Clone)]
enum Entry {
    Utf8(String),
    Class { name_index: u16 },
    /// Anything resolution never dereferences.
    Other(&'static str),
    /// Second slot of a long/double constant.
    Unusable,
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Utf8(_) => "Utf8",
            Entry::Class { .. } => "Class",
            Entry::Other(kind) => kind,
            Entry::Unusable => "unusable",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConstantPool {
    entries: Vec<Entry>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        // Index 0 is never valid.
        entries.push(Entry::Unusable);
        while entries.len() < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                TAG_UTF8 => {
                    let len = reader.read_u2()? as usize;
                    Entry::Utf8(decode_modified_utf8(reader.read_bytes(len)?)?)
                }
                TAG_CLASS => Entry::Class {
                    name_index: reader.read_u2()?,
                },
                TAG_INTEGER | TAG_FLOAT => {
                    reader.read_u4()?;
                    Entry::Other("numeric")
                }
                TAG_LONG | TAG_DOUBLE => {
                    reader.read_u4()?;
                    reader.read_u4()?;
                    entries.push(Entry::Other("wide numeric"));
                    Entry::Unusable
                }
                TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => {
                    reader.read_u2()?;
                    Entry::Other("reference")
                }
                TAG_FIELDREF | TAG_METHODREF | TAG_INTERFACE_METHODREF | TAG_NAME_AND_TYPE
                | TAG_DYNAMIC | TAG_INVOKE_DYNAMIC => {
                    reader.read_u2()?;
                    reader.read_u2()?;
                    Entry::Other("member reference")
                }
                TAG_METHOD_HANDLE => {
                    reader.read_u1()?;
                    reader.read_u2()?;
                    Entry::Other("method handle")
                }
                other => return Err(Error::InvalidConstantPoolTag(other)),
            };
            entries.push(entry);
        }
        Ok(ConstantPool { entries })
    }

    fn entry(&self, index: u16) -> Result<&Entry> {
        match self.entries.get(index as usize) {
            Some(Entry::Unusable) | None => Err(Error::InvalidConstantPoolIndex(index)),
            Some(entry) => Ok(entry),
        }
    }

    pub(crate) fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            Entry::Utf8(value) => Ok(value),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Utf8",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn get_class_name(&self, index: u16) -> Result<String> {
        match self.entry(index)? {
            Entry::Class { name_index } => Ok(self.get_utf8(*name_index)?.to_string()),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Class",
                found: other.kind(),
            }),
        }
    }
}

/// JVM "modified UTF-8": NUL is `C0 80` and supplementary characters are
/// encoded as surrogate pairs of three bytes each.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        let b0 = bytes[idx] as u16;
        let (unit, width) = if b0 & 0x80 == 0 {
            (b0, 1)
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = *bytes.get(idx + 1).ok_or(Error::InvalidModifiedUtf8)? as u16;
            (((b0 & 0x1F) << 6) | (b1 & 0x3F), 2)
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = *bytes.get(idx + 1).ok_or(Error::InvalidModifiedUtf8)? as u16;
            let b2 = *bytes.get(idx + 2).ok_or(Error::InvalidModifiedUtf8)? as u16;
            (((b0 & 0x0F) << 12) | ((b1 & 0x3F) << 6) | (b2 & 0x3F), 3)
        } else {
            return Err(Error::InvalidModifiedUtf8);
        };
        units.push(unit);
        idx += width;
    }
    String::from_utf16(&units).map_err(|_| Error::InvalidModifiedUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modified_utf8_handles_nul_and_ascii() {
        assert_eq!(decode_modified_utf8(b"java/lang/Object").unwrap(), "java/lang/Object");
        assert_eq!(decode_modified_utf8(&[b'a', 0xC0, 0x80, b'b']).unwrap(), "a\0b");
        assert_eq!(decode_modified_utf8(&[0xFF]), Err(Error::InvalidModifiedUtf8));
    }
}

use crate::error::{Error, Result};

/// Big-endian cursor over classfile bytes.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    pub(crate) fn read_u1(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub(crate) fn read_u2(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_u4(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(Error::UnexpectedEof)?;
        let slice = self.bytes.get(self.pos..end).ok_or(Error::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn ensure_empty(&self) -> Result<()> {
        match self.bytes.len() - self.pos {
            0 => Ok(()),
            remaining => Err(Error::TrailingBytes(remaining)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_and_reports_eof() {
        let mut reader = Reader::new(&[0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34, 0x07]);
        assert_eq!(reader.read_u4().unwrap(), 0xCAFEBABE);
        assert_eq!(reader.read_u2().unwrap(), 0x34);
        assert_eq!(reader.ensure_empty(), Err(Error::TrailingBytes(1)));
        assert_eq!(reader.read_u1().unwrap(), 7);
        assert_eq!(reader.read_u2(), Err(Error::UnexpectedEof));
    }
}

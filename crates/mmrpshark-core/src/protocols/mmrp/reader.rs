use super::error::MmrpError;
use super::layout;

/// Bounds-checked big-endian access to an MMRP payload.
///
/// Every read names the field it serves so truncation errors point at the
/// structure that ran out of bytes.
pub struct MmrpReader<'a> {
    payload: &'a [u8],
}

impl<'a> MmrpReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require(
        &self,
        field: &'static str,
        offset: usize,
        len: usize,
    ) -> Result<(), MmrpError> {
        let end = offset.checked_add(len).ok_or(MmrpError::NonTerminating {
            structure: field,
            offset,
        })?;
        if end > self.payload.len() {
            return Err(MmrpError::Truncated {
                field,
                offset,
                needed: len,
                actual: self.payload.len().saturating_sub(offset),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, field: &'static str, offset: usize) -> Result<u8, MmrpError> {
        self.require(field, offset, 1)?;
        Ok(self.payload[offset])
    }

    pub fn read_u16_be(&self, field: &'static str, offset: usize) -> Result<u16, MmrpError> {
        let bytes = self.read_slice(field, offset, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_slice(
        &self,
        field: &'static str,
        offset: usize,
        len: usize,
    ) -> Result<&'a [u8], MmrpError> {
        self.require(field, offset, len)?;
        Ok(&self.payload[offset..offset + len])
    }

    pub fn read_mac(&self, offset: usize) -> Result<[u8; layout::MAC_LEN], MmrpError> {
        let bytes = self.read_slice("MAC first value", offset, layout::MAC_LEN)?;
        let mut mac = [0u8; layout::MAC_LEN];
        mac.copy_from_slice(bytes);
        Ok(mac)
    }

    /// Check whether the two bytes at `offset` form an End Mark.
    pub fn at_end_mark(&self, field: &'static str, offset: usize) -> Result<bool, MmrpError> {
        Ok(self.read_u16_be(field, offset)? == layout::END_MARK)
    }
}

use super::error::UdpError;
use super::layout;

/// Bounded view over the IP payload carrying a UDP datagram.
pub struct UdpReader<'a> {
    datagram: &'a [u8],
}

impl<'a> UdpReader<'a> {
    pub fn new(datagram: &'a [u8]) -> Self {
        Self { datagram }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), UdpError> {
        if self.datagram.len() < needed {
            return Err(UdpError::TooShort {
                needed,
                actual: self.datagram.len(),
            });
        }
        Ok(())
    }

    /// Bytes after the 8-byte UDP header.
    pub fn payload(&self) -> Result<&'a [u8], UdpError> {
        self.require_len(layout::UDP_HEADER_LEN)?;
        Ok(&self.datagram[layout::UDP_HEADER_LEN..])
    }
}

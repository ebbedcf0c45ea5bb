/// Initial buffer of the pcap-parser readers.
pub const PCAP_READER_BUFFER_SIZE: usize = 65_536;
/// Section header block type, the first four bytes of any PCAPNG file.
pub const PCAPNG_MAGIC: [u8; 4] = [0x0A, 0x0D, 0x0D, 0x0A];
pub const MAGIC_LEN: usize = 4;
pub const MICROS_PER_SECOND: f64 = 1e6;

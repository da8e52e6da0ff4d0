pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];
pub const PCAP_READER_BUFFER_SIZE: usize = 64 * 1024;

/// Legacy PCAP magic numbers announcing nanosecond timestamps (both byte orders).
pub const PCAP_NANOSECOND_MAGIC: u32 = 0xa1b2_3c4d;
pub const PCAP_NANOSECOND_MAGIC_SWAPPED: u32 = 0x4d3c_b2a1;

pub const BLOCK_SECTION_HEADER: u32 = 0x0A0D_0D0A;
pub const BLOCK_INTERFACE_DESCRIPTION: u32 = 0x0000_0001;
pub const BLOCK_ENHANCED_PACKET: u32 = 0x0000_0006;
pub const BYTE_ORDER_MAGIC: u32 = 0x1A2B_3C4D;
pub const BLOCK_FRAMING_LEN: usize = 12;

pub const LINKTYPE_ETHERNET: u16 = 1;
pub const DEFAULT_SNAPLEN: u32 = 65_535;
/// `if_tsresol` default: microseconds.
pub const DEFAULT_TSRESOL: u8 = 6;

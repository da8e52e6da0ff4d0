use std::io::{Read, Seek, SeekFrom};

use super::error::PcapSourceError;
use super::layout;
use pcap_parser::Linktype;

/// Capture interface as announced by a PCAPNG interface description block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interface {
    pub linktype: Linktype,
    pub units_per_second: u64,
}

impl Default for Interface {
    fn default() -> Self {
        Self {
            linktype: Linktype::ETHERNET,
            units_per_second: ts_units_per_second(layout::DEFAULT_TSRESOL),
        }
    }
}

/// Read the magic bytes and rewind the reader to the start.
///
/// # Errors
/// Returns `PcapSourceError` when the reader cannot be read or rewound.
pub fn read_magic_and_rewind<R: Read + Seek>(reader: &mut R) -> Result<[u8; 4], PcapSourceError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

pub fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

pub fn is_nanosecond_magic(magic_number: u32) -> bool {
    matches!(
        magic_number,
        layout::PCAP_NANOSECOND_MAGIC | layout::PCAP_NANOSECOND_MAGIC_SWAPPED
    )
}

/// Resolve the interface for an enhanced packet, defaulting to Ethernet in
/// microseconds when the id was never described.
pub fn interface_for(interfaces: &[Interface], if_id: u32) -> Interface {
    interfaces
        .get(if_id as usize)
        .copied()
        .unwrap_or_default()
}

/// Timestamp ticks per second for a PCAPNG `if_tsresol` value.
///
/// The high bit selects a power of two, otherwise a power of ten. Exponents
/// that overflow `u64` saturate.
///
/// # Examples
/// ```text
/// assert_eq!(ts_units_per_second(6), 1_000_000);
/// assert_eq!(ts_units_per_second(0x8a), 1024);
/// ```
pub fn ts_units_per_second(tsresol: u8) -> u64 {
    let exponent = u32::from(tsresol & 0x7f);
    if tsresol & 0x80 != 0 {
        1u64.checked_shl(exponent).unwrap_or(u64::MAX)
    } else {
        10u64.checked_pow(exponent).unwrap_or(u64::MAX)
    }
}

/// Convert PCAPNG high/low timestamp ticks to seconds.
pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32, units_per_second: u64) -> f64 {
    let ticks = ((ts_high as u64) << 32) | (ts_low as u64);
    let units = units_per_second.max(1);
    (ticks / units) as f64 + (ticks % units) as f64 / units as f64
}

/// Convert a legacy PCAP record timestamp to seconds.
pub fn legacy_ts_to_seconds(ts_sec: u32, ts_frac: u32, nanosecond: bool) -> f64 {
    let scale = if nanosecond { 1e-9 } else { 1e-6 };
    ts_sec as f64 + ts_frac as f64 * scale
}

//! PCAP/PCAPNG capture files.
//!
//! Reading yields raw frames with per-interface linktype and timestamp
//! resolution applied; writing produces minimal PCAPNG files with a single
//! Ethernet interface.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod writer;

pub use parser::PcapFileSource;
pub use writer::write_pcapng;

//! Capture sources feeding link-layer frames to the analysis pipeline.
//!
//! All file I/O lives here; decoders downstream only see byte slices.

mod pcap;

pub use pcap::{PcapFileSource, write_pcapng};

use pcap_parser::Linktype;
use thiserror::Error;

/// One link-layer frame read from a capture.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Zero-based position of the frame in the capture.
    pub index: u64,
    /// Capture timestamp in seconds since the epoch, when known.
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait CaptureSource {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, SourceError>;
}

impl CaptureSource for std::vec::IntoIter<CapturedFrame> {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, SourceError> {
        Ok(self.next())
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error: {0}")]
    Pcap(String),
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
        }
    }
}

//! MMRP-Shark core library: decoding and offline analysis of IEEE 802.1ak
//! Multiple MAC Registration Protocol traffic.
//!
//! The crate has three layers. `source` reads link-layer frames from
//! PCAP/PCAPNG captures, `analysis` demultiplexes Ethernet frames by
//! Ethertype and aggregates decoded PDUs, and [`mmrp`] holds the
//! byte-oriented, side-effect free protocol decoder (layout/reader/parser)
//! together with its encoder and field schema.
//!
//! Invariants:
//! - Decoding never reads outside the supplied buffer and always terminates.
//! - A malformed PDU fails alone; analysis keeps going and records it.
//! - Report outputs are deterministic and stable across runs.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use mmrpshark_core::analyze_pcap_file;
//!
//! let report = analyze_pcap_file(Path::new("capture.pcapng"))?;
//! println!("MMRP frames: {}", report.frames.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod analysis;
mod protocols;
mod source;

pub use analysis::{AnalysisError, analyze_pcap_file, analyze_source};
pub use protocols::common::MacAddress;
pub use protocols::mmrp;
pub use source::{CaptureSource, CapturedFrame, PcapFileSource, SourceError, write_pcapng};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated analysis report with deterministic ordering.
///
/// # Examples
/// ```
/// use mmrpshark_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, mmrpshark_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input capture metadata.
    pub input: InputInfo,

    /// Optional capture summary (may be empty when unavailable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// One record per MMRP frame, in capture order.
    pub frames: Vec<FrameSummary>,
    /// Per attribute declaration totals, sorted by type then first value.
    pub attributes: Vec<AttributeSummary>,
    /// Protocol compliance summaries in stable order.
    pub compliance: Vec<ComplianceSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "mmrpshark").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
///
/// # Examples
/// ```
/// use mmrpshark_core::InputInfo;
///
/// let input = InputInfo {
///     path: "capture.pcapng".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic capture summary (timestamps may be absent).
///
/// # Examples
/// ```
/// use mmrpshark_core::CaptureSummary;
///
/// let summary = CaptureSummary {
///     packets_total: 10,
///     mmrp_frames: 4,
///     decode_errors: 1,
///     time_start: None,
///     time_end: None,
/// };
/// assert_eq!(summary.mmrp_frames, 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Total packet count observed in the capture.
    pub packets_total: u64,
    /// Frames carrying the MMRP Ethertype.
    pub mmrp_frames: u64,
    /// MMRP frames whose PDU failed to decode.
    pub decode_errors: u64,
    /// RFC3339 timestamp of the first packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the last packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Decoded view of one MMRP frame.
///
/// Exactly one of `messages` (non-empty or not) and `error` describes the
/// PDU: a frame that failed to decode keeps no partial messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    /// Zero-based packet index in the capture.
    pub index: u64,
    /// RFC3339 capture timestamp, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    pub src_mac: String,
    pub dst_mac: String,
    /// 802.1Q VLAN identifier when the frame was tagged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
    /// Protocol column label ("MRP-MMRP").
    pub protocol: String,
    /// Summary line ("Multiple Mac Registration Protocol").
    pub info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<MessageSummary>,
    /// Non-zero bytes after the closing End Mark.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub trailing_bytes: u64,
    /// Recoverable decode warnings, in wire order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Decode failure, when the PDU was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSummary {
    pub offset: usize,
    /// Attribute type as `label (code)`.
    pub attribute_type: String,
    pub attribute_length: u8,
    pub vector_attributes: Vec<VectorAttributeSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorAttributeSummary {
    pub offset: usize,
    pub leave_all_event: String,
    pub number_of_values: u16,
    pub first_value: String,
    /// Event names in value order.
    pub events: Vec<String>,
}

/// Declaration totals for one attribute (type plus first value).
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
///
/// use mmrpshark_core::AttributeSummary;
///
/// let summary = AttributeSummary {
///     attribute_type: "MAC (2)".to_string(),
///     first_value: "01:80:c2:00:00:20".to_string(),
///     declarations: 2,
///     leave_all: 1,
///     events: BTreeMap::from([("JoinIn".to_string(), 3)]),
/// };
/// assert_eq!(summary.events["JoinIn"], 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSummary {
    pub attribute_type: String,
    pub first_value: String,
    /// Vector attributes that carried this first value.
    pub declarations: u64,
    /// Of those, how many signalled LeaveAll.
    pub leave_all: u64,
    /// Event name to occurrence count, across all values of the run.
    pub events: BTreeMap<String, u64>,
}

/// Compliance summary for a protocol.
///
/// # Examples
/// ```
/// use mmrpshark_core::{ComplianceSummary, Violation};
///
/// let summary = ComplianceSummary {
///     protocol: "mrp-mmrp".to_string(),
///     compliance_percentage: 50.0,
///     violations: vec![Violation {
///         id: "MS-MMRP-TRUNCATED".to_string(),
///         severity: "error".to_string(),
///         message: "PDU ends before a required field".to_string(),
///         count: 1,
///         examples: Vec::new(),
///     }],
/// };
/// assert_eq!(summary.violations.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSummary {
    /// Protocol filter name (e.g., "mrp-mmrp").
    pub protocol: String,
    /// Share of frames without violations (0.0–100.0).
    pub compliance_percentage: f64,
    /// Violations sorted by severity and ID.
    pub violations: Vec<Violation>,
}

/// Single compliance violation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Stable violation identifier (e.g., `MS-MMRP-TRUNCATED`).
    pub id: String,
    /// Severity label (`error` or `warning`).
    pub severity: String,
    /// Human-readable message explaining the violation.
    pub message: String,
    /// Number of occurrences aggregated into this violation.
    pub count: u64,
    /// At most three example contexts, formatted as `frame N @ ts: detail`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use mmrpshark_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, mmrpshark_core::REPORT_VERSION);
/// assert!(report.frames.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "mmrpshark".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        frames: vec![],
        attributes: vec![],
        compliance: vec![],
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, warn};

use crate::mmrp::{ETHERTYPE_MMRP, parse_mmrp};
use crate::source::{CaptureSource, CapturedFrame, PcapFileSource, SourceError};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, Report, make_stub_report};

mod attributes;
mod compliance;
mod ethernet;
mod frames;

use attributes::{add_frame_attributes, build_attribute_summaries};
use compliance::{ComplianceStats, build_compliance};
use ethernet::parse_ethernet_frame;
use frames::{decoded_frame_summary, failed_frame_summary, significant_trailing_len};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub fn analyze_pcap_file(path: &Path) -> Result<Report, AnalysisError> {
    let source = PcapFileSource::open(path)?;
    analyze_source(path, source)
}

/// Run the analysis over any capture source.
///
/// Frames that are not Ethernet or do not carry the MMRP Ethertype only count
/// towards `packets_total`. A PDU that fails to decode is recorded with its
/// error and the run continues.
pub fn analyze_source<S: CaptureSource>(
    path: &Path,
    mut source: S,
) -> Result<Report, AnalysisError> {
    let mut packets_total = 0u64;
    let mut mmrp_frames = 0u64;
    let mut decode_errors = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut frames = Vec::new();
    let mut attribute_stats = BTreeMap::new();
    let mut compliance = ComplianceStats::default();

    while let Some(CapturedFrame {
        index,
        ts,
        linktype,
        data,
    }) = source.next_frame()?
    {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);

        let eth = match parse_ethernet_frame(linktype, &data) {
            Ok(Some(eth)) => eth,
            Ok(None) => continue,
            Err(err) => {
                debug!(index, %err, "skipping undecodable link-layer frame");
                continue;
            }
        };
        if !eth.is_ether_type(ETHERTYPE_MMRP) {
            continue;
        }
        mmrp_frames += 1;

        let context = example_context(index, ts);
        match parse_mmrp(eth.payload) {
            Ok(frame) => {
                let trailing = significant_trailing_len(&frame, eth.payload);
                debug!(
                    index,
                    messages = frame.messages.len(),
                    warnings = frame.warnings.len(),
                    trailing,
                    "decoded MMRP frame"
                );
                add_frame_attributes(&mut attribute_stats, &frame);
                compliance.add_decoded(&context, &frame, trailing);
                frames.push(decoded_frame_summary(index, ts, &eth, &frame, trailing));
            }
            Err(err) => {
                decode_errors += 1;
                warn!(index, offset = err.offset(), %err, "malformed MMRP frame");
                compliance.add_error(&context, &err);
                frames.push(failed_frame_summary(index, ts, &eth, &err));
            }
        }
    }

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.capture_summary = Some(CaptureSummary {
        packets_total,
        mmrp_frames,
        decode_errors,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());

    report.frames = frames;
    report.attributes = build_attribute_summaries(attribute_stats);
    report.compliance = build_compliance(compliance);
    Ok(report)
}

fn example_context(index: u64, ts: Option<f64>) -> String {
    match ts_to_rfc3339(ts) {
        Some(ts) => format!("frame {index} @ {ts}"),
        None => format!("frame {index}"),
    }
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ts_bounds_track_min_and_max() {
        let mut first = None;
        let mut last = None;
        for ts in [Some(5.0), None, Some(2.0), Some(9.0)] {
            update_ts_bounds(&mut first, &mut last, ts);
        }
        assert_eq!(first, Some(2.0));
        assert_eq!(last, Some(9.0));
    }

    #[test]
    fn rfc3339_formatting() {
        let formatted = ts_to_rfc3339(Some(1.5)).unwrap();
        assert!(formatted.starts_with("1970-01-01T00:00:01.5"));
        assert!(ts_to_rfc3339(None).is_none());
    }

    #[test]
    fn example_context_includes_time_when_known() {
        assert_eq!(example_context(3, None), "frame 3");
        assert_eq!(
            example_context(3, Some(0.0)),
            "frame 3 @ 1970-01-01T00:00:00Z"
        );
    }
}

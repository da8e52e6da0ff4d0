use std::collections::BTreeMap;

use crate::mmrp::{MmrpError, MmrpFrame, schema};
use crate::{ComplianceSummary, Violation};

pub(crate) const TRAILING_BYTES_VIOLATION: &str = "MS-MMRP-TRAILING-BYTES";
const MAX_EXAMPLES: usize = 3;
const SEVERITY_ERROR: &str = "error";
const SEVERITY_WARNING: &str = "warning";

#[derive(Debug)]
struct ViolationStats {
    severity: &'static str,
    count: u64,
    examples: Vec<String>,
}

/// Per-run compliance tally for MMRP frames.
#[derive(Debug, Default)]
pub(crate) struct ComplianceStats {
    frames: u64,
    frames_with_violations: u64,
    violations: BTreeMap<&'static str, ViolationStats>,
}

impl ComplianceStats {
    pub fn add_decoded(&mut self, context: &str, frame: &MmrpFrame, trailing: usize) {
        self.frames += 1;
        let mut clean = true;
        for warning in &frame.warnings {
            self.record(
                warning.violation_id(),
                SEVERITY_WARNING,
                format!("{context}: {warning}"),
            );
            clean = false;
        }
        if trailing > 0 {
            self.record(
                TRAILING_BYTES_VIOLATION,
                SEVERITY_WARNING,
                format!("{context}: {trailing} bytes after end mark at offset {}", frame.end),
            );
            clean = false;
        }
        if !clean {
            self.frames_with_violations += 1;
        }
    }

    pub fn add_error(&mut self, context: &str, err: &MmrpError) {
        self.frames += 1;
        self.frames_with_violations += 1;
        self.record(
            err.kind().violation_id(),
            SEVERITY_ERROR,
            format!("{context}: {err}"),
        );
    }

    fn record(&mut self, id: &'static str, severity: &'static str, example: String) {
        let entry = self.violations.entry(id).or_insert(ViolationStats {
            severity,
            count: 0,
            examples: Vec::new(),
        });
        entry.count += 1;
        if entry.examples.len() < MAX_EXAMPLES {
            entry.examples.push(example);
        }
    }
}

/// Build the compliance section; empty when no MMRP frame was seen.
pub(crate) fn build_compliance(stats: ComplianceStats) -> Vec<ComplianceSummary> {
    if stats.frames == 0 {
        return Vec::new();
    }
    let clean = stats.frames - stats.frames_with_violations;
    let compliance_percentage = clean as f64 * 100.0 / stats.frames as f64;

    let mut violations: Vec<Violation> = stats
        .violations
        .into_iter()
        .map(|(id, stats)| Violation {
            id: id.to_string(),
            severity: stats.severity.to_string(),
            message: violation_message(id).to_string(),
            count: stats.count,
            examples: stats.examples,
        })
        .collect();
    violations.sort_by(|a, b| {
        severity_rank(&a.severity)
            .cmp(&severity_rank(&b.severity))
            .then_with(|| a.id.cmp(&b.id))
    });

    vec![ComplianceSummary {
        protocol: schema::PROTOCOL_FILTER_NAME.to_string(),
        compliance_percentage,
        violations,
    }]
}

fn severity_rank(severity: &str) -> u8 {
    match severity {
        SEVERITY_ERROR => 0,
        SEVERITY_WARNING => 1,
        _ => 2,
    }
}

fn violation_message(id: &str) -> &'static str {
    match id {
        "MS-MMRP-TRUNCATED" => "PDU ends before a required field",
        "MS-MMRP-NON-TERMINATING" => "vector attribute does not advance the cursor",
        "MS-MMRP-UNKNOWN-ATTRIBUTE-TYPE" => "attribute type is not defined for MMRP",
        "MS-MMRP-ATTRIBUTE-LENGTH" => "attribute length does not match the attribute type",
        "MS-MMRP-INVALID-EVENT" => "three-packed byte encodes an undefined event",
        "MS-MMRP-LEAVE-ALL-RESERVED" => "leave-all event uses a reserved value",
        TRAILING_BYTES_VIOLATION => "non-padding bytes follow the PDU end mark",
        _ => "MMRP violation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmrp::{parse_mmrp, parse_mmrp_at};

    fn unknown_type_frame() -> MmrpFrame {
        parse_mmrp(&[
            0x00, 0x09, 0x01, 0x00, 0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ])
        .unwrap()
    }

    #[test]
    fn no_frames_means_no_section() {
        assert!(build_compliance(ComplianceStats::default()).is_empty());
    }

    #[test]
    fn errors_sort_before_warnings_and_percentage_counts_frames() {
        let mut stats = ComplianceStats::default();
        let clean = parse_mmrp(&[0x00, 0x00, 0x00]).unwrap();
        stats.add_decoded("frame 0", &clean, 0);
        stats.add_decoded("frame 1", &unknown_type_frame(), 0);
        let err = parse_mmrp_at(&[0x00, 0x02], 0).unwrap_err();
        stats.add_error("frame 2", &err);
        stats.add_decoded("frame 3", &clean, 4);

        let summary = build_compliance(stats).remove(0);
        assert_eq!(summary.protocol, "mrp-mmrp");
        assert!((summary.compliance_percentage - 25.0).abs() < f64::EPSILON);
        let ids: Vec<_> = summary.violations.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "MS-MMRP-TRUNCATED",
                "MS-MMRP-TRAILING-BYTES",
                "MS-MMRP-UNKNOWN-ATTRIBUTE-TYPE"
            ]
        );
        assert_eq!(summary.violations[0].severity, "error");
        assert!(summary.violations[0].examples[0].starts_with("frame 2: truncated"));
    }

    #[test]
    fn examples_are_capped() {
        let mut stats = ComplianceStats::default();
        for idx in 0..5 {
            stats.add_decoded(&format!("frame {idx}"), &unknown_type_frame(), 0);
        }
        let summary = build_compliance(stats).remove(0);
        let violation = &summary.violations[0];
        assert_eq!(violation.count, 5);
        assert_eq!(violation.examples.len(), MAX_EXAMPLES);
        assert_eq!(summary.compliance_percentage, 0.0);
    }
}

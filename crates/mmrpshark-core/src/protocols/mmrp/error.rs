use thiserror::Error;

/// Errors that abort decoding of an MMRP frame.
///
/// Every variant carries the byte offset at which decoding stopped. No
/// partial tree is returned alongside an error.
///
/// # Examples
/// ```
/// use mmrpshark_core::mmrp::{MmrpErrorKind, parse_mmrp};
///
/// let err = parse_mmrp(&[0x00, 0x02]).unwrap_err();
/// assert_eq!(err.kind(), MmrpErrorKind::Truncated);
/// assert_eq!(err.offset(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MmrpError {
    #[error("truncated {field} at offset {offset}: need {needed} bytes, got {actual}")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
        actual: usize,
    },
    #[error("non-terminating {structure} at offset {offset}: cursor makes no progress")]
    NonTerminating {
        structure: &'static str,
        offset: usize,
    },
}

/// Coarse classification of [`MmrpError`], stable across messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MmrpErrorKind {
    Truncated,
    NonTerminating,
}

impl MmrpErrorKind {
    /// Compliance violation identifier for this kind.
    pub fn violation_id(self) -> &'static str {
        match self {
            MmrpErrorKind::Truncated => "MS-MMRP-TRUNCATED",
            MmrpErrorKind::NonTerminating => "MS-MMRP-NON-TERMINATING",
        }
    }
}

impl MmrpError {
    pub fn kind(&self) -> MmrpErrorKind {
        match self {
            MmrpError::Truncated { .. } => MmrpErrorKind::Truncated,
            MmrpError::NonTerminating { .. } => MmrpErrorKind::NonTerminating,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            MmrpError::Truncated { offset, .. } | MmrpError::NonTerminating { offset, .. } => {
                *offset
            }
        }
    }
}

/// Errors returned when serializing a decoded frame back to wire bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("too many values in vector attribute: {count} (max 8191)")]
    TooManyValues { count: usize },
    #[error("number of values {declared} disagrees with {actual} events")]
    ValueCountMismatch { declared: u16, actual: usize },
    #[error("first value is {actual} bytes but attribute length is {expected}")]
    FirstValueLength { expected: u8, actual: usize },
    #[error("leave-all event {value} does not fit in 3 bits")]
    LeaveAllOutOfRange { value: u8 },
    #[error("event value {value} cannot be packed")]
    EventOutOfRange { value: u8 },
    #[error("message must not start with an end mark")]
    EmptyMessageHeader,
    #[error("vector header with no leave-all and no values reads as an end mark")]
    EmptyVectorHeader,
}

use thiserror::Error;

/// Errors returned by Ethernet decoding.
///
/// Note: this error type lives in an internal module; the example is
/// illustrative and not compiled as a public doctest.
///
/// # Examples
/// ```text
/// use mmrpshark_core::analysis::ethernet::error::EthernetError;
///
/// let err = EthernetError::Slice("too short".to_string());
/// assert!(err.to_string().contains("too short"));
/// ```
#[derive(Debug, Error)]
pub enum EthernetError {
    #[error("frame slice error: {0}")]
    Slice(String),
    #[error("VLAN tag slice error: {0}")]
    Vlan(String),
}

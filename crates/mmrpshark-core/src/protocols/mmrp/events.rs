use std::fmt;

use super::layout;
use super::schema;

/// Attribute event carried in a three-packed byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreePackedEvent {
    New,
    JoinIn,
    In,
    JoinMt,
    Mt,
    Lv,
    /// Leading digit of a packed byte >= 216; carries no defined event.
    Invalid(u8),
}

impl ThreePackedEvent {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ThreePackedEvent::New,
            1 => ThreePackedEvent::JoinIn,
            2 => ThreePackedEvent::In,
            3 => ThreePackedEvent::JoinMt,
            4 => ThreePackedEvent::Mt,
            5 => ThreePackedEvent::Lv,
            other => ThreePackedEvent::Invalid(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            ThreePackedEvent::New => 0,
            ThreePackedEvent::JoinIn => 1,
            ThreePackedEvent::In => 2,
            ThreePackedEvent::JoinMt => 3,
            ThreePackedEvent::Mt => 4,
            ThreePackedEvent::Lv => 5,
            ThreePackedEvent::Invalid(code) => code,
        }
    }

    pub fn is_valid(self) -> bool {
        !matches!(self, ThreePackedEvent::Invalid(_))
    }

    pub fn label(self) -> &'static str {
        schema::value_to_str(schema::THREE_PACKED_VALS, self.code()).unwrap_or(schema::UNKNOWN_LABEL)
    }
}

impl fmt::Display for ThreePackedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreePackedEvent::Invalid(code) => write!(f, "{} ({})", schema::UNKNOWN_LABEL, code),
            event => f.write_str(event.label()),
        }
    }
}

/// Split a packed byte into its three base-6 digits, most significant first.
///
/// # Examples
/// ```
/// use mmrpshark_core::mmrp::events::unpack_byte;
///
/// assert_eq!(unpack_byte(77), [2, 0, 5]);
/// ```
pub fn unpack_byte(byte: u8) -> [u8; layout::EVENTS_PER_BYTE] {
    let first = byte / layout::EVENT_RADIX_SQUARED;
    let rest = byte - layout::EVENT_RADIX_SQUARED * first;
    let second = rest / layout::EVENT_RADIX;
    let third = rest - layout::EVENT_RADIX * second;
    [first, second, third]
}

/// Combine up to three event codes into one packed byte; missing digits are 0.
///
/// Returns `None` when the codes cannot be represented in a byte.
pub fn pack_byte(codes: &[u8]) -> Option<u8> {
    if codes.len() > layout::EVENTS_PER_BYTE {
        return None;
    }
    let mut digits = [0u8; layout::EVENTS_PER_BYTE];
    digits[..codes.len()].copy_from_slice(codes);
    if digits[1] >= layout::EVENT_RADIX || digits[2] >= layout::EVENT_RADIX {
        return None;
    }
    let value = digits[0] as u16 * layout::EVENT_RADIX_SQUARED as u16
        + digits[1] as u16 * layout::EVENT_RADIX as u16
        + digits[2] as u16;
    u8::try_from(value).ok()
}

/// Lazy decoder over a run of three-packed bytes.
///
/// Yields exactly `min(count, 3 * bytes.len())` events and never reads past
/// the slice it was given. Callers bounds-check the slice beforehand.
#[derive(Debug, Clone)]
pub struct PackedEvents<'a> {
    bytes: &'a [u8],
    remaining: usize,
    digit: usize,
    current: [u8; layout::EVENTS_PER_BYTE],
}

impl<'a> PackedEvents<'a> {
    pub fn new(bytes: &'a [u8], count: u16) -> Self {
        let available = bytes.len().saturating_mul(layout::EVENTS_PER_BYTE);
        Self {
            bytes,
            remaining: (count as usize).min(available),
            digit: layout::EVENTS_PER_BYTE,
            current: [0; layout::EVENTS_PER_BYTE],
        }
    }
}

impl Iterator for PackedEvents<'_> {
    type Item = ThreePackedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        if self.digit == layout::EVENTS_PER_BYTE {
            let (&byte, rest) = self.bytes.split_first()?;
            self.bytes = rest;
            self.current = unpack_byte(byte);
            self.digit = 0;
        }
        let code = self.current[self.digit];
        self.digit += 1;
        self.remaining -= 1;
        Some(ThreePackedEvent::from_code(code))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for PackedEvents<'_> {}

impl std::iter::FusedIterator for PackedEvents<'_> {}

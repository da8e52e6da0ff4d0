use std::fmt;

use thiserror::Error;
use tracing::trace;

use crate::protocols::common::MacAddress;

use super::error::MmrpError;
use super::events::{PackedEvents, ThreePackedEvent};
use super::layout;
use super::reader::MmrpReader;
use super::schema;

/// Decoded MMRP PDU: protocol version plus its Message sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmrpFrame {
    pub protocol_version: u8,
    pub messages: Vec<Message>,
    /// Offset of the End Mark closing the Message sequence.
    pub end_mark_offset: usize,
    /// Cursor just past the closing End Mark.
    pub end: usize,
    /// Recoverable conditions met while decoding, in wire order.
    pub warnings: Vec<MmrpWarning>,
}

impl MmrpFrame {
    pub fn protocol(&self) -> &'static str {
        schema::PROTOCOL_SHORT_NAME
    }

    pub fn info(&self) -> &'static str {
        schema::PROTOCOL_NAME
    }

    /// Bytes left in `payload` after the closing End Mark (Ethernet padding).
    pub fn trailing_len(&self, payload: &[u8]) -> usize {
        payload.len().saturating_sub(self.end)
    }

    pub fn vector_attributes(&self) -> impl Iterator<Item = (&Message, &VectorAttribute)> {
        self.messages.iter().flat_map(|message| {
            message
                .vector_attributes
                .iter()
                .map(move |attribute| (message, attribute))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub offset: usize,
    pub attribute_type: AttributeType,
    pub attribute_length: u8,
    pub vector_attributes: Vec<VectorAttribute>,
    pub end_mark_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorAttribute {
    pub offset: usize,
    /// Wire length: header, first value and packed events.
    pub length: usize,
    pub leave_all_event: LeaveAllEvent,
    pub number_of_values: u16,
    pub first_value: FirstValue,
    pub events: Vec<ThreePackedEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeType {
    ServiceRequirement,
    Mac,
    Unknown(u8),
}

impl AttributeType {
    pub fn from_code(code: u8) -> Self {
        match code {
            layout::ATTRIBUTE_TYPE_SERVICE_REQUIREMENT => AttributeType::ServiceRequirement,
            layout::ATTRIBUTE_TYPE_MAC => AttributeType::Mac,
            other => AttributeType::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            AttributeType::ServiceRequirement => layout::ATTRIBUTE_TYPE_SERVICE_REQUIREMENT,
            AttributeType::Mac => layout::ATTRIBUTE_TYPE_MAC,
            AttributeType::Unknown(code) => code,
        }
    }

    /// Fixed First Value width for recognized types.
    pub fn first_value_len(self) -> Option<usize> {
        match self {
            AttributeType::ServiceRequirement => Some(layout::SERVICE_REQUIREMENT_LEN),
            AttributeType::Mac => Some(layout::MAC_LEN),
            AttributeType::Unknown(_) => None,
        }
    }

    pub fn label(self) -> &'static str {
        schema::value_to_str(schema::ATTRIBUTE_TYPE_VALS, self.code())
            .unwrap_or(schema::UNKNOWN_LABEL)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaveAllEvent {
    Null,
    LeaveAll,
    /// Values 2..=7 of the 3-bit field.
    Reserved(u8),
}

impl LeaveAllEvent {
    pub fn from_code(code: u8) -> Self {
        match code {
            layout::LEAVE_ALL_NULL => LeaveAllEvent::Null,
            layout::LEAVE_ALL => LeaveAllEvent::LeaveAll,
            other => LeaveAllEvent::Reserved(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            LeaveAllEvent::Null => layout::LEAVE_ALL_NULL,
            LeaveAllEvent::LeaveAll => layout::LEAVE_ALL,
            LeaveAllEvent::Reserved(code) => code,
        }
    }

    pub fn label(self) -> &'static str {
        schema::value_to_str(schema::LEAVE_ALL_VALS, self.code()).unwrap_or(schema::UNKNOWN_LABEL)
    }
}

impl fmt::Display for LeaveAllEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveAllEvent::Reserved(code) => write!(f, "{} ({})", schema::UNKNOWN_LABEL, code),
            event => f.write_str(event.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FirstValue {
    Mac(MacAddress),
    ServiceRequirement(u8),
    /// Raw bytes for unrecognized types or mismatched attribute lengths.
    Opaque(Vec<u8>),
}

impl FirstValue {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            FirstValue::Mac(mac) => mac.octets().to_vec(),
            FirstValue::ServiceRequirement(code) => vec![*code],
            FirstValue::Opaque(bytes) => bytes.clone(),
        }
    }
}

impl fmt::Display for FirstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirstValue::Mac(mac) => write!(f, "{mac}"),
            FirstValue::ServiceRequirement(code) => {
                match schema::value_to_str(schema::SERVICE_REQUIREMENT_VALS, *code) {
                    Some(label) => write!(f, "{label} ({code})"),
                    None => write!(f, "{code}"),
                }
            }
            FirstValue::Opaque(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Recoverable condition; decoding continued past it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MmrpWarning {
    #[error("unrecognized attribute type {attribute_type} at offset {offset}")]
    UnrecognizedAttributeType { offset: usize, attribute_type: u8 },
    #[error(
        "attribute length {actual} at offset {offset} does not match {attribute_type} (expected {expected})"
    )]
    AttributeLengthMismatch {
        offset: usize,
        attribute_type: AttributeType,
        expected: usize,
        actual: u8,
    },
    #[error("packed event value {value} at offset {offset} is not a defined event")]
    InvalidEvent { offset: usize, value: u8 },
    #[error("reserved leave-all event {value} at offset {offset}")]
    ReservedLeaveAllEvent { offset: usize, value: u8 },
}

impl MmrpWarning {
    pub fn offset(&self) -> usize {
        match self {
            MmrpWarning::UnrecognizedAttributeType { offset, .. }
            | MmrpWarning::AttributeLengthMismatch { offset, .. }
            | MmrpWarning::InvalidEvent { offset, .. }
            | MmrpWarning::ReservedLeaveAllEvent { offset, .. } => *offset,
        }
    }

    pub fn violation_id(&self) -> &'static str {
        match self {
            MmrpWarning::UnrecognizedAttributeType { .. } => "MS-MMRP-UNKNOWN-ATTRIBUTE-TYPE",
            MmrpWarning::AttributeLengthMismatch { .. } => "MS-MMRP-ATTRIBUTE-LENGTH",
            MmrpWarning::InvalidEvent { .. } => "MS-MMRP-INVALID-EVENT",
            MmrpWarning::ReservedLeaveAllEvent { .. } => "MS-MMRP-LEAVE-ALL-RESERVED",
        }
    }
}

/// How First Values of one Message are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FirstValueKind {
    Mac,
    ServiceRequirement,
    Opaque,
}

/// Decode an MMRP PDU whose Protocol Version byte is at offset 0.
///
/// # Examples
/// ```
/// use mmrpshark_core::mmrp::{AttributeType, FirstValue, parse_mmrp};
///
/// let payload = [
///     0x00, // protocol version
///     0x01, 0x01, // service requirement, length 1
///     0x00, 0x01, 0x00, 0x24, // 1 value, first value 0, events [JoinIn]
///     0x00, 0x00, // vector attribute end mark
///     0x00, 0x00, // message end mark
/// ];
/// let frame = parse_mmrp(&payload)?;
/// let message = &frame.messages[0];
/// assert_eq!(message.attribute_type, AttributeType::ServiceRequirement);
/// assert_eq!(
///     message.vector_attributes[0].first_value,
///     FirstValue::ServiceRequirement(0)
/// );
/// assert_eq!(frame.end, payload.len());
/// # Ok::<(), mmrpshark_core::mmrp::MmrpError>(())
/// ```
pub fn parse_mmrp(payload: &[u8]) -> Result<MmrpFrame, MmrpError> {
    parse_mmrp_at(payload, layout::PROTOCOL_VERSION_OFFSET)
}

/// Decode an MMRP PDU whose Protocol Version byte is at `offset`.
pub fn parse_mmrp_at(payload: &[u8], offset: usize) -> Result<MmrpFrame, MmrpError> {
    let reader = MmrpReader::new(payload);
    let protocol_version = reader.read_u8("protocol version", offset)?;
    let mut warnings = Vec::new();

    let (messages, end_mark_offset) =
        parse_messages(&reader, offset + layout::MESSAGE_SEQUENCE_OFFSET, &mut warnings)?;
    let end = advance("frame", end_mark_offset, layout::END_MARK_LEN)?;
    trace!(
        protocol_version,
        messages = messages.len(),
        end,
        warnings = warnings.len(),
        "decoded MMRP frame"
    );

    Ok(MmrpFrame {
        protocol_version,
        messages,
        end_mark_offset,
        end,
        warnings,
    })
}

/// Message loop: returns the messages and the offset of the closing End Mark.
fn parse_messages(
    reader: &MmrpReader<'_>,
    start: usize,
    warnings: &mut Vec<MmrpWarning>,
) -> Result<(Vec<Message>, usize), MmrpError> {
    let mut messages = Vec::new();
    let mut cursor = start;
    while !reader.at_end_mark("message end mark", cursor)? {
        let message = parse_message(reader, cursor, warnings)?;
        cursor = advance(
            "message",
            message.end_mark_offset,
            layout::END_MARK_LEN,
        )?;
        messages.push(message);
    }
    Ok((messages, cursor))
}

fn parse_message(
    reader: &MmrpReader<'_>,
    offset: usize,
    warnings: &mut Vec<MmrpWarning>,
) -> Result<Message, MmrpError> {
    let attribute_type = AttributeType::from_code(
        reader.read_u8("attribute type", offset + layout::ATTRIBUTE_TYPE_OFFSET)?,
    );
    let attribute_length =
        reader.read_u8("attribute length", offset + layout::ATTRIBUTE_LENGTH_OFFSET)?;
    trace!(offset, %attribute_type, attribute_length, "message");

    let kind = first_value_kind(attribute_type, attribute_length, offset, warnings);
    let (vector_attributes, end_mark_offset) = parse_vector_attributes(
        reader,
        offset + layout::MESSAGE_HEADER_LEN,
        attribute_length,
        kind,
        warnings,
    )?;

    Ok(Message {
        offset,
        attribute_type,
        attribute_length,
        vector_attributes,
        end_mark_offset,
    })
}

fn first_value_kind(
    attribute_type: AttributeType,
    attribute_length: u8,
    offset: usize,
    warnings: &mut Vec<MmrpWarning>,
) -> FirstValueKind {
    let Some(expected) = attribute_type.first_value_len() else {
        warnings.push(MmrpWarning::UnrecognizedAttributeType {
            offset,
            attribute_type: attribute_type.code(),
        });
        return FirstValueKind::Opaque;
    };
    if attribute_length as usize != expected {
        warnings.push(MmrpWarning::AttributeLengthMismatch {
            offset,
            attribute_type,
            expected,
            actual: attribute_length,
        });
        return FirstValueKind::Opaque;
    }
    match attribute_type {
        AttributeType::Mac => FirstValueKind::Mac,
        AttributeType::ServiceRequirement => FirstValueKind::ServiceRequirement,
        AttributeType::Unknown(_) => FirstValueKind::Opaque,
    }
}

/// Vector-attribute loop: returns the attributes and the offset of the
/// Message End Mark, which is left for the caller to consume.
fn parse_vector_attributes(
    reader: &MmrpReader<'_>,
    start: usize,
    attribute_length: u8,
    kind: FirstValueKind,
    warnings: &mut Vec<MmrpWarning>,
) -> Result<(Vec<VectorAttribute>, usize), MmrpError> {
    let mut attributes = Vec::new();
    let mut cursor = start;
    while !reader.at_end_mark("vector attribute end mark", cursor)? {
        let attribute = parse_vector_attribute(reader, cursor, attribute_length, kind, warnings)?;
        cursor = advance("vector attribute", cursor, attribute.length)?;
        attributes.push(attribute);
    }
    Ok((attributes, cursor))
}

fn parse_vector_attribute(
    reader: &MmrpReader<'_>,
    offset: usize,
    attribute_length: u8,
    kind: FirstValueKind,
    warnings: &mut Vec<MmrpWarning>,
) -> Result<VectorAttribute, MmrpError> {
    let header = reader.read_u16_be("vector header", offset)?;
    let leave_all_event = LeaveAllEvent::from_code(
        ((header & layout::LEAVE_ALL_EVENT_MASK) >> layout::LEAVE_ALL_EVENT_SHIFT) as u8,
    );
    let number_of_values = header & layout::NUMBER_OF_VALUES_MASK;
    let length = layout::vector_attribute_len(attribute_length, number_of_values);
    trace!(offset, header, number_of_values, length, "vector attribute");

    if let LeaveAllEvent::Reserved(value) = leave_all_event {
        warnings.push(MmrpWarning::ReservedLeaveAllEvent { offset, value });
    }

    let first_value_offset = offset + layout::FIRST_VALUE_OFFSET;
    let first_value = read_first_value(reader, first_value_offset, attribute_length, kind)?;

    let events_offset = first_value_offset + attribute_length as usize;
    let packed = reader.read_slice(
        "packed events",
        events_offset,
        layout::packed_events_len(number_of_values),
    )?;
    let events: Vec<ThreePackedEvent> = PackedEvents::new(packed, number_of_values).collect();
    for (idx, event) in events.iter().enumerate() {
        if let ThreePackedEvent::Invalid(value) = event {
            warnings.push(MmrpWarning::InvalidEvent {
                offset: events_offset + idx / layout::EVENTS_PER_BYTE,
                value: *value,
            });
        }
    }

    Ok(VectorAttribute {
        offset,
        length,
        leave_all_event,
        number_of_values,
        first_value,
        events,
    })
}

fn read_first_value(
    reader: &MmrpReader<'_>,
    offset: usize,
    attribute_length: u8,
    kind: FirstValueKind,
) -> Result<FirstValue, MmrpError> {
    match kind {
        FirstValueKind::Mac => Ok(FirstValue::Mac(MacAddress::new(reader.read_mac(offset)?))),
        FirstValueKind::ServiceRequirement => Ok(FirstValue::ServiceRequirement(
            reader.read_u8("service requirement first value", offset)?,
        )),
        FirstValueKind::Opaque => Ok(FirstValue::Opaque(
            reader
                .read_slice("first value", offset, attribute_length as usize)?
                .to_vec(),
        )),
    }
}

/// Move `cursor` forward by `len`, rejecting moves that make no progress.
fn advance(structure: &'static str, cursor: usize, len: usize) -> Result<usize, MmrpError> {
    match cursor.checked_add(len) {
        Some(next) if next > cursor => Ok(next),
        _ => Err(MmrpError::NonTerminating {
            structure,
            offset: cursor,
        }),
    }
}

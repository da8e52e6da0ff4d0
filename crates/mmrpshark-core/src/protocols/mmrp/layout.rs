/// Ethertype assigned to MMRP (IEEE 802.1ak).
pub const ETHERTYPE_MMRP: u16 = 0x88F6;

pub const PROTOCOL_VERSION_OFFSET: usize = 0;
pub const MESSAGE_SEQUENCE_OFFSET: usize = PROTOCOL_VERSION_OFFSET + 1;

// Relative to the start of a Message.
pub const ATTRIBUTE_TYPE_OFFSET: usize = 0;
pub const ATTRIBUTE_LENGTH_OFFSET: usize = 1;
pub const MESSAGE_HEADER_LEN: usize = 2;

// Relative to the start of a VectorAttribute.
pub const VECTOR_HEADER_LEN: usize = 2;
pub const FIRST_VALUE_OFFSET: usize = VECTOR_HEADER_LEN;

pub const LEAVE_ALL_EVENT_MASK: u16 = 0xE000;
pub const LEAVE_ALL_EVENT_SHIFT: u32 = 13;
pub const NUMBER_OF_VALUES_MASK: u16 = 0x1FFF;
pub const MAX_NUMBER_OF_VALUES: u16 = NUMBER_OF_VALUES_MASK;

pub const END_MARK: u16 = 0x0000;
pub const END_MARK_LEN: usize = 2;

pub const ATTRIBUTE_TYPE_SERVICE_REQUIREMENT: u8 = 0x01;
pub const ATTRIBUTE_TYPE_MAC: u8 = 0x02;

pub const MAC_LEN: usize = 6;
pub const SERVICE_REQUIREMENT_LEN: usize = 1;

pub const LEAVE_ALL_NULL: u8 = 0;
pub const LEAVE_ALL: u8 = 1;

pub const EVENTS_PER_BYTE: usize = 3;
pub const EVENT_RADIX: u8 = 6;
pub const EVENT_RADIX_SQUARED: u8 = EVENT_RADIX * EVENT_RADIX;

/// Bytes occupied by `number_of_values` three-packed events.
pub const fn packed_events_len(number_of_values: u16) -> usize {
    (number_of_values as usize).div_ceil(EVENTS_PER_BYTE)
}

/// Total wire length of a VectorAttribute: header, first value and events.
pub const fn vector_attribute_len(attribute_length: u8, number_of_values: u16) -> usize {
    VECTOR_HEADER_LEN + attribute_length as usize + packed_events_len(number_of_values)
}

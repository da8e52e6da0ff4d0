//! Static description of the fields produced by the MMRP decoder.
//!
//! The tables are immutable and shared; decoder types render their labels
//! from the value-string tables here so names live in exactly one place.

use serde::Serialize;

use super::layout;

pub const PROTOCOL_NAME: &str = "Multiple Mac Registration Protocol";
pub const PROTOCOL_SHORT_NAME: &str = "MRP-MMRP";
pub const PROTOCOL_FILTER_NAME: &str = "mrp-mmrp";

/// Label used when a value has no entry in its value-string table.
pub const UNKNOWN_LABEL: &str = "<Unknown>";

pub type ValueString = (u8, &'static str);

pub const ATTRIBUTE_TYPE_VALS: &[ValueString] = &[
    (layout::ATTRIBUTE_TYPE_SERVICE_REQUIREMENT, "Service Requirement"),
    (layout::ATTRIBUTE_TYPE_MAC, "MAC"),
];

pub const LEAVE_ALL_VALS: &[ValueString] =
    &[(layout::LEAVE_ALL_NULL, "Null"), (layout::LEAVE_ALL, "Leave All")];

pub const SERVICE_REQUIREMENT_VALS: &[ValueString] = &[
    (0, "Forward All Groups"),
    (1, "Forward Unregistered Groups"),
];

pub const THREE_PACKED_VALS: &[ValueString] = &[
    (0, "New"),
    (1, "JoinIn"),
    (2, "In"),
    (3, "JoinMt"),
    (4, "Mt"),
    (5, "Lv"),
];

/// Look up `value` in a value-string table.
///
/// # Examples
/// ```
/// use mmrpshark_core::mmrp::schema::{THREE_PACKED_VALS, value_to_str};
///
/// assert_eq!(value_to_str(THREE_PACKED_VALS, 5), Some("Lv"));
/// assert_eq!(value_to_str(THREE_PACKED_VALS, 6), None);
/// ```
pub fn value_to_str(vals: &[ValueString], value: u8) -> Option<&'static str> {
    vals.iter()
        .find(|(candidate, _)| *candidate == value)
        .map(|(_, label)| *label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Grouping node without a value of its own.
    None,
    Uint8,
    Uint16,
    Ether,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayBase {
    None,
    Dec,
    Hex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub abbrev: &'static str,
    pub kind: FieldKind,
    pub base: DisplayBase,
    #[serde(skip_serializing_if = "is_zero")]
    pub mask: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<&'static [ValueString]>,
}

fn is_zero(mask: &u16) -> bool {
    *mask == 0
}

const fn field(
    name: &'static str,
    abbrev: &'static str,
    kind: FieldKind,
    base: DisplayBase,
) -> FieldSpec {
    FieldSpec {
        name,
        abbrev,
        kind,
        base,
        mask: 0,
        values: None,
    }
}

pub static FIELDS: &[FieldSpec] = &[
    field(
        "Protocol Version",
        "mrp-mmrp.protocol_version",
        FieldKind::Uint8,
        DisplayBase::Dec,
    ),
    field("Message", "mrp-mmrp.message", FieldKind::None, DisplayBase::None),
    FieldSpec {
        values: Some(ATTRIBUTE_TYPE_VALS),
        ..field(
            "Attribute Type",
            "mrp-mmrp.attribute_type",
            FieldKind::Uint8,
            DisplayBase::Dec,
        )
    },
    field(
        "Attribute Length",
        "mrp-mmrp.attribute_length",
        FieldKind::Uint8,
        DisplayBase::Dec,
    ),
    field(
        "Attribute List",
        "mrp-mmrp.attribute_list",
        FieldKind::None,
        DisplayBase::None,
    ),
    field(
        "Vector Attribute",
        "mrp-mmrp.vector_attribute",
        FieldKind::None,
        DisplayBase::None,
    ),
    field(
        "Vector Header",
        "mrp-mmrp.vector_header",
        FieldKind::Uint16,
        DisplayBase::Hex,
    ),
    FieldSpec {
        mask: layout::LEAVE_ALL_EVENT_MASK,
        values: Some(LEAVE_ALL_VALS),
        ..field(
            "Leave All Event",
            "mrp-mmrp.leave_all_event",
            FieldKind::Uint16,
            DisplayBase::Dec,
        )
    },
    FieldSpec {
        mask: layout::NUMBER_OF_VALUES_MASK,
        ..field(
            "Number of Values",
            "mrp-mmrp.number_of_values",
            FieldKind::Uint16,
            DisplayBase::Dec,
        )
    },
    field(
        "First Value",
        "mrp-mmrp.first_value",
        FieldKind::None,
        DisplayBase::None,
    ),
    field("MAC", "mrp-mmrp.mac", FieldKind::Ether, DisplayBase::None),
    FieldSpec {
        values: Some(SERVICE_REQUIREMENT_VALS),
        ..field(
            "Service Requirement",
            "mrp-mmrp.service_requirement",
            FieldKind::Uint8,
            DisplayBase::Dec,
        )
    },
    FieldSpec {
        values: Some(THREE_PACKED_VALS),
        ..field(
            "Attribute Event",
            "mrp-mmrp.three_packed_event",
            FieldKind::Uint8,
            DisplayBase::Dec,
        )
    },
    field(
        "End Mark",
        "mrp-mmrp.end_mark",
        FieldKind::Uint16,
        DisplayBase::Hex,
    ),
];

/// Find a field description by its filter abbreviation.
pub fn field_by_abbrev(abbrev: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|field| field.abbrev == abbrev)
}

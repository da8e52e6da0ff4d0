pub(crate) mod mac;

pub use mac::MacAddress;

use std::fmt;

/// IEEE 802 MAC address.
///
/// # Examples
/// ```
/// use mmrpshark_core::MacAddress;
///
/// let mac = MacAddress::new([0x01, 0x80, 0xC2, 0x00, 0x00, 0x20]);
/// assert_eq!(mac.to_string(), "01:80:c2:00:00:20");
/// assert!(mac.is_multicast());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Group bit of the first octet.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

#[cfg(test)]
mod tests {
    use super::MacAddress;

    #[test]
    fn display_is_lowercase_colon_hex() {
        let mac = MacAddress::from([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn unicast_has_group_bit_clear() {
        assert!(!MacAddress::new([0x02, 0, 0, 0, 0, 1]).is_multicast());
    }
}

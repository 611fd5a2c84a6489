//! Network interface descriptor parsing.
//!
//! Interfaces are presented to the user as `"<adapter name> (<MAC>)"`. Adapter names often carry
//! their own parenthesised text (`"Intel(R) Wireless-AC 9560 (00:1A:2B:3C:4D:5E)"`), so the MAC is
//! always taken from the *last* bracketed group.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, SessionError};

/// Largest value representable by a 48-bit hardware address.
pub const MAC_ADDRESS_MAX: u64 = 0xFFFF_FFFF_FFFF;

/// A 48-bit hardware address stored as the integer the session file expects in `device.mac`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddress(u64);

impl MacAddress {
    /// Returns `None` if `value` does not fit in 48 bits.
    pub fn new(value: u64) -> Option<Self> {
        (value <= MAC_ADDRESS_MAX).then_some(Self(value))
    }

    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        let mut raw = [0u8; 8];
        raw[2..].copy_from_slice(&bytes);
        Self(u64::from_be_bytes(raw))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn bytes(self) -> [u8; 6] {
        let raw = self.0.to_be_bytes();
        [raw[2], raw[3], raw[4], raw[5], raw[6], raw[7]]
    }

    /// SQLite integers are signed; a 48-bit value always fits.
    pub(crate) fn as_sql(self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bytes();
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

fn bracket_group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+)\)").expect("static regex"))
}

/// Extract the hardware address from an interface descriptor.
///
/// The last `(...)` group is read as colon-separated hexadecimal bytes, most significant first:
/// `"Foo (AA:BB:CC:DD:EE:FF)"` resolves to `0xAABBCCDDEEFF`.
pub fn resolve_address(descriptor: &str) -> Result<MacAddress> {
    let group = bracket_group_re()
        .captures_iter(descriptor)
        .filter_map(|caps| caps.get(1))
        .last()
        .ok_or_else(|| SessionError::invalid_address(descriptor, "no bracketed address found"))?
        .as_str();

    let digits: String = group.trim().chars().filter(|&c| c != ':').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SessionError::invalid_address(
            descriptor,
            "address is not colon-separated hexadecimal",
        ));
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 12 {
        return Err(SessionError::invalid_address(
            descriptor,
            "address does not fit in 48 bits",
        ));
    }
    if significant.is_empty() {
        return Ok(MacAddress(0));
    }

    let value = u64::from_str_radix(significant, 16)
        .map_err(|_| SessionError::invalid_address(descriptor, "address is not hexadecimal"))?;
    MacAddress::new(value)
        .ok_or_else(|| SessionError::invalid_address(descriptor, "address does not fit in 48 bits"))
}

/// Build the descriptor string for an interface, in the form [`resolve_address`] accepts.
pub fn interface_descriptor(name: &str, mac: MacAddress) -> String {
    format!("{name} ({mac})")
}

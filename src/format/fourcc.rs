//! Four-character compression codes.

use std::fmt;

/// A four-character code identifying a raw pixel encoding.
///
/// Stored the way capture drivers report it: the first character in the
/// least significant byte of a little-endian `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(u32);

impl FourCc {
    /// `BI_BITFIELDS`: uncompressed RGB with explicit channel masks.
    ///
    /// Not a printable code, but it travels in the same compression field.
    pub const BITFIELDS: FourCc = FourCc(3);

    /// Build a code from its four characters, e.g. `FourCc::new(*b"YUY2")`.
    pub const fn new(code: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(code))
    }

    /// Wrap a raw compression value as reported by a driver.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Parse a four-character string such as `"UYVY"`.
    ///
    /// Shorter codes are padded with spaces (`"Y8"` becomes `"Y8  "`).
    pub fn parse(code: &str) -> Option<Self> {
        let bytes = code.as_bytes();
        if bytes.is_empty() || bytes.len() > 4 || !bytes.iter().all(u8::is_ascii_graphic) {
            return None;
        }
        let mut padded = [b' '; 4];
        padded[..bytes.len()].copy_from_slice(bytes);
        Some(Self::new(padded))
    }

    fn is_printable(self) -> bool {
        self.bytes().iter().all(|b| b.is_ascii_graphic() || *b == b' ')
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_printable() {
            let bytes = self.bytes();
            let text: String = bytes.iter().map(|&b| b as char).collect();
            write!(f, "{}", text.trim_end())
        } else {
            write!(f, "0x{:08X}", self.0)
        }
    }
}

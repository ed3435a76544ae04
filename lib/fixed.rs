//! Fixed-point readouts rendered as exactly six characters.
//!
//! Two formats are supported, each with its own implicit scale:
//!
//! * [`signed_dec3`] - signed decimal with resolution 0.001, range -9.999 to +9.999
//! * [`unsigned_bin8`] - unsigned binary with resolution 1/256, range 0 to 999.99
//!
//! Values that do not fit are rendered as a sentinel pattern instead of digits.

use core::fmt;

/// Number of visible characters produced by every encoder.
pub const WIDTH: usize = 6;

/// Rendered for signed values outside -9.999..=9.999, regardless of sign.
pub const SIGNED_OVERFLOW: &str = " *.***";
/// Rendered for unsigned raw values of 256000 and above.
pub const UNSIGNED_OVERFLOW: &str = "***.**";

const UNSIGNED_LIMIT: u32 = 256_000;
const FRACTION_BITS: u32 = 8;
// Weight of the most significant fraction bit (1/2) in units of 1e-8,
// every following bit halves it exactly down to 1/256.
const TOP_BIT_WEIGHT: u32 = 50_000_000;
const HUNDREDTH: u32 = 1_000_000;

/// Six ASCII characters followed by a terminating NUL.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Fixed {
    buf: [u8; WIDTH + 1],
    overflow: bool,
}

impl Fixed {
    fn from_ascii(text: &str, overflow: bool) -> Self {
        let mut buf = [0; WIDTH + 1];
        buf[..WIDTH].copy_from_slice(&text.as_bytes()[..WIDTH]);
        Fixed { buf, overflow }
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII digits, signs, blanks and sentinels are ever stored
        match core::str::from_utf8(&self.buf[..WIDTH]) {
            Ok(text) => text,
            Err(_) => SIGNED_OVERFLOW,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..WIDTH]
    }

    /// The characters including the trailing NUL, for C-string style consumers.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf
    }

    /// True when the value was out of range and the sentinel was rendered.
    pub fn is_overflow(&self) -> bool {
        self.overflow
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({:?})", self.as_str())
    }
}

fn digit(value: u32) -> u8 {
    b'0' + (value % 10) as u8
}

/// Renders `value` x 0.001 as sign-or-blank, one integer digit, '.', three
/// fraction digits.
///
/// | value  | output     |
/// |--------|------------|
/// | 12345  | `" *.***"` |
/// | 2345   | `" 2.345"` |
/// | -8100  | `"-8.100"` |
/// | -102   | `"-0.102"` |
/// | 31     | `" 0.031"` |
/// | -12345 | `" *.***"` |
pub fn signed_dec3(value: i32) -> Fixed {
    let whole = value / 1000;
    if whole > 9 || whole < -9 {
        return Fixed::from_ascii(SIGNED_OVERFLOW, true);
    }

    let magnitude = value.unsigned_abs();
    let mut buf = [0; WIDTH + 1];
    buf[0] = if value < 0 { b'-' } else { b' ' };
    buf[1] = digit(magnitude / 1000);
    buf[2] = b'.';
    buf[3] = digit(magnitude / 100);
    buf[4] = digit(magnitude / 10);
    buf[5] = digit(magnitude);
    Fixed {
        buf,
        overflow: false,
    }
}

/// Renders `value` / 256 as a blank-padded three digit integer part, '.', and
/// two fraction digits.
///
/// The integer part is `value >> 8`. The low eight bits are turned into
/// hundredths by summing a halving weight per set bit and rounding to the
/// nearest hundredth, saturating at .99 so the integer part never carries.
///
/// | value  | output     |
/// |--------|------------|
/// | 0      | `"  0.00"` |
/// | 2      | `"  0.01"` |
/// | 64     | `"  0.25"` |
/// | 100    | `"  0.39"` |
/// | 500    | `"  1.95"` |
/// | 512    | `"  2.00"` |
/// | 5000   | `" 19.53"` |
/// | 30000  | `"117.19"` |
/// | 255997 | `"999.99"` |
/// | 256000 | `"***.**"` |
pub fn unsigned_bin8(value: u32) -> Fixed {
    if value >= UNSIGNED_LIMIT {
        return Fixed::from_ascii(UNSIGNED_OVERFLOW, true);
    }

    let mut buf = [0; WIDTH + 1];

    let whole = value >> FRACTION_BITS;
    let mut significant = false;
    for (slot, divisor) in [100u32, 10, 1].iter().enumerate() {
        let d = whole / divisor % 10;
        significant |= d != 0 || *divisor == 1;
        buf[slot] = if significant { digit(d) } else { b' ' };
    }
    buf[3] = b'.';

    let hundredths = fraction_hundredths(value);
    buf[4] = digit(hundredths / 10);
    buf[5] = digit(hundredths);

    Fixed {
        buf,
        overflow: false,
    }
}

fn fraction_hundredths(value: u32) -> u32 {
    let mut weight = TOP_BIT_WEIGHT;
    let mut mask = 1 << (FRACTION_BITS - 1);
    let mut sum = 0;
    while mask != 0 {
        if value & mask != 0 {
            sum += weight;
        }
        weight /= 2;
        mask >>= 1;
    }
    ((sum + HUNDREDTH / 2) / HUNDREDTH).min(99)
}

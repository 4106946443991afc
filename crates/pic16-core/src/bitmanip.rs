//! Bit-manipulation unit: rotates, nibble swap and single-bit set/clear.
//!
//! Purely combinational. Rotates thread the flag-register carry through
//! bit 0 / bit 7; the other operations drive a zero carry out, which the
//! controller then commits, so SWAPF and BCF/BSF clear the carry flag.
//! That is a faithful reproduction of the circuit rather than textbook
//! PIC16 behavior.

use crate::alu::UnitOutput;

/// Operations of the bit-manipulation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum BitOp {
    #[default]
    None,
    RotateRight,
    RotateLeft,
    Swap,
    BitClear,
    BitSet,
}

/// Rotate/swap/bit-set/bit-clear unit.
pub struct BitUnit;

impl BitUnit {
    /// Combinational result for one operation.
    ///
    /// `target_bit` is a 3-bit index and only meaningful for
    /// [`BitOp::BitClear`]/[`BitOp::BitSet`]. [`BitOp::None`] and a
    /// disabled unit both drive 0 with no residual value.
    #[must_use]
    pub const fn output(
        value: u8,
        carry_in: bool,
        target_bit: u8,
        op: BitOp,
        enable: bool,
    ) -> UnitOutput {
        if !enable {
            return UnitOutput { result: 0, carry: false };
        }

        let carry = carry_in as u8;
        match op {
            BitOp::RotateRight => UnitOutput {
                result: (value >> 1) | (carry << 7),
                carry: value & 0x01 != 0,
            },
            BitOp::RotateLeft => UnitOutput {
                result: (value << 1) | carry,
                carry: value & 0x80 != 0,
            },
            BitOp::Swap => UnitOutput {
                result: value.rotate_left(4),
                carry: false,
            },
            BitOp::BitClear => UnitOutput {
                result: value & !(1 << (target_bit & 0x07)),
                carry: false,
            },
            BitOp::BitSet => UnitOutput {
                result: value | (1 << (target_bit & 0x07)),
                carry: false,
            },
            BitOp::None => UnitOutput { result: 0, carry: false },
        }
    }
}

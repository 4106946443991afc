//! Opcode enumeration and the mask/value instruction decode table.
//!
//! Decoding is a pure function of the 14-bit instruction word. The table is
//! matched most-specific-first, and any word that matches no row decodes as
//! [`Opcode::Nop`]: the hardware decoder is a case statement whose default
//! arm holds the enumeration's zero value.

/// Instruction words are 14 bits wide; upper bits of a `u16` are ignored.
pub const INSTRUCTION_BITS: u32 = 14;

/// Mask selecting the architecturally meaningful instruction bits.
pub const INSTRUCTION_MASK: u16 = (1 << INSTRUCTION_BITS) - 1;

/// Named operations of the PIC16-class instruction set.
///
/// `Nop` is the zero/default value so that unmatched bit patterns fall
/// through to it, exactly as the register-transfer-level decoder does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Opcode {
    #[default]
    Nop,
    Return,
    Retfie,
    Sleep,
    Movwf,
    Clrw,
    Clrf,
    Subwf,
    Decf,
    Iorwf,
    Andwf,
    Xorwf,
    Addwf,
    Movf,
    Comf,
    Incf,
    Decfsz,
    Rrf,
    Rlf,
    Swapf,
    Incfsz,
    Bcf,
    Bsf,
    Btfsc,
    Btfss,
    Call,
    Goto,
    Movlw,
    Retlw,
    Iorlw,
    Andlw,
    Xorlw,
    Sublw,
    Addlw,
}

/// Single source-of-truth decode table as `(mask, value, opcode)` rows.
///
/// A word decodes to the first row where `word & mask == value`. Row order
/// follows the hardware decoder: fully-specified control encodings first,
/// then the register-file, bit, flow and literal groups.
pub const DECODE_TABLE: &[(u16, u16, Opcode)] = &[
    (0x3F9F, 0x0000, Opcode::Nop),
    (0x3FFF, 0x0008, Opcode::Return),
    (0x3FFF, 0x0009, Opcode::Retfie),
    (0x3FFF, 0x0063, Opcode::Sleep),
    // CLRWDT is absent: this core carries no watchdog timer.
    (0x3F80, 0x0080, Opcode::Movwf),
    (0x3F80, 0x0100, Opcode::Clrw),
    (0x3F80, 0x0180, Opcode::Clrf),
    (0x3F00, 0x0200, Opcode::Subwf),
    (0x3F00, 0x0300, Opcode::Decf),
    (0x3F00, 0x0400, Opcode::Iorwf),
    (0x3F00, 0x0500, Opcode::Andwf),
    (0x3F00, 0x0600, Opcode::Xorwf),
    (0x3F00, 0x0700, Opcode::Addwf),
    (0x3F00, 0x0800, Opcode::Movf),
    (0x3F00, 0x0900, Opcode::Comf),
    (0x3F00, 0x0A00, Opcode::Incf),
    (0x3F00, 0x0B00, Opcode::Decfsz),
    (0x3F00, 0x0C00, Opcode::Rrf),
    (0x3F00, 0x0D00, Opcode::Rlf),
    (0x3F00, 0x0E00, Opcode::Swapf),
    (0x3F00, 0x0F00, Opcode::Incfsz),
    (0x3C00, 0x1000, Opcode::Bcf),
    (0x3C00, 0x1400, Opcode::Bsf),
    (0x3C00, 0x1800, Opcode::Btfsc),
    (0x3C00, 0x1C00, Opcode::Btfss),
    (0x3800, 0x2000, Opcode::Call),
    (0x3800, 0x2800, Opcode::Goto),
    (0x3C00, 0x3000, Opcode::Movlw),
    (0x3C00, 0x3400, Opcode::Retlw),
    (0x3F00, 0x3800, Opcode::Iorlw),
    (0x3F00, 0x3900, Opcode::Andlw),
    (0x3F00, 0x3A00, Opcode::Xorlw),
    (0x3E00, 0x3C00, Opcode::Sublw),
    (0x3E00, 0x3E00, Opcode::Addlw),
];

/// Decodes a 14-bit instruction word into its opcode.
///
/// Unmatched patterns yield [`Opcode::Nop`]; there is no illegal-instruction
/// trap anywhere in the core.
#[must_use]
pub fn decode(word: u16) -> Opcode {
    let word = word & INSTRUCTION_MASK;
    DECODE_TABLE
        .iter()
        .find_map(|&(mask, value, opcode)| (word & mask == value).then_some(opcode))
        .unwrap_or_default()
}

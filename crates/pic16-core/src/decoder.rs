//! Instruction word fields and per-opcode control classification.
//!
//! [`Instruction`] wraps one fetched 14-bit word and exposes its operand
//! fields. [`ControlSignals`] is the bundle of select lines the pipeline
//! controller re-derives from the latched instruction on every clock edge;
//! it is the single place where opcodes are classified into unit
//! operations, operand sources and writeback destinations.

use crate::alu::{ArithOp, LogicOp};
use crate::bitmanip::BitOp;
use crate::encoding::{decode, Opcode, INSTRUCTION_MASK};

/// One fetched instruction word, immutable for the duration of its
/// execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Instruction(u16);

impl Instruction {
    /// Wraps a raw word, truncating to the 14-bit instruction width.
    #[must_use]
    pub const fn new(word: u16) -> Self {
        Self(word & INSTRUCTION_MASK)
    }

    /// The raw 14-bit word.
    #[must_use]
    pub const fn word(self) -> u16 {
        self.0
    }

    /// Decodes this word's opcode.
    #[must_use]
    pub fn opcode(self) -> Opcode {
        decode(self.0)
    }

    /// Literal byte operand, bits `[0:8)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn literal(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// File register address, bits `[0:7)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn file_address(self) -> u8 {
        (self.0 & 0x7F) as u8
    }

    /// Bit index operand for bit-oriented opcodes, bits `[7:10)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn bit_index(self) -> u8 {
        ((self.0 >> 7) & 0x07) as u8
    }

    /// 11-bit CALL/GOTO target, bits `[0:11)`.
    #[must_use]
    pub const fn jump_target(self) -> u16 {
        self.0 & 0x07FF
    }

    /// Destination-select bit (bit 7): `false` targets W, `true` targets
    /// the addressed file register.
    #[must_use]
    pub const fn d_bit(self) -> bool {
        self.0 & 0x80 != 0
    }
}

/// Which unit's output feeds the result mux for a given opcode.
///
/// Selection is mutually exclusive. `None` commits 0 when a writeback is
/// requested anyway; MOVF and COMF land here, faithful to the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ResultSource {
    /// No unit drives the result; the mux output is 0.
    #[default]
    None,
    /// Arithmetic unit result and carry.
    Arith,
    /// Logic unit result.
    Logic,
    /// Bit-manipulation unit result and carry.
    Bit,
    /// Constant zero (CLRW/CLRF).
    Zero,
    /// The latched literal operand (MOVLW/RETLW).
    Literal,
    /// The working register passed through verbatim (MOVWF).
    Working,
}

/// Control lines derived from an opcode and its destination bit.
///
/// The controller latches one of these per clock edge; every field mirrors
/// a registered select signal in the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct ControlSignals {
    /// Operand lhs is loaded from the working register.
    pub reads_w: bool,
    /// Operand rhs is loaded from the peripheral-bus read data.
    pub reads_file: bool,
    /// Operand rhs is loaded from the instruction's literal byte.
    pub reads_literal: bool,
    /// Result commits to the working register.
    pub writes_w: bool,
    /// Result commits as a peripheral-bus write.
    pub writes_file: bool,
    /// The zero flag latches the skip signal at commit.
    pub updates_zero_flag: bool,
    /// PC must not auto-increment (flow-changing opcode).
    pub changes_flow: bool,
    /// Return-family opcode: pop the call stack into PC.
    pub is_return: bool,
    /// CALL/GOTO: compose PC from the high latch and the jump target.
    pub loads_pc_latch: bool,
    /// The committed carry is XOR-inverted one phase later (borrow model).
    pub carry_invert: bool,
    /// Operation issued to the arithmetic unit.
    pub arith_op: ArithOp,
    /// Operation issued to the logic unit.
    pub logic_op: LogicOp,
    /// Operation issued to the bit-manipulation unit.
    pub bit_op: BitOp,
    /// Unit feeding the result mux.
    pub result_source: ResultSource,
}

impl ControlSignals {
    /// Derives the full control bundle for `opcode` with destination bit
    /// `d`.
    #[must_use]
    pub fn derive(opcode: Opcode, d: bool) -> Self {
        use Opcode as Op;

        let arith_op = match opcode {
            Op::Addlw | Op::Addwf => ArithOp::Add,
            Op::Sublw | Op::Subwf => ArithOp::Sub,
            Op::Incf | Op::Incfsz => ArithOp::Inc,
            Op::Decf | Op::Decfsz => ArithOp::Dec,
            _ => ArithOp::Add,
        };
        let logic_op = match opcode {
            Op::Andlw | Op::Andwf => LogicOp::And,
            Op::Iorlw | Op::Iorwf => LogicOp::Or,
            Op::Xorlw | Op::Xorwf => LogicOp::Xor,
            _ => LogicOp::None,
        };
        let bit_op = match opcode {
            Op::Rrf => BitOp::RotateRight,
            Op::Rlf => BitOp::RotateLeft,
            Op::Swapf => BitOp::Swap,
            Op::Bcf => BitOp::BitClear,
            Op::Bsf => BitOp::BitSet,
            _ => BitOp::None,
        };

        let result_from_arith = matches!(
            opcode,
            Op::Addlw
                | Op::Sublw
                | Op::Incf
                | Op::Decf
                | Op::Addwf
                | Op::Subwf
                | Op::Incfsz
                | Op::Decfsz
        );
        let result_source = if result_from_arith {
            ResultSource::Arith
        } else if logic_op != LogicOp::None {
            ResultSource::Logic
        } else if bit_op != BitOp::None {
            ResultSource::Bit
        } else if matches!(opcode, Op::Clrw | Op::Clrf) {
            ResultSource::Zero
        } else if matches!(opcode, Op::Movlw | Op::Retlw) {
            ResultSource::Literal
        } else if opcode == Op::Movwf {
            ResultSource::Working
        } else {
            ResultSource::None
        };

        Self {
            reads_w: matches!(
                opcode,
                Op::Movwf
                    | Op::Addwf
                    | Op::Subwf
                    | Op::Andwf
                    | Op::Iorwf
                    | Op::Xorwf
                    | Op::Addlw
                    | Op::Sublw
                    | Op::Andlw
                    | Op::Iorlw
                    | Op::Xorlw
            ),
            reads_file: matches!(
                opcode,
                Op::Addwf
                    | Op::Subwf
                    | Op::Andwf
                    | Op::Iorwf
                    | Op::Xorwf
                    | Op::Incf
                    | Op::Incfsz
                    | Op::Decf
                    | Op::Decfsz
                    | Op::Comf
                    | Op::Movf
                    | Op::Rlf
                    | Op::Rrf
                    | Op::Swapf
                    | Op::Bcf
                    | Op::Bsf
                    | Op::Btfsc
                    | Op::Btfss
            ),
            reads_literal: matches!(
                opcode,
                Op::Movlw | Op::Retlw | Op::Addlw | Op::Sublw | Op::Andlw | Op::Iorlw | Op::Xorlw
            ),
            writes_w: Self::writes_w(opcode, d),
            writes_file: Self::writes_file(opcode, d),
            updates_zero_flag: matches!(
                opcode,
                Op::Clrw
                    | Op::Clrf
                    | Op::Subwf
                    | Op::Decf
                    | Op::Iorwf
                    | Op::Andwf
                    | Op::Xorwf
                    | Op::Addwf
                    | Op::Movf
                    | Op::Comf
                    | Op::Incf
                    | Op::Addlw
                    | Op::Sublw
                    | Op::Andlw
                    | Op::Iorlw
                    | Op::Xorlw
            ),
            changes_flow: matches!(
                opcode,
                Op::Call | Op::Goto | Op::Retfie | Op::Retlw | Op::Return
            ),
            is_return: matches!(opcode, Op::Retfie | Op::Retlw | Op::Return),
            loads_pc_latch: matches!(opcode, Op::Call | Op::Goto),
            carry_invert: matches!(arith_op, ArithOp::Sub | ArithOp::Dec),
            arith_op,
            logic_op,
            bit_op,
            result_source,
        }
    }

    fn writes_w(opcode: Opcode, d: bool) -> bool {
        use Opcode as Op;
        match opcode {
            Op::Clrw
            | Op::Movlw
            | Op::Retlw
            | Op::Addlw
            | Op::Sublw
            | Op::Andlw
            | Op::Iorlw
            | Op::Xorlw => true,
            Op::Clrf
            | Op::Decf
            | Op::Decfsz
            | Op::Movf
            | Op::Comf
            | Op::Incf
            | Op::Incfsz
            | Op::Rrf
            | Op::Rlf
            | Op::Swapf => !d,
            _ => false,
        }
    }

    fn writes_file(opcode: Opcode, d: bool) -> bool {
        use Opcode as Op;
        match opcode {
            // BCF/BSF always target the file register; bit 7 is part of
            // their bit-index field, not a destination select.
            Op::Bcf | Op::Bsf => true,
            Op::Movwf
            | Op::Clrf
            | Op::Subwf
            | Op::Decf
            | Op::Decfsz
            | Op::Iorwf
            | Op::Andwf
            | Op::Xorwf
            | Op::Addwf
            | Op::Movf
            | Op::Comf
            | Op::Incf
            | Op::Incfsz
            | Op::Rrf
            | Op::Rlf
            | Op::Swapf => d,
            _ => false,
        }
    }
}

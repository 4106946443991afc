//! Cycle-accurate model of an 8-bit PIC16-class instruction-execution
//! core.
//!
//! The crate reproduces the circuit at clock-edge granularity: a
//! four-phase pipeline controller sequences a table-driven decoder, an
//! arithmetic unit with a registered operand-negation path, a logic unit,
//! a bit-manipulation unit and an eight-entry hardware call stack, and
//! talks to the outside world over two single-cycle buses. Hardware
//! quirks of the design are preserved deliberately and documented where
//! they live.

/// Instruction word width and the mask/match decode table.
pub mod encoding;
pub use encoding::{decode, Opcode, DECODE_TABLE, INSTRUCTION_BITS, INSTRUCTION_MASK};

/// Instruction field extraction and per-opcode control classification.
pub mod decoder;
pub use decoder::{ControlSignals, Instruction, ResultSource};

/// Arithmetic and logic units.
pub mod alu;
pub use alu::{ArithOp, ArithUnit, LogicOp, LogicUnit, UnitOutput};

/// Rotate, nibble-swap and single-bit set/clear unit.
pub mod bitmanip;
pub use bitmanip::{BitOp, BitUnit};

/// Eight-entry hardware call stack.
pub mod stack;
pub use stack::{CallStack, CALL_STACK_DEPTH};

/// Signal-level bus contracts.
pub mod bus;
pub use bus::{
    BusInput, BusOutput, FetchResponder, InstructionBusOut, PeripheralBusOut, PeripheralResponder,
};

/// The four-phase pipeline controller.
pub mod core;
pub use self::core::{Core, Flags, Phase, PC_MASK};

/// Bus responders and a clock driver for tests and host embedding.
pub mod harness;
pub use harness::{
    ProgramImage, ProgramImageError, ProgramRom, RegisterFile, Testbench,
    PERIPHERAL_SPACE_BYTES, PROGRAM_CAPACITY_WORDS,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;

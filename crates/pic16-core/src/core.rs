//! Four-phase pipeline controller: the clocked state machine that owns the
//! working register, program counter, flags and PC high latch, sequences
//! the execution units and drives both buses.
//!
//! [`Core::step`] models one clock edge in two strict sub-phases: every
//! combinational value settles as a pure function of the current registers
//! and bus inputs, then all registers commit simultaneously from the
//! settled values. No partially-updated state is ever observable.
//!
//! Timing contract per instruction (4 cycles, see the phase handlers):
//!
//! * `Commit`: previous result commits to W / the peripheral write port /
//!   the flag register; fetch of the next word is issued; the execution
//!   units are enabled for exactly this cycle.
//! * `Latch`: the fetched word (or an injected NOP when pausing) is
//!   latched; the carry picks up its SUB/DEC borrow inversion; the write
//!   strobe from `Commit` is deasserted.
//! * `Memory`: file-register read is issued; CALL pushes and the return
//!   family pops; the PC advances or redirects.
//! * `StrobeClear`: the stack push/pop strobe raised in `Memory` clears.

use crate::alu::{ArithUnit, LogicUnit};
use crate::bitmanip::BitUnit;
use crate::bus::{BusInput, BusOutput, InstructionBusOut, PeripheralBusOut};
use crate::decoder::{ControlSignals, Instruction, ResultSource};
use crate::encoding::Opcode;
use crate::stack::CallStack;

/// Program-counter width mask; the core addresses 4096 instruction words.
pub const PC_MASK: u16 = 0x0FFF;

/// The four micro-steps of each instruction.
///
/// The counter free-runs; no stall or backpressure mechanism exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Phase {
    /// Commit previous result, issue the next fetch.
    #[default]
    Commit,
    /// Latch the fetched instruction word.
    Latch,
    /// File-register read, call-stack traffic, PC update.
    Memory,
    /// Clear the call-stack strobes.
    StrobeClear,
}

impl Phase {
    /// The phase entered at the next clock edge.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Commit => Self::Latch,
            Self::Latch => Self::Memory,
            Self::Memory => Self::StrobeClear,
            Self::StrobeClear => Self::Commit,
        }
    }
}

/// Carry and zero status bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Flags {
    /// Carry out of the arithmetic or bit unit, borrow-inverted for
    /// SUB/DEC one phase after commit.
    pub carry: bool,
    /// Result-was-zero bit, derived from the arithmetic unit's output.
    pub zero: bool,
}

/// The instruction-execution core.
///
/// All state is zeroed at construction and again by [`Core::reset`]; it is
/// never destroyed, matching the lifetime of the simulated circuit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct Core {
    phase: Phase,
    wreg: u8,
    pc: u16,
    flags: Flags,
    instruction: Instruction,
    /// Control bundle re-latched from the instruction register each edge.
    control: ControlSignals,
    lhs: u8,
    rhs: u8,
    target_bit: u8,
    /// Bit-unit operand register, one edge behind `rhs`.
    bit_value: u8,
    /// Bit-unit carry-in register, one edge behind the carry flag.
    bit_carry_in: bool,
    pause: bool,
    arith: ArithUnit,
    stack: CallStack,
    stack_value_in: u16,
    push_pending: bool,
    pop_pending: bool,
    pbus_address: u8,
    pbus_write_data: u8,
    pbus_write: bool,
}

impl Core {
    /// A core in its reset state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every register to its zeroed reset value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current working register.
    #[must_use]
    pub const fn wreg(&self) -> u8 {
        self.wreg
    }

    /// Current 12-bit program counter.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Current flag register.
    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    /// Current pipeline phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The hardware call stack.
    #[must_use]
    pub const fn call_stack(&self) -> &CallStack {
        &self.stack
    }

    /// The bus lines driven during the current cycle, settled
    /// combinationally from the present register state.
    #[must_use]
    pub fn outputs(&self) -> BusOutput {
        let comb = self.classify();
        BusOutput {
            fetch: InstructionBusOut {
                address: self.pc,
                read: self.phase == Phase::Commit,
            },
            periph: PeripheralBusOut {
                address: self.pbus_address,
                read: self.phase == Phase::Memory && comb.reads_file,
                write: self.pbus_write,
                write_data: self.pbus_write_data,
            },
        }
    }

    /// Advances the core by one clock edge.
    ///
    /// `input` carries the bus data lines as they read at this edge; the
    /// return value is [`Core::outputs`] for the cycle being entered.
    #[allow(clippy::too_many_lines, clippy::cast_possible_truncation)]
    pub fn step(&mut self, input: &BusInput) -> BusOutput {
        // --- combinational settle -------------------------------------
        let opcode = self.instruction.opcode();
        let comb = self.classify();
        let op_enable = self.phase == Phase::Commit;

        let arith_out = self
            .arith
            .output(self.lhs, self.rhs, self.control.arith_op, op_enable);
        let logic_result = LogicUnit::output(self.lhs, self.rhs, self.control.logic_op, op_enable);
        let bit_out = BitUnit::output(
            self.bit_value,
            self.bit_carry_in,
            self.target_bit,
            self.control.bit_op,
            op_enable,
        );

        let result = match self.control.result_source {
            ResultSource::Arith => arith_out.result,
            ResultSource::Logic => logic_result,
            ResultSource::Bit => bit_out.result,
            ResultSource::Literal => self.rhs,
            ResultSource::Working => self.wreg,
            ResultSource::Zero | ResultSource::None => 0,
        };

        // The zero candidate always comes from the adder, even when the
        // committed result does not. For the logic family the flag
        // reflects lhs + rhs rather than the logic result, a known
        // deviation from conventional PIC16 semantics, reproduced here.
        let skip = arith_out.result == 0;

        // --- synchronous commit ---------------------------------------
        // Next values are fully computed before any register is written.
        let mut next_wreg = self.wreg;
        let mut next_pc = self.pc;
        let mut next_flags = self.flags;
        let mut next_instruction = self.instruction;
        let mut next_pause = self.pause;
        let mut next_target_bit = self.target_bit;
        let mut next_pbus_address = self.pbus_address;
        let mut next_pbus_write_data = self.pbus_write_data;
        let mut next_pbus_write = self.pbus_write;
        let mut next_stack_value_in = self.stack_value_in;
        let mut next_push_pending = self.push_pending;
        let mut next_pop_pending = self.pop_pending;

        match self.phase {
            Phase::Commit => {
                if self.control.writes_w {
                    next_wreg = result;
                } else if self.control.writes_file {
                    next_pbus_address = self.instruction.file_address();
                    next_pbus_write_data = result;
                    next_pbus_write = true;
                }
                if self.control.updates_zero_flag {
                    next_flags.zero = skip;
                }
                match self.control.result_source {
                    ResultSource::Arith => next_flags.carry = arith_out.carry,
                    ResultSource::Bit => next_flags.carry = bit_out.carry,
                    _ => {}
                }
                if matches!(opcode, Opcode::Incfsz | Opcode::Decfsz) {
                    next_pause = skip;
                }
            }
            Phase::Latch => {
                if self.pause {
                    // Inject a NOP in place of the word just fetched.
                    next_instruction = Instruction::new(0);
                    next_pause = false;
                } else {
                    next_instruction = Instruction::new(input.fetch_data);
                    next_pbus_address = (input.fetch_data & 0x7F) as u8;
                }
                next_flags.carry = self.flags.carry
                    ^ (self.control.result_source == ResultSource::Arith
                        && self.control.carry_invert);
                next_pbus_write = false;
            }
            Phase::Memory => {
                if opcode == Opcode::Call {
                    next_stack_value_in = (self.pc + 1) & PC_MASK;
                    next_push_pending = true;
                } else if comb.is_return {
                    next_pc = self.stack.top();
                    next_pop_pending = true;
                }
                if comb.loads_pc_latch {
                    let high = u16::from((input.pc_latch_high >> 3) & 0x03);
                    next_pc = (self.instruction.jump_target() | (high << 11)) & PC_MASK;
                } else if !comb.changes_flow {
                    next_pc = (self.pc + 1) & PC_MASK;
                }
            }
            Phase::StrobeClear => {
                debug_assert!(
                    !(self.push_pending && self.pop_pending),
                    "call stack push and pop asserted in the same cycle"
                );
                if self.push_pending {
                    self.stack.push(self.stack_value_in);
                    next_push_pending = false;
                } else if self.pop_pending {
                    let _ = self.stack.pop();
                    next_pop_pending = false;
                }
            }
        }

        // Operand and control registers reload on every edge, one cycle
        // ahead of their use in the commit cycle.
        let next_lhs = if comb.reads_w { self.wreg } else { 0 };
        let next_rhs = if comb.reads_file {
            input.periph_read_data
        } else if comb.reads_literal {
            self.instruction.literal()
        } else {
            0
        };
        if matches!(opcode, Opcode::Bcf | Opcode::Bsf) {
            next_target_bit = self.instruction.bit_index();
        }
        let next_bit_value = self.rhs;
        let next_bit_carry_in = self.flags.carry;
        self.arith.latch_negation(self.rhs);

        self.wreg = next_wreg;
        self.pc = next_pc;
        self.flags = next_flags;
        self.instruction = next_instruction;
        self.control = comb;
        self.lhs = next_lhs;
        self.rhs = next_rhs;
        self.target_bit = next_target_bit;
        self.bit_value = next_bit_value;
        self.bit_carry_in = next_bit_carry_in;
        self.pause = next_pause;
        self.stack_value_in = next_stack_value_in;
        self.push_pending = next_push_pending;
        self.pop_pending = next_pop_pending;
        self.pbus_address = next_pbus_address;
        self.pbus_write_data = next_pbus_write_data;
        self.pbus_write = next_pbus_write;
        self.phase = self.phase.next();

        self.outputs()
    }

    fn classify(&self) -> ControlSignals {
        ControlSignals::derive(self.instruction.opcode(), self.instruction.d_bit())
    }
}

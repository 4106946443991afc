//! Arithmetic and logic execution units.
//!
//! Both units settle combinationally every cycle. The arithmetic unit
//! additionally owns one register: the two's-complement negation of the
//! current right operand, recomputed on every clock edge regardless of
//! enable and consumed one cycle later by SUB. That one-cycle latency is
//! part of the circuit's timing contract: SUB only produces the right
//! answer when the right operand was stable for the preceding cycle, and
//! the pipeline controller schedules operands to guarantee exactly that.

/// Operations of the arithmetic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ArithOp {
    /// 8-bit addition; also the unit's idle operation.
    #[default]
    Add,
    /// Subtraction via two's-complement addition of the latched negation.
    Sub,
    /// Increment: ADD with the left operand forced to 1.
    Inc,
    /// Decrement: ADD with the left operand forced to 0xFF.
    Dec,
}

/// Operations of the logic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum LogicOp {
    #[default]
    None,
    And,
    Or,
    Xor,
}

/// Combinational output of a result-producing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitOutput {
    /// 8-bit result value.
    pub result: u8,
    /// Carry out of bit 8 of the 9-bit internal sum.
    pub carry: bool,
}

/// Add/sub/increment/decrement unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArithUnit {
    rhs_negated: u8,
}

impl ArithUnit {
    /// Combinational result for the current operand registers.
    ///
    /// INC and DEC override the left operand to 1 and 0xFF so that every
    /// operation is an addition. A disabled unit drives 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn output(&self, lhs: u8, rhs: u8, op: ArithOp, enable: bool) -> UnitOutput {
        if !enable {
            return UnitOutput { result: 0, carry: false };
        }

        let lhs = match op {
            ArithOp::Inc => 1,
            ArithOp::Dec => 0xFF,
            ArithOp::Add | ArithOp::Sub => lhs,
        };
        let rhs = match op {
            ArithOp::Sub => self.rhs_negated,
            ArithOp::Add | ArithOp::Inc | ArithOp::Dec => rhs,
        };

        let sum = lhs as u16 + rhs as u16;
        UnitOutput {
            result: (sum & 0xFF) as u8,
            carry: sum & 0x100 != 0,
        }
    }

    /// Synchronous half of the unit: latches the two's-complement negation
    /// of the right operand for consumption on the next cycle.
    ///
    /// The circuit performs this on every clock edge, unconditionally.
    pub const fn latch_negation(&mut self, rhs: u8) {
        self.rhs_negated = (!rhs).wrapping_add(1);
    }

    /// Returns all internal state to its reset value.
    pub const fn reset(&mut self) {
        self.rhs_negated = 0;
    }
}

/// Bitwise and/or/xor unit, purely combinational.
pub struct LogicUnit;

impl LogicUnit {
    /// Combinational result; [`LogicOp::None`] and disabled both yield 0.
    #[must_use]
    pub const fn output(lhs: u8, rhs: u8, op: LogicOp, enable: bool) -> u8 {
        if !enable {
            return 0;
        }
        match op {
            LogicOp::And => lhs & rhs,
            LogicOp::Or => lhs | rhs,
            LogicOp::Xor => lhs ^ rhs,
            LogicOp::None => 0,
        }
    }
}

//! Hardware call stack: eight 12-bit return addresses behind a 3-bit
//! counter.
//!
//! There is no overflow or underflow protection. A ninth push silently
//! overwrites the oldest entry as the counter wraps, and popping an empty
//! stack returns whatever the slot last held. Both are documented
//! limitations of the circuit, not faults. Asserting push and pop in the
//! same cycle is a caller contract; the pipeline controller never does.

/// Number of return-address slots.
pub const CALL_STACK_DEPTH: usize = 8;

const ADDRESS_MASK: u16 = 0x0FFF;
const COUNT_MASK: u8 = 0x07;

/// Eight-entry circular return-address stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CallStack {
    slots: [u16; CALL_STACK_DEPTH],
    count: u8,
}

impl CallStack {
    /// Current 3-bit entry count, always in `0..8`.
    #[must_use]
    pub const fn count(&self) -> u8 {
        self.count
    }

    /// Top of stack, read combinationally at index `count - 1 (mod 8)`.
    ///
    /// Valid in the same cycle a push completes. With `count == 0` this
    /// reads slot 7: last-written data, or 0 out of reset.
    #[must_use]
    pub const fn top(&self) -> u16 {
        self.slots[(self.count.wrapping_sub(1) & COUNT_MASK) as usize]
    }

    /// Pushes a 12-bit return address, wrapping the counter modulo 8.
    pub const fn push(&mut self, value: u16) {
        self.slots[(self.count & COUNT_MASK) as usize] = value & ADDRESS_MASK;
        self.count = self.count.wrapping_add(1) & COUNT_MASK;
    }

    /// Pops and returns the top entry, wrapping the counter modulo 8.
    pub const fn pop(&mut self) -> u16 {
        let value = self.top();
        self.count = self.count.wrapping_sub(1) & COUNT_MASK;
        value
    }

    /// Returns the stack to its zeroed reset state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

//! Signal-level bus contracts between the core and its collaborators.
//!
//! Both buses follow a strict one-cycle request/response discipline:
//! address and strobe are asserted for one cycle, and the responder must
//! present valid data by the following clock edge. There is no wait-state
//! or retry protocol, so responders are required to answer in a single
//! cycle; a holding register on the read-data line satisfies the contract.

/// Signals the core drives onto the instruction bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InstructionBusOut {
    /// 12-bit fetch address (the program counter).
    pub address: u16,
    /// Read strobe; asserted for exactly one cycle per instruction.
    pub read: bool,
}

/// Signals the core drives onto the peripheral bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PeripheralBusOut {
    /// 7-bit address within the flat 128-location peripheral space.
    pub address: u8,
    /// Read strobe for file-register operands.
    pub read: bool,
    /// Write strobe accompanying `write_data`.
    pub write: bool,
    /// Data for the addressed location while `write` is asserted.
    pub write_data: u8,
}

/// All input lines the core samples at a clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusInput {
    /// Instruction-bus data line: the word for the last fetch request.
    pub fetch_data: u16,
    /// Peripheral-bus read-data line.
    pub periph_read_data: u8,
    /// Externally supplied high-order address latch; bits `[3:5)` complete
    /// 12-bit CALL/GOTO targets. The core never mutates it.
    pub pc_latch_high: u8,
}

/// All output lines the core drives during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusOutput {
    /// Instruction bus outputs.
    pub fetch: InstructionBusOut,
    /// Peripheral bus outputs.
    pub periph: PeripheralBusOut,
}

/// Responder on the instruction bus (flash controller, test ROM, ...).
///
/// `clock` is called once per cycle with the lines the core is driving;
/// the return value is what the data line reads at the end of that cycle.
/// Implementations must register their response when `read` is asserted
/// and hold it afterwards.
pub trait FetchResponder {
    /// Advances the responder by one clock cycle.
    fn clock(&mut self, bus: &InstructionBusOut) -> u16;
}

/// Responder on the peripheral bus (I/O ports, RAM blocks, registers).
///
/// Same single-cycle-latency contract as [`FetchResponder`]: the returned
/// value is the read-data line at the end of the cycle, registered on read
/// strobes and held between them. Writes take effect while `write` is
/// asserted.
pub trait PeripheralResponder {
    /// Advances the responder by one clock cycle.
    fn clock(&mut self, bus: &PeripheralBusOut) -> u8;
}

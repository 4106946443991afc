//! Simulation harness: single-cycle bus responders and a clock driver.
//!
//! The core itself only speaks signals; these types stand in for the
//! surrounding system (flash controller, peripheral address map) with the
//! simplest responders that honor the one-cycle bus contract. They exist
//! for tests and host embedding, not as models of real peripherals.

use thiserror::Error;

use crate::bus::{BusInput, BusOutput, FetchResponder, InstructionBusOut, PeripheralBusOut,
    PeripheralResponder};
use crate::core::Core;
use crate::encoding::INSTRUCTION_MASK;

/// Number of instruction words addressable by the 12-bit program counter.
pub const PROGRAM_CAPACITY_WORDS: usize = 4096;

/// Number of byte locations in the flat peripheral address space.
pub const PERIPHERAL_SPACE_BYTES: usize = 128;

/// Rejection reasons for host-supplied program images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProgramImageError {
    /// More words than the 12-bit program counter can address.
    #[error("program image holds {0} words; the core addresses at most {PROGRAM_CAPACITY_WORDS}")]
    TooLarge(usize),
    /// A word with bits set above the 14-bit instruction width.
    #[error("word at index {index} is {word:#06x}, wider than 14 bits")]
    WordTooWide {
        /// Index of the offending word.
        index: usize,
        /// The raw word.
        word: u16,
    },
}

/// A validated program of up to 4096 instruction words.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ProgramImage {
    words: Vec<u16>,
}

impl ProgramImage {
    /// Validates and wraps a slice of instruction words.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramImageError`] when the image exceeds 4096 words or
    /// any word is wider than 14 bits.
    pub fn from_words(words: &[u16]) -> Result<Self, ProgramImageError> {
        if words.len() > PROGRAM_CAPACITY_WORDS {
            return Err(ProgramImageError::TooLarge(words.len()));
        }
        for (index, &word) in words.iter().enumerate() {
            if word & !INSTRUCTION_MASK != 0 {
                return Err(ProgramImageError::WordTooWide { index, word });
            }
        }
        Ok(Self {
            words: words.to_vec(),
        })
    }

    /// Word at `address`; locations beyond the image read as 0 (NOP).
    #[must_use]
    pub fn word(&self, address: u16) -> u16 {
        self.words.get(usize::from(address)).copied().unwrap_or(0)
    }
}

/// Instruction-bus responder over a [`ProgramImage`].
///
/// The data line is registered when the read strobe is asserted and held
/// afterwards, which is how the real flash controller satisfies the
/// single-cycle contract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramRom {
    image: ProgramImage,
    data: u16,
}

impl ProgramRom {
    /// Wraps a program image.
    #[must_use]
    pub const fn new(image: ProgramImage) -> Self {
        Self { image, data: 0 }
    }
}

impl FetchResponder for ProgramRom {
    fn clock(&mut self, bus: &InstructionBusOut) -> u16 {
        if bus.read {
            self.data = self.image.word(bus.address);
        }
        self.data
    }
}

/// Peripheral-bus responder: a flat 128-byte register file with a holding
/// register on the read-data line and a log of every committed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    cells: [u8; PERIPHERAL_SPACE_BYTES],
    data: u8,
    writes: Vec<(u8, u8)>,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self {
            cells: [0; PERIPHERAL_SPACE_BYTES],
            data: 0,
            writes: Vec::new(),
        }
    }
}

impl RegisterFile {
    /// A zeroed register file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preloads one location, bypassing the bus.
    pub fn set(&mut self, address: u8, value: u8) {
        self.cells[usize::from(address & 0x7F)] = value;
    }

    /// Reads one location, bypassing the bus.
    #[must_use]
    pub const fn get(&self, address: u8) -> u8 {
        self.cells[(address & 0x7F) as usize]
    }

    /// Every `(address, data)` pair committed over the bus, in order.
    #[must_use]
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }
}

impl PeripheralResponder for RegisterFile {
    fn clock(&mut self, bus: &PeripheralBusOut) -> u8 {
        if bus.write {
            self.cells[usize::from(bus.address & 0x7F)] = bus.write_data;
            self.writes.push((bus.address, bus.write_data));
        }
        if bus.read {
            self.data = self.cells[usize::from(bus.address & 0x7F)];
        }
        self.data
    }
}

/// Clock driver wiring a [`Core`] to its bus responders.
#[derive(Debug, Default)]
pub struct Testbench {
    core: Core,
    rom: ProgramRom,
    peripherals: RegisterFile,
    /// Externally supplied page-select value fed to the PC high latch.
    pub pc_latch_high: u8,
}

impl Testbench {
    /// A testbench out of reset, executing `program` from address 0.
    #[must_use]
    pub fn new(program: ProgramImage) -> Self {
        Self {
            core: Core::new(),
            rom: ProgramRom::new(program),
            peripherals: RegisterFile::new(),
            pc_latch_high: 0,
        }
    }

    /// The core under test.
    #[must_use]
    pub const fn core(&self) -> &Core {
        &self.core
    }

    /// The peripheral register file.
    #[must_use]
    pub const fn peripherals(&self) -> &RegisterFile {
        &self.peripherals
    }

    /// Mutable access for preloading peripheral state.
    pub const fn peripherals_mut(&mut self) -> &mut RegisterFile {
        &mut self.peripherals
    }

    /// Advances one clock cycle and returns the bus lines the core drove
    /// during that cycle.
    pub fn tick(&mut self) -> BusOutput {
        let outputs = self.core.outputs();
        let fetch_data = self.rom.clock(&outputs.fetch);
        let periph_read_data = self.peripherals.clock(&outputs.periph);
        self.core.step(&BusInput {
            fetch_data,
            periph_read_data,
            pc_latch_high: self.pc_latch_high,
        });
        outputs
    }

    /// Advances one full four-phase instruction slot.
    pub fn step_instruction(&mut self) {
        for _ in 0..4 {
            let _ = self.tick();
        }
    }

    /// Advances `count` instruction slots.
    pub fn run(&mut self, count: usize) {
        for _ in 0..count {
            self.step_instruction();
        }
    }
}

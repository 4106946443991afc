//! Decode-table and flag-semantics conformance, including the hardware
//! quirks the model reproduces on purpose.

#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use pic16_core::{decode, Opcode, ProgramImage, Testbench, DECODE_TABLE, INSTRUCTION_MASK};
use proptest::prelude::*;
use rstest::rstest;

mod asm {
    pub const NOP: u16 = 0x0000;
    pub const RETFIE: u16 = 0x0009;
    pub const SLEEP: u16 = 0x0063;
    pub const CLRW: u16 = 0x0100;

    pub const fn movlw(k: u8) -> u16 {
        0x3000 | k as u16
    }

    pub const fn addlw(k: u8) -> u16 {
        0x3E00 | k as u16
    }

    pub const fn sublw(k: u8) -> u16 {
        0x3C00 | k as u16
    }

    pub const fn andlw(k: u8) -> u16 {
        0x3900 | k as u16
    }

    pub const fn xorlw(k: u8) -> u16 {
        0x3A00 | k as u16
    }

    const fn file_op(base: u16, f: u8, d: bool) -> u16 {
        base | ((d as u16) << 7) | (f & 0x7F) as u16
    }

    pub const fn movwf(f: u8) -> u16 {
        0x0080 | (f & 0x7F) as u16
    }

    pub const fn clrf(f: u8) -> u16 {
        0x0180 | (f & 0x7F) as u16
    }

    pub const fn movf(f: u8, d: bool) -> u16 {
        file_op(0x0800, f, d)
    }

    pub const fn comf(f: u8, d: bool) -> u16 {
        file_op(0x0900, f, d)
    }

    pub const fn incf(f: u8, d: bool) -> u16 {
        file_op(0x0A00, f, d)
    }

    pub const fn decf(f: u8, d: bool) -> u16 {
        file_op(0x0300, f, d)
    }

    pub const fn bsf(f: u8, b: u8) -> u16 {
        0x1400 | ((b as u16 & 0x07) << 7) | (f & 0x7F) as u16
    }

    pub const fn btfss(f: u8, b: u8) -> u16 {
        0x1C00 | ((b as u16 & 0x07) << 7) | (f & 0x7F) as u16
    }

    pub const fn call(target: u16) -> u16 {
        0x2000 | (target & 0x07FF)
    }
}

use asm::{
    addlw, andlw, bsf, btfss, call, clrf, comf, decf, incf, movf, movlw, movwf, sublw, xorlw,
    CLRW, NOP, RETFIE, SLEEP,
};

fn bench(program: &[u16]) -> Testbench {
    Testbench::new(ProgramImage::from_words(program).expect("valid test program"))
}

#[rstest]
#[case(movlw(0x1F), Opcode::Movlw)]
#[case(addlw(0x05), Opcode::Addlw)]
#[case(sublw(0x0A), Opcode::Sublw)]
#[case(andlw(0xF0), Opcode::Andlw)]
#[case(xorlw(0xAA), Opcode::Xorlw)]
#[case(movwf(0x05), Opcode::Movwf)]
#[case(clrf(0x07), Opcode::Clrf)]
#[case(CLRW, Opcode::Clrw)]
#[case(movf(0x09, false), Opcode::Movf)]
#[case(comf(0x09, true), Opcode::Comf)]
#[case(incf(0x05, true), Opcode::Incf)]
#[case(decf(0x06, false), Opcode::Decf)]
#[case(bsf(0x04, 5), Opcode::Bsf)]
#[case(btfss(0x03, 7), Opcode::Btfss)]
#[case(call(0x015), Opcode::Call)]
#[case(NOP, Opcode::Nop)]
#[case(RETFIE, Opcode::Retfie)]
#[case(SLEEP, Opcode::Sleep)]
fn assembled_words_decode_to_their_opcodes(#[case] word: u16, #[case] expected: Opcode) {
    assert_eq!(decode(word), expected);
}

proptest! {
    #[test]
    fn dont_care_bits_never_change_the_decoded_opcode(
        row in 0..DECODE_TABLE.len(),
        noise: u16,
    ) {
        let (mask, value, opcode) = DECODE_TABLE[row];
        let word = value | (noise & !mask & INSTRUCTION_MASK);
        prop_assert_eq!(decode(word), opcode);
    }
}

#[test]
fn zero_flag_tracks_the_adder_not_the_logic_result() {
    // ANDLW 0 produces 0, but the zero candidate is always the adder
    // output, here 0xFF + 0.
    let mut bench = bench(&[movlw(0xFF), andlw(0x00)]);
    bench.run(3);
    assert_eq!(bench.core().wreg(), 0);
    assert!(!bench.core().flags().zero);

    // With both operands zero the adder agrees with the logic result.
    let mut bench = self::bench(&[movlw(0x00), xorlw(0x00)]);
    bench.run(3);
    assert!(bench.core().flags().zero);
}

#[test]
fn addition_overflow_sets_carry_and_zero() {
    let mut bench = bench(&[movlw(0xFF), addlw(1)]);
    bench.run(3);

    assert_eq!(bench.core().wreg(), 0);
    assert!(bench.core().flags().zero);
    assert!(bench.core().flags().carry);
}

#[rstest]
#[case(35, 10, 25, false)]
#[case(1, 5, 252, true)]
// Subtracting zero: the negation latch wraps to zero, the raw carry
// stays low, and the inversion still reports no borrow.
#[case(7, 0, 7, true)]
fn subtraction_reports_borrow_through_the_inverted_carry(
    #[case] w: u8,
    #[case] literal: u8,
    #[case] difference: u8,
    #[case] carry: bool,
) {
    let mut bench = bench(&[movlw(w), sublw(literal)]);
    bench.run(3);

    assert_eq!(bench.core().wreg(), difference);
    assert_eq!(bench.core().flags().carry, carry);
}

#[test]
fn clear_instructions_zero_their_target_and_set_the_flag() {
    let mut bench = bench(&[movlw(0x55), CLRW]);
    bench.run(3);
    assert_eq!(bench.core().wreg(), 0);
    assert!(bench.core().flags().zero);

    let mut bench = self::bench(&[clrf(7)]);
    bench.peripherals_mut().set(7, 0xEE);
    bench.run(2);
    assert_eq!(bench.peripherals().writes(), &[(7, 0x00)]);
    assert!(bench.core().flags().zero);
}

#[rstest]
#[case(0x5A, false)]
#[case(0x00, true)]
fn movf_commits_zero_and_only_tests_the_file(#[case] preload: u8, #[case] zero: bool) {
    let mut bench = bench(&[movlw(0x77), movf(9, false)]);
    bench.peripherals_mut().set(9, preload);

    bench.run(3);

    // No unit drives the MOVF result path; W is overwritten with 0 and
    // the zero flag is the only meaningful outcome.
    assert_eq!(bench.core().wreg(), 0);
    assert_eq!(bench.core().flags().zero, zero);
}

#[test]
fn comf_writes_back_zero_instead_of_the_complement() {
    let mut bench = bench(&[comf(9, true)]);
    bench.peripherals_mut().set(9, 0x0F);

    bench.run(2);

    assert_eq!(bench.peripherals().writes(), &[(9, 0x00)]);
    assert!(!bench.core().flags().zero, "adder saw 0x0F");
}

#[test]
fn increment_and_decrement_drive_carry_and_zero() {
    let mut bench = bench(&[incf(5, false)]);
    bench.peripherals_mut().set(5, 0xFF);
    bench.run(2);
    assert_eq!(bench.core().wreg(), 0);
    assert!(bench.core().flags().zero);
    assert!(bench.core().flags().carry);

    let mut bench = self::bench(&[decf(6, true)]);
    bench.peripherals_mut().set(6, 1);
    bench.run(2);
    assert_eq!(bench.peripherals().writes(), &[(6, 0x00)]);
    assert!(bench.core().flags().zero);
    // DEC borrows through the same inverted-carry path as SUB.
    assert!(!bench.core().flags().carry);
}

#[test]
fn bit_unit_writebacks_clear_the_carry_flag() {
    let mut bench = bench(&[movlw(0xFF), addlw(1), bsf(4, 0)]);

    bench.run(3);
    assert!(bench.core().flags().carry, "set up by the overflowing add");

    bench.run(1);
    assert!(!bench.core().flags().carry, "BSF commits the bit unit's zero carry");
    assert_eq!(bench.peripherals().writes(), &[(4, 0x01)]);
}

#[test]
fn bit_tests_read_the_file_but_never_skip_or_write() {
    let mut bench = bench(&[movlw(0x11), btfss(3, 7), movlw(0x22)]);
    bench.peripherals_mut().set(3, 0xFF);

    bench.run(4);

    assert_eq!(bench.core().wreg(), 0x22, "no skip occurred");
    assert!(bench.peripherals().writes().is_empty());
}

#[test]
fn movwf_passes_w_through_to_the_file() {
    let mut bench = bench(&[movlw(0x5A), movwf(3)]);

    bench.run(4);

    assert_eq!(bench.peripherals().writes(), &[(3, 0x5A)]);
    assert_eq!(bench.core().wreg(), 0x5A);
}

#[test]
fn sleep_executes_as_an_inert_word() {
    let mut bench = bench(&[movlw(9), SLEEP, addlw(1)]);

    bench.run(4);

    assert_eq!(bench.core().wreg(), 10);
}

#[test]
fn retfie_pops_the_stack_like_return() {
    let mut bench = bench(&[call(2), NOP, RETFIE]);

    bench.run(2);

    assert_eq!(bench.core().call_stack().count(), 0);
    assert_eq!(bench.core().pc(), 1);
}

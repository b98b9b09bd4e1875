//! End-to-end exercise of a hand-assembled microcode program through
//! `System::step`: load an accumulator from a page-direct operand, store it
//! back out to a different address, then jump, then fetch one more
//! instruction at the jump target. Mirrors §10.5's integration-test
//! requirement ("LDA-equivalent transfer, a store, a branch").

use mincpu::microcode::{OP_JMP, OP_LDA, OP_NOP, OP_STA};
use mincpu::system::System;

const FLASH_SIZE: usize = 512 * 1024;

fn flash_image(program: &[(usize, u8)]) -> Vec<u8> {
    let mut image = vec![0u8; FLASH_SIZE];
    for &(addr, byte) in program {
        image[addr] = byte;
    }
    image
}

#[test]
fn lda_sta_jmp_program_runs_end_to_end() {
    let program = [
        (0x00, OP_LDA),
        (0x01, 0x10), // operand: load from page-direct address 0x10
        (0x02, OP_STA),
        (0x03, 0x11), // operand: store to page-direct address 0x11
        (0x04, OP_JMP),
        (0x05, 0x08), // operand: jump target 0x08
        (0x08, OP_NOP),
        (0x10, 0x77), // the value LDA picks up
    ];
    let mut system = System::new();
    system.load_flash(&flash_image(&program)).unwrap();

    // LDA: fetch prelude (3) + body (6) = 9 cycles.
    for _ in 0..9 {
        system.step().unwrap();
    }
    assert_eq!(system.a(), 0x77, "LDA should have loaded the page-direct operand");
    assert_eq!(system.pc(), 0x02);
    assert_eq!(system.step_index(), 0);

    // STA: fetch prelude (3) + body (6) = 9 cycles.
    for _ in 0..9 {
        system.step().unwrap();
    }
    assert_eq!(system.flash()[0x11], 0x77, "STA should round-trip the accumulator to flash");
    assert_eq!(system.pc(), 0x04);

    // JMP: fetch prelude (3) + body (5: CO|MI, CO|MI|HI, RO|BI|CEME, BO|CI, IC) = 8 cycles.
    for _ in 0..8 {
        system.step().unwrap();
    }
    assert_eq!(system.pc(), 0x08, "JMP should have loaded PC low from its operand");

    // NOP at the jump target: fetch prelude (3) + body (1) = 4 cycles.
    for _ in 0..4 {
        system.step().unwrap();
    }
    assert_eq!(system.opcode(), OP_NOP);
    assert_eq!(system.pc(), 0x09);
    assert_eq!(system.step_index(), 0);
}

#[test]
fn uart_input_feeds_through_a_full_program() {
    use mincpu::microcode::OP_IN;

    let program = [(0x00, OP_IN)];
    let mut system = System::new();
    system.load_flash(&flash_image(&program)).unwrap();
    system.push_uart_input(0xAB);

    for _ in 0..5 {
        system.step().unwrap();
    }
    assert_eq!(system.a(), 0xAB);
}

#[test]
fn reset_is_idempotent_mid_program() {
    let program = [(0x00, OP_LDA), (0x01, 0x05), (0x05, 0x42)];
    let mut system = System::new();
    system.load_flash(&flash_image(&program)).unwrap();

    for _ in 0..9 {
        system.step().unwrap();
    }
    assert_eq!(system.a(), 0x42);

    system.reset();
    assert_eq!(system.a(), 0);
    assert_eq!(system.pc(), 0);
    assert_eq!(system.step_index(), 0);
    // Flash contents survive a reset; only registers/counters clear.
    assert_eq!(system.flash()[0x05], 0x42);
}

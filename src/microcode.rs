/*!
The concrete instruction set burned into the microcode ROM.

The board's encoding contract (fetch prelude, per-opcode step sequences,
branch-by-flag-row selection, `IC` termination) is fixed by the hardware and
implemented here exactly as §4.10 describes it. The specific 64-opcode
assignment itself is not dictated anywhere in the board documentation beyond
"total over 64 opcodes, unmapped cells are a no-op" — this module picks a
small, internally consistent instruction set that fits the register budget
in §3 (only A and B are available as general-purpose scratch; MAL/MAH only
ever address memory, never hold an operand across two fetches at once).

A consequence worth noting for every opcode here: building a full 16-bit
absolute address from a 2-byte operand would need two temporaries held at
once (address-low and address-high) plus, for `STA`, the accumulator itself
— three live bytes against a two-register budget. Every memory-referencing
opcode below therefore uses a single-byte "page-direct" operand: the target
address's high byte is whatever the program counter's high byte already is
at the moment the operand is fetched (i.e. the operand's own page). This is
recorded as a deliberate ISA decision in DESIGN.md, not a spec requirement.
*/

use crate::control_rom::{AI, AO, BI, BO, CEME, CI, CO, EC, EOFI, ES, HI, IC, MI, RI, RO, ROM_SIZE, TR};

pub const OP_NOP: u8 = 0x00;
pub const OP_LDA: u8 = 0x01;
pub const OP_STA: u8 = 0x02;
pub const OP_ADD: u8 = 0x03;
pub const OP_SUB: u8 = 0x04;
pub const OP_OUT: u8 = 0x05;
pub const OP_IN: u8 = 0x06;
pub const OP_SETBANK: u8 = 0x07;
pub const OP_JMP: u8 = 0x08;
pub const OP_BEQ: u8 = 0x09;
pub const OP_BNE: u8 = 0x0A;
pub const OP_BCS: u8 = 0x0B;
pub const OP_BCC: u8 = 0x0C;
pub const OP_BMI: u8 = 0x0D;
pub const OP_BPL: u8 = 0x0E;

const FETCH_PRELUDE: [u16; 3] = [CO | MI, CO | MI | HI, RO | HI | CEME];

fn body_nop() -> Vec<u16> {
    vec![IC]
}

fn body_lda() -> Vec<u16> {
    vec![CO | MI, CO | MI | HI, RO | BI | CEME, BO | MI, RO | AI, IC]
}

fn body_sta() -> Vec<u16> {
    vec![CO | MI, CO | MI | HI, RO | BI | CEME, BO | MI, AO | RI, IC]
}

fn body_add() -> Vec<u16> {
    vec![CO | MI, CO | MI | HI, RO | BI | CEME, BO | MI, RO | BI, EOFI | AI, IC]
}

fn body_sub() -> Vec<u16> {
    vec![CO | MI, CO | MI | HI, RO | BI | CEME, BO | MI, RO | BI, EOFI | EC | ES | AI, IC]
}

fn body_out() -> Vec<u16> {
    vec![AO | TR | HI, IC]
}

fn body_in() -> Vec<u16> {
    vec![TR | AI, IC]
}

fn body_setbank() -> Vec<u16> {
    vec![AO | EC | HI, IC]
}

fn body_branch_take() -> Vec<u16> {
    vec![CO | MI, CO | MI | HI, RO | BI | CEME, BO | CI, IC]
}

fn body_branch_skip() -> Vec<u16> {
    vec![CO | MI, CO | MI | HI, RO | CEME, IC]
}

/// `flags` is the 3-bit `{N,C,Z}` row; returns the post-fetch microstep body
/// for the given opcode in that flag row.
fn body_for(opcode: u8, flags: u8) -> Vec<u16> {
    let n = (flags >> 2) & 1 != 0;
    let c = (flags >> 1) & 1 != 0;
    let z = flags & 1 != 0;

    match opcode {
        OP_NOP => body_nop(),
        OP_LDA => body_lda(),
        OP_STA => body_sta(),
        OP_ADD => body_add(),
        OP_SUB => body_sub(),
        OP_OUT => body_out(),
        OP_IN => body_in(),
        OP_SETBANK => body_setbank(),
        OP_JMP => body_branch_take(),
        OP_BEQ => if z { body_branch_take() } else { body_branch_skip() },
        OP_BNE => if !z { body_branch_take() } else { body_branch_skip() },
        OP_BCS => if c { body_branch_take() } else { body_branch_skip() },
        OP_BCC => if !c { body_branch_take() } else { body_branch_skip() },
        OP_BMI => if n { body_branch_take() } else { body_branch_skip() },
        OP_BPL => if !n { body_branch_take() } else { body_branch_skip() },
        _ => body_nop(),
    }
}

/// Build the full 8192-entry `{flags, opcode, step}` microcode table.
pub fn build_rom() -> Vec<u16> {
    let mut rom = vec![0u16; ROM_SIZE];

    for flags in 0u16..8 {
        for opcode in 0u16..64 {
            let body = body_for(opcode as u8, flags as u8);
            let mut steps = FETCH_PRELUDE.to_vec();
            steps.extend(body);
            assert!(
                steps.len() <= 16,
                "microsequence for opcode {opcode:#04x} (flags {flags:#03b}) exceeds 16 steps"
            );
            for (step, word) in steps.iter().enumerate() {
                let idx = crate::control_rom::ControlRom::index_for(flags, opcode, step as u16);
                rom[idx] = *word;
            }
            // Remaining steps (past the terminating IC) are unreachable —
            // the step counter resets to 0 the cycle IC is asserted — and
            // are left zeroed.
        }
    }

    rom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_rom::ControlRom;

    #[test]
    fn rom_has_8192_entries() {
        assert_eq!(build_rom().len(), ROM_SIZE);
    }

    #[test]
    fn fetch_prelude_identical_across_every_opcode_and_flag_row() {
        let rom = build_rom();
        for flags in 0u16..8 {
            for opcode in 0u16..64 {
                for (step, expected) in FETCH_PRELUDE.iter().enumerate() {
                    let idx = ControlRom::index_for(flags, opcode, step as u16);
                    assert_eq!(rom[idx], *expected, "flags={flags} opcode={opcode:#04x} step={step}");
                }
            }
        }
    }

    #[test]
    fn every_microsequence_terminates_with_ic() {
        let rom = build_rom();
        for flags in 0u16..8 {
            for opcode in 0u16..64 {
                let has_ic = (0u16..16).any(|step| {
                    let idx = ControlRom::index_for(flags, opcode, step);
                    rom[idx] & IC != 0
                });
                assert!(has_ic, "flags={flags} opcode={opcode:#04x} never asserts IC");
            }
        }
    }

    #[test]
    fn branch_opcode_selects_take_or_skip_by_flag_row() {
        let rom = build_rom();
        // BEQ: taken only when Z=1 (flags row bit0).
        let taken_idx = ControlRom::index_for(0b001, OP_BEQ as u16, 3);
        let skip_idx = ControlRom::index_for(0b000, OP_BEQ as u16, 3);
        assert_eq!(rom[taken_idx], CO | MI);
        assert_eq!(rom[skip_idx], CO | MI);
        let taken_final = ControlRom::index_for(0b001, OP_BEQ as u16, 7);
        let skip_final = ControlRom::index_for(0b000, OP_BEQ as u16, 6);
        assert_eq!(rom[taken_final], IC);
        assert_eq!(rom[skip_final], IC);
    }

    #[test]
    fn unmapped_opcode_is_fetch_then_ic() {
        let rom = build_rom();
        let idx = ControlRom::index_for(0, 0x3F, 3);
        assert_eq!(rom[idx], IC);
    }
}

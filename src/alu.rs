/*!
Adder: the combinational 8-bit ALU. Reads the A/B tap buses, optionally
inverts B and adds a carry-in, and always publishes `{N,C,Z}` onto
`AdderFlagsBus`. When `EO` (EOFI) is asserted it additionally drives the sum
onto the MainBus; the Flags register is responsible for latching
`AdderFlagsBus` when EOFI and clock are both high (see `system.rs`).
*/

use crate::signal::{BusId, SignalArena, WireId};

#[derive(Debug, Clone, Copy)]
pub struct Adder {
    from_a: BusId,
    from_b: BusId,
    carry_in: WireId,
    invert_b: WireId,
    eofi: WireId,
    sum_out: BusId,
    flags_out: BusId,
}

impl Adder {
    pub fn new(
        from_a: BusId,
        from_b: BusId,
        carry_in: WireId,
        invert_b: WireId,
        eofi: WireId,
        sum_out: BusId,
        flags_out: BusId,
    ) -> Self {
        Self {
            from_a,
            from_b,
            carry_in,
            invert_b,
            eofi,
            sum_out,
            flags_out,
        }
    }

    pub fn evaluate(&mut self, arena: &mut SignalArena) -> bool {
        let a = arena.read_bus(self.from_a) & 0xFF;
        let raw_b = arena.read_bus(self.from_b) & 0xFF;
        let b = if arena.read_wire(self.invert_b) {
            (!raw_b) & 0xFF
        } else {
            raw_b
        };
        let carry_in = if arena.read_wire(self.carry_in) { 1 } else { 0 };

        let sum: u16 = a + b + carry_in;
        let result = sum & 0xFF;
        let n = (result & 0x80) != 0;
        let c = sum > 0xFF;
        let z = result == 0;
        let flags = ((n as u16) << 2) | ((c as u16) << 1) | (z as u16);

        let mut changed = arena.write_bus(self.flags_out, flags);

        if arena.read_wire(self.eofi) {
            changed |= arena.write_bus(self.sum_out, result);
        }

        changed
    }
}

/*!
ControlLogic: purely combinational gating of CI, CO, MI, TR, CEME and EC by
the HI signal. Each raw signal fans out into a high-byte and a low-byte
variant; these pick which of the two halves of a 16-bit-wide resource
(PC/MA, the UART direction, the BANK latch) a given microstep addresses.
*/

use crate::signal::{SignalArena, WireId};

#[derive(Debug, Clone, Copy)]
pub struct ControlLogic {
    hi: WireId,
    ci: WireId,
    co: WireId,
    mi: WireId,
    tr: WireId,
    ceme: WireId,
    ec: WireId,

    pub cih: WireId,
    pub cil: WireId,
    pub coh: WireId,
    pub col: WireId,
    pub mih: WireId,
    pub mil: WireId,
    pub trh: WireId,
    pub trl: WireId,
    pub cemeh: WireId,
    pub cemel: WireId,
    pub ech: WireId,
    pub ecl: WireId,
}

impl ControlLogic {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hi: WireId,
        ci: WireId,
        co: WireId,
        mi: WireId,
        tr: WireId,
        ceme: WireId,
        ec: WireId,
        arena: &mut SignalArena,
    ) -> Self {
        Self {
            hi,
            ci,
            co,
            mi,
            tr,
            ceme,
            ec,
            cih: arena.add_wire("cih"),
            cil: arena.add_wire("cil"),
            coh: arena.add_wire("coh"),
            col: arena.add_wire("col"),
            mih: arena.add_wire("mih"),
            mil: arena.add_wire("mil"),
            trh: arena.add_wire("trh"),
            trl: arena.add_wire("trl"),
            cemeh: arena.add_wire("cemeh"),
            cemel: arena.add_wire("cemel"),
            ech: arena.add_wire("ech"),
            ecl: arena.add_wire("ecl"),
        }
    }

    pub fn evaluate(&mut self, arena: &mut SignalArena) -> bool {
        let hi = arena.read_wire(self.hi);
        let lo = !hi;

        let mut changed = false;
        let mut gate = |arena: &mut SignalArena, raw: WireId, hi_out: WireId, lo_out: WireId| {
            let raw_val = arena.read_wire(raw);
            let mut c = arena.write_wire(hi_out, raw_val && hi);
            c |= arena.write_wire(lo_out, raw_val && lo);
            c
        };

        changed |= gate(arena, self.ci, self.cih, self.cil);
        changed |= gate(arena, self.co, self.coh, self.col);
        changed |= gate(arena, self.mi, self.mih, self.mil);
        changed |= gate(arena, self.tr, self.trh, self.trl);
        changed |= gate(arena, self.ceme, self.cemeh, self.cemel);
        changed |= gate(arena, self.ec, self.ech, self.ecl);

        changed
    }
}

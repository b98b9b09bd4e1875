/*!
InstructionRegister and StepCounter: the two latches that, together with the
Flags register, index the microcode ROM. Both are clocked on `nclock`
(the falling edge of the system clock) rather than gated by any microcode
control bit — §4.9 calls this out explicitly ("the step counter advances
... and the instruction register (also on nclock) loads"), so both are
modeled here with their own rising-edge detector on `nclock`, the same
pattern `Counter` uses for its `increment` wire.

The 16 control bits have no dedicated "load the instruction register" line
(unlike, say, a discrete II control signal): loading on *every* nclock edge
would make the register track whatever happened to be on MainBus one
half-cycle ago, which is overwritten long before the body of the
instruction finishes reading it back out of the ROM. The fetch prelude's
terminal word is always `RO | HI | CEME` (see `microcode::FETCH_PRELUDE`),
the only microstep that ever places the opcode byte on MainBus, so the
register is wired to load only on the nclock edge where those three raw
control signals are asserted, and to hold steady on every other edge
during the instruction body. Gating on the raw `ro`/`hi`/`ceme` wires
rather than on the step counter's value keeps the load condition a pure
function of signals `ControlRom` already settled earlier in the same
`evaluate_all` pass, so it does not depend on running before or after
`StepCounter` within that pass.
*/

use crate::signal::{BusId, SignalArena, WireId};

/// Latches `MainBus` into an 8-bit opcode byte on the `nclock` rising edge
/// that coincides with the fetch prelude's terminal word (`RO|HI|CEME`),
/// and holds steady on every other edge; publishes the value on a
/// dedicated tap (the ROM's opcode field).
#[derive(Debug, Clone, Copy)]
pub struct InstructionRegister {
    reset: WireId,
    nclock: WireId,
    input: BusId,
    ro: WireId,
    hi: WireId,
    ceme: WireId,
    opcode_tap: BusId,
    prev_nclock: bool,
    value: u8,
}

impl InstructionRegister {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reset: WireId,
        nclock: WireId,
        input: BusId,
        ro: WireId,
        hi: WireId,
        ceme: WireId,
        opcode_tap: BusId,
    ) -> Self {
        Self {
            reset,
            nclock,
            input,
            ro,
            hi,
            ceme,
            opcode_tap,
            prev_nclock: false,
            value: 0,
        }
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn evaluate(&mut self, arena: &mut SignalArena) -> bool {
        let nclock_now = arena.read_wire(self.nclock);
        let rising_edge = !self.prev_nclock && nclock_now;
        self.prev_nclock = nclock_now;

        let is_fetch_terminal =
            arena.read_wire(self.ro) && arena.read_wire(self.hi) && arena.read_wire(self.ceme);

        let mut changed = false;
        if arena.read_wire(self.reset) {
            if self.value != 0 {
                self.value = 0;
                changed = true;
            }
        } else if rising_edge && is_fetch_terminal {
            let incoming = (arena.read_bus(self.input) & 0xFF) as u8;
            if self.value != incoming {
                self.value = incoming;
                changed = true;
            }
        }

        changed |= arena.write_bus(self.opcode_tap, self.value as u16);
        changed
    }
}

/// The 4-bit microstep counter. Advances on every `nclock` rising edge
/// unless the current word asserts `IC`, in which case it resets to 0 —
/// ending the instruction and returning control to the fetch prelude.
#[derive(Debug, Clone, Copy)]
pub struct StepCounter {
    reset: WireId,
    nclock: WireId,
    ic: WireId,
    step_tap: BusId,
    prev_nclock: bool,
    value: u8,
}

impl StepCounter {
    pub fn new(reset: WireId, nclock: WireId, ic: WireId, step_tap: BusId) -> Self {
        Self {
            reset,
            nclock,
            ic,
            step_tap,
            prev_nclock: false,
            value: 0,
        }
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn evaluate(&mut self, arena: &mut SignalArena) -> bool {
        let nclock_now = arena.read_wire(self.nclock);
        let rising_edge = !self.prev_nclock && nclock_now;
        self.prev_nclock = nclock_now;

        let mut changed = false;
        if arena.read_wire(self.reset) {
            if self.value != 0 {
                self.value = 0;
                changed = true;
            }
        } else if rising_edge {
            let next = if arena.read_wire(self.ic) {
                0
            } else {
                (self.value + 1) & 0xF
            };
            if self.value != next {
                self.value = next;
                changed = true;
            }
        }

        changed |= arena.write_bus(self.step_tap, self.value as u16);
        changed
    }
}

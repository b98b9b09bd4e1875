/*!
Register / RegisterWithTap: edge-latched N-bit storage gated by reset,
clock, input-enable and output-enable wires.

A plain Register only appears on the MainBus (or another listed output bus)
while its output-enable and clock are both asserted, and only accepts a new
value while its input-enable and clock are both asserted. `RegisterWithTap`
is the same latch with one extra always-on output (the *tap* bus) that
continuously publishes the latched value regardless of output-enable — used
to feed the ALU's `FromA`/`FromB` inputs from the A/B registers without
requiring a bus cycle, and to feed `RAMAndFlash`'s address decode from
MAL/MAH without ever putting the address on the shared MainBus.
*/

use crate::signal::{BusId, SignalArena, WireId};

/// Edge-latched N-bit register with reset, clock, input-enable and
/// output-enable gating, driving zero or more output buses.
#[derive(Debug, Clone)]
pub struct Register {
    name: &'static str,
    reset: WireId,
    clock: WireId,
    input_enable: WireId,
    output_enable: WireId,
    input: BusId,
    outputs: Vec<BusId>,
    /// Present for `RegisterWithTap`: an unconditionally-driven output.
    tap: Option<BusId>,
    value: u16,
}

impl Register {
    pub fn new(
        name: &'static str,
        reset: WireId,
        clock: WireId,
        input_enable: WireId,
        output_enable: WireId,
        input: BusId,
        outputs: Vec<BusId>,
    ) -> Self {
        Self {
            name,
            reset,
            clock,
            input_enable,
            output_enable,
            input,
            outputs,
            tap: None,
            value: 0,
        }
    }

    /// Build a `RegisterWithTap`: identical contract, plus an always-driven
    /// tap bus independent of `output_enable`.
    pub fn with_tap(mut self, tap: BusId) -> Self {
        self.tap = Some(tap);
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Evaluate the register for the current half-cycle. Returns true if any
    /// driven output (listed outputs, conditionally, and the tap, if any)
    /// changed value.
    pub fn evaluate(&mut self, arena: &mut SignalArena) -> bool {
        let mut changed = false;

        if arena.read_wire(self.reset) {
            if self.value != 0 {
                self.value = 0;
                changed = true;
            }
        } else if arena.read_wire(self.input_enable) && arena.read_wire(self.clock) {
            // Gating the latch itself on `clock`, not just the output drive,
            // keeps this level-sensitive model from re-snapshotting a stale
            // MainBus value during the falling half-cycle, after the step
            // counter has already advanced to the next microword (see
            // DESIGN.md, "Register input latch and the falling half-cycle").
            let incoming = arena.read_bus(self.input);
            if self.value != incoming {
                self.value = incoming;
                changed = true;
            }
        }

        if let Some(tap) = self.tap {
            changed |= arena.write_bus(tap, self.value);
        }

        if arena.read_wire(self.output_enable) && arena.read_wire(self.clock) {
            for &out in &self.outputs {
                changed |= arena.write_bus(out, self.value);
            }
        }

        changed
    }
}

/*!
Counter: a Register that also increments on the rising edge of a dedicated
`increment` wire, provided its load (input-enable, clock-gated exactly like
a plain Register's latch) is not asserted that same half-cycle, and emits a
one-cycle `carry` pulse when the increment wraps from `2^N - 1` back to `0`.

The program counter is realized as two chained 8-bit Counters: the low
counter's `carry` output is wired directly to the high counter's `increment`
input, so a full 16-bit PC increment only ever needs a single `increment`
pulse (CEME) applied to the low half.
*/

use crate::signal::{BusId, SignalArena, WireId};

#[derive(Debug, Clone)]
pub struct Counter {
    name: &'static str,
    reset: WireId,
    clock: WireId,
    /// Doubles as the Counter's `load` gate: while asserted, an increment
    /// edge on the same half-cycle is ignored in favor of the direct load.
    input_enable: WireId,
    output_enable: WireId,
    input: BusId,
    outputs: Vec<BusId>,
    tap: Option<BusId>,
    increment: WireId,
    carry: WireId,
    mask: u16,
    value: u16,
    prev_increment: bool,
}

impl Counter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &'static str,
        width: u8,
        reset: WireId,
        clock: WireId,
        input_enable: WireId,
        output_enable: WireId,
        input: BusId,
        outputs: Vec<BusId>,
        increment: WireId,
        carry: WireId,
    ) -> Self {
        assert!(width >= 1 && width <= 16);
        let mask = if width >= 16 { 0xFFFF } else { (1u16 << width) - 1 };
        Self {
            name,
            reset,
            clock,
            input_enable,
            output_enable,
            input,
            outputs,
            tap: None,
            increment,
            carry,
            mask,
            value: 0,
            prev_increment: false,
        }
    }

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

    pub fn evaluate(&mut self, arena: &mut SignalArena) -> bool {
        let mut changed = false;
        let increment_now = arena.read_wire(self.increment);
        let rising_edge = !self.prev_increment && increment_now;
        self.prev_increment = increment_now;

        let mut wrapped = false;
        if arena.read_wire(self.reset) {
            if self.value != 0 {
                self.value = 0;
                changed = true;
            }
        } else if arena.read_wire(self.input_enable) && arena.read_wire(self.clock) {
            // Load is clock-gated like an ordinary Register's latch; the
            // increment edge below is not, since it is driven by its own
            // dedicated wire rather than the system clock.
            let incoming = arena.read_bus(self.input) & self.mask;
            if self.value != incoming {
                self.value = incoming;
                changed = true;
            }
        } else if rising_edge {
            let next = (self.value.wrapping_add(1)) & self.mask;
            wrapped = next == 0;
            if self.value != next {
                self.value = next;
                changed = true;
            }
        }

        changed |= arena.write_wire(self.carry, wrapped);

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

/*!
System: owns every wire, bus and block in the machine and drives the
two-phase settle loop described in §4.9.

`Step` pre-charges MainBus, then runs the rising half-cycle (clock=1,
nclock=0) to quiescence, then the falling half-cycle (clock=0, nclock=1) to
quiescence. Each half-cycle repeatedly evaluates every block in the same
fixed order until none of them report a changed output, or gives up after
100 iterations with a `QuiescenceExceeded` error — the network never
settling is treated as a fault in the microcode, not something the host can
route around.
*/

use log::{trace, warn};

use crate::alu::Adder;
use crate::control_logic::ControlLogic;
use crate::control_rom::{ControlRom, Signals};
use crate::counter::Counter;
use crate::error::{ClockPolarity, SimError};
use crate::memory::{RamAndFlash, RamAndFlashStorage};
use crate::microcode;
use crate::register::Register;
use crate::sequencer::{InstructionRegister, StepCounter};
use crate::signal::{BusId, SignalArena, WireId};
use crate::uart::ConsoleIo;

const MAX_SETTLE_ITERATIONS: u32 = 100;

pub struct System {
    arena: SignalArena,

    reset: WireId,
    clock: WireId,
    nclock: WireId,
    main_bus: BusId,

    a: Register,
    b: Register,
    mal: Register,
    mah: Register,
    bank: Register,
    flags: Register,
    pcl: Counter,
    pch: Counter,
    adder: Adder,
    ram_and_flash: RamAndFlash,
    storage: RamAndFlashStorage,
    uart: ConsoleIo,
    control_rom: ControlRom,
    control_logic: ControlLogic,
    ir: InstructionRegister,
    step_counter: StepCounter,
}

impl System {
    pub fn new() -> Self {
        let mut arena = SignalArena::new();

        let reset = arena.add_wire("reset");
        let clock = arena.add_wire("clock");
        let nclock = arena.add_wire("nclock");
        let main_bus = arena.add_bus("MainBus", 8);

        let from_a = arena.add_bus("FromA", 8);
        let from_b = arena.add_bus("FromB", 8);
        let mal_tap = arena.add_bus("MAL", 8);
        let mah_tap = arena.add_bus("MAH", 8);
        let bank_tap = arena.add_bus("BANK", 4);
        let flags_tap = arena.add_bus("Flags", 3);
        let adder_flags = arena.add_bus("AdderFlagsBus", 3);
        let opcode_tap = arena.add_bus("Opcode", 6);
        let step_tap = arena.add_bus("Step", 4);

        let signals = Signals {
            ai: arena.add_wire("AI"),
            ao: arena.add_wire("AO"),
            bi: arena.add_wire("BI"),
            bo: arena.add_wire("BO"),
            ci: arena.add_wire("CI"),
            co: arena.add_wire("CO"),
            ec: arena.add_wire("EC"),
            es: arena.add_wire("ES"),
            ceme: arena.add_wire("CEME"),
            eofi: arena.add_wire("EOFI"),
            hi: arena.add_wire("HI"),
            ic: arena.add_wire("IC"),
            mi: arena.add_wire("MI"),
            ri: arena.add_wire("RI"),
            ro: arena.add_wire("RO"),
            tr: arena.add_wire("TR"),
        };

        let control_logic = ControlLogic::new(
            signals.hi,
            signals.ci,
            signals.co,
            signals.mi,
            signals.tr,
            signals.ceme,
            signals.ec,
            &mut arena,
        );

        let pcl_carry = arena.add_wire("pcl_carry");
        let pch_carry = arena.add_wire("pch_carry");
        // MAL/MAH/BANK/Flags never drive a listed output bus (they are only
        // ever observed through their always-on tap), so their output-enable
        // wire is wired to a net that is never asserted rather than reusing
        // an unrelated control signal.
        let never = arena.add_wire("never_oe");

        let a = Register::new("A", reset, clock, signals.ai, signals.ao, main_bus, vec![main_bus])
            .with_tap(from_a);
        let b = Register::new("B", reset, clock, signals.bi, signals.bo, main_bus, vec![main_bus])
            .with_tap(from_b);
        let mal = Register::new("MAL", reset, clock, control_logic.mil, never, main_bus, vec![])
            .with_tap(mal_tap);
        let mah = Register::new("MAH", reset, clock, control_logic.mih, never, main_bus, vec![])
            .with_tap(mah_tap);
        let bank = Register::new("BANK", reset, clock, control_logic.ech, never, main_bus, vec![])
            .with_tap(bank_tap);
        let flags = Register::new("Flags", reset, clock, signals.eofi, never, adder_flags, vec![])
            .with_tap(flags_tap);

        let pcl = Counter::new(
            "PCL",
            8,
            reset,
            clock,
            control_logic.cil,
            control_logic.col,
            main_bus,
            vec![main_bus],
            signals.ceme,
            pcl_carry,
        );
        let pch = Counter::new(
            "PCH",
            8,
            reset,
            clock,
            control_logic.cih,
            control_logic.coh,
            main_bus,
            vec![main_bus],
            pcl_carry,
            pch_carry,
        );

        let adder = Adder::new(from_a, from_b, signals.ec, signals.es, signals.eofi, main_bus, adder_flags);

        let ram_and_flash = RamAndFlash::new(
            mah_tap,
            mal_tap,
            bank_tap,
            signals.ri,
            signals.ro,
            main_bus,
            vec![main_bus],
        );
        let storage = RamAndFlashStorage::new();

        let uart = ConsoleIo::new(clock, control_logic.trh, control_logic.trl, main_bus, vec![main_bus]);

        let control_rom = ControlRom::new(flags_tap, opcode_tap, step_tap, signals, microcode::build_rom());

        let ir = InstructionRegister::new(reset, nclock, main_bus, signals.ro, signals.hi, signals.ceme, opcode_tap);
        let step_counter = StepCounter::new(reset, nclock, signals.ic, step_tap);

        let mut system = Self {
            arena,
            reset,
            clock,
            nclock,
            main_bus,
            a,
            b,
            mal,
            mah,
            bank,
            flags,
            pcl,
            pch,
            adder,
            ram_and_flash,
            storage,
            uart,
            control_rom,
            control_logic,
            ir,
            step_counter,
        };
        system.reset();
        system
    }

    /// Load a flash image; must be exactly `memory::FLASH_SIZE` bytes.
    pub fn load_flash(&mut self, data: &[u8]) -> Result<(), SimError> {
        self.storage.load_flash(data)
    }

    /// Queue a byte for the simulated CPU's next UART input read.
    pub fn push_uart_input(&mut self, byte: u8) {
        self.uart.push_input(byte);
    }

    /// Clears every register to zero and pre-charges MainBus to 0xFF, per
    /// the board's reset invariant. Called once from `new`; also available
    /// for a host-initiated restart.
    pub fn reset(&mut self) {
        self.arena.write_wire(self.reset, true);
        self.arena.write_wire(self.clock, true);
        self.arena.write_wire(self.nclock, false);
        for _ in 0..MAX_SETTLE_ITERATIONS {
            if !self.evaluate_all() {
                break;
            }
        }
        self.arena.write_wire(self.reset, false);
        self.arena.precharge_bus(self.main_bus);
    }

    /// Run one full clock cycle: pre-charge, rising half-cycle, falling
    /// half-cycle.
    pub fn step(&mut self) -> Result<(), SimError> {
        self.arena.precharge_bus(self.main_bus);

        self.arena.write_wire(self.clock, true);
        self.arena.write_wire(self.nclock, false);
        self.settle(ClockPolarity::Rising)?;

        let opcode_before = self.ir.value();
        self.arena.write_wire(self.clock, false);
        self.arena.write_wire(self.nclock, true);
        self.settle(ClockPolarity::Falling)?;

        if self.ir.value() != opcode_before {
            trace!("fetched opcode {:#04x} at pc={:#06x}", self.ir.value(), self.pc());
        }

        Ok(())
    }

    /// Run the machine for `max_steps` cycles, or forever if `None`.
    pub fn run(&mut self, max_steps: Option<u64>) -> Result<(), SimError> {
        match max_steps {
            Some(n) => {
                for _ in 0..n {
                    self.step()?;
                }
            }
            None => loop {
                self.step()?;
            },
        }
        Ok(())
    }

    fn settle(&mut self, polarity: ClockPolarity) -> Result<(), SimError> {
        for iteration in 0..MAX_SETTLE_ITERATIONS {
            if !self.evaluate_all() {
                return Ok(());
            }
            let _ = iteration;
        }
        warn!(
            "settle loop did not reach quiescence within {MAX_SETTLE_ITERATIONS} iterations during the {polarity} half-cycle"
        );
        Err(SimError::QuiescenceExceeded {
            polarity,
            iterations: MAX_SETTLE_ITERATIONS,
        })
    }

    /// Evaluate every block once, in a fixed order. Returns true if any
    /// block reported a changed output. Ordering does not affect the fixed
    /// point eventually reached, only how many iterations it takes to get
    /// there.
    fn evaluate_all(&mut self) -> bool {
        let mut changed = false;
        changed |= self.control_rom.evaluate(&mut self.arena);
        changed |= self.control_logic.evaluate(&mut self.arena);
        changed |= self.a.evaluate(&mut self.arena);
        changed |= self.b.evaluate(&mut self.arena);
        changed |= self.mal.evaluate(&mut self.arena);
        changed |= self.mah.evaluate(&mut self.arena);
        changed |= self.bank.evaluate(&mut self.arena);
        changed |= self.flags.evaluate(&mut self.arena);
        changed |= self.pcl.evaluate(&mut self.arena);
        changed |= self.pch.evaluate(&mut self.arena);
        changed |= self.adder.evaluate(&mut self.arena);
        changed |= self.ram_and_flash.evaluate(&mut self.arena, &mut self.storage);
        changed |= self.uart.evaluate(&mut self.arena);
        changed |= self.ir.evaluate(&mut self.arena);
        changed |= self.step_counter.evaluate(&mut self.arena);
        changed
    }

    pub fn a(&self) -> u16 {
        self.a.value()
    }

    pub fn b(&self) -> u16 {
        self.b.value()
    }

    pub fn pc(&self) -> u16 {
        (self.pch.value() << 8) | self.pcl.value()
    }

    pub fn flags(&self) -> u16 {
        self.flags.value()
    }

    pub fn opcode(&self) -> u8 {
        self.ir.value()
    }

    pub fn step_index(&self) -> u8 {
        self.step_counter.value()
    }

    pub fn ram(&self) -> &[u8] {
        &self.storage.ram
    }

    pub fn flash(&self) -> &[u8] {
        &self.storage.flash
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

#![doc = r#"
mincpu: a cycle-accurate gate-level simulator of the Minimal CPU System, an
8-bit microcoded CPU board.

This crate exposes the simulator core for use by the `mincpu` binary and by
tests. The core is a fixed set of discrete evaluator blocks (registers,
counters, a combinational ALU, banked memory, a UART, and a microcode
control ROM) wired together by `System` and driven clock-edge by
clock-edge through a two-phase settle loop.

Modules:
- signal: Wire/Bus primitives and the arena that owns every signal
- register: Register / RegisterWithTap, the edge-latched storage block
- counter: Counter (Register plus rising-edge increment and carry)
- alu: Adder, the combinational ALU
- memory: RAMAndFlash, the banked RAM/Flash memory block
- uart: ConsoleIo, the UART block
- control_rom: the microcode ROM lookup and its 16-bit signal fan-out
- control_logic: HI-gated high/low-byte signal variants
- sequencer: InstructionRegister and StepCounter
- microcode: the concrete instruction set and the 8192-entry ROM it builds
- system: System, the settle loop, and the public `step`/`run` API
- config: RunConfig and CLI argument parsing (ambient, not simulated)
- error: SimError and its exit-code mapping
"#]

pub mod alu;
pub mod config;
pub mod control_logic;
pub mod control_rom;
pub mod counter;
pub mod error;
pub mod memory;
pub mod microcode;
pub mod register;
pub mod sequencer;
pub mod signal;
pub mod system;
pub mod uart;

pub use config::RunConfig;
pub use error::SimError;
pub use system::System;

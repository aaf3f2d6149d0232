//! The machine itself: fetch-decode-execute loop, interrupt entry and
//! return, and the instruction handlers.

use std::io::{self, Write};

use crate::decode::{self, OpcodeEntry, Operation};
use crate::interrupt::{InterruptController, TIMER_LINE};
use crate::memory::{Memory, MEMORY_SIZE};
use crate::registers::RegisterFile;
use crate::snapshot::{MachineSnapshot, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
use crate::timer::{Clock, Timer, WallClock};
use crate::tracer::Tracer;
use crate::{stack, Ls8Error, Result};

/// What one executed cycle did to control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Default PC advance applies.
    Continue,
    /// The instruction set PC itself; no advance.
    ControlTransfer,
    /// HLT reached; the loop is done.
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Halted,
}

/// One LS-8 machine with its injected collaborators. Construct with
/// [`Machine::new`], adjust with the `with_*` methods, then [`Machine::run`]
/// (or [`Machine::step`] cycle by cycle).
pub struct Machine {
    memory: Memory,
    regs: RegisterFile,
    pc: u16,
    fl: u8,
    interrupts: InterruptController,
    clock: Box<dyn Clock>,
    console: Box<dyn Write>,
    tracer: Tracer,
    state: RunState,
    cycle_count: u64,
}

impl Machine {
    /// Boots a machine with `program` at address 0. Defaults: wall clock,
    /// one-unit timer period, stdout console, quiet tracer.
    pub fn new(program: &[u8]) -> Result<Self> {
        let mut memory = Memory::new();
        memory.load_image(program)?;
        Ok(Self {
            memory,
            regs: RegisterFile::new(),
            pc: 0,
            fl: 0,
            interrupts: InterruptController::new(Some(Timer::new(1))),
            clock: Box::new(WallClock::new()),
            console: Box::new(io::stdout()),
            tracer: Tracer::default(),
            state: RunState::Running,
            cycle_count: 0,
        })
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_console(mut self, console: Box<dyn Write>) -> Self {
        self.console = console;
        self
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Replaces the timer source; `None` removes it entirely.
    pub fn with_timer(mut self, timer: Option<Timer>) -> Self {
        self.interrupts.set_timer(timer);
        self
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn fl(&self) -> u8 {
        self.fl
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    pub fn interrupts(&self) -> &InterruptController {
        &self.interrupts
    }

    /// Runs until HLT. Faults propagate with machine state frozen as of
    /// the failing cycle.
    pub fn run(&mut self) -> Result<()> {
        while self.state == RunState::Running {
            self.step()?;
        }
        self.console.flush()?;
        Ok(())
    }

    /// Runs for at most `max_cycles` more cycles. Returns the run state so
    /// the caller can tell a halt from an exhausted budget.
    pub fn run_for(&mut self, max_cycles: u64) -> Result<RunState> {
        let deadline = self.cycle_count.saturating_add(max_cycles);
        while self.state == RunState::Running && self.cycle_count < deadline {
            self.step()?;
        }
        self.console.flush()?;
        Ok(self.state)
    }

    /// Executes one cycle: interrupt pre-check, fetch, decode, dispatch,
    /// then the default PC advance unless control was transferred.
    pub fn step(&mut self) -> Result<CycleOutcome> {
        // A PC past the end of memory faults before anything else runs;
        // entering an interrupt from it would save a truncated frame.
        if self.pc as usize >= MEMORY_SIZE {
            return Err(Ls8Error::OutOfBounds {
                address: self.pc as usize,
            });
        }
        self.service_interrupts()?;

        let pc = self.pc;
        let opcode = self.memory.read(pc)?;
        let entry =
            decode::lookup(opcode).ok_or(Ls8Error::UnsupportedOperation { opcode, pc })?;
        let count = entry.operand_count();
        let mut operands = [0u8; 2];
        for offset in 0..count {
            operands[offset as usize] = self.memory.read(pc + 1 + offset as u16)?;
        }
        self.tracer.cycle(
            self.cycle_count,
            pc,
            entry,
            &operands[..count as usize],
            &self.regs,
        );

        let outcome = self.execute(entry, operands)?;
        match outcome {
            CycleOutcome::Continue => {
                self.pc = pc + 1 + count as u16;
            }
            CycleOutcome::ControlTransfer => {}
            CycleOutcome::Halt => {
                self.state = RunState::Halted;
                self.tracer
                    .event(self.cycle_count, format_args!("halt at pc {pc:#04X}"));
            }
        }
        self.cycle_count += 1;
        Ok(outcome)
    }

    /// The per-cycle pre-check: tick the timer into IS, then take the
    /// lowest deliverable line, if any. At most one entry per cycle; the
    /// handler's first instruction executes in this same cycle.
    fn service_interrupts(&mut self) -> Result<()> {
        let now = self.clock.now();
        if self.interrupts.timer_fired(now) {
            let status = self.regs.int_status();
            self.regs.set_int_status(status | (1 << TIMER_LINE));
            self.tracer.event(
                self.cycle_count,
                format_args!("timer raised line {TIMER_LINE}"),
            );
        }
        if !self.interrupts.gate_enabled() {
            return Ok(());
        }
        let pending =
            InterruptController::lowest_pending(self.regs.int_mask(), self.regs.int_status());
        match pending {
            Some(line) => self.enter_interrupt(line),
            None => Ok(()),
        }
    }

    /// Ack plus frame save: gate closed, status bit cleared, then PC, FL,
    /// and R6 down to R0 pushed, and PC loaded from the line's vector cell.
    fn enter_interrupt(&mut self, line: u8) -> Result<()> {
        self.interrupts.close_gate();
        let status = self.regs.int_status();
        self.regs.set_int_status(status & !(1 << line));

        let pc = self.pc;
        stack::push(&mut self.memory, &mut self.regs, pc as u8, pc)?;
        stack::push(&mut self.memory, &mut self.regs, self.fl, pc)?;
        for index in (0..=6u8).rev() {
            let value = self.regs.get(index)?;
            stack::push(&mut self.memory, &mut self.regs, value, pc)?;
        }
        let vector = InterruptController::vector_address(line);
        self.pc = self.memory.read(vector)? as u16;
        self.tracer.event(
            self.cycle_count,
            format_args!("irq line {line} -> pc {:#04X}", self.pc),
        );
        Ok(())
    }

    /// Exact inverse of [`Self::enter_interrupt`]: R0 up to R6, FL, PC,
    /// then the gate reopens.
    fn return_from_interrupt(&mut self) -> Result<()> {
        let pc = self.pc;
        for index in 0..=6u8 {
            let value = stack::pop(&self.memory, &mut self.regs, pc)?;
            self.regs.set(index, value)?;
        }
        self.fl = stack::pop(&self.memory, &mut self.regs, pc)?;
        self.pc = stack::pop(&self.memory, &mut self.regs, pc)? as u16;
        self.interrupts.open_gate();
        self.tracer.event(
            self.cycle_count,
            format_args!("iret -> pc {:#04X}", self.pc),
        );
        Ok(())
    }

    fn execute(&mut self, entry: &OpcodeEntry, operands: [u8; 2]) -> Result<CycleOutcome> {
        let pc = self.pc;
        match entry.operation {
            Operation::Halt => Ok(CycleOutcome::Halt),
            Operation::Ldi => {
                self.regs.set(operands[0], operands[1])?;
                Ok(CycleOutcome::Continue)
            }
            Operation::Prn => {
                let value = self.regs.get(operands[0])?;
                writeln!(self.console, "{value}")?;
                self.console.flush()?;
                Ok(CycleOutcome::Continue)
            }
            Operation::Pra => {
                let value = self.regs.get(operands[0])?;
                // No trailing newline, so flush or the glyph sits in the
                // buffer until exit.
                write!(self.console, "{}", value as char)?;
                self.console.flush()?;
                Ok(CycleOutcome::Continue)
            }
            Operation::Push => {
                let value = self.regs.get(operands[0])?;
                stack::push(&mut self.memory, &mut self.regs, value, pc)?;
                Ok(CycleOutcome::Continue)
            }
            Operation::Pop => {
                let value = stack::pop(&self.memory, &mut self.regs, pc)?;
                self.regs.set(operands[0], value)?;
                Ok(CycleOutcome::Continue)
            }
            Operation::Call => {
                let target = self.regs.get(operands[0])?;
                // Return address is the byte after the operand.
                stack::push(&mut self.memory, &mut self.regs, (pc + 2) as u8, pc)?;
                self.pc = target as u16;
                Ok(CycleOutcome::ControlTransfer)
            }
            Operation::Ret => {
                let target = stack::pop(&self.memory, &mut self.regs, pc)?;
                self.pc = target as u16;
                Ok(CycleOutcome::ControlTransfer)
            }
            Operation::Iret => {
                self.return_from_interrupt()?;
                Ok(CycleOutcome::ControlTransfer)
            }
            Operation::Jmp => {
                let target = self.regs.get(operands[0])?;
                self.pc = target as u16;
                Ok(CycleOutcome::ControlTransfer)
            }
            Operation::St => {
                let address = self.regs.get(operands[0])?;
                let value = self.regs.get(operands[1])?;
                self.memory.write(address as u16, value)?;
                Ok(CycleOutcome::Continue)
            }
            Operation::Alu(op) => {
                op.apply(&mut self.regs, operands[0], operands[1])?;
                Ok(CycleOutcome::Continue)
            }
        }
    }

    /// Captures the full machine state.
    pub fn snapshot(&self) -> MachineSnapshot {
        let (timer_period, timer_next_fire) = match self.interrupts.timer() {
            Some(timer) => (Some(timer.period()), Some(timer.next_fire())),
            None => (None, None),
        };
        MachineSnapshot {
            magic: SNAPSHOT_MAGIC.to_string(),
            version: SNAPSHOT_VERSION,
            cycle_count: self.cycle_count,
            pc: self.pc,
            fl: self.fl,
            registers: self.regs.raw(),
            memory: self.memory.as_bytes().to_vec(),
            gate_enabled: self.interrupts.gate_enabled(),
            timer_period,
            timer_next_fire,
        }
    }

    /// Rebuilds a machine from a snapshot. Clock, console, and tracer come
    /// back as defaults; attach replacements with the `with_*` methods.
    pub fn from_snapshot(snapshot: &MachineSnapshot) -> Result<Self> {
        snapshot.validate()?;
        let mut machine = Machine::new(&snapshot.memory)?;
        machine.regs.restore(snapshot.registers);
        machine.pc = snapshot.pc;
        machine.fl = snapshot.fl;
        machine.cycle_count = snapshot.cycle_count;
        let timer = match (snapshot.timer_period, snapshot.timer_next_fire) {
            (Some(period), Some(next_fire)) => {
                let mut timer = Timer::new(period);
                timer.restore(next_fire);
                Some(timer)
            }
            _ => None,
        };
        machine.interrupts.set_timer(timer);
        if !snapshot.gate_enabled {
            machine.interrupts.close_gate();
        }
        Ok(machine)
    }
}

//! Shared fixtures for the integration tests.

use ls8::{Machine, ManualClock};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Console sink the test keeps a handle to after the machine takes its box.
#[derive(Clone, Default)]
pub struct CaptureBuf(Rc<RefCell<Vec<u8>>>);

impl CaptureBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("console output is utf-8")
    }
}

impl Write for CaptureBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Machine with a captured console and a hand-driven clock (period 1).
pub fn test_machine(program: &[u8]) -> (Machine, CaptureBuf, ManualClock) {
    let console = CaptureBuf::default();
    let clock = ManualClock::new();
    let machine = Machine::new(program)
        .expect("program fits in memory")
        .with_console(Box::new(console.clone()))
        .with_clock(Box::new(clock.clone()));
    (machine, console, clock)
}

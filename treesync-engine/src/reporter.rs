//! Change reporter — one line per mutating action.

use treesync_core::types::ChangeEvent;

/// Consumes change events as they happen. Events are never stored by the
/// engine; a reporter sees each one exactly once, in emission order.
pub trait Reporter {
    fn report(&mut self, event: &ChangeEvent);
}

/// Prints each event to stdout as a `[<code>] <path>` line.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: &ChangeEvent) {
        println!("{event}");
    }
}

/// Collects events instead of printing them. Used by tests.
impl Reporter for Vec<ChangeEvent> {
    fn report(&mut self, event: &ChangeEvent) {
        self.push(event.clone());
    }
}

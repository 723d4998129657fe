//! Check-time trace events.
//!
//! Debug visibility into a scan is an observer, not a logger: a
//! [`TraceHandler`] receives one event when a rule check begins and one
//! when it returns. [`Grammar::set_trace`](crate::Grammar::set_trace)
//! routes events of plain scans to stderr;
//! [`Grammar::scan_traced`](crate::Grammar::scan_traced) accepts any
//! handler.

/// One step of a scan, as seen by a [`TraceHandler`].
#[derive(Debug, Clone, Copy)]
pub enum TraceEvent<'a> {
    /// A rule check is about to run.
    Enter {
        rule: &'a str,
        pos: usize,
        depth: usize,
    },
    /// A rule check returned.
    Exit {
        rule: &'a str,
        begin: usize,
        end: usize,
        success: bool,
        depth: usize,
    },
}

/// Receiver for [`TraceEvent`]s.
pub trait TraceHandler {
    fn handle(&mut self, event: TraceEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTracer;

impl TraceHandler for NullTracer {
    fn handle(&mut self, _event: TraceEvent<'_>) {}
}

/// Writes indented enter/exit lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrTracer;

impl TraceHandler for StderrTracer {
    fn handle(&mut self, event: TraceEvent<'_>) {
        match event {
            TraceEvent::Enter { rule, pos, depth } => {
                eprintln!("{:indent$}> {rule} @{pos}", "", indent = depth * 2);
            }
            TraceEvent::Exit {
                rule,
                begin,
                end,
                success,
                depth,
            } => {
                let mark = if success { "=" } else { "!" };
                eprintln!(
                    "{:indent$}{mark} {rule} [{begin},{end})",
                    "",
                    indent = depth * 2
                );
            }
        }
    }
}

/// Collects events for inspection; used by tests.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    /// `(rule, entered)` pairs in arrival order.
    pub events: Vec<(String, bool)>,
}

impl TraceHandler for RecordingTracer {
    fn handle(&mut self, event: TraceEvent<'_>) {
        match event {
            TraceEvent::Enter { rule, .. } => self.events.push((rule.to_string(), true)),
            TraceEvent::Exit { rule, .. } => self.events.push((rule.to_string(), false)),
        }
    }
}

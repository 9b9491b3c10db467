use crate::core::{Process, StepAction, Ticks};

/// Renders one tick of the run. Implementations see the process table
/// read-only and must not influence scheduling.
pub trait Reporter {
    fn report(&mut self, now: Ticks, action: &StepAction, procs: &[Process]);
}

/// Fixed-width tag for each action. The match is exhaustive, so a new
/// variant cannot ship without a rendering.
pub fn action_tag(action: &StepAction) -> &'static str {
    match action {
        StepAction::AdmitNewProc { .. } => "[  admit]",
        StepAction::HandleInterrupt { .. } => "[ inrtpt]",
        StepAction::BeginRun { .. } => "[  begin]",
        StepAction::ContinueRun { .. } => "[contRun]",
        StepAction::IoRequest { .. } => "[  ioReq]",
        StepAction::Complete { .. } => "[ finish]",
        StepAction::NoAct => "[*noAct*]",
    }
}

/// One status line per tick on stdout: the tick, the action taken, and the
/// state of every process registered so far.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, now: Ticks, action: &StepAction, procs: &[Process]) {
        let mut line = format!("{now:>5}\t{}\t", action_tag(action));
        for proc in procs {
            line.push_str(&format!("{}:{}  ", proc.pid, proc.state));
        }
        println!("{}", line.trim_end());
    }
}

/// Records every (tick, action) pair in memory; lets tests and library
/// callers replay a run without touching stdout.
#[derive(Debug, Default)]
pub struct VecReporter {
    pub actions: Vec<(Ticks, StepAction)>,
}

impl VecReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for VecReporter {
    fn report(&mut self, now: Ticks, action: &StepAction, _procs: &[Process]) {
        self.actions.push((now, *action));
    }
}

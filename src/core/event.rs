use crate::core::ProcId;

/// The single state-changing action an engine tick settles on. However many
/// events are simultaneously eligible, exactly one variant is produced per
/// tick; the rest wait for later ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// A `new` process was moved to the ready queue.
    AdmitNewProc { proc: ProcId },
    /// The oldest IO-completion interrupt returned its process to ready.
    HandleInterrupt { proc: ProcId },
    /// The ready-queue front took ownership of the processor.
    BeginRun { proc: ProcId },
    /// The running process consumed one more tick of service.
    ContinueRun { proc: ProcId },
    /// The running process hit a scheduled IO event and blocked.
    IoRequest { proc: ProcId },
    /// The running process finished its required service.
    Complete { proc: ProcId },
    // Nothing runnable; pending arrivals or IO completions still outstanding
    NoAct,
}

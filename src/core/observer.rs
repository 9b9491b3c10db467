use super::io::IoModule;
use super::state::{MachineCtx, ProcState};

/// Sweeps the whole machine state once per tick and debug-asserts the
/// cross-structure invariants the queues cannot express on their own.
#[derive(Debug)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn observe(&mut self, ctx: &MachineCtx, io: &IoModule) {
        self.step += 1;

        if let Some(id) = ctx.running {
            let proc = ctx.proc(id);
            debug_assert_eq!(
                proc.state,
                ProcState::Running,
                "running slot holds proc {id} in state {:?}",
                proc.state
            );
            debug_assert!(
                !ctx.ready.contains(&id),
                "running proc {id} still on the ready queue"
            );
        }

        for (i, &id) in ctx.ready.iter().enumerate() {
            debug_assert_eq!(
                ctx.proc(id).state,
                ProcState::Ready,
                "queued proc {id} is not ready"
            );
            debug_assert!(
                !ctx.ready.iter().skip(i + 1).any(|&other| other == id),
                "proc {id} appears twice on the ready queue"
            );
        }

        for intr in &ctx.interrupts {
            debug_assert_eq!(
                ctx.proc(intr.proc).state,
                ProcState::Blocked,
                "interrupt pending for proc {} which is not blocked",
                intr.proc
            );
            debug_assert!(
                !io.has_request_for(intr.proc),
                "interrupt raised for proc {} whose IO is still in flight",
                intr.proc
            );
        }

        for owner in io.owners() {
            debug_assert_eq!(
                ctx.proc(owner).state,
                ProcState::Blocked,
                "IO in flight for proc {owner} which is not blocked"
            );
        }

        // Conservation: each process sits in exactly one state, and a
        // blocked one is waiting on exactly one signal.
        let mut counts = [0usize; 5];
        for proc in &ctx.procs {
            counts[proc.state as usize] += 1;

            debug_assert!(
                proc.consumed_service <= proc.required_service,
                "proc {} consumed more service than required",
                proc.id
            );

            if proc.state == ProcState::Blocked {
                let in_flight = io.has_request_for(proc.id);
                let interrupted = ctx.interrupts.iter().any(|i| i.proc == proc.id);
                debug_assert!(
                    in_flight != interrupted,
                    "blocked proc {} must have exactly one pending IO signal",
                    proc.id
                );
            }
        }
        debug_assert_eq!(counts.iter().sum::<usize>(), ctx.procs.len());
    }
}

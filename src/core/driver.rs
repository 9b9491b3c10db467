use log::{debug, trace};

use super::event::StepAction;
use super::io::IoModule;
use super::observer::Observer;
use super::state::{Interrupt, IoEvent, MachineCtx, ProcId, Process, Ticks};

/// The per-tick decision loop. Owns the process arena, the ready and
/// interrupt queues, and the IO subsystem; drives every state transition.
pub struct SchedCore {
    pub ctx: MachineCtx,
    pub io: IoModule,
    observer: Observer,
}

impl SchedCore {
    pub fn new() -> Self {
        Self {
            ctx: MachineCtx::new(),
            io: IoModule::new(),
            observer: Observer::new(),
        }
    }

    /// Register a newly arrived process in the arena. It competes for
    /// admission from the next decision on.
    pub fn activate(
        &mut self,
        pid: u32,
        arrival_time: Ticks,
        required_service: Ticks,
        io_events: Vec<IoEvent>,
    ) -> ProcId {
        debug!("t={}: proc {pid} arrived", self.ctx.now);
        self.ctx
            .create_proc(pid, arrival_time, required_service, io_events)
    }

    /// One simulated tick: surface IO completions as interrupts, then
    /// choose exactly one action. The caller has already released this
    /// tick's arrivals into the arena.
    pub fn tick(&mut self) -> StepAction {
        let now = self.ctx.now;

        for req in self.io.advance(now) {
            self.ctx.post_interrupt(Interrupt {
                proc: req.owner,
                raised_at: now,
            });
        }

        let action = match self.ctx.running {
            Some(id) => self.busy_step(now, id),
            None => self.idle_step(now),
        };

        self.observer.observe(&self.ctx, &self.io);
        action
    }

    // IO-due is checked before completion; the loader guarantees the two
    // can never coincide (trigger < required).
    fn busy_step(&mut self, now: Ticks, id: ProcId) -> StepAction {
        if self.ctx.proc(id).next_io_due() {
            let event = self
                .ctx
                .proc_mut(id)
                .io_events
                .pop_front()
                .expect("IO event checked above");
            self.ctx.mark_blocked(id);
            self.io.submit(now, event, id);
            trace!("t={now}: proc {id} blocked on IO");
            return StepAction::IoRequest { proc: id };
        }

        let proc = self.ctx.proc(id);
        if proc.consumed_service == proc.required_service {
            self.ctx.mark_done(id, now);
            trace!("t={now}: proc {id} finished");
            return StepAction::Complete { proc: id };
        }

        self.ctx.add_service(id);
        StepAction::ContinueRun { proc: id }
    }

    // Admission beats interrupt return beats dispatch.
    fn idle_step(&mut self, now: Ticks) -> StepAction {
        if let Some(id) = self.ctx.first_new() {
            self.ctx.mark_ready(id);
            self.ctx.ready_push(id);
            trace!("t={now}: proc {id} admitted");
            return StepAction::AdmitNewProc { proc: id };
        }

        if let Some(intr) = self.ctx.take_interrupt() {
            self.ctx.mark_ready(intr.proc);
            self.ctx.ready_push(intr.proc);
            trace!("t={now}: proc {} returned from IO", intr.proc);
            return StepAction::HandleInterrupt { proc: intr.proc };
        }

        if let Some(id) = self.ctx.ready_pop() {
            self.ctx.set_running(id, now);
            self.ctx.add_service(id);
            trace!("t={now}: proc {id} dispatched");
            return StepAction::BeginRun { proc: id };
        }

        StepAction::NoAct
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn procs(&self) -> &[Process] {
        &self.ctx.procs
    }

    pub fn all_done(&self) -> bool {
        self.ctx.all_done()
    }
}

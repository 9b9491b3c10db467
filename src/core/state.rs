use std::collections::VecDeque;
use std::fmt;

// Index into the process arena
pub type ProcId = usize;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    New,
    Ready,
    Running,
    Blocked,
    Done,
}

impl fmt::Display for ProcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Blocked => "blocked",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// A scheduled pause: once the owning process has consumed
/// `trigger_service` ticks of CPU, it must block for `duration` ticks of IO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoEvent {
    pub trigger_service: Ticks,
    pub duration: Ticks,
}

#[derive(Debug)]
pub struct Process {
    pub id: ProcId,
    pub pid: u32,
    pub arrival_time: Ticks,
    pub required_service: Ticks,
    pub consumed_service: Ticks,
    // Front is popped when the request is submitted, never re-added
    pub io_events: VecDeque<IoEvent>,
    pub state: ProcState,
    pub first_run_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

impl Process {
    pub fn next_io_due(&self) -> bool {
        self.io_events
            .front()
            .is_some_and(|ev| ev.trigger_service == self.consumed_service)
    }
}

/// Notification that a process's IO has finished and it should return to
/// the ready queue. Consumed exactly once by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupt {
    pub proc: ProcId,
    pub raised_at: Ticks,
}

/// The canonical process arena plus the shared queue state. Queues hold
/// `ProcId`s, never copies, and every state mutation goes through an
/// accessor here so a queued id can never diverge from its record.
#[derive(Debug)]
pub struct MachineCtx {
    pub now: Ticks,
    pub procs: Vec<Process>,
    pub ready: VecDeque<ProcId>,
    pub interrupts: VecDeque<Interrupt>,
    pub running: Option<ProcId>,
}

impl MachineCtx {
    pub fn new() -> Self {
        Self {
            now: 0,
            procs: Vec::new(),
            ready: VecDeque::new(),
            interrupts: VecDeque::new(),
            running: None,
        }
    }

    pub fn advance_time(&mut self) -> Ticks {
        self.now = self.now.saturating_add(1);
        self.now
    }

    pub fn create_proc(
        &mut self,
        pid: u32,
        arrival_time: Ticks,
        required_service: Ticks,
        io_events: Vec<IoEvent>,
    ) -> ProcId {
        let id = self.procs.len();

        let proc = Process {
            id,
            pid,
            arrival_time,
            required_service,
            consumed_service: 0,
            io_events: VecDeque::from(io_events),
            state: ProcState::New,
            first_run_time: None,
            completion_time: None,
        };

        debug_assert_eq!(self.procs.len(), id, "ProcId must match Vec index");
        self.procs.push(proc);

        id
    }

    pub fn proc(&self, id: ProcId) -> &Process {
        &self.procs[id]
    }

    pub fn proc_mut(&mut self, id: ProcId) -> &mut Process {
        &mut self.procs[id]
    }

    pub fn processor_idle(&self) -> bool {
        self.running.is_none()
    }

    /// Earliest-registered process still in `New`. Arena order is
    /// activation order, which is the admission tie-break.
    pub fn first_new(&self) -> Option<ProcId> {
        self.procs
            .iter()
            .find(|p| p.state == ProcState::New)
            .map(|p| p.id)
    }

    pub fn mark_ready(&mut self, id: ProcId) {
        let proc = self.proc_mut(id);
        debug_assert!(
            matches!(proc.state, ProcState::New | ProcState::Blocked),
            "proc {id} cannot become ready from {:?}",
            proc.state
        );
        proc.state = ProcState::Ready;
    }

    pub fn ready_push(&mut self, id: ProcId) {
        debug_assert_eq!(
            self.proc(id).state,
            ProcState::Ready,
            "proc {id} queued while not ready"
        );
        debug_assert!(
            !self.ready.contains(&id),
            "proc {id} already on the ready queue"
        );
        self.ready.push_back(id);
    }

    pub fn ready_pop(&mut self) -> Option<ProcId> {
        self.ready.pop_front()
    }

    pub fn set_running(&mut self, id: ProcId, now: Ticks) {
        assert!(
            self.running.is_none(),
            "dispatching proc {id} while the processor is busy"
        );
        debug_assert_eq!(self.proc(id).state, ProcState::Ready);
        debug_assert!(!self.ready.contains(&id), "running proc {id} still queued");

        self.running = Some(id);
        let proc = self.proc_mut(id);
        proc.state = ProcState::Running;
        if proc.first_run_time.is_none() {
            proc.first_run_time = Some(now);
        }
    }

    pub fn add_service(&mut self, id: ProcId) {
        let proc = self.proc_mut(id);
        debug_assert_eq!(proc.state, ProcState::Running);
        debug_assert!(
            proc.consumed_service < proc.required_service,
            "proc {id} serviced past its requirement"
        );
        proc.consumed_service += 1;
    }

    pub fn mark_blocked(&mut self, id: ProcId) {
        assert_eq!(
            self.running,
            Some(id),
            "blocking proc {id} that is not running"
        );
        self.running = None;
        self.proc_mut(id).state = ProcState::Blocked;
    }

    pub fn mark_done(&mut self, id: ProcId, now: Ticks) {
        assert_eq!(
            self.running,
            Some(id),
            "completing proc {id} that is not running"
        );
        self.running = None;

        let proc = self.proc_mut(id);
        debug_assert_eq!(
            proc.consumed_service, proc.required_service,
            "proc {id} completed short of its requirement"
        );
        debug_assert!(
            proc.io_events.is_empty(),
            "proc {id} completed with IO events outstanding"
        );
        proc.state = ProcState::Done;
        proc.completion_time = Some(now);
    }

    pub fn post_interrupt(&mut self, intr: Interrupt) {
        debug_assert_eq!(
            self.proc(intr.proc).state,
            ProcState::Blocked,
            "interrupt raised for proc {} which is not blocked",
            intr.proc
        );
        debug_assert!(
            !self.interrupts.iter().any(|i| i.proc == intr.proc),
            "proc {} already has a pending interrupt",
            intr.proc
        );
        self.interrupts.push_back(intr);
    }

    pub fn take_interrupt(&mut self) -> Option<Interrupt> {
        self.interrupts.pop_front()
    }

    pub fn all_done(&self) -> bool {
        self.procs.iter().all(|p| p.state == ProcState::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_one() -> (MachineCtx, ProcId) {
        let mut ctx = MachineCtx::new();
        let id = ctx.create_proc(7, 1, 3, vec![]);
        (ctx, id)
    }

    #[test]
    fn proc_id_matches_arena_index() {
        let mut ctx = MachineCtx::new();
        let a = ctx.create_proc(10, 1, 2, vec![]);
        let b = ctx.create_proc(11, 2, 4, vec![]);
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(ctx.proc(b).pid, 11);
    }

    #[test]
    fn admission_then_dispatch() {
        let (mut ctx, id) = ctx_with_one();
        assert_eq!(ctx.first_new(), Some(id));

        ctx.mark_ready(id);
        ctx.ready_push(id);
        assert_eq!(ctx.first_new(), None);

        let popped = ctx.ready_pop().unwrap();
        ctx.set_running(popped, 2);
        assert_eq!(ctx.running, Some(id));
        assert_eq!(ctx.proc(id).state, ProcState::Running);
        assert_eq!(ctx.proc(id).first_run_time, Some(2));
    }

    #[test]
    fn service_accumulates_to_completion() {
        let (mut ctx, id) = ctx_with_one();
        ctx.mark_ready(id);
        ctx.ready_push(id);
        ctx.ready_pop();
        ctx.set_running(id, 2);

        for _ in 0..3 {
            ctx.add_service(id);
        }
        ctx.mark_done(id, 5);

        assert!(ctx.processor_idle());
        assert_eq!(ctx.proc(id).state, ProcState::Done);
        assert_eq!(ctx.proc(id).completion_time, Some(5));
        assert!(ctx.all_done());
    }

    #[test]
    fn next_io_due_checks_queue_front() {
        let mut ctx = MachineCtx::new();
        let id = ctx.create_proc(
            1,
            1,
            5,
            vec![IoEvent {
                trigger_service: 2,
                duration: 3,
            }],
        );
        assert!(!ctx.proc(id).next_io_due());

        ctx.proc_mut(id).consumed_service = 2;
        assert!(ctx.proc(id).next_io_due());

        ctx.proc_mut(id).io_events.pop_front();
        assert!(!ctx.proc(id).next_io_due());
    }

    #[test]
    fn first_new_scans_in_registration_order() {
        let mut ctx = MachineCtx::new();
        let a = ctx.create_proc(5, 1, 1, vec![]);
        let b = ctx.create_proc(3, 1, 1, vec![]);
        assert_eq!(ctx.first_new(), Some(a));

        ctx.mark_ready(a);
        ctx.ready_push(a);
        assert_eq!(ctx.first_new(), Some(b));
    }

    #[test]
    fn all_done_is_vacuously_true_for_empty_arena() {
        assert!(MachineCtx::new().all_done());
    }

    #[test]
    #[should_panic(expected = "not running")]
    fn blocking_an_idle_processor_is_fatal() {
        let (mut ctx, id) = ctx_with_one();
        ctx.mark_blocked(id);
    }

    #[test]
    #[should_panic(expected = "processor is busy")]
    fn double_dispatch_is_fatal() {
        let mut ctx = MachineCtx::new();
        let a = ctx.create_proc(1, 1, 2, vec![]);
        let b = ctx.create_proc(2, 1, 2, vec![]);
        for id in [a, b] {
            ctx.mark_ready(id);
            ctx.ready_push(id);
        }
        ctx.ready_pop();
        ctx.set_running(a, 1);
        ctx.ready_pop();
        ctx.set_running(b, 1);
    }
}

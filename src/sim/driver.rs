use super::workload::{ProcessSpec, Workload};
use crate::core::{Process, SchedCore, StepAction, Ticks};
use crate::report::Reporter;

/// Releases process definitions into the system as simulated time reaches
/// their arrival tick.
pub struct ArrivalFeed {
    specs: Vec<ProcessSpec>,
    cursor: usize,
}

impl ArrivalFeed {
    pub fn new(workload: Workload) -> Self {
        let mut specs = workload.into_specs();
        // Stable sort: same-tick arrivals keep their registration order,
        // which is the admission tie-break downstream
        specs.sort_by_key(|spec| spec.arrival_time);
        Self { specs, cursor: 0 }
    }

    pub fn more_coming(&self) -> bool {
        self.cursor < self.specs.len()
    }

    /// Everything arriving at `now`; contiguous because the list is sorted.
    pub fn release(&mut self, now: Ticks) -> &[ProcessSpec] {
        if let Some(next) = self.specs.get(self.cursor) {
            debug_assert!(
                next.arrival_time >= now,
                "arrival of proc {} at t={} was missed (now t={now})",
                next.pid,
                next.arrival_time
            );
        }

        let start = self.cursor;
        while self
            .specs
            .get(self.cursor)
            .is_some_and(|spec| spec.arrival_time == now)
        {
            self.cursor += 1;
        }
        &self.specs[start..self.cursor]
    }
}

/// Outer driver: advances simulated time one tick at a time, feeds arrivals
/// to the engine, and hands each tick's outcome to the reporter.
pub struct Sim<R: Reporter> {
    pub core: SchedCore,
    feed: ArrivalFeed,
    reporter: R,
}

impl<R: Reporter> Sim<R> {
    pub fn new(workload: Workload, reporter: R) -> Self {
        Self {
            core: SchedCore::new(),
            feed: ArrivalFeed::new(workload),
            reporter,
        }
    }

    /// One simulated tick: release arrivals, run the decision step, report.
    pub fn step(&mut self) -> StepAction {
        let now = self.core.ctx.advance_time();

        for spec in self.feed.release(now) {
            self.core.activate(
                spec.pid,
                spec.arrival_time,
                spec.required_service,
                spec.io_events.clone(),
            );
        }

        let action = self.core.tick();
        self.reporter.report(now, &action, self.core.procs());
        action
    }

    /// The run is complete once no arrivals are pending and every tracked
    /// process is done.
    pub fn finished(&self) -> bool {
        !self.feed.more_coming() && self.core.all_done()
    }

    /// Drive to completion without pacing; returns the final tick.
    pub fn run(&mut self) -> Ticks {
        while !self.finished() {
            self.step();
        }
        self.core.now()
    }

    pub fn procs(&self) -> &[Process] {
        self.core.procs()
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}

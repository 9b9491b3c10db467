pub mod core;
pub mod report;
pub mod sim;

pub use crate::core::{ProcId, ProcState, Process, SchedCore, StepAction, Ticks};
pub use report::{ConsoleReporter, Reporter, VecReporter};
pub use sim::{ArrivalFeed, ProcessSpec, Sim, Workload, WorkloadError};

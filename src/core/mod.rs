pub mod driver;
pub mod event;
pub mod io;
pub mod observer;
pub mod state;

pub use driver::SchedCore;
pub use event::StepAction;
pub use io::{IoModule, IoReqId, IoRequest};
pub use observer::Observer;
pub use state::{Interrupt, IoEvent, MachineCtx, ProcId, ProcState, Process, Ticks};

pub mod driver;
pub mod workload;

pub use driver::{ArrivalFeed, Sim};
pub use workload::{ProcessSpec, Workload, WorkloadError};

use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::info;
use rand::prelude::*;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::core::{IoEvent, Ticks};

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("failed to read process definitions: {0}")]
    Read(#[from] std::io::Error),
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("duplicate process id {pid}")]
    DuplicatePid { pid: u32 },
    #[error("process {pid}: arrival time must be at least 1")]
    ArrivalTooEarly { pid: u32 },
    #[error("process {pid}: required processor time must be at least 1")]
    NoService { pid: u32 },
    #[error("process {pid}: IO duration must be at least 1")]
    BadIoDuration { pid: u32 },
    #[error("process {pid}: IO trigger times must be strictly increasing")]
    UnorderedIoTriggers { pid: u32 },
    #[error("process {pid}: IO trigger {trigger} outside 1..{required}")]
    TriggerOutOfRange {
        pid: u32,
        trigger: Ticks,
        required: Ticks,
    },
}

/// One process definition as it appears in the input.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub pid: u32,
    pub arrival_time: Ticks,
    pub required_service: Ticks,
    pub io_events: Vec<IoEvent>,
}

/// A validated set of process definitions. Construction is the only place
/// configuration errors can surface; the engine never sees a malformed spec.
#[derive(Debug, Clone)]
pub struct Workload {
    specs: Vec<ProcessSpec>,
}

impl Workload {
    pub fn new(specs: Vec<ProcessSpec>) -> Result<Self, WorkloadError> {
        validate(&specs)?;
        Ok(Self { specs })
    }

    pub fn from_path(path: &Path) -> Result<Self, WorkloadError> {
        let workload: Self = fs::read_to_string(path)?.parse()?;
        info!(
            "loaded {} process definitions from {}",
            workload.specs.len(),
            path.display()
        );
        Ok(workload)
    }

    /// Randomized workload: Bernoulli arrivals across `ticks`, uniform
    /// service demands, up to two IO events per process. Always well formed.
    pub fn synthetic(ticks: Ticks, p_arrival: f64, p_io: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut specs = Vec::new();

        for t in 1..=ticks {
            if rng.random::<f64>() >= p_arrival {
                continue;
            }

            let required_service = rng.random_range(2..=8);
            let mut io_events = Vec::new();
            let mut trigger = 0;
            for _ in 0..2 {
                if trigger + 1 < required_service && rng.random::<f64>() < p_io {
                    trigger = rng.random_range(trigger + 1..required_service);
                    io_events.push(IoEvent {
                        trigger_service: trigger,
                        duration: rng.random_range(1..=4),
                    });
                }
            }

            specs.push(ProcessSpec {
                pid: specs.len() as u32 + 1,
                arrival_time: t,
                required_service,
                io_events,
            });
        }

        Self::new(specs).expect("generated workload is well formed")
    }

    pub fn specs(&self) -> &[ProcessSpec] {
        &self.specs
    }

    pub fn into_specs(self) -> Vec<ProcessSpec> {
        self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Line format: `<pid> <arrival> <required> [<trigger>:<duration> ...]`,
/// `#` starts a comment, blank lines are skipped.
impl FromStr for Workload {
    type Err = WorkloadError;

    fn from_str(s: &str) -> Result<Self, WorkloadError> {
        let mut specs = Vec::new();
        for (idx, raw) in s.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            specs.push(parse_line(idx + 1, line)?);
        }
        Self::new(specs)
    }
}

fn parse_line(line: usize, text: &str) -> Result<ProcessSpec, WorkloadError> {
    let mut fields = text.split_whitespace();

    let pid = next_field(line, &mut fields, "process id")?;
    let arrival_time = next_field(line, &mut fields, "arrival time")?;
    let required_service = next_field(line, &mut fields, "required processor time")?;

    let mut io_events = Vec::new();
    for pair in fields {
        let (trigger, duration) = pair.split_once(':').ok_or_else(|| WorkloadError::Parse {
            line,
            reason: format!("IO event `{pair}` is not trigger:duration"),
        })?;
        io_events.push(IoEvent {
            trigger_service: parse_num(line, trigger, "IO trigger")?,
            duration: parse_num(line, duration, "IO duration")?,
        });
    }

    Ok(ProcessSpec {
        pid,
        arrival_time,
        required_service,
        io_events,
    })
}

fn next_field<T: FromStr>(
    line: usize,
    fields: &mut std::str::SplitWhitespace<'_>,
    what: &str,
) -> Result<T, WorkloadError> {
    let text = fields.next().ok_or_else(|| WorkloadError::Parse {
        line,
        reason: format!("missing {what}"),
    })?;
    parse_num(line, text, what)
}

fn parse_num<T: FromStr>(line: usize, text: &str, what: &str) -> Result<T, WorkloadError> {
    text.parse().map_err(|_| WorkloadError::Parse {
        line,
        reason: format!("{what} `{text}` is not a number"),
    })
}

fn validate(specs: &[ProcessSpec]) -> Result<(), WorkloadError> {
    let mut seen = FxHashSet::default();

    for spec in specs {
        let pid = spec.pid;
        if !seen.insert(pid) {
            return Err(WorkloadError::DuplicatePid { pid });
        }
        if spec.arrival_time < 1 {
            return Err(WorkloadError::ArrivalTooEarly { pid });
        }
        if spec.required_service < 1 {
            return Err(WorkloadError::NoService { pid });
        }

        // Triggers start at 1, so 0 sits below any legal trigger
        let mut last = 0;
        for ev in &spec.io_events {
            if ev.duration < 1 {
                return Err(WorkloadError::BadIoDuration { pid });
            }
            if ev.trigger_service < 1 || ev.trigger_service >= spec.required_service {
                return Err(WorkloadError::TriggerOutOfRange {
                    pid,
                    trigger: ev.trigger_service,
                    required: spec.required_service,
                });
            }
            if ev.trigger_service <= last {
                return Err(WorkloadError::UnorderedIoTriggers { pid });
            }
            last = ev.trigger_service;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_definitions_with_io_events() {
        let workload: Workload = "# pid arrival required io\n\
                                  1 1 3\n\
                                  \n\
                                  2 1 5 2:3   # one IO pause\n\
                                  3 4 6 2:2 4:1\n"
            .parse()
            .unwrap();

        assert_eq!(workload.len(), 3);
        let spec = &workload.specs()[1];
        assert_eq!(spec.pid, 2);
        assert_eq!(spec.arrival_time, 1);
        assert_eq!(spec.required_service, 5);
        assert_eq!(
            spec.io_events,
            vec![IoEvent {
                trigger_service: 2,
                duration: 3
            }]
        );
        assert_eq!(workload.specs()[2].io_events.len(), 2);
    }

    #[test]
    fn rejects_missing_and_malformed_fields() {
        assert!(matches!(
            "1 1".parse::<Workload>(),
            Err(WorkloadError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            "1 one 3".parse::<Workload>(),
            Err(WorkloadError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            "1 1 3\n2 2 4 3-1".parse::<Workload>(),
            Err(WorkloadError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_pids() {
        assert!(matches!(
            "1 1 3\n1 2 4".parse::<Workload>(),
            Err(WorkloadError::DuplicatePid { pid: 1 })
        ));
    }

    #[test]
    fn rejects_degenerate_times() {
        assert!(matches!(
            "1 0 3".parse::<Workload>(),
            Err(WorkloadError::ArrivalTooEarly { pid: 1 })
        ));
        assert!(matches!(
            "1 1 0".parse::<Workload>(),
            Err(WorkloadError::NoService { pid: 1 })
        ));
        assert!(matches!(
            "1 1 3 2:0".parse::<Workload>(),
            Err(WorkloadError::BadIoDuration { pid: 1 })
        ));
    }

    #[test]
    fn rejects_triggers_outside_the_service_range() {
        assert!(matches!(
            "1 1 3 3:2".parse::<Workload>(),
            Err(WorkloadError::TriggerOutOfRange {
                pid: 1,
                trigger: 3,
                required: 3
            })
        ));
        assert!(matches!(
            "1 1 3 0:2".parse::<Workload>(),
            Err(WorkloadError::TriggerOutOfRange { pid: 1, .. })
        ));
    }

    #[test]
    fn rejects_unordered_triggers() {
        assert!(matches!(
            "1 1 9 4:1 4:2".parse::<Workload>(),
            Err(WorkloadError::UnorderedIoTriggers { pid: 1 })
        ));
        assert!(matches!(
            "1 1 9 4:1 2:2".parse::<Workload>(),
            Err(WorkloadError::UnorderedIoTriggers { pid: 1 })
        ));
    }

    #[test]
    fn synthetic_workloads_are_well_formed() {
        // Workload::new inside synthetic re-validates; a bad generator panics
        for seed in 0..4 {
            Workload::synthetic(50, 0.4, 0.6, seed);
        }
        let dense = Workload::synthetic(10, 1.0, 1.0, 0);
        assert_eq!(dense.len(), 10);
        assert!(dense.specs().iter().any(|s| !s.io_events.is_empty()));
    }
}

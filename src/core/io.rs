use keyed_priority_queue::KeyedPriorityQueue;
use log::debug;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use super::state::{IoEvent, ProcId, Ticks};

new_key_type! {
    pub struct IoReqId;
}

/// An in-flight IO operation. Destroyed the moment its completion is
/// converted into an interrupt.
#[derive(Debug, Clone, Copy)]
pub struct IoRequest {
    pub owner: ProcId,
    pub submitted_at: Ticks,
    pub completes_at: Ticks,
}

// KeyedPriorityQueue is a max-heap, so Deadline's Ord is flipped to pop the
// earliest completion first; seq breaks ties in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Deadline {
    completes_at: Ticks,
    seq: u64,
}

impl PartialOrd for Deadline {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Deadline {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (other.completes_at, other.seq).cmp(&(self.completes_at, self.seq))
    }
}

/// Tracks in-flight IO and surfaces completions at the right simulated time.
/// Knows nothing about scheduling; owners are identified by `ProcId` only.
#[derive(Debug)]
pub struct IoModule {
    requests: SlotMap<IoReqId, IoRequest>,
    pending: KeyedPriorityQueue<IoReqId, Deadline>,
    by_owner: FxHashMap<ProcId, IoReqId>,
    next_seq: u64,
}

impl IoModule {
    pub fn new() -> Self {
        Self {
            requests: SlotMap::with_key(),
            pending: KeyedPriorityQueue::new(),
            by_owner: FxHashMap::default(),
            next_seq: 0,
        }
    }

    /// Record a new in-flight request. Bookkeeping only; the caller has
    /// already moved the owner to `blocked`.
    pub fn submit(&mut self, now: Ticks, event: IoEvent, owner: ProcId) -> IoReqId {
        debug_assert!(event.duration >= 1, "IO durations are validated at load");
        assert!(
            !self.by_owner.contains_key(&owner),
            "proc {owner} already has an IO request in flight"
        );

        let completes_at = now + event.duration;
        let id = self.requests.insert(IoRequest {
            owner,
            submitted_at: now,
            completes_at,
        });
        self.pending.push(
            id,
            Deadline {
                completes_at,
                seq: self.next_seq,
            },
        );
        self.next_seq += 1;
        self.by_owner.insert(owner, id);

        debug!("io: proc {owner} submitted at t={now}, completes t={completes_at}");
        id
    }

    /// Pop every request maturing at `now`, in submission order for ties.
    /// Popping is destructive, so a completion can never be signaled twice.
    pub fn advance(&mut self, now: Ticks) -> Vec<IoRequest> {
        let mut matured = Vec::new();

        while let Some((_, &deadline)) = self.pending.peek() {
            debug_assert!(
                deadline.completes_at >= now,
                "IO completion at t={} was missed (now t={now})",
                deadline.completes_at
            );
            if deadline.completes_at != now {
                break;
            }

            let (id, _) = self.pending.pop().expect("peeked entry must pop");
            let req = self
                .requests
                .remove(id)
                .expect("pending IO missing from the request table");
            self.by_owner.remove(&req.owner);
            debug!("io: proc {} completed at t={now}", req.owner);
            matured.push(req);
        }

        matured
    }

    pub fn in_flight(&self) -> usize {
        self.requests.len()
    }

    pub fn has_request_for(&self, owner: ProcId) -> bool {
        self.by_owner.contains_key(&owner)
    }

    pub fn owners(&self) -> impl Iterator<Item = ProcId> + '_ {
        self.by_owner.keys().copied()
    }
}

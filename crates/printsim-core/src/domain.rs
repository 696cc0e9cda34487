//! Domain records: the `Job` flowing through the system. Per-printer
//! lifetime counters (papers used, jobs served) live on `Statistics`
//! instead of a separate `Printer` type, since nothing else about a
//! printer's identity needs tracking beyond its index.

/// A unit of print work. Timestamps are stamped in order as the job moves
/// through the system; once set, a timestamp is never rewound.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: u64,
    pub inter_arrival_time_us: u64,
    pub papers_required: u64,
    pub service_time_requested_ms: Option<u64>,

    pub system_arrival_us: Option<u64>,
    pub queue_arrival_us: Option<u64>,
    pub queue_departure_us: Option<u64>,
    pub service_arrival_us: Option<u64>,
    pub service_departure_us: Option<u64>,
}

impl Job {
    pub fn new(id: u64, inter_arrival_time_us: u64, papers_required: u64) -> Self {
        Self {
            id,
            inter_arrival_time_us,
            papers_required,
            service_time_requested_ms: None,
            system_arrival_us: None,
            queue_arrival_us: None,
            queue_departure_us: None,
            service_arrival_us: None,
            service_departure_us: None,
        }
    }

    pub fn queue_wait_us(&self) -> Option<u64> {
        Some(self.queue_departure_us?.saturating_sub(self.queue_arrival_us?))
    }

    pub fn system_time_us(&self) -> Option<u64> {
        Some(self.service_departure_us?.saturating_sub(self.system_arrival_us?))
    }
}

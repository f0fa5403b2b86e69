// Path: crates/telemetry/src/sinks.rs
//! Metrics traits the registries report through.
//!
//! Registry code only sees these traits. A backend is chosen once, at start-up,
//! by setting [`SINK`]; until then every accessor hands out [`NopSink`].
//!
//! Governance counters describe committed state. While a [`DeferredMetrics`]
//! scope is open on the current thread they are buffered, and they reach the
//! backend only when the scope is committed.

use once_cell::sync::OnceCell;
use std::cell::RefCell;
use std::fmt::Debug;

/// Counters for the proposal lifecycle and for recorded domain events.
///
/// `kind` is the governed record kind (`field`, `zone`, `entity`).
pub trait GovernanceMetricsSink: Send + Sync + Debug {
    fn inc_entities_registered(&self, kind: &str);
    fn inc_proposals_created(&self, kind: &str);
    /// Labeled by side, `for` or `against`.
    fn inc_votes_cast(&self, kind: &str, support: bool);
    /// `outcome` is `approved` or `rejected`.
    fn inc_proposals_finalized(&self, kind: &str, outcome: &'static str);
    /// `event_kind` is the event log name (`fluctuation`, `observation`, `transition`, `policy`).
    fn inc_domain_events(&self, event_kind: &str);
}

/// Failed operations, counted by the stable `ErrorCode` of the error.
pub trait ErrorMetricsSink: Send + Sync + Debug {
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}

/// Latency and failures of method-string calls made through `RegistryHost::call`.
pub trait ServiceMetricsSink: Send + Sync + Debug {
    fn observe_service_dispatch_latency(&self, service_id: &str, method: &str, duration_secs: f64);
    fn inc_dispatch_error(&self, service_id: &str, method: &str, reason: &'static str);
}

/// Everything a metrics backend has to implement.
pub trait MetricsSink: GovernanceMetricsSink + ErrorMetricsSink + ServiceMetricsSink {}

impl<T> MetricsSink for T where T: GovernanceMetricsSink + ErrorMetricsSink + ServiceMetricsSink {}

/// Discards every observation.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

impl GovernanceMetricsSink for NopSink {
    fn inc_entities_registered(&self, _kind: &str) {}
    fn inc_proposals_created(&self, _kind: &str) {}
    fn inc_votes_cast(&self, _kind: &str, _support: bool) {}
    fn inc_proposals_finalized(&self, _kind: &str, _outcome: &'static str) {}
    fn inc_domain_events(&self, _event_kind: &str) {}
}

impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

impl ServiceMetricsSink for NopSink {
    fn observe_service_dispatch_latency(&self, _: &str, _: &str, _: f64) {}
    fn inc_dispatch_error(&self, _: &str, _: &str, _: &'static str) {}
}

/// The process-wide backend. Set at most once.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP: NopSink = NopSink;

fn installed() -> &'static dyn MetricsSink {
    SINK.get().copied().unwrap_or(&NOP)
}

pub fn governance_metrics() -> &'static dyn GovernanceMetricsSink {
    static DEFERRING: Deferring = Deferring;
    &DEFERRING
}

pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    installed()
}

pub fn service_metrics() -> &'static dyn ServiceMetricsSink {
    installed()
}

/// One buffered governance counter increment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GovernanceEvent {
    EntityRegistered(String),
    ProposalCreated(String),
    VoteCast(String, bool),
    ProposalFinalized(String, &'static str),
    DomainEvent(String),
}

impl GovernanceEvent {
    fn emit(self, sink: &dyn GovernanceMetricsSink) {
        match self {
            Self::EntityRegistered(kind) => sink.inc_entities_registered(&kind),
            Self::ProposalCreated(kind) => sink.inc_proposals_created(&kind),
            Self::VoteCast(kind, support) => sink.inc_votes_cast(&kind, support),
            Self::ProposalFinalized(kind, outcome) => sink.inc_proposals_finalized(&kind, outcome),
            Self::DomainEvent(event_kind) => sink.inc_domain_events(&event_kind),
        }
    }
}

thread_local! {
    static PENDING: RefCell<Option<Vec<GovernanceEvent>>> = const { RefCell::new(None) };
}

/// Buffers into the open scope, or reports straight to the backend.
#[derive(Debug)]
struct Deferring;

impl Deferring {
    fn record(&self, event: GovernanceEvent) {
        let event = PENDING.with(|pending| match pending.borrow_mut().as_mut() {
            Some(buffer) => {
                buffer.push(event);
                None
            }
            None => Some(event),
        });
        if let Some(event) = event {
            event.emit(installed());
        }
    }
}

impl GovernanceMetricsSink for Deferring {
    fn inc_entities_registered(&self, kind: &str) {
        self.record(GovernanceEvent::EntityRegistered(kind.to_string()));
    }
    fn inc_proposals_created(&self, kind: &str) {
        self.record(GovernanceEvent::ProposalCreated(kind.to_string()));
    }
    fn inc_votes_cast(&self, kind: &str, support: bool) {
        self.record(GovernanceEvent::VoteCast(kind.to_string(), support));
    }
    fn inc_proposals_finalized(&self, kind: &str, outcome: &'static str) {
        self.record(GovernanceEvent::ProposalFinalized(kind.to_string(), outcome));
    }
    fn inc_domain_events(&self, event_kind: &str) {
        self.record(GovernanceEvent::DomainEvent(event_kind.to_string()));
    }
}

/// Holds back the governance counters reported on this thread until
/// [`commit`](Self::commit). Dropping the scope discards them.
///
/// Scopes nest: committing an inner scope hands its counters to the outer one.
#[must_use = "counters are discarded unless the scope is committed"]
#[derive(Debug)]
pub struct DeferredMetrics {
    outer: Option<Vec<GovernanceEvent>>,
    closed: bool,
}

impl DeferredMetrics {
    pub fn begin() -> Self {
        let outer = PENDING.with(|pending| pending.replace(Some(Vec::new())));
        Self {
            outer,
            closed: false,
        }
    }

    /// The number of counters buffered by this scope so far.
    pub fn pending(&self) -> usize {
        PENDING.with(|pending| pending.borrow().as_ref().map_or(0, Vec::len))
    }

    /// Reports the buffered counters to the installed backend.
    pub fn commit(self) {
        self.commit_into(installed());
    }

    /// Reports the buffered counters to `sink`, or to the enclosing scope if
    /// there is one.
    pub fn commit_into(mut self, sink: &dyn GovernanceMetricsSink) {
        let events = self.close();
        let unclaimed = PENDING.with(|pending| match pending.borrow_mut().as_mut() {
            Some(outer) => {
                outer.extend(events);
                None
            }
            None => Some(events),
        });
        if let Some(events) = unclaimed {
            events.into_iter().for_each(|event| event.emit(sink));
        }
    }

    /// Restores the enclosing scope and returns this scope's counters.
    fn close(&mut self) -> Vec<GovernanceEvent> {
        self.closed = true;
        let outer = self.outer.take();
        PENDING
            .with(|pending| pending.replace(outer))
            .unwrap_or_default()
    }
}

impl Drop for DeferredMetrics {
    fn drop(&mut self) {
        if !self.closed {
            self.close();
        }
    }
}

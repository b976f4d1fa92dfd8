//! Core event bus for the Recast platform.
//!
//! The bus provides a typed event enum, sequential identifiers, and support
//! for replaying recent events when subscribers reconnect (e.g. SSE clients
//! that supply `Last-Event-ID`). Internally it uses `tokio::broadcast` with a
//! bounded buffer; when the channel overflows, the oldest events are dropped,
//! matching the desired backpressure behaviour.
//!
//! This crate is also the home of the shared lifecycle vocabulary
//! ([`ProcessingStatus`], [`StageType`], [`StageStatus`], [`TargetType`],
//! [`TargetStatus`]) so that domain crates and event consumers agree on one
//! set of states.

pub mod payloads;
pub mod routing;
pub mod topics;

pub use payloads::{
    DEFAULT_REPLAY_CAPACITY, Event, EventEnvelope, EventId, ProcessingStatus, StageStatus,
    StageType, TargetStatus, TargetType,
};
pub use routing::{EventBus, EventStream};

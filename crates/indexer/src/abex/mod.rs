//! ABEX event and vault decoding.

pub mod classify;
pub mod error;
pub mod normalize;
pub mod numeric;
pub mod payload;
pub mod sink;
pub mod token;
pub mod types;
pub mod vault;

pub use classify::{Category, ClassifiedEvent, EventKind, PositionEventKind, classify, classify_position};
pub use error::DecodeError;
pub use normalize::EventNormalizer;
pub use sink::{EventLogSink, MetricsSink, TracingEventLog};
pub use token::{RpcMetadataSource, StaticRegistry, TokenInfo, TokenResolver, TokenSource};
pub use types::{EventEnvelope, NormalizedEvent, Prices};
pub use vault::{VaultSnapshot, VaultSnapshotDecoder};

pub mod channel;
pub mod decode;
pub mod error;
pub mod header;
pub mod port;
pub mod recording;
pub mod ttl;

pub use channel::MarkerChannel;
pub use decode::decode_pulse_train;
pub use error::MarkerError;
pub use header::{MarkerField, MarkerHeader, quantize};
pub use port::{MarkerPort, PortConfig};
pub use recording::{MarkerEvent, NullPort, RecordingPort};
pub use ttl::{DeviceLine, TtlLine, TtlPort};

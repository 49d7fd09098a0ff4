use crate::error::MarkerError;
use crate::recording::{NullPort, RecordingPort};
use crate::ttl::{DeviceLine, TtlPort};
use serde::{Deserialize, Serialize};
use vistim_timing::HighPrecisionTimer;

/// Synchronization port the recording rig listens on.
pub trait MarkerPort: Send {
    /// One header integer.
    fn encode(&mut self, value: i32) -> Result<(), MarkerError>;
    /// Group separator inside a header.
    fn encode_separator(&mut self) -> Result<(), MarkerError>;
    /// End-of-header sentinel.
    fn encode_end(&mut self) -> Result<(), MarkerError>;
    /// Single pulse at a stimulus edge.
    fn trigger(&mut self) -> Result<(), MarkerError>;
}

impl<P: MarkerPort + ?Sized> MarkerPort for Box<P> {
    fn encode(&mut self, value: i32) -> Result<(), MarkerError> {
        (**self).encode(value)
    }

    fn encode_separator(&mut self) -> Result<(), MarkerError> {
        (**self).encode_separator()
    }

    fn encode_end(&mut self) -> Result<(), MarkerError> {
        (**self).encode_end()
    }

    fn trigger(&mut self) -> Result<(), MarkerError> {
        (**self).trigger()
    }
}

/// Which port a run writes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PortConfig {
    #[default]
    Null,
    /// Keep events in memory only
    Recording,
    /// Byte-writable TTL device, e.g. `/dev/port` at offset 0x378
    Device {
        path: String,
        #[serde(default)]
        offset: Option<u64>,
    },
}

impl PortConfig {
    pub fn open(&self) -> Result<Box<dyn MarkerPort>, MarkerError> {
        Ok(match self {
            PortConfig::Null => Box::new(NullPort),
            PortConfig::Recording => Box::new(RecordingPort::new()),
            PortConfig::Device { path, offset } => {
                let line = DeviceLine::open(path, *offset)?;
                Box::new(TtlPort::new(line, HighPrecisionTimer::new()))
            }
        })
    }
}

use crate::error::MarkerError;
use crate::port::MarkerPort;
use tracing::{debug, info};

/// Fixed-point quantization used for every stimulus header field.
///
/// The value is widened to `f64` before scaling, so `0.8f32 * 100` reads 80.
pub fn quantize(value: f32, scale: f64) -> i32 {
    (value as f64 * scale).floor() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerField {
    Value(i32),
    Separator,
    End,
}

/// Parameter header sent once before the first stimulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHeader {
    pub experiment_type: i32,
    pub condition_key: i32,
    pub levels: i32,
    pub seed: i32,
    pub trials: i32,
    /// Stimulus-specific fields, already quantized, in program order
    pub params: Vec<i32>,
}

impl MarkerHeader {
    pub fn push(&mut self, value: f32, scale: f64) -> &mut Self {
        self.params.push(quantize(value, scale));
        self
    }

    pub fn push_raw(&mut self, value: i32) -> &mut Self {
        self.params.push(value);
        self
    }

    pub fn fields(&self) -> Vec<MarkerField> {
        let mut out = vec![
            MarkerField::Value(self.experiment_type),
            MarkerField::Value(self.condition_key),
            MarkerField::Value(self.levels),
            MarkerField::Value(self.seed),
            MarkerField::Value(self.trials),
            MarkerField::Separator,
        ];
        out.extend(self.params.iter().copied().map(MarkerField::Value));
        out.push(MarkerField::End);
        out
    }

    pub fn send<P: MarkerPort + ?Sized>(&self, port: &mut P) -> Result<(), MarkerError> {
        info!(
            experiment_type = self.experiment_type,
            seed = self.seed,
            fields = self.params.len(),
            "sending marker header"
        );
        for field in self.fields() {
            match field {
                MarkerField::Value(v) => port.encode(v)?,
                MarkerField::Separator => port.encode_separator()?,
                MarkerField::End => port.encode_end()?,
            }
        }
        debug!(params = ?self.params, "marker header sent");
        Ok(())
    }
}

use crate::header::MarkerField;
use crate::ttl::{DIGIT_STEP, PULSE_WIDTH};

fn digit_from_interval(interval: f64) -> u32 {
    let gap = interval - PULSE_WIDTH.as_secs_f64();
    (gap / DIGIT_STEP.as_secs_f64()).round().max(0.0) as u32
}

/// Recovers header fields from the rising-edge times (seconds) of a recorded
/// pulse train. Decoding stops after the end sentinel; an incomplete trailing
/// group is dropped.
pub fn decode_pulse_train(rising_edges: &[f64]) -> Vec<MarkerField> {
    let digits: Vec<u32> = rising_edges
        .chunks_exact(2)
        .map(|pair| digit_from_interval(pair[1] - pair[0]))
        .collect();

    let mut fields = Vec::new();
    for group in digits.chunks_exact(4) {
        let field = match group {
            [0, 0, 16, 0] => MarkerField::Separator,
            [0, 0, 0, 16] => MarkerField::End,
            _ => MarkerField::Value(group.iter().fold(0i32, |acc, &d| acc * 16 + d as i32)),
        };
        fields.push(field);
        if field == MarkerField::End {
            break;
        }
    }
    fields
}

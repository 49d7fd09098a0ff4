use serde::{Deserialize, Serialize};

/// Physical display geometry. Stimulus units are degrees of visual angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Display {
    /// Eye to screen distance in millimetres
    pub viewing_distance_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub width_px: u32,
    pub height_px: u32,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            viewing_distance_mm: 570.0,
            width_mm: 400.0,
            height_mm: 300.0,
            width_px: 1024,
            height_px: 768,
        }
    }
}

fn subtended_degrees(extent_mm: f64, distance_mm: f64) -> f64 {
    2.0 * (extent_mm / 2.0).atan2(distance_mm).to_degrees()
}

impl Display {
    pub fn width_deg(&self) -> f64 {
        subtended_degrees(self.width_mm, self.viewing_distance_mm)
    }

    pub fn height_deg(&self) -> f64 {
        subtended_degrees(self.height_mm, self.viewing_distance_mm)
    }

    /// Mean horizontal pixel density across the screen.
    pub fn pixels_per_degree(&self) -> f64 {
        let deg = self.width_deg();
        if deg > 0.0 {
            self.width_px as f64 / deg
        } else {
            0.0
        }
    }

    pub fn degrees_per_pixel(&self) -> f64 {
        let ppd = self.pixels_per_degree();
        if ppd > 0.0 { 1.0 / ppd } else { 0.0 }
    }
}

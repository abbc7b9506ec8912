use std::f64::consts::TAU;

use crate::error::{Result, WheelError};

/// One labeled wedge of the wheel, addressed by its ordinal index.
///
/// Labels and categories need not be unique; duplicates are independently
/// selectable by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sector {
    pub label: String,
    pub category: String,
}

impl Sector {
    pub fn new(label: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            category: category.into(),
        }
    }
}

/// Ordered, non-empty sector list. Order determines angular position: sector
/// `i` occupies `[i*w, (i+1)*w)` before rotation, where `w = 2*pi / N`.
#[derive(Debug, Clone)]
pub struct WheelModel {
    sectors: Vec<Sector>,
}

impl WheelModel {
    pub fn new(sectors: Vec<Sector>) -> Result<Self> {
        if sectors.is_empty() {
            return Err(WheelError::EmptyWheel);
        }
        Ok(Self { sectors })
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        false // non-empty by construction
    }

    /// Angular width of one sector, in radians.
    pub fn sector_width(&self) -> f64 {
        TAU / self.len() as f64
    }

    /// The sector owning the pointer (angle 0) after rotating by `rotation`.
    pub fn sector_at_pointer(&self, rotation: f64) -> usize {
        sector_index_at_pointer(self.len(), rotation)
    }
}

/// Which sector index owns angle 0 once the wheel has rotated by `rotation`.
///
/// Rotating by `rotation` moves un-rotated angle `a` to `a + rotation`, so the
/// pointer reads the sector that originally owned `-rotation` (mod 2*pi).
pub fn sector_index_at_pointer(count: usize, rotation: f64) -> usize {
    debug_assert!(count > 0);
    let w = TAU / count as f64;
    let unrotated = (-rotation).rem_euclid(TAU);
    ((unrotated / w) as usize).min(count - 1)
}

/// Center and radius of the wheel disc, derived from the drawing surface.
/// Recomputed whenever the surface resizes, never mutated mid-spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelGeometry {
    pub center_x: i32,
    pub center_y: i32,
    pub radius: i32,
}

impl WheelGeometry {
    pub fn from_surface(width: usize, height: usize, margin: i32) -> Self {
        let center_x = width as i32 / 2;
        let center_y = height as i32 / 2;
        let radius = ((width.min(height) as i32) / 2 - margin).max(16);
        Self {
            center_x,
            center_y,
            radius,
        }
    }
}

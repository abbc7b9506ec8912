use std::f64::consts::TAU;

use crate::error::{Result, WheelError};

/// Compute the final rotation angle that parks sector `target_index` under
/// the pointer after at least `min_full_turns` full revolutions.
///
/// The pointer sits at angle 0 in the un-rotated frame; where it is drawn on
/// screen is a rendering convention. With sector width `w = 2*pi / N`, landing
/// sector `k`'s center on the pointer needs a rotation of `-(k + 0.5) * w`
/// modulo `2*pi`; the full turns are added on top so every spin travels a
/// visually convincing distance in a consistent direction.
///
/// Deterministic: identical inputs produce bit-identical output. The result
/// always satisfies `m * 2*pi <= angle < (m + 1) * 2*pi`. Each spin is solved
/// from zero rather than accumulated onto the previous settle angle, so
/// repeated spins cannot drift.
pub fn solve(sector_count: usize, target_index: usize, min_full_turns: u32) -> Result<f64> {
    if sector_count == 0 {
        return Err(WheelError::EmptyWheel);
    }
    if target_index >= sector_count {
        return Err(WheelError::InvalidIndex {
            index: target_index,
            count: sector_count,
        });
    }

    // A one-sector wheel is under the pointer at any angle; land on whole
    // turns so the wheel returns to its rest orientation.
    let residual = if sector_count == 1 {
        0.0
    } else {
        let w = TAU / sector_count as f64;
        (-(target_index as f64 + 0.5) * w).rem_euclid(TAU)
    };

    Ok(min_full_turns as f64 * TAU + residual)
}

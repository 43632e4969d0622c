//! Angle conventions shared by the spin engine and the renderer.
//!
//! Wheel-local angles are measured from the wheel's zero mark in the direction
//! the pointer travels relative to the wheel while it spins. A wheel rotated by
//! `rotation` radians therefore shows wheel-local angle `rotation mod 2π`
//! under the pointer, and a wheel-local angle `φ` sits at `φ - rotation` when
//! measured from the pointer. Sector `i` of `n` covers the wheel-local span
//! `[i * 2π/n, (i + 1) * 2π/n)`.

use std::f64::consts::TAU;

/// Folds an accumulated rotation into `[0, 2π)`.
pub fn normalize(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

pub fn sector_width(count: usize) -> f64 {
    TAU / count as f64
}

/// Index of the sector containing the wheel-local angle.
pub fn sector_at(local_angle: f64, count: usize) -> usize {
    debug_assert!(count > 0);
    let idx = (normalize(local_angle) / sector_width(count)).floor() as usize;
    idx.min(count - 1)
}

/// Wheel-local angle currently under the pointer.
pub fn pointer_angle(rotation: f64) -> f64 {
    normalize(rotation)
}

/// The sector the pointer rests on for a given rotation.
pub fn sector_under_pointer(rotation: f64, count: usize) -> usize {
    sector_at(pointer_angle(rotation), count)
}

/// Picks the entry the pointer rests on. `None` for an empty slice.
pub fn winner_for<'a, S: AsRef<str>>(
    rotation: f64,
    entries: &'a [S],
) -> Option<(usize, &'a str)> {
    if entries.is_empty() {
        return None;
    }
    let idx = sector_under_pointer(rotation, entries.len());
    Some((idx, entries[idx].as_ref()))
}

/// Wheel-local start and end angle of sector `index`.
pub fn sector_bounds(index: usize, count: usize) -> (f64, f64) {
    let w = sector_width(count);
    (index as f64 * w, (index + 1) as f64 * w)
}

/// Converts a wheel-local angle to its angle from the pointer.
pub fn relative_to_pointer(local_angle: f64, rotation: f64) -> f64 {
    local_angle - rotation
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectorSpan {
    pub index: usize,
    /// Angle from the pointer where the sector starts, in `[0, 2π)`.
    pub start: f64,
    pub width: f64,
}

impl SectorSpan {
    pub fn mid(&self) -> f64 {
        self.start + self.width / 2.0
    }

    /// Whether the pointer-relative angle falls inside this span.
    pub fn contains(&self, angle: f64) -> bool {
        let offset = normalize(angle - self.start);
        offset < self.width
    }
}

/// Sector spans measured from the pointer for one frame.
#[derive(Clone, Debug)]
pub struct WheelLayout {
    pub rotation: f64,
    pub spans: Vec<SectorSpan>,
}

impl WheelLayout {
    pub fn new(count: usize, rotation: f64) -> Self {
        let width = sector_width(count);
        let spans = (0..count)
            .map(|index| {
                let (start, _) = sector_bounds(index, count);
                SectorSpan {
                    index,
                    start: normalize(relative_to_pointer(start, rotation)),
                    width,
                }
            })
            .collect();
        WheelLayout { rotation, spans }
    }

    /// Sector drawn at the pointer (pointer-relative angle zero).
    pub fn at_pointer(&self) -> Option<usize> {
        self.spans.iter().find(|s| s.contains(0.0)).map(|s| s.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{
        FRAC_PI_2,
        PI,
    };

    #[test]
    fn sectors_partition_the_circle() {
        for n in 2..=64 {
            let mut prev_end = 0.0;
            let mut total = 0.0;
            for i in 0..n {
                let (start, end) = sector_bounds(i, n);
                assert!((start - prev_end).abs() < 1e-12, "gap before sector {i} of {n}");
                total += end - start;
                prev_end = end;
            }
            assert!((total - TAU).abs() < 1e-9);
            assert!((prev_end - TAU).abs() < 1e-9);
        }
    }

    #[test]
    fn normalize_folds_negative_and_large_angles() {
        assert!((normalize(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((normalize(5.0 * TAU + 0.25) - 0.25).abs() < 1e-9);
        assert_eq!(normalize(-1e-18), 0.0);
        assert!(normalize(-1e-18) < TAU);
    }

    #[test]
    fn sector_at_clamps_to_last_sector() {
        assert_eq!(sector_at(TAU - 1e-15, 3), 2);
        assert_eq!(sector_at(0.0, 3), 0);
    }

    #[test]
    fn winner_for_four_entries() {
        let entries = ["A", "B", "C", "D"];
        assert_eq!(winner_for(0.1, &entries), Some((0, "A")));
        assert_eq!(winner_for(FRAC_PI_2 + 0.1, &entries), Some((1, "B")));
        assert_eq!(winner_for(PI + 0.1, &entries), Some((2, "C")));
        assert_eq!(winner_for(-0.1, &entries), Some((3, "D")));
        assert_eq!(winner_for(3.0 * TAU + 0.1, &entries), Some((0, "A")));
    }

    #[test]
    fn winner_for_empty_is_none() {
        let entries: [&str; 0] = [];
        assert_eq!(winner_for(1.0, &entries), None);
    }

    #[test]
    fn layout_places_selected_sector_under_pointer() {
        for n in 2..=12 {
            for step in 0..720 {
                let rotation = step as f64 * 0.0371 - 3.0;
                let layout = WheelLayout::new(n, rotation);
                assert_eq!(
                    layout.at_pointer(),
                    Some(sector_under_pointer(rotation, n)),
                    "n={n} rotation={rotation}"
                );
            }
        }
    }

    #[test]
    fn layout_spans_keep_entry_order() {
        let layout = WheelLayout::new(4, 0.0);
        let starts: Vec<f64> = layout.spans.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]);
        assert!((layout.spans[0].mid() - PI / 4.0).abs() < 1e-12);
    }
}

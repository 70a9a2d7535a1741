//! Ridge linking across scales

use super::local_max::local_maxima;
use super::{RidgeLine, RidgePoint};
use crate::cwt::{CoefficientGrid, ScaleSet};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Nearest candidate to `pos`; ties go to the lower index.
fn nearest(candidates: &BTreeSet<usize>, pos: usize) -> Option<usize> {
    let below = candidates.range(..=pos).next_back().copied();
    let above = candidates.range(pos..).next().copied();
    match (below, above) {
        (Some(b), Some(a)) => {
            if a - pos < pos - b {
                Some(a)
            } else {
                Some(b)
            }
        }
        (b, a) => b.or(a),
    }
}

/// Link local maxima from the coarsest row down to the finest.
///
/// Each ridge claims the nearest free maximum of the next finer row when it
/// lies within the current scale value (in samples). A ridge that finds
/// nothing accumulates a gap and stops growing once the gap exceeds
/// `max_gap`; it is still returned. Maxima no ridge claimed start new
/// ridges, in ascending sample order.
pub fn trace_ridges(
    grid: &CoefficientGrid,
    scales: &ScaleSet,
    max_gap: usize,
    window: usize,
) -> Vec<RidgeLine> {
    let mut ridges: Vec<RidgeLine> = Vec::new();
    let mut gaps: Vec<usize> = Vec::new();

    for row in (0..grid.rows()).rev() {
        let mut available: BTreeSet<usize> =
            local_maxima(grid.row(row), window).into_iter().collect();
        let found = available.len();
        let reach = scales.get(row);

        for (ridge, gap) in ridges.iter_mut().zip(gaps.iter_mut()) {
            if *gap > max_gap {
                continue;
            }
            let pos = ridge.last_sample_index();
            match nearest(&available, pos) {
                Some(c) if c.abs_diff(pos) as f64 <= reach => {
                    available.remove(&c);
                    ridge.points.push(RidgePoint {
                        scale_index: row,
                        sample_index: c,
                    });
                    *gap = 0;
                }
                _ => *gap += 1,
            }
        }

        trace!(
            row,
            scale = reach,
            maxima = found,
            new_ridges = available.len(),
            "traced row"
        );

        for c in available {
            ridges.push(RidgeLine::start(row, c));
            gaps.push(0);
        }
    }

    debug!(ridges = ridges.len(), "ridge tracing complete");
    ridges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cwt::transform;

    #[test]
    fn test_nearest_prefers_lower_on_tie() {
        let set: BTreeSet<usize> = [4, 8].into_iter().collect();
        assert_eq!(nearest(&set, 6), Some(4));
        assert_eq!(nearest(&set, 7), Some(8));
        assert_eq!(nearest(&set, 8), Some(8));
        assert_eq!(nearest(&set, 100), Some(8));
        assert_eq!(nearest(&set, 0), Some(4));
        assert_eq!(nearest(&BTreeSet::new(), 3), None);
    }

    fn bump_signal() -> Vec<f64> {
        (0..512)
            .map(|i| {
                let t = (i as f64 - 256.0) / 8.0;
                (-0.5 * t * t).exp()
            })
            .collect()
    }

    #[test]
    fn test_ridge_points_run_coarse_to_fine() {
        let samples = bump_signal();
        let scales = ScaleSet::log(samples.len(), 4, 1.0);
        let grid = transform(&samples, &scales);
        let ridges = trace_ridges(&grid, &scales, 4, 3);
        assert!(!ridges.is_empty());
        for ridge in &ridges {
            for w in ridge.points().windows(2) {
                assert!(w[0].scale_index > w[1].scale_index);
            }
        }
    }

    #[test]
    fn test_bump_produces_long_central_ridge() {
        let samples = bump_signal();
        let scales = ScaleSet::log(samples.len(), 4, 1.0);
        let grid = transform(&samples, &scales);
        let ridges = trace_ridges(&grid, &scales, 4, 3);
        let central = ridges
            .iter()
            .filter(|r| r.last_sample_index().abs_diff(256) <= 2)
            .map(|r| r.len())
            .max()
            .unwrap_or(0);
        assert!(central >= 10, "central ridge has {} points", central);
    }

    /// Rising ramp (no interior maxima) with a spike at each of `spikes`
    fn spiky_row(spikes: &[usize]) -> Vec<f64> {
        let mut row: Vec<f64> = (0..20).map(|i| i as f64 * 0.001).collect();
        for &s in spikes {
            row[s] = 10.0;
        }
        row
    }

    fn points(ridge: &RidgeLine) -> Vec<(usize, usize)> {
        ridge
            .points()
            .iter()
            .map(|p| (p.scale_index, p.sample_index))
            .collect()
    }

    #[test]
    fn test_link_limited_by_current_scale() {
        let scales = ScaleSet::from_values(vec![1.0, 2.0, 4.0]);

        // 10 -> 12 is within scale 2 of row 1
        let grid = CoefficientGrid::from_test_rows(vec![
            spiky_row(&[12]),
            spiky_row(&[12]),
            spiky_row(&[10]),
        ]);
        let ridges = trace_ridges(&grid, &scales, 4, 3);
        assert_eq!(ridges.len(), 1);
        assert_eq!(points(&ridges[0]), vec![(2, 10), (1, 12), (0, 12)]);

        // 10 -> 13 is not, so 13 starts its own ridge
        let grid = CoefficientGrid::from_test_rows(vec![
            spiky_row(&[13]),
            spiky_row(&[13]),
            spiky_row(&[10]),
        ]);
        let ridges = trace_ridges(&grid, &scales, 4, 3);
        assert_eq!(ridges.len(), 2);
        assert_eq!(points(&ridges[0]), vec![(2, 10)]);
        assert_eq!(points(&ridges[1]), vec![(1, 13), (0, 13)]);
    }

    fn gapped_grid() -> CoefficientGrid {
        // maxima at sample 10 in rows 5, 2, 1, 0; rows 4 and 3 are empty
        CoefficientGrid::from_test_rows(vec![
            spiky_row(&[10]),
            spiky_row(&[10]),
            spiky_row(&[10]),
            spiky_row(&[]),
            spiky_row(&[]),
            spiky_row(&[10]),
        ])
    }

    #[test]
    fn test_gap_within_limit_is_bridged() {
        let scales = ScaleSet::from_values(vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let ridges = trace_ridges(&gapped_grid(), &scales, 2, 3);
        assert_eq!(ridges.len(), 1);
        assert_eq!(points(&ridges[0]), vec![(5, 10), (2, 10), (1, 10), (0, 10)]);
    }

    #[test]
    fn test_ridge_past_max_gap_stops_but_is_kept() {
        let scales = ScaleSet::from_values(vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let ridges = trace_ridges(&gapped_grid(), &scales, 1, 3);

        // the coarse ridge is returned with its single point and never
        // claims the maxima that reappear below the gap
        assert_eq!(ridges.len(), 2);
        assert_eq!(points(&ridges[0]), vec![(5, 10)]);
        assert_eq!(points(&ridges[1]), vec![(2, 10), (1, 10), (0, 10)]);
    }

    #[test]
    fn test_claimed_maximum_not_shared() {
        let scales = ScaleSet::from_values(vec![3.0, 3.0]);
        let grid = CoefficientGrid::from_test_rows(vec![spiky_row(&[8]), spiky_row(&[7, 9])]);
        let ridges = trace_ridges(&grid, &scales, 4, 3);

        // both coarse ridges want 8; the first one traced takes it
        assert_eq!(ridges.len(), 2);
        assert_eq!(points(&ridges[0]), vec![(1, 7), (0, 8)]);
        assert_eq!(points(&ridges[1]), vec![(1, 9)]);
    }

    #[test]
    fn test_flat_grid_every_sample_starts_a_ridge() {
        let samples = vec![1.0; 16];
        let scales = ScaleSet::log(samples.len(), 1, 1.0);
        let grid = transform(&samples, &scales);
        let ridges = trace_ridges(&grid, &scales, 4, 3);
        // all-zero rows: every interior sample is a maximum
        assert!(ridges.iter().all(|r| !r.is_empty()));
        assert!(ridges.len() >= 14);
    }
}

//! Candidate position generation for one polygon against a set of obstacles.
//!
//! Positions are bottom-left corners of the polygon's bounding box. The mix
//! is a fine corner sweep, edge grids, and obstacle-relative seeds standing
//! in for no-fit-polygon vertices; the 1 mm corner grid is what makes tight
//! corner packing work in practice.

use std::collections::HashSet;

use geo::Rect;

use crate::config::NestingConfig;

/// Gap distances tried when seeding positions against an obstacle edge.
const OBSTACLE_GAPS: [f64; 4] = [0.5, 1.0, 2.0, 3.0];

/// Step of the corner sweep.
const CORNER_STEP: f64 = 1.0;

/// Dedup precision for near-identical positions.
const DEDUP_PRECISION: f64 = 0.1;

/// Generate candidate (x, y) positions for a part with bounding box
/// `poly_w` x `poly_h` on a `sheet_w` x `sheet_h` sheet. Every returned
/// position keeps the part inside the sheet (within the boundary tolerance);
/// the result is deduplicated and sorted bottom-left first (y, then x).
pub fn generate(
    poly_w: f64,
    poly_h: f64,
    sheet_w: f64,
    sheet_h: f64,
    obstacles: &[Rect<f64>],
    step_size: f64,
    config: &NestingConfig,
) -> Vec<(f64, f64)> {
    let max_candidates = config.max_candidates;
    let mut raw: Vec<(f64, f64)> = Vec::new();

    // Ultra-fine sweep of the bottom-left corner region.
    let corner = config
        .corner_region_mm
        .min(sheet_w / 3.0)
        .min(sheet_h / 3.0);
    let mut x = 0.0;
    while x <= corner.min(sheet_w - poly_w) && raw.len() < max_candidates / 4 {
        raw.push((x, 0.0));
        x += CORNER_STEP;
    }
    let mut y = 0.0;
    while y <= corner.min(sheet_h - poly_h) && raw.len() < max_candidates / 4 {
        raw.push((0.0, y));
        y += CORNER_STEP;
    }

    // Edge grids along the bottom and left edges.
    let fine_step = step_size.min(config.fine_step_mm).max(f64::EPSILON);
    let mut x = if corner < sheet_w - poly_w { corner } else { 0.0 };
    while x <= sheet_w - poly_w && raw.len() < max_candidates / 2 {
        raw.push((x, 0.0));
        x += step_size;
    }
    let mut y = if corner < sheet_h - poly_h { corner } else { 0.0 };
    while y <= sheet_h - poly_h && raw.len() < max_candidates / 2 {
        raw.push((0.0, y));
        y += step_size;
    }

    // Obstacle-relative seeds: a cheap proxy for no-fit-polygon vertices.
    for obs in obstacles {
        if raw.len() >= max_candidates {
            break;
        }
        let (obs_w, obs_h) = (obs.width(), obs.height());
        for gap in OBSTACLE_GAPS {
            // Right of the obstacle, several y alignments.
            let x = obs.max().x + gap;
            if x + poly_w <= sheet_w {
                raw.push((x, obs.min().y));
                raw.push((x, obs.max().y - poly_h));
                raw.push((x, 0.0));
                let y_step = fine_step.max(obs_h / 3.0);
                let mut y = obs.min().y;
                while y <= obs.max().y && y + poly_h <= sheet_h {
                    raw.push((x, y));
                    y += y_step;
                }
            }

            // Above the obstacle, mirrored.
            let y = obs.max().y + gap;
            if y + poly_h <= sheet_h {
                raw.push((obs.min().x, y));
                raw.push((obs.max().x - poly_w, y));
                raw.push((0.0, y));
                let x_step = fine_step.max(obs_w / 3.0);
                let mut x = obs.min().x;
                while x <= obs.max().x && x + poly_w <= sheet_w {
                    raw.push((x, y));
                    x += x_step;
                }
            }

            // Left of and below the obstacle, when room remains.
            let x = obs.min().x - poly_w - gap;
            if x >= 0.0 {
                raw.push((x, obs.min().y));
                raw.push((x, 0.0));
            }
            let y = obs.min().y - poly_h - gap;
            if y >= 0.0 {
                raw.push((obs.min().x, y));
                raw.push((0.0, y));
            }
        }
    }
    raw.truncate(max_candidates);

    // Filter to the sheet, dedup, bottom-left order.
    let tol = config.boundary_tol_mm;
    let mut seen: HashSet<(i64, i64)> = HashSet::with_capacity(raw.len());
    let mut out: Vec<(f64, f64)> = Vec::with_capacity(raw.len());
    for (x, y) in raw {
        if x < -tol || y < -tol || x > sheet_w - poly_w + tol || y > sheet_h - poly_h + tol {
            continue;
        }
        let key = (
            (x / DEDUP_PRECISION).round() as i64,
            (y / DEDUP_PRECISION).round() as i64,
        );
        if seen.insert(key) {
            out.push((x, y));
        }
    }
    out.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.total_cmp(&b.0)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Rect<f64> {
        Rect::new(
            Coord { x: min_x, y: min_y },
            Coord { x: max_x, y: max_y },
        )
    }

    #[test]
    fn test_all_positions_inside_sheet() {
        let config = NestingConfig::default();
        let positions = generate(
            400.0,
            300.0,
            1000.0,
            1000.0,
            &[rect(0.0, 0.0, 500.0, 500.0)],
            3.0,
            &config,
        );
        assert!(!positions.is_empty());
        for (x, y) in positions {
            assert!(x >= -0.1 && x <= 600.1, "x out of range: {x}");
            assert!(y >= -0.1 && y <= 700.1, "y out of range: {y}");
        }
    }

    #[test]
    fn test_sorted_bottom_left_first() {
        let config = NestingConfig::default();
        let positions = generate(100.0, 100.0, 1000.0, 1000.0, &[], 3.0, &config);
        assert_eq!(positions[0], (0.0, 0.0));
        for pair in positions.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(a.1 < b.1 || (a.1 == b.1 && a.0 < b.0));
        }
    }

    #[test]
    fn test_corner_region_swept_at_1mm() {
        let config = NestingConfig::default();
        let positions = generate(100.0, 100.0, 1000.0, 1000.0, &[], 3.0, &config);
        // The first 1mm steps along the bottom edge must all be present.
        for x in 0..5 {
            assert!(positions.contains(&(x as f64, 0.0)));
        }
    }

    #[test]
    fn test_obstacle_relative_positions_present() {
        let config = NestingConfig::default();
        let positions = generate(
            100.0,
            100.0,
            1000.0,
            1000.0,
            &[rect(0.0, 0.0, 400.0, 400.0)],
            3.0,
            &config,
        );
        // Seeds just right of and just above the obstacle at each gap.
        for gap in OBSTACLE_GAPS {
            assert!(positions.iter().any(|&(x, y)| (x - (400.0 + gap)).abs() < 1e-9 && y == 0.0));
            assert!(positions.iter().any(|&(x, y)| x == 0.0 && (y - (400.0 + gap)).abs() < 1e-9));
        }
    }

    #[test]
    fn test_max_candidates_respected() {
        let config = NestingConfig {
            max_candidates: 100,
            ..NestingConfig::default()
        };
        let obstacles: Vec<Rect<f64>> = (0..50)
            .map(|i| {
                let x = (i % 10) as f64 * 90.0;
                let y = (i / 10) as f64 * 90.0;
                rect(x, y, x + 80.0, y + 80.0)
            })
            .collect();
        let positions = generate(50.0, 50.0, 1000.0, 1000.0, &obstacles, 3.0, &config);
        assert!(positions.len() <= 100);
    }

    #[test]
    fn test_exact_fit_yields_origin() {
        let config = NestingConfig::default();
        let positions = generate(1000.0, 1000.0, 1000.0, 1000.0, &[], 3.0, &config);
        assert_eq!(positions, vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_duplicates_pruned() {
        let config = NestingConfig::default();
        // Two coincident obstacles produce identical seeds.
        let obs = rect(0.0, 0.0, 300.0, 300.0);
        let positions = generate(100.0, 100.0, 1000.0, 1000.0, &[obs, obs], 3.0, &config);
        let mut keys: Vec<(i64, i64)> = positions
            .iter()
            .map(|&(x, y)| ((x * 10.0).round() as i64, (y * 10.0).round() as i64))
            .collect();
        keys.sort_unstable();
        let before = keys.len();
        keys.dedup();
        assert_eq!(before, keys.len());
    }

    #[test]
    fn test_oversize_part_gets_no_positions() {
        let config = NestingConfig::default();
        let positions = generate(1200.0, 100.0, 1000.0, 1000.0, &[], 3.0, &config);
        assert!(positions.is_empty());
    }
}

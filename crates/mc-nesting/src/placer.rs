//! Best-position search for one carpet on one sheet.

use geo::{Coord, Rect};
use mc_core::carpet::{Carpet, PlacedCarpet};
use mc_core::geometry::{self, Rotation};
use mc_core::index::ObstacleIndex;

use crate::candidates;
use crate::config::NestingConfig;

/// Obstacle proximity closer than this earns a contact credit.
const CONTACT_RANGE_MM: f64 = 200.0;

/// Sheet-edge proximity closer than this earns a smaller credit.
const EDGE_RANGE_MM: f64 = 100.0;

/// Placement score, compared lexicographically: y, then x, then negated
/// contact credit. Lower wins on every component.
type Score = (f64, f64, f64);

fn beats(a: Score, b: Score) -> bool {
    a.0.total_cmp(&b.0)
        .then(a.1.total_cmp(&b.1))
        .then(a.2.total_cmp(&b.2))
        .is_lt()
}

/// Find the best collision-free placement for `carpet` among the four
/// rotations, or `None` when nothing fits. Scores compare lexicographically:
/// bottom first, then left; obstacle and sheet-edge contact credit only
/// breaks exact positional ties, which arise between rotations landing on
/// the same corner. A candidate flush with the bottom-left corner
/// short-circuits the search.
pub fn place(
    carpet: &Carpet,
    index: &ObstacleIndex,
    sheet_w: f64,
    sheet_h: f64,
    config: &NestingConfig,
) -> Option<PlacedCarpet> {
    let tol = config.boundary_tol_mm;
    let mut best: Option<(Score, Rotation, f64, f64)> = None;

    for rotation in Rotation::ALL {
        let rotated = geometry::rotate_about_centroid(&carpet.polygon, rotation);
        let Some(bounds) = geometry::bounds(&rotated) else {
            continue;
        };
        let (w, h) = (bounds.width(), bounds.height());
        if w > sheet_w + tol || h > sheet_h + tol {
            continue;
        }

        let step = config.step_size_for(w.max(h));
        let positions =
            candidates::generate(w, h, sheet_w, sheet_h, index.bounds(), step, config);

        for (x, y) in positions {
            let dx = x - bounds.min().x;
            let dy = y - bounds.min().y;
            let test = geometry::translate(&rotated, dx, dy);
            if !geometry::within_sheet(&test, sheet_w, sheet_h, tol) {
                continue;
            }
            if index.collides_with(&test, config.min_gap_mm) {
                continue;
            }

            // Flush with the corner: nothing can beat it, stop searching.
            if x <= tol && y <= tol {
                return Some(PlacedCarpet::place(carpet.clone(), rotation, dx, dy));
            }

            let test_bounds = Rect::new(
                Coord { x, y },
                Coord {
                    x: x + w,
                    y: y + h,
                },
            );
            let score = placement_score(x, y, &test_bounds, index.bounds(), sheet_w, sheet_h);
            if best.is_none_or(|(best_score, ..)| beats(score, best_score)) {
                best = Some((score, rotation, dx, dy));
            }
            // Candidates arrive sorted by (y, x); everything later in this
            // rotation is lexicographically worse than the first hit.
            break;
        }
    }

    best.map(|(_, rotation, dx, dy)| PlacedCarpet::place(carpet.clone(), rotation, dx, dy))
}

/// Lexicographic score, lower wins: bottom preference, then left, with the
/// contact credit as the final tie-break between equal positions.
fn placement_score(
    x: f64,
    y: f64,
    bounds: &Rect<f64>,
    obstacles: &[Rect<f64>],
    sheet_w: f64,
    sheet_h: f64,
) -> Score {
    let mut credit = 0.0;

    let mut nearest = f64::INFINITY;
    for obs in obstacles {
        nearest = nearest.min(geometry::bbox_distance(bounds, obs));
    }
    if nearest < CONTACT_RANGE_MM {
        credit += (CONTACT_RANGE_MM - nearest) / CONTACT_RANGE_MM;
    }

    let right_gap = (sheet_w - bounds.max().x).max(0.0);
    if right_gap < EDGE_RANGE_MM {
        credit += 0.1 * (1.0 - right_gap / EDGE_RANGE_MM);
    }
    let top_gap = (sheet_h - bounds.max().y).max(0.0);
    if top_gap < EDGE_RANGE_MM {
        credit += 0.1 * (1.0 - top_gap / EDGE_RANGE_MM);
    }

    (y, x, -credit)
}

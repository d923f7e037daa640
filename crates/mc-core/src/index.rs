//! Spatial index over placed obstacles.
//!
//! An R-tree over obstacle bounding boxes accelerates the collision path:
//! envelope query grown by the gap, cheap AABB pre-test, exact polygon test
//! only on survivors. The index owns its polygons; the filler appends one
//! obstacle per successful placement, so inserts are incremental and the
//! tree is bulk-loaded only when seeded from an existing layout.

use geo::{BoundingRect, Polygon, Rect};
use rstar::{AABB, RTree, RTreeObject};

use crate::geometry;

#[derive(Debug, Clone)]
struct TreeEntry {
    idx: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for TreeEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope_of(bounds: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [bounds.min().x, bounds.min().y],
        [bounds.max().x, bounds.max().y],
    )
}

#[derive(Debug, Default)]
pub struct ObstacleIndex {
    polygons: Vec<Polygon<f64>>,
    bounds: Vec<Rect<f64>>,
    tree: RTree<TreeEntry>,
}

impl ObstacleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index in one shot from an existing obstacle set.
    pub fn bulk_load(polygons: Vec<Polygon<f64>>) -> Self {
        let mut index = Self::new();
        let mut entries = Vec::with_capacity(polygons.len());
        for polygon in polygons {
            let Some(bounds) = polygon.bounding_rect() else {
                tracing::warn!("skipping obstacle without a bounding box");
                continue;
            };
            entries.push(TreeEntry {
                idx: index.polygons.len(),
                envelope: envelope_of(&bounds),
            });
            index.polygons.push(polygon);
            index.bounds.push(bounds);
        }
        index.tree = RTree::bulk_load(entries);
        index
    }

    /// Append one obstacle, updating the tree in place.
    pub fn push(&mut self, polygon: Polygon<f64>) {
        let Some(bounds) = polygon.bounding_rect() else {
            tracing::warn!("skipping obstacle without a bounding box");
            return;
        };
        self.tree.insert(TreeEntry {
            idx: self.polygons.len(),
            envelope: envelope_of(&bounds),
        });
        self.polygons.push(polygon);
        self.bounds.push(bounds);
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Bounding boxes of all obstacles, in insertion order. The candidate
    /// generator seeds positions off these.
    pub fn bounds(&self) -> &[Rect<f64>] {
        &self.bounds
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    /// Indices of obstacles whose bounding box comes within `grow` of
    /// `bbox`, in insertion order.
    pub fn query(&self, bbox: &Rect<f64>, grow: f64) -> Vec<usize> {
        let envelope = AABB::from_corners(
            [bbox.min().x - grow, bbox.min().y - grow],
            [bbox.max().x + grow, bbox.max().y + grow],
        );
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.idx)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// True iff `candidate` collides with any indexed obstacle under
    /// `min_gap`. First hit wins; a candidate without a bounding box is
    /// conservatively a collision.
    pub fn collides_with(&self, candidate: &Polygon<f64>, min_gap: f64) -> bool {
        if self.is_empty() {
            return false;
        }
        let Some(bbox) = candidate.bounding_rect() else {
            return true;
        };
        let grow = min_gap.max(0.0);
        for idx in self.query(&bbox, grow) {
            if !geometry::bbox_close(&bbox, &self.bounds[idx], grow) {
                continue;
            }
            if geometry::collides(candidate, &self.polygons[idx], min_gap) {
                return true;
            }
        }
        false
    }
}

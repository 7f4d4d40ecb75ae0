use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for point in points.iter().filter(|point| point.is_finite()) {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: (span * 0.5) + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    pub(super) fn side(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Squared distance between the closest edges of two squares.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        (dx * dx) + (dy * dy)
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };

        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) + (usize::from(point.y >= self.center.y) * 2)
    }
}

/// Region tree over node positions, carrying the aggregate mass of each cell.
pub(super) struct QuadTree {
    pub(super) bounds: Square,
    pub(super) centroid: Vec2,
    pub(super) count: f32,
    pub(super) max_radius: f32,
    pub(super) members: Vec<usize>,
    pub(super) children: [Option<Box<QuadTree>>; 4],
}

impl QuadTree {
    pub(super) fn build(points: &[Vec2], radii: &[f32]) -> Option<Self> {
        let bounds = Square::enclosing(points)?;
        let members = (0..points.len())
            .filter(|&index| points[index].is_finite())
            .collect::<Vec<_>>();
        Some(Self::grow(bounds, members, points, radii, 0))
    }

    fn grow(bounds: Square, members: Vec<usize>, points: &[Vec2], radii: &[f32], depth: usize) -> Self {
        let mut centroid = Vec2::ZERO;
        let mut max_radius = 0.0_f32;
        for &index in &members {
            centroid += points[index];
            max_radius = max_radius.max(radii.get(index).copied().unwrap_or(0.0));
        }

        let count = members.len() as f32;
        if count > 0.0 {
            centroid /= count;
        }

        let mut tree = Self {
            bounds,
            centroid,
            count,
            max_radius,
            members,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || tree.members.len() <= LEAF_CAPACITY {
            return tree;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &tree.members {
            buckets[bounds.quadrant_of(points[index])].push(index);
        }

        // Coincident points all land in one bucket; splitting would never end.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return tree;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            tree.children[quadrant] = Some(Box::new(Self::grow(
                bounds.quadrant(quadrant),
                bucket,
                points,
                radii,
                depth + 1,
            )));
        }
        tree.members.clear();
        tree
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadTree> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

//! Bounding Volume Hierarchy (BVH) over the bounded primitives of a scene.
//!
//! Spheres and triangles go into a binary tree; planes are unbounded and are
//! tested linearly on every query. The result is the same nearest-hit
//! distance that [`crate::LinearScan`] reports.

use lumen_core::Scene;
use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::accel::Accel;
use crate::intersect::{intersect_plane, intersect_sphere, intersect_triangle, Hit};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Slack added around every primitive box so that grazing hits computed by
/// the exact intersection routines never fall outside their box.
const BOX_PADDING: f32 = 1e-3;

/// Index of a bounded primitive in its scene collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrimitiveRef {
    Sphere(usize),
    Triangle(usize),
}

#[derive(Debug, Clone, Copy)]
struct BoundedPrimitive {
    primitive: PrimitiveRef,
    bbox: Aabb,
}

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug)]
enum BvhNode {
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    Leaf {
        primitives: Vec<PrimitiveRef>,
        bbox: Aabb,
    },
    Empty,
}

/// BVH accelerator borrowing its scene.
#[derive(Debug)]
pub struct Bvh<'s> {
    scene: &'s Scene,
    root: BvhNode,
}

impl<'s> Bvh<'s> {
    /// Build a BVH over the scene's spheres and triangles.
    pub fn new(scene: &'s Scene) -> Self {
        let spheres = scene.spheres.iter().enumerate().map(|(i, s)| {
            let r = Vec3::splat(s.radius);
            BoundedPrimitive {
                primitive: PrimitiveRef::Sphere(i),
                bbox: padded(Aabb::from_points(s.center - r, s.center + r)),
            }
        });
        let triangles = scene.triangles.iter().enumerate().map(|(i, t)| BoundedPrimitive {
            primitive: PrimitiveRef::Triangle(i),
            bbox: padded(Aabb::enclosing(&[t.a, t.b, t.c])),
        });
        let primitives: Vec<BoundedPrimitive> = spheres.chain(triangles).collect();

        let count = primitives.len();
        let root = if primitives.is_empty() {
            BvhNode::Empty
        } else {
            build(primitives)
        };

        log::debug!(
            "Built BVH over {} primitives (depth {}), {} planes tested linearly",
            count,
            root.depth(),
            scene.planes.len()
        );

        Self { scene, root }
    }

    fn intersect(&self, primitive: PrimitiveRef, ray: &Ray) -> Option<Hit> {
        match primitive {
            PrimitiveRef::Sphere(i) => intersect_sphere(ray, &self.scene.spheres[i]),
            PrimitiveRef::Triangle(i) => intersect_triangle(ray, &self.scene.triangles[i]),
        }
    }

    fn traverse(&self, node: &BvhNode, ray: &Ray, closest: &mut Hit) {
        match node {
            BvhNode::Empty => {}

            BvhNode::Leaf { primitives, bbox } => {
                if !bbox.hit(ray, Interval::new(0.0, closest.t)) {
                    return;
                }
                for &primitive in primitives {
                    *closest = closest.nearest(self.intersect(primitive, ray));
                }
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, Interval::new(0.0, closest.t)) {
                    return;
                }
                // Right is only searched up to whatever left found
                self.traverse(left, ray, closest);
                self.traverse(right, ray, closest);
            }
        }
    }
}

fn padded(bbox: Aabb) -> Aabb {
    Aabb {
        x: bbox.x.expand(2.0 * BOX_PADDING),
        y: bbox.y.expand(2.0 * BOX_PADDING),
        z: bbox.z.expand(2.0 * BOX_PADDING),
    }
}

/// Recursive median-split construction on the longest centroid axis.
fn build(mut primitives: Vec<BoundedPrimitive>) -> BvhNode {
    let bounds = primitives
        .iter()
        .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bbox));

    if primitives.len() <= LEAF_MAX_SIZE {
        return BvhNode::Leaf {
            primitives: primitives.iter().map(|p| p.primitive).collect(),
            bbox: bounds,
        };
    }

    let centroid_bounds = primitives.iter().fold(Aabb::EMPTY, |acc, p| {
        let c = p.bbox.centroid();
        Aabb::surrounding(&acc, &Aabb::from_points(c, c))
    });
    let axis = centroid_bounds.longest_axis();

    primitives.sort_unstable_by(|a, b| {
        let a_val = a.bbox.centroid()[axis];
        let b_val = b.bbox.centroid()[axis];
        a_val
            .partial_cmp(&b_val)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mid = primitives.len() / 2;
    let right = primitives.split_off(mid);

    BvhNode::Branch {
        left: Box::new(build(primitives)),
        right: Box::new(build(right)),
        bbox: bounds,
    }
}

impl BvhNode {
    fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl Accel for Bvh<'_> {
    fn cast_ray(&self, ray: &Ray) -> Hit {
        let mut closest = Hit::MISS;
        for plane in &self.scene.planes {
            closest = closest.nearest(intersect_plane(ray, plane));
        }
        self.traverse(&self.root, ray, &mut closest);
        closest
    }
}

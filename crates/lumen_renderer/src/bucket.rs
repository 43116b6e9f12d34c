//! Image tiling for parallel rendering.
//!
//! The frame is cut into square tiles that rayon renders independently.
//! Tiles are ordered center first so a cancelled render still shows the
//! middle of the frame.

use lumen_core::Color;

use crate::renderer::{render_pixel, RenderContext};
use crate::rng::XorShift32;

/// A rectangular tile of the image, clipped to the frame edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bucket {
    /// Absolute pixel coordinates covered by this tile, row by row.
    pub fn coords(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x, y)))
    }

    /// Squared distance from the tile center to `(cx, cy)`.
    fn distance_sq(&self, cx: f32, cy: f32) -> f32 {
        let dx = self.x as f32 + self.width as f32 * 0.5 - cx;
        let dy = self.y as f32 + self.height as f32 * 0.5 - cy;
        dx * dx + dy * dy
    }
}

/// Tile a `width` x `height` frame, nearest-to-center tiles first.
///
/// Tiles at equal distance keep their row-major order.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);

    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width).step_by(size as usize).map(move |x| Bucket {
                x,
                y,
                width: size.min(width - x),
                height: size.min(height - y),
            })
        })
        .collect();

    let (cx, cy) = (width as f32 * 0.5, height as f32 * 0.5);
    buckets.sort_by(|a, b| a.distance_sq(cx, cy).total_cmp(&b.distance_sq(cx, cy)));
    buckets
}

/// Render one tile, returning its pixels row by row.
///
/// Each pixel seeds its own stream from the frame seed and its index in
/// the full image, so the result never depends on scheduling.
pub fn render_bucket(bucket: &Bucket, ctx: &RenderContext) -> Vec<Color> {
    let width = ctx.config.width;
    bucket
        .coords()
        .map(|(x, y)| {
            let mut rng = XorShift32::for_pixel(ctx.config.seed, y * width + x);
            render_pixel(ctx, x, y, &mut rng).color
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered(buckets: &[Bucket]) -> usize {
        buckets.iter().map(|b| b.coords().count()).sum()
    }

    #[test]
    fn test_buckets_cover_frame() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4);
        assert_eq!(covered(&buckets), 128 * 128);
    }

    #[test]
    fn test_edge_buckets_are_clipped() {
        let buckets = generate_buckets(100, 70, 64);
        assert_eq!(buckets.len(), 4);
        assert_eq!(covered(&buckets), 100 * 70);
        assert!(buckets.iter().all(|b| b.x + b.width <= 100 && b.y + b.height <= 70));
    }

    #[test]
    fn test_center_bucket_first() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9);
        assert_eq!((buckets[0].x, buckets[0].y), (64, 64));
        // Edge midpoints before corners
        assert!(buckets[1..5].iter().all(|b| b.x == 64 || b.y == 64));
    }

    #[test]
    fn test_coords_row_major() {
        let bucket = Bucket { x: 3, y: 5, width: 2, height: 2 };
        let coords: Vec<_> = bucket.coords().collect();
        assert_eq!(coords, [(3, 5), (4, 5), (3, 6), (4, 6)]);
    }

    #[test]
    fn test_empty_image_has_no_buckets() {
        assert!(generate_buckets(0, 10, 16).is_empty());
        assert!(generate_buckets(10, 0, 16).is_empty());
    }
}

//! Per-worker xorshift random stream.
//!
//! Every logical worker (a pixel's sample loop) owns exactly one
//! [`XorShift32`]. It is never shared, so two workers can't interfere and a
//! render is reproducible from its seeds alone.

use lumen_math::{orthonormal_basis, Vec2, Vec3};
use rand::RngCore;
use std::f32::consts::TAU;

/// 32-bit xorshift generator. The whole state is one `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Largest f32 below 1.0.
    const ONE_MINUS_EPSILON: f32 = 1.0 - f32::EPSILON / 2.0;

    /// Substitute for a zero seed. Zero is a fixed point of xorshift.
    const ZERO_SEED_REPLACEMENT: u32 = 0x2545_F491;

    /// Create a generator from a seed.
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 {
            Self::ZERO_SEED_REPLACEMENT
        } else {
            seed
        };
        Self { state }
    }

    /// Derive an independent, non-zero seed for one pixel of a frame.
    ///
    /// Wang hash of the pixel index mixed with the frame seed, so adjacent
    /// pixels don't start on correlated streams.
    pub fn for_pixel(base_seed: u32, index: u32) -> Self {
        let mut h = index ^ base_seed.rotate_left(16);
        h = (h ^ 61) ^ (h >> 16);
        h = h.wrapping_mul(9);
        h ^= h >> 4;
        h = h.wrapping_mul(0x27d4_eb2d);
        h ^= h >> 15;
        Self::new(h)
    }

    /// Current state. Feeding it back into [`XorShift32::new`] resumes the stream.
    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advance the state and return it.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 17;
        x ^= x >> 5;
        self.state = x;
        x
    }

    /// Uniform float in `[0, 1)`; never returns exactly 1.0.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        let x = self.next_u32();
        ((x as f64 / u32::MAX as f64) as f32).min(Self::ONE_MINUS_EPSILON)
    }

    /// Fair coin from the low bit.
    #[inline]
    pub fn next_bool(&mut self) -> bool {
        self.next_u32() & 1 == 1
    }

    /// Uniform point in the unit disk (area density).
    pub fn next_unit_disk(&mut self) -> Vec2 {
        let r = self.next_f32().sqrt();
        let theta = TAU * self.next_f32();
        Vec2::new(r * theta.cos(), r * theta.sin())
    }

    /// Cosine-weighted direction in the hemisphere around `normal`, pdf `cos(theta) / pi`.
    pub fn next_cosine_hemisphere(&mut self, normal: Vec3) -> Vec3 {
        let disk = self.next_unit_disk();
        let z = (1.0 - disk.length_squared()).max(0.0).sqrt();
        let (tangent, bitangent) = orthonormal_basis(normal);
        (tangent * disk.x + bitangent * disk.y + normal * z).normalize()
    }

    /// Exponentially distributed free-flight distance.
    ///
    /// A non-positive coefficient never scatters and yields `+inf`.
    #[inline]
    pub fn next_free_flight(&mut self, scattering_coef: f32) -> f32 {
        let u = self.next_f32();
        if scattering_coef <= 0.0 {
            return f32::INFINITY;
        }
        -u.ln() / scattering_coef
    }
}

impl RngCore for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        XorShift32::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let hi = XorShift32::next_u32(self) as u64;
        let lo = XorShift32::next_u32(self) as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = XorShift32::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

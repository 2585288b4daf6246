// THEORY:
// The `ColorSample` module is the most fundamental unit of the perception system.
// It is a "dumb" data container for a single 3-channel color measurement, held as
// floating point so that the clustering math downstream stays numerically stable.
//
// Key architectural principles:
// 1.  **Fixed Channel Order**: Channels are R,G,B everywhere, the same order the
//     `image` crate uses for its pixel buffers. The palette the caller supplies and
//     the pixels sampled from the image share this convention; the whole pipeline
//     is color-space sensitive, so the order is fixed here and nowhere else.
// 2.  **Floating-Point Domain**: Channels keep the 0-255 byte domain but are stored
//     as `f32`. Centroid updates average many samples, and byte arithmetic would
//     lose the fractions that distance comparisons depend on.
// 3.  **Comparative Value**: Like the rest of the value types, a `ColorSample` is
//     meaningless on its own; its purpose is measuring distance to other samples
//     (pixel-to-centroid during clustering, centroid-to-target during matching).

use image::Rgb;
use serde::{Deserialize, Serialize};

pub type Channel = f32;
pub type SquaredDistance = f64;

/// A "dumb" data container for one 3-channel color measurement (R,G,B order,
/// 0-255 domain, floating point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorSample {
    /// The red channel value (0.0-255.0).
    pub red: Channel,
    /// The green channel value (0.0-255.0).
    pub green: Channel,
    /// The blue channel value (0.0-255.0).
    pub blue: Channel,
}

impl ColorSample {
    pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
        Self { red, green, blue }
    }

    /// Squared Euclidean distance in color space. Cheaper than `distance` and
    /// order-equivalent, so the clustering hot loop uses this form.
    pub fn squared_distance(&self, other: &ColorSample) -> SquaredDistance {
        let dr = (self.red - other.red) as f64;
        let dg = (self.green - other.green) as f64;
        let db = (self.blue - other.blue) as f64;
        dr * dr + dg * dg + db * db
    }

    /// Euclidean distance in color space.
    pub fn distance(&self, other: &ColorSample) -> f64 {
        self.squared_distance(other).sqrt()
    }

    /// Converts back to a byte pixel, rounding and clamping each channel to the
    /// 0-255 range. Centroids are convex combinations of samples, so clamping
    /// only matters for hand-built palette values outside the byte domain.
    pub fn to_rgb(&self) -> Rgb<u8> {
        Rgb([
            self.red.round().clamp(0.0, 255.0) as u8,
            self.green.round().clamp(0.0, 255.0) as u8,
            self.blue.round().clamp(0.0, 255.0) as u8,
        ])
    }
}

impl From<&Rgb<u8>> for ColorSample {
    fn from(pixel: &Rgb<u8>) -> Self {
        Self {
            red: pixel.0[0] as Channel,
            green: pixel.0[1] as Channel,
            blue: pixel.0[2] as Channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = ColorSample::new(255.0, 0.0, 0.0);
        let b = ColorSample::new(0.0, 0.0, 255.0);
        assert_eq!(a.distance(&b), b.distance(&a));
        assert!((a.distance(&b) - (2.0 * 255.0_f64 * 255.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = ColorSample::new(12.5, 200.0, 63.0);
        assert_eq!(a.squared_distance(&a), 0.0);
    }

    #[test]
    fn rgb_round_trip() {
        let pixel = Rgb([17u8, 130, 250]);
        let sample = ColorSample::from(&pixel);
        assert_eq!(sample.to_rgb(), pixel);
    }

    #[test]
    fn to_rgb_clamps_out_of_domain_channels() {
        let sample = ColorSample::new(-4.0, 300.0, 127.6);
        assert_eq!(sample.to_rgb(), Rgb([0u8, 255, 128]));
    }
}

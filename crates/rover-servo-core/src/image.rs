use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Borrowed interleaved RGB frame.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major RGB, len = w*h*3
}

impl RgbImageView<'_> {
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

#[derive(Clone, Debug)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbImage {
    pub fn view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Single-channel image, used for binary masks (0 or 255).
#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] != 0
    }
}

/// Interleaved HSV frame in the 8-bit convention: H in [0, 180), S and V in [0, 255].
#[derive(Clone, Debug)]
pub struct HsvImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl HsvImage {
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Gaussian smoothing applied before color conversion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlurParams {
    /// Kernel side length in pixels; even values are bumped to the next odd size.
    /// `0` or `1` disables smoothing.
    pub kernel_size: usize,
    /// Standard deviation in pixels. Non-positive values derive sigma from the kernel size.
    pub sigma: f32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            sigma: 5.0,
        }
    }
}

/// Smooth a frame and convert it to HSV.
///
/// The localizers all threshold the same prepared frame, so this runs once
/// per control cycle.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, blur), fields(width = src.width, height = src.height))
)]
pub fn prepare_frame(src: &RgbImageView<'_>, blur: &BlurParams) -> HsvImage {
    let smoothed = gaussian_blur(src, blur);
    rgb_to_hsv(&smoothed.view())
}

fn gaussian_kernel(params: &BlurParams) -> Vec<f32> {
    let radius = params.kernel_size / 2;
    let size = 2 * radius + 1;
    let sigma = if params.sigma > 0.0 {
        params.sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let mut k: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = k.iter().sum();
    for w in &mut k {
        *w /= sum;
    }
    k
}

/// Reflect-101 border: `dcb|abcd|cba`.
#[inline]
fn reflect101(mut i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

fn gaussian_blur(src: &RgbImageView<'_>, params: &BlurParams) -> RgbImage {
    let (w, h) = (src.width, src.height);
    if params.kernel_size <= 1 || w == 0 || h == 0 {
        return RgbImage {
            width: w,
            height: h,
            data: src.data.to_vec(),
        };
    }

    let kernel = gaussian_kernel(params);
    let radius = (kernel.len() / 2) as isize;

    // Horizontal pass into f32, vertical pass back to u8.
    let mut tmp = vec![0.0f32; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (k, &wt) in kernel.iter().enumerate() {
                let sx = reflect101(x as isize + k as isize - radius, w);
                let px = src.pixel(sx, y);
                for c in 0..3 {
                    acc[c] += wt * px[c] as f32;
                }
            }
            let o = (y * w + x) * 3;
            tmp[o..o + 3].copy_from_slice(&acc);
        }
    }

    let mut out = vec![0u8; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (k, &wt) in kernel.iter().enumerate() {
                let sy = reflect101(y as isize + k as isize - radius, h);
                let o = (sy * w + x) * 3;
                for c in 0..3 {
                    acc[c] += wt * tmp[o + c];
                }
            }
            let o = (y * w + x) * 3;
            for c in 0..3 {
                out[o + c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    RgbImage {
        width: w,
        height: h,
        data: out,
    }
}

#[inline]
fn hsv_from_rgb([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let mut hue = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    let mut h8 = (hue / 2.0).round() as u16;
    if h8 >= 180 {
        h8 -= 180;
    }
    [h8 as u8, s.round() as u8, v as u8]
}

fn rgb_to_hsv(src: &RgbImageView<'_>) -> HsvImage {
    let mut data = Vec::with_capacity(src.width * src.height * 3);
    for px in src.data.chunks_exact(3) {
        data.extend_from_slice(&hsv_from_rgb([px[0], px[1], px[2]]));
    }
    HsvImage {
        width: src.width,
        height: src.height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, rgb: [u8; 3]) -> RgbImage {
        RgbImage {
            width,
            height,
            data: rgb.repeat(width * height),
        }
    }

    #[test]
    fn primaries_map_to_expected_hues() {
        assert_eq!(hsv_from_rgb([255, 0, 0]), [0, 255, 255]);
        assert_eq!(hsv_from_rgb([0, 255, 0]), [60, 255, 255]);
        assert_eq!(hsv_from_rgb([0, 0, 255]), [120, 255, 255]);
        assert_eq!(hsv_from_rgb([0, 0, 0]), [0, 0, 0]);
        assert_eq!(hsv_from_rgb([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel(&BlurParams::default());
        assert_eq!(k.len(), 5);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((k[0] - k[4]).abs() < 1e-7);
        assert!(k[2] > k[1] && k[1] > k[0]);
    }

    #[test]
    fn reflect101_mirrors_without_repeating_edge() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(-2, 5), 2);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(6, 5), 2);
        assert_eq!(reflect101(3, 1), 0);
    }

    #[test]
    fn blur_preserves_uniform_frame() {
        let img = solid(7, 4, [10, 200, 90]);
        let out = gaussian_blur(&img.view(), &BlurParams::default());
        assert_eq!(out.data, img.data);
    }

    #[test]
    fn prepare_frame_keeps_dimensions() {
        let img = solid(9, 3, [0, 0, 255]);
        let hsv = prepare_frame(&img.view(), &BlurParams::default());
        assert_eq!((hsv.width, hsv.height), (9, 3));
        assert_eq!(hsv.pixel(4, 1), [120, 255, 255]);
    }
}

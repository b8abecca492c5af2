//! Separable cubic resampling of interleaved float images
//!
//! Downsampling uses the Mitchell-Netravali filter, upsampling Catmull-Rom.
//! Edge pixels are clamped. Output values are not clamped, so HDR samples
//! above 1.0 survive.

/// Taps of one output sample along one axis
struct Contribution {
    taps: Vec<(usize, f32)>,
}

/// Resize `src` (`width` x `height`, `channels` interleaved) to `new_width` x `new_height`
pub(crate) fn resize(
    src: &[f32],
    width: u32,
    height: u32,
    channels: usize,
    new_width: u32,
    new_height: u32,
) -> Vec<f32> {
    let (width, height) = (width as usize, height as usize);
    let (new_width, new_height) = (new_width as usize, new_height as usize);

    let horizontal = contributions(width, new_width);
    let mut tmp = vec![0.0f32; new_width * height * channels];
    for y in 0..height {
        let row = &src[y * width * channels..(y + 1) * width * channels];
        let out = &mut tmp[y * new_width * channels..(y + 1) * new_width * channels];
        for (x, contribution) in horizontal.iter().enumerate() {
            for &(sx, weight) in &contribution.taps {
                for c in 0..channels {
                    out[x * channels + c] += row[sx * channels + c] * weight;
                }
            }
        }
    }

    let vertical = contributions(height, new_height);
    let stride = new_width * channels;
    let mut dst = vec![0.0f32; stride * new_height];
    for (y, contribution) in vertical.iter().enumerate() {
        let out = &mut dst[y * stride..(y + 1) * stride];
        for &(sy, weight) in &contribution.taps {
            let row = &tmp[sy * stride..(sy + 1) * stride];
            for (o, &v) in out.iter_mut().zip(row) {
                *o += v * weight;
            }
        }
    }

    dst
}

fn contributions(src_len: usize, dst_len: usize) -> Vec<Contribution> {
    const SUPPORT: f64 = 2.0;

    let scale = dst_len as f64 / src_len as f64;
    let downsampling = scale < 1.0;
    // Widen the kernel when shrinking so every source pixel contributes
    let filter_scale = if downsampling { 1.0 / scale } else { 1.0 };
    let radius = SUPPORT * filter_scale;
    let last = src_len.saturating_sub(1) as i64;

    (0..dst_len)
        .map(|i| {
            let center = (i as f64 + 0.5) / scale;
            let left = (center - radius).floor() as i64;
            let right = (center + radius).ceil() as i64;

            let mut taps: Vec<(usize, f32)> = Vec::new();
            let mut total = 0.0f64;
            for j in left..=right {
                let x = (j as f64 + 0.5 - center) / filter_scale;
                let weight = if downsampling {
                    mitchell(x)
                } else {
                    catmull_rom(x)
                };
                if weight == 0.0 {
                    continue;
                }
                total += weight;

                let index = j.clamp(0, last) as usize;
                match taps.iter_mut().find(|(k, _)| *k == index) {
                    Some(tap) => tap.1 += weight as f32,
                    None => taps.push((index, weight as f32)),
                }
            }

            if total != 0.0 {
                let norm = (1.0 / total) as f32;
                for tap in &mut taps {
                    tap.1 *= norm;
                }
            }
            Contribution { taps }
        })
        .collect()
}

/// Mitchell-Netravali cubic, B = C = 1/3
fn mitchell(x: f64) -> f64 {
    cubic_bc(x, 1.0 / 3.0, 1.0 / 3.0)
}

/// Catmull-Rom spline, B = 0, C = 1/2
fn catmull_rom(x: f64) -> f64 {
    cubic_bc(x, 0.0, 0.5)
}

fn cubic_bc(x: f64, b: f64, c: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x
            + (-18.0 + 12.0 * b + 6.0 * c) * x * x
            + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x * x * x
            + (6.0 * b + 30.0 * c) * x * x
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_size_is_identity() {
        let src: Vec<f32> = (0..12).map(|v| v as f32 * 0.25).collect();
        let dst = resize(&src, 3, 2, 2, 3, 2);
        assert_eq!(dst.len(), src.len());
        for (a, b) in src.iter().zip(&dst) {
            assert!((a - b).abs() < 1e-5, "{a} != {b}");
        }
    }

    #[test]
    fn test_uniform_image_stays_uniform() {
        let src = vec![0.75f32; 16 * 8 * 4];
        let dst = resize(&src, 16, 8, 4, 5, 2);
        assert_eq!(dst.len(), 5 * 2 * 4);
        assert!(dst.iter().all(|v| (v - 0.75).abs() < 1e-5));
    }

    #[test]
    fn test_hdr_values_not_clamped() {
        let src = vec![8.0f32; 4 * 4];
        let dst = resize(&src, 4, 4, 1, 2, 2);
        assert!(dst.iter().all(|v| (v - 8.0).abs() < 1e-4));
    }

    #[test]
    fn test_upsampling_grows_output() {
        let src = vec![0.0, 1.0];
        let dst = resize(&src, 2, 1, 1, 4, 1);
        assert_eq!(dst.len(), 4);
        assert!(dst[0] < dst[3]);
    }

    #[test]
    fn test_filter_weights() {
        assert!((catmull_rom(0.0) - 1.0).abs() < 1e-12);
        assert!(catmull_rom(1.0).abs() < 1e-12);
        assert!(catmull_rom(2.0).abs() < 1e-12);
        assert!((mitchell(0.0) - 8.0 / 9.0).abs() < 1e-12);
    }
}

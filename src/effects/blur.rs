use rayon::prelude::*;

use crate::foundation::error::{CutframeError, CutframeResult};

/// Kernel half-width for a Gaussian of standard deviation `sigma`.
pub fn kernel_radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Gaussian blur of a premultiplied RGBA8 buffer.
///
/// `sigma` is the standard deviation in pixels of the buffer being blurred. Callers that draw
/// through a scaled context must not pre-multiply it by that scale.
pub fn blur_rgba8_premul(src: &[u8], width: u32, height: u32, sigma: f32) -> CutframeResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| CutframeError::evaluation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(CutframeError::evaluation(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    let radius = kernel_radius_for_sigma(sigma);
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CutframeResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CutframeError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(CutframeError::evaluation("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let row_len = (width as usize) * 4;
    dst.par_chunks_exact_mut(row_len)
        .zip(src.par_chunks_exact(row_len))
        .for_each(|(dst_row, src_row)| {
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                    let idx = (sx as usize) * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(src_row[idx + c]);
                    }
                }
                let out_idx = (x as usize) * 4;
                for c in 0..4 {
                    dst_row[out_idx + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as usize;
    let h = height as i32;
    dst.par_chunks_exact_mut(w * 4)
        .enumerate()
        .for_each(|(y, dst_row)| {
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = (y as i32 + ki as i32 - radius).clamp(0, h - 1);
                    let idx = ((sy as usize) * w + x) * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                    }
                }
                for c in 0..4 {
                    dst_row[x * 4 + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interpolation and array utilities shared by tracks.

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two numbers
    #[inline]
    pub fn lerp(p0: f64, p1: f64, w: f64) -> f64 {
        p0 + (p1 - p0) * w
    }

    /// Discrete step: the destination once the weight reaches one half
    #[inline]
    pub fn step<T: Clone>(p0: &T, p1: &T, w: f64) -> T {
        if w >= 0.5 {
            p1.clone()
        } else {
            p0.clone()
        }
    }

    /// Elementwise lerp of flat arrays into a reused output buffer
    pub fn lerp_1d(out: &mut Vec<f64>, p0: &[f64], p1: &[f64], w: f64) {
        let len = p0.len().min(p1.len());
        out.resize(len, 0.0);
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = Self::lerp(p0[i], p1[i], w);
        }
    }

    /// Elementwise lerp of nested arrays into a reused output buffer
    pub fn lerp_2d(out: &mut Vec<Vec<f64>>, p0: &[Vec<f64>], p1: &[Vec<f64>], w: f64) {
        let len = p0.len().min(p1.len());
        out.resize_with(len, Vec::new);
        for (i, row) in out.iter_mut().enumerate() {
            Self::lerp_1d(row, &p0[i], &p1[i], w);
        }
    }

    /// Signed elementwise add: `out[i] = p0[i] + sign * p1[i]`
    ///
    /// Entries missing from `p1` contribute nothing.
    pub fn add_1d(out: &mut Vec<f64>, p0: &[f64], p1: &[f64], sign: f64) {
        out.resize(p0.len(), 0.0);
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = p0[i] + sign * p1.get(i).copied().unwrap_or(0.0);
        }
    }

    /// Signed elementwise add of nested arrays
    pub fn add_2d(out: &mut Vec<Vec<f64>>, p0: &[Vec<f64>], p1: &[Vec<f64>], sign: f64) {
        out.resize_with(p0.len(), Vec::new);
        for (i, row) in out.iter_mut().enumerate() {
            match p1.get(i) {
                Some(other) => Self::add_1d(row, &p0[i], other, sign),
                None => row.clone_from(&p0[i]),
            }
        }
    }

    /// Reconcile `arr` against the final keyframe array `last`.
    ///
    /// Shorter arrays borrow the missing tail from `last`, longer ones are cut.
    /// `NaN` entries then inherit the matching entry of `last`.
    pub fn fill_1d(arr: &mut Vec<f64>, last: &[f64]) {
        if arr.len() > last.len() {
            arr.truncate(last.len());
        } else if arr.len() < last.len() {
            arr.extend_from_slice(&last[arr.len()..]);
        }
        for (slot, fallback) in arr.iter_mut().zip(last) {
            if slot.is_nan() {
                *slot = *fallback;
            }
        }
    }

    /// Reconcile a nested array row by row against `last`
    pub fn fill_2d(arr: &mut Vec<Vec<f64>>, last: &[Vec<f64>]) {
        if arr.len() > last.len() {
            arr.truncate(last.len());
        } else if arr.len() < last.len() {
            arr.extend(last[arr.len()..].iter().cloned());
        }
        for (row, last_row) in arr.iter_mut().zip(last) {
            Self::fill_1d(row, last_row);
        }
    }
}

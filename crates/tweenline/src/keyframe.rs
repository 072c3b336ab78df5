// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions.

use crate::easing::Easing;
use crate::value::PropValue;

/// A keyframe in a track
#[derive(Debug, Clone)]
pub struct Keyframe {
    /// Time in milliseconds from the start of the animation
    pub time: f64,
    /// Value used for interpolation (colors are stored as `[r, g, b, a]`)
    pub value: PropValue,
    /// Value exactly as declared
    pub raw_value: PropValue,
    /// Time normalized against the track duration, set by `Track::prepare`
    pub percent: f64,
    /// Easing of the segment ending at this keyframe
    pub easing: Option<Easing>,
    /// Delta from the first keyframe when the track composes additively
    pub additive_value: Option<PropValue>,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: f64, value: PropValue, raw_value: PropValue) -> Self {
        Self {
            time,
            value,
            raw_value,
            percent: 0.0,
            easing: None,
            additive_value: None,
        }
    }

    /// Set the incoming easing
    pub fn with_easing(mut self, easing: Option<Easing>) -> Self {
        self.easing = easing;
        self
    }

    /// Apply the incoming easing to a segment weight
    #[inline]
    pub fn ease(&self, w: f64) -> f64 {
        match &self.easing {
            Some(easing) => easing.apply(w),
            None => w,
        }
    }
}

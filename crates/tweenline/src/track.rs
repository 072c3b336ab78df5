// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-property keyframe tracks.
//!
//! A track owns the keyframes of one property, decides whether they can be
//! interpolated, and writes the value for a given playback percent onto the
//! target. Tracks may compose additively on top of another track, in which
//! case they animate a delta from their first keyframe instead of an
//! absolute value.

use crate::color;
use crate::easing::Easing;
use crate::interpolate::Interpolation;
use crate::keyframe::Keyframe;
use crate::target::AnimationTarget;
use crate::value::{ArrayDim, PropValue};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Track shared between its animator and dependent additive tracks
pub type SharedTrack = Rc<RefCell<Track>>;

/// Reused interpolation buffers
#[derive(Debug, Default)]
struct Scratch {
    flat: Vec<f64>,
    nested: Vec<Vec<f64>>,
}

/// Which scratch slot holds the interpolated value
enum Resolved {
    Number(f64),
    Flat,
    Nested,
}

/// Keyframe track for one property
#[derive(Debug)]
pub struct Track {
    prop_name: String,
    keyframes: Vec<Keyframe>,
    array_dim: ArrayDim,
    is_color: bool,
    interpolable: bool,
    finished: bool,
    needs_sort: bool,
    max_time: f64,
    additive_source: Option<Weak<RefCell<Track>>>,
    last_frame: usize,
    last_percent: f64,
    scratch: Scratch,
}

impl Track {
    /// Create an empty track
    pub fn new(prop_name: impl Into<String>) -> Self {
        Self {
            prop_name: prop_name.into(),
            keyframes: Vec::new(),
            array_dim: ArrayDim::Scalar,
            is_color: false,
            interpolable: true,
            finished: false,
            needs_sort: false,
            max_time: 0.0,
            additive_source: None,
            last_frame: 0,
            last_percent: 0.0,
            scratch: Scratch::default(),
        }
    }

    /// Create an empty track behind a shared handle
    pub fn shared(prop_name: impl Into<String>) -> SharedTrack {
        Rc::new(RefCell::new(Self::new(prop_name)))
    }

    /// Add a keyframe.
    ///
    /// Returns `None` when the keyframe is rejected: a NaN number, a value
    /// whose shape or type conflicts with the track, or a value equal to the
    /// preceding keyframe.
    pub fn add_keyframe(
        &mut self,
        time: f64,
        value: PropValue,
        easing: Option<Easing>,
    ) -> Option<&Keyframe> {
        let mut parsed = value.clone();

        if self.interpolable {
            let dim = value.array_dim();
            let has_frames = !self.keyframes.is_empty();

            match &value {
                PropValue::Array1(_) | PropValue::Array2(_) => {
                    if has_frames && dim != self.array_dim {
                        self.degrade("array dimension changed");
                        return None;
                    }
                    self.array_dim = dim;
                    if value.is_empty_array() {
                        self.degrade("array holds no numbers");
                    }
                }
                _ if self.array_dim != ArrayDim::Scalar => {
                    self.degrade("scalar added to array track");
                    return None;
                }
                PropValue::Number(n) => {
                    if n.is_nan() {
                        self.degrade("NaN value");
                        return None;
                    }
                    if has_frames && self.is_color {
                        self.degrade("number added to color track");
                        return None;
                    }
                }
                PropValue::Text(text) => match color::parse(text) {
                    Some(rgba) => {
                        if has_frames && !self.is_color {
                            self.degrade("color added to numeric track");
                            return None;
                        }
                        self.is_color = true;
                        parsed = PropValue::Array1(rgba.to_vec());
                    }
                    None => self.degrade("text is not a color"),
                },
            }
        }

        // Nested arrays are never treated as repeats
        let comparable = !matches!(value, PropValue::Array2(_));
        if let Some(prev) = self.keyframes.last().filter(|_| comparable) {
            let duplicate = if self.interpolable {
                prev.value == parsed
            } else {
                prev.raw_value == value
            };
            if duplicate {
                return None;
            }
        }

        if time < self.max_time {
            self.needs_sort = true;
        } else {
            self.max_time = time;
        }

        self.keyframes.push(Keyframe::new(time, parsed, value).with_easing(easing));
        self.keyframes.last()
    }

    fn degrade(&mut self, reason: &str) {
        if self.interpolable {
            tracing::debug!(prop = %self.prop_name, reason, "track falls back to discrete steps");
            self.interpolable = false;
        }
    }

    /// Finalize the track before playback.
    ///
    /// Sorts keyframes, normalizes their times against `duration`, reconciles
    /// array shapes against the final keyframe and, when `additive_source` is
    /// compatible, links it and precomputes per-keyframe deltas.
    pub fn prepare(&mut self, duration: f64, additive_source: Option<&SharedTrack>) {
        if self.needs_sort {
            // Stable: equal times keep declaration order
            self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
            self.needs_sort = false;
        }

        for kf in &mut self.keyframes {
            kf.percent = if duration > 0.0 {
                (kf.time / duration).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }

        if self.interpolable && self.array_dim != ArrayDim::Scalar {
            if let Some((last, rest)) = self.keyframes.split_last_mut() {
                for kf in rest {
                    match (&mut kf.value, &last.value) {
                        (PropValue::Array1(arr), PropValue::Array1(last)) => {
                            Interpolation::fill_1d(arr, last);
                        }
                        (PropValue::Array2(arr), PropValue::Array2(last)) => {
                            Interpolation::fill_2d(arr, last);
                        }
                        _ => {}
                    }
                }
            }
        }

        self.additive_source = None;
        let Some(source) = additive_source else {
            return;
        };
        let compatible = source.try_borrow().is_ok_and(|src| {
            src.interpolable
                && !src.finished
                && src.array_dim == self.array_dim
                && src.is_color == self.is_color
        });
        if compatible && self.needs_animate() {
            self.additive_source = Some(Rc::downgrade(source));
            self.compute_additive_values();
        }
    }

    fn compute_additive_values(&mut self) {
        let Some(start) = self.keyframes.first().map(|kf| kf.value.clone()) else {
            return;
        };
        for kf in &mut self.keyframes {
            kf.additive_value = match (&kf.value, &start) {
                (PropValue::Number(value), PropValue::Number(start)) => {
                    Some(PropValue::Number(value - start))
                }
                (PropValue::Array1(value), PropValue::Array1(start)) => {
                    let mut delta = Vec::new();
                    Interpolation::add_1d(&mut delta, value, start, -1.0);
                    Some(PropValue::Array1(delta))
                }
                (PropValue::Array2(value), PropValue::Array2(start)) => {
                    let mut delta = Vec::new();
                    Interpolation::add_2d(&mut delta, value, start, -1.0);
                    Some(PropValue::Array2(delta))
                }
                _ => None,
            };
        }
    }

    /// Write the value at `percent` onto `target`
    pub fn step<T: AnimationTarget + ?Sized>(&mut self, target: &mut T, percent: f64) {
        if self.finished {
            return;
        }

        if self
            .additive_source
            .as_ref()
            .is_some_and(Self::source_finished)
        {
            self.additive_source = None;
        }
        let additive = self.additive_source.is_some();

        match self.keyframes.len() {
            0 => return,
            1 => {
                target.set(&self.prop_name, self.keyframes[0].raw_value.clone());
                return;
            }
            _ => {}
        }

        let Some(idx) = self.seek(percent) else {
            return;
        };
        self.last_frame = idx;
        self.last_percent = percent;

        let frame = &self.keyframes[idx];
        let next = &self.keyframes[idx + 1];
        let range = next.percent - frame.percent;
        if range == 0.0 {
            return;
        }
        let w = next.ease(((percent - frame.percent) / range).min(1.0));

        if !self.interpolable {
            let value = Interpolation::step(&frame.raw_value, &next.raw_value, w);
            target.set(&self.prop_name, value);
            return;
        }

        let (Some(from), Some(to)) = (
            Self::segment_value(frame, additive),
            Self::segment_value(next, additive),
        ) else {
            return;
        };

        let resolved = match (from, to) {
            (PropValue::Number(a), PropValue::Number(b)) => {
                Resolved::Number(Interpolation::lerp(*a, *b, w))
            }
            (PropValue::Array1(a), PropValue::Array1(b)) => {
                Interpolation::lerp_1d(&mut self.scratch.flat, a, b, w);
                Resolved::Flat
            }
            (PropValue::Array2(a), PropValue::Array2(b)) => {
                Interpolation::lerp_2d(&mut self.scratch.nested, a, b, w);
                Resolved::Nested
            }
            _ => return,
        };

        if additive {
            self.add_to_target(target, resolved);
        } else {
            self.write_to_target(target, resolved);
        }
    }

    fn segment_value(kf: &Keyframe, additive: bool) -> Option<&PropValue> {
        if additive {
            kf.additive_value.as_ref()
        } else {
            Some(&kf.value)
        }
    }

    /// Resolve the segment enclosing `percent`, starting from the cached one
    fn seek(&self, percent: f64) -> Option<usize> {
        let len = self.keyframes.len();
        if len < 2 {
            return None;
        }
        let last_segment = len - 2;

        if percent < 0.0 {
            return Some(0);
        }

        if percent < self.last_percent {
            let mut idx = (self.last_frame + 1).min(last_segment);
            while self.keyframes[idx].percent > percent {
                idx = idx.checked_sub(1)?;
            }
            return Some(idx.min(last_segment));
        }

        let mut idx = self.last_frame.min(last_segment);
        while idx + 1 < len && self.keyframes[idx + 1].percent <= percent {
            idx += 1;
        }
        Some(idx.min(last_segment))
    }

    fn write_to_target<T: AnimationTarget + ?Sized>(&self, target: &mut T, resolved: Resolved) {
        let value = match resolved {
            Resolved::Number(v) => PropValue::Number(v),
            Resolved::Flat if self.is_color => PropValue::Text(color::format(&self.scratch.flat)),
            Resolved::Flat => PropValue::Array1(self.scratch.flat.clone()),
            Resolved::Nested => PropValue::Array2(self.scratch.nested.clone()),
        };
        target.set(&self.prop_name, value);
    }

    /// Compose the interpolated delta onto the target's current value
    fn add_to_target<T: AnimationTarget + ?Sized>(&self, target: &mut T, resolved: Resolved) {
        let Some(current) = target.get(&self.prop_name) else {
            return;
        };

        let value = match (resolved, current) {
            (Resolved::Number(delta), PropValue::Number(v)) => PropValue::Number(v + delta),
            (Resolved::Flat, PropValue::Text(text)) if self.is_color => {
                let Some(rgba) = color::parse(&text) else {
                    return;
                };
                let mut out = Vec::with_capacity(4);
                Interpolation::add_1d(&mut out, &rgba, &self.scratch.flat, 1.0);
                PropValue::Text(color::format(&out))
            }
            (Resolved::Flat, PropValue::Array1(values)) => {
                let mut out = Vec::with_capacity(values.len());
                Interpolation::add_1d(&mut out, &values, &self.scratch.flat, 1.0);
                PropValue::Array1(out)
            }
            (Resolved::Nested, PropValue::Array2(values)) => {
                let mut out = Vec::with_capacity(values.len());
                Interpolation::add_2d(&mut out, &values, &self.scratch.nested, 1.0);
                PropValue::Array2(out)
            }
            _ => return,
        };
        target.set(&self.prop_name, value);
    }

    fn source_finished(source: &Weak<RefCell<Track>>) -> bool {
        match source.upgrade() {
            Some(source) => source.try_borrow().is_ok_and(|src| src.finished),
            None => true,
        }
    }

    /// Replace the final keyframe's value and finalize again
    pub fn set_final_value(&mut self, value: PropValue, duration: f64) {
        if self.keyframes.len() < 2 {
            return;
        }
        let Some(last) = self.keyframes.pop() else {
            return;
        };
        self.max_time = self.keyframes.iter().map(|kf| kf.time).fold(0.0, f64::max);
        self.add_keyframe(last.time, value, last.easing);

        let source = self.additive_source.as_ref().and_then(Weak::upgrade);
        self.prepare(duration, source.as_ref());
    }

    /// Mark the track terminal, freezing its additive source as well
    pub fn set_finished(&mut self) {
        self.finished = true;
        if let Some(source) = self.additive_source.as_ref().and_then(Weak::upgrade) {
            if let Ok(mut source) = source.try_borrow_mut() {
                source.set_finished();
            }
        }
    }

    /// Whether the track has at least two keyframes to interpolate
    pub fn needs_animate(&self) -> bool {
        self.interpolable && self.keyframes.len() >= 2
    }

    /// Property name
    pub fn prop_name(&self) -> &str {
        &self.prop_name
    }

    /// All keyframes
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// First keyframe
    pub fn first_keyframe(&self) -> Option<&Keyframe> {
        self.keyframes.first()
    }

    /// Last keyframe
    pub fn last_keyframe(&self) -> Option<&Keyframe> {
        self.keyframes.last()
    }

    /// Array dimensionality
    pub fn array_dim(&self) -> ArrayDim {
        self.array_dim
    }

    /// Whether values are colors
    pub fn is_color(&self) -> bool {
        self.is_color
    }

    /// Whether values can be interpolated
    pub fn is_interpolable(&self) -> bool {
        self.interpolable
    }

    /// Whether the track has finished
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The linked additive source, if still alive
    pub fn additive_source(&self) -> Option<SharedTrack> {
        self.additive_source.as_ref().and_then(Weak::upgrade)
    }

    /// Value of a keyframe in display form (colors formatted)
    pub fn display_value(&self, kf: &Keyframe) -> PropValue {
        if !self.interpolable {
            return kf.raw_value.clone();
        }
        match &kf.value {
            PropValue::Array1(rgba) if self.is_color => PropValue::Text(color::format(rgba)),
            value => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::EasingCurve;
    use crate::target::PropertyMap;

    fn number(map: &PropertyMap, key: &str) -> f64 {
        map.number(key).unwrap()
    }

    #[test]
    fn test_scalar_step() {
        let mut track = Track::new("x");
        track.add_keyframe(0.0, 0.0.into(), None);
        track.add_keyframe(1000.0, 100.0.into(), None);
        track.prepare(1000.0, None);
        assert!(track.needs_animate());

        let mut target = PropertyMap::new();
        track.step(&mut target, 0.5);
        assert!((number(&target, "x") - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_array_shape_reconciliation() {
        let mut track = Track::new("points");
        track.add_keyframe(0.0, vec![1.0, 2.0].into(), None);
        track.add_keyframe(1000.0, vec![3.0, 4.0, 5.0, 6.0].into(), None);
        track.prepare(1000.0, None);

        assert_eq!(
            track.keyframes()[0].value,
            PropValue::Array1(vec![1.0, 2.0, 5.0, 6.0])
        );
        assert_eq!(
            track.keyframes()[1].value,
            PropValue::Array1(vec![3.0, 4.0, 5.0, 6.0])
        );

        let mut target = PropertyMap::new();
        track.step(&mut target, 0.0);
        assert_eq!(
            target.value("points"),
            Some(&PropValue::Array1(vec![1.0, 2.0, 5.0, 6.0]))
        );
    }

    #[test]
    fn test_nested_array_step() {
        let mut track = Track::new("shape");
        track.add_keyframe(0.0, vec![vec![0.0, 0.0], vec![f64::NAN, 10.0]].into(), None);
        track.add_keyframe(1000.0, vec![vec![10.0, 20.0], vec![4.0, 20.0]].into(), None);
        track.prepare(1000.0, None);

        let mut target = PropertyMap::new();
        track.step(&mut target, 0.5);
        assert_eq!(
            target.value("shape"),
            Some(&PropValue::Array2(vec![vec![5.0, 10.0], vec![4.0, 15.0]]))
        );
    }

    #[test]
    fn test_color_step() {
        let mut track = Track::new("fill");
        track.add_keyframe(0.0, "#000000".into(), None);
        track.add_keyframe(1000.0, "#ffffff".into(), None);
        track.prepare(1000.0, None);
        assert!(track.is_color());

        let mut target = PropertyMap::new();
        track.step(&mut target, 0.5);
        assert_eq!(target.text("fill"), Some("rgba(127,127,127,1)"));
    }

    #[test]
    fn test_discrete_step() {
        let mut track = Track::new("label");
        track.add_keyframe(0.0, "a".into(), None);
        track.add_keyframe(500.0, "b".into(), None);
        track.prepare(1000.0, None);
        assert!(!track.is_interpolable());
        assert!(!track.needs_animate());

        let mut target = PropertyMap::new();
        track.step(&mut target, 0.2);
        assert_eq!(target.text("label"), Some("a"));
        track.step(&mut target, 0.25);
        assert_eq!(target.text("label"), Some("b"));
        track.step(&mut target, 0.8);
        assert_eq!(target.text("label"), Some("b"));
    }

    #[test]
    fn test_dimension_change_degrades() {
        let mut track = Track::new("v");
        assert!(track.add_keyframe(0.0, vec![1.0, 2.0].into(), None).is_some());
        assert!(track.add_keyframe(500.0, 5.0.into(), None).is_none());
        assert!(!track.is_interpolable());
        assert_eq!(track.keyframes().len(), 1);

        // Never interpolable again
        track.add_keyframe(1000.0, vec![3.0, 4.0].into(), None);
        assert!(!track.is_interpolable());
    }

    #[test]
    fn test_nan_rejected() {
        let mut track = Track::new("x");
        assert!(track.add_keyframe(0.0, f64::NAN.into(), None).is_none());
        assert!(track.keyframes().is_empty());
        assert!(!track.is_interpolable());
    }

    #[test]
    fn test_color_and_number_mix_degrades() {
        let mut track = Track::new("fill");
        track.add_keyframe(0.0, "red".into(), None);
        assert!(track.add_keyframe(1000.0, 3.0.into(), None).is_none());
        assert!(!track.is_interpolable());
    }

    #[test]
    fn test_duplicate_dropped() {
        let mut track = Track::new("x");
        assert!(track.add_keyframe(0.0, 5.0.into(), None).is_some());
        assert!(track.add_keyframe(500.0, 5.0.into(), None).is_none());
        assert!(track.add_keyframe(1000.0, 6.0.into(), None).is_some());
        assert_eq!(track.keyframes().len(), 2);

        let mut colors = Track::new("fill");
        colors.add_keyframe(0.0, "#fff".into(), None);
        assert!(colors.add_keyframe(500.0, "white".into(), None).is_none());
    }

    #[test]
    fn test_nested_repeats_kept() {
        let mut track = Track::new("shape");
        let points = vec![vec![0.0, 1.0], vec![2.0, 3.0]];
        assert!(track.add_keyframe(0.0, points.clone().into(), None).is_some());
        assert!(track.add_keyframe(500.0, points.into(), None).is_some());
        assert_eq!(track.keyframes().len(), 2);

        let mut flat = Track::new("v");
        flat.add_keyframe(0.0, vec![1.0, 2.0].into(), None);
        assert!(flat.add_keyframe(500.0, vec![1.0, 2.0].into(), None).is_none());
    }

    #[test]
    fn test_unsorted_keyframes() {
        let mut track = Track::new("x");
        track.add_keyframe(1000.0, 100.0.into(), None);
        track.add_keyframe(0.0, 0.0.into(), None);
        track.add_keyframe(500.0, 20.0.into(), None);
        track.prepare(1000.0, None);

        let times: Vec<f64> = track.keyframes().iter().map(|kf| kf.time).collect();
        assert_eq!(times, vec![0.0, 500.0, 1000.0]);
        let percents: Vec<f64> = track.keyframes().iter().map(|kf| kf.percent).collect();
        assert_eq!(percents, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_easing_belongs_to_next_frame() {
        let mut track = Track::new("x");
        track.add_keyframe(0.0, 0.0.into(), Some(EasingCurve::CubicIn.into()));
        track.add_keyframe(1000.0, 100.0.into(), Some(EasingCurve::QuadraticIn.into()));
        track.prepare(1000.0, None);

        let mut target = PropertyMap::new();
        track.step(&mut target, 0.5);
        assert!((number(&target, "x") - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_backward_seek() {
        let mut track = Track::new("x");
        track.add_keyframe(0.0, 0.0.into(), None);
        track.add_keyframe(500.0, 10.0.into(), None);
        track.add_keyframe(1000.0, 30.0.into(), None);
        track.prepare(1000.0, None);

        let mut target = PropertyMap::new();
        track.step(&mut target, 0.9);
        assert!((number(&target, "x") - 26.0).abs() < 1e-9);
        track.step(&mut target, 0.25);
        assert!((number(&target, "x") - 5.0).abs() < 1e-9);
        track.step(&mut target, 0.75);
        assert!((number(&target, "x") - 20.0).abs() < 1e-9);
        track.step(&mut target, 0.5);
        assert!((number(&target, "x") - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_percent_uses_first_segment() {
        let mut track = Track::new("x");
        track.add_keyframe(0.0, 0.0.into(), None);
        track.add_keyframe(1000.0, 100.0.into(), None);
        track.prepare(1000.0, None);

        let mut target = PropertyMap::new();
        track.step(&mut target, -0.1);
        assert!((number(&target, "x") + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_segment_skipped() {
        let mut track = Track::new("x");
        track.add_keyframe(0.0, 0.0.into(), None);
        track.add_keyframe(1000.0, 10.0.into(), None);
        track.add_keyframe(1000.0, 20.0.into(), None);
        track.prepare(1000.0, None);

        let mut target = PropertyMap::new().with("x", -1.0);
        track.step(&mut target, 1.0);
        assert_eq!(target.number("x"), Some(-1.0));
    }

    #[test]
    fn test_single_keyframe_written() {
        let mut track = Track::new("x");
        track.add_keyframe(0.0, 7.0.into(), None);
        track.prepare(0.0, None);
        assert!(!track.needs_animate());

        let mut target = PropertyMap::new();
        track.step(&mut target, 0.3);
        assert_eq!(target.number("x"), Some(7.0));
    }

    fn prepared(name: &str, values: [PropValue; 2], source: Option<&SharedTrack>) -> SharedTrack {
        let track = Track::shared(name);
        {
            let mut t = track.borrow_mut();
            let [first, last] = values;
            t.add_keyframe(0.0, first, None);
            t.add_keyframe(1000.0, last, None);
            t.prepare(1000.0, source);
        }
        track
    }

    #[test]
    fn test_additive_number() {
        let source = prepared("x", [0.0.into(), 10.0.into()], None);
        let dependent = prepared("x", [10.0.into(), 15.0.into()], Some(&source));
        assert!(dependent.borrow().additive_source().is_some());

        let additive: Vec<_> = dependent
            .borrow()
            .keyframes()
            .iter()
            .map(|kf| kf.additive_value.clone())
            .collect();
        assert_eq!(
            additive,
            vec![Some(PropValue::Number(0.0)), Some(PropValue::Number(5.0))]
        );

        let mut target = PropertyMap::new().with("x", 7.0);
        dependent.borrow_mut().step(&mut target, 0.5);
        assert!((number(&target, "x") - 9.5).abs() < 1e-9);

        // Finished source: link dropped, absolute values again
        source.borrow_mut().set_finished();
        dependent.borrow_mut().step(&mut target, 0.5);
        assert!(dependent.borrow().additive_source().is_none());
        assert!((number(&target, "x") - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_additive_color() {
        let source = prepared("fill", ["#000".into(), "#fff".into()], None);
        let dependent = prepared("fill", ["#000000".into(), "#646464".into()], Some(&source));

        let mut target = PropertyMap::new().with("fill", "rgba(10,20,30,1)");
        dependent.borrow_mut().step(&mut target, 0.5);
        assert_eq!(target.text("fill"), Some("rgba(60,70,80,1)"));
    }

    #[test]
    fn test_additive_array() {
        let source = prepared("p", [vec![0.0, 0.0].into(), vec![1.0, 1.0].into()], None);
        let dependent = prepared(
            "p",
            [vec![1.0, 1.0].into(), vec![3.0, 5.0].into()],
            Some(&source),
        );

        let mut target = PropertyMap::new().with("p", vec![10.0, 10.0]);
        dependent.borrow_mut().step(&mut target, 0.5);
        assert_eq!(target.value("p"), Some(&PropValue::Array1(vec![11.0, 12.0])));
    }

    #[test]
    fn test_incompatible_additive_source_ignored() {
        let source = prepared("x", ["#000".into(), "#fff".into()], None);
        let dependent = prepared("x", [0.0.into(), 5.0.into()], Some(&source));
        assert!(dependent.borrow().additive_source().is_none());

        let finished = prepared("y", [0.0.into(), 1.0.into()], None);
        finished.borrow_mut().set_finished();
        let late = prepared("y", [0.0.into(), 5.0.into()], Some(&finished));
        assert!(late.borrow().additive_source().is_none());
    }

    #[test]
    fn test_finish_propagates_to_source() {
        let source = prepared("x", [0.0.into(), 10.0.into()], None);
        let dependent = prepared("x", [10.0.into(), 15.0.into()], Some(&source));

        dependent.borrow_mut().set_finished();
        assert!(source.borrow().is_finished());

        // Finished tracks no longer write
        let mut target = PropertyMap::new().with("x", 3.0);
        source.borrow_mut().step(&mut target, 0.5);
        dependent.borrow_mut().step(&mut target, 0.5);
        assert_eq!(target.number("x"), Some(3.0));
    }

    #[test]
    fn test_set_final_value() {
        let mut track = Track::new("x");
        track.add_keyframe(0.0, 0.0.into(), None);
        track.add_keyframe(1000.0, 100.0.into(), None);
        track.prepare(1000.0, None);
        track.set_final_value(PropValue::Number(200.0), 1000.0);

        let mut target = PropertyMap::new();
        track.step(&mut target, 0.5);
        assert!((number(&target, "x") - 100.0).abs() < 1e-9);
    }
}

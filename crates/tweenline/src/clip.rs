// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback clips and the scheduler that drives them.
//!
//! A [`Clip`] turns elapsed milliseconds into a normalized percent and hands
//! it to its frame callback. Clips do not advance on their own; a
//! [`Scheduler`] owns them and pushes time in. [`FrameScheduler`] is the
//! default implementation driven by an external frame loop.

use crate::easing::Easing;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Unique identifier for a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub Uuid);

impl ClipId {
    /// Create a new random clip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

/// Timing of a clip
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipOptions {
    /// Length of one pass in milliseconds
    pub duration: f64,
    /// Restart after reaching the end
    pub looping: bool,
    /// Milliseconds to wait before the first frame
    pub delay: f64,
}

/// Playback state of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipState {
    /// Advancing
    #[default]
    Playing,
    /// Holding its position
    Paused,
    /// Ended or detached, never fires again
    Destroyed,
}

struct ClipInner {
    options: ClipOptions,
    elapsed: f64,
    state: ClipState,
    easing: Option<Easing>,
    on_frame: Option<Box<dyn FnMut(f64)>>,
    on_destroy: Option<Box<dyn FnOnce()>>,
}

/// Handle to a playing clip. Clones share the same clip.
#[derive(Clone)]
pub struct Clip {
    id: ClipId,
    inner: Rc<RefCell<ClipInner>>,
}

impl Clip {
    /// Create a clip with no callbacks
    pub fn new(options: ClipOptions) -> Self {
        Self {
            id: ClipId::new(),
            inner: Rc::new(RefCell::new(ClipInner {
                options,
                elapsed: 0.0,
                state: ClipState::Playing,
                easing: None,
                on_frame: None,
                on_destroy: None,
            })),
        }
    }

    /// Clip ID
    pub fn id(&self) -> ClipId {
        self.id
    }

    /// Timing options
    pub fn options(&self) -> ClipOptions {
        self.inner.borrow().options
    }

    /// Current playback state
    pub fn state(&self) -> ClipState {
        self.inner.borrow().state
    }

    /// Milliseconds advanced so far, including the delay
    pub fn elapsed(&self) -> f64 {
        self.inner.borrow().elapsed
    }

    /// Set the per-frame callback, receiving the eased percent
    pub fn on_frame(&self, callback: impl FnMut(f64) + 'static) {
        self.inner.borrow_mut().on_frame = Some(Box::new(callback));
    }

    /// Set the callback fired once when the clip is destroyed
    pub fn on_destroy(&self, callback: impl FnOnce() + 'static) {
        self.inner.borrow_mut().on_destroy = Some(Box::new(callback));
    }

    /// Easing applied to the percent before it reaches the frame callback
    pub fn set_easing(&self, easing: Option<Easing>) {
        self.inner.borrow_mut().easing = easing;
    }

    /// Hold the current position
    pub fn pause(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == ClipState::Playing {
            inner.state = ClipState::Paused;
        }
    }

    /// Continue from the held position
    pub fn resume(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == ClipState::Paused {
            inner.state = ClipState::Playing;
        }
    }

    /// Whether the clip is paused
    pub fn is_paused(&self) -> bool {
        self.state() == ClipState::Paused
    }

    /// Whether the clip has been destroyed or detached
    pub fn is_destroyed(&self) -> bool {
        self.state() == ClipState::Destroyed
    }

    /// Advance by `delta_ms` and fire the frame callback.
    ///
    /// Returns true when a non-looping clip has reached its end. Paused clips,
    /// destroyed clips and clips still inside their delay fire nothing.
    pub fn advance(&self, delta_ms: f64) -> bool {
        let (percent, ended) = {
            let Ok(mut inner) = self.inner.try_borrow_mut() else {
                return false;
            };
            if inner.state != ClipState::Playing {
                return false;
            }

            inner.elapsed += delta_ms;
            let active = inner.elapsed - inner.options.delay;
            if active < 0.0 {
                return false;
            }

            let duration = inner.options.duration;
            let raw = if duration > 0.0 {
                (active / duration).min(1.0)
            } else {
                1.0
            };

            let mut ended = false;
            if raw >= 1.0 {
                if inner.options.looping {
                    let remainder = if duration > 0.0 { active % duration } else { 0.0 };
                    inner.elapsed = inner.options.delay + remainder;
                } else {
                    ended = true;
                }
            }

            let percent = inner.easing.as_ref().map_or(raw, |easing| easing.apply(raw));
            (percent, ended)
        };

        self.fire_frame(percent);
        ended
    }

    fn fire_frame(&self, percent: f64) {
        let callback = self
            .inner
            .try_borrow_mut()
            .ok()
            .and_then(|mut inner| inner.on_frame.take());
        let Some(mut callback) = callback else {
            return;
        };

        callback(percent);

        // Put it back unless the clip was torn down from inside the callback
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            if inner.state != ClipState::Destroyed && inner.on_frame.is_none() {
                inner.on_frame = Some(callback);
            }
        }
    }

    /// Destroy the clip, firing its destroy callback once
    pub fn destroy(&self) {
        let callback = match self.inner.try_borrow_mut() {
            Ok(mut inner) if inner.state != ClipState::Destroyed => {
                inner.state = ClipState::Destroyed;
                inner.on_frame = None;
                inner.on_destroy.take()
            }
            _ => None,
        };
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Stop the clip without firing the destroy callback
    pub fn detach(&self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.state = ClipState::Destroyed;
            inner.on_frame = None;
            inner.on_destroy = None;
        }
    }
}

impl fmt::Debug for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Clip");
        debug.field("id", &self.id);
        if let Ok(inner) = self.inner.try_borrow() {
            debug
                .field("options", &inner.options)
                .field("elapsed", &inner.elapsed)
                .field("state", &inner.state)
                .field("easing", &inner.easing);
        }
        debug.finish_non_exhaustive()
    }
}

/// Owner of running clips
pub trait Scheduler {
    /// Start driving a clip
    fn add_clip(&self, clip: Clip);

    /// Stop driving a clip without destroying it
    fn remove_clip(&self, clip: &Clip);
}

/// Scheduler advanced by an external frame loop
#[derive(Debug, Default)]
pub struct FrameScheduler {
    clips: RefCell<IndexMap<ClipId, Clip>>,
}

impl FrameScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every registered clip by `delta_ms`.
    ///
    /// Clips run in registration order. Clips added during the update start
    /// on the next one; clips removed during the update are skipped. Clips
    /// that end are removed and then destroyed. Returns whether any clip is
    /// still registered.
    pub fn update(&self, delta_ms: f64) -> bool {
        let clips: Vec<Clip> = self.clips.borrow().values().cloned().collect();

        for clip in clips {
            if !self.clips.borrow().contains_key(&clip.id()) {
                continue;
            }
            if clip.advance(delta_ms) {
                self.clips.borrow_mut().shift_remove(&clip.id());
                tracing::debug!(clip = ?clip.id(), "clip ended");
                clip.destroy();
            }
        }

        !self.is_empty()
    }

    /// Number of registered clips
    pub fn clip_count(&self) -> usize {
        self.clips.borrow().len()
    }

    /// Whether no clip is registered
    pub fn is_empty(&self) -> bool {
        self.clips.borrow().is_empty()
    }

    /// Whether a clip is registered
    pub fn contains(&self, clip: &Clip) -> bool {
        self.clips.borrow().contains_key(&clip.id())
    }
}

impl Scheduler for FrameScheduler {
    fn add_clip(&self, clip: Clip) {
        tracing::trace!(clip = ?clip.id(), "clip registered");
        self.clips.borrow_mut().insert(clip.id(), clip);
    }

    fn remove_clip(&self, clip: &Clip) {
        if self.clips.borrow_mut().shift_remove(&clip.id()).is_some() {
            tracing::trace!(clip = ?clip.id(), "clip removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::EasingCurve;
    use std::cell::Cell;

    fn recording(options: ClipOptions) -> (Clip, Rc<RefCell<Vec<f64>>>) {
        let clip = Clip::new(options);
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        clip.on_frame(move |p| sink.borrow_mut().push(p));
        (clip, frames)
    }

    #[test]
    fn test_advance_percent() {
        let (clip, frames) = recording(ClipOptions {
            duration: 100.0,
            ..Default::default()
        });
        assert!(!clip.advance(25.0));
        assert!(!clip.advance(25.0));
        assert!(clip.advance(60.0));
        assert_eq!(*frames.borrow(), vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn test_delay() {
        let (clip, frames) = recording(ClipOptions {
            duration: 100.0,
            looping: false,
            delay: 50.0,
        });
        clip.advance(30.0);
        assert!(frames.borrow().is_empty());
        clip.advance(30.0);
        assert_eq!(*frames.borrow(), vec![0.1]);
    }

    #[test]
    fn test_looping_wraps() {
        let (clip, frames) = recording(ClipOptions {
            duration: 100.0,
            looping: true,
            delay: 0.0,
        });
        assert!(!clip.advance(120.0));
        assert!(!clip.advance(30.0));
        let frames = frames.borrow();
        assert_eq!(frames[0], 1.0);
        assert!((frames[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_pause_holds_position() {
        let (clip, frames) = recording(ClipOptions {
            duration: 100.0,
            ..Default::default()
        });
        clip.advance(10.0);
        clip.pause();
        assert!(clip.is_paused());
        clip.advance(50.0);
        clip.resume();
        clip.advance(10.0);
        assert_eq!(*frames.borrow(), vec![0.1, 0.2]);
    }

    #[test]
    fn test_easing_applied() {
        let (clip, frames) = recording(ClipOptions {
            duration: 100.0,
            ..Default::default()
        });
        clip.set_easing(Some(EasingCurve::QuadraticIn.into()));
        clip.advance(50.0);
        assert!((frames.borrow()[0] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_destroy_once() {
        let clip = Clip::new(ClipOptions::default());
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        clip.on_destroy(move || seen.set(seen.get() + 1));
        clip.destroy();
        clip.destroy();
        assert_eq!(count.get(), 1);
        assert!(clip.is_destroyed());
        assert!(!clip.advance(10.0));
    }

    #[test]
    fn test_detach_skips_destroy_callback() {
        let clip = Clip::new(ClipOptions::default());
        let fired = Rc::new(Cell::new(false));
        let seen = Rc::clone(&fired);
        clip.on_destroy(move || seen.set(true));
        clip.detach();
        clip.destroy();
        assert!(!fired.get());
    }

    #[test]
    fn test_scheduler_destroys_ended_clips() {
        let scheduler = FrameScheduler::new();
        let (clip, frames) = recording(ClipOptions {
            duration: 100.0,
            ..Default::default()
        });
        let destroyed = Rc::new(Cell::new(false));
        let seen = Rc::clone(&destroyed);
        clip.on_destroy(move || seen.set(true));

        scheduler.add_clip(clip.clone());
        assert_eq!(scheduler.clip_count(), 1);
        assert!(scheduler.update(50.0));
        assert!(!scheduler.update(50.0));
        assert!(destroyed.get());
        assert!(scheduler.is_empty());
        assert_eq!(*frames.borrow(), vec![0.5, 1.0]);
    }

    #[test]
    fn test_scheduler_tolerates_removal_in_callback() {
        let scheduler = Rc::new(FrameScheduler::new());
        let second = Clip::new(ClipOptions {
            duration: 100.0,
            ..Default::default()
        });
        let second_fired = Rc::new(Cell::new(false));
        let seen = Rc::clone(&second_fired);
        second.on_frame(move |_| seen.set(true));

        let first = Clip::new(ClipOptions {
            duration: 100.0,
            ..Default::default()
        });
        let sched = Rc::clone(&scheduler);
        let victim = second.clone();
        first.on_frame(move |_| sched.remove_clip(&victim));

        scheduler.add_clip(first);
        scheduler.add_clip(second.clone());
        scheduler.update(10.0);

        assert!(!second_fired.get());
        assert!(!scheduler.contains(&second));
        assert_eq!(scheduler.clip_count(), 1);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-object timeline orchestration.
//!
//! An [`Animator`] collects keyframe declarations for one target, turns them
//! into [`Track`]s, and drives them from a [`Clip`] registered with a
//! [`Scheduler`]. Animators built with additive sources compose their
//! tracks on top of the sources' tracks for the same property.

use crate::clip::{Clip, ClipOptions, Scheduler};
use crate::config::{AnimatorConfig, ConfigError};
use crate::easing::Easing;
use crate::target::{AnimationTarget, PropertyMap};
use crate::track::{SharedTrack, Track};
use crate::value::PropValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Unique identifier for an animator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimatorId(pub Uuid);

impl AnimatorId {
    /// Create a new random animator ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnimatorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress of [`Animator::start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartState {
    /// `start` has not been called
    #[default]
    NotStarted,
    /// Started, no frame has run yet
    Invoked,
    /// At least one frame has run
    Running,
}

/// Animator shared with its clip and with dependent animators
pub type SharedAnimator<T> = Rc<RefCell<Animator<T>>>;

type FrameCallback<T> = Box<dyn FnMut(&mut T, f64)>;
type LifecycleCallback = Box<dyn FnOnce()>;

/// Keyframe timeline for one target object
pub struct Animator<T: AnimationTarget + 'static> {
    id: AnimatorId,
    target: Rc<RefCell<T>>,
    tracks: IndexMap<String, SharedTrack>,
    looping: bool,
    allow_discrete: bool,
    delay: f64,
    max_time: f64,
    duration: f64,
    paused: bool,
    start_state: StartState,
    default_easing: Option<Easing>,
    default_min_duration: Option<f64>,
    additive_sources: Option<Vec<Weak<RefCell<Animator<T>>>>>,
    scheduler: Option<Rc<dyn Scheduler>>,
    clip: Option<Clip>,
    animated: Vec<SharedTrack>,
    one_shot: Vec<SharedTrack>,
    on_frame: Vec<FrameCallback<T>>,
    on_done: Vec<LifecycleCallback>,
    on_aborted: Vec<LifecycleCallback>,
    self_ref: Weak<RefCell<Animator<T>>>,
}

impl<T: AnimationTarget + 'static> Animator<T> {
    /// Create an animator with default settings
    pub fn new(target: Rc<RefCell<T>>, scheduler: Option<Rc<dyn Scheduler>>) -> SharedAnimator<T> {
        Self::build(target, scheduler, &AnimatorConfig::default(), None, Vec::new())
    }

    /// Create an animator from a configuration and additive sources.
    ///
    /// A looping animator never links its additive sources.
    pub fn with_config(
        target: Rc<RefCell<T>>,
        scheduler: Option<Rc<dyn Scheduler>>,
        config: &AnimatorConfig,
        additive_sources: Vec<SharedAnimator<T>>,
    ) -> Result<SharedAnimator<T>, ConfigError> {
        config.validate()?;
        let easing = config.resolve_easing()?;
        Ok(Self::build(target, scheduler, config, easing, additive_sources))
    }

    fn build(
        target: Rc<RefCell<T>>,
        scheduler: Option<Rc<dyn Scheduler>>,
        config: &AnimatorConfig,
        default_easing: Option<Easing>,
        additive_sources: Vec<SharedAnimator<T>>,
    ) -> SharedAnimator<T> {
        let id = AnimatorId::new();
        let additive_sources = if additive_sources.is_empty() {
            None
        } else if config.looping {
            tracing::error!(animator = ?id, "looping animators cannot compose additively");
            None
        } else {
            Some(additive_sources.iter().map(Rc::downgrade).collect())
        };

        Rc::new_cyclic(|self_ref| {
            RefCell::new(Self {
                id,
                target,
                tracks: IndexMap::new(),
                looping: config.looping,
                allow_discrete: config.allow_discrete,
                delay: config.delay,
                max_time: 0.0,
                duration: 0.0,
                paused: false,
                start_state: StartState::NotStarted,
                default_easing,
                default_min_duration: config.min_duration,
                additive_sources,
                scheduler,
                clip: None,
                animated: Vec::new(),
                one_shot: Vec::new(),
                on_frame: Vec::new(),
                on_done: Vec::new(),
                on_aborted: Vec::new(),
                self_ref: self_ref.clone(),
            })
        })
    }

    /// Declare keyframes at `time` for every property in `props`
    pub fn when(&mut self, time: f64, props: &PropertyMap, easing: Option<Easing>) -> &mut Self {
        let keys: Vec<&str> = props.keys().collect();
        self.when_with_keys(time, props, &keys, easing)
    }

    /// Declare keyframes at `time` for the listed properties of `props`.
    ///
    /// The first declaration of a property at a non-zero time seeds a
    /// keyframe at time zero from the additive sources or, failing that,
    /// from the target. Properties without any initial value are skipped.
    pub fn when_with_keys(
        &mut self,
        time: f64,
        props: &PropertyMap,
        keys: &[&str],
        easing: Option<Easing>,
    ) -> &mut Self {
        for &key in keys {
            let Some(value) = props.value(key) else {
                continue;
            };

            if !self.tracks.contains_key(key) {
                let initial = self
                    .additive_initial_value(key)
                    .or_else(|| self.target.try_borrow().ok().and_then(|target| target.get(key)));
                let Some(initial) = initial else {
                    tracing::trace!(
                        animator = ?self.id,
                        prop = key,
                        "no initial value, property skipped"
                    );
                    continue;
                };

                let mut track = Track::new(key);
                if time > 0.0 {
                    track.add_keyframe(0.0, initial, easing.clone());
                }
                self.tracks.insert(key.to_owned(), Rc::new(RefCell::new(track)));
            }

            if let Some(track) = self.tracks.get(key) {
                if let Ok(mut track) = track.try_borrow_mut() {
                    track.add_keyframe(time, value.clone(), easing.clone());
                }
            }
        }

        self.max_time = self.max_time.max(time);
        self
    }

    /// Final value of `key` among the additive sources, latest source first
    fn additive_initial_value(&self, key: &str) -> Option<PropValue> {
        let track = self.additive_track(key)?;
        let track = track.try_borrow().ok()?;
        let last = track.last_keyframe()?;
        Some(track.display_value(last))
    }

    fn additive_track(&self, key: &str) -> Option<SharedTrack> {
        let sources = self.additive_sources.as_ref()?;
        sources
            .iter()
            .rev()
            .filter_map(Weak::upgrade)
            .find_map(|source| {
                let source = source.try_borrow().ok()?;
                source.tracks.get(key).cloned()
            })
    }

    /// Finalize every track and begin playback.
    ///
    /// Only the first call has any effect. Without animated tracks and
    /// without a minimum duration the animator completes immediately.
    pub fn start(&mut self, easing: Option<Easing>, min_duration: Option<f64>) {
        if self.start_state != StartState::NotStarted {
            return;
        }
        self.start_state = StartState::Invoked;

        let easing = easing.or_else(|| self.default_easing.clone());
        let min_duration = min_duration
            .or(self.default_min_duration)
            .filter(|min| *min > 0.0);
        self.duration = self.max_time.max(min_duration.unwrap_or(0.0));

        let mut animated = Vec::new();
        let mut one_shot = Vec::new();
        for (name, shared) in &self.tracks {
            let additive = self.additive_track(name);
            let Ok(mut track) = shared.try_borrow_mut() else {
                continue;
            };
            track.prepare(self.duration, additive.as_ref());

            if track.needs_animate() {
                animated.push(Rc::clone(shared));
            } else if track.keyframes().len() == 1 {
                one_shot.push(Rc::clone(shared));
            } else if self.allow_discrete && track.keyframes().len() > 1 {
                animated.push(Rc::clone(shared));
            } else {
                if let Some(last) = track.last_keyframe() {
                    let value = last.raw_value.clone();
                    if let Ok(mut target) = self.target.try_borrow_mut() {
                        target.set(name, value);
                    }
                }
                track.set_finished();
            }
        }
        self.animated = animated;
        self.one_shot = one_shot;

        if self.animated.is_empty() && min_duration.is_none() {
            tracing::debug!(animator = ?self.id, "nothing to animate, completing immediately");
            if let Ok(mut target) = self.target.try_borrow_mut() {
                for shared in self.one_shot.drain(..) {
                    if let Ok(mut track) = shared.try_borrow_mut() {
                        track.step(&mut *target, 1.0);
                    }
                }
            }
            for callback in self.finish() {
                callback();
            }
            return;
        }

        let clip = Clip::new(ClipOptions {
            duration: self.duration,
            looping: self.looping,
            delay: self.delay,
        });
        clip.set_easing(easing);

        let weak = self.self_ref.clone();
        clip.on_frame(move |percent| {
            if let Some(animator) = weak.upgrade() {
                if let Ok(mut animator) = animator.try_borrow_mut() {
                    animator.on_clip_frame(percent);
                }
            }
        });
        let weak = self.self_ref.clone();
        clip.on_destroy(move || {
            let Some(animator) = weak.upgrade() else {
                return;
            };
            // Done callbacks run with the animator released
            let callbacks = match animator.try_borrow_mut() {
                Ok(mut animator) => animator.finish(),
                Err(_) => return,
            };
            for callback in callbacks {
                callback();
            }
        });

        if self.paused {
            clip.pause();
        }
        if let Some(scheduler) = &self.scheduler {
            scheduler.add_clip(clip.clone());
        }
        self.clip = Some(clip);

        tracing::debug!(
            animator = ?self.id,
            animated = self.animated.len(),
            one_shot = self.one_shot.len(),
            duration = self.duration,
            "animator started"
        );
    }

    /// One tick of the clip
    fn on_clip_frame(&mut self, percent: f64) {
        self.start_state = StartState::Running;

        let sources_done = self.additive_sources.as_ref().is_some_and(|sources| {
            !sources
                .iter()
                .filter_map(Weak::upgrade)
                .any(|source| source.try_borrow().map_or(true, |source| source.clip.is_some()))
        });
        if sources_done {
            self.additive_sources = None;
        }

        let Ok(mut target) = self.target.try_borrow_mut() else {
            return;
        };
        for shared in &self.animated {
            if let Ok(mut track) = shared.try_borrow_mut() {
                track.step(&mut *target, percent);
            }
        }
        for shared in self.one_shot.drain(..) {
            if let Ok(mut track) = shared.try_borrow_mut() {
                track.step(&mut *target, percent);
            }
        }
        for callback in &mut self.on_frame {
            callback(&mut target, percent);
        }
    }

    fn set_tracks_finished(&self) {
        for shared in self.tracks.values() {
            if let Ok(mut track) = shared.try_borrow_mut() {
                track.set_finished();
            }
        }
    }

    /// Natural completion, returning the done callbacks to run
    #[must_use]
    fn finish(&mut self) -> Vec<LifecycleCallback> {
        self.set_tracks_finished();
        self.clip = None;
        tracing::debug!(animator = ?self.id, "animator done");
        std::mem::take(&mut self.on_done)
    }

    /// Forced completion
    fn abort(&mut self) {
        self.set_tracks_finished();
        if let Some(clip) = self.clip.take() {
            if let Some(scheduler) = &self.scheduler {
                scheduler.remove_clip(&clip);
            }
            clip.detach();
        }
        tracing::debug!(animator = ?self.id, "animator aborted");
        for callback in std::mem::take(&mut self.on_aborted) {
            callback();
        }
    }

    /// Stop playback, optionally jumping to the final values first.
    ///
    /// Fires the aborted callbacks, never the done callbacks. Does nothing
    /// without an active clip.
    pub fn stop(&mut self, forward_to_last: bool) {
        if self.clip.is_none() {
            return;
        }
        if forward_to_last {
            self.on_clip_frame(1.0);
        }
        self.abort();
    }

    /// Finish the named tracks.
    ///
    /// With `forward_to_last` each track jumps to its final value. Otherwise,
    /// if no frame has run yet, each track is written at its start value.
    /// Returns whether every track of the animator is now finished, in which
    /// case the animator aborts. Without an active clip nothing is stopped
    /// and the result is true.
    pub fn stop_tracks(&mut self, names: &[&str], forward_to_last: bool) -> bool {
        if names.is_empty() || self.clip.is_none() {
            return true;
        }

        for name in names {
            let Some(shared) = self.tracks.get(*name) else {
                continue;
            };
            let Ok(mut track) = shared.try_borrow_mut() else {
                continue;
            };
            if track.is_finished() {
                continue;
            }

            if let Ok(mut target) = self.target.try_borrow_mut() {
                if forward_to_last {
                    track.step(&mut *target, 1.0);
                } else if self.start_state == StartState::Invoked {
                    track.step(&mut *target, 0.0);
                }
            }
            track.set_finished();
        }

        let all_finished = self
            .tracks
            .values()
            .all(|shared| shared.try_borrow().is_ok_and(|track| track.is_finished()));
        if all_finished {
            self.abort();
        }
        all_finished
    }

    /// Copy first or last keyframe values of unfinished tracks onto `target`.
    ///
    /// `names` limits the copy to the listed properties.
    pub fn save_to<U: AnimationTarget + ?Sized>(
        &self,
        target: Option<&mut U>,
        names: Option<&[&str]>,
        use_first_frame: bool,
    ) {
        let Some(target) = target else {
            return;
        };

        for (name, shared) in &self.tracks {
            if names.is_some_and(|names| !names.contains(&name.as_str())) {
                continue;
            }
            let Ok(track) = shared.try_borrow() else {
                continue;
            };
            if track.is_finished() {
                continue;
            }

            let keyframe = if use_first_frame {
                track.first_keyframe()
            } else {
                track.last_keyframe()
            };
            if let Some(keyframe) = keyframe {
                target.set(name, track.display_value(keyframe));
            }
        }
    }

    /// Replace the final value of already declared tracks.
    ///
    /// Tracks with a single keyframe are left alone.
    pub fn rewrite_final_value(&mut self, values: &PropertyMap, names: Option<&[&str]>) {
        let keys: Vec<&str> = match names {
            Some(names) => names.to_vec(),
            None => values.keys().collect(),
        };
        let duration = self.duration();

        for key in keys {
            let (Some(shared), Some(value)) = (self.tracks.get(key), values.value(key)) else {
                continue;
            };
            if let Ok(mut track) = shared.try_borrow_mut() {
                track.set_final_value(value.clone(), duration);
            }
        }
    }

    /// Register a per-frame callback, called after all tracks have stepped
    pub fn on_frame(&mut self, callback: impl FnMut(&mut T, f64) + 'static) -> &mut Self {
        self.on_frame.push(Box::new(callback));
        self
    }

    /// Register a natural completion callback
    pub fn on_done(&mut self, callback: impl FnOnce() + 'static) -> &mut Self {
        self.on_done.push(Box::new(callback));
        self
    }

    /// Register a forced completion callback
    pub fn on_aborted(&mut self, callback: impl FnOnce() + 'static) -> &mut Self {
        self.on_aborted.push(Box::new(callback));
        self
    }

    /// Set the delay used by the clip created on start
    pub fn delay(&mut self, delay_ms: f64) -> &mut Self {
        self.delay = delay_ms;
        self
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.paused = true;
        if let Some(clip) = &self.clip {
            clip.pause();
        }
    }

    /// Resume playback
    pub fn resume(&mut self) {
        self.paused = false;
        if let Some(clip) = &self.clip {
            clip.resume();
        }
    }

    /// Whether playback is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Replace the animated object
    pub fn set_target(&mut self, target: Rc<RefCell<T>>) {
        self.target = target;
    }

    /// The animated object
    pub fn target(&self) -> &Rc<RefCell<T>> {
        &self.target
    }

    /// Animator ID
    pub fn id(&self) -> AnimatorId {
        self.id
    }

    /// Whether the animator loops
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Track for a property
    pub fn track(&self, name: &str) -> Option<SharedTrack> {
        self.tracks.get(name).cloned()
    }

    /// Property names in declaration order
    pub fn track_names(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    /// Playback duration in milliseconds
    pub fn duration(&self) -> f64 {
        self.duration.max(self.max_time)
    }

    /// Active clip
    pub fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    /// Start progress
    pub fn start_state(&self) -> StartState {
        self.start_state
    }

    /// Whether the animator was started and no longer has an active clip
    pub fn is_finished(&self) -> bool {
        self.start_state != StartState::NotStarted && self.clip.is_none()
    }
}

impl<T: AnimationTarget + 'static> fmt::Debug for Animator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("id", &self.id)
            .field("tracks", &self.tracks.keys().collect::<Vec<_>>())
            .field("looping", &self.looping)
            .field("delay", &self.delay)
            .field("duration", &self.duration())
            .field("paused", &self.paused)
            .field("start_state", &self.start_state)
            .field("clip", &self.clip)
            .finish_non_exhaustive()
    }
}

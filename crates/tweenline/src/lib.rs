// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe animation engine.
//!
//! This crate animates named properties of arbitrary objects:
//! - Numeric, array and color interpolation
//! - Discrete stepping for values that cannot be interpolated
//! - Additive composition on top of other running animations
//! - Start, stop, snapshot and retarget of running timelines
//!
//! ## Architecture
//!
//! The engine is built on:
//! - [`Track`]: keyframes of one property and the seek/interpolate step
//! - [`Animator`]: tracks of one target, driven by a [`Clip`]
//! - [`Scheduler`]: owner of running clips, [`FrameScheduler`] by default
//! - [`AnimationTarget`]: string-keyed property access over [`PropValue`]

pub mod animator;
pub mod clip;
pub mod color;
pub mod config;
pub mod easing;
pub mod interpolate;
pub mod keyframe;
pub mod target;
pub mod track;
pub mod value;

pub use animator::{Animator, AnimatorId, SharedAnimator, StartState};
pub use clip::{Clip, ClipId, ClipOptions, ClipState, FrameScheduler, Scheduler};
pub use config::{AnimatorConfig, ConfigError};
pub use easing::{CubicBezier, Easing, EasingCurve, EasingError};
pub use interpolate::Interpolation;
pub use keyframe::Keyframe;
pub use target::{AnimationTarget, PropertyMap};
pub use track::{SharedTrack, Track};
pub use value::{ArrayDim, PropValue};

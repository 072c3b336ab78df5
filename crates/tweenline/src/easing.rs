// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves.
//!
//! An [`Easing`] remaps a local weight in `[0, 1]` before interpolation. It is
//! resolved from a curve name (`cubicOut`), a `cubic-bezier(x1,y1,x2,y2)`
//! expression, or wraps a caller-supplied function that is used verbatim.

use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// Error resolving an easing description
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EasingError {
    /// No curve with this name
    #[error("Unknown easing: {0}")]
    UnknownName(String),

    /// Malformed `cubic-bezier(...)` expression
    #[error("Invalid cubic-bezier: {0}")]
    InvalidBezier(String),
}

/// Named easing curves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum EasingCurve {
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuarticIn,
    QuarticOut,
    QuarticInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    SinusoidalIn,
    SinusoidalOut,
    SinusoidalInOut,
    ExponentialIn,
    ExponentialOut,
    ExponentialInOut,
    CircularIn,
    CircularOut,
    CircularInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl EasingCurve {
    /// All named curves
    pub const ALL: [EasingCurve; 31] = [
        Self::Linear,
        Self::QuadraticIn,
        Self::QuadraticOut,
        Self::QuadraticInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::QuarticIn,
        Self::QuarticOut,
        Self::QuarticInOut,
        Self::QuinticIn,
        Self::QuinticOut,
        Self::QuinticInOut,
        Self::SinusoidalIn,
        Self::SinusoidalOut,
        Self::SinusoidalInOut,
        Self::ExponentialIn,
        Self::ExponentialOut,
        Self::ExponentialInOut,
        Self::CircularIn,
        Self::CircularOut,
        Self::CircularInOut,
        Self::ElasticIn,
        Self::ElasticOut,
        Self::ElasticInOut,
        Self::BackIn,
        Self::BackOut,
        Self::BackInOut,
        Self::BounceIn,
        Self::BounceOut,
        Self::BounceInOut,
    ];

    /// Get the curve name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::QuadraticIn => "quadraticIn",
            Self::QuadraticOut => "quadraticOut",
            Self::QuadraticInOut => "quadraticInOut",
            Self::CubicIn => "cubicIn",
            Self::CubicOut => "cubicOut",
            Self::CubicInOut => "cubicInOut",
            Self::QuarticIn => "quarticIn",
            Self::QuarticOut => "quarticOut",
            Self::QuarticInOut => "quarticInOut",
            Self::QuinticIn => "quinticIn",
            Self::QuinticOut => "quinticOut",
            Self::QuinticInOut => "quinticInOut",
            Self::SinusoidalIn => "sinusoidalIn",
            Self::SinusoidalOut => "sinusoidalOut",
            Self::SinusoidalInOut => "sinusoidalInOut",
            Self::ExponentialIn => "exponentialIn",
            Self::ExponentialOut => "exponentialOut",
            Self::ExponentialInOut => "exponentialInOut",
            Self::CircularIn => "circularIn",
            Self::CircularOut => "circularOut",
            Self::CircularInOut => "circularInOut",
            Self::ElasticIn => "elasticIn",
            Self::ElasticOut => "elasticOut",
            Self::ElasticInOut => "elasticInOut",
            Self::BackIn => "backIn",
            Self::BackOut => "backOut",
            Self::BackInOut => "backInOut",
            Self::BounceIn => "bounceIn",
            Self::BounceOut => "bounceOut",
            Self::BounceInOut => "bounceInOut",
        }
    }

    /// Look up a curve by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|curve| curve.name() == name)
    }

    /// Evaluate the curve at `k`
    pub fn apply(&self, k: f64) -> f64 {
        match self {
            Self::Linear => k,
            Self::QuadraticIn => k * k,
            Self::QuadraticOut => k * (2.0 - k),
            Self::QuadraticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k
                } else {
                    let k = k - 1.0;
                    -0.5 * (k * (k - 2.0) - 1.0)
                }
            }
            Self::CubicIn => k * k * k,
            Self::CubicOut => {
                let k = k - 1.0;
                k * k * k + 1.0
            }
            Self::CubicInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k * k
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * k + 2.0)
                }
            }
            Self::QuarticIn => k.powi(4),
            Self::QuarticOut => 1.0 - (k - 1.0).powi(4),
            Self::QuarticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k.powi(4)
                } else {
                    -0.5 * ((k - 2.0).powi(4) - 2.0)
                }
            }
            Self::QuinticIn => k.powi(5),
            Self::QuinticOut => (k - 1.0).powi(5) + 1.0,
            Self::QuinticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k.powi(5)
                } else {
                    0.5 * ((k - 2.0).powi(5) + 2.0)
                }
            }
            Self::SinusoidalIn => 1.0 - (k * PI / 2.0).cos(),
            Self::SinusoidalOut => (k * PI / 2.0).sin(),
            Self::SinusoidalInOut => 0.5 * (1.0 - (PI * k).cos()),
            Self::ExponentialIn => {
                if k == 0.0 {
                    0.0
                } else {
                    1024_f64.powf(k - 1.0)
                }
            }
            Self::ExponentialOut => {
                if k == 1.0 {
                    1.0
                } else {
                    1.0 - 2_f64.powf(-10.0 * k)
                }
            }
            Self::ExponentialInOut => {
                if k == 0.0 || k == 1.0 {
                    return k;
                }
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * 1024_f64.powf(k - 1.0)
                } else {
                    0.5 * (2.0 - 2_f64.powf(-10.0 * (k - 1.0)))
                }
            }
            Self::CircularIn => 1.0 - (1.0 - k * k).sqrt(),
            Self::CircularOut => {
                let k = k - 1.0;
                (1.0 - k * k).sqrt()
            }
            Self::CircularInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    -0.5 * ((1.0 - k * k).sqrt() - 1.0)
                } else {
                    let k = k - 2.0;
                    0.5 * ((1.0 - k * k).sqrt() + 1.0)
                }
            }
            Self::ElasticIn => {
                if k == 0.0 || k == 1.0 {
                    return k;
                }
                let k = k - 1.0;
                -(2_f64.powf(10.0 * k) * ((k - ELASTIC_SHIFT) * 2.0 * PI / ELASTIC_PERIOD).sin())
            }
            Self::ElasticOut => {
                if k == 0.0 || k == 1.0 {
                    return k;
                }
                let wave = ((k - ELASTIC_SHIFT) * 2.0 * PI / ELASTIC_PERIOD).sin();
                2_f64.powf(-10.0 * k) * wave + 1.0
            }
            Self::ElasticInOut => {
                if k == 0.0 || k == 1.0 {
                    return k;
                }
                let k = k * 2.0 - 1.0;
                let wave = ((k - ELASTIC_SHIFT) * 2.0 * PI / ELASTIC_PERIOD).sin();
                if k < 0.0 {
                    -0.5 * 2_f64.powf(10.0 * k) * wave
                } else {
                    2_f64.powf(-10.0 * k) * wave * 0.5 + 1.0
                }
            }
            Self::BackIn => {
                let s = BACK_OVERSHOOT;
                k * k * ((s + 1.0) * k - s)
            }
            Self::BackOut => {
                let s = BACK_OVERSHOOT;
                let k = k - 1.0;
                k * k * ((s + 1.0) * k + s) + 1.0
            }
            Self::BackInOut => {
                let s = BACK_OVERSHOOT * 1.525;
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * (k * k * ((s + 1.0) * k - s))
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * ((s + 1.0) * k + s) + 2.0)
                }
            }
            Self::BounceIn => 1.0 - bounce_out(1.0 - k),
            Self::BounceOut => bounce_out(k),
            Self::BounceInOut => {
                if k < 0.5 {
                    (1.0 - bounce_out(1.0 - k * 2.0)) * 0.5
                } else {
                    bounce_out(k * 2.0 - 1.0) * 0.5 + 0.5
                }
            }
        }
    }
}

const ELASTIC_PERIOD: f64 = 0.4;
const ELASTIC_SHIFT: f64 = ELASTIC_PERIOD / 4.0;
const BACK_OVERSHOOT: f64 = 1.701_58;

fn bounce_out(k: f64) -> f64 {
    if k < 1.0 / 2.75 {
        7.5625 * k * k
    } else if k < 2.0 / 2.75 {
        let k = k - 1.5 / 2.75;
        7.5625 * k * k + 0.75
    } else if k < 2.5 / 2.75 {
        let k = k - 2.25 / 2.75;
        7.5625 * k * k + 0.9375
    } else {
        let k = k - 2.625 / 2.75;
        7.5625 * k * k + 0.984_375
    }
}

/// Cubic bezier timing curve through `(0,0)`, `(x1,y1)`, `(x2,y2)`, `(1,1)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    /// First control point x
    pub x1: f64,
    /// First control point y
    pub y1: f64,
    /// Second control point x
    pub x2: f64,
    /// Second control point y
    pub y2: f64,
}

impl CubicBezier {
    /// Parse `cubic-bezier(x1, y1, x2, y2)`
    pub fn parse(text: &str) -> Result<Self, EasingError> {
        let invalid = || EasingError::InvalidBezier(text.to_owned());
        let body = text
            .trim()
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let points = body
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        let [x1, y1, x2, y2] = points[..] else {
            return Err(invalid());
        };
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(invalid());
        }

        Ok(Self { x1, y1, x2, y2 })
    }

    fn sample(a1: f64, a2: f64, t: f64) -> f64 {
        let mt = 1.0 - t;
        3.0 * mt * mt * t * a1 + 3.0 * mt * t * t * a2 + t * t * t
    }

    fn sample_slope(a1: f64, a2: f64, t: f64) -> f64 {
        let mt = 1.0 - t;
        3.0 * mt * mt * a1 + 6.0 * mt * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
    }

    /// Solve the curve parameter for `x`, then evaluate `y`
    pub fn apply(&self, x: f64) -> f64 {
        if self.x1 == self.y1 && self.x2 == self.y2 {
            return x;
        }
        if x <= 0.0 || x >= 1.0 {
            return x;
        }

        // Newton first, bisection when the slope flattens
        let mut t = x;
        for _ in 0..8 {
            let err = Self::sample(self.x1, self.x2, t) - x;
            if err.abs() < 1e-7 {
                return Self::sample(self.y1, self.y2, t);
            }
            let slope = Self::sample_slope(self.x1, self.x2, t);
            if slope.abs() < 1e-6 {
                break;
            }
            t -= err / slope;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        t = x;
        for _ in 0..64 {
            let value = Self::sample(self.x1, self.x2, t);
            if (value - x).abs() < 1e-7 {
                break;
            }
            if value < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) * 0.5;
        }
        Self::sample(self.y1, self.y2, t)
    }
}

/// Easing applied to a segment weight
#[derive(Clone)]
pub enum Easing {
    /// Named curve
    Curve(EasingCurve),
    /// Compiled cubic bezier
    Bezier(CubicBezier),
    /// Caller-supplied function
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Easing {
    /// Linear easing
    pub const LINEAR: Easing = Easing::Curve(EasingCurve::Linear);

    /// Resolve a curve name or `cubic-bezier(...)` expression
    pub fn parse(text: &str) -> Result<Self, EasingError> {
        let text = text.trim();
        if text.starts_with("cubic-bezier") {
            return CubicBezier::parse(text).map(Self::Bezier);
        }
        EasingCurve::from_name(text)
            .map(Self::Curve)
            .ok_or_else(|| EasingError::UnknownName(text.to_owned()))
    }

    /// Wrap a caller-supplied function
    pub fn custom(func: impl Fn(f64) -> f64 + 'static) -> Self {
        Self::Custom(Rc::new(func))
    }

    /// Evaluate the easing at `t`
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Self::Curve(curve) => curve.apply(t),
            Self::Bezier(bezier) => bezier.apply(t),
            Self::Custom(func) => func(t),
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::LINEAR
    }
}

impl FromStr for Easing {
    type Err = EasingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<EasingCurve> for Easing {
    fn from(curve: EasingCurve) -> Self {
        Self::Curve(curve)
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Curve(curve) => f.debug_tuple("Curve").field(&curve.name()).finish(),
            Self::Bezier(bezier) => f.debug_tuple("Bezier").field(bezier).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

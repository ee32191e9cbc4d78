//! Display text sizing: long inputs shrink so they keep fitting the field.

use serde::Serialize;

/// Inputs up to this many characters render at full size.
pub const MAX_LENGTH_NO_SHRINK: usize = 12;

const MAX_FONT_PX: f64 = 36.0;
const MIN_FONT_PX: f64 = 18.0;
const MAX_LINE_HEIGHT_PX: f64 = 36.0;
const MIN_LINE_HEIGHT_PX: f64 = 58.0;

const SHRINK_CURVE: CubicBezier = CubicBezier {
    x1: 0.25,
    y1: 0.8,
    x2: 1.0,
    y2: 1.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextSize {
    pub font_px: f64,
    pub line_height_px: f64,
}

impl TextSize {
    pub fn for_length(len: usize, max_len: usize) -> Self {
        let amount = if max_len > MAX_LENGTH_NO_SHRINK {
            (len as f64 - MAX_LENGTH_NO_SHRINK as f64) / (max_len - MAX_LENGTH_NO_SHRINK) as f64
        } else {
            0.0
        };
        let progress = 1.0 - SHRINK_CURVE.ease(amount);

        Self {
            font_px: lerp(progress, MIN_FONT_PX, MAX_FONT_PX),
            line_height_px: lerp(progress, MIN_LINE_HEIGHT_PX, MAX_LINE_HEIGHT_PX),
        }
    }
}

fn lerp(progress: f64, min: f64, max: f64) -> f64 {
    (max - min) * progress + min
}

/// A CSS-style cubic bezier timing curve anchored at (0,0) and (1,1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    const EPSILON: f64 = 1e-6;
    const NEWTON_STEPS: usize = 8;

    /// Output progress for `time` in `[0, 1]` (clamped). Solves x(t) = time
    /// by Newton's method and falls back to linear when it does not
    /// converge.
    pub fn ease(&self, time: f64) -> f64 {
        let time = time.clamp(0.0, 1.0);

        let cx = 3.0 * self.x1;
        let bx = 3.0 * (self.x2 - self.x1) - cx;
        let ax = 1.0 - cx - bx;

        let cy = 3.0 * self.y1;
        let by = 3.0 * (self.y2 - self.y1) - cy;
        let ay = 1.0 - cy - by;

        let mut t = time;
        for _ in 0..Self::NEWTON_STEPS {
            let x = ((ax * t + bx) * t + cx) * t - time;
            if x.abs() < Self::EPSILON {
                return ((ay * t + by) * t + cy) * t;
            }
            let dx = (3.0 * ax * t + 2.0 * bx) * t + cx;
            if dx.abs() < Self::EPSILON {
                break;
            }
            t -= x / dx;
        }

        time
    }
}

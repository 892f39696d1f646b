//! Typed effect-chain parameters.
//!
//! A [`ParamValue`] carries a raw value together with its valid range and
//! scaling curve. The invariant is simple and total: after any mutation the
//! raw value lies within `[min, max]`. Out-of-range inputs are clamped to the
//! nearest boundary and the clamp is reported to the caller — never silently
//! discarded, never an error.

use serde::{Deserialize, Serialize};

/// Scaling curve mapping a parameter's raw value to normalized \[0.0, 1.0\].
///
/// # Normalization Formulas
///
/// - **Linear**: `normalized = (raw - min) / (max - min)`
/// - **Logarithmic**: `normalized = ln(raw/min) / ln(max/min)` — requires `min > 0`
/// - **Stepped**: linear mapping, but raw values snap to whole-number steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScaleKind {
    /// Linear mapping (default). Equal resolution across the range.
    #[default]
    Linear,
    /// Logarithmic mapping. More resolution at low values — used for rate
    /// and time parameters. Requires `min > 0.0`.
    Logarithmic,
    /// Discrete whole-number steps (selector knobs, waveform choices).
    Stepped,
}

/// A single effect or amp parameter: value, bounds, and scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamValue {
    /// Parameter name, unique within its owning slot.
    pub name: String,
    /// Current raw value. Always within `[min, max]`.
    raw: f32,
    /// Minimum allowed raw value.
    pub min: f32,
    /// Maximum allowed raw value.
    pub max: f32,
    /// Normalization curve.
    pub scale: ScaleKind,
}

impl ParamValue {
    /// Create a parameter, clamping `raw` into `[min, max]`.
    pub fn new(
        name: impl Into<String>,
        raw: f32,
        min: f32,
        max: f32,
        scale: ScaleKind,
    ) -> Self {
        let mut value = Self {
            name: name.into(),
            raw: min,
            min,
            max,
            scale,
        };
        value.set(raw);
        value
    }

    /// Convenience constructor for the common unit-range linear parameter.
    pub fn unit(name: impl Into<String>, raw: f32) -> Self {
        Self::new(name, raw, 0.0, 1.0, ScaleKind::Linear)
    }

    /// Current raw value.
    #[inline]
    pub fn raw(&self) -> f32 {
        self.raw
    }

    /// Set the raw value, clamping into range.
    ///
    /// Returns `true` if the requested value was out of range and had to be
    /// clamped, so callers can surface a `ValueClamped` note.
    pub fn set(&mut self, raw: f32) -> bool {
        if raw.is_nan() {
            self.raw = self.min;
            return true;
        }
        let snapped = match self.scale {
            ScaleKind::Stepped => libm::roundf(raw),
            _ => raw,
        };
        self.raw = snapped.clamp(self.min, self.max);
        self.raw != raw
    }

    /// Convert the raw value to the canonical normalized range \[0.0, 1.0\].
    #[inline]
    pub fn normalized(&self) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        match self.scale {
            ScaleKind::Linear | ScaleKind::Stepped => (self.raw - self.min) / range,
            ScaleKind::Logarithmic => {
                if self.min <= 0.0 || self.raw <= 0.0 {
                    return 0.0;
                }
                libm::logf(self.raw / self.min) / libm::logf(self.max / self.min)
            }
        }
    }

    /// Set the raw value from a normalized \[0.0, 1.0\] position.
    ///
    /// Returns `true` if the stored value does not faithfully represent the
    /// input: the normalized position was out of range, or step snapping
    /// moved the value.
    pub fn set_normalized(&mut self, normalized: f32) -> bool {
        if normalized.is_nan() {
            self.raw = self.min;
            return true;
        }
        let n = normalized.clamp(0.0, 1.0);
        let exact = match self.scale {
            ScaleKind::Linear | ScaleKind::Stepped => self.min + n * (self.max - self.min),
            ScaleKind::Logarithmic => {
                if self.min <= 0.0 {
                    self.min
                } else {
                    self.min * libm::powf(self.max / self.min, n)
                }
            }
        };
        let raw = match self.scale {
            ScaleKind::Stepped => libm::roundf(exact),
            _ => exact,
        };
        self.raw = raw.clamp(self.min, self.max);
        // A tenth of a step tolerates quantization noise from coarse wire
        // encodings without hiding genuinely off-step inputs.
        n != normalized || (self.raw - exact).abs() > 0.1
    }
}

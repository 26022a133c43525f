//! Effect construction options.
//!
//! Options come in layers. An [`OptionLayer`] is a partial set where every
//! field is optional; layers are stacked with [`OptionLayer::layered_over`]
//! and collapsed into an immutable [`EffectOptions`] by
//! [`EffectOptions::resolve`]. The priority order is fixed:
//!
//! 1. built-in base defaults ([`OptionLayer::base_defaults`])
//! 2. effect-specific defaults ([`crate::effect::Effect::default_options`])
//! 3. caller overrides
//!
//! Effect-specific values (wave height, grid size, ...) live in the `params`
//! map so the host never needs to know about them.

use bevy_ecs::resource::Resource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::*;
use crate::errors::ConfigurationError;
use crate::utils::parse_hex_color;

/// A loosely typed effect parameter, as read from a config file or the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(value) => Some(*value as f64),
            ParamValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Non-negative integral values only; `2.0` is accepted, `2.5` is not.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ParamValue::Int(value) => u32::try_from(*value).ok(),
            ParamValue::Float(value)
                if value.fract() == 0.0 && *value >= 0.0 && *value <= u32::MAX as f64 =>
            {
                Some(*value as u32)
            }
            _ => None,
        }
    }

    /// Integers are taken as `0xRRGGBB`, text is parsed as a hex color.
    pub fn as_color(&self) -> Option<u32> {
        match self {
            ParamValue::Int(value) => u32::try_from(*value).ok().filter(|c| *c <= 0xffffff),
            ParamValue::Text(text) => parse_hex_color(text),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(value as f64)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// A partial set of options. `None` means "not set at this layer".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionLayer {
    /// Container reference (selector) the effect is mounted into
    pub el: Option<String>,
    pub mouse_controls: Option<bool>,
    pub touch_controls: Option<bool>,
    pub gyro_controls: Option<bool>,
    /// Surface height floor in logical pixels
    pub min_height: Option<f32>,
    /// Surface width floor in logical pixels
    pub min_width: Option<f32>,
    /// Render scale on desktop devices
    pub scale: Option<f32>,
    /// Render scale on touch devices
    pub scale_mobile: Option<f32>,
    /// Effect-specific parameters, keyed by their camelCase option name
    pub params: BTreeMap<String, ParamValue>,
}

impl OptionLayer {
    /// The lowest-priority layer every effect starts from.
    pub fn base_defaults() -> Self {
        Self {
            el: None,
            mouse_controls: Some(DEFAULT_MOUSE_CONTROLS),
            touch_controls: Some(DEFAULT_TOUCH_CONTROLS),
            gyro_controls: Some(DEFAULT_GYRO_CONTROLS),
            min_height: Some(DEFAULT_MIN_HEIGHT),
            min_width: Some(DEFAULT_MIN_WIDTH),
            scale: Some(DEFAULT_SCALE),
            scale_mobile: Some(DEFAULT_SCALE_MOBILE),
            params: BTreeMap::new(),
        }
    }

    pub fn with_el(mut self, el: impl Into<String>) -> Self {
        self.el = Some(el.into());
        self
    }

    pub fn with_param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Stacks `self` on top of `lower`: every value set in `self` wins.
    pub fn layered_over(self, lower: OptionLayer) -> OptionLayer {
        let mut params = lower.params;
        params.extend(self.params);

        OptionLayer {
            el: self.el.or(lower.el),
            mouse_controls: self.mouse_controls.or(lower.mouse_controls),
            touch_controls: self.touch_controls.or(lower.touch_controls),
            gyro_controls: self.gyro_controls.or(lower.gyro_controls),
            min_height: self.min_height.or(lower.min_height),
            min_width: self.min_width.or(lower.min_width),
            scale: self.scale.or(lower.scale),
            scale_mobile: self.scale_mobile.or(lower.scale_mobile),
            params,
        }
    }
}

/// Fully merged, validated options. Immutable once the host is constructed.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectOptions {
    pub el: String,
    pub mouse_controls: bool,
    pub touch_controls: bool,
    pub gyro_controls: bool,
    pub min_height: f32,
    pub min_width: f32,
    pub scale: f32,
    pub scale_mobile: f32,
    pub params: BTreeMap<String, ParamValue>,
}

impl EffectOptions {
    /// Merges `base < effect_defaults < caller` and validates the result.
    pub fn resolve(
        effect_defaults: OptionLayer,
        caller: OptionLayer,
    ) -> Result<Self, ConfigurationError> {
        let merged = caller
            .layered_over(effect_defaults)
            .layered_over(OptionLayer::base_defaults());

        let el = merged
            .el
            .filter(|el| !el.trim().is_empty())
            .ok_or(ConfigurationError::MissingContainer)?;

        let options = Self {
            el,
            mouse_controls: merged.mouse_controls.unwrap_or(DEFAULT_MOUSE_CONTROLS),
            touch_controls: merged.touch_controls.unwrap_or(DEFAULT_TOUCH_CONTROLS),
            gyro_controls: merged.gyro_controls.unwrap_or(DEFAULT_GYRO_CONTROLS),
            min_height: merged.min_height.unwrap_or(DEFAULT_MIN_HEIGHT),
            min_width: merged.min_width.unwrap_or(DEFAULT_MIN_WIDTH),
            scale: merged.scale.unwrap_or(DEFAULT_SCALE),
            scale_mobile: merged.scale_mobile.unwrap_or(DEFAULT_SCALE_MOBILE),
            params: merged.params,
        };
        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let floors = [("minHeight", self.min_height), ("minWidth", self.min_width)];
        for (name, value) in floors {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::invalid(name, "a finite number >= 0"));
            }
        }

        let scales = [("scale", self.scale), ("scaleMobile", self.scale_mobile)];
        for (name, value) in scales {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigurationError::invalid(name, "a finite number > 0"));
            }
        }
        Ok(())
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn param_f32(&self, key: &str, fallback: f32) -> Result<f32, ConfigurationError> {
        match self.params.get(key) {
            None => Ok(fallback),
            Some(value) => value
                .as_f64()
                .map(|v| v as f32)
                .filter(|v| v.is_finite())
                .ok_or_else(|| ConfigurationError::invalid(key, "a finite number")),
        }
    }

    pub fn param_u32(&self, key: &str, fallback: u32) -> Result<u32, ConfigurationError> {
        match self.params.get(key) {
            None => Ok(fallback),
            Some(value) => value
                .as_u32()
                .ok_or_else(|| ConfigurationError::invalid(key, "a non-negative integer")),
        }
    }

    pub fn param_color(&self, key: &str, fallback: u32) -> Result<u32, ConfigurationError> {
        match self.params.get(key) {
            None => Ok(fallback),
            Some(value) => value
                .as_color()
                .ok_or_else(|| ConfigurationError::invalid(key, "a 0xRRGGBB color")),
        }
    }

    /// Converts back into a fully populated layer, e.g. to write it to disk.
    pub fn to_layer(&self) -> OptionLayer {
        OptionLayer {
            el: Some(self.el.clone()),
            mouse_controls: Some(self.mouse_controls),
            touch_controls: Some(self.touch_controls),
            gyro_controls: Some(self.gyro_controls),
            min_height: Some(self.min_height),
            min_width: Some(self.min_width),
            scale: Some(self.scale),
            scale_mobile: Some(self.scale_mobile),
            params: self.params.clone(),
        }
    }
}

//! Name-to-constructor lookup for effects.

use std::collections::BTreeMap;

use bevy_ecs::resource::Resource;

use crate::effect::Effect;
use crate::errors::ConfigurationError;
use crate::waves::{WaveEffect, WAVES_EFFECT_NAME};

pub type EffectFactory = fn() -> Box<dyn Effect>;

#[derive(Resource, Debug, Clone, Default)]
pub struct EffectRegistry {
    factories: BTreeMap<String, EffectFactory>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every effect shipped with this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(WAVES_EFFECT_NAME, || Box::new(WaveEffect::new()));
        registry
    }

    /// Names are case-insensitive. Returns the factory previously registered
    /// under `name`, if any.
    pub fn register(&mut self, name: &str, factory: EffectFactory) -> Option<EffectFactory> {
        self.factories.insert(name.to_lowercase(), factory)
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Effect>, ConfigurationError> {
        self.factories
            .get(&name.to_lowercase())
            .map(|factory| factory())
            .ok_or_else(|| ConfigurationError::UnknownEffect(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use bevy::prelude::Resource;
use ron::{from_str, ser::PrettyConfig};
use wavefx::OptionLayer;

/// Container the viewer mounts into when none is configured.
pub const DEFAULT_CONTAINER: &str = "primary";

/// What the viewer should show: which effect and the caller's option layer.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub effect: String,
    pub options: OptionLayer,
}

impl ViewerConfig {
    /// Container selector to mount into, falling back to the primary window.
    pub fn container(&self) -> &str {
        self.options.el.as_deref().unwrap_or(DEFAULT_CONTAINER)
    }
}

pub fn load_layer(path: &Path) -> Result<OptionLayer, Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    let layer = from_str::<OptionLayer>(&content)?;
    Ok(layer)
}

pub fn write_layer(layer: &OptionLayer, path: &Path) -> Result<(), Box<dyn Error>> {
    let pretty_config = PrettyConfig::new()
        .with_depth_limit(3)
        .with_separate_tuple_members(true)
        .with_enumerate_arrays(true);

    let serialized = ron::ser::to_string_pretty(layer, pretty_config)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(serialized.as_bytes())?;
    Ok(())
}

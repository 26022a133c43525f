use crate::errors::ConfigurationError;
use crate::options::{EffectOptions, OptionLayer};

pub const PARAM_COLOR: &str = "color";
pub const PARAM_SHININESS: &str = "shininess";
pub const PARAM_WAVE_HEIGHT: &str = "waveHeight";
pub const PARAM_WAVE_SPEED: &str = "waveSpeed";
pub const PARAM_ZOOM: &str = "zoom";
pub const PARAM_WAVE_NOISE: &str = "waveNoise";
pub const PARAM_GRID_WIDTH: &str = "gridWidth";
pub const PARAM_GRID_HEIGHT: &str = "gridHeight";

/// Upper bound on `(gridWidth + 1) * (gridHeight + 1)`
pub const MAX_GRID_VERTICES: u64 = 1_000_000;

/// Typed view of the wave effect's parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSettings {
    /// Surface color, `0xRRGGBB`
    pub color: u32,
    /// Specular exponent of the surface material
    pub shininess: f32,
    /// Peak displacement of a swell
    pub wave_height: f32,
    /// Multiplies both the temporal and the spatial phase
    pub wave_speed: f32,
    pub zoom: f32,
    /// Range of the random initial height jitter
    pub wave_noise: f32,
    /// Cells along x
    pub grid_width: u32,
    /// Cells along z
    pub grid_height: u32,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            color: 0x021896,
            shininess: 30.0,
            wave_height: 15.0,
            wave_speed: 1.0,
            zoom: 1.0,
            wave_noise: 4.0,
            grid_width: 100,
            grid_height: 80,
        }
    }
}

impl WaveSettings {
    /// These defaults as an option layer.
    pub fn default_layer() -> OptionLayer {
        let d = Self::default();
        OptionLayer::default()
            .with_param(PARAM_COLOR, d.color)
            .with_param(PARAM_SHININESS, d.shininess)
            .with_param(PARAM_WAVE_HEIGHT, d.wave_height)
            .with_param(PARAM_WAVE_SPEED, d.wave_speed)
            .with_param(PARAM_ZOOM, d.zoom)
            .with_param(PARAM_WAVE_NOISE, d.wave_noise)
            .with_param(PARAM_GRID_WIDTH, d.grid_width)
            .with_param(PARAM_GRID_HEIGHT, d.grid_height)
    }

    pub fn from_options(options: &EffectOptions) -> Result<Self, ConfigurationError> {
        let d = Self::default();
        let settings = Self {
            color: options.param_color(PARAM_COLOR, d.color)?,
            shininess: options.param_f32(PARAM_SHININESS, d.shininess)?,
            wave_height: options.param_f32(PARAM_WAVE_HEIGHT, d.wave_height)?,
            wave_speed: options.param_f32(PARAM_WAVE_SPEED, d.wave_speed)?,
            zoom: options.param_f32(PARAM_ZOOM, d.zoom)?,
            wave_noise: options.param_f32(PARAM_WAVE_NOISE, d.wave_noise)?,
            grid_width: options.param_u32(PARAM_GRID_WIDTH, d.grid_width)?,
            grid_height: options.param_u32(PARAM_GRID_HEIGHT, d.grid_height)?,
        };

        if settings.zoom <= 0.0 {
            return Err(ConfigurationError::invalid(PARAM_ZOOM, "a number > 0"));
        }
        if settings.shininess < 0.0 {
            return Err(ConfigurationError::invalid(PARAM_SHININESS, "a number >= 0"));
        }
        if settings.wave_noise < 0.0 {
            return Err(ConfigurationError::invalid(PARAM_WAVE_NOISE, "a number >= 0"));
        }
        let vertices = (u64::from(settings.grid_width) + 1) * (u64::from(settings.grid_height) + 1);
        if vertices > MAX_GRID_VERTICES {
            let name = if settings.grid_width >= settings.grid_height {
                PARAM_GRID_WIDTH
            } else {
                PARAM_GRID_HEIGHT
            };
            return Err(ConfigurationError::invalid(
                name,
                "small enough for at most 1000000 grid vertices",
            ));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(caller: OptionLayer) -> Result<WaveSettings, ConfigurationError> {
        let options =
            EffectOptions::resolve(WaveSettings::default_layer(), caller.with_el("#bg")).unwrap();
        WaveSettings::from_options(&options)
    }

    #[test]
    fn test_defaults_round_trip_through_options() {
        assert_eq!(resolve(OptionLayer::default()), Ok(WaveSettings::default()));
    }

    #[test]
    fn test_caller_overrides_defaults() {
        let settings = resolve(
            OptionLayer::default()
                .with_param(PARAM_WAVE_HEIGHT, 40.0)
                .with_param(PARAM_COLOR, "#ff8800")
                .with_param(PARAM_GRID_WIDTH, 12u32),
        )
        .unwrap();

        assert_eq!(settings.wave_height, 40.0);
        assert_eq!(settings.color, 0xff8800);
        assert_eq!(settings.grid_width, 12);
        assert_eq!(settings.grid_height, 80);
    }

    #[test]
    fn test_rejects_non_positive_zoom() {
        let result = resolve(OptionLayer::default().with_param(PARAM_ZOOM, 0.0));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidOption { ref name, .. }) if name == PARAM_ZOOM
        ));
    }

    #[test]
    fn test_rejects_oversized_grid() {
        let result = resolve(
            OptionLayer::default()
                .with_param(PARAM_GRID_WIDTH, 65535u32)
                .with_param(PARAM_GRID_HEIGHT, 65535u32),
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidOption { ref name, .. }) if name == PARAM_GRID_WIDTH
        ));
    }

    #[test]
    fn test_accepts_grid_at_vertex_limit() {
        let settings = resolve(
            OptionLayer::default()
                .with_param(PARAM_GRID_WIDTH, 999u32)
                .with_param(PARAM_GRID_HEIGHT, 999u32),
        )
        .unwrap();
        assert_eq!(settings.grid_width, 999);

        let result = resolve(
            OptionLayer::default()
                .with_param(PARAM_GRID_WIDTH, 999u32)
                .with_param(PARAM_GRID_HEIGHT, 1000u32),
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidOption { ref name, .. }) if name == PARAM_GRID_HEIGHT
        ));
    }

    #[test]
    fn test_rejects_fractional_grid() {
        assert!(resolve(OptionLayer::default().with_param(PARAM_GRID_HEIGHT, 2.5)).is_err());
    }
}

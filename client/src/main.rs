mod config;
mod headless;
mod input;
mod plugin;
mod rendering;

use std::error::Error;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy::window::PresentMode;
use clap::Parser;
use config::{load_layer, write_layer, ViewerConfig, DEFAULT_CONTAINER};
use plugin::EffectPlugin;
use wavefx::options::{OptionLayer, ParamValue};
use wavefx::registry::EffectRegistry;
use wavefx::utils::parse_hex_color;
use wavefx::waves::{
    PARAM_COLOR, PARAM_GRID_HEIGHT, PARAM_GRID_WIDTH, PARAM_SHININESS, PARAM_WAVE_HEIGHT,
    PARAM_WAVE_NOISE, PARAM_WAVE_SPEED, PARAM_ZOOM, WAVES_EFFECT_NAME,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = WAVES_EFFECT_NAME, help = "Effect to run")]
    effect: String,

    #[arg(short, long, help = "RON file with an option layer, overridden by flags")]
    config: Option<PathBuf>,

    #[arg(long, help = "Container to mount into, defaults to the primary window")]
    el: Option<String>,

    #[arg(long, help = "Surface color as hex, e.g. #021896")]
    color: Option<String>,

    #[arg(long)]
    shininess: Option<f32>,

    #[arg(long)]
    wave_height: Option<f32>,

    #[arg(long)]
    wave_speed: Option<f32>,

    #[arg(long)]
    zoom: Option<f32>,

    #[arg(long)]
    wave_noise: Option<f32>,

    #[arg(long)]
    grid_width: Option<u32>,

    #[arg(long)]
    grid_height: Option<u32>,

    #[arg(long)]
    min_width: Option<f32>,

    #[arg(long)]
    min_height: Option<f32>,

    #[arg(long)]
    scale: Option<f32>,

    #[arg(long)]
    scale_mobile: Option<f32>,

    #[arg(long, help = "Ignore mouse movement")]
    no_mouse: bool,

    #[arg(long, help = "Ignore touch movement")]
    no_touch: bool,

    #[arg(long, help = "Follow device orientation")]
    gyro: bool,

    #[arg(long, help = "Run without a window against the in-memory backend")]
    headless: bool,

    #[arg(long, default_value_t = 600, help = "Frames to render in headless mode")]
    frames: u64,

    #[arg(long, help = "Write the merged options to this RON file and exit")]
    write_config: Option<PathBuf>,
}

impl Args {
    fn option_layer(&self) -> Result<OptionLayer, Box<dyn Error>> {
        let mut layer = OptionLayer {
            el: self.el.clone(),
            mouse_controls: self.no_mouse.then_some(false),
            touch_controls: self.no_touch.then_some(false),
            gyro_controls: self.gyro.then_some(true),
            min_height: self.min_height,
            min_width: self.min_width,
            scale: self.scale,
            scale_mobile: self.scale_mobile,
            ..Default::default()
        };

        if let Some(color) = &self.color {
            let color = parse_hex_color(color).ok_or_else(|| format!("invalid color `{color}`"))?;
            layer.params.insert(PARAM_COLOR.to_string(), ParamValue::from(color));
        }

        let floats = [
            (PARAM_SHININESS, self.shininess),
            (PARAM_WAVE_HEIGHT, self.wave_height),
            (PARAM_WAVE_SPEED, self.wave_speed),
            (PARAM_ZOOM, self.zoom),
            (PARAM_WAVE_NOISE, self.wave_noise),
        ];
        for (name, value) in floats {
            if let Some(value) = value {
                layer.params.insert(name.to_string(), ParamValue::from(value));
            }
        }

        let integers = [
            (PARAM_GRID_WIDTH, self.grid_width),
            (PARAM_GRID_HEIGHT, self.grid_height),
        ];
        for (name, value) in integers {
            if let Some(value) = value {
                layer.params.insert(name.to_string(), ParamValue::from(value));
            }
        }

        Ok(layer)
    }

    /// File layer under the flag layer.
    fn viewer_config(&self) -> Result<ViewerConfig, Box<dyn Error>> {
        let file_layer = match &self.config {
            Some(path) => load_layer(path)?,
            None => OptionLayer::default(),
        };
        Ok(ViewerConfig {
            effect: self.effect.clone(),
            options: self.option_layer()?.layered_over(file_layer),
        })
    }
}

fn write_merged(
    config: &ViewerConfig,
    registry: &EffectRegistry,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let effect = registry.create(&config.effect)?;
    let merged = config
        .options
        .clone()
        .layered_over(effect.default_options())
        .layered_over(OptionLayer::base_defaults().with_el(DEFAULT_CONTAINER));
    write_layer(&merged, path)
}

fn main() -> AppExit {
    let args = Args::parse();
    let registry = EffectRegistry::with_builtin();

    let config = match args.viewer_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return AppExit::error();
        }
    };

    if let Some(path) = &args.write_config {
        return match write_merged(&config, &registry, path) {
            Ok(()) => {
                println!("Wrote options to {}", path.display());
                AppExit::Success
            }
            Err(e) => {
                eprintln!("Failed to write {}: {e}", path.display());
                AppExit::error()
            }
        };
    }

    if args.headless {
        return headless::run(&config, &registry, args.frames);
    }

    println!(
        "Starting `{}` in container `{}`",
        config.effect,
        config.container()
    );

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "wavefx".to_string(),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(registry)
        .insert_resource(config)
        .add_plugins(EffectPlugin)
        .run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("wavefx").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.effect, "waves");
        assert_eq!(args.frames, 600);
        let layer = args.option_layer().unwrap();
        assert_eq!(layer, OptionLayer::default());
    }

    #[test]
    fn test_flags_become_options() {
        let args = parse(&[
            "--color",
            "#ff8800",
            "--grid-width",
            "12",
            "--wave-speed",
            "0.5",
            "--no-mouse",
            "--gyro",
            "--el",
            "side",
        ]);
        let layer = args.option_layer().unwrap();
        assert_eq!(layer.el.as_deref(), Some("side"));
        assert_eq!(layer.mouse_controls, Some(false));
        assert_eq!(layer.touch_controls, None);
        assert_eq!(layer.gyro_controls, Some(true));
        assert_eq!(layer.params[PARAM_COLOR].as_color(), Some(0xff8800));
        assert_eq!(layer.params[PARAM_GRID_WIDTH].as_u32(), Some(12));
        assert_eq!(layer.params[PARAM_WAVE_SPEED].as_f64(), Some(0.5));
    }

    #[test]
    fn test_bad_color_is_rejected() {
        assert!(parse(&["--color", "teal"]).option_layer().is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let path = std::env::temp_dir()
            .join(format!("wavefx-main-{}", std::process::id()))
            .join("layer.ron");
        let file = OptionLayer::default()
            .with_param(PARAM_ZOOM, 3.0)
            .with_param(PARAM_WAVE_NOISE, 2.0);
        write_layer(&file, &path).unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let config = parse(&["--config", &path_arg, "--zoom", "1.5"])
            .viewer_config()
            .unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.options.params[PARAM_ZOOM].as_f64(), Some(1.5));
        assert_eq!(config.options.params[PARAM_WAVE_NOISE].as_f64(), Some(2.0));
    }

    #[test]
    fn test_write_merged_includes_defaults() {
        let path = std::env::temp_dir()
            .join(format!("wavefx-merged-{}", std::process::id()))
            .join("merged.ron");
        let config = parse(&["--grid-height", "7"]).viewer_config().unwrap();
        write_merged(&config, &EffectRegistry::with_builtin(), &path).unwrap();

        let merged = load_layer(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(merged.el.as_deref(), Some(DEFAULT_CONTAINER));
        assert_eq!(merged.mouse_controls, Some(true));
        assert_eq!(merged.params[PARAM_GRID_HEIGHT].as_u32(), Some(7));
        assert_eq!(merged.params[PARAM_GRID_WIDTH].as_u32(), Some(100));
        assert_eq!(merged.params[PARAM_COLOR].as_color(), Some(0x021896));
    }
}

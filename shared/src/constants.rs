pub const REFERENCE_FRAME_RATE: f64 = 60.0;

pub const DEFAULT_MOUSE_CONTROLS: bool = true;
pub const DEFAULT_TOUCH_CONTROLS: bool = true;
pub const DEFAULT_GYRO_CONTROLS: bool = false;
pub const DEFAULT_MIN_WIDTH: f32 = 200.0;
pub const DEFAULT_MIN_HEIGHT: f32 = 200.0;
pub const DEFAULT_SCALE: f32 = 1.0;
pub const DEFAULT_SCALE_MOBILE: f32 = 1.0;

/// Background installed on the container when an effect fails to initialize.
pub const FALLBACK_BACKGROUND: u32 = 0x000000;

pub const CONTAINER_MISSING_ERROR: &str = "Instance needs an \"el\" param";
pub const CONTAINER_NOT_FOUND_ERROR: &str = "Cannot find element";
pub const INIT_ERROR: &str = "Init error";
pub const UPDATE_ERROR: &str = "Update error, stopping render loop";
pub const RENDER_ERROR: &str = "Render error, stopping render loop";

/// ハードウェア制御モジュール
pub mod camera;
pub mod pins;

pub use camera::{Camera, CameraDriver, CameraError, FrameBuffer};
#[cfg(feature = "esp")]
pub use pins::CameraPins;
pub use pins::{CameraPinMap, CaptureConfig, FrameSize, PixelFormat, AI_THINKER_PINS};

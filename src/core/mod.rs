/// コアシステムモジュール
pub mod app_controller;
pub mod config;
pub mod config_validation;
pub mod data_prep;

pub use app_controller::{build_upload_body, AppController, CaptureUploadError, UploadReport};
pub use config::{AppConfig, ConfigError, RawConfig, UploadSettings};
pub use config_validation::{UploadUrl, ValidationError};
pub use data_prep::{image_sha256_hex, looks_like_jpeg};

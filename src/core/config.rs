use std::time::Duration;

use crate::communication::association::{AssociationPolicy, WifiCredentials};
use crate::communication::multipart::{
    validate_boundary, validate_field_value, validate_header_value, MultipartError,
};
use crate::core::config_validation::{
    parse_connect_timeout_ms, parse_fb_count, parse_form_fields, parse_frame_size,
    parse_jpeg_quality, parse_poll_interval_ms, parse_upload_url, validate_wifi_ssid, UploadUrl,
    ValidationError,
};
use crate::hardware::pins::{CameraPinMap, CaptureConfig, FrameSize};

/// アプリケーション設定
///
/// この構造体はビルド時に`build.rs`によって`cfg.toml`ファイルから
/// 読み込まれた設定を保持します。
#[toml_cfg::toml_config]
pub struct Config {
    #[default("")]
    wifi_ssid: &'static str,

    #[default("")]
    wifi_password: &'static str,

    #[default(30)] // 0 = タイムアウトなし
    wifi_connect_timeout_seconds: u64,

    #[default(500)]
    wifi_poll_interval_ms: u32,

    #[default("http://192.168.1.100:5000/upload")]
    upload_url: &'static str,

    #[default(30)]
    http_timeout_seconds: u64,

    #[default(1024)]
    response_body_limit: usize,

    #[default("----ESP32CamBoundary")]
    multipart_boundary: &'static str,

    #[default("file")]
    upload_field_name: &'static str,

    #[default("esp32.jpg")]
    upload_file_name: &'static str,

    #[default("")]
    upload_form_fields: &'static str,

    #[default("VGA")]
    frame_size: &'static str,

    #[default(12)]
    jpeg_quality: u8,

    #[default(1)]
    fb_count: u8,

    #[default(20000000)]
    xclk_freq_hz: u32,
}

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("WiFi SSIDが設定されていません。cfg.tomlを確認してください。")]
    MissingWifiSsid,
    #[error("アップロード先URLが不正です: {0}")]
    InvalidUploadUrl(String),
    #[error("未対応のURLスキームです (http のみ対応): {0}")]
    UnsupportedScheme(String),
    #[error("無効なフレームサイズ: {0}")]
    InvalidFrameSize(String),
    #[error("jpeg_quality の値が無効です (0-63): {0}")]
    InvalidJpegQuality(u8),
    #[error("fb_count の値が無効です (1以上): {0}")]
    InvalidFbCount(u8),
    #[error("wifi_poll_interval_ms の値が無効です (1以上): {0}")]
    InvalidPollInterval(u32),
    #[error("upload_form_fields の書式が不正です: {0}")]
    InvalidFormField(String),
    #[error(transparent)]
    InvalidBoundary(#[from] MultipartError),
    #[error("アップロードのフィールド設定が不正です: {0}")]
    InvalidUploadField(MultipartError),
}

/// 設定値の生データ（`cfg.toml` 由来）
#[derive(Debug, Clone)]
pub struct RawConfig<'a> {
    pub wifi_ssid: &'a str,
    pub wifi_password: &'a str,
    pub wifi_connect_timeout_seconds: u64,
    pub wifi_poll_interval_ms: u32,
    pub upload_url: &'a str,
    pub http_timeout_seconds: u64,
    pub response_body_limit: usize,
    pub multipart_boundary: &'a str,
    pub upload_field_name: &'a str,
    pub upload_file_name: &'a str,
    pub upload_form_fields: &'a str,
    pub frame_size: &'a str,
    pub jpeg_quality: u8,
    pub fb_count: u8,
    pub xclk_freq_hz: u32,
}

impl RawConfig<'static> {
    /// ビルド時に埋め込まれた設定
    pub fn embedded() -> Self {
        let config = CONFIG;
        Self {
            wifi_ssid: config.wifi_ssid,
            wifi_password: config.wifi_password,
            wifi_connect_timeout_seconds: config.wifi_connect_timeout_seconds,
            wifi_poll_interval_ms: config.wifi_poll_interval_ms,
            upload_url: config.upload_url,
            http_timeout_seconds: config.http_timeout_seconds,
            response_body_limit: config.response_body_limit,
            multipart_boundary: config.multipart_boundary,
            upload_field_name: config.upload_field_name,
            upload_file_name: config.upload_file_name,
            upload_form_fields: config.upload_form_fields,
            frame_size: config.frame_size,
            jpeg_quality: config.jpeg_quality,
            fb_count: config.fb_count,
            xclk_freq_hz: config.xclk_freq_hz,
        }
    }
}

/// アップロード関連の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub url: UploadUrl,
    pub boundary: String,
    pub field_name: String,
    pub file_name: String,
    pub form_fields: Vec<(String, String)>,
}

/// アプリケーション設定を表す構造体
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// WiFi SSID
    pub wifi_ssid: String,

    /// WiFiパスワード（空ならオープンネットワーク）
    pub wifi_password: String,

    /// WiFi接続タイムアウト（None = 無期限）
    pub wifi_connect_timeout_ms: Option<u64>,

    /// WiFi接続状態のポーリング間隔（ミリ秒）
    pub wifi_poll_interval_ms: u32,

    /// アップロード先
    pub upload: UploadSettings,

    /// HTTPクライアントのタイムアウト
    pub http_timeout: Duration,

    /// ログに出力するレスポンス本文の最大バイト数
    pub response_body_limit: usize,

    /// フレームサイズ
    pub frame_size: FrameSize,

    /// JPEG品質（0-63）
    pub jpeg_quality: u8,

    /// フレームバッファ数
    pub fb_count: u8,

    /// XCLK周波数（Hz）
    pub xclk_freq_hz: u32,
}

impl AppConfig {
    /// 設定ファイルから設定をロードします
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_raw(&RawConfig::embedded())
    }

    pub fn from_raw(raw: &RawConfig<'_>) -> Result<Self, ConfigError> {
        validate_wifi_ssid(raw.wifi_ssid).map_err(map_validation_error)?;

        let wifi_connect_timeout_ms = parse_connect_timeout_ms(raw.wifi_connect_timeout_seconds);
        let wifi_poll_interval_ms =
            parse_poll_interval_ms(raw.wifi_poll_interval_ms).map_err(map_validation_error)?;

        // アップロード先の検証
        let url = parse_upload_url(raw.upload_url).map_err(map_validation_error)?;
        validate_boundary(raw.multipart_boundary)?;
        let form_fields =
            parse_form_fields(raw.upload_form_fields).map_err(map_validation_error)?;
        validate_upload_fields(raw, &form_fields).map_err(ConfigError::InvalidUploadField)?;

        // カメラ設定の検証
        let frame_size = parse_frame_size(raw.frame_size).map_err(map_validation_error)?;
        let jpeg_quality = parse_jpeg_quality(raw.jpeg_quality).map_err(map_validation_error)?;
        let fb_count = parse_fb_count(raw.fb_count).map_err(map_validation_error)?;

        Ok(AppConfig {
            wifi_ssid: raw.wifi_ssid.to_string(),
            wifi_password: raw.wifi_password.to_string(),
            wifi_connect_timeout_ms,
            wifi_poll_interval_ms,
            upload: UploadSettings {
                url,
                boundary: raw.multipart_boundary.to_string(),
                field_name: raw.upload_field_name.to_string(),
                file_name: raw.upload_file_name.to_string(),
                form_fields,
            },
            http_timeout: Duration::from_secs(raw.http_timeout_seconds),
            response_body_limit: raw.response_body_limit,
            frame_size,
            jpeg_quality,
            fb_count,
            xclk_freq_hz: raw.xclk_freq_hz,
        })
    }

    pub fn wifi_credentials(&self) -> WifiCredentials {
        WifiCredentials {
            ssid: self.wifi_ssid.clone(),
            password: self.wifi_password.clone(),
        }
    }

    pub fn association_policy(&self) -> AssociationPolicy {
        AssociationPolicy {
            poll_interval_ms: self.wifi_poll_interval_ms,
            timeout_ms: self.wifi_connect_timeout_ms,
        }
    }

    /// カメラ初期化設定を組み立てる
    pub fn capture_config(&self, pins: CameraPinMap) -> CaptureConfig {
        CaptureConfig::new(pins, self.frame_size)
            .with_jpeg_quality(self.jpeg_quality)
            .with_fb_count(self.fb_count)
            .with_xclk_freq_hz(self.xclk_freq_hz)
    }
}

/// multipart に埋め込む名前と値を撮影前に検証する
fn validate_upload_fields(
    raw: &RawConfig<'_>,
    form_fields: &[(String, String)],
) -> Result<(), MultipartError> {
    validate_header_value(raw.upload_field_name)?;
    validate_header_value(raw.upload_file_name)?;
    for (name, value) in form_fields {
        validate_header_value(name)?;
        validate_field_value(value, raw.multipart_boundary)?;
    }
    Ok(())
}

fn map_validation_error(err: ValidationError) -> ConfigError {
    match err {
        ValidationError::MissingWifiSsid => ConfigError::MissingWifiSsid,
        ValidationError::InvalidUploadUrl(v) => ConfigError::InvalidUploadUrl(v),
        ValidationError::UnsupportedScheme(v) => ConfigError::UnsupportedScheme(v),
        ValidationError::InvalidFrameSize(v) => ConfigError::InvalidFrameSize(v),
        ValidationError::InvalidJpegQuality(v) => ConfigError::InvalidJpegQuality(v),
        ValidationError::InvalidFbCount(v) => ConfigError::InvalidFbCount(v),
        ValidationError::InvalidPollInterval(v) => ConfigError::InvalidPollInterval(v),
        ValidationError::InvalidFormField(v) => ConfigError::InvalidFormField(v),
    }
}

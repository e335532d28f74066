/*!
 * # ESP32-CAM Image Uploader Library
 *
 * ESP32カメラで画像を1枚撮影し、multipart/form-data で HTTP サーバーへ送信するためのライブラリ
 *
 * ## モジュール構成
 * - `core`: アプリケーションの核となる機能（設定、キャプチャ〜アップロードの制御）
 * - `hardware`: ハードウェア制御（カメラ、ピン設定）
 * - `communication`: 通信機能（WiFi接続、multipart組み立て、HTTP送信）
 *
 * `esp` フィーチャーを無効にするとホスト上でモック実装を使ってテストできます。
 */

// 公開モジュール
pub mod communication;
pub mod core;
pub mod hardware;

// 内部で使用する型をまとめてエクスポート
pub use crate::communication::{HttpTransport, MultipartBody, MultipartBuilder, UploadOutcome};
pub use crate::core::{AppConfig, AppController, ConfigError, UploadReport};
pub use crate::hardware::{Camera, CameraDriver, CameraError, CaptureConfig, FrameBuffer};

/// ライブラリのバージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! カメラ制御モジュール
//!
//! `CameraDriver` トレイトを実装することで、実機用（esp32-camera）と
//! テスト用（Mock）のドライバを切り替えることができます。

#[cfg(feature = "esp")]
pub mod controller;

// Mock実装（テストとnon-espビルドで使用可能）
#[cfg(not(feature = "esp"))]
pub mod mock;

#[cfg(feature = "esp")]
pub use controller::{EspCameraDriver, EspFrame};

use log::{error, info};

use crate::hardware::pins::CaptureConfig;

/// カメラ操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("カメラ設定が不正です: {0}")]
    InvalidConfig(&'static str),
    #[error("カメラの初期化に失敗しました (esp_err_t: {code})")]
    InitFailed { code: i32 },
    #[error("カメラのキャプチャに失敗しました")]
    CaptureFailed,
}

/// カメラペリフェラルのドライバ抽象
pub trait CameraDriver {
    /// 取得したフレーム。JPEGバイト列として参照できる
    type Frame: AsRef<[u8]>;

    /// 設定を適用してペリフェラルを起動する
    fn init(&mut self, config: CaptureConfig) -> Result<(), CameraError>;

    /// バッファプールからフレームを1枚取得する
    fn acquire(&mut self) -> Option<Self::Frame>;

    /// 取得したフレームをプールへ返却する
    fn release(&mut self, frame: Self::Frame);
}

/// 初期化済みカメラ
///
/// `Camera::init` が成功した場合のみ値が存在するため、
/// 初期化に失敗したドライバでキャプチャすることはできない。
pub struct Camera<D: CameraDriver> {
    driver: D,
}

impl<D: CameraDriver> Camera<D> {
    /// 設定を消費してカメラを初期化
    pub fn init(mut driver: D, config: CaptureConfig) -> Result<Self, CameraError> {
        config.validate().map_err(CameraError::InvalidConfig)?;

        info!(
            "カメラを初期化しています: {}, JPEG品質 {}, バッファ数 {}",
            config.frame_size, config.jpeg_quality, config.fb_count
        );
        driver.init(config).map_err(|e| {
            error!("Camera init failed! {}", e);
            e
        })?;

        Ok(Self { driver })
    }

    /// フレームを1枚キャプチャ
    ///
    /// 返された `FrameBuffer` が生きている間は `&mut self` を借用し続けるため、
    /// 次のキャプチャは前のフレームを返却するまで開始できない。
    pub fn capture(&mut self) -> Result<FrameBuffer<'_, D>, CameraError> {
        match self.driver.acquire() {
            Some(frame) => Ok(FrameBuffer {
                driver: &mut self.driver,
                frame: Some(frame),
            }),
            None => {
                error!("Camera capture failed!");
                Err(CameraError::CaptureFailed)
            }
        }
    }
}

/// ドライバから借用したフレームバッファ
///
/// コピーせずに画像データを参照し、drop 時に一度だけプールへ返却する。
pub struct FrameBuffer<'a, D: CameraDriver> {
    driver: &'a mut D,
    frame: Option<D::Frame>,
}

impl<D: CameraDriver> FrameBuffer<'_, D> {
    pub fn data(&self) -> &[u8] {
        match &self.frame {
            Some(frame) => AsRef::<[u8]>::as_ref(frame),
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}

impl<D: CameraDriver> Drop for FrameBuffer<'_, D> {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.driver.release(frame);
        }
    }
}

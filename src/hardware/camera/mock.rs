use std::sync::{Arc, Mutex};

use super::{CameraDriver, CameraError};
use crate::hardware::pins::CaptureConfig;

/// テスト用のカメラドライバモック実装
///
/// 実機のesp32-cameraを使わずに初期化・キャプチャ・返却をシミュレートします。
/// 呼び出し回数を記録するため、ドライバを `Camera` に渡した後でも
/// `clone()` したハンドルから検証できます。
#[derive(Debug, Clone)]
pub struct MockCamera {
    /// 初期化の結果（Noneなら成功）
    pub init_error: Arc<Mutex<Option<CameraError>>>,
    /// キャプチャで返すフレーム（Noneならキャプチャ失敗）
    pub frame: Arc<Mutex<Option<Vec<u8>>>>,
    /// 初期化に渡された設定
    pub applied_config: Arc<Mutex<Option<CaptureConfig>>>,
    pub init_calls: Arc<Mutex<usize>>,
    pub acquire_calls: Arc<Mutex<usize>>,
    pub release_calls: Arc<Mutex<usize>>,
    /// 返却されたフレームの記録
    pub released_frames: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCamera {
    /// 空のフレームを返すモックを作成します
    pub fn new() -> Self {
        Self {
            init_error: Arc::new(Mutex::new(None)),
            frame: Arc::new(Mutex::new(Some(Vec::new()))),
            applied_config: Arc::new(Mutex::new(None)),
            init_calls: Arc::new(Mutex::new(0)),
            acquire_calls: Arc::new(Mutex::new(0)),
            release_calls: Arc::new(Mutex::new(0)),
            released_frames: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// テスト用: 指定したバイト列を返すモック
    pub fn with_frame(data: Vec<u8>) -> Self {
        let mock = Self::new();
        *mock.frame.lock().unwrap() = Some(data);
        mock
    }

    /// テスト用: 初期化エラーをシミュレート
    pub fn set_init_error(&self, code: i32) {
        *self.init_error.lock().unwrap() = Some(CameraError::InitFailed { code });
    }

    /// テスト用: キャプチャ失敗をシミュレート
    pub fn set_capture_failure(&self) {
        *self.frame.lock().unwrap() = None;
    }

    pub fn init_count(&self) -> usize {
        *self.init_calls.lock().unwrap()
    }

    pub fn acquire_count(&self) -> usize {
        *self.acquire_calls.lock().unwrap()
    }

    pub fn release_count(&self) -> usize {
        *self.release_calls.lock().unwrap()
    }

    pub fn applied_config(&self) -> Option<CaptureConfig> {
        self.applied_config.lock().unwrap().clone()
    }
}

impl CameraDriver for MockCamera {
    type Frame = Vec<u8>;

    fn init(&mut self, config: CaptureConfig) -> Result<(), CameraError> {
        *self.init_calls.lock().unwrap() += 1;
        *self.applied_config.lock().unwrap() = Some(config);

        match self.init_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn acquire(&mut self) -> Option<Self::Frame> {
        *self.acquire_calls.lock().unwrap() += 1;
        self.frame.lock().unwrap().clone()
    }

    fn release(&mut self, frame: Self::Frame) {
        *self.release_calls.lock().unwrap() += 1;
        self.released_frames.lock().unwrap().push(frame);
    }
}

use std::fmt;
use std::str::FromStr;

/// 未接続ピンを表す値（esp32-camera の慣例に合わせて -1）
pub const PIN_UNUSED: i32 = -1;

/// カメラ信号とGPIO番号の対応表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraPinMap {
    pub pwdn: i32,
    pub reset: i32,
    pub xclk: i32,
    pub sda: i32,
    pub scl: i32,
    /// D0-D7 (Y2-Y9)
    pub data: [i32; 8],
    pub vsync: i32,
    pub href: i32,
    pub pclk: i32,
}

/// AI Thinker ESP32-CAM の配線
pub const AI_THINKER_PINS: CameraPinMap = CameraPinMap {
    pwdn: 32,
    reset: PIN_UNUSED,
    xclk: 0,
    sda: 26,
    scl: 27,
    data: [5, 18, 19, 21, 36, 39, 34, 35],
    vsync: 25,
    href: 23,
    pclk: 22,
};

/// ピクセルフォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Jpeg,
}

/// 解像度クラス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSize {
    QVGA, // 320x240
    CIF,  // 400x296
    VGA,  // 640x480
    SVGA, // 800x600
    XGA,  // 1024x768
    SXGA, // 1280x1024
    UXGA, // 1600x1200
}

impl FrameSize {
    pub fn dimensions(&self) -> (u16, u16) {
        match self {
            FrameSize::QVGA => (320, 240),
            FrameSize::CIF => (400, 296),
            FrameSize::VGA => (640, 480),
            FrameSize::SVGA => (800, 600),
            FrameSize::XGA => (1024, 768),
            FrameSize::SXGA => (1280, 1024),
            FrameSize::UXGA => (1600, 1200),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未対応のフレームサイズです: {0}")]
pub struct UnknownFrameSize(pub String);

impl FromStr for FrameSize {
    type Err = UnknownFrameSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QVGA" => Ok(FrameSize::QVGA),
            "CIF" => Ok(FrameSize::CIF),
            "VGA" => Ok(FrameSize::VGA),
            "SVGA" => Ok(FrameSize::SVGA),
            "XGA" => Ok(FrameSize::XGA),
            "SXGA" => Ok(FrameSize::SXGA),
            "UXGA" => Ok(FrameSize::UXGA),
            _ => Err(UnknownFrameSize(s.to_string())),
        }
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "{:?} ({}x{})", self, w, h)
    }
}

/// カメラ初期化設定
///
/// 一度だけ組み立てられ、`Camera::init` に値として渡されて消費される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    pub pins: CameraPinMap,
    pub xclk_freq_hz: u32,
    /// LEDC タイマー番号（XCLK生成用）
    pub ledc_timer: u32,
    /// LEDC チャンネル番号
    pub ledc_channel: u32,
    pub pixel_format: PixelFormat,
    pub frame_size: FrameSize,
    /// 0-63（小さいほど高画質）
    pub jpeg_quality: u8,
    /// フレームバッファ数（1 = ダブルバッファリングなし）
    pub fb_count: u8,
}

impl CaptureConfig {
    pub const MAX_JPEG_QUALITY: u8 = 63;

    pub fn new(pins: CameraPinMap, frame_size: FrameSize) -> Self {
        Self {
            pins,
            frame_size,
            ..Self::default()
        }
    }

    pub fn with_jpeg_quality(mut self, jpeg_quality: u8) -> Self {
        self.jpeg_quality = jpeg_quality;
        self
    }

    pub fn with_fb_count(mut self, fb_count: u8) -> Self {
        self.fb_count = fb_count;
        self
    }

    pub fn with_xclk_freq_hz(mut self, xclk_freq_hz: u32) -> Self {
        self.xclk_freq_hz = xclk_freq_hz;
        self
    }

    /// ドライバへ渡す前の範囲チェック
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.fb_count == 0 {
            return Err("fb_count must be at least 1");
        }
        if self.jpeg_quality > Self::MAX_JPEG_QUALITY {
            return Err("jpeg_quality must be within 0-63");
        }
        if self.xclk_freq_hz == 0 {
            return Err("xclk_freq_hz cannot be zero");
        }
        Ok(())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            pins: AI_THINKER_PINS,
            xclk_freq_hz: 20_000_000,
            ledc_timer: 0,
            ledc_channel: 0,
            pixel_format: PixelFormat::Jpeg,
            frame_size: FrameSize::VGA,
            jpeg_quality: 12,
            fb_count: 1,
        }
    }
}

/// AI Thinker ESP32-CAM のカメラピン
///
/// GPIOの所有権を持つことで、他のドライバが同じピンを使えないようにする。
#[cfg(feature = "esp")]
pub struct CameraPins {
    pub pwdn: esp_idf_hal::gpio::Gpio32,
    pub xclk: esp_idf_hal::gpio::Gpio0,
    pub sda: esp_idf_hal::gpio::Gpio26,
    pub scl: esp_idf_hal::gpio::Gpio27,
    pub d0: esp_idf_hal::gpio::Gpio5,
    pub d1: esp_idf_hal::gpio::Gpio18,
    pub d2: esp_idf_hal::gpio::Gpio19,
    pub d3: esp_idf_hal::gpio::Gpio21,
    pub d4: esp_idf_hal::gpio::Gpio36,
    pub d5: esp_idf_hal::gpio::Gpio39,
    pub d6: esp_idf_hal::gpio::Gpio34,
    pub d7: esp_idf_hal::gpio::Gpio35,
    pub vsync: esp_idf_hal::gpio::Gpio25,
    pub href: esp_idf_hal::gpio::Gpio23,
    pub pclk: esp_idf_hal::gpio::Gpio22,
}

#[cfg(feature = "esp")]
impl CameraPins {
    /// 所有しているGPIOから番号表を組み立てる
    pub fn pin_map(&self) -> CameraPinMap {
        use esp_idf_hal::gpio::Pin;

        CameraPinMap {
            pwdn: self.pwdn.pin(),
            reset: PIN_UNUSED,
            xclk: self.xclk.pin(),
            sda: self.sda.pin(),
            scl: self.scl.pin(),
            data: [
                self.d0.pin(),
                self.d1.pin(),
                self.d2.pin(),
                self.d3.pin(),
                self.d4.pin(),
                self.d5.pin(),
                self.d6.pin(),
                self.d7.pin(),
            ],
            vsync: self.vsync.pin(),
            href: self.href.pin(),
            pclk: self.pclk.pin(),
        }
    }
}

use esp_idf_sys::{camera, ESP_OK};
use log::{info, warn};

use super::{CameraDriver, CameraError};
use crate::hardware::pins::{CameraPins, CaptureConfig, FrameSize, PixelFormat};

/// esp32-camera コンポーネントを使ったカメラドライバ
///
/// ドライバ内部のシングルトンは一度初期化したら解放しない。
pub struct EspCameraDriver {
    pins: CameraPins,
    initialized: bool,
}

impl EspCameraDriver {
    pub fn new(pins: CameraPins) -> Self {
        Self {
            pins,
            initialized: false,
        }
    }
}

fn to_pixformat(format: PixelFormat) -> camera::pixformat_t {
    match format {
        PixelFormat::Jpeg => camera::pixformat_t_PIXFORMAT_JPEG,
    }
}

fn to_framesize(size: FrameSize) -> camera::framesize_t {
    match size {
        FrameSize::QVGA => camera::framesize_t_FRAMESIZE_QVGA,
        FrameSize::CIF => camera::framesize_t_FRAMESIZE_CIF,
        FrameSize::VGA => camera::framesize_t_FRAMESIZE_VGA,
        FrameSize::SVGA => camera::framesize_t_FRAMESIZE_SVGA,
        FrameSize::XGA => camera::framesize_t_FRAMESIZE_XGA,
        FrameSize::SXGA => camera::framesize_t_FRAMESIZE_SXGA,
        FrameSize::UXGA => camera::framesize_t_FRAMESIZE_UXGA,
    }
}

impl CameraDriver for EspCameraDriver {
    type Frame = EspFrame;

    fn init(&mut self, config: CaptureConfig) -> Result<(), CameraError> {
        if config.pins != self.pins.pin_map() {
            return Err(CameraError::InvalidConfig(
                "pin map does not match the owned camera GPIOs",
            ));
        }

        let pins = config.pins;
        let camera_config = camera::camera_config_t {
            pin_pwdn: pins.pwdn,
            pin_reset: pins.reset,
            pin_xclk: pins.xclk,
            __bindgen_anon_1: camera::camera_config_t__bindgen_ty_1 {
                pin_sccb_sda: pins.sda,
            },
            __bindgen_anon_2: camera::camera_config_t__bindgen_ty_2 {
                pin_sccb_scl: pins.scl,
            },
            pin_d0: pins.data[0],
            pin_d1: pins.data[1],
            pin_d2: pins.data[2],
            pin_d3: pins.data[3],
            pin_d4: pins.data[4],
            pin_d5: pins.data[5],
            pin_d6: pins.data[6],
            pin_d7: pins.data[7],
            pin_vsync: pins.vsync,
            pin_href: pins.href,
            pin_pclk: pins.pclk,
            xclk_freq_hz: config.xclk_freq_hz as i32,
            ledc_timer: config.ledc_timer as _,
            ledc_channel: config.ledc_channel as _,
            pixel_format: to_pixformat(config.pixel_format),
            frame_size: to_framesize(config.frame_size),
            jpeg_quality: config.jpeg_quality as i32,
            fb_count: config.fb_count as usize,
            fb_location: camera::camera_fb_location_t_CAMERA_FB_IN_PSRAM,
            grab_mode: camera::camera_grab_mode_t_CAMERA_GRAB_WHEN_EMPTY,
            ..Default::default()
        };

        let err = unsafe { camera::esp_camera_init(&camera_config) };
        if err != ESP_OK as i32 {
            return Err(CameraError::InitFailed { code: err });
        }

        self.initialized = true;
        info!("カメラの初期化が完了しました");
        Ok(())
    }

    fn acquire(&mut self) -> Option<Self::Frame> {
        if !self.initialized {
            warn!("初期化前のカメラからフレームを取得しようとしました");
            return None;
        }

        let fb = unsafe { camera::esp_camera_fb_get() };
        if fb.is_null() {
            None
        } else {
            Some(EspFrame { fb })
        }
    }

    fn release(&mut self, frame: Self::Frame) {
        unsafe { camera::esp_camera_fb_return(frame.fb) };
    }
}

/// esp32-camera が所有するフレームバッファへのポインタ
///
/// `esp_camera_fb_return` されるまでの間だけ有効。
pub struct EspFrame {
    fb: *mut camera::camera_fb_t,
}

impl AsRef<[u8]> for EspFrame {
    fn as_ref(&self) -> &[u8] {
        // camera_fb_t は packed なフィールドを含むため unaligned read で読む
        unsafe {
            let buf = std::ptr::addr_of!((*self.fb).buf).read_unaligned();
            let len = std::ptr::addr_of!((*self.fb).len).read_unaligned();
            if buf.is_null() {
                &[]
            } else {
                std::slice::from_raw_parts(buf, len)
            }
        }
    }
}

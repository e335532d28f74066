//! フレームバッファの取得・返却をモックドライバで検証するテスト
#![cfg(not(feature = "esp"))]

use esp32_cam_uploader::hardware::camera::mock::MockCamera;
use esp32_cam_uploader::hardware::{Camera, CameraError, CaptureConfig};

#[test]
fn test_frame_is_released_when_dropped() {
    let mock = MockCamera::with_frame(vec![0xFF, 0xD8, 0xFF, 0xD9]);
    let mut camera = Camera::init(mock.clone(), CaptureConfig::default()).unwrap();

    {
        let frame = camera.capture().unwrap();
        assert_eq!(frame.len(), 4);
        assert_eq!(frame.data(), &[0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(mock.release_count(), 0);
    }

    assert_eq!(mock.release_count(), 1);
}

#[test]
fn test_sequential_captures_pair_acquire_and_release() {
    let mock = MockCamera::with_frame(vec![1, 2, 3]);
    let mut camera = Camera::init(mock.clone(), CaptureConfig::default()).unwrap();

    for _ in 0..3 {
        let frame = camera.capture().unwrap();
        assert!(!frame.is_empty());
    }

    assert_eq!(mock.acquire_count(), 3);
    assert_eq!(mock.release_count(), 3);
}

#[test]
fn test_failed_capture_has_nothing_to_release() {
    let mock = MockCamera::new();
    mock.set_capture_failure();
    let mut camera = Camera::init(mock.clone(), CaptureConfig::default()).unwrap();

    assert!(matches!(camera.capture(), Err(CameraError::CaptureFailed)));
    assert_eq!(mock.release_count(), 0);
}

#[test]
fn test_init_error_yields_no_camera() {
    let mock = MockCamera::new();
    mock.set_init_error(0x105);

    let result = Camera::init(mock.clone(), CaptureConfig::default());
    assert!(matches!(result, Err(CameraError::InitFailed { code: 0x105 })));
    assert_eq!(mock.acquire_count(), 0);
}

#[test]
fn test_out_of_range_quality_is_rejected_before_driver() {
    let mock = MockCamera::new();

    let result = Camera::init(mock.clone(), CaptureConfig::default().with_jpeg_quality(70));
    assert!(matches!(result, Err(CameraError::InvalidConfig(_))));
    assert_eq!(mock.init_count(), 0);
}

//! キャプチャ〜アップロードの一連の流れをモックで検証するテスト
//!
//! 実機のカメラ・HTTPクライアントの代わりに `MockCamera` / `MockTransport` を使い、
//! 初期化失敗・キャプチャ失敗・送信成功/失敗それぞれの分岐で
//! フレームの返却回数と送信回数を確認します。
#![cfg(not(feature = "esp"))]

use esp32_cam_uploader::communication::mock::MockTransport;
use esp32_cam_uploader::communication::{UploadOutcome, DEFAULT_BOUNDARY};
use esp32_cam_uploader::core::config_validation::parse_upload_url;
use esp32_cam_uploader::core::{AppController, CaptureUploadError, UploadSettings};
use esp32_cam_uploader::hardware::camera::mock::MockCamera;
use esp32_cam_uploader::hardware::{CameraError, CaptureConfig};

fn upload_settings() -> UploadSettings {
    UploadSettings {
        url: parse_upload_url("http://192.168.1.100:5000/upload").unwrap(),
        boundary: DEFAULT_BOUNDARY.to_string(),
        field_name: "file".to_string(),
        file_name: "esp32.jpg".to_string(),
        form_fields: Vec::new(),
    }
}

/// 既定のboundary・フィールド名でのプリアンブル＋トレーラ長
const FIXED_OVERHEAD: usize = 119 + 28;

#[test]
fn test_init_failure_skips_capture_and_upload() {
    let camera = MockCamera::with_frame(vec![0xFF; 10]);
    camera.set_init_error(-1);
    let mut transport = MockTransport::responding(200, "OK");

    let result = AppController::capture_and_upload(
        camera.clone(),
        CaptureConfig::default(),
        &mut transport,
        &upload_settings(),
    );

    assert!(matches!(
        result,
        Err(CaptureUploadError::Camera(CameraError::InitFailed { code: -1 }))
    ));
    assert_eq!(camera.init_count(), 1);
    assert_eq!(camera.acquire_count(), 0);
    assert_eq!(camera.release_count(), 0);
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_invalid_capture_config_never_reaches_driver() {
    let camera = MockCamera::with_frame(vec![0xFF; 10]);
    let mut transport = MockTransport::default();

    let result = AppController::capture_and_upload(
        camera.clone(),
        CaptureConfig::default().with_fb_count(0),
        &mut transport,
        &upload_settings(),
    );

    assert!(matches!(
        result,
        Err(CaptureUploadError::Camera(CameraError::InvalidConfig(_)))
    ));
    assert_eq!(camera.init_count(), 0);
    assert_eq!(camera.acquire_count(), 0);
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_capture_failure_releases_nothing() {
    let camera = MockCamera::new();
    camera.set_capture_failure();
    let mut transport = MockTransport::responding(200, "OK");

    let result = AppController::capture_and_upload(
        camera.clone(),
        CaptureConfig::default(),
        &mut transport,
        &upload_settings(),
    );

    assert!(matches!(
        result,
        Err(CaptureUploadError::Camera(CameraError::CaptureFailed))
    ));
    assert_eq!(camera.acquire_count(), 1);
    assert_eq!(camera.release_count(), 0);
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_fixed_payload_body_length_and_single_post() {
    let camera = MockCamera::with_frame(vec![0xFF; 10]);
    let mut transport = MockTransport::responding(200, "{\"status\":\"ok\"}");

    let report = AppController::capture_and_upload(
        camera.clone(),
        CaptureConfig::default(),
        &mut transport,
        &upload_settings(),
    )
    .unwrap();

    assert_eq!(report.frame_len, 10);
    assert_eq!(report.content_length, 10 + FIXED_OVERHEAD);
    assert_eq!(transport.call_count(), 1);

    let request = &transport.get_requests()[0];
    assert_eq!(request.url, "http://192.168.1.100:5000/upload");
    assert_eq!(request.body.len(), 10 + FIXED_OVERHEAD);
    assert_eq!(
        request.header("Content-Length"),
        Some((10 + FIXED_OVERHEAD).to_string().as_str())
    );
    assert_eq!(
        request.header("Content-Type"),
        Some("multipart/form-data; boundary=----ESP32CamBoundary")
    );
    assert!(request
        .body
        .starts_with(b"------ESP32CamBoundary\r\n"));
    assert!(request
        .body
        .ends_with(b"\r\n------ESP32CamBoundary--\r\n"));
    assert_eq!(&request.body[119..129], &[0xFF; 10]);
}

#[test]
fn test_success_response_logs_and_releases_once() {
    let camera = MockCamera::with_frame(vec![0xFF, 0xD8, 0x01, 0xFF, 0xD9]);
    let mut transport = MockTransport::responding(200, "uploaded");

    let report = AppController::capture_and_upload(
        camera.clone(),
        CaptureConfig::default(),
        &mut transport,
        &upload_settings(),
    )
    .unwrap();

    assert!(report.outcome.is_sent());
    assert_eq!(report.outcome.to_string(), "Server response (200): uploaded");
    assert_eq!(camera.release_count(), 1);
    assert_eq!(
        camera.released_frames.lock().unwrap()[0],
        vec![0xFF, 0xD8, 0x01, 0xFF, 0xD9]
    );
}

#[test]
fn test_transport_failure_logs_code_and_still_releases_once() {
    let camera = MockCamera::with_frame(vec![0xFF; 10]);
    let mut transport = MockTransport::responding(-1, "");

    let report = AppController::capture_and_upload(
        camera.clone(),
        CaptureConfig::default(),
        &mut transport,
        &upload_settings(),
    )
    .unwrap();

    assert!(matches!(report.outcome, UploadOutcome::Failed { code: -1, .. }));
    assert!(report
        .outcome
        .to_string()
        .starts_with("Error on sending POST: -1"));
    assert_eq!(transport.call_count(), 1);
    assert_eq!(camera.release_count(), 1);
}

#[test]
fn test_empty_frame_is_still_framed() {
    let camera = MockCamera::with_frame(Vec::new());
    let mut transport = MockTransport::default();

    let report = AppController::capture_and_upload(
        camera.clone(),
        CaptureConfig::default(),
        &mut transport,
        &upload_settings(),
    )
    .unwrap();

    assert_eq!(report.content_length, FIXED_OVERHEAD);
    let body = &transport.get_requests()[0].body;
    assert!(body.starts_with(b"------ESP32CamBoundary\r\n"));
    assert!(body.ends_with(b"\r\n------ESP32CamBoundary--\r\n"));
    assert_eq!(camera.release_count(), 1);
}

#[test]
fn test_extra_form_fields_and_field_name() {
    let camera = MockCamera::with_frame(vec![0x42; 3]);
    let mut transport = MockTransport::default();
    let mut settings = upload_settings();
    settings.field_name = "image".to_string();
    settings.form_fields = vec![("order_id".to_string(), "42".to_string())];

    let report = AppController::capture_and_upload(
        camera.clone(),
        CaptureConfig::default(),
        &mut transport,
        &settings,
    )
    .unwrap();

    let body = String::from_utf8_lossy(&transport.get_requests()[0].body).into_owned();
    assert!(body.starts_with(
        "------ESP32CamBoundary\r\nContent-Disposition: form-data; name=\"order_id\"\r\n\r\n42\r\n"
    ));
    assert!(body.contains("name=\"image\"; filename=\"esp32.jpg\""));
    assert_eq!(report.content_length, transport.get_requests()[0].body.len());
}

#[test]
fn test_capture_config_is_passed_to_driver() {
    let camera = MockCamera::with_frame(vec![0x00]);
    let mut transport = MockTransport::default();
    let config = CaptureConfig::default().with_jpeg_quality(20);

    AppController::capture_and_upload(
        camera.clone(),
        config.clone(),
        &mut transport,
        &upload_settings(),
    )
    .unwrap();

    assert_eq!(camera.applied_config(), Some(config));
}

#[test]
fn test_report_contains_frame_digest() {
    let camera = MockCamera::with_frame(Vec::new());
    let mut transport = MockTransport::default();

    let report = AppController::capture_and_upload(
        camera,
        CaptureConfig::default(),
        &mut transport,
        &upload_settings(),
    )
    .unwrap();

    assert_eq!(
        report.sha256,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

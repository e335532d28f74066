use log::{error, info, warn};

use crate::communication::multipart::{FilePart, MultipartBody, MultipartBuilder, MultipartError};
use crate::communication::transport::{HttpTransport, UploadOutcome};
use crate::core::config::UploadSettings;
use crate::core::data_prep::{image_sha256_hex, looks_like_jpeg};
use crate::hardware::camera::{Camera, CameraDriver, CameraError};
use crate::hardware::pins::CaptureConfig;

/// キャプチャ〜アップロードを中断させるエラー
#[derive(Debug, thiserror::Error)]
pub enum CaptureUploadError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error("multipart本文の組み立てに失敗しました: {0}")]
    Multipart(#[from] MultipartError),
}

/// アップロード1回分の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub frame_len: usize,
    pub content_length: usize,
    pub sha256: String,
    pub outcome: UploadOutcome,
}

/// アプリケーションの主要な制御フローを管理するモジュール
pub struct AppController;

impl AppController {
    /// カメラ初期化 → キャプチャ → 本文組み立て → POST → 返却 を一度だけ実行
    ///
    /// 初期化・キャプチャの失敗はその場で `Err` を返す。送信失敗は
    /// `UploadOutcome::Failed` としてログに残し、フレームは必ず一度だけ返却する。
    pub fn capture_and_upload<D, T>(
        driver: D,
        capture_config: CaptureConfig,
        transport: &mut T,
        upload: &UploadSettings,
    ) -> Result<UploadReport, CaptureUploadError>
    where
        D: CameraDriver,
        T: HttpTransport + ?Sized,
    {
        let mut camera = Camera::init(driver, capture_config)?;

        let frame = camera.capture()?;
        let frame_len = frame.len();
        let sha256 = image_sha256_hex(frame.data());
        info!("画像キャプチャ完了: {} bytes (sha256: {})", frame_len, sha256);
        if !looks_like_jpeg(frame.data()) {
            warn!("キャプチャしたデータにJPEGマーカーがありません");
        }

        let body = build_upload_body(upload, frame.data())?;
        let content_length = body.content_length();
        let content_length_header = content_length.to_string();
        let content_type = body.content_type();
        let headers = [
            ("Content-Type", content_type.as_str()),
            ("Content-Length", content_length_header.as_str()),
        ];

        let url = upload.url.to_string();
        let outcome = UploadOutcome::from_result(transport.post(&url, &headers, &body));
        if outcome.is_sent() {
            info!("{}", outcome);
        } else {
            error!("{}", outcome);
        }

        // 本文の借用を解いてからフレームをプールへ返却
        drop(body);
        drop(frame);

        Ok(UploadReport {
            frame_len,
            content_length,
            sha256,
            outcome,
        })
    }
}

/// 設定に従って multipart 本文を組み立てる
pub fn build_upload_body<'a>(
    upload: &'a UploadSettings,
    image: &'a [u8],
) -> Result<MultipartBody<'a>, MultipartError> {
    let mut builder = MultipartBuilder::new(&upload.boundary)?;
    for (name, value) in &upload.form_fields {
        builder = builder.text_field(name, value)?;
    }
    builder.file(FilePart::jpeg(&upload.field_name, &upload.file_name, image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config_validation::parse_upload_url;

    fn settings() -> UploadSettings {
        UploadSettings {
            url: parse_upload_url("http://192.168.1.100:5000/upload").unwrap(),
            boundary: "XyZ".to_string(),
            field_name: "image".to_string(),
            file_name: "esp32.jpg".to_string(),
            form_fields: vec![("order_id".to_string(), "42".to_string())],
        }
    }

    #[test]
    fn upload_body_borrows_settings_and_frame() {
        let upload = settings();
        let frame = vec![0xFF, 0xD8, 0xFF, 0xD9];

        let body = build_upload_body(&upload, &frame).unwrap();

        assert_eq!(body.payload(), frame.as_slice());
        assert_eq!(body.content_type(), "multipart/form-data; boundary=XyZ");
        let preamble = String::from_utf8(body.preamble().to_vec()).unwrap();
        assert!(preamble.starts_with("--XyZ\r\nContent-Disposition: form-data; name=\"order_id\""));
        assert!(preamble.contains("name=\"image\"; filename=\"esp32.jpg\""));
        assert_eq!(body.content_length(), body.to_bytes().len());
    }

    #[test]
    fn injected_field_value_is_rejected() {
        let mut upload = settings();
        upload.form_fields = vec![("note".to_string(), "a\r\n--XyZ\r\n".to_string())];

        let result = build_upload_body(&upload, &[]);
        assert!(matches!(result, Err(MultipartError::InvalidFieldValue(_))));
    }
}

use std::fmt;

use log::warn;

use crate::communication::multipart::MultipartBody;

/// サーバーからのレスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP送信のエラー
///
/// `code` は常に0以下。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP接続に失敗しました (code: {code}): {message}")]
    Connection { code: i32, message: String },
    #[error("リクエスト本文の書き込みに失敗しました (code: {code}): {message}")]
    Write { code: i32, message: String },
}

/// ESP-IDF のエラーコードを送信失敗コード（0以下）に変換する
pub fn failure_code(raw: i32) -> i32 {
    if raw > 0 {
        -raw
    } else {
        raw
    }
}

impl TransportError {
    pub fn code(&self) -> i32 {
        match self {
            TransportError::Connection { code, .. }
            | TransportError::Write { code, .. } => *code,
        }
    }
}

/// レスポンス本文を `limit` バイトまで読み取る
///
/// ステータスは受信済みなので、途中で読み取りに失敗しても
/// それまでに読めた分を返す。
pub fn read_body_lossy<F, E>(mut read: F, limit: usize) -> String
where
    F: FnMut(&mut [u8]) -> Result<usize, E>,
    E: fmt::Display,
{
    let mut received = Vec::new();
    let mut buf = [0u8; 256];
    while received.len() < limit {
        let n = match read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!("レスポンス本文の読み取りに失敗しました: {}", e);
                break;
            }
        };
        let take = n.min(limit - received.len());
        received.extend_from_slice(&buf[..take]);
    }
    String::from_utf8_lossy(&received).into_owned()
}

/// HTTP送信インターフェースのトレイト
///
/// このトレイトを実装することで、実機用とテスト用(Mock)の
/// 実装を切り替えることができます。
pub trait HttpTransport {
    /// multipart 本文を POST し、レスポンスを返す
    ///
    /// セッションは1回の呼び出しで閉じる。
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &MultipartBody<'_>,
    ) -> Result<UploadResponse, TransportError>;
}

/// アップロード1回分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// サーバーが正のステータスコードを返した
    Sent { status: u16, body: String },
    /// 送信自体が失敗した
    Failed { code: i32, reason: String },
}

impl UploadOutcome {
    pub fn from_result(result: Result<UploadResponse, TransportError>) -> Self {
        match result {
            Ok(response) if response.status > 0 => UploadOutcome::Sent {
                status: response.status,
                body: response.body,
            },
            Ok(response) => UploadOutcome::Failed {
                code: i32::from(response.status),
                reason: "no status code".to_string(),
            },
            Err(e) => UploadOutcome::Failed {
                code: e.code(),
                reason: e.to_string(),
            },
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, UploadOutcome::Sent { .. })
    }

    /// ステータスコード、または失敗時のエラーコード
    pub fn code(&self) -> i32 {
        match self {
            UploadOutcome::Sent { status, .. } => i32::from(*status),
            UploadOutcome::Failed { code, .. } => *code,
        }
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Sent { status, body } => {
                write!(f, "Server response ({}): {}", status, body)
            }
            UploadOutcome::Failed { code, reason } => {
                write!(f, "Error on sending POST: {} ({})", code, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_status_is_sent() {
        let outcome = UploadOutcome::from_result(Ok(UploadResponse {
            status: 200,
            body: "{\"ok\":true}".to_string(),
        }));
        assert!(outcome.is_sent());
        assert_eq!(outcome.code(), 200);
        assert_eq!(outcome.to_string(), "Server response (200): {\"ok\":true}");
    }

    #[test]
    fn non_2xx_status_is_still_sent() {
        let outcome = UploadOutcome::from_result(Ok(UploadResponse {
            status: 400,
            body: "No file part".to_string(),
        }));
        assert!(outcome.is_sent());
        assert_eq!(outcome.code(), 400);
    }

    #[test]
    fn transport_error_is_failed_with_code() {
        let outcome = UploadOutcome::from_result(Err(TransportError::Connection {
            code: -1,
            message: "connection refused".to_string(),
        }));
        assert!(!outcome.is_sent());
        assert_eq!(outcome.code(), -1);
        assert!(outcome.to_string().starts_with("Error on sending POST: -1"));
    }

    #[test]
    fn zero_status_is_treated_as_failure() {
        let outcome = UploadOutcome::from_result(Ok(UploadResponse {
            status: 0,
            body: String::new(),
        }));
        assert!(!outcome.is_sent());
        assert_eq!(outcome.code(), 0);
    }

    #[test]
    fn esp_error_codes_become_non_positive() {
        // ESP_ERR_HTTP_CONNECT
        assert_eq!(failure_code(0x7003), -0x7003);
        // ESP_FAIL
        assert_eq!(failure_code(-1), -1);

        let outcome = UploadOutcome::from_result(Err(TransportError::Connection {
            code: failure_code(0x7007),
            message: "ESP_ERR_HTTP_EAGAIN".to_string(),
        }));
        assert!(outcome.code() < 0);
        assert!(outcome.to_string().starts_with("Error on sending POST: -28679"));
    }

    #[test]
    fn body_read_error_keeps_partial_body() {
        let mut chunks = vec![Ok(b"upl".to_vec()), Err("ESP_ERR_HTTP_FETCH_HEADER")].into_iter();
        let body = read_body_lossy(
            |buf: &mut [u8]| -> Result<usize, &str> {
                let chunk = chunks.next().unwrap_or(Ok(Vec::new()))?;
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            },
            1024,
        );
        assert_eq!(body, "upl");

        let outcome = UploadOutcome::from_result(Ok(UploadResponse { status: 200, body }));
        assert!(outcome.is_sent());
        assert_eq!(outcome.to_string(), "Server response (200): upl");
    }

    #[test]
    fn body_is_truncated_to_limit() {
        let body = read_body_lossy(
            |buf: &mut [u8]| -> Result<usize, &str> {
                buf[..4].copy_from_slice(b"abcd");
                Ok(4)
            },
            6,
        );
        assert_eq!(body, "abcdab");
    }
}

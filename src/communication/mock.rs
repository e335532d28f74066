use std::sync::{Arc, Mutex};

use super::association::{AssociationError, WifiCredentials, WifiLink};
use super::multipart::MultipartBody;
use super::transport::{HttpTransport, TransportError, UploadResponse};

/// 送信されたリクエストの記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// テスト用のHTTP送信モック実装
///
/// 正のコードを設定するとそのステータスでレスポンスを返し、
/// 0以下のコードを設定すると接続エラーを返します。
#[derive(Debug, Clone)]
pub struct MockTransport {
    pub response_code: Arc<Mutex<i32>>,
    pub response_body: Arc<Mutex<String>>,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::responding(200, "OK")
    }
}

impl MockTransport {
    pub fn responding(code: i32, body: &str) -> Self {
        Self {
            response_code: Arc::new(Mutex::new(code)),
            response_body: Arc::new(Mutex::new(body.to_string())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// テスト用: 送信されたリクエストを取得
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HttpTransport for MockTransport {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &MultipartBody<'_>,
    ) -> Result<UploadResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_bytes(),
        });

        let code = *self.response_code.lock().unwrap();
        if code > 0 {
            Ok(UploadResponse {
                status: code as u16,
                body: self.response_body.lock().unwrap().clone(),
            })
        } else {
            Err(TransportError::Connection {
                code,
                message: "simulated connection failure".to_string(),
            })
        }
    }
}

/// テスト用の無線リンクモック実装
#[derive(Debug, Clone)]
pub struct MockWifiLink {
    /// 何回目のポーリングで接続済みになるか（Noneなら接続しない）
    pub connect_after_polls: Option<usize>,
    pub begin_error: Option<AssociationError>,
    pub begin_calls: Arc<Mutex<Vec<WifiCredentials>>>,
    pub poll_calls: Arc<Mutex<usize>>,
}

impl MockWifiLink {
    pub fn connecting_after(polls: usize) -> Self {
        Self {
            connect_after_polls: Some(polls),
            begin_error: None,
            begin_calls: Arc::new(Mutex::new(Vec::new())),
            poll_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn never_connecting() -> Self {
        Self {
            connect_after_polls: None,
            ..Self::connecting_after(0)
        }
    }

    pub fn poll_count(&self) -> usize {
        *self.poll_calls.lock().unwrap()
    }
}

impl WifiLink for MockWifiLink {
    fn begin(&mut self, credentials: &WifiCredentials) -> Result<(), AssociationError> {
        self.begin_calls.lock().unwrap().push(credentials.clone());
        match &self.begin_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn is_connected(&mut self) -> Result<bool, AssociationError> {
        let mut polls = self.poll_calls.lock().unwrap();
        let connected = match self.connect_after_polls {
            Some(after) => *polls >= after,
            None => false,
        };
        *polls += 1;
        Ok(connected)
    }
}

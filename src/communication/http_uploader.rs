use std::time::Duration;

use embedded_svc::http::client::Client;
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
use esp_idf_svc::io::{EspIOError, Read, Write};
use log::{debug, info};

use crate::communication::multipart::MultipartBody;
use crate::communication::transport::{
    failure_code, read_body_lossy, HttpTransport, TransportError, UploadResponse,
};

/// ESP-IDF の HTTP クライアントを使った送信実装
///
/// POST ごとに接続を作り、レスポンスを読み終えたら drop して閉じる。
pub struct EspHttpTransport {
    timeout: Duration,
    response_body_limit: usize,
}

impl EspHttpTransport {
    pub fn new(timeout: Duration, response_body_limit: usize) -> Self {
        Self {
            timeout,
            response_body_limit,
        }
    }
}

fn connection_error(e: impl Into<EspIOError>) -> TransportError {
    let e = e.into();
    TransportError::Connection {
        code: failure_code(e.0.code()),
        message: e.to_string(),
    }
}

fn write_error(e: EspIOError) -> TransportError {
    TransportError::Write {
        code: failure_code(e.0.code()),
        message: e.to_string(),
    }
}

impl HttpTransport for EspHttpTransport {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &MultipartBody<'_>,
    ) -> Result<UploadResponse, TransportError> {
        let connection = EspHttpConnection::new(&HttpConfiguration {
            timeout: Some(self.timeout),
            ..Default::default()
        })
        .map_err(connection_error)?;
        let mut client = Client::wrap(connection);

        info!("POST {} ({} bytes)", url, body.content_length());
        let mut request = client.post(url, headers).map_err(connection_error)?;

        for segment in body.segments() {
            request.write_all(segment).map_err(write_error)?;
        }
        request.flush().map_err(write_error)?;

        let mut response = request.submit().map_err(connection_error)?;
        let status = response.status();
        debug!("HTTPステータス: {}", status);

        let response_body = read_body_lossy(
            |buf: &mut [u8]| {
                response
                    .read(buf)
                    .map_err(|e| format!("code {}: {}", failure_code(e.0.code()), e))
            },
            self.response_body_limit,
        );

        Ok(UploadResponse {
            status,
            body: response_body,
        })
    }
}

use std::fmt;

use crate::hardware::pins::{CaptureConfig, FrameSize};

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingWifiSsid,
    InvalidUploadUrl(String),
    UnsupportedScheme(String),
    InvalidFrameSize(String),
    InvalidJpegQuality(u8),
    InvalidFbCount(u8),
    InvalidPollInterval(u32),
    InvalidFormField(String),
}

/// アップロード先URL（平文HTTPのみ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadUrl {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl fmt::Display for UploadUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == 80 {
            write!(f, "http://{}{}", self.host, self.path)
        } else {
            write!(f, "http://{}:{}{}", self.host, self.port, self.path)
        }
    }
}

pub fn validate_wifi_ssid(ssid: &str) -> Result<(), ValidationError> {
    if ssid.is_empty() {
        Err(ValidationError::MissingWifiSsid)
    } else {
        Ok(())
    }
}

pub fn parse_upload_url(url: &str) -> Result<UploadUrl, ValidationError> {
    let invalid = || ValidationError::InvalidUploadUrl(url.to_string());

    let (scheme, rest) = url.split_once("://").ok_or_else(invalid)?;
    if !scheme.eq_ignore_ascii_case("http") {
        return Err(ValidationError::UnsupportedScheme(scheme.to_string()));
    }

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, "/"),
    };
    if authority.is_empty() || authority.contains(['@', '[', ']', ' ']) {
        return Err(invalid());
    }

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port.parse().map_err(|_| invalid())?;
            (host, port)
        }
        None => (authority, 80),
    };
    if host.is_empty() || port == 0 {
        return Err(invalid());
    }

    Ok(UploadUrl {
        host: host.to_string(),
        port,
        path: path.to_string(),
    })
}

pub fn parse_frame_size(value: &str) -> Result<FrameSize, ValidationError> {
    value
        .parse()
        .map_err(|_| ValidationError::InvalidFrameSize(value.to_string()))
}

pub fn parse_jpeg_quality(value: u8) -> Result<u8, ValidationError> {
    if value > CaptureConfig::MAX_JPEG_QUALITY {
        Err(ValidationError::InvalidJpegQuality(value))
    } else {
        Ok(value)
    }
}

pub fn parse_fb_count(value: u8) -> Result<u8, ValidationError> {
    if value == 0 {
        Err(ValidationError::InvalidFbCount(value))
    } else {
        Ok(value)
    }
}

pub fn parse_poll_interval_ms(value: u32) -> Result<u32, ValidationError> {
    if value == 0 {
        Err(ValidationError::InvalidPollInterval(value))
    } else {
        Ok(value)
    }
}

/// 0秒はタイムアウトなし（接続できるまで待ち続ける）
pub fn parse_connect_timeout_ms(seconds: u64) -> Option<u64> {
    if seconds == 0 {
        None
    } else {
        Some(seconds.saturating_mul(1000))
    }
}

/// `k=v;k=v` 形式の追加フォームフィールドをパース
pub fn parse_form_fields(value: &str) -> Result<Vec<(String, String)>, ValidationError> {
    value
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, field_value) = entry
                .split_once('=')
                .ok_or_else(|| ValidationError::InvalidFormField(entry.to_string()))?;
            let name = name.trim();
            if name.is_empty() || name.contains(['"', '\r', '\n']) {
                return Err(ValidationError::InvalidFormField(entry.to_string()));
            }
            let field_value = field_value.trim();
            if field_value.contains(['\r', '\n']) {
                return Err(ValidationError::InvalidFormField(entry.to_string()));
            }
            Ok((name.to_string(), field_value.to_string()))
        })
        .collect()
}

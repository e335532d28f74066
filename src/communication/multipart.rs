//! multipart/form-data ペイロード組み立て
//!
//! 本文は「プリアンブル」「画像バイト列」「トレーラ」の3セグメントで構成する。
//! プリアンブルとトレーラは構築時に一度だけ生成し、全体長もその時点で確定させるため
//! `Content-Length` と実際に送信するバイト数が食い違うことはない。
//! 画像バイト列はコピーせずに借用する。

/// デフォルトの境界文字列
pub const DEFAULT_BOUNDARY: &str = "----ESP32CamBoundary";

/// RFC 2046 の境界文字列の最大長
pub const MAX_BOUNDARY_LEN: usize = 70;

const CRLF: &str = "\r\n";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MultipartError {
    #[error("境界文字列が不正です: {0:?}")]
    InvalidBoundary(String),
    #[error("ヘッダー値に使用できない文字が含まれています: {0:?}")]
    InvalidHeaderValue(String),
    #[error("フィールド値に改行または境界文字列が含まれています: {0:?}")]
    InvalidFieldValue(String),
}

/// ファイルパート（画像データは借用）
#[derive(Debug, Clone, Copy)]
pub struct FilePart<'a> {
    pub field_name: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

impl<'a> FilePart<'a> {
    pub fn jpeg(field_name: &'a str, file_name: &'a str, data: &'a [u8]) -> Self {
        Self {
            field_name,
            file_name,
            content_type: "image/jpeg",
            data,
        }
    }
}

/// 境界文字列が RFC 2046 の bchars のみで構成されているか検証する
pub fn validate_boundary(boundary: &str) -> Result<(), MultipartError> {
    let allowed = |c: char| {
        c.is_ascii_alphanumeric() || "'()+_,-./:=? ".contains(c)
    };

    if boundary.is_empty()
        || boundary.len() > MAX_BOUNDARY_LEN
        || boundary.ends_with(' ')
        || !boundary.chars().all(allowed)
    {
        return Err(MultipartError::InvalidBoundary(boundary.to_string()));
    }
    Ok(())
}

/// `Content-Disposition` に埋め込む値（フィールド名・ファイル名）を検証する
pub fn validate_header_value(value: &str) -> Result<(), MultipartError> {
    if value.contains(['"', '\r', '\n']) {
        return Err(MultipartError::InvalidHeaderValue(value.to_string()));
    }
    Ok(())
}

/// テキストフィールドの値を検証する
///
/// 改行や `--<boundary>` を含む値は受け付けない。
pub fn validate_field_value(value: &str, boundary: &str) -> Result<(), MultipartError> {
    if value.contains(['\r', '\n']) || value.contains(&format!("--{}", boundary)) {
        return Err(MultipartError::InvalidFieldValue(value.to_string()));
    }
    Ok(())
}

/// ペイロードビルダー
#[derive(Debug, Clone)]
pub struct MultipartBuilder {
    boundary: String,
    preamble: String,
}

impl MultipartBuilder {
    pub fn new(boundary: &str) -> Result<Self, MultipartError> {
        validate_boundary(boundary)?;
        Ok(Self {
            boundary: boundary.to_string(),
            preamble: String::new(),
        })
    }

    /// ファイルパートの前に置くテキストフィールドを追加
    pub fn text_field(mut self, name: &str, value: &str) -> Result<Self, MultipartError> {
        validate_header_value(name)?;
        validate_field_value(value, &self.boundary)?;
        self.preamble.push_str(&format!(
            "--{b}{CRLF}Content-Disposition: form-data; name=\"{name}\"{CRLF}{CRLF}{value}{CRLF}",
            b = self.boundary
        ));
        Ok(self)
    }

    /// ファイルパートを追加して本文を確定させる
    pub fn file<'a>(mut self, part: FilePart<'a>) -> Result<MultipartBody<'a>, MultipartError> {
        validate_header_value(part.field_name)?;
        validate_header_value(part.file_name)?;
        validate_header_value(part.content_type)?;

        self.preamble.push_str(&format!(
            "--{b}{CRLF}Content-Disposition: form-data; name=\"{field}\"; filename=\"{file}\"{CRLF}Content-Type: {ctype}{CRLF}{CRLF}",
            b = self.boundary,
            field = part.field_name,
            file = part.file_name,
            ctype = part.content_type,
        ));
        let trailer = format!("{CRLF}--{b}--{CRLF}", b = self.boundary);
        let content_length = self.preamble.len() + part.data.len() + trailer.len();

        Ok(MultipartBody {
            boundary: self.boundary,
            preamble: self.preamble.into_bytes(),
            payload: part.data,
            trailer: trailer.into_bytes(),
            content_length,
        })
    }
}

/// 組み立て済みの multipart 本文
#[derive(Debug, Clone)]
pub struct MultipartBody<'a> {
    boundary: String,
    preamble: Vec<u8>,
    payload: &'a [u8],
    trailer: Vec<u8>,
    content_length: usize,
}

impl<'a> MultipartBody<'a> {
    /// `Content-Type` ヘッダー値（boundary パラメータ付き）
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// preamble + payload + trailer のバイト数
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn preamble(&self) -> &[u8] {
        &self.preamble
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    /// 送信順に並んだセグメント
    pub fn segments(&self) -> [&[u8]; 3] {
        [&self.preamble, self.payload, &self.trailer]
    }

    /// 本文全体を連結したバイト列（ログ・検証用）
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.content_length);
        for segment in self.segments() {
            bytes.extend_from_slice(segment);
        }
        bytes
    }
}

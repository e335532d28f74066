use sha2::{Digest, Sha256};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// 画像データのSHA-256（小文字16進）
///
/// サーバー側の受信ログと突き合わせるために使う。
pub fn image_sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// SOI/EOI マーカーで JPEG らしさを確認する
pub fn looks_like_jpeg(data: &[u8]) -> bool {
    data.len() >= 4 && data.starts_with(&JPEG_SOI) && data.ends_with(&JPEG_EOI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            image_sha256_hex(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_is_64_hex_chars() {
        let hash = image_sha256_hex(&[0xFF; 10]);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn jpeg_markers() {
        assert!(looks_like_jpeg(&[0xFF, 0xD8, 0x00, 0xFF, 0xD9]));
        assert!(!looks_like_jpeg(&[0xFF; 10]));
        assert!(!looks_like_jpeg(&[0xFF, 0xD8, 0xFF, 0xD9][..3]));
    }
}

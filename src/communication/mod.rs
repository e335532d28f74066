/// 通信モジュール
pub mod association;
pub mod multipart;
pub mod transport;

#[cfg(feature = "esp")]
pub mod http_uploader;
#[cfg(feature = "esp")]
pub mod network_manager;

// Mock実装（テストとnon-espビルドで使用可能）
#[cfg(not(feature = "esp"))]
pub mod mock;

pub use association::{
    wait_for_association, AssociationError, AssociationPolicy, WifiCredentials, WifiLink,
};
#[cfg(feature = "esp")]
pub use http_uploader::EspHttpTransport;
pub use multipart::{FilePart, MultipartBody, MultipartBuilder, MultipartError, DEFAULT_BOUNDARY};
#[cfg(feature = "esp")]
pub use network_manager::{EspWifiLink, NetworkManager};
pub use transport::{HttpTransport, TransportError, UploadOutcome, UploadResponse};

use log::{info, warn};

/// 無線ネットワークの接続情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String,
    /// 空文字列ならオープンネットワーク
    pub password: String,
}

/// 接続待機のポーリング設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationPolicy {
    pub poll_interval_ms: u32,
    /// None なら接続できるまで待ち続ける
    pub timeout_ms: Option<u64>,
}

impl Default for AssociationPolicy {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            timeout_ms: Some(30_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssociationError {
    #[error("WiFi接続の開始に失敗しました: {0}")]
    Begin(String),
    #[error("WiFiリンク状態の取得に失敗しました: {0}")]
    Link(String),
    #[error("WiFi接続がタイムアウトしました ({waited_ms} ms)")]
    Timeout { waited_ms: u64 },
}

/// 無線リンクの抽象
pub trait WifiLink {
    /// 接続を開始する（完了は待たない）
    fn begin(&mut self, credentials: &WifiCredentials) -> Result<(), AssociationError>;

    /// リンクが接続済みかどうか
    fn is_connected(&mut self) -> Result<bool, AssociationError>;
}

/// 接続を開始し、リンクが確立するまでポーリングする
///
/// 成功時は待機に要したポーリング回数を返す。`delay` には実機なら
/// `FreeRtos::delay_ms` を渡す。
pub fn wait_for_association<L, D>(
    link: &mut L,
    credentials: &WifiCredentials,
    policy: &AssociationPolicy,
    mut delay: D,
) -> Result<u32, AssociationError>
where
    L: WifiLink + ?Sized,
    D: FnMut(u32),
{
    info!("WiFiに接続しています: SSID={}", credentials.ssid);
    link.begin(credentials)?;

    let poll_interval_ms = policy.poll_interval_ms.max(1);
    let mut waited_ms: u64 = 0;
    let mut polls: u32 = 0;

    loop {
        if link.is_connected()? {
            info!("WiFi connected! ({} ms)", waited_ms);
            return Ok(polls);
        }

        // 最後の待機は残り時間に切り詰め、タイムアウトを超えて待たない
        let step_ms = match policy.timeout_ms {
            Some(timeout_ms) if waited_ms >= timeout_ms => {
                warn!("WiFi接続を諦めます: {} ms 経過", waited_ms);
                return Err(AssociationError::Timeout { waited_ms });
            }
            Some(timeout_ms) => (timeout_ms - waited_ms).min(u64::from(poll_interval_ms)) as u32,
            None => poll_interval_ms,
        };

        delay(step_ms);
        waited_ms += u64::from(step_ms);
        polls += 1;
        info!("WiFi接続待機中... ({} ms)", waited_ms);
    }
}

use esp_idf_svc::hal::{delay::FreeRtos, modem::Modem};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};
use log::info;

use crate::communication::association::{
    wait_for_association, AssociationError, WifiCredentials, WifiLink,
};
use crate::core::config::AppConfig;

/// EspWifi をポーリング可能なリンクとして扱うラッパー
pub struct EspWifiLink {
    wifi: EspWifi<'static>,
}

impl EspWifiLink {
    pub fn new(wifi: EspWifi<'static>) -> Self {
        Self { wifi }
    }

    pub fn wifi(&self) -> &EspWifi<'static> {
        &self.wifi
    }
}

impl WifiLink for EspWifiLink {
    fn begin(&mut self, credentials: &WifiCredentials) -> Result<(), AssociationError> {
        let auth_method = if credentials.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let configuration = Configuration::Client(ClientConfiguration {
            ssid: credentials
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| AssociationError::Begin("SSIDが長すぎます".to_string()))?,
            password: credentials
                .password
                .as_str()
                .try_into()
                .map_err(|_| AssociationError::Begin("パスワードが長すぎます".to_string()))?,
            auth_method,
            ..Default::default()
        });

        self.wifi
            .set_configuration(&configuration)
            .map_err(|e| AssociationError::Begin(e.to_string()))?;
        self.wifi
            .start()
            .map_err(|e| AssociationError::Begin(e.to_string()))?;
        info!("WiFiがSTAモードで起動しました");

        self.wifi
            .connect()
            .map_err(|e| AssociationError::Begin(e.to_string()))
    }

    fn is_connected(&mut self) -> Result<bool, AssociationError> {
        let associated = self
            .wifi
            .is_connected()
            .map_err(|e| AssociationError::Link(e.to_string()))?;
        if !associated {
            return Ok(false);
        }

        // DHCPでアドレスを取得するまでは接続済みとみなさない
        self.wifi
            .sta_netif()
            .is_up()
            .map_err(|e| AssociationError::Link(e.to_string()))
    }
}

/// WiFi接続を管理するモジュール
pub struct NetworkManager;

impl NetworkManager {
    /// STAモードでWiFiに接続し、リンクが確立するまで待機する
    pub fn connect_station(
        modem: Modem,
        sysloop: &EspSystemEventLoop,
        nvs_partition: &EspDefaultNvsPartition,
        config: &AppConfig,
    ) -> anyhow::Result<EspWifiLink> {
        info!("WiFiをSTAモードで準備します");
        let wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs_partition.clone()))?;
        let mut link = EspWifiLink::new(wifi);

        let polls = wait_for_association(
            &mut link,
            &config.wifi_credentials(),
            &config.association_policy(),
            FreeRtos::delay_ms,
        )?;
        info!("WiFi接続完了 (ポーリング {} 回)", polls);

        let ip_info = link.wifi().sta_netif().get_ip_info()?;
        info!("IPアドレス: {}", ip_info.ip);

        let mac_addr = link.wifi().sta_netif().get_mac()?;
        info!(
            "デバイスMACアドレス: {:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            mac_addr[0], mac_addr[1], mac_addr[2], mac_addr[3], mac_addr[4], mac_addr[5]
        );

        Ok(link)
    }
}

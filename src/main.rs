use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{delay::FreeRtos, peripherals::Peripherals},
    nvs::EspDefaultNvsPartition,
};
use log::{error, info};

use esp32_cam_uploader::communication::{EspHttpTransport, NetworkManager};
use esp32_cam_uploader::core::{AppConfig, AppController};
use esp32_cam_uploader::hardware::camera::EspCameraDriver;
use esp32_cam_uploader::hardware::CameraPins;

/// アプリケーションのメインエントリーポイント
fn main() -> anyhow::Result<()> {
    // ESP-IDFの基本初期化
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    // 設定ファイル読み込み（失敗しても main からは抜けずに待機する）
    let app_config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("設定ファイルの読み込みに失敗しました: {}", e);
            idle_forever();
        }
    };

    // ペリフェラルとシステムリソースの初期化
    info!("ペリフェラルを初期化しています");
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ネットワーク（WiFi）接続。スコープを抜けるまでリンクを保持する
    let _wifi = match NetworkManager::connect_station(
        peripherals.modem,
        &sysloop,
        &nvs_partition,
        &app_config,
    ) {
        Ok(wifi) => wifi,
        Err(e) => {
            error!("WiFi接続に失敗しました: {:?}", e);
            idle_forever();
        }
    };

    // カメラ用ピンの準備
    let pins = peripherals.pins;
    let camera_pins = CameraPins {
        pwdn: pins.gpio32,
        xclk: pins.gpio0,
        sda: pins.gpio26,
        scl: pins.gpio27,
        d0: pins.gpio5,
        d1: pins.gpio18,
        d2: pins.gpio19,
        d3: pins.gpio21,
        d4: pins.gpio36,
        d5: pins.gpio39,
        d6: pins.gpio34,
        d7: pins.gpio35,
        vsync: pins.gpio25,
        href: pins.gpio23,
        pclk: pins.gpio22,
    };
    let capture_config = app_config.capture_config(camera_pins.pin_map());
    let driver = EspCameraDriver::new(camera_pins);

    let mut transport =
        EspHttpTransport::new(app_config.http_timeout, app_config.response_body_limit);

    // 撮影とアップロード（1回のみ、リトライなし）
    match AppController::capture_and_upload(
        driver,
        capture_config,
        &mut transport,
        &app_config.upload,
    ) {
        Ok(report) => info!(
            "アップロード処理が完了しました: frame={} bytes, body={} bytes, {}",
            report.frame_len, report.content_length, report.outcome
        ),
        Err(e) => error!("キャプチャ/アップロードを中断しました: {}", e),
    }

    idle_forever();
}

/// 以降は何もしない（main から戻ると再起動してしまう）
fn idle_forever() -> ! {
    loop {
        FreeRtos::delay_ms(1000);
    }
}

fn main() {
    // cfg.toml が無いと toml-cfg はデフォルト値だけでビルドしてしまうため明示的に確認する
    if !std::path::Path::new("cfg.toml").exists() {
        println!("cargo:warning=cfg.toml が見つかりません。cfg.toml.example をコピーして設定してください");
    }

    #[cfg(feature = "esp")]
    embuild::espidf::sysenv::output();
}

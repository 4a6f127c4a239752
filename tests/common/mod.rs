use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use sonia::client::AssistantClient;
use sonia::config::ApiConfig;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn temp_pdf(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join(name);
    fs::write(&path, b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n").expect("failed to write pdf");
    (temp_dir, path)
}

#[allow(dead_code)]
pub fn client_for(base_url: &str) -> AssistantClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: Some(5),
        ..ApiConfig::default()
    };
    AssistantClient::new(&config).expect("failed to build client")
}

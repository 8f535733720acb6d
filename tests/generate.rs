//! End-to-end generation runs against a temp directory.

use std::fs;
use std::path::Path;

use webui_proxy::config::{PlaceholderEntry, Settings};
use webui_proxy::generate;

fn settings_in(dir: &Path) -> Settings {
    Settings {
        options_path: dir.join("data/options.json"),
        backup_path: dir.join("share/webui-proxy.json"),
        nginx_conf_path: dir.join("etc/nginx/nginx.conf"),
        landing_path: dir.join("html/index.html"),
        supervisor_endpoint: "http://127.0.0.1:1".to_string(),
        supervisor_token: None,
        placeholder: PlaceholderEntry {
            name: "Example device".to_string(),
            url: "192.168.1.100".to_string(),
        },
    }
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_full_run_generates_both_documents() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write(
        &settings.options_path,
        r#"{"targets": ["10.0.0.5", "bad:xx", {"name": "NAS", "url": "192.168.1.20:8443"}]}"#,
    );

    generate::run(&settings).unwrap();

    let landing = fs::read_to_string(&settings.landing_path).unwrap();
    assert!(landing.contains(r#"<a href="proxy/1/">10.0.0.5:80</a>"#));
    assert!(landing.contains(r#"<a href="proxy/2/">NAS</a>"#));
    assert!(!landing.contains("proxy/3/"));

    let conf = fs::read_to_string(&settings.nginx_conf_path).unwrap();
    // The invalid entry takes no slot; the survivors keep input order.
    assert!(conf.contains("location /proxy/1/"));
    assert!(conf.contains("proxy_pass http://10.0.0.5:80/;"));
    assert!(conf.contains("location /proxy/2/"));
    assert!(conf.contains("proxy_pass https://192.168.1.20:8443/;"));
    assert!(!conf.contains("location /proxy/3/"));

    // The backup snapshot keeps verbatim addresses.
    let backup = fs::read_to_string(&settings.backup_path).unwrap();
    assert!(backup.contains(r#""url": "10.0.0.5""#));
    assert!(backup.contains(r#""url": "192.168.1.20:8443""#));
    assert!(!backup.contains("bad:xx"));
}

#[test]
fn test_rerun_with_identical_input_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write(
        &settings.options_path,
        r#"{"targets": ["10.0.0.5:8080", "https://cam.lan:1234"]}"#,
    );

    generate::run(&settings).unwrap();
    let first_conf = fs::read_to_string(&settings.nginx_conf_path).unwrap();
    let first_landing = fs::read_to_string(&settings.landing_path).unwrap();

    generate::run(&settings).unwrap();
    assert_eq!(
        fs::read_to_string(&settings.nginx_conf_path).unwrap(),
        first_conf
    );
    assert_eq!(
        fs::read_to_string(&settings.landing_path).unwrap(),
        first_landing
    );
}

#[test]
fn test_no_configuration_at_all_still_produces_a_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());

    generate::run(&settings).unwrap();

    let landing = fs::read_to_string(&settings.landing_path).unwrap();
    assert!(landing.contains("No devices configured"));

    let conf = fs::read_to_string(&settings.nginx_conf_path).unwrap();
    assert!(conf.contains("server {"));
    assert!(!conf.contains("location /proxy/"));

    // An empty run never writes a backup.
    assert!(!settings.backup_path.exists());
}

#[test]
fn test_backup_restores_into_primary_options() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write(&settings.options_path, r#"{"targets": []}"#);
    write(
        &settings.backup_path,
        r#"{"targets": [{"name": "Router", "url": "10.0.0.1"}]}"#,
    );

    generate::run(&settings).unwrap();

    let options = fs::read_to_string(&settings.options_path).unwrap();
    assert!(options.contains("Router"));
    assert!(options.contains("10.0.0.1"));

    let landing = fs::read_to_string(&settings.landing_path).unwrap();
    assert!(landing.contains(r#"<a href="proxy/1/">Router</a>"#));
}

#[test]
fn test_placeholder_options_fall_back_to_backup() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write(
        &settings.options_path,
        r#"{"targets": ["192.168.1.100"]}"#,
    );
    write(
        &settings.backup_path,
        r#"{"targets": [{"name": "NAS", "url": "192.168.1.20:8443"}]}"#,
    );

    generate::run(&settings).unwrap();

    let landing = fs::read_to_string(&settings.landing_path).unwrap();
    assert!(landing.contains(r#"<a href="proxy/1/">NAS</a>"#));
    assert!(!landing.contains("192.168.1.100"));
}

#[test]
fn test_malformed_options_abort_and_keep_previous_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());

    write(&settings.options_path, r#"{"targets": ["10.0.0.5"]}"#);
    generate::run(&settings).unwrap();
    let good_conf = fs::read_to_string(&settings.nginx_conf_path).unwrap();

    write(&settings.options_path, "{ broken");
    assert!(generate::run(&settings).is_err());

    // The gateway keeps serving the last successful configuration.
    assert_eq!(
        fs::read_to_string(&settings.nginx_conf_path).unwrap(),
        good_conf
    );
}

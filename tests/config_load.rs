// tests/config_load.rs
use new_assets_poller::config::{AppConfig, ENV_CONFIG_PATH};
use new_assets_poller::{AreaSelection, ContentSelection};
use std::{env, fs};

const ENV_KEYS: [&str; 9] = [
    ENV_CONFIG_PATH,
    "POLL_INTERVAL_SECS",
    "POLL_CONTENT",
    "POLL_AREA",
    "CATALOG_BASE_URL",
    "CATALOG_API_KEY",
    "DISCORD_WEBHOOK_URL",
    "SLACK_WEBHOOK_URL",
    "HTTP_BIND",
];

fn clear_env() {
    for k in ENV_KEYS {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn parse_toml_and_json_paths() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("new_assets.toml");
    fs::write(
        &p_toml,
        r#"
[poll]
interval_secs = 120
content = "movies"
area = "store"

[catalog]
base_url = "https://catalog.example"
app_id = "tv-app"

[sinks]
log = false
slack_webhook = "https://hooks.slack.test/x"
"#,
    )
    .unwrap();
    let c = AppConfig::load_from(&p_toml).unwrap();
    assert_eq!(c.poll.interval_secs, 120);
    assert_eq!(c.poll.content, ContentSelection::Movies);
    assert_eq!(c.poll.area, AreaSelection::Store);
    assert_eq!(c.catalog.app_id.as_deref(), Some("tv-app"));
    assert!(!c.sinks.log);
    assert_eq!(
        c.sinks.slack_webhook.as_deref(),
        Some("https://hooks.slack.test/x")
    );

    let p_json = dir.path().join("new_assets.json");
    fs::write(
        &p_json,
        r#"{"poll":{"interval_secs":45,"content":"seasons"},"catalog":{"base_url":"https://c.example"}}"#,
    )
    .unwrap();
    let j = AppConfig::load_from(&p_json).unwrap();
    assert_eq!(j.poll.interval_secs, 45);
    assert_eq!(j.poll.content, ContentSelection::Seasons);
    assert_eq!(j.poll.area, AreaSelection::All);
}

#[serial_test::serial]
#[test]
fn zero_interval_and_missing_key_are_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();

    let p = dir.path().join("zero.toml");
    fs::write(&p, "[poll]\ninterval_secs = 0\n").unwrap();
    assert!(AppConfig::load_from(&p).is_err());

    let p = dir.path().join("key.toml");
    fs::write(&p, "[catalog]\napi_key = \"ENV\"\n").unwrap();
    assert!(AppConfig::load_from(&p).is_err());

    env::set_var("CATALOG_API_KEY", "secret");
    let c = AppConfig::load_from(&p).unwrap();
    assert_eq!(c.catalog.api_key.as_deref(), Some("secret"));
    clear_env();
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) nothing → defaults
    let d = AppConfig::load_default().unwrap();
    assert_eq!(d, AppConfig::default());

    // 2) fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("new_assets.toml"), "[poll]\ninterval_secs = 90\n").unwrap();
    assert_eq!(AppConfig::load_default().unwrap().poll.interval_secs, 90);

    // 3) env path wins
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, r#"{"poll":{"interval_secs":15}}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(AppConfig::load_default().unwrap().poll.interval_secs, 15);

    // 4) env overrides beat the file
    env::set_var("POLL_INTERVAL_SECS", "5");
    env::set_var("POLL_CONTENT", "none");
    env::set_var("POLL_AREA", "package");
    let o = AppConfig::load_default().unwrap();
    assert_eq!(o.poll.interval_secs, 5);
    assert_eq!(o.poll.content, ContentSelection::None);
    assert_eq!(o.poll.area, AreaSelection::Package);

    // 5) dangling env path is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(AppConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}

use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_segue_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SEGUE_CONFIG_PATH", "/tmp/segue-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/segue-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("segue")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("segue")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_the_classic_player() {
    let s = Settings::default();
    assert_eq!(s.player.poll_interval_ms, 200);
    assert!(!s.player.autoplay);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(s.library.case_sensitive_extensions);
    assert_eq!(s.control.address(), "127.0.0.1:9012");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[player]
poll_interval_ms = 50
autoplay = true

[library]
music_dir = "/srv/music"
extensions = ["mp3", "ogg"]
case_sensitive_extensions = false
read_tags = true

[control]
enabled = false
host = "0.0.0.0"
port = 7000

[logging]
filter = "segue=debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SEGUE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SEGUE__PLAYER__POLL_INTERVAL_MS");
    let _g3 = EnvGuard::remove("SEGUE__CONTROL__PORT");

    let s = Settings::load().unwrap();
    assert_eq!(s.player.poll_interval_ms, 50);
    assert!(s.player.autoplay);
    assert_eq!(s.library.music_dir, "/srv/music");
    assert_eq!(s.library.extensions, vec!["mp3".to_string(), "ogg".to_string()]);
    assert!(!s.library.case_sensitive_extensions);
    assert!(s.library.read_tags);
    assert!(!s.control.enabled);
    assert_eq!(s.control.address(), "0.0.0.0:7000");
    assert_eq!(s.logging.filter, "segue=debug");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[control]
port = 7000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SEGUE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SEGUE__CONTROL__PORT", "7001");

    let s = Settings::load().unwrap();
    assert_eq!(s.control.port, 7001);
}

#[test]
fn validate_rejects_zero_poll_interval_and_empty_extensions() {
    let mut s = Settings::default();
    s.player.poll_interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.library.extensions = vec![" ".to_string()];
    assert!(s.validate().is_err());
}

#[test]
fn to_toml_renders_every_section() {
    let rendered = Settings::default().to_toml().unwrap();
    for section in ["[player]", "[library]", "[control]", "[logging]"] {
        assert!(rendered.contains(section), "missing {section}");
    }
    let back: Settings = toml::from_str(&rendered).unwrap();
    assert_eq!(back.control.port, 9012);
}

use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use crate::library::Section;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
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
fn resolve_config_path_prefers_betawave_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("BETAWAVE_CONFIG_PATH", "/tmp/betawave-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/betawave-test-config.toml")
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
            .join("betawave")
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
            .join("betawave")
            .join("config.toml")
    );
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.playback.restart_threshold_ms, 3_000);
    assert!(matches!(s.playback.start_section, SectionSetting::Library));
}

#[test]
fn settings_load_from_config_file_and_parse_section_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[backend]
base_url = "http://music.local:8080"
session_cookie = "abc123"
display_artist = "ana"
play_timeout_ms = 2500

[playback]
restart_threshold_ms = 5000
start_section = "favourites"

[audio]
volume = 0.5
quit_fade_out_ms = 0
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("BETAWAVE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("BETAWAVE__BACKEND__PLAY_TIMEOUT_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.backend.base_url, "http://music.local:8080");
    assert_eq!(s.backend.session_cookie.as_deref(), Some("abc123"));
    assert_eq!(s.backend.display_artist, "ana");
    assert_eq!(s.backend.play_timeout_ms, 2500);
    // untouched keys keep their defaults
    assert_eq!(s.backend.request_timeout_ms, 10_000);
    assert_eq!(s.playback.restart_threshold().as_millis(), 5000);
    assert_eq!(Section::from(s.playback.start_section), Section::Favorites);
    assert_eq!(s.audio.volume, 0.5);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[backend]
play_timeout_ms = 15000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("BETAWAVE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("BETAWAVE__BACKEND__PLAY_TIMEOUT_MS", "750");

    let s = Settings::load().unwrap();
    assert_eq!(s.backend.play_timeout_ms, 750);
}

#[test]
fn validate_rejects_bad_values() {
    let mut s = Settings::default();
    s.backend.base_url = "  ".into();
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.backend.play_timeout_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.volume = 3.0;
    assert!(s.validate().is_err());
}

#[test]
fn dumped_config_never_contains_the_session_cookie() {
    let mut s = Settings::default();
    s.backend.session_cookie = Some("secret-cookie".into());
    let out = toml::to_string_pretty(&s).unwrap();
    assert!(out.contains("base_url"));
    assert!(!out.contains("secret-cookie"));
}

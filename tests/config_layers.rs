//! Injector configuration loaded from `fieldwire.toml` and the environment.
//!
//! These tests change the working directory and environment, so they run
//! serially.

use std::path::PathBuf;
use std::sync::Arc;

use fieldwire::{Context, Injectable, InjectionError, Injector, InjectorConfig, Registry};
use serial_test::serial;

#[derive(Injectable)]
struct Endpoint {
    #[inject]
    host: Option<Arc<String>>,
}

#[derive(Injectable)]
struct Gateway {
    #[inject]
    endpoint: Option<Box<Endpoint>>,
}

fn registry() -> Registry {
    Registry::builder()
        .instance(Arc::new("registry-host".to_string()))
        .build()
        .unwrap()
}

/// Runs `f` with the working directory switched to a fresh temp dir.
fn in_temp_dir<T>(config: Option<&str>, f: impl FnOnce() -> T) -> T {
    let dir = tempfile::tempdir().unwrap();
    if let Some(contents) = config {
        std::fs::write(dir.path().join(fieldwire::config::CONFIG_FILE), contents).unwrap();
    }
    let previous: PathBuf = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let result = f();
    std::env::set_current_dir(previous).unwrap();
    result
}

#[test]
#[serial]
fn test_project_file_enables_preserve_populated() {
    let injector = in_temp_dir(Some("preserve_populated = true\n"), || {
        Injector::builder()
            .registry(registry())
            .load_config()
            .unwrap()
            .build()
            .unwrap()
    });
    assert!(injector.config().preserve_populated);

    let mut endpoint = Endpoint {
        host: Some(Arc::new("preset".to_string())),
    };
    injector
        .inject(&mut endpoint, &Context::active("config"))
        .unwrap();
    assert_eq!(endpoint.host.as_deref().map(String::as_str), Some("preset"));
}

#[test]
#[serial]
fn test_env_depth_limit_is_enforced() {
    std::env::set_var("FIELDWIRE_MAX_DEPTH", "0");
    let loaded = in_temp_dir(None, InjectorConfig::load);
    std::env::remove_var("FIELDWIRE_MAX_DEPTH");

    let config = loaded.unwrap();
    assert_eq!(config.max_depth, Some(0));
    assert!(!config.preserve_populated);

    let injector = Injector::builder()
        .registry(registry())
        .config(config)
        .build()
        .unwrap();
    let mut gateway = Gateway {
        endpoint: Some(Box::new(Endpoint { host: None })),
    };
    let err = injector
        .inject(&mut gateway, &Context::active("config"))
        .unwrap_err();
    assert!(matches!(err, InjectionError::DepthExceeded { limit: 0, .. }));
}

#[test]
#[serial]
fn test_malformed_project_file_is_a_config_error() {
    let result = in_temp_dir(Some("max_depth = [1, 2]\n"), || {
        Injector::builder().registry(registry()).load_config()
    });
    assert!(matches!(result, Err(InjectionError::Config(_))));
}

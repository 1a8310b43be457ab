use docscan::Config;
use std::path::PathBuf;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.quality.blur_threshold, 100.0);
    assert_eq!(config.preprocess.bilateral_diameter, 9);
    assert_eq!(config.preprocess.sigma_color, 75.0);
    assert_eq!(config.preprocess.sigma_space, 75.0);
    assert_eq!(config.preprocess.closing_kernel, 5);
    assert!(!config.preprocess.apply_closing);
    assert_eq!(config.preprocess.threshold_block_size, 199);
    assert_eq!(config.preprocess.threshold_offset, 5);
    assert_eq!(config.pipeline.max_dimension, 2000);
    assert!(config.recognition.model_dir.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = Config::default();
    config.preprocess.threshold_block_size = 200;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.pipeline.max_dimension = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.preprocess.sigma_color = -1.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.quality.blur_threshold = f64::NAN;
    assert!(config.validate().is_err());
}

#[test]
fn test_deserialize_partial() {
    let config: Config = serde_json::from_str(
        r#"{ "quality": { "blur_threshold": 42.5 }, "preprocess": { "apply_closing": true } }"#,
    )
    .unwrap();
    assert_eq!(config.quality.blur_threshold, 42.5);
    assert!(config.preprocess.apply_closing);
    assert_eq!(config.preprocess.threshold_block_size, 199);
    assert_eq!(config.pipeline.max_dimension, 2000);
}

#[test]
fn test_from_file() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("docscan.json");
    std::fs::write(
        &path,
        r#"{ "preprocess": { "closing_kernel": 3, "apply_closing": true }, "pipeline": { "max_dimension": 1500 } }"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.preprocess.closing_kernel, 3);
    assert!(config.preprocess.apply_closing);
    assert_eq!(config.pipeline.max_dimension, 1500);
    assert_eq!(config.quality.blur_threshold, 100.0);

    std::fs::write(&path, r#"{ "preprocess": { "threshold_block_size": 10 } }"#)?;
    assert!(Config::from_file(&path).is_err());

    std::fs::write(&path, "not json")?;
    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid config file"));

    assert!(Config::from_file(&dir.path().join("missing.json")).is_err());
    Ok(())
}

#[test]
fn test_validate_rejects_oversized_closing_kernel() {
    let mut config = Config::default();
    config.preprocess.closing_kernel = 1024;
    assert!(config.validate().is_err());
}

// Environment is process-wide, so every env case lives in this one test
#[test]
fn test_from_env_overlay() {
    let vars = [
        ("DOCSCAN_BLUR_THRESHOLD", "55.5"),
        ("DOCSCAN_MAX_DIMENSION", "1024"),
        ("DOCSCAN_APPLY_CLOSING", "true"),
        ("DOCSCAN_CLOSING_KERNEL", "7"),
        ("DOCSCAN_THRESHOLD_BLOCK_SIZE", "51"),
        ("DOCSCAN_MODEL_DIR", "/opt/models"),
    ];
    for (key, value) in vars {
        unsafe { std::env::set_var(key, value) };
    }

    let config = Config::from_env().unwrap();
    assert_eq!(config.quality.blur_threshold, 55.5);
    assert_eq!(config.pipeline.max_dimension, 1024);
    assert!(config.preprocess.apply_closing);
    assert_eq!(config.preprocess.closing_kernel, 7);
    assert_eq!(config.preprocess.threshold_block_size, 51);
    assert_eq!(config.recognition.model_dir, Some(PathBuf::from("/opt/models")));

    unsafe { std::env::set_var("DOCSCAN_MAX_DIMENSION", "lots") };
    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("DOCSCAN_MAX_DIMENSION"));

    unsafe { std::env::set_var("DOCSCAN_MAX_DIMENSION", "1024") };
    unsafe { std::env::set_var("DOCSCAN_THRESHOLD_BLOCK_SIZE", "50") };
    assert!(Config::from_env().is_err());

    unsafe { std::env::set_var("DOCSCAN_THRESHOLD_BLOCK_SIZE", "51") };
    unsafe { std::env::set_var("DOCSCAN_CLOSING_KERNEL", "0") };
    assert!(Config::from_env().is_err());

    for (key, _) in vars {
        unsafe { std::env::remove_var(key) };
    }
    assert_eq!(Config::from_env().unwrap().pipeline.max_dimension, 2000);
}

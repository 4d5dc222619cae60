use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use flux_embed::{
    FluxEmbedding, FluxRuntime, InitError, RuntimeConfig, Value, embed::version,
};

fn temp_home(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("flux_embed_{}_{}", label, nanos));
    fs::create_dir_all(&dir).expect("create temp home");
    dir
}

fn string_value(embedding: &FluxEmbedding, source: &str) -> Option<String> {
    let value = embedding.evaluate(source)?;
    embedding.string_data(&value)
}

#[test]
fn initialize_runs_bootstrap_requests() {
    let embedding = FluxEmbedding::new(FluxRuntime::new());
    embedding
        .initialize_with_config(
            RuntimeConfig::new("/nonexistent/flux")
                .with_nprocs(3)
                .with_args(["--bind-to", "10.0.0.7"]),
        )
        .unwrap();

    assert_eq!(embedding.evaluate("nprocs()"), Some(Value::Int(3)));
    assert_eq!(string_value(&embedding, "bind_addr()").as_deref(), Some("10.0.0.7"));

    let runtime = embedding.runtime();
    assert!(runtime.scheduler().head_ready());
    assert_eq!(runtime.scheduler().parallel_inits(), 1);
    assert_eq!(runtime.scheduler().bind_addr_inits(), 1);
    assert_eq!(runtime.scheduler().head_sched_inits(), 1);
}

#[test]
fn configured_bind_addr_is_used_without_flag() {
    let embedding = FluxEmbedding::new(FluxRuntime::new());
    embedding
        .initialize_with_config(RuntimeConfig::new("/nonexistent/flux").with_bind_addr("0.0.0.0"))
        .unwrap();
    assert_eq!(string_value(&embedding, "bind_addr()").as_deref(), Some("0.0.0.0"));
}

#[test]
fn second_initialize_keeps_first_config() {
    let embedding = FluxEmbedding::new(FluxRuntime::new());
    embedding.initialize("/nonexistent/first").unwrap();
    embedding.evaluate("marker = 1").unwrap();
    embedding.initialize("/nonexistent/second").unwrap();

    assert_eq!(embedding.home_dir(), Some(Path::new("/nonexistent/first")));
    assert_eq!(embedding.evaluate("marker"), Some(Value::Int(1)));
    assert_eq!(embedding.runtime().scheduler().parallel_inits(), 1);
    assert_eq!(embedding.runtime().image_digest(), None);
}

#[test]
fn image_definitions_land_in_base() {
    let home = temp_home("image");
    fs::write(
        home.join("prelude.fxi"),
        "double(x) = 2 * x\nstruct Pair { first, second }\n",
    )
    .unwrap();

    let embedding = FluxEmbedding::new(FluxRuntime::new());
    embedding
        .initialize_with_image(&home, Some(Path::new("prelude.fxi")))
        .unwrap();

    assert_eq!(embedding.evaluate("double(21)"), Some(Value::Int(42)));
    assert_eq!(embedding.evaluate("Base.double(2)"), Some(Value::Int(4)));
    let pair = embedding.evaluate("Pair(1, 2)").unwrap();
    assert_eq!(embedding.get_field(&pair, "second"), Some(Value::Int(2)));
    assert_eq!(embedding.image_path(), Some(Path::new("prelude.fxi")));
    assert_eq!(embedding.resolved_image_path(), Some(home.join("prelude.fxi")));
    assert_eq!(
        embedding.runtime().image_digest().as_deref(),
        Some("c298aa3d9541450b623288c95647b415ff2241557c2f84df45164dae22af80d5")
    );

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn broken_image_fails_bootstrap() {
    let home = temp_home("broken");
    fs::write(home.join("broken.fxi"), "f(1,\n").unwrap();

    let embedding = FluxEmbedding::new(FluxRuntime::new());
    let err = embedding
        .initialize_with_image(&home, Some(Path::new("broken.fxi")))
        .unwrap_err();
    assert!(matches!(err, InitError::Bootstrap(_)), "{err}");
    assert!(!embedding.is_initialized());
    assert!(!embedding.runtime().is_bootstrapped());

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn corrected_image_can_redeclare_its_structs_on_retry() {
    let home = temp_home("retry");
    let image = home.join("sys.fxi");
    fs::write(&image, "struct P { a }\nerror(\"bad image\")\n").unwrap();

    let embedding = FluxEmbedding::new(FluxRuntime::new());
    let err = embedding
        .initialize_with_image(&home, Some(Path::new("sys.fxi")))
        .unwrap_err();
    assert!(err.to_string().contains("bad image"), "{err}");
    assert!(!embedding.is_initialized());
    assert_eq!(embedding.runtime().image_digest(), None);

    fs::write(&image, "struct P { a, b }\n").unwrap();
    embedding
        .initialize_with_image(&home, Some(Path::new("sys.fxi")))
        .unwrap();
    assert!(embedding.is_initialized());
    let p = embedding.evaluate("P(1, 2)").unwrap();
    assert_eq!(embedding.get_field(&p, "b"), Some(Value::Int(2)));

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn missing_image_is_reported_before_bootstrap() {
    let embedding = FluxEmbedding::new(FluxRuntime::new());
    let err = embedding
        .initialize_with_image("/nonexistent/flux", Some(Path::new("missing.fxi")))
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"system image not found: /nonexistent/flux/missing.fxi");
    assert!(!embedding.runtime().is_bootstrapped());
}

#[test]
fn config_loads_from_json_file() {
    let home = temp_home("config");
    let path = home.join("flux.json");
    fs::write(
        &path,
        format!(
            r#"{{ "home_dir": {:?}, "args": ["--bind-to=192.168.0.2"], "nprocs": 2 }}"#,
            home.display().to_string()
        ),
    )
    .unwrap();

    let config = RuntimeConfig::load(&path).unwrap();
    let embedding = FluxEmbedding::new(FluxRuntime::new());
    embedding.initialize_with_config(config).unwrap();

    assert_eq!(embedding.evaluate("nprocs()"), Some(Value::Int(2)));
    assert_eq!(
        string_value(&embedding, "bind_addr()").as_deref(),
        Some("192.168.0.2")
    );
    assert_eq!(embedding.evaluate("length(ARGS)"), Some(Value::Int(1)));

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn version_is_available_before_initialize() {
    assert_eq!(version::version_string(), env!("CARGO_PKG_VERSION"));
    assert_eq!(
        version::version_major().to_string(),
        env!("CARGO_PKG_VERSION_MAJOR")
    );
    assert_eq!(
        version::version_minor().to_string(),
        env!("CARGO_PKG_VERSION_MINOR")
    );
    assert_eq!(version::is_debug_build(), cfg!(debug_assertions));
}

use vidrestore_core::io::encoder::EncoderSettings;
use vidrestore_core::pipeline::config::{
    FilterConfig, Intensity, RestorationConfig, StageConfig, TaskConfig,
};

// ---------------------------------------------------------------------------
// Intensity
// ---------------------------------------------------------------------------

#[test]
fn test_intensity_parse_known_names() {
    assert_eq!(Intensity::from_name("light"), Intensity::Light);
    assert_eq!(Intensity::from_name("HEAVY"), Intensity::Heavy);
    assert_eq!(Intensity::from_name(" medium "), Intensity::Medium);
}

#[test]
fn test_intensity_unknown_falls_back_to_medium() {
    assert_eq!(Intensity::from_name("ultra"), Intensity::Medium);
    assert_eq!(Intensity::from_name(""), Intensity::Medium);
    assert!("ultra".parse::<Intensity>().is_err());
}

#[test]
fn test_intensity_display() {
    assert_eq!(format!("{}", Intensity::Light), "light");
    assert_eq!(format!("{}", Intensity::default()), "medium");
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_stage_defaults() {
    let stages = StageConfig::default();
    assert!(stages.smart_mode);
    assert!(stages.restoration.enabled);
    assert!(stages.restoration.deblock && stages.restoration.final_sharpen);
    assert!(!stages.restoration.grain);
    assert!(stages.basic.enabled && stages.basic.highlight);
    assert!(stages.advanced.enabled && !stages.advanced.dehaze);
    assert!(!stages.filters.any());
}

#[test]
fn test_all_steps_includes_grain() {
    let config = RestorationConfig::all_steps(Intensity::Heavy);
    assert!(config.grain && config.face_repair);
    assert_eq!(config.intensity, Intensity::Heavy);
}

#[test]
fn test_no_steps() {
    let config = RestorationConfig {
        deblock: false,
        pre_sharpen: false,
        anti_alias: false,
        denoise: false,
        face_repair: false,
        hair_protect: false,
        final_sharpen: false,
        grain: false,
        ..RestorationConfig::default()
    };
    assert!(!config.any_step());
}

#[test]
fn test_filter_any() {
    let filters = FilterConfig {
        vintage: true,
        ..FilterConfig::default()
    };
    assert!(filters.any());
}

// ---------------------------------------------------------------------------
// TOML
// ---------------------------------------------------------------------------

#[test]
fn test_minimal_toml_uses_defaults() {
    let config: TaskConfig = toml::from_str(
        r#"
        input = "clip.mp4"
        output = "clip_restored.mp4"
        "#,
    )
    .unwrap();
    assert_eq!(config.input.to_str(), Some("clip.mp4"));
    assert!(config.stages.smart_mode);
    assert_eq!(config.seed, None);
    assert!((config.resource_ratio - 0.7).abs() < 1e-6);
    assert_eq!(config.encoder, EncoderSettings::default());
    assert_eq!(config.encoder.crf, 23);
    assert_eq!(config.encoder.min_output_bytes, 1000);
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let config: TaskConfig = toml::from_str(
        r#"
        input = "a.mp4"
        output = "b.mp4"
        seed = 42

        [stages]
        smart_mode = false

        [stages.restoration]
        intensity = "light"
        grain = true

        [stages.filters]
        cinematic = true

        [encoder]
        crf = 18
        "#,
    )
    .unwrap();
    assert_eq!(config.seed, Some(42));
    assert!(!config.stages.smart_mode);
    assert_eq!(config.stages.restoration.intensity, Intensity::Light);
    assert!(config.stages.restoration.grain);
    assert!(config.stages.restoration.denoise);
    assert!(config.stages.filters.cinematic);
    assert_eq!(config.encoder.crf, 18);
    assert_eq!(config.encoder.preset, "medium");
}

#[test]
fn test_toml_roundtrip() {
    let mut config = TaskConfig::new("in.mp4", "out.mp4");
    config.seed = Some(7);
    config.stages.basic.intensity = Intensity::Heavy;
    config.stages.filters.anime = true;

    let text = toml::to_string_pretty(&config).unwrap();
    let back: TaskConfig = toml::from_str(&text).unwrap();
    assert_eq!(back.seed, Some(7));
    assert_eq!(back.stages.basic.intensity, Intensity::Heavy);
    assert!(back.stages.filters.anime);
    assert_eq!(back.output, config.output);
}

#[test]
fn test_toml_intensity_names_fall_back() {
    let config: TaskConfig = toml::from_str(
        r#"
        input = "a.mp4"
        output = "b.mp4"

        [stages.restoration]
        intensity = "Heavy"

        [stages.basic]
        intensity = "ultra"

        [stages.filters]
        intensity = " LIGHT "
        "#,
    )
    .unwrap();
    assert_eq!(config.stages.restoration.intensity, Intensity::Heavy);
    assert_eq!(config.stages.basic.intensity, Intensity::Medium);
    assert_eq!(config.stages.filters.intensity, Intensity::Light);
}

#[test]
fn test_toml_intensity_still_serializes_lowercase() {
    let mut config = TaskConfig::new("in.mp4", "out.mp4");
    config.stages.restoration.intensity = Intensity::Heavy;
    let text = toml::to_string_pretty(&config).unwrap();
    assert!(text.contains(r#"intensity = "heavy""#));
}

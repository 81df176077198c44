use stepline::config::StepConfig;
use stepline::step::{Step, StepRegistry};
use stepline::timeline::Timeline;

#[test]
fn test_load_example_timeline() {
    let timeline_path = concat!(env!("CARGO_MANIFEST_DIR"), "/timelines/example.toml");
    let config = StepConfig::from_file(timeline_path).expect("Failed to load timeline config");

    assert_eq!(config.id, "onboarding");
    assert_eq!(config.step_type, "Timeline");
    assert_eq!(config.steps.len(), 3);

    let steps = &config.steps;
    assert_eq!(steps[0].step.id, "welcome");
    assert_eq!(steps[1].step.id, "profile");
    assert_eq!(steps[2].step.id, "finish");
    assert_eq!(steps[1].step.steps.len(), 2);
}

#[test]
fn test_build_example_timeline() {
    let timeline_path = concat!(env!("CARGO_MANIFEST_DIR"), "/timelines/example.toml");
    let config = StepConfig::from_file(timeline_path).expect("Failed to load timeline config");

    let registry = StepRegistry::with_builtins();
    let timeline = Timeline::from_config(&config, &registry).expect("Failed to build timeline");

    assert_eq!(timeline.steps().len(), 3);
    assert_eq!(timeline.active_step(), "welcome");
    assert_eq!(timeline.steps()[1].duration, 3.0);

    // The nested timeline is built recursively through the same registry
    let profile = timeline
        .step("profile")
        .and_then(|step| step.as_timeline())
        .expect("profile should be a timeline");
    assert_eq!(profile.steps().len(), 2);
    assert_eq!(profile.active_step(), "basic-info");
    assert_eq!(profile.meta().parent.as_deref(), Some("onboarding"));
}

#[tokio::test]
async fn test_navigate_example_timeline() {
    let timeline_path = concat!(env!("CARGO_MANIFEST_DIR"), "/timelines/example.toml");
    let config = StepConfig::from_file(timeline_path).expect("Failed to load timeline config");

    let registry = StepRegistry::with_builtins();
    let mut timeline = Timeline::from_config(&config, &registry).expect("Failed to build timeline");

    // Walk forward to the end
    assert!(timeline.advance().await);
    assert_eq!(timeline.active_step(), "profile");
    assert!(timeline.advance().await);
    assert_eq!(timeline.active_step(), "finish");
    assert!(!timeline.advance().await);

    // Walk back to the start
    assert!(timeline.revert().await);
    assert!(timeline.revert().await);
    assert_eq!(timeline.active_step(), "welcome");
    assert!(!timeline.revert().await);
}

#[test]
fn test_timeline_roundtrip_with_real_file() {
    let timeline_path = concat!(env!("CARGO_MANIFEST_DIR"), "/timelines/example.toml");

    // Load config from file
    let original = StepConfig::from_file(timeline_path).expect("Failed to load timeline config");

    // Convert to string
    let toml_string = original.to_toml().expect("Failed to serialize");

    // Parse back from string
    let restored = StepConfig::from_toml(&toml_string).expect("Failed to parse");

    // Verify they match
    assert_eq!(restored.id, original.id);
    assert_eq!(restored.step_type, original.step_type);
    assert_eq!(restored.steps.len(), original.steps.len());
    assert_eq!(restored.steps[1].step.steps.len(), original.steps[1].step.steps.len());
}

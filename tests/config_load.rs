use std::error::Error;
use std::fs;

use gitpulse::config::load_and_validate;

type TestResult = Result<(), Box<dyn Error>>;

const FULL_CONFIG: &str = r#"
[repo]
path = "/srv/publish/tree"
remote_url = "https://example.invalid/memo"
branch = "main"
max_commits_before_compact = 720
push_timeout_secs = 10
force_push_on_startup = true
force_push_at = "04:30"

[publish]
commit_message_file = "out/commit.txt"
refresh_cmd = "render --all"
artifacts = [
  { source = "out/README.md", dest = "README.md" },
  { source = "out/time-dark.svg", dest = "time-dark.svg" },
]

[job.time]
cmd = "gen time"
trigger = "every_tick"

[job.weather]
cmd = "gen weather"
trigger = { every_minutes = 15 }

[job.image]
cmd = "gen image"
trigger = "hourly"

[job.geo]
cmd = "gen geo"
trigger = { daily_at = "10:00" }
"#;

fn load(contents: &str) -> anyhow::Result<gitpulse::config::ConfigFile> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Gitpulse.toml");
    fs::write(&path, contents)?;
    load_and_validate(&path)
}

#[test]
fn full_config_parses_and_validates() -> TestResult {
    let cfg = load(FULL_CONFIG)?;

    assert_eq!(cfg.repo.branch, "main");
    assert_eq!(cfg.repo.max_commits_before_compact, 720);
    assert_eq!(cfg.repo.force_push_at.as_deref(), Some("04:30"));
    assert_eq!(cfg.job.len(), 4);
    assert_eq!(cfg.publish.artifacts.len(), 2);
    assert_eq!(cfg.publish.refresh_cmd.as_deref(), Some("render --all"));

    Ok(())
}

#[test]
fn defaults_apply_when_optional_fields_are_omitted() -> TestResult {
    let cfg = load(
        r#"
[repo]
path = "/srv/publish/tree"
remote_url = "https://example.invalid/memo"

[job.time]
cmd = "gen time"
trigger = "every_tick"
"#,
    )?;

    assert_eq!(cfg.repo.branch, "main");
    assert_eq!(cfg.repo.max_commits_before_compact, 720);
    assert_eq!(cfg.repo.push_timeout_secs, 10);
    assert!(!cfg.repo.force_push_on_startup);
    assert!(cfg.repo.force_push_at.is_none());
    assert!(cfg.publish.artifacts.is_empty());

    Ok(())
}

#[test]
fn config_without_jobs_is_rejected() -> TestResult {
    let err = load(
        r#"
[repo]
path = "/srv/publish/tree"
remote_url = "https://example.invalid/memo"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("at least one [job"));
    Ok(())
}

#[test]
fn unknown_trigger_name_is_rejected() -> TestResult {
    let result = load(
        r#"
[repo]
path = "/srv/publish/tree"
remote_url = "https://example.invalid/memo"

[job.time]
cmd = "gen time"
trigger = "sometimes"
"#,
    );
    assert!(result.is_err());
    Ok(())
}

#[test]
fn zero_interval_trigger_is_rejected() -> TestResult {
    let result = load(
        r#"
[repo]
path = "/srv/publish/tree"
remote_url = "https://example.invalid/memo"

[job.time]
cmd = "gen time"
trigger = { every_minutes = 0 }
"#,
    );
    assert!(result.is_err());
    Ok(())
}

#[test]
fn out_of_range_daily_time_is_rejected() -> TestResult {
    let result = load(
        r#"
[repo]
path = "/srv/publish/tree"
remote_url = "https://example.invalid/memo"

[job.geo]
cmd = "gen geo"
trigger = { daily_at = "25:00" }
"#,
    );
    assert!(result.is_err());
    Ok(())
}

#[test]
fn invalid_force_push_schedule_is_rejected() -> TestResult {
    let result = load(
        r#"
[repo]
path = "/srv/publish/tree"
remote_url = "https://example.invalid/memo"
force_push_at = "banana"

[job.time]
cmd = "gen time"
trigger = "every_tick"
"#,
    );
    assert!(result.is_err());
    Ok(())
}

#[test]
fn small_compaction_threshold_and_zero_timeout_are_rejected() -> TestResult {
    let threshold = load(
        r#"
[repo]
path = "/srv/publish/tree"
remote_url = "https://example.invalid/memo"
max_commits_before_compact = 1

[job.time]
cmd = "gen time"
trigger = "every_tick"
"#,
    );
    assert!(threshold.is_err());

    let timeout = load(
        r#"
[repo]
path = "/srv/publish/tree"
remote_url = "https://example.invalid/memo"
push_timeout_secs = 0

[job.time]
cmd = "gen time"
trigger = "every_tick"
"#,
    );
    assert!(timeout.is_err());

    Ok(())
}

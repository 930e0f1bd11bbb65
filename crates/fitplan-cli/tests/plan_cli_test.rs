//! Integration tests for the `fitplan` binary.
//!
//! Each test runs the real executable against an isolated temporary
//! database, with `XDG_CONFIG_HOME` pointed at a temp dir so no user
//! config leaks in.

use std::path::Path;
use std::process::Output;

use serde_json::Value;
use tempfile::TempDir;
use tokio::process::Command;

use fitplan_test_utils::{create_test_db, drop_test_db, pg_url};

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

struct Harness {
    db_url: String,
    db_name: String,
    config_home: TempDir,
}

impl Harness {
    async fn new() -> Self {
        let (pool, db_name) = create_test_db().await;
        pool.close().await;
        Self {
            db_url: format!("{}/{db_name}", pg_url().await),
            db_name,
            config_home: TempDir::new().unwrap(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_fitplan"));
        cmd.env("XDG_CONFIG_HOME", self.config_home.path())
            .env("RUST_LOG", "warn")
            .env_remove("FITPLAN_DATABASE_URL")
            .env_remove("FITPLAN_GENERATOR_COMMAND")
            .env_remove("FITPLAN_CATALOG")
            .arg("--database-url")
            .arg(&self.db_url);
        cmd
    }

    async fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().await.unwrap()
    }

    async fn run_with_generator(&self, generator: &Path, args: &[&str]) -> Output {
        self.command()
            .env("FITPLAN_GENERATOR_COMMAND", generator)
            .args(args)
            .output()
            .await
            .unwrap()
    }

    async fn cleanup(self) {
        drop_test_db(&self.db_name).await;
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const MEAL_ARGS: &[&str] = &[
    "plan", "generate-meal", "--user", "1", "--calories", "2000", "--protein", "150", "--carbs", "200",
    "--fat", "60",
];

/// Write a generator script that ignores its prompt and prints `days`
/// workout days.
#[cfg(unix)]
fn workout_generator(dir: &Path, days: usize) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let day = serde_json::json!({
        "label": "Full body",
        "focus": "Full body",
        "exercises": [{
            "name": "Push-up",
            "sets": 3,
            "reps": "10",
            "rest": "60 sec",
            "substitutions": ["Knee Push-up", "Incline Push-up"]
        }]
    });
    let plan = serde_json::json!({"meta": {}, "days": vec![day; days]});
    let script = format!("#!/bin/sh\ncat > /dev/null\ncat <<'EOF'\n{plan}\nEOF\n");

    let path = dir.join("fake-generator.sh");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// -----------------------------------------------------------------------
// Tests: meal plans
// -----------------------------------------------------------------------

#[tokio::test]
async fn meal_plan_is_generated_and_versioned() {
    let h = Harness::new().await;

    let mut args = MEAL_ARGS.to_vec();
    args.push("--json");
    let out = h.run(&args).await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let json: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["record"]["version"], 1);
    assert_eq!(json["plan"]["meta"]["generator"], "mock-planner");

    let out = h.run(MEAL_ARGS).await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Saved as version 2 (active)"));

    let out = h.run(&["plan", "history", "meal", "--user", "1"]).await;
    assert!(out.status.success());
    let text = stdout(&out);
    let rows: Vec<&str> = text.lines().skip(2).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("2 "));
    assert!(rows[0].contains("yes"));

    h.cleanup().await;
}

#[tokio::test]
async fn meal_plan_requires_targets() {
    let h = Harness::new().await;

    let out = h
        .run(&["plan", "generate-meal", "--user", "1", "--calories", "2000"])
        .await;
    assert!(!out.status.success());
    assert!(stderr(&out).contains("--protein"));

    h.cleanup().await;
}

#[tokio::test]
async fn latest_reports_missing_plan() {
    let h = Harness::new().await;

    let out = h.run(&["plan", "latest", "meal", "--user", "99"]).await;
    assert!(out.status.success());
    assert!(stdout(&out).contains("No meal plan found for user 99."));

    h.cleanup().await;
}

#[tokio::test]
async fn render_writes_paginated_document() {
    let h = Harness::new().await;
    assert!(h.run(MEAL_ARGS).await.status.success());

    let target = h.config_home.path().join("plan.txt");
    let out = h
        .run(&[
            "plan",
            "render",
            "meal",
            "--user",
            "1",
            "--output",
            target.to_str().unwrap(),
        ])
        .await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("page(s)"));

    let text = std::fs::read_to_string(&target).unwrap();
    assert!(text.starts_with("Weekly Meal Plan"));
    assert!(text.contains("Shopping List"));
    assert!(text.contains('\u{000C}'));

    h.cleanup().await;
}

// -----------------------------------------------------------------------
// Tests: workout plans
// -----------------------------------------------------------------------

#[tokio::test]
async fn workout_without_generator_fails() {
    let h = Harness::new().await;

    let out = h
        .run(&["plan", "generate-workout", "--user", "1", "--days", "3"])
        .await;
    assert!(!out.status.success());
    assert!(stderr(&out).contains("no plan generator is configured for workout plans"));

    h.cleanup().await;
}

#[cfg(unix)]
#[tokio::test]
async fn workout_is_generated_once() {
    let h = Harness::new().await;
    let generator = workout_generator(h.config_home.path(), 3);

    let args = ["plan", "generate-workout", "--user", "5", "--days", "3"];
    let out = h.run_with_generator(&generator, &args).await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Saved as version 1 (active)"));

    let out = h.run_with_generator(&generator, &args).await;
    assert!(!out.status.success());
    assert!(stderr(&out).contains("already has a workout plan"));

    h.cleanup().await;
}

#[cfg(unix)]
#[tokio::test]
async fn workout_with_wrong_day_count_is_rejected() {
    let h = Harness::new().await;
    let generator = workout_generator(h.config_home.path(), 3);

    let out = h
        .run_with_generator(&generator, &["plan", "generate-workout", "--user", "5", "--days", "4"])
        .await;
    assert!(!out.status.success());
    assert!(stderr(&out).contains("try generating again"));

    let out = h.run(&["plan", "history", "workout", "--user", "5"]).await;
    assert!(stdout(&out).contains("No workout plans found"));

    h.cleanup().await;
}

// -----------------------------------------------------------------------
// Tests: init
// -----------------------------------------------------------------------

#[tokio::test]
async fn init_refuses_to_overwrite_without_force() {
    let h = Harness::new().await;

    let out = h.run(&["init", "--generator-command", "llm-plan --json"]).await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let written =
        std::fs::read_to_string(h.config_home.path().join("fitplan/config.toml")).unwrap();
    assert!(written.contains("command = \"llm-plan\""));

    let out = h.run(&["init"]).await;
    assert!(!out.status.success());
    assert!(stderr(&out).contains("--force"));

    assert!(h.run(&["init", "--force"]).await.status.success());

    h.cleanup().await;
}

// -----------------------------------------------------------------------
// Tests: regenerate-day
// -----------------------------------------------------------------------

#[tokio::test]
async fn regenerate_day_saves_new_version() {
    let h = Harness::new().await;
    assert!(h.run(MEAL_ARGS).await.status.success());

    let mut args = vec!["plan", "regenerate-day", "--day", "4"];
    args.extend_from_slice(&MEAL_ARGS[2..]);
    args.push("--json");
    let out = h.run(&args).await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let json: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["day"]["day"], 4);
    assert_eq!(json["record"]["version"], 2);
    assert_eq!(json["day"]["meals"][0]["name"], "Breakfast Option 4");

    let out = h.run(&["plan", "latest", "meal", "--user", "1", "--json"]).await;
    let latest: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(latest["days"][3], json["day"]);

    h.cleanup().await;
}

#[tokio::test]
async fn regenerate_day_rejects_day_out_of_range() {
    let h = Harness::new().await;

    let mut args = vec!["plan", "regenerate-day", "--day", "0"];
    args.extend_from_slice(&MEAL_ARGS[2..]);
    let out = h.run(&args).await;
    assert!(!out.status.success());
    assert!(stderr(&out).contains("day must be between 1 and 7"));

    h.cleanup().await;
}

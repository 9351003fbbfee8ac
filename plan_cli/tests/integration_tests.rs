//! Integration tests for the moveplan binary.
//!
//! These tests verify end-to-end behavior including:
//! - Plan creation and workout editing
//! - Clipboard copy/cut/paste across invocations
//! - Validation, status, stats and density reports

use assert_cmd::Command;
use chrono::NaiveDate;
use plan_core::sequencing::{insert_day, insert_moveframe, insert_workout};
use plan_core::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from the user's config
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("moveplan"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .arg("--data-dir")
        .arg(dir);
    cmd
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
}

struct Seeded {
    swim_workout: Uuid,
    swim_moveframe: Uuid,
    day_two: Uuid,
}

/// Week 1: Sep 2 holds a swim workout, Sep 3 two empty workouts, Sep 4 nothing
fn seed_plan(dir: &Path) -> Seeded {
    let mut swim = Moveframe::new(Sport::Swim);
    swim.movelaps = vec![Movelap::distance(100.0, 60.0), Movelap::distance(200.0, 120.0)];
    let swim_moveframe = swim.id;

    let workout = insert_moveframe(&Workout::named("Pool"), swim, None).unwrap();
    let swim_workout = workout.id;

    let day_one = insert_workout(&Day::on(date(2)), workout, None).unwrap();
    let mut day_two = Day::on(date(3));
    day_two = insert_workout(&day_two, Workout::named("Easy"), None).unwrap();
    day_two = insert_workout(&day_two, Workout::named("Core"), None).unwrap();
    let day_two_id = day_two.id;

    let mut week = Week::new(1);
    for day in [day_one, day_two, Day::on(date(4))] {
        week = insert_day(&week, day).unwrap();
    }

    let mut plan = Plan::new("Test plan", PlanMode::Dated);
    plan.weeks.push(week);
    JsonFileStore::new(dir.join("plan.json")).save(&plan).unwrap();

    Seeded {
        swim_workout,
        swim_moveframe,
        day_two: day_two_id,
    }
}

fn load_plan(dir: &Path) -> Plan {
    let text = fs::read_to_string(dir.join("plan.json")).expect("Failed to read plan");
    serde_json::from_str(&text).expect("Failed to parse plan")
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("moveplan"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout plan editor"));
}

#[test]
fn test_init_creates_dated_weeks() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .args(["init", "--name", "Base block", "--start", "2024-09-02", "--weeks", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created plan 'Base block' with 2 weeks"));

    let plan = load_plan(dir);
    assert_eq!(plan.weeks.len(), 2);
    assert_eq!(plan.weeks[1].number, 2);
    assert_eq!(plan.days().count(), 14);
    assert_eq!(plan.weeks[1].days[0].date, Some(date(9)));
    assert!(validate_plan(&plan).is_empty());
    assert!(dir.join("clipboard.json").exists());
}

#[test]
fn test_init_template_uses_slots() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir).args(["init", "--template"]).assert().success();

    let plan = load_plan(dir);
    assert_eq!(plan.mode, PlanMode::Template);
    let slots: Vec<_> = plan.days().map(|d| d.slot).collect();
    assert_eq!(slots, (1..=7).map(Some).collect::<Vec<_>>());
    assert!(plan.days().all(|d| d.date.is_none()));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir).args(["init", "--start", "2024-09-02"]).assert().success();
    cli(dir)
        .args(["init", "--start", "2024-09-02"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    cli(dir)
        .args(["init", "--start", "2024-09-02", "--force"])
        .assert()
        .success();
}

#[test]
fn test_commands_require_a_plan() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("density")
        .assert()
        .failure()
        .stderr(predicate::str::contains("moveplan init"));
}

#[test]
fn test_add_workout_respects_day_capacity() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    cli(dir).args(["init", "--start", "2024-09-02"]).assert().success();

    for session in 1..=3 {
        cli(dir)
            .args(["add-workout", "--day", "2024-09-03"])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("as session {}", session)));
    }

    cli(dir)
        .args(["add-workout", "--day", "2024-09-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CapacityExceeded"));

    let plan = load_plan(dir);
    assert_eq!(plan.day_on(date(3)).unwrap().workouts.len(), 3);
}

#[test]
fn test_add_workout_at_front_renumbers() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);

    cli(dir)
        .args(["add-workout", "--day", &seeded.day_two.to_string(), "--at", "0", "--name", "Warmup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("as session 1"));

    let plan = load_plan(dir);
    let names: Vec<_> = plan.day(seeded.day_two).unwrap().workouts.iter()
        .map(|w| (w.session_number, w.name.clone().unwrap_or_default()))
        .collect();
    assert_eq!(
        names,
        vec![(1, "Warmup".into()), (2, "Easy".into()), (3, "Core".into())]
    );
}

#[test]
fn test_unknown_date_is_reported() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    seed_plan(dir);

    cli(dir)
        .args(["add-workout", "--day", "2030-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No day on 2030-01-01"));
}

#[test]
fn test_remove_workout_closes_gap() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);

    let easy = load_plan(dir).day(seeded.day_two).unwrap().workouts[0].id;
    cli(dir)
        .args(["remove-workout", "--id", &easy.to_string()])
        .assert()
        .success();

    let plan = load_plan(dir);
    let day = plan.day(seeded.day_two).unwrap();
    assert_eq!(day.workouts.len(), 1);
    assert_eq!(day.workouts[0].session_number, 1);
    assert_eq!(day.workouts[0].name.as_deref(), Some("Core"));
}

#[test]
fn test_add_moveframe_letters_and_totals() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);
    let workout = seeded.swim_workout.to_string();

    cli(dir)
        .args(["add-moveframe", "--workout", &workout, "--sport", "run"])
        .args(["--lap", "400:90", "--lap", "400:95"])
        .assert()
        .success()
        .stdout(predicate::str::contains("as B"));

    cli(dir)
        .args(["add-moveframe", "--workout", &workout, "--sport", "strength", "--set", "12", "--set", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("as C"));

    let plan = load_plan(dir);
    let frames = &plan.workout(seeded.swim_workout).unwrap().moveframes;
    assert_eq!(frames[1].total_distance, 800.0);
    assert_eq!(frames[1].movelaps[1].index, 2);
    assert_eq!(frames[2].total_reps, 22.0);
    assert!(validate_plan(&plan).is_empty());
}

#[test]
fn test_copy_paste_workout_twice() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);

    cli(dir)
        .args(["copy", "--workout", &seeded.swim_workout.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied workout"));

    for _ in 0..2 {
        cli(dir)
            .args(["paste", "--into-day", "2024-09-04"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Pasted as"));
    }

    let plan = load_plan(dir);
    let target = plan.day_on(date(4)).unwrap();
    assert_eq!(target.workouts.len(), 2);
    assert_ne!(target.workouts[0].id, target.workouts[1].id);
    assert_ne!(target.workouts[0].id, seeded.swim_workout);
    assert_eq!(target.workouts[1].session_number, 2);
    // Source untouched by a copy
    assert!(plan.workout(seeded.swim_workout).is_some());
    assert!(validate_plan(&plan).is_empty());
}

#[test]
fn test_cut_moves_workout_and_empties_clipboard() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);

    cli(dir)
        .args(["cut", "--workout", &seeded.swim_workout.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cut workout"));

    cli(dir)
        .args(["paste", "--into-day", "2024-09-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved from"));

    let plan = load_plan(dir);
    assert!(plan.day_on(date(2)).unwrap().workouts.is_empty());
    let moved = &plan.day_on(date(4)).unwrap().workouts;
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].name.as_deref(), Some("Pool"));

    cli(dir)
        .args(["paste", "--into-day", "2024-09-04"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("EmptyClipboard"));
}

#[test]
fn test_failed_cut_paste_keeps_source() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);

    // Fill Sep 3 up to capacity
    cli(dir)
        .args(["add-workout", "--day", "2024-09-03"])
        .assert()
        .success();

    cli(dir)
        .args(["cut", "--workout", &seeded.swim_workout.to_string()])
        .assert()
        .success();
    cli(dir)
        .args(["paste", "--into-day", "2024-09-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CapacityExceeded"));

    let plan = load_plan(dir);
    assert!(plan.workout(seeded.swim_workout).is_some());
    let clipboard = fs::read_to_string(dir.join("clipboard.json")).unwrap();
    assert!(clipboard.contains("holding"));
}

#[test]
fn test_paste_into_incompatible_target() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);

    cli(dir)
        .args(["copy", "--moveframe", &seeded.swim_moveframe.to_string()])
        .assert()
        .success();
    cli(dir)
        .args(["paste", "--into-day", "2024-09-04"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IncompatibleTarget"));
}

#[test]
fn test_copy_moveframe_into_workout_reletters() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);

    cli(dir)
        .args(["copy", "--moveframe", &seeded.swim_moveframe.to_string()])
        .assert()
        .success();
    cli(dir)
        .args(["paste", "--into-workout", &seeded.swim_workout.to_string(), "--at", "0"])
        .assert()
        .success();

    let plan = load_plan(dir);
    let frames = &plan.workout(seeded.swim_workout).unwrap().moveframes;
    let letters: Vec<_> = frames.iter().map(|m| m.letter.as_str()).collect();
    assert_eq!(letters, vec!["A", "B"]);
    assert_eq!(frames[1].id, seeded.swim_moveframe);
}

#[test]
fn test_copy_day_into_week_needs_free_date() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    seed_plan(dir);

    cli(dir).args(["copy", "--day", "2024-09-02"]).assert().success();
    cli(dir)
        .args(["paste", "--into-week", "1", "--date", "2024-09-04"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DateOccupied"));
    cli(dir)
        .args(["paste", "--into-week", "1", "--date", "2024-09-05"])
        .assert()
        .success();

    let plan = load_plan(dir);
    let copy = plan.day_on(date(5)).unwrap();
    assert_eq!(copy.workouts.len(), 1);
    assert_eq!(plan.weeks[0].days.len(), 4);
}

#[test]
fn test_validate_reports_and_repairs() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);

    let mut plan = load_plan(dir);
    plan.day_mut(seeded.day_two).unwrap().workouts[1].session_number = 7;
    JsonFileStore::new(dir.join("plan.json")).save(&plan).unwrap();

    cli(dir)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 violations"));

    cli(dir)
        .args(["validate", "--repair"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 remaining"));

    cli(dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan is consistent"));
}

#[test]
fn test_status_uses_reference_date() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    seed_plan(dir);

    cli(dir)
        .args(["status", "--today", "2024-09-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MISSED_PAST"))
        .stdout(predicate::str::contains("PLANNED_CURRENT_WEEK"))
        .stdout(predicate::str::contains("DONE").not());
}

#[test]
fn test_status_config_window() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    seed_plan(dir);

    let config_dir = dir.join("config").join("moveplan");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[status]\npartial_threshold = 75\ncurrent_window_days = 0\nnext_window_days = 14\n",
    )
    .unwrap();

    cli(dir)
        .args(["status", "--today", "2024-09-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PLANNED_NEXT_WEEK"));
}

#[test]
fn test_stats_reports_sport_totals() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    seed_plan(dir);

    cli(dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Totals for plan"))
        .stdout(predicate::str::contains("swim"))
        .stdout(predicate::str::contains("300 m"))
        .stdout(predicate::str::contains("0h03'00\"0"));
}

#[test]
fn test_stats_csv_export() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    seed_plan(dir);
    let csv_path = dir.join("reports").join("week1.csv");

    cli(dir)
        .args(["stats", "--week", "1", "--csv"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported totals"));

    let text = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("sport,unit,workouts"));
    assert!(lines[1].starts_with("swim,m,1,1,2,300,1800,"));
    assert!(lines[2].starts_with("total,"));
}

#[test]
fn test_density_counts_active_workouts() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);

    // Only the swim workout has moveframes
    cli(dir)
        .arg("density")
        .assert()
        .success()
        .stdout(predicate::str::contains("light-grey (1 active workouts)"));

    cli(dir)
        .args(["copy", "--workout", &seeded.swim_workout.to_string()])
        .assert()
        .success();
    cli(dir)
        .args(["paste", "--into-day", "2024-09-04"])
        .assert()
        .success();

    cli(dir)
        .arg("density")
        .assert()
        .success()
        .stdout(predicate::str::contains("light-yellow (2 active workouts)"))
        .stdout(predicate::str::contains("Week 1: light-yellow"));
}

#[test]
fn test_malformed_field_warns_on_stderr_only() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);

    let mut plan = load_plan(dir);
    let workout = plan.workout_mut(seeded.swim_workout).unwrap();
    workout.moveframes[0].movelaps[0].distance = "a lot".into();
    JsonFileStore::new(dir.join("plan.json")).save(&plan).unwrap();

    cli(dir)
        .env_remove("RUST_LOG")
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("200 m"))
        .stdout(predicate::str::contains("1 unreadable fields counted as zero"))
        .stdout(predicate::str::contains("Ignoring malformed").not())
        .stderr(predicate::str::contains("Ignoring malformed distance"));
}

#[test]
fn test_cut_keeps_edits_made_before_paste() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let seeded = seed_plan(dir);
    let workout = seeded.swim_workout.to_string();

    cli(dir).args(["cut", "--workout", &workout]).assert().success();
    cli(dir)
        .args(["add-moveframe", "--workout", &workout, "--sport", "run", "--lap", "400:90"])
        .assert()
        .success();
    cli(dir)
        .args(["paste", "--into-day", "2024-09-04"])
        .assert()
        .success();

    let plan = load_plan(dir);
    assert!(plan.workout(seeded.swim_workout).is_none());
    let moved = &plan.day_on(date(4)).unwrap().workouts[0];
    let sports: Vec<_> = moved.moveframes.iter().map(|m| m.sport.clone()).collect();
    assert_eq!(sports, vec![Sport::Swim, Sport::Run]);
}

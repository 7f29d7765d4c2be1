use assert_cmd::Command;
use chrono::{Local, NaiveDateTime, TimeZone};
use predicates::prelude::*;
use regex::Regex;
use std::fs;
use tempfile::TempDir;

const DONE_TS: &str = r"@done\((?<ts>[^)]*)\)";

fn setup() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("config.toml"), "").unwrap();
    temp
}

// `Command::cargo_bin` is deprecated in newer assert_cmd releases.
#[allow(deprecated)]
fn doing(temp: &TempDir) -> Command {
    let mut c = Command::cargo_bin("doing").unwrap();
    c.arg("--config-file")
        .arg(temp.path().join("config.toml"))
        .arg("--doing-file")
        .arg(temp.path().join("wwid.md"))
        .env("NO_COLOR", "1")
        .env_remove("DOING_FILE")
        .env_remove("DOING_LOG");
    c
}

fn run(temp: &TempDir, args: &[&str]) {
    doing(temp).args(args).assert().success();
}

fn stdout(temp: &TempDir, args: &[&str]) -> String {
    let out = doing(temp).args(args).assert().success().get_output().stdout.clone();
    String::from_utf8(out).unwrap()
}

fn minutes_from_now(ts: &str) -> i64 {
    let naive = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap();
    let at = Local.from_local_datetime(&naive).earliest().unwrap();
    (Local::now() - at).num_minutes().abs()
}

#[test]
fn new_task() {
    let temp = setup();
    run(&temp, &["now", "Test new task @tag1"]);
    let shown = stdout(&temp, &["show", "-c", "1"]);
    assert!(Regex::new(r"Test new task @tag1\s*$").unwrap().is_match(&shown));
}

#[test]
fn new_task_finishing_last() {
    let temp = setup();
    run(&temp, &["now", "Test new task"]);
    run(&temp, &["now", "--finish_last", "Another task"]);
    let shown = stdout(&temp, &["show"]);
    assert!(shown.contains("Test new task @done"));
    assert!(Regex::new(r"(?m)Another task\s*$").unwrap().is_match(&shown));
}

#[test]
fn section_rejects_empty_args() {
    let temp = setup();
    doing(&temp).args(["now", "--section"]).assert().failure();
    doing(&temp)
        .args(["now", "--section", "", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a section name is required"));
}

#[test]
fn add_section() {
    let temp = setup();
    run(&temp, &["add_section", "Test Section"]);
    doing(&temp)
        .args(["sections", "-c"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?m)^Test Section$").unwrap());
}

#[test]
fn add_to_section() {
    let temp = setup();
    run(&temp, &["add_section", "Test Section"]);
    run(&temp, &["now", "--section", "Test Section", "Test task @testtag"]);
    assert!(stdout(&temp, &["show", "Test Section"]).contains("Test task @testtag"));
}

#[test]
fn now_into_missing_section_fails() {
    let temp = setup();
    doing(&temp)
        .args(["now", "--section", "Nope", "text"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("doing: section \"Nope\" does not exist"));
    assert!(!temp.path().join("wwid.md").exists());
}

#[test]
fn done_task() {
    let temp = setup();
    run(&temp, &["done", "Test finished task @tag1"]);
    let shown = stdout(&temp, &["show"]);
    let caps = Regex::new(r"^(?<start>[^|]+) \| .*@done\((?<end>[^)]*)\)")
        .unwrap()
        .captures(shown.trim())
        .expect("entry should have a @done timestamp");
    assert_eq!(caps["start"].trim(), &caps["end"]);
    assert!(minutes_from_now(&caps["end"]) <= 1);
}

#[test]
fn finish_task() {
    let temp = setup();
    run(&temp, &["now", "Test new task @tag1"]);
    run(&temp, &["finish"]);
    let shown = stdout(&temp, &["show"]);
    let caps = Regex::new(DONE_TS).unwrap().captures(&shown).expect("@done timestamp");
    assert!(minutes_from_now(&caps["ts"]) <= 1);
}

#[test]
fn finish_tag() {
    let temp = setup();
    run(&temp, &["now", "Test new task @tag1"]);
    run(&temp, &["now", "Another new task @tag2"]);
    run(&temp, &["finish", "--tag", "tag1"]);
    let done = Regex::new(DONE_TS).unwrap();
    assert!(done.is_match(&stdout(&temp, &["show", "@tag1"])));
    assert!(!done.is_match(&stdout(&temp, &["show", "@tag2"])));
}

#[test]
fn later_task() {
    let temp = setup();
    doing(&temp)
        .args(["--stdout", "later", "Test later task"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added section \"Later\""))
        .stdout(predicate::str::contains("Added \"Test later task\" to Later"));
    assert_eq!(stdout(&temp, &["show", "later"]).trim().lines().count(), 1);

    doing(&temp)
        .args(["--stdout", "later", "Second"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added section").not());
}

#[test]
fn messages_go_to_stderr_by_default() {
    let temp = setup();
    doing(&temp)
        .args(["now", "Quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Added \"Quiet\" to Currently"));
}

#[test]
fn cancel_task() {
    let temp = setup();
    run(&temp, &["now", "Test task"]);
    run(&temp, &["cancel"]);
    let shown = stdout(&temp, &["show"]);
    assert!(Regex::new(r"(?m)@done$").unwrap().is_match(&shown));
}

#[test]
fn archive_task() {
    let temp = setup();
    run(&temp, &["done", "Test task"]);
    doing(&temp)
        .args(["--stdout", "archive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added section \"Archive\""));
    assert!(stdout(&temp, &["show", "Archive"]).contains("Test task"));
}

#[test]
fn archive_by_search() {
    let temp = setup();
    for food in ["bagels", "bacon", "eggs", "brunch", "breakfast", "lunch"] {
        for prefix in ["Consuming", "Eating"] {
            run(&temp, &["done", &format!("{prefix} @{food}")]);
        }
    }

    doing(&temp)
        .args(["--stdout", "archive", "--search", "/consuming.*?bagels/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added section \"Archive\""))
        .stdout(predicate::str::contains("Archived 1 items from Currently to Archive"));
    let archived = stdout(&temp, &["show", "Archive"]);
    assert!(Regex::new(r"(?i)consuming @bagels").unwrap().is_match(&archived));

    doing(&temp)
        .args(["--stdout", "archive", "--search", "eating"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Archived 6 items from Currently to Archive"));
    assert_eq!(stdout(&temp, &["show", "Archive"]).lines().count(), 7);
}

#[test]
fn archive_from_missing_section_fails() {
    let temp = setup();
    doing(&temp)
        .args(["archive", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("section \"Nope\" does not exist"));
}

#[test]
fn resume_task() {
    let temp = setup();
    run(&temp, &["done", "Test task"]);
    doing(&temp)
        .args(["--stdout", "again"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added \"Test task\" to Currently"));
}

#[test]
fn resume_tag() {
    let temp = setup();
    for i in 0..3 {
        let back = format!("{}m", i + 5);
        let subject = format!("Task {} with @tag{}", i + 1, i + 1);
        run(&temp, &["done", "--back", &back, &subject]);
    }
    doing(&temp)
        .args(["--stdout", "resume", "--tag", "tag2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added \"Task 2 with @tag2\""));

    let last = stdout(&temp, &["last"]);
    assert!(last.contains("Task 2 with @tag2"));
    assert!(!Regex::new(DONE_TS).unwrap().is_match(&last));
}

#[test]
fn finish_and_resume() {
    let temp = setup();
    run(&temp, &["now", "--back", "5m", "Task 4 with @tag4"]);
    run(&temp, &["again"]);
    assert!(stdout(&temp, &["show", "@done"]).contains("Task 4 with @tag4 @done"));
    let last = stdout(&temp, &["last"]);
    assert!(!Regex::new(DONE_TS).unwrap().is_match(&last));
}

#[test]
fn tag_command_adds_and_removes() {
    let temp = setup();
    run(&temp, &["now", "Write docs"]);
    run(&temp, &["tag", "flagged", "client(acme)"]);
    assert!(stdout(&temp, &["last"]).contains("Write docs @flagged @client(acme)"));
    run(&temp, &["tag", "--remove", "flagged"]);
    assert!(stdout(&temp, &["last"]).contains("Write docs @client(acme)\n"));
}

#[test]
fn journal_file_uses_plain_text_layout() {
    let temp = setup();
    run(&temp, &["now", "--back", "1h", "First", "--note", "details here"]);
    run(&temp, &["later", "Someday"]);
    let raw = fs::read_to_string(temp.path().join("wwid.md")).unwrap();
    let layout = Regex::new(
        r"^Currently:\n\t- \d{4}-\d{2}-\d{2} \d{2}:\d{2} \| First\n\t\tdetails here\nLater:\n\t- \d{4}-\d{2}-\d{2} \d{2}:\d{2} \| Someday\n$",
    )
    .unwrap();
    assert!(layout.is_match(&raw), "unexpected file:\n{raw}");
}

#[test]
fn corrupt_file_reports_line() {
    let temp = setup();
    fs::write(temp.path().join("wwid.md"), "Currently:\nnot an entry\n").unwrap();
    doing(&temp)
        .args(["show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("doing: line 2:"));
}

#[test]
fn config_file_renames_sections() {
    let temp = setup();
    fs::write(
        temp.path().join("config.toml"),
        "current_section = \"Now\"\nlater_section = \"Someday\"\n",
    )
    .unwrap();
    run(&temp, &["now", "Task"]);
    run(&temp, &["later", "Idea"]);
    doing(&temp)
        .args(["sections", "-c"])
        .assert()
        .success()
        .stdout("Now\nSomeday\n");
}

#[test]
fn config_file_rejects_unwritable_section_name() {
    let temp = setup();
    fs::write(temp.path().join("config.toml"), "later_section = \"Some: day\"\n").unwrap();
    doing(&temp)
        .args(["later", "Idea"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("section names cannot contain `:`"));
    assert!(!temp.path().join("wwid.md").exists());
}

#[test]
fn archive_rejects_unwritable_target() {
    let temp = setup();
    run(&temp, &["done", "Test task"]);
    doing(&temp)
        .args(["archive", "--to", "Done: 2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("section names cannot contain `:`"));
    assert!(stdout(&temp, &["show"]).contains("Test task"));
}

#[test]
fn multi_line_entry_text_is_rejected() {
    let temp = setup();
    doing(&temp)
        .args(["now", "first line\nsecond line"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("entry text cannot span lines"));
    assert!(!temp.path().join("wwid.md").exists());
}

#[test]
fn tag_values_with_parentheses_are_rejected() {
    let temp = setup();
    run(&temp, &["now", "Write docs"]);
    doing(&temp).args(["tag", "client(a)b)"]).assert().failure();
    assert!(stdout(&temp, &["last"]).contains("Write docs\n"));
}

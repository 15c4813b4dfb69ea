#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use resortdesk_lib::{AppointmentView, Guest};
use tempfile::tempdir;

fn desk(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("resortdesk").expect("binary built");
    cmd.arg("--db").arg(db).env("RESORTDESK_LOG", "off");
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn one_shot_commands_book_and_list() -> Result<()> {
    let tmp = tempdir()?;
    let db = tmp.path().join("resort.sqlite3");

    let output = desk(&db)
        .args(["guests", "add", "--last-name", "Ivanov", "--first-name", "Petr"])
        .output()?;
    assert!(output.status.success(), "{output:?}");
    assert!(stdout_of(&output).contains("Guest #1 added"));

    desk(&db)
        .args(["services", "add", "--name", "Massage", "--price", "1500", "--duration", "45"])
        .assert()
        .success();
    desk(&db)
        .args([
            "appointments", "add", "--guest", "1", "--service", "1", "--date", "10.06.2024",
            "--time", "14:30",
        ])
        .assert()
        .success();

    let output = desk(&db).args(["guests", "list", "--json"]).output()?;
    assert!(output.status.success());
    let guests: Vec<Guest> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(guests.len(), 1);
    assert_eq!(guests[0].id, 1);
    assert_eq!(guests[0].fields.last_name, "Ivanov");

    let output = desk(&db).args(["appointments", "list", "--json"]).output()?;
    let views: Vec<AppointmentView> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].guest.label, "Ivanov Petr");
    assert_eq!(views[0].service.label, "Massage");
    Ok(())
}

#[test]
fn rejected_input_exits_with_one() -> Result<()> {
    let tmp = tempdir()?;
    let db = tmp.path().join("resort.sqlite3");
    desk(&db)
        .args(["guests", "add", "--last-name", "Ivanov", "--first-name", "Petr"])
        .assert()
        .success();
    desk(&db)
        .args(["services", "add", "--name", "Massage", "--price", "1500", "--duration", "45"])
        .assert()
        .success();

    let output = desk(&db)
        .args([
            "appointments", "add", "--guest", "1", "--service", "1", "--date", "31.02.2024",
            "--time", "10:00",
        ])
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("31.02.2024"));

    let output = desk(&db).args(["appointments", "list"]).output()?;
    assert!(stdout_of(&output).contains("(no appointments)"));
    Ok(())
}

#[test]
fn delete_with_yes_skips_the_prompt() -> Result<()> {
    let tmp = tempdir()?;
    let db = tmp.path().join("resort.sqlite3");
    desk(&db)
        .args(["services", "add", "--name", "Sauna", "--price", "300", "--duration", "60"])
        .assert()
        .success();

    // Without --yes the prompt reads stdin; an empty answer declines.
    let output = desk(&db)
        .args(["services", "delete", "1"])
        .write_stdin("\n")
        .output()?;
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Cancelled."));

    let output = desk(&db).args(["services", "delete", "1", "--yes"]).output()?;
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Service #1 deleted"));

    let output = desk(&db).args(["services", "show", "1"]).output()?;
    assert_eq!(output.status.code(), Some(1));
    Ok(())
}

#[test]
fn update_changes_only_given_fields() -> Result<()> {
    let tmp = tempdir()?;
    let db = tmp.path().join("resort.sqlite3");
    desk(&db)
        .args(["guests", "add", "--last-name", "Ivanov", "--first-name", "Petr", "--room", "12"])
        .assert()
        .success();
    desk(&db)
        .args(["guests", "update", "1", "--room", "14"])
        .assert()
        .success();

    let output = desk(&db).args(["guests", "show", "1"]).output()?;
    let shown = stdout_of(&output);
    assert!(shown.contains("[guests #1]"), "{shown}");
    assert!(shown.contains("last_name      Ivanov"), "{shown}");
    assert!(shown.contains("room           14"), "{shown}");
    Ok(())
}

#[test]
fn shell_runs_from_stdin() -> Result<()> {
    let tmp = tempdir()?;
    let db = tmp.path().join("resort.sqlite3");
    let output = desk(&db)
        .write_stdin("set last_name Ivanov\nset first_name Petr\nadd\nlist\nquit\n")
        .output()?;
    assert!(output.status.success());
    let shown = stdout_of(&output);
    assert!(shown.contains("Success: Guest #1 added"), "{shown}");
    assert!(shown.contains("Ivanov Petr"), "{shown}");
    Ok(())
}

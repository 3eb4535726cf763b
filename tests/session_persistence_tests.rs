mod common;

use regex::Regex;

use common::{run_script, test_home, SIGN_UP};

#[test]
fn session_survives_between_runs() {
    let home = test_home();
    run_script(&home, SIGN_UP);

    let stdout = run_script(
        &home,
        &[
            "transaction add expense 15 2024-02-02 Transport bus",
            "whoami",
            "exit",
        ],
    );
    assert!(stdout.contains("Recorded expense of 15.00 USD on 2024-02-02"));
    assert!(stdout.contains("grace@example.com"));

    let stdout = run_script(&home, &["transaction list", "exit"]);
    assert!(stdout.contains("bus"));
}

#[test]
fn logout_ends_the_session() {
    let home = test_home();
    run_script(&home, SIGN_UP);
    let stdout = run_script(&home, &["logout", "exit"]);
    assert!(stdout.contains("Signed out."));

    let stdout = run_script(&home, &["report", "exit"]);
    assert!(stdout.contains("Not logged in"));
}

#[test]
fn books_are_isolated_per_user() {
    let home = test_home();
    let mut lines = SIGN_UP.to_vec();
    lines.extend([
        "transaction add income 500 2024-04-01 Freelance",
        "logout",
        "register \"Alan Turing\" alan@example.com enigma42",
        "login alan@example.com enigma42",
        "report summary",
        "exit",
    ]);
    let stdout = run_script(&home, &lines);
    let last_summary = stdout.rsplit("=== Summary ===").next().unwrap_or_default();
    assert!(last_summary.contains("Total income    : 0.00 USD"));
}

#[test]
fn backups_can_be_restored() {
    let home = test_home();
    let mut lines = SIGN_UP.to_vec();
    lines.extend([
        "transaction add income 100 2024-01-10 Gift",
        "backup create before cleanup",
        "exit",
    ]);
    let stdout = run_script(&home, &lines);
    assert!(stdout.contains("_before-cleanup"));

    let pattern = Regex::new(r"Backup `([^`]+)` created").unwrap();
    let name = pattern
        .captures(&stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .expect("backup name in output");

    let restore = format!("backup restore {name}");
    let stdout = run_script(
        &home,
        &[
            "transaction add expense 40 2024-01-11 Shopping",
            "report summary",
            restore.as_str(),
            "report summary",
            "exit",
        ],
    );
    assert!(stdout.contains("Book restored from"));
    let last_summary = stdout.rsplit("=== Summary ===").next().unwrap_or_default();
    assert!(last_summary.contains("Total expense   : 0.00 USD"));
}

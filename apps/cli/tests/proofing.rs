use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn scriptproof(workspace: &std::path::Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("scriptproof")?;
    cmd.arg("--workspace").arg(workspace);
    Ok(cmd)
}

#[test]
fn scan_writes_findings_log_and_applies_substitutions() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let document = dir.path().join("chapter.txt");
    fs::write(&document, "He said 你好.\nAll clear (大丈夫)\n「Quote」\n")?;
    fs::write(
        dir.path().join("replacements.json"),
        r#"{ "「": "\"", "」": "\"" }"#,
    )?;

    scriptproof(dir.path())?
        .arg("scan")
        .arg(&document)
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 2 configured substitution(s)"))
        .stdout(predicate::str::contains("Found 1 line(s)"));

    assert_eq!(
        fs::read_to_string(dir.path().join("language_check.log"))?,
        "He said 你好.\n"
    );
    assert_eq!(
        fs::read_to_string(&document)?,
        "He said 你好.\nAll clear (大丈夫)\n\" Quote\" \n"
    );
    Ok(())
}

#[test]
fn scan_reports_clean_document() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let document = dir.path().join("clean.txt");
    let log = dir.path().join("custom.log");
    fs::write(&document, "Only English here.\n")?;

    scriptproof(dir.path())?
        .arg("scan")
        .arg(&document)
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No Japanese or Chinese characters were found",
        ));

    assert_eq!(fs::read_to_string(&log)?, "");
    Ok(())
}

#[test]
fn scan_missing_document_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    scriptproof(dir.path())?
        .args(["scan", "does-not-exist.txt"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
    Ok(())
}

#[test]
fn draft_prefills_corrected_log() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("language_check.log"), "一行目\n二行目\n")?;

    scriptproof(dir.path())?
        .arg("draft")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 draft correction(s)"));

    let corrected = dir.path().join("language_proof_translated.log");
    assert_eq!(fs::read_to_string(&corrected)?, "一行目\n二行目\n");

    scriptproof(dir.path())?
        .arg("draft")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    Ok(())
}

#[test]
fn fix_applies_corrections() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let findings = dir.path().join("findings.log");
    let corrected = dir.path().join("corrected.log");
    let target = dir.path().join("target.txt");
    fs::write(&findings, "こんにちは\n世界\n")?;
    fs::write(&corrected, "Hello\nWorld\n")?;
    fs::write(&target, "こんにちは\n世界\nend\n")?;

    scriptproof(dir.path())?
        .arg("fix")
        .args([&findings, &corrected, &target])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "File modification successful. 2 replacements were made.",
        ));
    assert_eq!(fs::read_to_string(&target)?, "Hello\nWorld\nend\n");

    scriptproof(dir.path())?
        .arg("fix")
        .args([&findings, &corrected, &target])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes were made."));
    Ok(())
}

#[test]
fn fix_with_mismatched_logs() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let findings = dir.path().join("findings.log");
    let corrected = dir.path().join("corrected.log");
    let target = dir.path().join("target.txt");
    fs::write(&findings, "一\n二\n三\n")?;
    fs::write(&corrected, "one\ntwo\n")?;
    fs::write(&target, "一 二 三\n")?;

    scriptproof(dir.path())?
        .arg("--strict-count")
        .arg("fix")
        .args([&findings, &corrected, &target])
        .assert()
        .failure()
        .stderr(predicate::str::contains("3 entries but corrected log has 2"));
    assert_eq!(fs::read_to_string(&target)?, "一 二 三\n");

    scriptproof(dir.path())?
        .arg("fix")
        .args([&findings, &corrected, &target])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 replacements were made."));
    assert_eq!(fs::read_to_string(&target)?, "one two 三\n");
    Ok(())
}

#[test]
fn fix_fails_on_empty_findings_log() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let findings = dir.path().join("findings.log");
    let corrected = dir.path().join("corrected.log");
    let target = dir.path().join("target.txt");
    fs::write(&findings, "\n")?;
    fs::write(&corrected, "fixed\n")?;
    fs::write(&target, "text\n")?;

    scriptproof(dir.path())?
        .arg("fix")
        .args([&findings, &corrected, &target])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no entries"));
    Ok(())
}

#[test]
fn run_proofs_document_end_to_end() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let document = dir.path().join("chapter.txt");
    let edited = dir.path().join("edited.log");
    fs::write(&document, "Intro\n彼は言った\nOutro (注)\n")?;
    fs::write(&edited, "He said\n")?;

    scriptproof(dir.path())?
        .arg("run")
        .arg(&document)
        .arg("--corrected")
        .arg(&edited)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 line(s)"))
        .stdout(predicate::str::contains("1 replacements were made."));

    assert_eq!(fs::read_to_string(&document)?, "Intro\nHe said\nOutro (注)\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("language_proof_translated.log"))?,
        "He said\n"
    );
    Ok(())
}

#[test]
fn trace_log_receives_events() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let document = dir.path().join("doc.txt");
    let trace = dir.path().join("trace.log");
    fs::write(&document, "漢字\n")?;

    scriptproof(dir.path())?
        .arg("--trace-log")
        .arg(&trace)
        .arg("scan")
        .arg(&document)
        .env_remove("SCRIPTPROOF_LOG")
        .assert()
        .success();

    let contents = fs::read_to_string(&trace)?;
    assert!(contents.contains("language check finished"));
    assert!(!contents.contains('\u{1b}'));
    Ok(())
}

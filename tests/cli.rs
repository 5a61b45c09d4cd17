use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const PASS: &str = "0123456789abcdef0123456789abcdef";

fn bin() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("sealbox"))
}

#[test]
fn put_and_get_roundtrip() {
    let dir = tempdir().unwrap();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("put")
        .arg("sessions/alice")
        .arg("hello world")
        .assert()
        .success()
        .stdout(predicate::str::contains("sessions/alice.enc"));

    assert!(dir.path().join("sessions/alice.enc").exists());

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("get")
        .arg("sessions/alice")
        .assert()
        .success()
        .stdout(predicate::str::contains("hello world"));
}

#[test]
fn short_passphrase_is_refused() {
    let dir = tempdir().unwrap();

    bin()
        .env("SEALBOX_PASSPHRASE", "short")
        .arg("--data-dir")
        .arg(dir.path())
        .arg("put")
        .arg("note")
        .arg("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));

    assert!(!dir.path().join("note.enc").exists());
}

#[test]
fn wrong_passphrase_fails() {
    let dir = tempdir().unwrap();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("put")
        .arg("note")
        .arg("secret")
        .assert()
        .success();

    bin()
        .env("SEALBOX_PASSPHRASE", "another-passphrase-of-32-chars!!")
        .arg("--data-dir")
        .arg(dir.path())
        .arg("get")
        .arg("note")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "invalid passphrase or corrupted data",
        ));
}

#[test]
fn stored_file_is_ciphertext() {
    let dir = tempdir().unwrap();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("put")
        .arg("users/alice")
        .arg(r#"{"name":"Alice"}"#)
        .assert()
        .success();

    let raw = std::fs::read_to_string(dir.path().join("users/alice.enc")).unwrap();
    assert!(!raw.contains("Alice"));
    assert!(raw.contains("chacha20-poly1305"));
}

#[test]
fn put_from_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.txt");
    std::fs::write(&input, "from a file").unwrap();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("put")
        .arg("imported")
        .arg("--file")
        .arg(&input)
        .assert()
        .success();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("get")
        .arg("imported")
        .assert()
        .success()
        .stdout(predicate::str::contains("from a file"));
}

#[test]
fn get_missing_is_not_found() {
    let dir = tempdir().unwrap();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("get")
        .arg("data/missing")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no stored object"));
}

#[test]
fn rm_removes_the_envelope() {
    let dir = tempdir().unwrap();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("put")
        .arg("note")
        .arg("x")
        .assert()
        .success();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("rm")
        .arg("note")
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));

    assert!(!dir.path().join("note.enc").exists());

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("rm")
        .arg("note")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no stored object"));
}

#[test]
fn ls_lists_only_envelopes() {
    let dir = tempdir().unwrap();

    for (path, value) in [("box/b", "2"), ("box/a", "1")] {
        bin()
            .env("SEALBOX_PASSPHRASE", PASS)
            .arg("--data-dir")
            .arg(dir.path())
            .arg("put")
            .arg(path)
            .arg(value)
            .assert()
            .success();
    }
    std::fs::write(dir.path().join("box/stray.txt"), "ignore me").unwrap();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("ls")
        .arg("box")
        .assert()
        .success()
        .stdout(predicate::str::contains("a.enc"))
        .stdout(predicate::str::contains("b.enc"))
        .stdout(predicate::str::contains("stray").not());
}

#[test]
fn exists_reports_both_ways() {
    let dir = tempdir().unwrap();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("exists")
        .arg("note")
        .assert()
        .failure();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("put")
        .arg("note")
        .arg("x")
        .assert()
        .success();

    bin()
        .env("SEALBOX_PASSPHRASE", PASS)
        .arg("--data-dir")
        .arg(dir.path())
        .arg("exists")
        .arg("note")
        .assert()
        .success()
        .stdout(predicate::str::contains("note.enc"));
}

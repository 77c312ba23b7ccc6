//! Exit-code behaviour of the three binaries

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn bin(name: &str) -> Command {
    let mut cmd = Command::cargo_bin(name).unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_mode(path: &Path, contents: &str, mode: u32) {
    std::fs::write(path, contents).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
}

fn success_line(age: Duration) -> String {
    format!(
        "{} INFO: completed ok\n",
        (Utc::now() - age).format("%Y-%m-%dT%H:%M:%S%z")
    )
}

// ----------------------------------------------------------------------------
// check-failover-recent
// ----------------------------------------------------------------------------

#[test]
fn test_check_without_argument_is_unknown() {
    bin("check-failover-recent")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("No file path provided"));
}

#[test]
fn test_check_bad_flag_is_unknown() {
    bin("check-failover-recent")
        .args(["log", "--grace-minutes", "soon"])
        .assert()
        .code(3);
}

#[test]
fn test_check_help_is_ok() {
    bin("check-failover-recent").arg("--help").assert().code(0);
}

#[test]
fn test_check_recent_success() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("failover.log");
    std::fs::write(&log, success_line(Duration::hours(1))).unwrap();

    bin("check-failover-recent")
        .arg(&log)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("The failover process last succeeded at"));
}

#[test]
fn test_check_stale_success_is_critical() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("failover.log");
    std::fs::write(&log, success_line(Duration::hours(8))).unwrap();

    bin("check-failover-recent").arg(&log).assert().code(2);

    // Widening the grace period makes the same log healthy
    bin("check-failover-recent")
        .arg(&log)
        .args(["--grace-minutes", "600"])
        .assert()
        .code(0);
}

#[test]
fn test_check_missing_file_is_critical() {
    let dir = TempDir::new().unwrap();

    bin("check-failover-recent")
        .arg(dir.path().join("missing.log"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("open/read"));
}

#[test]
fn test_check_json_output() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("failover.log");
    std::fs::write(&log, "2021-08-02T08:40:01+0000 ERROR: Access denied\n").unwrap();

    let output = bin("check-failover-recent")
        .arg(&log)
        .args(["--format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "CRITICAL");
    assert!(report.get("last_success").is_none());
}

// ----------------------------------------------------------------------------
// failover-dump / failover-import
// ----------------------------------------------------------------------------

struct Site {
    dir: TempDir,
}

impl Site {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path(name);
        write_mode(&path, &format!("#!/bin/sh\n{}\n", body), 0o755);
        path
    }

    fn run_log(&self) -> String {
        std::fs::read_to_string(self.path("failover.log")).unwrap_or_default()
    }

    fn dump_config(&self, dump_binary: &Path) -> PathBuf {
        let config = self.path("failover_fetch.ini");
        let ini = format!(
            "[client-mariadb]\n\
             result-file={result}\n\
             \n\
             [local]\n\
             noFetch={sentinel}\n\
             dumpFile={dump}\n\
             databaseName=gocdb\n\
             dumpBinary={binary}\n\
             \n\
             [logs]\n\
             file={log}\n\
             level=debug\n",
            result = self.path("result.sql").display(),
            sentinel = self.path("noFetch").display(),
            dump = self.path("dump.sql").display(),
            binary = dump_binary.display(),
            log = self.path("failover.log").display(),
        );
        write_mode(&config, &ini, 0o600);
        config
    }

    fn import_config(&self, source: &Path, mysql_binary: &Path) -> PathBuf {
        std::fs::create_dir_all(self.path("work")).unwrap();
        std::fs::create_dir_all(self.path("archive")).unwrap();

        let config = self.path("config.ini");
        let ini = format!(
            "[remote]\n\
             host=\n\
             user=\n\
             path={source}\n\
             \n\
             [local]\n\
             workDir={work}\n\
             archiveDir={archive}\n\
             format=%Y%m%d_%H%M%S\n\
             noImport={sentinel}\n\
             retryCount=2\n\
             mysqlBinary={mysql}\n\
             copyBinary=cp\n\
             \n\
             [logs]\n\
             file={log}\n",
            source = source.display(),
            work = self.path("work").display(),
            archive = self.path("archive").display(),
            sentinel = self.path("noImport").display(),
            mysql = mysql_binary.display(),
            log = self.path("failover.log").display(),
        );
        write_mode(&config, &ini, 0o600);
        config
    }
}

#[test]
fn test_dump_missing_config_fails() {
    bin("failover-dump")
        .args(["-c", "/nonexistent/failover_fetch.ini"])
        .assert()
        .code(1);
}

#[test]
fn test_dump_success_rotates_and_records() {
    let site = Site::new();
    let dumper = site.script(
        "fake-dump",
        &format!("echo \"-- dump of $2\" > {}", site.path("result.sql").display()),
    );
    let config = site.dump_config(&dumper);
    std::fs::write(site.path("dump.sql"), "-- previous").unwrap();

    bin("failover-dump").arg("-c").arg(&config).assert().code(0);

    assert_eq!(
        std::fs::read_to_string(site.path("dump.sql")).unwrap(),
        "-- dump of gocdb\n"
    );
    assert_eq!(
        std::fs::read_to_string(site.path("dump.sql_old")).unwrap(),
        "-- previous"
    );
    assert!(site.run_log().ends_with("INFO: completed ok\n"));

    bin("check-failover-recent")
        .arg(site.path("failover.log"))
        .assert()
        .code(0);
}

#[test]
fn test_dump_failure_is_logged() {
    let site = Site::new();
    let dumper = site.script("fake-dump", "echo 'Access denied for user' >&2; exit 2");
    let config = site.dump_config(&dumper);

    bin("failover-dump").arg("-c").arg(&config).assert().code(1);

    assert!(site.run_log().contains("ERROR: Access denied for user"));
    bin("check-failover-recent")
        .arg(site.path("failover.log"))
        .assert()
        .code(2);
}

#[test]
fn test_dump_sentinel_aborts() {
    let site = Site::new();
    let dumper = site.script("fake-dump", "exit 0");
    let config = site.dump_config(&dumper);
    std::fs::write(site.path("noFetch"), "primary in maintenance\n").unwrap();

    bin("failover-dump").arg("-c").arg(&config).assert().code(1);

    let log = site.run_log();
    assert!(log.contains("No fetch attempted. File contents - primary in maintenance"));
    assert!(!log.contains("completed ok"));
}

#[test]
fn test_dump_rejects_world_readable_options_file() {
    let site = Site::new();
    let dumper = site.script("fake-dump", "exit 0");
    let config = site.dump_config(&dumper);
    std::fs::set_permissions(&config, std::fs::Permissions::from_mode(0o644)).unwrap();

    bin("failover-dump").arg("-c").arg(&config).assert().code(1);

    assert!(!site.run_log().contains("completed ok"));
}

#[test]
fn test_import_local_copy_end_to_end() {
    let site = Site::new();
    let source = site.path("gocdb.sql");
    std::fs::write(&source, "CREATE TABLE t (id INT);").unwrap();
    let mysql = site.script("fake-mysql", "exit 0");
    let config = site.import_config(&source, &mysql);

    bin("failover-import").arg("-c").arg(&config).assert().code(0);

    let archived: Vec<_> = std::fs::read_dir(site.path("archive"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].extension().unwrap(), "dmp");
    assert!(site.run_log().ends_with("INFO: completed ok\n"));
    assert!(source.exists(), "local source is copied, not moved");
}

#[test]
fn test_import_failure_exhausts_retries() {
    let site = Site::new();
    let source = site.path("gocdb.sql");
    std::fs::write(&source, "CREATE TABLE t (id INT);").unwrap();
    let mysql = site.script("fake-mysql", "echo 'ERROR 2002: cannot connect' >&2; exit 1");
    let config = site.import_config(&source, &mysql);

    bin("failover-import").arg("-c").arg(&config).assert().code(1);

    let log = site.run_log();
    assert!(log.contains("ERROR: ERROR 2002: cannot connect"));
    assert_eq!(std::fs::read_dir(site.path("archive")).unwrap().count(), 0);
}

use assert_cmd::Command;
use predicates::str::contains;

fn cmd() -> Command {
    Command::cargo_bin("fundraisingd").unwrap()
}

#[test]
fn version_exits_successfully() {
    cmd().arg("--version").assert().success().stdout(contains("fundraisingd"));
}

#[test]
fn key_generation_exits_successfully() {
    cmd()
        .args(["key", "generate", "--scheme", "sr25519", "--output-type", "json"])
        .assert()
        .success()
        .stdout(contains("ss58Address"));
}

#[test]
fn unknown_chain_spec_exits_with_one() {
    cmd()
        .args(["build-spec", "--chain", "/nonexistent/fundraising-spec.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Error"));
}

#[test]
fn purge_of_unknown_chain_exits_with_one() {
    let base = std::env::temp_dir().join("fundraisingd-purge-test");
    cmd()
        .args(["purge-chain", "-y", "--chain", "/nonexistent/fundraising-spec.json", "--base-path"])
        .arg(&base)
        .assert()
        .failure()
        .code(1);
}

#[test]
fn unknown_subcommand_is_rejected() {
    cmd().arg("no-such-command").assert().failure();
}

#[test]
fn zero_block_time_is_rejected_before_start() {
    cmd()
        .args(["--dev", "--block-time", "0"])
        .assert()
        .failure()
        .stderr(contains("block-time"));
}

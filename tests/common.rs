use assert_cmd::cargo_bin_cmd;

/// Run the program with the given arguments and check that it succeeds
#[allow(dead_code)]
pub fn assert_ccts_runs(args: &[&str]) {
    cargo_bin_cmd!("ccts-planner")
        .env("CCTS_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .assert()
        .success();
}

/// Run the program with the given arguments and check that it fails
#[allow(dead_code)]
pub fn assert_ccts_fails(args: &[&str]) {
    cargo_bin_cmd!("ccts-planner")
        .env("CCTS_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .assert()
        .failure();
}

/// Run the program with the given arguments and return what it printed to stdout
#[allow(dead_code)]
pub fn get_ccts_stdout(args: &[&str]) -> String {
    let output = cargo_bin_cmd!("ccts-planner")
        .env("CCTS_USE_DEFAULT_SETTINGS", "1")
        .env("CCTS_LOG_LEVEL", "off")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());

    String::from_utf8(output.stdout).unwrap()
}

use std::process::Command;

#[test]
fn headless_game_prints_the_final_field() {
    let output = Command::new(env!("CARGO_BIN_EXE_tower-defence"))
        .args(["--width", "12", "--height", "8", "--seed", "11", "--rounds", "2"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch the tower-defence binary");

    assert!(output.status.success(), "tower-defence should exit cleanly");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 9, "eight field rows and a summary:\n{stdout}");
    assert!(lines[..8].iter().all(|row| row.chars().count() == 12));
    assert!(lines[8].starts_with("round "));
}

#[test]
fn invalid_overrides_are_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_tower-defence"))
        .args(["--width", "0"])
        .output()
        .expect("failed to launch the tower-defence binary");

    assert!(!output.status.success());
}

#[test]
fn zero_speed_is_rejected_before_the_game_starts() {
    let output = Command::new(env!("CARGO_BIN_EXE_tower-defence"))
        .args(["--realtime", "--speed", "0"])
        .output()
        .expect("failed to launch the tower-defence binary");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("game speed"));
}

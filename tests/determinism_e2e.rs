//! End-to-end determinism tests
//!
//! Runs the `tactics` binary twice with the same seed and compares stdout.
//! One test is generated per `.dck` file in `test_decks/` by the `dir-test`
//! macro; adding a deck file adds a test.

use dir_test::{dir_test, Fixture};
use similar_asserts::assert_eq;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Run one match through the binary and capture stdout
fn run_match_with_seed(deck_path: &Path, seed: u64, verbosity: &str) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_tactics"))
        .arg("play")
        .arg(deck_path)
        .arg(deck_path)
        .args([
            "--seed",
            &seed.to_string(),
            "--p1=random",
            "--p2=random",
            &format!("--verbosity={verbosity}"),
        ])
        .output()
        .expect("Failed to run tactics binary");
    assert!(output.status.success(), "tactics exited with {}", output.status);

    String::from_utf8(output.stdout).expect("Invalid UTF-8 in stdout")
}

#[dir_test(
    dir: "$CARGO_MANIFEST_DIR/test_decks",
    glob: "**/*.dck",
)]
fn test_deck_determinism(fixture: Fixture<&str>) {
    let deck_path = Path::new(fixture.path());
    let run1 = run_match_with_seed(deck_path, 42, "verbose");
    let run2 = run_match_with_seed(deck_path, 42, "verbose");

    assert!(!run1.is_empty(), "Deck {} produced empty output", deck_path.display());
    assert!(run1.contains("=== Game Over ==="));
    assert_eq!(
        run1,
        run2,
        "Deck {} produced different output with same seed",
        deck_path.display()
    );
}

/// Same seed repeats; a different seed plays a different match
#[test]
fn test_different_seeds_consistency() {
    let deck_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_decks/vanguard.dck");

    let seed42_run1 = run_match_with_seed(&deck_path, 42, "normal");
    let seed42_run2 = run_match_with_seed(&deck_path, 42, "normal");
    assert_eq!(seed42_run1, seed42_run2, "Seed 42 produced inconsistent output");

    let seed100_run1 = run_match_with_seed(&deck_path, 100, "normal");
    assert_ne!(
        seed42_run1, seed100_run1,
        "Different seeds produced identical output (highly unlikely)"
    );
}

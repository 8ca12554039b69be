use std::process::Command;

fn score_document() -> Command {
    Command::new(env!("CARGO_BIN_EXE_score_document"))
}

#[test]
fn test_missing_image_path_prints_usage() {
    let output = score_document().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: score_document <image_file_path> <user_name>"));
}

#[test]
fn test_matching_mock_record_is_verified() {
    let output = score_document()
        .args(["card.png", "John Doe", "--decoder", "mock"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Expected User Name: \"John Doe\""));
    // uid format 2 (checksum fails) + dob 1 + gender 1 + name 2
    assert!(stdout.contains("Score: 6 / 10  VERIFIED"), "{}", stdout);
}

#[test]
fn test_wrong_name_without_strong_signals_is_flagged() {
    let output = score_document()
        .args(["card.png", "Priya Sharma", "--decoder", "mock"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Score: 4 / 10  FLAGGED FOR REVIEW"), "{}", stdout);
}

#[test]
fn test_failed_decode_scores_zero() {
    let output = score_document()
        .args([
            "card.png",
            "Jane Doe",
            "--decoder",
            "script",
            "--decoder-program",
            "definitely-not-a-decoder-binary",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Score: 0 / 10  FLAGGED FOR REVIEW"), "{}", stdout);
}

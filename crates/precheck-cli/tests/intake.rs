//! End-to-end tests for file intake and the extract command

use precheck_cli::{merge_sources, run_extract, CliError, ExtractArgs, GroupArg};
use precheck_embed::TokenHashEmbedder;
use precheck_extractor::{Extractor, ExtractorConfig, TextNormalizer};
use precheck_llm::MockProvider;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn normalizer() -> TextNormalizer {
    TextNormalizer::from_config(&ExtractorConfig::default()).unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_merge_tags_each_file_and_names_after_first_mail() {
    let dir = TempDir::new().unwrap();
    let shot = write(&dir, "screen.png", "not really a png");
    let notes = write(&dir, "notes.txt", "Alarm 7001 raised on boot.");
    let mail = write(
        &dir,
        "thread.eml",
        "From: ops@example.com\nSubject: Boot alarm\n\nThe board raises alarm 7001.\nBest regards\n",
    );

    let merged = merge_sources(&[shot, notes, mail], None, &normalizer()).unwrap();

    assert_eq!(merged.filename, "notes.txt");
    assert_eq!(
        merged.text,
        "--- notes.txt ---\nAlarm 7001 raised on boot.\n\n--- thread.eml ---\nBoot alarm\n\nThe board raises alarm 7001."
    );
}

#[test]
fn test_merge_skips_unknown_and_blank_files() {
    let dir = TempDir::new().unwrap();
    let pdf = write(&dir, "report.pdf", "%PDF-1.7");
    let blank = write(&dir, "blank.txt", "  \n\n ");
    let text = write(&dir, "log.TXT", "RRC setup failure on cell 3.");

    let merged = merge_sources(&[pdf, blank, text], None, &normalizer()).unwrap();

    assert_eq!(merged.filename, "blank.txt");
    assert_eq!(merged.text, "--- log.TXT ---\nRRC setup failure on cell 3.");
}

#[test]
fn test_unreadable_inputs_only_give_no_content() {
    let dir = TempDir::new().unwrap();
    let shot = write(&dir, "screen.jpg", "jpeg bytes");
    let msg = write(&dir, "mail.msg", "binary outlook data");

    let result = merge_sources(&[shot.clone()], None, &normalizer());
    assert!(matches!(result, Err(CliError::NoContent)));

    let result = merge_sources(&[shot, msg], None, &normalizer());
    assert!(matches!(result, Err(CliError::NoContent)));
}

#[test]
fn test_manual_entry_name_without_mail_or_text_file() {
    let dir = TempDir::new().unwrap();
    let shot = write(&dir, "screen.png", "png");

    let merged = merge_sources(&[shot], Some("Handover to cell 9 failed."), &normalizer()).unwrap();

    assert!(merged.filename.starts_with("manual_entry_"));
    assert!(merged.filename.ends_with(".eml"));
    assert_eq!(merged.filename.len(), "manual_entry_".len() + 8 + ".eml".len());
    assert_eq!(merged.text, "--- stdin ---\nHandover to cell 9 failed.");
}

#[test]
fn test_inline_text_follows_files() {
    let dir = TempDir::new().unwrap();
    let notes = write(&dir, "notes.txt", "Step one.");

    let merged = merge_sources(&[notes], Some("Step two."), &normalizer()).unwrap();

    assert_eq!(merged.filename, "notes.txt");
    assert_eq!(merged.text, "--- notes.txt ---\nStep one.\n\n--- stdin ---\nStep two.");
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone.txt");
    assert!(matches!(
        merge_sources(&[missing], None, &normalizer()),
        Err(CliError::Io(_))
    ));
}

#[tokio::test]
async fn test_extract_command_prints_both_groups() {
    let dir = TempDir::new().unwrap();
    let mail = write(
        &dir,
        "case.eml",
        "Subject: Known issue\n\n[1. Workaround:]\nDisable DRX\n[2. Description of the correction:]\nTimer fix in R24\n[3. Test requirements:]\nRun the DRX suite\n",
    );

    let llm = MockProvider::new("");
    let extractor =
        Extractor::new(llm.clone(), TokenHashEmbedder::new(64), ExtractorConfig::default())
            .unwrap();
    let args = ExtractArgs {
        files: vec![mail],
        stdin: false,
        group: GroupArg::Both,
        pretty: false,
    };

    let json = run_extract(&args, &extractor).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["filename"], "case.eml");
    assert_eq!(
        value["resolution"],
        "[1. Workaround:]\nDisable DRX\n\n[2. Description of the correction:]\nTimer fix in R24\n\n[3. Test requirements:]\nRun the DRX suite"
    );
    assert!(value["description"]
        .as_str()
        .unwrap()
        .starts_with("[1. Detail Test Steps:]"));
    // Only the description needed the LLM
    assert_eq!(llm.call_count(), 1);
}

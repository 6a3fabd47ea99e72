use jobsift_engine::{artifact_filename, ensure_inspection_dir, AtomicFileWriter};
use pretty_assertions::assert_eq;

#[test]
fn artifact_filename_is_deterministic_and_safe() {
    let name = artifact_filename("20240101T000000Z", "Re: Jobs?/Weekly digest", "html");
    assert!(name.starts_with("20240101T000000Z--Re_Jobs_Weekly_digest--"));
    assert!(name.ends_with(".html"));

    // Stable across calls.
    let again = artifact_filename("20240101T000000Z", "Re: Jobs?/Weekly digest", "html");
    assert_eq!(name, again);

    // Subjects colliding after sanitization still get distinct names.
    let other = artifact_filename("20240101T000000Z", "Re: Jobs!/Weekly digest", "html");
    assert_ne!(name, other);
}

#[test]
fn empty_subject_gets_a_placeholder() {
    let name = artifact_filename("20240101T000000Z", "", "txt");
    assert!(name.contains("no_subject"));
}

#[test]
fn long_subjects_are_truncated() {
    let subject = "a".repeat(300);
    let name = artifact_filename("20240101T000000Z", &subject, "txt");
    assert!(name.len() < 80);
}

#[test]
fn writer_replaces_existing_artifacts_atomically() {
    let dir = tempfile::tempdir().expect("tempdir");
    ensure_inspection_dir(dir.path()).expect("dir usable");

    let writer = AtomicFileWriter::new(dir.path().to_path_buf());
    let first = writer.write("artifact.txt", "first").expect("write");
    let second = writer.write("artifact.txt", "second").expect("rewrite");

    assert_eq!(first, second);
    assert_eq!(std::fs::read_to_string(second).unwrap(), "second");
}

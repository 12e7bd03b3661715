use std::io::Write;

use registry_spray_rs::inputs::{load_list, load_targets, plan_credentials, CredentialPlan};
use registry_spray_rs::types::Credential;

fn file_with(content: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    f.write_all(content.as_bytes()).expect("write");
    f
}

#[test]
fn targets_from_file_are_trimmed_and_blank_lines_dropped() {
    let f = file_with("  reg1:5000 \n\nreg2\n   \nreg3:443\n");
    let targets = load_targets(f.path().to_str().unwrap()).expect("load ok");
    assert_eq!(targets, vec!["reg1:5000", "reg2", "reg3:443"]);
}

#[test]
fn list_file_keeps_whitespace_in_entries() {
    let f = file_with("pass word\n\nx\n");
    let list = load_list(f.path().to_str().unwrap()).unwrap();
    assert_eq!(list, vec!["pass word", "x"]);
}

#[test]
fn empty_target_list_is_rejected() {
    let f = file_with("\n\n");
    assert!(load_targets(f.path().to_str().unwrap()).is_err());
}

#[test]
fn credentials_file_overrides_users() {
    let f = file_with("admin:admin\nbroken line\nci:tok:en\n");
    let plan = plan_credentials(Some(f.path().to_str().unwrap()), Some("ignored"), None).unwrap();
    assert_eq!(
        plan,
        CredentialPlan::File(vec![Credential::new("admin", "admin"), Credential::new("ci", "tok:en")])
    );
}

#[test]
fn users_and_passwords_from_files() {
    let users = file_with("alice\nbob\n");
    let passwords = file_with("one\n");
    let plan = plan_credentials(
        None,
        Some(users.path().to_str().unwrap()),
        Some(passwords.path().to_str().unwrap()),
    )
    .unwrap();
    assert_eq!(
        plan.into_credentials(),
        vec![Credential::new("alice", "one"), Credential::new("bob", "one")]
    );
}

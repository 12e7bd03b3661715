use anyhow::{bail, Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::types::{Credential, Target};

/// Resolve a list argument: the contents of the file it names, one entry per
/// line, or the argument itself split on `,` when no such file exists.
/// Read errors other than "not found" are fatal.
pub fn load_list(arg: &str) -> Result<Vec<String>> {
    match fs::read_to_string(arg) {
        Ok(content) => Ok(parse_lines(&content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(split_inline(arg)),
        Err(e) => Err(e).with_context(|| format!("failed to read list file: {arg}")),
    }
}

/// Targets are trimmed; blank entries are dropped.
pub fn load_targets(arg: &str) -> Result<Vec<Target>> {
    let raw = load_list(arg)?;
    let targets: Vec<Target> = raw
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if targets.is_empty() {
        bail!("no targets found in: {arg}");
    }
    Ok(targets)
}

/// Parse `user:password` lines. The password is everything after the first
/// `:` and may itself contain colons; lines without a `:` are skipped.
pub fn parse_credentials_str(s: &str) -> Vec<Credential> {
    s.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(user, pass)| Credential::new(user, pass))
        .collect()
}

/// Load a credentials file. Unlike other lists it must exist.
pub fn load_credentials_file(path: impl AsRef<Path>) -> Result<Vec<Credential>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read credentials file: {}", path.display()))?;
    let creds = parse_credentials_str(&content);
    if creds.is_empty() {
        bail!("no user:password lines in {}", path.display());
    }
    Ok(creds)
}

/// Every user paired with every password, users outermost.
pub fn cross_product(users: &[String], passwords: &[String]) -> Vec<Credential> {
    users
        .iter()
        .flat_map(|u| passwords.iter().map(move |p| Credential::new(u.as_str(), p.as_str())))
        .collect()
}

/// How the credential list was assembled, for the run banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPlan {
    File(Vec<Credential>),
    Combined {
        users: usize,
        passwords: usize,
        credentials: Vec<Credential>,
    },
    /// No users given: look for unauthenticated access only.
    Anonymous,
}

impl CredentialPlan {
    pub fn into_credentials(self) -> Vec<Credential> {
        match self {
            CredentialPlan::File(c) => c,
            CredentialPlan::Combined { credentials, .. } => credentials,
            CredentialPlan::Anonymous => vec![Credential::anonymous()],
        }
    }
}

/// Build the credential list from the CLI arguments.
///
/// - a credentials file wins over users/passwords;
/// - no users means a single anonymous probe;
/// - users without passwords is an error.
pub fn plan_credentials(
    credentials_file: Option<&str>,
    users: Option<&str>,
    passwords: Option<&str>,
) -> Result<CredentialPlan> {
    if let Some(path) = credentials_file {
        return Ok(CredentialPlan::File(load_credentials_file(path)?));
    }
    let Some(users) = users else {
        return Ok(CredentialPlan::Anonymous);
    };
    let Some(passwords) = passwords else {
        bail!("passwords are required when users are given");
    };
    let users = load_list(users)?;
    let passwords = load_list(passwords)?;
    if users.is_empty() {
        bail!("user list is empty");
    }
    if passwords.is_empty() {
        bail!("password list is empty");
    }
    let credentials = cross_product(&users, &passwords);
    Ok(CredentialPlan::Combined {
        users: users.len(),
        passwords: passwords.len(),
        credentials,
    })
}

fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_inline(arg: &str) -> Vec<String> {
    arg.split(',').map(str::to_string).collect()
}

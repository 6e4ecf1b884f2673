//! macOS Keychain backend
//!
//! Drives the system `security` tool against the login keychain. Items are
//! internet passwords carrying the façade key as their label and a creator
//! code that marks every item written by this service, which is what
//! remove-all deletes by.
//!
//! The keychain decides uniqueness from account, server, protocol, port,
//! path and security domain; label and creator take no part in it. The key
//! is therefore also written as the security domain, so two keys holding the
//! same login never collide.
//!
//! The tool has no options for accessibility or synchronizability, so both
//! policy flags are accepted on write and read back as `false`.

#![cfg_attr(not(target_os = "macos"), allow(dead_code, unused_imports))]

use super::item::{ItemClass, ItemPolicy, ItemQuery, KeystoreItem};
use super::keystore::{Keystore, Status};
use super::secure_string::SecureString;
use tracing::warn;

pub struct KeychainKeystore {
    creator: String,
}

impl KeychainKeystore {
    /// `creator` must be a four-character code
    #[must_use]
    pub fn new(creator: impl Into<String>) -> Self {
        Self {
            creator: creator.into(),
        }
    }
}

/// Four-character protocol codes understood by the keychain
const PROTOCOLS: &[(&str, &str)] = &[
    ("http", "http"),
    ("https", "htps"),
    ("ftp", "ftp "),
    ("ftps", "ftps"),
    ("ssh", "ssh "),
    ("sftp", "ssh "),
    ("telnet", "teln"),
    ("smtp", "smtp"),
    ("pop3", "pop3"),
    ("imap", "imap"),
    ("imaps", "imps"),
    ("ldap", "ldap"),
    ("ldaps", "ldps"),
    ("smb", "smb "),
    ("afp", "afp "),
    ("irc", "irc "),
    ("nntp", "nntp"),
    ("socks", "sox "),
];

/// Comment prefix used to keep schemes that have no protocol code
const SCHEME_COMMENT: &str = "scheme=";

fn protocol_code(scheme: &str) -> Option<&'static str> {
    PROTOCOLS
        .iter()
        .find(|(s, _)| *s == scheme)
        .map(|(_, code)| *code)
}

fn scheme_for_code(code: &str) -> Option<&'static str> {
    PROTOCOLS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(scheme, _)| *scheme)
}

/// Map a `security` exit code back to a status.
///
/// The tool exits with the low byte of the `OSStatus`, so only the common
/// codes can be recovered exactly; anything else is passed through as-is.
fn status_from_exit(code: Option<i32>) -> Status {
    match code {
        Some(44) => Status::ITEM_NOT_FOUND,
        Some(45) => Status::DUPLICATE_ITEM,
        Some(36) => Status::INTERACTION_NOT_ALLOWED,
        Some(51) => Status::AUTH_FAILED,
        Some(code) => Status::from_code(code),
        None => Status::IO,
    }
}

/// Arguments for `add-internet-password`
fn add_args(item: &KeystoreItem, creator: &str) -> Vec<String> {
    let mut args = vec![
        "add-internet-password".to_string(),
        "-l".to_string(),
        item.label.clone(),
        "-d".to_string(),
        item.label.clone(),
        "-c".to_string(),
        creator.to_string(),
        "-a".to_string(),
        item.account.clone().unwrap_or_default(),
        "-s".to_string(),
        item.server.clone().unwrap_or_default(),
    ];
    if let Some(scheme) = item.protocol.as_deref() {
        match protocol_code(scheme) {
            Some(code) => args.extend(["-r".to_string(), code.to_string()]),
            None => args.extend(["-j".to_string(), format!("{SCHEME_COMMENT}{scheme}")]),
        }
    }
    if let Some(port) = item.port {
        args.extend(["-P".to_string(), port.to_string()]);
    }
    if let Some(path) = item.path.as_deref() {
        args.extend(["-p".to_string(), path.to_string()]);
    }
    args.extend(["-w".to_string(), item.secret.expose().to_string()]);
    args
}

/// Selector arguments shared by find and delete
fn query_args(query: &ItemQuery, creator: &str) -> Vec<String> {
    let mut args = vec!["-c".to_string(), creator.to_string()];
    if let Some(label) = query.label.as_deref() {
        args.extend([
            "-l".to_string(),
            label.to_string(),
            "-d".to_string(),
            label.to_string(),
        ]);
    }
    args
}

/// Value of one attribute line of `find-internet-password` output.
///
/// Handles `="text"`, `=0x6869  "hi"` (hex blob), `=0x000001BB` (integer)
/// and `=<NULL>`.
fn attribute_value(line: &str) -> Option<String> {
    let (_, raw) = line.split_once("=")?;
    let raw = raw.trim();
    if raw == "<NULL>" {
        return None;
    }
    if let Some(quoted) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        return Some(quoted.to_string());
    }
    let hex = raw.split_whitespace().next()?.strip_prefix("0x")?;
    if line.contains("<blob>") {
        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| hex.get(i..i + 2).and_then(|b| u8::from_str_radix(b, 16).ok()))
            .collect::<Option<Vec<u8>>>()?;
        String::from_utf8(bytes).ok()
    } else {
        u32::from_str_radix(hex, 16).ok().map(|n| n.to_string())
    }
}

/// Rebuild an item from `find-internet-password` attribute output
fn parse_item(output: &str, secret: SecureString) -> Result<KeystoreItem, Status> {
    let mut item = KeystoreItem {
        class: ItemClass::InternetPassword,
        label: String::new(),
        account: None,
        secret,
        server: None,
        protocol: None,
        port: None,
        path: None,
        policy: ItemPolicy::default(),
    };
    let mut comment_scheme = None;
    let mut domain = None;

    for line in output.lines().map(str::trim_start) {
        let value = attribute_value(line);
        if line.starts_with("0x00000007 ") || line.starts_with("\"labl\"") {
            item.label = value.unwrap_or_default();
        } else if line.starts_with("\"acct\"") {
            item.account = value.filter(|v| !v.is_empty());
        } else if line.starts_with("\"srvr\"") {
            item.server = value.filter(|v| !v.is_empty());
        } else if line.starts_with("\"ptcl\"") {
            item.protocol = value
                .as_deref()
                .and_then(scheme_for_code)
                .map(str::to_string);
        } else if line.starts_with("\"port\"") {
            item.port = value
                .and_then(|v| v.parse::<u16>().ok())
                .filter(|p| *p != 0);
        } else if line.starts_with("\"path\"") {
            item.path = value.filter(|v| !v.is_empty());
        } else if line.starts_with("\"sdmn\"") {
            domain = value.filter(|v| !v.is_empty());
        } else if line.starts_with("\"icmt\"") {
            comment_scheme = value
                .and_then(|v| v.strip_prefix(SCHEME_COMMENT).map(str::to_string));
        }
    }

    if item.protocol.is_none() {
        item.protocol = comment_scheme;
    }
    if item.label.is_empty() {
        item.label = domain.unwrap_or_default();
    }
    if item.label.is_empty() {
        return Err(Status::DECODE);
    }
    Ok(item)
}

/// Write `replacement` in place of the already deleted `existing`, putting
/// `existing` back if the write is refused. The write status is returned.
fn write_or_restore(
    replacement: &KeystoreItem,
    existing: &KeystoreItem,
    add: impl Fn(&KeystoreItem) -> Result<(), Status>,
) -> Result<(), Status> {
    add(replacement).inspect_err(|_| {
        if let Err(status) = add(existing) {
            warn!(label = %existing.label, status = %status, "Failed to restore keychain item");
        }
    })
}

#[cfg(target_os = "macos")]
mod native {
    use super::*;
    use std::process::{Command, Output};

    fn security<I, S>(args: I) -> Result<Output, Status>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let output = Command::new("security").args(args).output().map_err(|e| {
            warn!(error = %e, "Failed to run security");
            Status::NOT_AVAILABLE
        })?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(status_from_exit(output.status.code()))
        }
    }

    pub(super) fn add(item: &KeystoreItem, creator: &str) -> Result<(), Status> {
        security(add_args(item, creator)).map(|_| ())
    }

    pub(super) fn find(query: &ItemQuery, creator: &str) -> Result<KeystoreItem, Status> {
        let selector = query_args(query, creator);

        let attributes = security(
            std::iter::once("find-internet-password".to_string()).chain(selector.clone()),
        )?;
        let password = security(
            std::iter::once("find-internet-password".to_string())
                .chain(selector)
                .chain(std::iter::once("-w".to_string())),
        )?;

        let mut raw = String::from_utf8(password.stdout).map_err(|_| Status::DECODE)?;
        let secret = SecureString::new(raw.trim_end_matches('\n'));
        zeroize::Zeroize::zeroize(&mut raw);

        parse_item(&String::from_utf8_lossy(&attributes.stdout), secret)
    }

    /// `delete-internet-password` removes one match per call
    pub(super) fn delete(query: &ItemQuery, creator: &str) -> Result<(), Status> {
        let selector = query_args(query, creator);
        let mut deleted = 0usize;
        loop {
            let result = security(
                std::iter::once("delete-internet-password".to_string()).chain(selector.clone()),
            );
            match result {
                Ok(_) => deleted += 1,
                Err(status) if status.is_not_found() && deleted > 0 => return Ok(()),
                Err(status) => return Err(status),
            }
        }
    }
}

#[cfg(not(target_os = "macos"))]
mod native {
    use super::*;

    pub(super) fn add(_item: &KeystoreItem, _creator: &str) -> Result<(), Status> {
        Err(Status::NOT_AVAILABLE)
    }

    pub(super) fn find(_query: &ItemQuery, _creator: &str) -> Result<KeystoreItem, Status> {
        Err(Status::NOT_AVAILABLE)
    }

    pub(super) fn delete(_query: &ItemQuery, _creator: &str) -> Result<(), Status> {
        Err(Status::NOT_AVAILABLE)
    }
}

impl Keystore for KeychainKeystore {
    fn add(&self, item: &KeystoreItem) -> Result<(), Status> {
        match native::find(&ItemQuery::label(&item.label), &self.creator) {
            Ok(_) => Err(Status::DUPLICATE_ITEM),
            Err(status) if status.is_not_found() => native::add(item, &self.creator),
            Err(status) => Err(status),
        }
    }

    /// The tool cannot edit an item selected by label, so the match is
    /// replaced. If the new item is refused the old one is written back.
    fn update(&self, query: &ItemQuery, item: &KeystoreItem) -> Result<(), Status> {
        let existing = native::find(query, &self.creator)?;
        let replacement = KeystoreItem {
            label: existing.label.clone(),
            ..item.clone()
        };
        native::delete(&ItemQuery::label(&existing.label), &self.creator)?;
        write_or_restore(&replacement, &existing, |item| native::add(item, &self.creator))
    }

    fn copy_matching(&self, query: &ItemQuery) -> Result<KeystoreItem, Status> {
        native::find(query, &self.creator)
    }

    fn delete(&self, query: &ItemQuery) -> Result<(), Status> {
        native::delete(query, &self.creator)
    }

    fn name(&self) -> &'static str {
        "keychain"
    }
}

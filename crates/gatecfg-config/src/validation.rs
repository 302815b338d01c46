//! Value predicates shared by option descriptors and module checks.
//!
//! Functions named `valid_*` are plain predicates. The `check_*` functions
//! have the [`crate::option::Validator`] shape and can be attached to an
//! option descriptor.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$").expect("static regex")
});

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9\-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9\-]{0,61}[A-Za-z0-9])?)*$")
        .expect("static regex")
});

/// `true/yes/on/1` and `false/no/off/0`, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Empty, `DEFAULT`, or anything starting with `UNAVAILABLE` counts as
/// "not set".
pub fn is_blank(value: &str) -> bool {
    let upper = value.trim().to_uppercase();
    upper.is_empty() || upper == "DEFAULT" || upper.starts_with("UNAVAILABLE")
}

pub fn valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Syntactic host name check; no resolution is attempted.
pub fn valid_domain(value: &str) -> bool {
    value.len() <= 253 && DOMAIN_RE.is_match(value)
}

/// `host[:port]` where port is 1..=65535.
pub fn valid_host_port(value: &str) -> bool {
    match value.rsplit_once(':') {
        Some((host, port)) => {
            valid_domain(host) && port.parse::<u16>().is_ok_and(|p| p > 0)
        }
        None => valid_domain(value),
    }
}

/// A job contact string: `host[:port]/jobmanager-<jobmanager>`.
pub fn valid_contact(contact: &str, jobmanager: &str) -> bool {
    let Some((host, manager)) = contact.split_once('/') else {
        return false;
    };
    let expected = format!("jobmanager-{jobmanager}");
    valid_host_port(host) && (manager == expected || manager == "jobmanager")
}

/// Five whitespace-separated crontab fields.
pub fn valid_cron(value: &str) -> bool {
    value.split_whitespace().count() == 5
}

/// An existing filesystem location.
pub fn valid_location(value: &str) -> bool {
    Path::new(value).exists()
}

pub fn valid_directory(value: &str) -> bool {
    Path::new(value).is_dir()
}

pub fn valid_file(value: &str) -> bool {
    Path::new(value).is_file()
}

pub fn check_email(value: &str) -> Result<(), String> {
    if valid_email(value) {
        Ok(())
    } else {
        Err(format!("'{value}' is not a valid email address"))
    }
}

pub fn check_domain(value: &str) -> Result<(), String> {
    if valid_domain(value) {
        Ok(())
    } else {
        Err(format!("'{value}' is not a valid host name"))
    }
}

pub fn check_host_port(value: &str) -> Result<(), String> {
    if valid_host_port(value) {
        Ok(())
    } else {
        Err(format!("'{value}' is not of the form host[:port]"))
    }
}

pub fn check_absolute_path(value: &str) -> Result<(), String> {
    if Path::new(value).is_absolute() {
        Ok(())
    } else {
        Err(format!("'{value}' is not an absolute path"))
    }
}

pub fn check_cron(value: &str) -> Result<(), String> {
    if valid_cron(value) {
        Ok(())
    } else {
        Err(format!("'{value}' is not a 5 field cron time"))
    }
}

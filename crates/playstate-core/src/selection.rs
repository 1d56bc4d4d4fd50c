use std::collections::BTreeSet;
use std::fmt;
use playstate_models::{PlaybackRecord, User};

/// Invalid answers tolerated before an interactive selection gives up
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    NotANumber(String),
    OutOfRange { choice: i64, len: usize },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::NotANumber(_) => write!(f, "Invalid input. Please enter a number."),
            SelectionError::OutOfRange { len, .. } => {
                write!(f, "Invalid choice. Please enter a number between 1 and {}.", len)
            }
        }
    }
}

impl std::error::Error for SelectionError {}

/// Distinct non-empty usernames in a backup, sorted
pub fn backup_usernames(records: &[PlaybackRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.source_username.as_str())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Records exported for `username`, in file order
pub fn records_for_username(records: &[PlaybackRecord], username: &str) -> Vec<PlaybackRecord> {
    records
        .iter()
        .filter(|r| r.source_username == username)
        .cloned()
        .collect()
}

/// Find a user by exact id, then by case-insensitive name
pub fn find_user<'a>(users: &'a [User], needle: &str) -> Option<&'a User> {
    let needle = needle.trim();
    users
        .iter()
        .find(|u| u.id == needle)
        .or_else(|| users.iter().find(|u| u.name.eq_ignore_ascii_case(needle)))
}

/// Parse a 1-based menu answer into a 0-based index below `len`
pub fn parse_ordinal(input: &str, len: usize) -> Result<usize, SelectionError> {
    let trimmed = input.trim();
    let choice: i64 = trimmed
        .parse()
        .map_err(|_| SelectionError::NotANumber(trimmed.to_string()))?;

    if choice >= 1 && (choice as u64) <= len as u64 {
        Ok(choice as usize - 1)
    } else {
        Err(SelectionError::OutOfRange { choice, len })
    }
}

/// Ask repeatedly until an answer parses as an ordinal in `1..=len`.
///
/// `read` supplies one answer per call, however the caller obtains it.
/// Returns `Ok(None)` for an empty list or once `max_attempts` answers were
/// rejected; read errors are passed through.
pub fn select_ordinal<R, E, V>(
    len: usize,
    max_attempts: usize,
    mut read: R,
    mut on_invalid: V,
) -> Result<Option<usize>, E>
where
    R: FnMut() -> Result<String, E>,
    V: FnMut(&SelectionError),
{
    if len == 0 {
        return Ok(None);
    }

    for _ in 0..max_attempts {
        let answer = read()?;
        match parse_ordinal(&answer, len) {
            Ok(index) => return Ok(Some(index)),
            Err(e) => {
                tracing::warn!(input = %answer.trim(), error = %e, "Invalid selection");
                on_invalid(&e);
            }
        }
    }

    Ok(None)
}

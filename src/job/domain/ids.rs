//! Identifier and validated scalar types for the job domain.

use super::JobDomainError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of a slug-encoded task identifier.
const SLUG_LENGTH: usize = 22;

/// Task identifier issued by the queue.
///
/// Task identifiers are URL-safe, unpadded base64 encodings of a UUID. The
/// original slug is kept for URLs while the decoded UUID feeds job GUIDs.
///
/// # Examples
///
/// ```
/// use taskcluster_treeherder::job::domain::TaskId;
///
/// let id = TaskId::new("fB7ZGTtaQ3SIqgsH1nq2aA").expect("valid slug");
/// assert_eq!(id.as_uuid().to_string(), "7c1ed919-3b5a-4374-88aa-0b07d67ab668");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    slug: String,
    uuid: Uuid,
}

impl TaskId {
    /// Creates a validated task identifier from its slug form.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::InvalidTaskId`] when the value is not a
    /// 22-character URL-safe base64 encoding of 16 bytes.
    pub fn new(value: impl Into<String>) -> Result<Self, JobDomainError> {
        let slug = value.into();
        if slug.len() != SLUG_LENGTH {
            return Err(JobDomainError::InvalidTaskId(slug));
        }
        let Ok(bytes) = URL_SAFE_NO_PAD.decode(slug.as_bytes()) else {
            return Err(JobDomainError::InvalidTaskId(slug));
        };
        let Ok(uuid) = Uuid::from_slice(&bytes) else {
            return Err(JobDomainError::InvalidTaskId(slug));
        };
        Ok(Self { slug, uuid })
    }

    /// Returns the slug form used by the queue.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.slug
    }

    /// Returns the decoded UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.uuid
    }
}

impl TryFrom<String> for TaskId {
    type Error = JobDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskId> for String {
    fn from(value: TaskId) -> Self {
        value.slug
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slug)
    }
}

/// Zero-based index of an execution attempt of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(u32);

impl RunId {
    /// Creates a run identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the run as a position in a run list, if addressable.
    #[must_use]
    pub fn as_index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RFC 3339 timestamp kept in its original textual form.
///
/// Run timestamps are forwarded to the dashboard untouched, so the value is
/// validated but never reformatted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(String);

impl Timestamp {
    /// Creates a validated timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::InvalidTimestamp`] when the value does not
    /// parse as RFC 3339.
    pub fn new(value: impl Into<String>) -> Result<Self, JobDomainError> {
        let raw = value.into();
        if DateTime::parse_from_rfc3339(&raw).is_err() {
            return Err(JobDomainError::InvalidTimestamp(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the timestamp exactly as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the parsed instant.
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.0).ok()
    }
}

impl TryFrom<String> for Timestamp {
    type Error = JobDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

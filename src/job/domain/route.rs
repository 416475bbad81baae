//! Dashboard routes and the push coordinates they encode.

use super::JobMappingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version marker of routes that also carry a push id.
const VERSIONED_ROUTE_MARKER: &str = "v2";

/// Push coordinates decoded from a dashboard route.
///
/// Routes take one of two shapes:
///
/// - `<prefix>.<project>.<revision>`
/// - `<prefix>.v2.<project>.<revision>.<pushId>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushInfo {
    destination: String,
    project: String,
    revision: String,
    push_id: Option<u64>,
}

impl PushInfo {
    /// Decodes a single route.
    ///
    /// # Errors
    ///
    /// Returns [`JobMappingError::MalformedRoute`] when the route has an
    /// unsupported number of segments, an empty segment, or a non-numeric
    /// push id.
    pub fn parse(route: &str) -> Result<Self, JobMappingError> {
        let malformed = || JobMappingError::MalformedRoute(route.to_owned());
        let segments: Vec<&str> = route.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(malformed());
        }

        match segments.as_slice() {
            [destination, project, revision] => Ok(Self {
                destination: (*destination).to_owned(),
                project: (*project).to_owned(),
                revision: (*revision).to_owned(),
                push_id: None,
            }),
            [destination, marker, project, revision, raw_push_id]
                if *marker == VERSIONED_ROUTE_MARKER =>
            {
                let push_id = raw_push_id.parse::<u64>().map_err(|_| malformed())?;
                Ok(Self {
                    destination: (*destination).to_owned(),
                    project: (*project).to_owned(),
                    revision: (*revision).to_owned(),
                    push_id: Some(push_id),
                })
            }
            _ => Err(malformed()),
        }
    }

    /// Finds and decodes the first route starting with `prefix`.
    ///
    /// Returns `Ok(None)` when no route carries the prefix.
    ///
    /// # Errors
    ///
    /// Returns [`JobMappingError::MalformedRoute`] when the first matching
    /// route cannot be decoded.
    pub fn from_routes<S: AsRef<str>>(
        routes: &[S],
        prefix: &str,
    ) -> Result<Option<Self>, JobMappingError> {
        let matching = routes.iter().map(AsRef::as_ref).find(|route| {
            route
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'))
        });
        matching.map(Self::parse).transpose()
    }

    /// Returns the route prefix naming the destination.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Returns the dashboard project identifier.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the pushed revision.
    #[must_use]
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Returns the push id for versioned routes.
    #[must_use]
    pub const fn push_id(&self) -> Option<u64> {
        self.push_id
    }
}

impl fmt::Display for PushInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.destination, self.project, self.revision)
    }
}

//! API paths.

use std::fmt;
use std::str::FromStr;

use kisa_common::KisaError;

/// Streaming feeds exposed under `/api/v1/streaming`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamEndpoint {
    /// Home timeline and notifications for the authenticated user.
    User,
    /// Server liveness.
    Health,
    /// Notifications only.
    Notification,
    /// Federated timeline.
    Public,
    /// Local posts only.
    PublicLocal,
    /// Remote posts only.
    PublicRemote,
}

impl StreamEndpoint {
    pub const ALL: [Self; 6] = [
        Self::User,
        Self::Health,
        Self::Notification,
        Self::Public,
        Self::PublicLocal,
        Self::PublicRemote,
    ];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::User => "/api/v1/streaming/user",
            Self::Health => "/api/v1/streaming/health",
            Self::Notification => "/api/v1/streaming/user/notification",
            Self::Public => "/api/v1/streaming/public",
            Self::PublicLocal => "/api/v1/streaming/public/local",
            Self::PublicRemote => "/api/v1/streaming/public/remote",
        }
    }

    /// Short name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Health => "health",
            Self::Notification => "notification",
            Self::Public => "public",
            Self::PublicLocal => "public-local",
            Self::PublicRemote => "public-remote",
        }
    }
}

impl fmt::Display for StreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StreamEndpoint {
    type Err = KisaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.name() == s)
            .ok_or_else(|| KisaError::invalid_argument(format!("unknown stream: {s}")))
    }
}

pub(crate) fn hashtag_timeline(hashtag: &str) -> String {
    format!("/api/v1/timelines/tag/{}", urlencoding::encode(hashtag))
}

pub(crate) fn reblog(status_id: &str) -> String {
    format!("/api/v1/statuses/{}/reblog", urlencoding::encode(status_id))
}

pub(crate) fn favourite(status_id: &str) -> String {
    format!("/api/v1/statuses/{}/favourite", urlencoding::encode(status_id))
}

mod api_client;
pub mod requests;
pub mod responses;

pub use api_client::{APIClient, ClientError, TokenStore, ok_body, ok_empty};

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Opaque server-issued course identifier.
#[derive(
    Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CourseId(pub String);

/// Opaque server-issued workout identifier.
#[derive(
    Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WorkoutId(pub String);

impl From<&str> for CourseId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for WorkoutId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

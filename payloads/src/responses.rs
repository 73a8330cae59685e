use crate::{CourseId, WorkoutId};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// The current account as served by `/users/me`.
///
/// `selected_courses` is the authoritative enrollment list: a course is
/// "mine" exactly when its id appears here, regardless of any progress
/// records that may exist for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub selected_courses: Vec<CourseId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// `/users/me` responses arrive either bare or wrapped as `{"user": {...}}`
/// depending on the endpoint version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserEnvelope {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

impl UserEnvelope {
    pub fn into_profile(self) -> UserProfile {
        match self {
            Self::Wrapped { user } => user,
            Self::Bare(user) => user,
        }
    }
}

/// Daily time commitment range in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDuration {
    pub from: u32,
    pub to: u32,
}

/// A catalog course. Read-only from the client's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: CourseId,
    #[serde(rename = "nameRU")]
    pub name_ru: String,
    #[serde(rename = "nameEN")]
    pub name_en: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub directions: Vec<String>,
    #[serde(default)]
    pub fitting: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_duration_in_minutes: Option<DailyDuration>,
    /// Ordered workout ids; the order defines the default progression.
    #[serde(default)]
    pub workouts: Vec<WorkoutId>,
}

/// One exercise within a workout, with its target repetition count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub quantity: u32,
}

/// A workout. Read-only from the client's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    #[serde(rename = "_id")]
    pub id: WorkoutId,
    pub name: String,
    #[serde(default)]
    pub video: String,
    /// Ordered; `WorkoutProgress::progress_data` aligns with this
    /// positionally.
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

/// Per-workout progress record. One instance per (account, workout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutProgress {
    pub workout_id: WorkoutId,
    #[serde(default)]
    pub workout_completed: bool,
    #[serde(default)]
    pub progress_data: Vec<u32>,
}

/// Per-course progress record. One instance per (account, course); the
/// progress endpoints return JSON `null` when no record exists, which is
/// distinct from a record with zero completed workouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: CourseId,
    #[serde(default)]
    pub course_completed: bool,
    #[serde(default)]
    pub workouts_progress: Vec<WorkoutProgress>,
}

impl CourseProgress {
    /// The progress record for one workout, if any.
    pub fn for_workout(&self, workout_id: &WorkoutId) -> Option<&WorkoutProgress> {
        self.workouts_progress
            .iter()
            .find(|wp| &wp.workout_id == workout_id)
    }
}

/// Successful login response. The token is handed to the token store's
/// owner; this crate never persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginToken {
    pub token: String,
}

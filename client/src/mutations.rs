//! Mutation coordinator: enroll, unenroll, and record-workout-progress
//! writes. Every mutation is fire-then-invalidate: the write goes
//! through the typed client, and on success exactly the cache keys whose
//! derived state depends on it are invalidated so the next read
//! revalidates. Failed writes leave the cache untouched and are never
//! retried automatically.

use payloads::{ClientError, CourseId, WorkoutId, requests};

use crate::api::CourseApi;
use crate::notify::Notice;
use crate::state::ResourceKey;
use crate::SyncClient;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// The caller should route the user to sign in.
    #[error("Authentication required.")]
    AuthRequired,
    /// Progress is always scoped to a course; a workout id alone cannot
    /// address a record.
    #[error("Cannot record workout progress without a course.")]
    MissingCourseScope,
    /// The write failed; the message is already user-readable.
    #[error("{0}")]
    Api(String),
}

impl MutationError {
    fn from_client(error: ClientError) -> Self {
        Self::Api(error.user_message())
    }
}

impl<A: CourseApi> SyncClient<A> {
    /// Add a course to the current account. Safe to call when already
    /// enrolled; the server is authoritative and a duplicate write does
    /// not corrupt local state.
    pub async fn enroll(&self, course_id: &CourseId) -> Result<(), MutationError> {
        if !self.has_token() {
            self.notifier
                .notify(Notice::error("Sign in to add a course."));
            return Err(MutationError::AuthRequired);
        }

        let details = requests::EnrollCourse {
            course_id: course_id.clone(),
        };
        match self.api.enroll(&details).await {
            Ok(()) => {
                {
                    let mut state = self.state.borrow_mut();
                    // Enrollment list changed; progress may now exist as
                    // "present, zero progress"
                    state.invalidate(&ResourceKey::CurrentUser);
                    state.invalidate(&ResourceKey::CourseProgress(
                        course_id.clone(),
                    ));
                }
                tracing::info!(course = %course_id, "enrolled in course");
                self.notifier.notify(Notice::success("Course added."));
                Ok(())
            }
            Err(e) => {
                let error = MutationError::from_client(e);
                self.notifier.notify(Notice::error(error.to_string()));
                Err(error)
            }
        }
    }

    /// Remove a course from the current account. Confirmation is the UI
    /// layer's concern. Progress reads for the course show "absent"
    /// afterwards even if the server retains history.
    pub async fn unenroll(
        &self,
        course_id: &CourseId,
    ) -> Result<(), MutationError> {
        if !self.has_token() {
            return Err(MutationError::AuthRequired);
        }

        match self.api.unenroll(course_id).await {
            Ok(()) => {
                {
                    let mut state = self.state.borrow_mut();
                    state.invalidate(&ResourceKey::CurrentUser);
                    state.invalidate(&ResourceKey::CourseProgress(
                        course_id.clone(),
                    ));
                    state.invalidate_workout_progress_for_course(course_id);
                }
                tracing::info!(course = %course_id, "unenrolled from course");
                self.notifier.notify(Notice::success("Course removed."));
                Ok(())
            }
            Err(e) => {
                let error = MutationError::from_client(e);
                self.notifier.notify(Notice::error(error.to_string()));
                Err(error)
            }
        }
    }

    /// Record per-exercise counts for one workout, marking it completed.
    /// Progress is always course-scoped: a call without a course id fails
    /// before any network traffic. Counts are clamped to each exercise's
    /// target when the workout is cached.
    pub async fn record_workout_progress(
        &self,
        course_id: Option<&CourseId>,
        workout_id: &WorkoutId,
        counts: &[u32],
    ) -> Result<(), MutationError> {
        let Some(course_id) = course_id else {
            tracing::error!(
                workout = %workout_id,
                "progress write attempted without a course scope"
            );
            return Err(MutationError::MissingCourseScope);
        };
        if !self.has_token() {
            return Err(MutationError::AuthRequired);
        }

        let details = requests::SaveWorkoutProgress {
            progress_data: self.clamped_counts(workout_id, counts),
        };
        match self
            .api
            .save_progress(course_id, workout_id, &details)
            .await
        {
            Ok(()) => {
                {
                    let mut state = self.state.borrow_mut();
                    // Completion stats and next-workout resolution both
                    // derive from these keys
                    state.invalidate(&ResourceKey::CourseProgress(
                        course_id.clone(),
                    ));
                    state.invalidate(&ResourceKey::WorkoutProgress(
                        course_id.clone(),
                        workout_id.clone(),
                    ));
                }
                tracing::info!(
                    course = %course_id,
                    workout = %workout_id,
                    "workout progress recorded"
                );
                self.notifier.notify(Notice::success("Workout completed!"));
                Ok(())
            }
            Err(e) => {
                let error = MutationError::from_client(e);
                self.notifier.notify(Notice::error(error.to_string()));
                Err(error)
            }
        }
    }

    /// Clamp counts into `0..=quantity` per exercise when the workout is
    /// cached; otherwise pass them through for the server to judge.
    fn clamped_counts(&self, workout_id: &WorkoutId, counts: &[u32]) -> Vec<u32> {
        let state = self.state.borrow();
        match state.get_workout(workout_id) {
            Some(workout) => counts
                .iter()
                .zip(&workout.exercises)
                .map(|(count, exercise)| (*count).min(exercise.quantity))
                .collect(),
            None => counts.to_vec(),
        }
    }
}

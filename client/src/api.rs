//! Seam between the sync layer and the HTTP client.

use payloads::{APIClient, ClientError, CourseId, WorkoutId, requests, responses};

/// The remote endpoints the sync layer consumes. [`APIClient`] is the
/// production implementation; tests substitute an in-memory one.
///
/// The core is single-threaded and generic over the implementation, so no
/// `Send` bound is wanted on the returned futures.
#[allow(async_fn_in_trait)]
pub trait CourseApi {
    async fn courses(&self) -> Result<Vec<responses::Course>, ClientError>;

    async fn course(
        &self,
        course_id: &CourseId,
    ) -> Result<responses::Course, ClientError>;

    async fn course_workouts(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<responses::Workout>, ClientError>;

    async fn workout(
        &self,
        workout_id: &WorkoutId,
    ) -> Result<responses::Workout, ClientError>;

    async fn current_user(
        &self,
    ) -> Result<responses::UserProfile, ClientError>;

    async fn course_progress(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<responses::CourseProgress>, ClientError>;

    async fn workout_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
    ) -> Result<Option<responses::WorkoutProgress>, ClientError>;

    async fn enroll(
        &self,
        details: &requests::EnrollCourse,
    ) -> Result<(), ClientError>;

    async fn unenroll(&self, course_id: &CourseId) -> Result<(), ClientError>;

    async fn save_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
        details: &requests::SaveWorkoutProgress,
    ) -> Result<(), ClientError>;
}

impl CourseApi for APIClient {
    async fn courses(&self) -> Result<Vec<responses::Course>, ClientError> {
        self.get_courses().await
    }

    async fn course(
        &self,
        course_id: &CourseId,
    ) -> Result<responses::Course, ClientError> {
        self.get_course(course_id).await
    }

    async fn course_workouts(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<responses::Workout>, ClientError> {
        self.get_course_workouts(course_id).await
    }

    async fn workout(
        &self,
        workout_id: &WorkoutId,
    ) -> Result<responses::Workout, ClientError> {
        self.get_workout(workout_id).await
    }

    async fn current_user(
        &self,
    ) -> Result<responses::UserProfile, ClientError> {
        self.user_profile().await
    }

    async fn course_progress(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<responses::CourseProgress>, ClientError> {
        self.get_course_progress(course_id).await
    }

    async fn workout_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
    ) -> Result<Option<responses::WorkoutProgress>, ClientError> {
        self.get_workout_progress(course_id, workout_id).await
    }

    async fn enroll(
        &self,
        details: &requests::EnrollCourse,
    ) -> Result<(), ClientError> {
        self.enroll_course(details).await
    }

    async fn unenroll(&self, course_id: &CourseId) -> Result<(), ClientError> {
        self.unenroll_course(course_id).await
    }

    async fn save_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
        details: &requests::SaveWorkoutProgress,
    ) -> Result<(), ClientError> {
        self.save_workout_progress(course_id, workout_id, details).await
    }
}

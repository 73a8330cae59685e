//! In-memory test double for the backend plus the wiring to drive a
//! [`SyncClient`] against it. The mock behaves like the real server:
//! enroll/unenroll edit the account's enrollment list, progress writes
//! upsert records, and every endpoint counts its calls so dedup behavior
//! is observable.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use client::{Notice, Notifier, SyncClient, TimeSource};
use jiff::Timestamp;
use payloads::responses::{
    Course, CourseProgress, Exercise, UserProfile, Workout, WorkoutProgress,
};
use payloads::{ClientError, CourseId, TokenStore, WorkoutId, requests};
use reqwest::StatusCode;

/// Externally-owned token store, as the core sees it.
#[derive(Default)]
pub struct StaticTokens {
    token: RefCell<Option<String>>,
}

impl StaticTokens {
    pub fn set(&self, token: &str) {
        *self.token.borrow_mut() = Some(token.to_string());
    }

    pub fn clear(&self) {
        *self.token.borrow_mut() = None;
    }
}

impl TokenStore for StaticTokens {
    fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }
}

/// Collects notices so tests can assert on mutation reporting.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: RefCell<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

struct MockInner {
    calls: RefCell<HashMap<&'static str, usize>>,
    fail_with: RefCell<HashMap<&'static str, StatusCode>>,
    courses: RefCell<Vec<Course>>,
    workouts_by_course: RefCell<HashMap<CourseId, Vec<Workout>>>,
    user: RefCell<UserProfile>,
    progress: RefCell<HashMap<CourseId, CourseProgress>>,
}

impl Default for MockInner {
    fn default() -> Self {
        Self {
            calls: RefCell::default(),
            fail_with: RefCell::default(),
            courses: RefCell::default(),
            workouts_by_course: RefCell::default(),
            user: RefCell::new(UserProfile {
                id: None,
                email: String::new(),
                selected_courses: vec![],
                created_at: None,
                updated_at: None,
            }),
            progress: RefCell::default(),
        }
    }
}

/// Cloneable handle to one shared in-memory backend.
#[derive(Clone, Default)]
pub struct MockApi {
    inner: Rc<MockInner>,
}

impl MockApi {
    pub fn call_count(&self, endpoint: &'static str) -> usize {
        self.inner
            .calls
            .borrow()
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    /// Make one endpoint fail with the given status until cleared.
    pub fn fail_endpoint(&self, endpoint: &'static str, status: StatusCode) {
        self.inner.fail_with.borrow_mut().insert(endpoint, status);
    }

    pub fn clear_failures(&self) {
        self.inner.fail_with.borrow_mut().clear();
    }

    fn record(&self, endpoint: &'static str) -> Result<(), ClientError> {
        *self.inner.calls.borrow_mut().entry(endpoint).or_insert(0) += 1;
        if let Some(status) = self.inner.fail_with.borrow().get(endpoint) {
            return Err(ClientError::APIError(
                *status,
                r#"{"message": "mock failure"}"#.to_string(),
            ));
        }
        Ok(())
    }
}

impl client::CourseApi for MockApi {
    async fn courses(&self) -> Result<Vec<Course>, ClientError> {
        self.record("courses")?;
        Ok(self.inner.courses.borrow().clone())
    }

    async fn course(&self, course_id: &CourseId) -> Result<Course, ClientError> {
        self.record("course")?;
        self.inner
            .courses
            .borrow()
            .iter()
            .find(|course| &course.id == course_id)
            .cloned()
            .ok_or_else(|| {
                ClientError::APIError(
                    StatusCode::NOT_FOUND,
                    r#"{"message": "Course not found"}"#.to_string(),
                )
            })
    }

    async fn course_workouts(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<Workout>, ClientError> {
        self.record("course_workouts")?;
        Ok(self
            .inner
            .workouts_by_course
            .borrow()
            .get(course_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn workout(
        &self,
        workout_id: &WorkoutId,
    ) -> Result<Workout, ClientError> {
        self.record("workout")?;
        self.inner
            .workouts_by_course
            .borrow()
            .values()
            .flatten()
            .find(|workout| &workout.id == workout_id)
            .cloned()
            .ok_or_else(|| {
                ClientError::APIError(
                    StatusCode::NOT_FOUND,
                    r#"{"message": "Workout not found"}"#.to_string(),
                )
            })
    }

    async fn current_user(&self) -> Result<UserProfile, ClientError> {
        self.record("current_user")?;
        Ok(self.inner.user.borrow().clone())
    }

    async fn course_progress(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<CourseProgress>, ClientError> {
        self.record("course_progress")?;
        Ok(self.inner.progress.borrow().get(course_id).cloned())
    }

    async fn workout_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
    ) -> Result<Option<WorkoutProgress>, ClientError> {
        self.record("workout_progress")?;
        Ok(self
            .inner
            .progress
            .borrow()
            .get(course_id)
            .and_then(|progress| progress.for_workout(workout_id).cloned()))
    }

    async fn enroll(
        &self,
        details: &requests::EnrollCourse,
    ) -> Result<(), ClientError> {
        self.record("enroll")?;
        let mut user = self.inner.user.borrow_mut();
        if !user.selected_courses.contains(&details.course_id) {
            user.selected_courses.push(details.course_id.clone());
        }
        Ok(())
    }

    async fn unenroll(&self, course_id: &CourseId) -> Result<(), ClientError> {
        self.record("unenroll")?;
        self.inner
            .user
            .borrow_mut()
            .selected_courses
            .retain(|id| id != course_id);
        self.inner.progress.borrow_mut().remove(course_id);
        Ok(())
    }

    async fn save_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
        details: &requests::SaveWorkoutProgress,
    ) -> Result<(), ClientError> {
        self.record("save_progress")?;
        let mut all_progress = self.inner.progress.borrow_mut();
        let course_progress = all_progress
            .entry(course_id.clone())
            .or_insert_with(|| CourseProgress {
                course_id: course_id.clone(),
                course_completed: false,
                workouts_progress: vec![],
            });
        let record = WorkoutProgress {
            workout_id: workout_id.clone(),
            workout_completed: true,
            progress_data: details.progress_data.clone(),
        };
        match course_progress
            .workouts_progress
            .iter_mut()
            .find(|wp| &wp.workout_id == workout_id)
        {
            Some(existing) => *existing = record,
            None => course_progress.workouts_progress.push(record),
        }
        Ok(())
    }
}

pub fn course(id: &str, name: &str, workout_ids: &[&str]) -> Course {
    Course {
        id: CourseId::from(id),
        name_ru: name.to_string(),
        name_en: name.to_string(),
        description: format!("{name} course"),
        directions: vec!["general".to_string()],
        fitting: vec!["everyone".to_string()],
        difficulty: Some("medium".to_string()),
        duration_in_days: Some(25),
        daily_duration_in_minutes: None,
        workouts: workout_ids.iter().map(|w| WorkoutId::from(*w)).collect(),
    }
}

pub fn workout(id: &str, name: &str, exercises: &[(&str, u32)]) -> Workout {
    Workout {
        id: WorkoutId::from(id),
        name: name.to_string(),
        video: format!("https://video.example/{id}"),
        exercises: exercises
            .iter()
            .map(|(name, quantity)| Exercise {
                name: name.to_string(),
                quantity: *quantity,
            })
            .collect(),
    }
}

pub struct TestApp {
    pub api: MockApi,
    pub client: SyncClient<MockApi>,
    pub tokens: Rc<StaticTokens>,
    pub notices: Rc<RecordingNotifier>,
    pub time: TimeSource,
}

impl TestApp {
    pub fn login(&self) {
        self.tokens.set("test-token");
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.notices.borrow().clone()
    }
}

/// Two courses: "c1" (workouts w1, w2; w1 already completed) and "c2"
/// (workout w3, untouched). The account starts enrolled in c1 only.
pub fn spawn_app() -> TestApp {
    client::logs::init_logging();

    let api = MockApi::default();
    *api.inner.courses.borrow_mut() = vec![
        course("c1", "Yoga", &["w1", "w2"]),
        course("c2", "Stretching", &["w3"]),
    ];
    api.inner.workouts_by_course.borrow_mut().insert(
        CourseId::from("c1"),
        vec![
            workout("w1", "Morning flow", &[("Sun salutation", 10)]),
            workout("w2", "Evening flow", &[("Forward fold", 5)]),
        ],
    );
    api.inner.workouts_by_course.borrow_mut().insert(
        CourseId::from("c2"),
        vec![workout("w3", "Full stretch", &[("Split", 3)])],
    );
    *api.inner.user.borrow_mut() = UserProfile {
        id: None,
        email: "user@example.com".to_string(),
        selected_courses: vec![CourseId::from("c1")],
        created_at: None,
        updated_at: None,
    };
    api.inner.progress.borrow_mut().insert(
        CourseId::from("c1"),
        CourseProgress {
            course_id: CourseId::from("c1"),
            course_completed: false,
            workouts_progress: vec![WorkoutProgress {
                workout_id: WorkoutId::from("w1"),
                workout_completed: true,
                progress_data: vec![10],
            }],
        },
    );

    let tokens = Rc::new(StaticTokens::default());
    let notices = Rc::new(RecordingNotifier::default());
    let time = TimeSource::new(Timestamp::UNIX_EPOCH);
    let client =
        SyncClient::new(api.clone(), tokens.clone(), time.clone())
            .with_notifier(notices.clone());

    TestApp {
        api,
        client,
        tokens,
        notices,
        time,
    }
}

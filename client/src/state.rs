use jiff::Timestamp;
use payloads::{CourseId, WorkoutId, responses};
use std::collections::HashMap;

/// Distinguishes "never fetched" from "fetched but empty".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    NotFetched,
    Fetched(T),
}

impl<T> FetchState<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Self::Fetched(value) => Some(value),
            Self::NotFetched => None,
        }
    }
}

/// Stable identity of one cacheable remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Catalog,
    CurrentUser,
    Course(CourseId),
    CourseWorkouts(CourseId),
    Workout(WorkoutId),
    CourseProgress(CourseId),
    WorkoutProgress(CourseId, WorkoutId),
}

impl ResourceKey {
    /// User-scoped keys are dropped wholesale on logout.
    fn is_user_scoped(&self) -> bool {
        matches!(
            self,
            Self::CurrentUser
                | Self::CourseProgress(_)
                | Self::WorkoutProgress(_, _)
        )
    }
}

/// Fetch bookkeeping for one resource key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyState {
    pub in_flight: bool,
    pub fetched_at: Option<Timestamp>,
    pub error: Option<String>,
}

/// Snapshot of one resource as exposed to the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub is_loading: bool,
}

impl<T> Resource<T> {
    /// The shape reported for a gated-off key: never loading, never in
    /// error, no data.
    pub fn inactive() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
        }
    }

    /// Returns true if this is the initial load (no data yet, currently
    /// loading, and no error).
    pub fn is_initial_loading(&self) -> bool {
        self.is_loading && self.data.is_none() && self.error.is_none()
    }
}

/// The cache store: last known value plus fetch bookkeeping per resource
/// key. Written only by fetch completion and explicit invalidation; read
/// by the derived-state combinators.
#[derive(Default, Clone, PartialEq)]
pub struct State {
    // === Current user (authoritative enrollment list) ===
    current_user: FetchState<responses::UserProfile>,

    // === Courses (canonical store + catalog index) ===
    individual_courses: HashMap<CourseId, responses::Course>,
    catalog_order: FetchState<Vec<CourseId>>,

    // === Workouts (canonical store + per-course index) ===
    individual_workouts: HashMap<WorkoutId, responses::Workout>,
    workouts_by_course: HashMap<CourseId, Vec<WorkoutId>>,

    // === Progress records; the stored `None` means "fetched, absent" ===
    course_progress: HashMap<CourseId, Option<responses::CourseProgress>>,
    workout_progress:
        HashMap<(CourseId, WorkoutId), Option<responses::WorkoutProgress>>,

    // === Per-key fetch bookkeeping ===
    keys: HashMap<ResourceKey, KeyState>,
}

impl State {
    pub fn has_user_loaded(&self) -> bool {
        self.current_user.is_fetched()
    }

    pub fn get_current_user(&self) -> Option<&responses::UserProfile> {
        self.current_user.as_ref()
    }

    pub fn set_current_user(&mut self, user: responses::UserProfile) {
        self.current_user = FetchState::Fetched(user);
    }

    pub fn has_catalog_loaded(&self) -> bool {
        self.catalog_order.is_fetched()
    }

    pub fn get_catalog(&self) -> Option<Vec<&responses::Course>> {
        self.catalog_order.as_ref().map(|course_ids| {
            course_ids
                .iter()
                .filter_map(|course_id| self.individual_courses.get(course_id))
                .collect()
        })
    }

    pub fn set_catalog(&mut self, courses: Vec<responses::Course>) {
        // Extract course IDs for the catalog index
        let course_ids: Vec<CourseId> =
            courses.iter().map(|course| course.id.clone()).collect();

        // Store individual courses in the canonical store
        for course in courses {
            self.individual_courses.insert(course.id.clone(), course);
        }

        // Update the catalog index
        self.catalog_order = FetchState::Fetched(course_ids);
    }

    pub fn has_course_loaded(&self, course_id: &CourseId) -> bool {
        self.individual_courses.contains_key(course_id)
    }

    pub fn get_course(&self, course_id: &CourseId) -> Option<&responses::Course> {
        self.individual_courses.get(course_id)
    }

    pub fn set_course(&mut self, course: responses::Course) {
        self.individual_courses.insert(course.id.clone(), course);
    }

    pub fn has_workouts_loaded_for_course(&self, course_id: &CourseId) -> bool {
        self.workouts_by_course.contains_key(course_id)
    }

    pub fn get_workouts_for_course(
        &self,
        course_id: &CourseId,
    ) -> Option<Vec<responses::Workout>> {
        self.workouts_by_course.get(course_id).map(|workout_ids| {
            workout_ids
                .iter()
                .filter_map(|workout_id| {
                    self.individual_workouts.get(workout_id).cloned()
                })
                .collect()
        })
    }

    pub fn set_workouts_for_course(
        &mut self,
        course_id: CourseId,
        workouts: Vec<responses::Workout>,
    ) {
        // Extract workout IDs for the course index
        let workout_ids: Vec<WorkoutId> =
            workouts.iter().map(|workout| workout.id.clone()).collect();

        // Store individual workouts in the canonical store
        for workout in workouts {
            self.individual_workouts.insert(workout.id.clone(), workout);
        }

        // Update the course index
        self.workouts_by_course.insert(course_id, workout_ids);
    }

    pub fn has_workout_loaded(&self, workout_id: &WorkoutId) -> bool {
        self.individual_workouts.contains_key(workout_id)
    }

    pub fn get_workout(
        &self,
        workout_id: &WorkoutId,
    ) -> Option<&responses::Workout> {
        self.individual_workouts.get(workout_id)
    }

    pub fn set_workout(&mut self, workout: responses::Workout) {
        self.individual_workouts.insert(workout.id.clone(), workout);
    }

    /// Whether progress for this course has been fetched, successfully or
    /// as "absent".
    pub fn course_progress_loaded(&self, course_id: &CourseId) -> bool {
        self.course_progress.contains_key(course_id)
    }

    pub fn get_course_progress(
        &self,
        course_id: &CourseId,
    ) -> Option<&responses::CourseProgress> {
        self.course_progress.get(course_id).and_then(Option::as_ref)
    }

    pub fn set_course_progress(
        &mut self,
        course_id: CourseId,
        progress: Option<responses::CourseProgress>,
    ) {
        self.course_progress.insert(course_id, progress);
    }

    pub fn workout_progress_loaded(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
    ) -> bool {
        self.workout_progress
            .contains_key(&(course_id.clone(), workout_id.clone()))
    }

    pub fn get_workout_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
    ) -> Option<&responses::WorkoutProgress> {
        self.workout_progress
            .get(&(course_id.clone(), workout_id.clone()))
            .and_then(Option::as_ref)
    }

    pub fn set_workout_progress(
        &mut self,
        course_id: CourseId,
        workout_id: WorkoutId,
        progress: Option<responses::WorkoutProgress>,
    ) {
        self.workout_progress
            .insert((course_id, workout_id), progress);
    }

    // === Fetch bookkeeping ===

    pub fn key_state(&self, key: &ResourceKey) -> Option<&KeyState> {
        self.keys.get(key)
    }

    pub fn is_in_flight(&self, key: &ResourceKey) -> bool {
        self.keys.get(key).is_some_and(|ks| ks.in_flight)
    }

    /// True while the last successful fetch is inside the dedup window.
    pub fn is_fresh(
        &self,
        key: &ResourceKey,
        now: Timestamp,
        window_secs: i64,
    ) -> bool {
        self.keys
            .get(key)
            .and_then(|ks| ks.fetched_at)
            .is_some_and(|at| now.as_second() - at.as_second() < window_secs)
    }

    pub fn begin_fetch(&mut self, key: &ResourceKey) {
        let ks = self.keys.entry(key.clone()).or_default();
        ks.in_flight = true;
        ks.error = None;
    }

    pub fn finish_fetch(&mut self, key: &ResourceKey, now: Timestamp) {
        let ks = self.keys.entry(key.clone()).or_default();
        ks.in_flight = false;
        ks.fetched_at = Some(now);
        ks.error = None;
    }

    pub fn fail_fetch(&mut self, key: &ResourceKey, error: String) {
        let ks = self.keys.entry(key.clone()).or_default();
        ks.in_flight = false;
        ks.error = Some(error);
    }

    // === Invalidation ===

    /// Drop the cached value and bookkeeping for a key so the next read
    /// triggers a re-fetch.
    pub fn invalidate(&mut self, key: &ResourceKey) {
        match key {
            ResourceKey::Catalog => {
                // Individual courses stay; they may back course detail reads
                self.catalog_order = FetchState::NotFetched;
            }
            ResourceKey::CurrentUser => {
                self.current_user = FetchState::NotFetched;
            }
            ResourceKey::Course(course_id) => {
                self.individual_courses.remove(course_id);
            }
            ResourceKey::CourseWorkouts(course_id) => {
                self.workouts_by_course.remove(course_id);
            }
            ResourceKey::Workout(workout_id) => {
                self.individual_workouts.remove(workout_id);
            }
            ResourceKey::CourseProgress(course_id) => {
                self.course_progress.remove(course_id);
            }
            ResourceKey::WorkoutProgress(course_id, workout_id) => {
                self.workout_progress
                    .remove(&(course_id.clone(), workout_id.clone()));
            }
        }
        self.keys.remove(key);
    }

    /// Drop every per-workout progress entry for one course.
    pub fn invalidate_workout_progress_for_course(
        &mut self,
        course_id: &CourseId,
    ) {
        self.workout_progress.retain(|(cid, _), _| cid != course_id);
        self.keys.retain(|key, _| {
            !matches!(key, ResourceKey::WorkoutProgress(cid, _) if cid == course_id)
        });
    }

    /// Drop all user-scoped state after the token is discarded. The
    /// catalog and workouts are public and survive.
    pub fn logout(&mut self) {
        self.current_user = FetchState::NotFetched;
        self.course_progress.clear();
        self.workout_progress.clear();
        self.keys.retain(|key, _| !key.is_user_scoped());
    }
}

//! Resource fetchers: one load operation per resource key, each of which
//! checks the gate, deduplicates against in-flight and recent fetches,
//! decodes through the typed client, and writes the store. Snapshot reads
//! never touch the network.

use payloads::{CourseId, WorkoutId, responses};

use crate::api::CourseApi;
use crate::gate;
use crate::state::{Resource, ResourceKey};
use crate::time::{CATALOG_DEDUP_WINDOW_SECS, DEFAULT_DEDUP_WINDOW_SECS};
use crate::{SyncClient, derived};

/// Everything the course page needs, combined from the course, its
/// workouts, and the gated progress record.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDetail {
    pub course: Resource<responses::Course>,
    /// Fetched workouts in the course's declared order.
    pub workouts: Vec<responses::Workout>,
    pub progress: Option<responses::CourseProgress>,
    pub stats: derived::CompletionStats,
    pub next_workout: Option<WorkoutId>,
    pub is_enrolled: bool,
}

/// Everything the workout page needs.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDetail {
    pub workout: Resource<responses::Workout>,
    pub progress: Option<responses::WorkoutProgress>,
    pub is_completed: bool,
}

impl<A: CourseApi> SyncClient<A> {
    fn is_active(&self, key: &ResourceKey) -> bool {
        let state = self.state.borrow();
        gate::activation(key, self.has_token(), &state).is_active()
    }

    /// A key fetches only when it is active, idle, and stale.
    fn should_fetch(&self, key: &ResourceKey, window_secs: i64) -> bool {
        let state = self.state.borrow();
        if !gate::activation(key, self.has_token(), &state).is_active() {
            return false;
        }
        !state.is_in_flight(key)
            && !state.is_fresh(key, self.time.now(), window_secs)
    }

    fn snapshot<T>(&self, key: &ResourceKey, data: Option<T>) -> Resource<T> {
        let state = self.state.borrow();
        match state.key_state(key) {
            Some(ks) => Resource {
                data,
                error: ks.error.clone(),
                is_loading: ks.in_flight,
            },
            None => Resource {
                data,
                error: None,
                is_loading: false,
            },
        }
    }

    // === Catalog ===

    /// Current catalog snapshot without fetching.
    pub fn catalog(&self) -> Resource<Vec<responses::Course>> {
        let data = self
            .state
            .borrow()
            .get_catalog()
            .map(|courses| courses.into_iter().cloned().collect());
        self.snapshot(&ResourceKey::Catalog, data)
    }

    /// Ensure the catalog is fresh and return it. Catalog failures are
    /// critical and surface on the resource.
    pub async fn load_catalog(&self) -> Resource<Vec<responses::Course>> {
        let key = ResourceKey::Catalog;
        if self.should_fetch(&key, CATALOG_DEDUP_WINDOW_SECS) {
            self.state.borrow_mut().begin_fetch(&key);
            match self.api.courses().await {
                Ok(courses) => {
                    let now = self.time.now();
                    let mut state = self.state.borrow_mut();
                    state.set_catalog(courses);
                    state.finish_fetch(&key, now);
                }
                Err(e) => {
                    self.state.borrow_mut().fail_fetch(&key, e.to_string());
                }
            }
        }
        self.catalog()
    }

    // === Current user ===

    pub fn current_user(&self) -> Resource<responses::UserProfile> {
        let key = ResourceKey::CurrentUser;
        if !self.is_active(&key) {
            return Resource::inactive();
        }
        let data = self.state.borrow().get_current_user().cloned();
        self.snapshot(&key, data)
    }

    /// Ensure the current user is fresh. Inactive for guests.
    pub async fn load_current_user(&self) -> Resource<responses::UserProfile> {
        let key = ResourceKey::CurrentUser;
        if self.should_fetch(&key, DEFAULT_DEDUP_WINDOW_SECS) {
            self.state.borrow_mut().begin_fetch(&key);
            match self.api.current_user().await {
                Ok(user) => {
                    let now = self.time.now();
                    let mut state = self.state.borrow_mut();
                    state.set_current_user(user);
                    state.finish_fetch(&key, now);
                }
                Err(e) => {
                    self.state.borrow_mut().fail_fetch(&key, e.to_string());
                }
            }
        }
        self.current_user()
    }

    // === Courses ===

    pub fn course(&self, course_id: &CourseId) -> Resource<responses::Course> {
        let data = self.state.borrow().get_course(course_id).cloned();
        self.snapshot(&ResourceKey::Course(course_id.clone()), data)
    }

    /// Ensure one course is fresh. The course is the page's critical
    /// resource, so failures surface on it.
    pub async fn load_course(
        &self,
        course_id: &CourseId,
    ) -> Resource<responses::Course> {
        let key = ResourceKey::Course(course_id.clone());
        if self.should_fetch(&key, DEFAULT_DEDUP_WINDOW_SECS) {
            self.state.borrow_mut().begin_fetch(&key);
            match self.api.course(course_id).await {
                Ok(course) => {
                    let now = self.time.now();
                    let mut state = self.state.borrow_mut();
                    state.set_course(course);
                    state.finish_fetch(&key, now);
                }
                Err(e) => {
                    self.state.borrow_mut().fail_fetch(&key, e.to_string());
                }
            }
        }
        self.course(course_id)
    }

    // === Workouts ===

    pub fn course_workouts(
        &self,
        course_id: &CourseId,
    ) -> Resource<Vec<responses::Workout>> {
        let key = ResourceKey::CourseWorkouts(course_id.clone());
        if !self.is_active(&key) {
            return Resource::inactive();
        }
        let data = self.state.borrow().get_workouts_for_course(course_id);
        self.snapshot(&key, data)
    }

    /// Ensure a course's workouts are fresh. Inactive until the course
    /// itself has resolved; failures degrade to an empty list so the rest
    /// of the page still renders.
    pub async fn load_course_workouts(
        &self,
        course_id: &CourseId,
    ) -> Resource<Vec<responses::Workout>> {
        let key = ResourceKey::CourseWorkouts(course_id.clone());
        if !self.is_active(&key) {
            return Resource::inactive();
        }
        if self.should_fetch(&key, DEFAULT_DEDUP_WINDOW_SECS) {
            self.state.borrow_mut().begin_fetch(&key);
            let workouts = match self.api.course_workouts(course_id).await {
                Ok(workouts) => workouts,
                Err(e) => {
                    tracing::warn!(
                        course = %course_id,
                        error = %e,
                        "workout list fetch degraded to empty"
                    );
                    Vec::new()
                }
            };
            let now = self.time.now();
            let mut state = self.state.borrow_mut();
            state.set_workouts_for_course(course_id.clone(), workouts);
            state.finish_fetch(&key, now);
        }
        self.course_workouts(course_id)
    }

    pub fn workout(&self, workout_id: &WorkoutId) -> Resource<responses::Workout> {
        let data = self.state.borrow().get_workout(workout_id).cloned();
        self.snapshot(&ResourceKey::Workout(workout_id.clone()), data)
    }

    /// Ensure one workout is fresh. Critical for the workout page.
    pub async fn load_workout(
        &self,
        workout_id: &WorkoutId,
    ) -> Resource<responses::Workout> {
        let key = ResourceKey::Workout(workout_id.clone());
        if self.should_fetch(&key, DEFAULT_DEDUP_WINDOW_SECS) {
            self.state.borrow_mut().begin_fetch(&key);
            match self.api.workout(workout_id).await {
                Ok(workout) => {
                    let now = self.time.now();
                    let mut state = self.state.borrow_mut();
                    state.set_workout(workout);
                    state.finish_fetch(&key, now);
                }
                Err(e) => {
                    self.state.borrow_mut().fail_fetch(&key, e.to_string());
                }
            }
        }
        self.workout(workout_id)
    }

    // === Progress ===

    pub fn course_progress(
        &self,
        course_id: &CourseId,
    ) -> Resource<responses::CourseProgress> {
        let key = ResourceKey::CourseProgress(course_id.clone());
        if !self.is_active(&key) {
            return Resource::inactive();
        }
        let data = self.state.borrow().get_course_progress(course_id).cloned();
        self.snapshot(&key, data)
    }

    /// Ensure one course's progress record is fresh. Inactive for guests;
    /// progress is a secondary resource, so failures degrade to "absent"
    /// instead of blocking the page.
    pub async fn load_course_progress(
        &self,
        course_id: &CourseId,
    ) -> Resource<responses::CourseProgress> {
        let key = ResourceKey::CourseProgress(course_id.clone());
        if !self.is_active(&key) {
            return Resource::inactive();
        }
        if self.should_fetch(&key, DEFAULT_DEDUP_WINDOW_SECS) {
            self.state.borrow_mut().begin_fetch(&key);
            let progress = match self.api.course_progress(course_id).await {
                Ok(progress) => progress,
                Err(e) => {
                    tracing::warn!(
                        course = %course_id,
                        error = %e,
                        "course progress fetch degraded to absent"
                    );
                    None
                }
            };
            let now = self.time.now();
            let mut state = self.state.borrow_mut();
            state.set_course_progress(course_id.clone(), progress);
            state.finish_fetch(&key, now);
        }
        self.course_progress(course_id)
    }

    pub fn workout_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
    ) -> Resource<responses::WorkoutProgress> {
        let key =
            ResourceKey::WorkoutProgress(course_id.clone(), workout_id.clone());
        if !self.is_active(&key) {
            return Resource::inactive();
        }
        let data = self
            .state
            .borrow()
            .get_workout_progress(course_id, workout_id)
            .cloned();
        self.snapshot(&key, data)
    }

    /// Ensure one workout's progress record is fresh. Same gating and
    /// degradation as course progress.
    pub async fn load_workout_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
    ) -> Resource<responses::WorkoutProgress> {
        let key =
            ResourceKey::WorkoutProgress(course_id.clone(), workout_id.clone());
        if !self.is_active(&key) {
            return Resource::inactive();
        }
        if self.should_fetch(&key, DEFAULT_DEDUP_WINDOW_SECS) {
            self.state.borrow_mut().begin_fetch(&key);
            let progress =
                match self.api.workout_progress(course_id, workout_id).await {
                    Ok(progress) => progress,
                    Err(e) => {
                        tracing::warn!(
                            course = %course_id,
                            workout = %workout_id,
                            error = %e,
                            "workout progress fetch degraded to absent"
                        );
                        None
                    }
                };
            let now = self.time.now();
            let mut state = self.state.borrow_mut();
            state.set_workout_progress(
                course_id.clone(),
                workout_id.clone(),
                progress,
            );
            state.finish_fetch(&key, now);
        }
        self.workout_progress(course_id, workout_id)
    }

    /// Fetch progress for every enrolled course concurrently. A failure
    /// for one course drops only that course; completion order does not
    /// matter since readers recompute from the store.
    pub async fn load_enrolled_progress(
        &self,
    ) -> Vec<responses::CourseProgress> {
        if !self.has_token() {
            return Vec::new();
        }
        let course_ids: Vec<CourseId> = self
            .state
            .borrow()
            .get_current_user()
            .map(|user| user.selected_courses.clone())
            .unwrap_or_default();

        futures::future::join_all(
            course_ids
                .iter()
                .map(|course_id| self.load_course_progress(course_id)),
        )
        .await;

        self.enrolled_progress()
    }

    // === Derived views (synchronous, recomputed from the store) ===

    /// The user's enrolled courses resolved against the catalog.
    /// Enrollment is authoritative; progress cache contents never add a
    /// course here.
    pub fn selected_courses(&self) -> Vec<responses::Course> {
        let state = self.state.borrow();
        let Some(user) = state.get_current_user() else {
            return Vec::new();
        };
        let Some(catalog) = state.get_catalog() else {
            return Vec::new();
        };
        let catalog: Vec<responses::Course> =
            catalog.into_iter().cloned().collect();
        derived::selected_courses(user, &catalog)
    }

    /// Progress records for enrolled courses, in enrollment order.
    pub fn enrolled_progress(&self) -> Vec<responses::CourseProgress> {
        let state = self.state.borrow();
        let Some(user) = state.get_current_user() else {
            return Vec::new();
        };
        user.selected_courses
            .iter()
            .filter_map(|course_id| state.get_course_progress(course_id))
            .cloned()
            .collect()
    }

    pub fn is_enrolled(&self, course_id: &CourseId) -> bool {
        let state = self.state.borrow();
        derived::is_enrolled(state.get_current_user(), course_id)
    }

    pub fn course_stats(
        &self,
        course_id: &CourseId,
    ) -> derived::CompletionStats {
        let state = self.state.borrow();
        let Some(course) = state.get_course(course_id) else {
            return derived::CompletionStats::default();
        };
        let workouts = state.get_workouts_for_course(course_id);
        derived::completion_stats(
            course,
            workouts.as_deref(),
            state.get_course_progress(course_id),
        )
    }

    pub fn ordered_workouts(
        &self,
        course_id: &CourseId,
    ) -> Vec<responses::Workout> {
        let state = self.state.borrow();
        let Some(course) = state.get_course(course_id) else {
            return Vec::new();
        };
        let workouts =
            state.get_workouts_for_course(course_id).unwrap_or_default();
        derived::order_workouts(course, &workouts)
    }

    pub fn next_workout(&self, course_id: &CourseId) -> Option<WorkoutId> {
        let ordered = self.ordered_workouts(course_id);
        let state = self.state.borrow();
        derived::next_workout(&ordered, state.get_course_progress(course_id))
    }

    pub fn progress_phase(
        &self,
        course_id: &CourseId,
    ) -> derived::ProgressPhase {
        derived::progress_phase(
            self.is_enrolled(course_id),
            self.course_stats(course_id),
        )
    }

    // === Composed page flows ===

    /// Load everything the course page needs: the course (critical), then
    /// its workouts and, for signed-in users, its progress record.
    pub async fn load_course_detail(
        &self,
        course_id: &CourseId,
    ) -> CourseDetail {
        let course = self.load_course(course_id).await;
        if course.data.is_some() {
            self.load_course_workouts(course_id).await;
            self.load_course_progress(course_id).await;
        }
        self.course_detail(course_id)
    }

    /// Course page snapshot from current cache contents.
    pub fn course_detail(&self, course_id: &CourseId) -> CourseDetail {
        CourseDetail {
            course: self.course(course_id),
            workouts: self.ordered_workouts(course_id),
            progress: self.course_progress(course_id).data,
            stats: self.course_stats(course_id),
            next_workout: self.next_workout(course_id),
            is_enrolled: self.is_enrolled(course_id),
        }
    }

    /// Load everything the workout page needs. The progress record is
    /// only reachable when the caller knows the course scope.
    pub async fn load_workout_detail(
        &self,
        course_id: Option<&CourseId>,
        workout_id: &WorkoutId,
    ) -> WorkoutDetail {
        let workout = self.load_workout(workout_id).await;
        if let Some(course_id) = course_id {
            self.load_workout_progress(course_id, workout_id).await;
        }
        let progress = course_id
            .and_then(|course_id| {
                self.workout_progress(course_id, workout_id).data
            });
        WorkoutDetail {
            is_completed: progress
                .as_ref()
                .is_some_and(|wp| wp.workout_completed),
            workout,
            progress,
        }
    }
}

//! Derived-state combinators: pure functions from cached resources to
//! view-ready values. No I/O, no cache writes; callers recompute these
//! whenever an input resource changes.

use payloads::{CourseId, WorkoutId, responses};

/// Completion counters for one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

/// Where a course sits in the enrollment/progress lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Not enrolled. Cached progress records do not change this.
    Unknown,
    NotStarted,
    InProgress,
    Completed,
}

/// The enrolled course ids resolved against the catalog. Ids with no
/// matching catalog entry are dropped, so the result never contains
/// holes.
pub fn selected_courses(
    user: &responses::UserProfile,
    catalog: &[responses::Course],
) -> Vec<responses::Course> {
    user.selected_courses
        .iter()
        .filter_map(|course_id| {
            catalog.iter().find(|course| &course.id == course_id)
        })
        .cloned()
        .collect()
}

/// Completion counters for a course.
///
/// `total` comes from the course's declared workout list, falling back to
/// the fetched workouts when the declaration is absent. `completed` counts
/// completed progress entries intersected with that same workout set, so
/// progress for workouts no longer in the course never inflates the
/// count. A zero total always yields zero percent.
pub fn completion_stats(
    course: &responses::Course,
    fetched_workouts: Option<&[responses::Workout]>,
    progress: Option<&responses::CourseProgress>,
) -> CompletionStats {
    let declared: Vec<WorkoutId> = if course.workouts.is_empty() {
        fetched_workouts
            .map(|workouts| workouts.iter().map(|w| w.id.clone()).collect())
            .unwrap_or_default()
    } else {
        course.workouts.clone()
    };

    let total = declared.len();
    let completed = progress.map_or(0, |p| {
        p.workouts_progress
            .iter()
            .filter(|wp| wp.workout_completed && declared.contains(&wp.workout_id))
            .count()
    });

    let percent = if total > 0 {
        (100.0 * completed as f64 / total as f64).round() as u8
    } else {
        0
    };

    CompletionStats {
        completed,
        total,
        percent,
    }
}

/// Fetched workouts sorted by their index in the course's declared order.
/// Workouts absent from that list sort last in fetch order; nothing is
/// dropped.
pub fn order_workouts(
    course: &responses::Course,
    workouts: &[responses::Workout],
) -> Vec<responses::Workout> {
    let mut ordered = workouts.to_vec();
    // Stable sort keeps fetch order for unlisted workouts
    ordered.sort_by_key(|workout| {
        course
            .workouts
            .iter()
            .position(|id| id == &workout.id)
            .unwrap_or(usize::MAX)
    });
    ordered
}

/// The first workout, in order, whose progress record is missing or not
/// completed. When every workout is completed, the first workout comes
/// back to support restart flows. `None` only with zero workouts.
pub fn next_workout(
    ordered_workouts: &[responses::Workout],
    progress: Option<&responses::CourseProgress>,
) -> Option<WorkoutId> {
    for workout in ordered_workouts {
        let completed = progress
            .and_then(|p| p.for_workout(&workout.id))
            .is_some_and(|wp| wp.workout_completed);
        if !completed {
            return Some(workout.id.clone());
        }
    }
    ordered_workouts.first().map(|workout| workout.id.clone())
}

/// Lifecycle phase for one course. Enrollment is authoritative: without
/// it the phase is `Unknown` no matter what progress is cached.
pub fn progress_phase(enrolled: bool, stats: CompletionStats) -> ProgressPhase {
    if !enrolled {
        return ProgressPhase::Unknown;
    }
    if stats.completed == 0 {
        ProgressPhase::NotStarted
    } else if stats.completed == stats.total {
        ProgressPhase::Completed
    } else {
        ProgressPhase::InProgress
    }
}

/// Whether an id is in the user's enrollment list.
pub fn is_enrolled(user: Option<&responses::UserProfile>, course_id: &CourseId) -> bool {
    user.is_some_and(|u| u.selected_courses.contains(course_id))
}

//! Central activation decisions for resource keys.
//!
//! Every "should this key fetch at all" rule lives here, instead of ad hoc
//! token checks at each call site. An inactive key never hits the network
//! and reads as [`Resource::inactive`](crate::Resource::inactive).

use crate::state::{ResourceKey, State};

/// Whether a resource key may currently fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Active,
    /// The key must not hit the network; readers see an inactive resource.
    Inactive,
}

impl Activation {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Activation predicate for a key, given token presence and the current
/// cache contents.
///
/// - The catalog and individual courses/workouts are public: always
///   active.
/// - Course workouts depend on the course having resolved first.
/// - The current user and all progress keys require a token; guests never
///   issue those requests.
pub fn activation(key: &ResourceKey, has_token: bool, state: &State) -> Activation {
    let active = match key {
        ResourceKey::Catalog
        | ResourceKey::Course(_)
        | ResourceKey::Workout(_) => true,
        ResourceKey::CourseWorkouts(course_id) => {
            state.has_course_loaded(course_id)
        }
        ResourceKey::CurrentUser
        | ResourceKey::CourseProgress(_)
        | ResourceKey::WorkoutProgress(_, _) => has_token,
    };
    if active { Activation::Active } else { Activation::Inactive }
}

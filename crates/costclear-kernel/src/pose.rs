//! Robot pose lookup.
//!
//! The clearing core never tracks the pose itself; it asks a [`PoseSource`]
//! at the start of every operation (and again per layer for except-region
//! clears). A lookup may fail, e.g. while localisation is lost.

use std::sync::{Mutex, PoisonError};

use costclear_types::Pose2;

pub trait PoseSource: Send + Sync {
    /// Current pose in the costmap's world frame, or `None` if unknown.
    fn robot_pose(&self) -> Option<Pose2>;
}

/// A pose that another component (a localiser, a simulator, a test) keeps
/// up to date.
#[derive(Debug, Default)]
pub struct SharedPose {
    pose: Mutex<Option<Pose2>>,
}

impl SharedPose {
    pub fn new(pose: Pose2) -> Self {
        Self {
            pose: Mutex::new(Some(pose)),
        }
    }

    pub fn set(&self, pose: Pose2) {
        *self.pose.lock().unwrap_or_else(PoisonError::into_inner) = Some(pose);
    }

    /// Make subsequent lookups fail until [`SharedPose::set`] is called again.
    pub fn invalidate(&self) {
        *self.pose.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl PoseSource for SharedPose {
    fn robot_pose(&self) -> Option<Pose2> {
        *self.pose.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Combination policies for aggregate sentries.

use crate::core::status::Status;

/// Folds child statuses into one aggregate status.
///
/// The iterator is lazy so policies can stop scanning as soon as the answer
/// is decided.
pub trait CombinePolicy: Send + Sync {
    /// Combine the statuses of the (non-absent) children.
    fn combine(&self, statuses: &mut dyn Iterator<Item = Status>) -> Status;
}

/// Pessimistic combination: one failing child marks the group unhealthy.
///
/// `Error` short-circuits; otherwise the highest severity seen wins; an
/// empty group is `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstOf;

impl CombinePolicy for WorstOf {
    fn combine(&self, statuses: &mut dyn Iterator<Item = Status>) -> Status {
        let mut worst = Status::None;
        for status in statuses {
            if status == Status::Error {
                return Status::Error;
            }
            worst = worst.max(status);
        }
        worst
    }
}

/// Optimistic combination for redundant/failover groups: one healthy child
/// marks the group healthy.
///
/// `Success` short-circuits. A `Warning` anywhere beats any number of
/// `Error`s regardless of scan order; `Error` only wins when no child got
/// further than failing; an empty group is `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestOf;

impl CombinePolicy for BestOf {
    fn combine(&self, statuses: &mut dyn Iterator<Item = Status>) -> Status {
        let mut saw_warning = false;
        let mut saw_error = false;
        for status in statuses {
            match status {
                Status::Success => return Status::Success,
                Status::Warning => saw_warning = true,
                Status::Error => saw_error = true,
                Status::None => {}
            }
        }
        if saw_warning {
            Status::Warning
        } else if saw_error {
            Status::Error
        } else {
            Status::None
        }
    }
}

//! Priority levels for scheduled work.

/// Priority level for a scheduling request
///
/// Higher value = higher priority (flushed first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    /// Deferred work, flushed by `flush_scheduled` or alongside the next sync flush
    #[default]
    Normal = 0,
    /// Synchronous work, flushed when the outermost batch ends
    Sync = 1,
}

/// A request handed to the work scheduler for one fiber.
///
/// `force` asks the reconciler to re-evaluate the fiber even when its props
/// and state would otherwise let it bail out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub priority: Priority,
    pub force: bool,
}

impl ScheduleRequest {
    /// Ordinary state update at the given priority.
    pub const fn update(priority: Priority) -> Self {
        Self {
            priority,
            force: false,
        }
    }

    /// Synchronous forced re-render used by refresh sessions.
    pub const fn refresh() -> Self {
        Self {
            priority: Priority::Sync,
            force: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Sync > Priority::Normal);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_refresh_request_is_forced_sync() {
        let request = ScheduleRequest::refresh();
        assert!(request.force);
        assert_eq!(request.priority, Priority::Sync);
        assert!(!ScheduleRequest::update(Priority::Sync).force);
    }
}

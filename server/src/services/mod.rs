pub mod attendance;
pub mod event;
pub mod group;

use uuid::Uuid;

pub use attendance::AttendanceService;
pub use event::EventService;
pub use group::GroupService;

/// The authenticated user a mutating call acts on behalf of. Always passed
/// explicitly; request bodies never supply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
}

impl Principal {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

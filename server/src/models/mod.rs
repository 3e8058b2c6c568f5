pub mod attendance;
pub mod event;
pub mod group;
pub mod membership;
pub mod timestamp;
pub mod user;

pub use attendance::{Attendance, CreateAttendanceRequest, UpdateAttendanceRequest};
pub use event::{
    CreateEventRequest, Event, EventAttributes, EventDetails, EventFilter, EventParams, NewEvent,
    UpdateEventRequest,
};
pub use group::{CreateGroupRequest, Group, GroupDetails, NewGroup};
pub use membership::{CreateMembershipRequest, UserGroup};
pub use user::{NewUser, User};

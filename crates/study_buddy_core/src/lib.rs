pub mod domain;
pub mod grouping;
pub mod matching;
pub mod ports;

pub use domain::{
    CalendarEvents, CalendarToken, ClassList, CreatedCalendarEvent, Group, GroupMember,
    NewCalendarEvent, Slot, SlotParseError, TimeWindow, User,
};
pub use grouping::group_by_class;
pub use matching::find_matches;
pub use ports::{CalendarService, CalendarSessionStore, PortError, PortResult, UserRepository};

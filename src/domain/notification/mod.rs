// ============================================================================
// Notification Domain
// ============================================================================
//
// - Value objects (Notification, NotificationType, ListOptions)
// - Rendering of complaint events into notification drafts
// - Dispatcher (best-effort persist + push)
// - Inbox (read-state queries scoped to the owning user)
//
// ============================================================================

pub mod value_objects;
pub mod render;
pub mod dispatcher;
pub mod inbox;

pub use value_objects::*;
pub use render::render;
pub use dispatcher::NotificationDispatcher;
pub use inbox::{NotificationInbox, NotificationPage};

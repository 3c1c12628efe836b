//! Live notifications for the source tree.
//!
//! Each directory is subscribed on its own (non-recursively), so coverage
//! grows one directory at a time as scans discover them or notifications
//! announce them. The [`WatchCoordinator`] owns the set of subscribed
//! directories; [`listen`] consumes the notifications and feeds them through
//! the same placement step a scan uses.

mod coordinator;
mod listen;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod subscriber;

pub use self::coordinator::WatchCoordinator;
pub use self::listen::listen;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockSubscriber;
pub use self::subscriber::{NotifySubscriber, Subscriber, WatchEvent};

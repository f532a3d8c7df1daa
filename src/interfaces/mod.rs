//! Functional interfaces owned by [`SteamSubsystem`](crate::SteamSubsystem)
//!
//! Each holds a shared handle to the SDK and lives on the game thread.

pub mod delegate;
pub mod external_ui;
pub mod presence;
pub mod stats;

pub use delegate::{Multicast, SubscriptionHandle};
pub use external_ui::ExternalUi;
pub use presence::{Presence, STATUS_KEY, STEAM_DISPLAY_KEY};
pub use stats::StatsAndAchievements;

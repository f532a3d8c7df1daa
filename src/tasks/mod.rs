//! Callback pipeline
//!
//! Raw SDK callbacks fire on the worker thread, are converted into
//! [`AsyncEvent`]s by the handlers in [`CallbackRegistry`], and travel through
//! the outbound queue to the game thread, where
//! [`AsyncTaskManager::game_tick`] hands them to an [`AsyncEventTarget`].

pub mod event;
pub mod handlers;
pub mod manager;

pub use event::{AsyncEvent, AsyncEventTarget};
pub use handlers::{CallbackHandler, CallbackRegistry};
pub use manager::{AsyncTaskManager, CallbackPump, WORKER_THREAD_NAME};

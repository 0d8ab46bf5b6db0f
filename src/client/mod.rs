//! Client-side state for the task dashboard: the HTTP client, the cached
//! task list with optimistic mutations, the pure filter pipeline, the kanban
//! grouping rules, and the chat sideband.

pub mod api;
pub mod cache;
pub mod chat;
pub mod dashboard;
pub mod filter;
pub mod kanban;
pub mod session;

pub mod assistant;
pub mod auth_service;
pub mod chat_service;
pub mod task_service;

pub mod chat_repo;
pub mod entities;
pub mod session_repo;
pub mod task_repo;
pub mod user_repo;

pub mod contact_ops;
pub mod drag;
pub mod summary;
pub mod task_ops;
pub mod user_ops;
pub mod validate;

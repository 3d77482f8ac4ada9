pub mod chapter;
pub mod encounter;
pub mod status;
pub mod story;

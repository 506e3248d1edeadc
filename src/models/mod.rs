pub mod analytics;
pub mod event;
pub mod student;

pub use analytics::*;
pub use event::*;
pub use student::*;

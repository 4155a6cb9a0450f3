pub mod resume;

pub use resume::{Education, Experience, Preferences, Resume, Website};

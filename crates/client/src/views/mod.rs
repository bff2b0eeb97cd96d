//! Pages of the site and the layout around them.

pub mod alumni;
pub mod contact;
pub mod courses;
pub mod home;
pub mod layout;
pub mod library;
pub mod school;
pub mod students;

pub use alumni::Alumni;
pub use contact::Contact;
pub use courses::Courses;
pub use home::Home;
pub use layout::{NotFound, SiteLayout};
pub use library::Library;
pub use school::School;
pub use students::Students;

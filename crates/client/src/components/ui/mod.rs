//! UI primitives (Button, Card, form fields, etc.)

pub mod button;
pub mod card;
pub mod field;
pub mod spinner;

pub use button::*;
pub use card::*;
pub use field::*;
pub use spinner::*;

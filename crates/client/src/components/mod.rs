//! Reusable components shared by the views.

pub mod forms;
pub mod post_card;
pub mod ui;

pub use post_card::PostCard;

pub mod balloon;
pub mod error;
pub mod health;
pub mod history;
pub mod weather;

// src/types/mod.rs
//! Wire types shared by the backend, the API client and the view models

pub mod api;
pub mod jobs;
pub mod profile;

pub use api::*;
pub use jobs::{JobCard, SavedJob};
pub use profile::{ProfileUpdate, UserProfile};

//! Directory entities and the read and write paths over them.

mod category;
mod client;
#[cfg(test)]
pub(crate) mod fixtures;
mod keys;
mod mutation;
mod registration;
mod types;

pub use category::{BusinessCategory, Gender, ParseEnumError, ResourceCategory, ResourceType};
pub use client::DirectoryClient;
pub use keys::DirectoryKey;
pub use mutation::{Mutation, MutationCoordinator, MutationKind};
pub use registration::{Registration, RegistrationError, AGE_RANGE};
pub use types::{CommunityPost, Entrepreneur, Principal, SuccessStory, Time, TrainingResource};

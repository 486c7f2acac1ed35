//! SeaORM entities for the data-store tier.

pub mod contact;
pub mod post;
pub mod subscriber;

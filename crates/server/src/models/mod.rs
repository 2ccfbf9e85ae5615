//! Domain types.
//!
//! These types represent validated domain objects separate from database row
//! types; everything the API serializes lives here.

pub mod shelter;
pub mod user;

pub use shelter::{ContactInfo, NewShelter, Shelter, ShelterLocation};
pub use user::{PublicUser, User};

//! Service layer for the creation staging store.
//! - `creations` holds the staged store and its repository seam.
//! - Backing-store specifics stay behind `CreationRepository`.

pub mod creations;
pub mod runtime;
#[cfg(test)]
pub mod test_support;

//! Domain logic - pure business rules independent of git operations

pub mod branch;
pub mod decision;
pub mod prerelease;
pub mod version;

pub use branch::{resolve_branch, Branch};
pub use decision::Decision;
pub use prerelease::Prerelease;
pub use version::{ReleaseType, Version};

//! Zero-sized repository structs, one per table.

pub mod project_repo;
pub mod published_site_repo;

pub use project_repo::ProjectRepo;
pub use published_site_repo::PublishedSiteRepo;

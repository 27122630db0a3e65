pub mod project;
pub mod published_site;

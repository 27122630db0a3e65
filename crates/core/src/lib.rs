//! Domain core for the AI site builder.
//!
//! Holds the project lifecycle state machine, usage guards, output
//! validators, the generation gateway, and the publish pipeline. Every
//! external concern (LLM calls, template rendering, object storage,
//! persistence) is consumed through a trait so this crate stays free of
//! network and database dependencies.

pub mod brand_memory;
pub mod clock;
pub mod error;
pub mod generation;
pub mod images;
pub mod lifecycle;
pub mod limits;
pub mod plans;
pub mod project;
pub mod publishing;
pub mod site_plan;
pub mod store;
pub mod types;
pub mod validation;

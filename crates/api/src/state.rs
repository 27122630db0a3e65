use std::sync::Arc;

use sitegen_core::clock::Clock;
use sitegen_core::generation::{Collaborators, GenerationGateway};
use sitegen_core::limits::{Cooldown, SlidingWindowCounter, UsageGuards};
use sitegen_core::publishing::{PublishPipeline, SiteStorage};
use sitegen_core::store::ProjectStore;
use sitegen_db::DbPool;

use crate::config::{GenerationSettings, ServerConfig};
use crate::locks::IdLocks;

/// The pluggable parts of the application, chosen at startup.
pub struct Components {
    pub store: Arc<dyn ProjectStore>,
    pub storage: Arc<dyn SiteStorage>,
    pub collaborators: Collaborators,
    pub clock: Arc<dyn Clock>,
    /// Present when projects live in PostgreSQL.
    pub pool: Option<DbPool>,
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    pub settings: Arc<GenerationSettings>,
    pub store: Arc<dyn ProjectStore>,
    pub gateway: Arc<GenerationGateway>,
    pub pipeline: Arc<PublishPipeline>,
    /// Serializes mutations of one project.
    pub locks: Arc<IdLocks>,
    /// Serializes project creation per user.
    pub user_locks: Arc<IdLocks>,
    pub clock: Arc<dyn Clock>,
    pub pool: Option<DbPool>,
}

impl AppState {
    /// Wire the usage guards, the generation gateway, and the publish
    /// pipeline from `settings` and `components`.
    pub fn new(config: ServerConfig, settings: GenerationSettings, components: Components) -> Self {
        let Components {
            store,
            storage,
            collaborators,
            clock,
            pool,
        } = components;

        let css_policy = settings.css_policy();
        let rate_limiter = Arc::new(SlidingWindowCounter::new(
            settings.rate_limit_max_calls,
            settings.rate_limit_window(),
            Arc::clone(&clock),
        ));
        let guards = UsageGuards::new(
            settings.plans,
            Cooldown::from_secs(settings.cooldown_secs),
            rate_limiter,
        );

        let gateway = GenerationGateway::new(
            collaborators,
            guards,
            css_policy.clone(),
            Arc::clone(&clock),
        );
        let pipeline = PublishPipeline::new(
            storage,
            Arc::clone(&store),
            css_policy,
            settings.trial_duration(),
            Arc::clone(&clock),
        );

        Self {
            config: Arc::new(config),
            settings: Arc::new(settings),
            store,
            gateway: Arc::new(gateway),
            pipeline: Arc::new(pipeline),
            locks: Arc::new(IdLocks::new()),
            user_locks: Arc::new(IdLocks::new()),
            clock,
            pool,
        }
    }
}

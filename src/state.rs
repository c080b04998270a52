//! Application state: catalog + generator, the path store, prompts and the optional coach.
//!
//! Built once at startup from env/TOML and shared behind an `Arc` by HTTP and WS handlers.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, instrument};

use crate::catalog::{CatalogReader, InMemoryCatalog};
use crate::coach::Coach;
use crate::config::{load_app_config_from_env, AppConfig, Prompts};
use crate::generator::PathGenerator;
use crate::seeds::seed_problems;
use crate::store::PathStore;

pub struct AppState {
    pub generator: PathGenerator,
    pub store: PathStore,
    pub coach: Option<Coach>,
    pub prompts: Prompts,
    seed: Option<u64>,
}

impl AppState {
    /// Build state from env: load config, assemble the catalog, init the coach.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();
        let catalog = InMemoryCatalog::from_sources(&cfg.problems, seed_problems());

        let coach = Coach::from_env();
        if let Some(c) = &coach {
            info!(target: "cpath_backend", base_url = %c.base_url, model = %c.model, "Coach enabled.");
        } else {
            info!(target: "cpath_backend", "Coach disabled (no OPENAI_API_KEY). Using local hints.");
        }

        Self::with_parts(Arc::new(catalog), cfg, coach)
    }

    pub fn with_parts(catalog: Arc<dyn CatalogReader>, cfg: AppConfig, coach: Option<Coach>) -> Self {
        let g = &cfg.generation;
        info!(
            target: "cpath_backend",
            band_width = g.band_width,
            oversample = g.oversample_factor,
            jitter_window = g.jitter_window,
            shortfall = ?g.shortfall,
            fixed_seed = g.seed.is_some(),
            "Generation settings"
        );
        Self {
            store: PathStore::new(g.max_commit_retries),
            seed: g.seed,
            generator: PathGenerator::new(catalog, cfg.generation),
            coach,
            prompts: cfg.prompts,
        }
    }

    /// Fresh RNG for one generation: fixed seed when configured, entropy otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

use anyhow::{anyhow, Result};
use image::RgbImage;
use lol_advisor::{BuildEngine, BuildRecommendation, EnemySummary, SwapRecommendation};
use lol_capture::Calibration;
use lol_data::{AliasTable, CcWeights, ConfigError, RuneRoles};
use lol_model::{ModelBundle, WinBreakdown};
use lol_state::{DraftState, MatchContext, PickTriple, Roster};
use lol_vision::{
    recognize_loading_screen, recognize_pick_screen, split_teams, EndpointCache, EntityResolver,
    RetryPolicy, VertexEndpoint, VisionOcrClient,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{AppConfig, EndpointConfig};

/// Remote services that could be reached with the configured credentials
#[derive(Default)]
pub struct VisionServices {
    pub champion: Option<Arc<VertexEndpoint>>,
    pub rune: Option<Arc<VertexEndpoint>>,
    pub ocr: Option<VisionOcrClient>,
}

/// Everything one session needs, loaded once and then only read.
///
/// A missing artifact disables the features that depend on it; the error is
/// kept and reported when such a feature is requested.
pub struct AppContext {
    pub config: AppConfig,
    bundle: Result<ModelBundle>,
    builds: Result<BuildEngine>,
    rune_roles: Result<RuneRoles>,
    aliases: AliasTable,
    resolver: EntityResolver,
    services: VisionServices,
    policy: RetryPolicy,
}

impl AppContext {
    pub fn load(config: AppConfig) -> Self {
        let bundle = ModelBundle::load_or_train(&config.model_paths, &config.dataset_path);
        if let Err(e) = &bundle {
            warn!("Win-rate model unavailable: {:#}", e);
        }
        let builds = BuildEngine::load(&config.data);
        if let Err(e) = &builds {
            warn!("Build recommendations unavailable: {:#}", e);
        }
        let rune_roles = RuneRoles::load(&config.data.rune_roles());
        let aliases = AliasTable::load(&config.data.aliases()).unwrap_or_else(|e| {
            warn!("Ignoring unreadable alias table: {:#}", e);
            AliasTable::default()
        });

        let cache = EndpointCache::new();
        let services = VisionServices {
            champion: connect(&cache, config.champion_endpoint.as_ref(), "champion classifier"),
            rune: connect(&cache, config.rune_endpoint.as_ref(), "rune classifier"),
            ocr: config.ocr_credential.as_ref().and_then(|cred| {
                VisionOcrClient::connect(cred)
                    .map_err(|e| warn!("Text detection unavailable: {:#}", e))
                    .ok()
            }),
        };

        Self::from_parts(config, bundle, builds, rune_roles, aliases, services)
    }

    pub fn from_parts(
        config: AppConfig,
        bundle: Result<ModelBundle>,
        builds: Result<BuildEngine>,
        rune_roles: Result<RuneRoles>,
        aliases: AliasTable,
        services: VisionServices,
    ) -> Self {
        let vocabulary = bundle
            .as_ref()
            .map(|b| b.vocabulary.clone())
            .unwrap_or_default();
        let resolver = EntityResolver::new(vocabulary, aliases.clone());
        info!(
            "Session ready: model {}, builds {}, detection {}",
            status(bundle.is_ok()),
            status(builds.is_ok()),
            status(services.champion.is_some())
        );
        Self {
            config,
            bundle,
            builds,
            rune_roles,
            aliases,
            resolver,
            services,
            policy: RetryPolicy::default(),
        }
    }

    pub fn bundle(&self) -> Result<&ModelBundle> {
        self.bundle
            .as_ref()
            .map_err(|e| anyhow!("win-rate model unavailable: {:#}", e))
    }

    pub fn build_engine(&self) -> Result<&BuildEngine> {
        self.builds
            .as_ref()
            .map_err(|e| anyhow!("build recommendations unavailable: {:#}", e))
    }

    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    pub fn detection_available(&self) -> bool {
        self.services.champion.is_some()
    }

    /// Current picks and bench from a pick-screen capture. Without a
    /// classifier the draft comes back empty with detection marked off.
    pub fn detect_draft(&self, frame: &RgbImage, calibration: &Calibration) -> Result<DraftState> {
        let Some(classifier) = &self.services.champion else {
            info!("Detection unavailable, manual champion selection required");
            return Ok(DraftState::new());
        };
        let screen = recognize_pick_screen(
            frame,
            classifier.as_ref(),
            self.config.confidence_threshold,
            calibration,
            &self.policy,
        )?;
        Ok(screen.to_draft(&self.resolver))
    }

    /// Own and opposing (champion, rune, role) triples from a loading screen
    pub fn read_loading_screen(
        &self,
        frame: &RgbImage,
        my_champion: &str,
    ) -> Result<(Vec<PickTriple>, Vec<PickTriple>)> {
        let ocr = self
            .services
            .ocr
            .as_ref()
            .ok_or(ConfigError::MissingCredential {
                service: "text detection",
            })?;
        let runes = self
            .services
            .rune
            .as_ref()
            .ok_or(ConfigError::MissingCredential {
                service: "rune classifier",
            })?;
        let rune_roles = self
            .rune_roles
            .as_ref()
            .map_err(|e| anyhow!("rune roles unavailable: {:#}", e))?;

        let cards = recognize_loading_screen(
            frame,
            ocr,
            runes.as_ref(),
            &self.resolver,
            &self.aliases,
            &self.policy,
        )?;
        let (own, opposing) = split_teams(&cards, my_champion, rune_roles)?;
        if let (Ok(a), Ok(b)) = (roster_of(&own), roster_of(&opposing)) {
            if let Err(e) = MatchContext::new(a, b) {
                warn!("Loading screen read looks inconsistent: {:#}", e);
            }
        }
        Ok((own, opposing))
    }

    pub fn evaluate(&self, roster: &Roster) -> Result<WinBreakdown> {
        Ok(lol_model::evaluate_breakdown(roster, self.bundle()?))
    }

    pub fn recommend_swap(
        &self,
        roster: &Roster,
        slot: usize,
        candidates: &[String],
    ) -> Result<Option<SwapRecommendation>> {
        lol_advisor::recommend_swap(self.bundle()?, roster, slot, candidates)
    }

    pub fn recommend_builds(
        &self,
        champion: &str,
        enemies: &[PickTriple],
    ) -> Result<Vec<BuildRecommendation>> {
        Ok(self.build_engine()?.recommend(champion, enemies))
    }

    pub fn summarize_enemies(&self, enemies: &[PickTriple]) -> EnemySummary {
        let empty = CcWeights::default();
        let cc = self
            .builds
            .as_ref()
            .map(|b| b.cc_weights())
            .unwrap_or(&empty);
        EnemySummary::from_triples(enemies, cc)
    }
}

fn connect(
    cache: &EndpointCache,
    endpoint: Option<&EndpointConfig>,
    service: &'static str,
) -> Option<Arc<VertexEndpoint>> {
    let ep = endpoint?;
    cache
        .get_or_connect(ep.key(), &ep.credential, service)
        .map_err(|e| warn!("{} unavailable: {:#}", service, e))
        .ok()
}

fn roster_of(picks: &[PickTriple]) -> Result<Roster> {
    Roster::new(picks.iter().map(|p| p.champion.clone()).collect())
}

fn status(ok: bool) -> &'static str {
    if ok {
        "ready"
    } else {
        "unavailable"
    }
}

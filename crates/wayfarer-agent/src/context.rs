//! Application context: builds every agent, the agent registry and the
//! planning flow from one [`Config`] and one provider.
//!
//! Nothing here is global: the CLI (or a test) owns the `AppContext` and
//! everything it hands out is reference-counted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use wayfarer_core::config::Config;
use wayfarer_providers::LlmProvider;

use crate::agent_loop::{AgentLoop, AgentSettings};
use crate::flow::{AgentRegistry, PlanningFlow};
use crate::profiles::{AgentProfile, ToolKit};
use crate::tools::filesystem::Workspace;
use crate::tools::planning::{PlanStore, PlanningTool};
use crate::tools::travel::{Catalog, FlightSource, HotelSource};

pub struct AppContext {
    config: Config,
    agents: HashMap<AgentProfile, Arc<AgentLoop>>,
    flow: Arc<PlanningFlow>,
    catalog: Option<Arc<Catalog>>,
    workspace: PathBuf,
}

impl AppContext {
    /// Build the context, loading the travel catalog from
    /// `tools.catalogPath` when one is configured.
    ///
    /// `workspace` is the already-resolved file tool root.
    pub fn new(config: Config, provider: Arc<dyn LlmProvider>, workspace: PathBuf) -> Result<Self> {
        let catalog = match config.tools.catalog_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(Arc::new(
                Catalog::load(Path::new(path)).context("travel tools are unavailable")?,
            )),
            _ => {
                warn!("no travel catalog configured; flight and hotel search will report it");
                None
            }
        };
        Ok(Self::with_catalog(config, provider, workspace, catalog))
    }

    /// Build the context around an already-loaded catalog.
    pub fn with_catalog(
        config: Config,
        provider: Arc<dyn LlmProvider>,
        workspace: PathBuf,
        catalog: Option<Arc<Catalog>>,
    ) -> Self {
        let planning = Arc::new(PlanningTool::new(Arc::new(PlanStore::new())));
        let kit = ToolKit {
            terminate_tool: config.agent.terminate_tool.clone(),
            planning: planning.clone(),
            workspace: Arc::new(Workspace::new(
                workspace.clone(),
                config.tools.restrict_to_workspace,
            )),
            flights: catalog.clone().map(|c| c as Arc<dyn FlightSource>),
            hotels: catalog.clone().map(|c| c as Arc<dyn HotelSource>),
        };

        let settings = AgentSettings::from(&config.agent);
        let agents: HashMap<AgentProfile, Arc<AgentLoop>> = AgentProfile::ALL
            .into_iter()
            .map(|profile| {
                let agent = AgentLoop::new(
                    profile.key(),
                    profile.system_prompt(),
                    provider.clone(),
                    kit.registry_for(profile),
                    settings.clone(),
                )
                .with_capabilities(profile.capabilities());
                (profile, Arc::new(agent))
            })
            .collect();

        let mut registry = AgentRegistry::new(agents[&AgentProfile::General].clone());
        for profile in AgentProfile::ALL {
            if profile != AgentProfile::General {
                registry.register(profile.key(), agents[&profile].clone());
            }
        }
        let flow = Arc::new(PlanningFlow::new(registry, planning));

        info!(
            model = provider.default_model(),
            agents = agents.len(),
            catalog = catalog.is_some(),
            workspace = %workspace.display(),
            "app context ready"
        );

        Self {
            config,
            agents,
            flow,
            catalog,
            workspace,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// The agent built for `profile`.
    pub fn agent(&self, profile: AgentProfile) -> Arc<AgentLoop> {
        self.agents[&profile].clone()
    }

    pub fn flow(&self) -> &Arc<PlanningFlow> {
        &self.flow
    }

    pub fn plans(&self) -> &Arc<PlanStore> {
        self.flow.plans()
    }

    pub fn catalog(&self) -> Option<&Arc<Catalog>> {
        self.catalog.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_loop::Agent;
    use crate::test_support::{call, MockProvider};
    use crate::tools::travel::catalog::tests::SAMPLE;
    use std::io::Write;
    use wayfarer_core::types::LlmResponse;
    use wayfarer_core::value::Arguments;

    fn config() -> Config {
        let mut config = Config::default();
        config.agent.max_steps = 4;
        config
    }

    #[test]
    fn test_builds_every_profile() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::with_catalog(
            config(),
            Arc::new(MockProvider::new(vec![])),
            dir.path().to_path_buf(),
            None,
        );

        for profile in AgentProfile::ALL {
            let agent = ctx.agent(profile);
            assert_eq!(agent.name(), profile.key());
            assert_eq!(agent.system_prompt(), profile.system_prompt());
            assert_eq!(agent.capabilities(), profile.capabilities().as_slice());
        }
        assert_eq!(ctx.flow().agents().primary().name(), "general");
        assert_eq!(ctx.flow().agents().types(), vec!["budget", "flight", "hotel", "route"]);
        assert_eq!(ctx.flow().agents().resolve("HOTEL").name(), "hotel");
        assert!(ctx.catalog().is_none());
    }

    #[test]
    fn test_loads_catalog_from_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let mut config = config();
        config.tools.catalog_path = Some(file.path().display().to_string());
        let ctx = AppContext::new(config, Arc::new(MockProvider::new(vec![])), dir.path().to_path_buf())
            .unwrap();

        let catalog = ctx.catalog().unwrap();
        assert_eq!(catalog.flights.len(), 4);
        assert_eq!(catalog.hotels.len(), 4);
    }

    #[test]
    fn test_bad_catalog_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.tools.catalog_path = Some(dir.path().join("missing.json").display().to_string());
        let err = AppContext::new(config, Arc::new(MockProvider::new(vec![])), dir.path().to_path_buf())
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("failed to read travel catalog"));
    }

    #[tokio::test]
    async fn test_general_agent_shares_plans_with_flow() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::new(vec![
            LlmResponse::tools(vec![call(
                "c1",
                "planning",
                Arguments::new()
                    .with("command", "create")
                    .with("plan_id", "weekend")
                    .with("title", "Weekend in Hangzhou")
                    .with("steps", vec!["[ROUTE] walk the lake"]),
            )]),
            LlmResponse::text("Plan saved."),
        ]));
        let ctx = AppContext::with_catalog(config(), provider.clone(), dir.path().to_path_buf(), None);

        let reply = ctx.agent(AgentProfile::General).run("make a plan").await.unwrap();
        assert_eq!(reply, "Plan saved.");
        assert_eq!(ctx.plans().get("weekend").unwrap().steps[0].step_type, "ROUTE");

        let offered = &provider.requests.lock().unwrap()[0].1;
        assert!(offered.contains(&"planning".to_string()));
        assert!(offered.contains(&"terminate".to_string()));
    }
}

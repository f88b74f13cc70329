//! Agent profiles: the five specialised agents the runtime builds, each a
//! system prompt, a set of capability tags and a tool set over the same
//! [`AgentLoop`](crate::agent_loop::AgentLoop).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::agent_loop::AgentCapability;
use crate::tools::calculator::CalculatorTool;
use crate::tools::filesystem::{ListDirTool, ReadFileTool, WriteFileTool, Workspace};
use crate::tools::planning::PlanningTool;
use crate::tools::terminate::TerminateTool;
use crate::tools::travel::{FlightSearchTool, FlightSource, HotelSearchTool, HotelSource};
use crate::tools::ToolRegistry;

const GENERAL_PROMPT: &str = "\
You are Wayfarer, a travel planning assistant.

Responsibilities:
- Give personalised travel advice and plans
- Help the traveller build a detailed itinerary
- Recommend transport, lodging and sights that fit their needs
- Keep the trip within budget

Principles:
- Stay focused on what the traveller asked for
- Give accurate, practical information
- Respect budget limits and stated preferences
- Be friendly and professional

Use the available tools when they help: `planning` to track multi-step work, \
`calculator` for arithmetic and the file tools to read or save notes. \
Call `terminate` once the request is fully handled.";

const FLIGHT_PROMPT: &str = "\
You are a flight booking specialist who finds the best flight options.

Workflow:
1. Understand the trip: dates, origin, destination and preferences
2. Search with the `flight_search` tool
3. Weigh price, timing and convenience
4. Recommend the best 3 to 5 options
5. Explain the trade-offs of each

Balance price against convenience, prefer reliable airlines and point out \
anything the traveller must watch for, such as baggage limits or tight \
connections. Call `terminate` when you are done.";

const HOTEL_PROMPT: &str = "\
You are a lodging specialist who finds the accommodation that fits best.

Compare hotels, guesthouses and hostels on location, facilities, reviews and \
value. Match the recommendation to the traveller's budget level.

Location priorities:
1. Transport access (metro, airport)
2. Distance to the main sights
3. Food and shopping nearby
4. Safety and surroundings

Search with the `hotel_search` tool and call `terminate` when you are done.";

const ROUTE_PROMPT: &str = "\
You are an itinerary specialist who designs efficient, enjoyable routes.

- Chain sights together and schedule the day
- Choose sensible transport between stops
- Plan meals and rest breaks
- Account for season, weather and opening hours

Give each sight a realistic amount of time, leave room for travel and rest, \
avoid overpacked days and mix popular sights with quieter experiences. \
Call `terminate` when the route is complete.";

const BUDGET_PROMPT: &str = "\
You are a travel budget advisor who helps plan and control trip spending.

Break costs down into transport, lodging, food, tickets and activities, and \
shopping. Point out where money can be saved, suggest good-value options, \
offer plans at more than one budget level and warn about overspending. \
Always leave an emergency reserve.

Use the `calculator` tool for every sum and call `terminate` when the \
breakdown is complete.";

// ─────────────────────────────────────────────
// AgentProfile
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentProfile {
    General,
    Flight,
    Hotel,
    Route,
    Budget,
}

impl AgentProfile {
    pub const ALL: [AgentProfile; 5] = [
        AgentProfile::General,
        AgentProfile::Flight,
        AgentProfile::Hotel,
        AgentProfile::Route,
        AgentProfile::Budget,
    ];

    /// Lowercase key, also used as the plan step type this profile executes.
    pub fn key(&self) -> &'static str {
        match self {
            AgentProfile::General => "general",
            AgentProfile::Flight => "flight",
            AgentProfile::Hotel => "hotel",
            AgentProfile::Route => "route",
            AgentProfile::Budget => "budget",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            AgentProfile::General => GENERAL_PROMPT,
            AgentProfile::Flight => FLIGHT_PROMPT,
            AgentProfile::Hotel => HOTEL_PROMPT,
            AgentProfile::Route => ROUTE_PROMPT,
            AgentProfile::Budget => BUDGET_PROMPT,
        }
    }

    pub fn capabilities(&self) -> Vec<AgentCapability> {
        match self {
            AgentProfile::General => vec![
                AgentCapability::TextGeneration,
                AgentCapability::DataAnalysis,
                AgentCapability::TravelPlanning,
            ],
            AgentProfile::Flight => vec![AgentCapability::FlightSearch],
            AgentProfile::Hotel => vec![AgentCapability::HotelBooking],
            AgentProfile::Route => vec![AgentCapability::RoutePlanning],
            AgentProfile::Budget => vec![
                AgentCapability::BudgetPlanning,
                AgentCapability::DataAnalysis,
            ],
        }
    }
}

impl fmt::Display for AgentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AgentProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AgentProfile::ALL
            .into_iter()
            .find(|p| p.key() == wanted)
            .ok_or_else(|| {
                let keys: Vec<&str> = AgentProfile::ALL.iter().map(|p| p.key()).collect();
                format!("Unknown agent '{s}'. Expected one of: {}", keys.join(", "))
            })
    }
}

// ─────────────────────────────────────────────
// ToolKit
// ─────────────────────────────────────────────

/// Shared tool instances, assembled into a per-profile [`ToolRegistry`].
///
/// The planning tool (and its plan store) is shared so every agent sees the
/// same plans the flow is driving.
#[derive(Clone)]
pub struct ToolKit {
    pub terminate_tool: String,
    pub planning: Arc<PlanningTool>,
    pub workspace: Arc<Workspace>,
    pub flights: Option<Arc<dyn FlightSource>>,
    pub hotels: Option<Arc<dyn HotelSource>>,
}

impl ToolKit {
    pub fn registry_for(&self, profile: AgentProfile) -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(TerminateTool::new(self.terminate_tool.clone())));
        match profile {
            AgentProfile::General => {
                tools.register(self.planning.clone());
                tools.register(Arc::new(CalculatorTool));
                tools.register(Arc::new(ReadFileTool::new(self.workspace.clone())));
                tools.register(Arc::new(WriteFileTool::new(self.workspace.clone())));
                tools.register(Arc::new(ListDirTool::new(self.workspace.clone())));
            }
            AgentProfile::Flight => {
                tools.register(Arc::new(FlightSearchTool::new(self.flights.clone())));
            }
            AgentProfile::Hotel => {
                tools.register(Arc::new(HotelSearchTool::new(self.hotels.clone())));
            }
            AgentProfile::Budget => {
                tools.register(Arc::new(CalculatorTool));
            }
            AgentProfile::Route => {}
        }
        tools
    }
}

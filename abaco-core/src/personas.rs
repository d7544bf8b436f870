//! Persona catalog for the Abaco agent system.
//!
//! Fifteen specialized personalities covering the lending-analytics
//! organisation, from executive summary down to the human-in-the-loop
//! advisor. The catalog is a static lookup: the engine reads persona
//! metadata to build prompts and never mutates it.

use serde::{Deserialize, Serialize};

/// Identifies one of the built-in agent personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Executive,
    RiskCro,
    RiskManager,
    Collections,
    Growth,
    Commercial,
    Kam,
    Financial,
    Quality,
    Mlops,
    Designer,
    Integrations,
    Compliance,
    Forecaster,
    Advisor,
}

impl AgentKind {
    /// All kinds, in catalog order.
    pub const ALL: [AgentKind; 15] = [
        AgentKind::Executive,
        AgentKind::RiskCro,
        AgentKind::RiskManager,
        AgentKind::Collections,
        AgentKind::Growth,
        AgentKind::Commercial,
        AgentKind::Kam,
        AgentKind::Financial,
        AgentKind::Quality,
        AgentKind::Mlops,
        AgentKind::Designer,
        AgentKind::Integrations,
        AgentKind::Compliance,
        AgentKind::Forecaster,
        AgentKind::Advisor,
    ];

    /// The full agent identifier used in run results and API surfaces.
    pub fn agent_id(&self) -> &'static str {
        match self {
            AgentKind::Executive => "executive-summary-ai-001",
            AgentKind::RiskCro => "chief-risk-officer-ai-001",
            AgentKind::RiskManager => "risk-manager-ai-001",
            AgentKind::Collections => "collections-coach-ai-001",
            AgentKind::Growth => "growth-strategist-ai-001",
            AgentKind::Commercial => "commercial-manager-ai-001",
            AgentKind::Kam => "kam-assistant-ai-001",
            AgentKind::Financial => "financial-analyst-ai-001",
            AgentKind::Quality => "data-quality-guardian-ai-001",
            AgentKind::Mlops => "modeling-mlops-ai-001",
            AgentKind::Designer => "visual-designer-ai-001",
            AgentKind::Integrations => "integrations-orchestrator-ai-001",
            AgentKind::Compliance => "compliance-audit-ai-001",
            AgentKind::Forecaster => "product-forecaster-ai-001",
            AgentKind::Advisor => "advisor-hitl-ai-001",
        }
    }

    /// Short key used in config files and trigger selectors.
    pub fn key(&self) -> &'static str {
        match self {
            AgentKind::Executive => "executive",
            AgentKind::RiskCro => "risk_cro",
            AgentKind::RiskManager => "risk_manager",
            AgentKind::Collections => "collections",
            AgentKind::Growth => "growth",
            AgentKind::Commercial => "commercial",
            AgentKind::Kam => "kam",
            AgentKind::Financial => "financial",
            AgentKind::Quality => "quality",
            AgentKind::Mlops => "mlops",
            AgentKind::Designer => "designer",
            AgentKind::Integrations => "integrations",
            AgentKind::Compliance => "compliance",
            AgentKind::Forecaster => "forecaster",
            AgentKind::Advisor => "advisor",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Resolve an agent kind from a full agent identifier.
///
/// Matches by keyword so ids like `data-quality-guardian-ai-001` and
/// plain `quality` both resolve. Returns `None` for unknown ids.
pub fn resolve_agent_kind(agent_id: &str) -> Option<AgentKind> {
    let id = agent_id.to_lowercase();
    const KEYWORDS: [(&str, AgentKind); 20] = [
        ("executive", AgentKind::Executive),
        ("chief-risk", AgentKind::RiskCro),
        ("cro", AgentKind::RiskCro),
        ("risk-manager", AgentKind::RiskManager),
        ("risk_manager", AgentKind::RiskManager),
        ("collections", AgentKind::Collections),
        ("growth", AgentKind::Growth),
        ("commercial", AgentKind::Commercial),
        ("kam", AgentKind::Kam),
        ("financial", AgentKind::Financial),
        ("quality", AgentKind::Quality),
        ("guardian", AgentKind::Quality),
        ("mlops", AgentKind::Mlops),
        ("modeling", AgentKind::Mlops),
        ("designer", AgentKind::Designer),
        ("visual", AgentKind::Designer),
        ("integration", AgentKind::Integrations),
        ("compliance", AgentKind::Compliance),
        ("forecast", AgentKind::Forecaster),
        ("advisor", AgentKind::Advisor),
    ];
    KEYWORDS
        .iter()
        .find(|(keyword, _)| id.contains(keyword))
        .map(|(_, kind)| *kind)
}

/// A complete agent personality: the metadata the engine reads when
/// constructing a persona prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPersonality {
    pub kind: AgentKind,
    /// Given name used in report footers.
    pub name: String,
    /// Organisational position.
    pub position: String,
    /// Seniority band: "C-Level", "Management", or "Specialist".
    pub level: String,
    /// Character traits woven into the prompt.
    pub traits: Vec<String>,
    /// Writing tone.
    pub tone: String,
    /// How the persona frames decisions.
    pub decision_style: String,
    /// Catchphrases quoted in generated reports.
    pub signature_phrases: Vec<String>,
    /// Generation backends this persona prefers, in order.
    pub preferred_backends: Vec<String>,
}

/// The static persona catalog. Construct once and share read-only.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: Vec<AgentPersonality>,
}

impl PersonaCatalog {
    pub fn new() -> Self {
        let mut catalog = Self {
            personas: Vec::new(),
        };
        catalog.register_builtins();
        catalog
    }

    /// Look up the personality for an agent kind.
    pub fn get(&self, kind: AgentKind) -> Option<&AgentPersonality> {
        self.personas.iter().find(|p| p.kind == kind)
    }

    /// Iterate over all personalities in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentPersonality> {
        self.personas.iter()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    fn register_builtins(&mut self) {
        let mut add = |kind: AgentKind,
                       name: &str,
                       position: &str,
                       level: &str,
                       traits: &[&str],
                       tone: &str,
                       decision_style: &str,
                       signature_phrases: &[&str],
                       preferred_backends: &[&str]| {
            self.personas.push(AgentPersonality {
                kind,
                name: name.to_string(),
                position: position.to_string(),
                level: level.to_string(),
                traits: traits.iter().map(|s| s.to_string()).collect(),
                tone: tone.to_string(),
                decision_style: decision_style.to_string(),
                signature_phrases: signature_phrases.iter().map(|s| s.to_string()).collect(),
                preferred_backends: preferred_backends.iter().map(|s| s.to_string()).collect(),
            });
        };

        add(
            AgentKind::Executive,
            "Sofia",
            "Chief Executive Summary Analyst",
            "C-Level",
            &["strategic", "synthesizing", "board-ready"],
            "concise and authoritative",
            "top-down, metric-first",
            &[
                "The portfolio tells a story; my job is the executive summary of it.",
                "Every board deck starts with the number that matters most.",
            ],
            &["grok", "openai"],
        );
        add(
            AgentKind::RiskCro,
            "Ricardo",
            "Chief Risk Officer",
            "C-Level",
            &["conservative", "regulation-aware", "stress-testing"],
            "measured and precise",
            "worst-case-first with explicit provisioning math",
            &[
                "Risk ignored is risk doubled.",
                "Provisions are the price of sleeping well.",
            ],
            &["grok", "openai"],
        );
        add(
            AgentKind::RiskManager,
            "María",
            "Portfolio Risk Manager",
            "Management",
            &["operational", "queue-driven", "hands-on"],
            "direct and action-oriented",
            "triage by days past due, escalate by exposure",
            &[
                "Every DPD bucket gets a next action today.",
                "A contact list beats a dashboard.",
            ],
            &["grok"],
        );
        add(
            AgentKind::Collections,
            "Carmen",
            "Collections Coach",
            "Specialist",
            &["empathetic", "bilingual", "persistent"],
            "warm but structured",
            "payment capacity first, pressure last",
            &[
                "Cobrar bien es ayudar a pagar.",
                "A plan the client can keep beats a promise they can't.",
                "Cada llamada empieza con escuchar.",
            ],
            &["grok"],
        );
        add(
            AgentKind::Growth,
            "Diego",
            "Growth Strategist",
            "Management",
            &["experimental", "unit-economics-driven", "channel-aware"],
            "energetic and numerate",
            "hypothesis, test, double down on CAC/LTV winners",
            &[
                "Growth without unit economics is just expensive noise.",
                "Scale the channel, not the spend.",
            ],
            &["grok", "openai"],
        );
        add(
            AgentKind::Commercial,
            "Alejandro",
            "Commercial Manager",
            "Management",
            &["relationship-led", "pipeline-focused", "pragmatic"],
            "businesslike and warm",
            "revenue impact ranked before effort",
            &["A healthy pipeline is a portfolio of conversations."],
            &["grok"],
        );
        add(
            AgentKind::Kam,
            "Lucía",
            "Key Account Assistant",
            "Specialist",
            &["prepared", "detail-retentive", "client-first"],
            "helpful and thorough",
            "brief first, recommend second",
            &["No meeting without a one-pager."],
            &["grok"],
        );
        add(
            AgentKind::Financial,
            "Marco",
            "Financial Analyst",
            "Specialist",
            &["rigorous", "model-driven", "skeptical of round numbers"],
            "neutral and exact",
            "reconcile first, project second",
            &[
                "If the cohorts disagree with the headline, trust the cohorts.",
            ],
            &["grok", "openai"],
        );
        add(
            AgentKind::Quality,
            "Patricia",
            "Data Quality Guardian",
            "Specialist",
            &["meticulous", "rule-driven", "blocking when necessary"],
            "clinical and unambiguous",
            "score against defined rules, remediate what automation can, escalate the rest",
            &[
                "Clean data or no data.",
                "A score is a contract with downstream consumers.",
                "Nulls are findings, not footnotes.",
            ],
            &["grok"],
        );
        add(
            AgentKind::Mlops,
            "Valeria",
            "Modeling & MLOps Engineer",
            "Specialist",
            &["reproducible", "monitoring-first", "drift-sensitive"],
            "technical and calm",
            "ship behind a validation gate",
            &["A model without monitoring is a liability with an API."],
            &["openai", "grok"],
        );
        add(
            AgentKind::Designer,
            "Gabriel",
            "Visual Designer",
            "Specialist",
            &["clarity-obsessed", "consistent", "accessible"],
            "visual and succinct",
            "one message per chart",
            &["If the chart needs a paragraph, redesign the chart."],
            &["grok"],
        );
        add(
            AgentKind::Integrations,
            "Elena",
            "Integrations Orchestrator",
            "Specialist",
            &["systematic", "contract-first", "failure-tolerant"],
            "matter-of-fact",
            "health checks before features",
            &["Every integration is guilty until health-checked."],
            &["grok"],
        );
        add(
            AgentKind::Compliance,
            "Roberto",
            "Compliance Audit Officer",
            "Management",
            &["exacting", "citation-heavy", "independent"],
            "formal and referenced",
            "rule citation before judgment",
            &["Findings without rule references are opinions."],
            &["grok", "openai"],
        );
        add(
            AgentKind::Forecaster,
            "Isabel",
            "Product Forecaster",
            "Specialist",
            &["scenario-driven", "assumption-explicit", "humble about tails"],
            "analytic and conditional",
            "three scenarios, one recommendation",
            &["A forecast is an argument with error bars."],
            &["openai", "grok"],
        );
        add(
            AgentKind::Advisor,
            "Héctor",
            "Human-in-the-Loop Advisor",
            "C-Level",
            &["synthesizing", "decision-forcing", "accountable"],
            "deliberate and candid",
            "frame the decision, name the owner, set the date",
            &["Automation proposes; a named human disposes."],
            &["grok"],
        );
    }
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_all_fifteen_personas() {
        let catalog = PersonaCatalog::new();
        assert_eq!(catalog.len(), 15);
        for kind in AgentKind::ALL {
            assert!(catalog.get(kind).is_some(), "missing persona for {}", kind);
        }
    }

    #[test]
    fn test_personality_fields_are_populated() {
        let catalog = PersonaCatalog::new();
        for persona in catalog.iter() {
            assert!(!persona.name.is_empty());
            assert!(!persona.position.is_empty());
            assert!(!persona.traits.is_empty());
            assert!(!persona.signature_phrases.is_empty());
            assert!(!persona.preferred_backends.is_empty());
        }
    }

    #[test]
    fn test_resolve_agent_kind_from_full_id() {
        assert_eq!(
            resolve_agent_kind("data-quality-guardian-ai-001"),
            Some(AgentKind::Quality)
        );
        assert_eq!(
            resolve_agent_kind("executive-summary-ai-001"),
            Some(AgentKind::Executive)
        );
        assert_eq!(
            resolve_agent_kind("chief-risk-officer-ai-001"),
            Some(AgentKind::RiskCro)
        );
        assert_eq!(
            resolve_agent_kind("advisor-hitl-ai-001"),
            Some(AgentKind::Advisor)
        );
    }

    #[test]
    fn test_resolve_agent_kind_from_short_key() {
        assert_eq!(resolve_agent_kind("quality"), Some(AgentKind::Quality));
        assert_eq!(resolve_agent_kind("mlops"), Some(AgentKind::Mlops));
        assert_eq!(resolve_agent_kind("unknown-agent"), None);
    }

    #[test]
    fn test_agent_kind_serde_keys() {
        assert_eq!(
            serde_json::to_string(&AgentKind::RiskCro).unwrap(),
            r#""risk_cro""#
        );
        assert_eq!(
            serde_json::from_str::<AgentKind>(r#""risk_manager""#).unwrap(),
            AgentKind::RiskManager
        );
    }
}

//! Closed capability registries.
//!
//! Each registry is an enum; a capability carries its wire name, endpoint
//! path and required argument names. Lookup by name fails for anything not
//! listed, so a bad name never turns into a request URL.

use reqwest::StatusCode;
use serde::Serialize;

pub trait Capability: Copy + Send + Sync + std::fmt::Debug + 'static {
    const ALL: &'static [Self];

    /// Name the decision model uses for this capability
    fn name(&self) -> &'static str;

    /// Path appended to the registry's base URL
    fn path(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn required_args(&self) -> &'static [&'static str];

    /// Whether a response with `status` carries a usable result
    fn accepts_status(&self, status: StatusCode) -> bool {
        status.is_success()
    }

    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.name()).collect()
    }

    /// One line per capability, for inclusion in a decision prompt
    fn catalogue() -> String {
        Self::ALL
            .iter()
            .map(|c| {
                format!(
                    "- {}({}): {}",
                    c.name(),
                    c.required_args().join(", "),
                    c.description()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Business-registry lookups available to the router agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegistryTool {
    SearchEntity,
    CompanyFullProfile,
    EntrepreneurProfile,
}

impl Capability for RegistryTool {
    const ALL: &'static [Self] = &[
        RegistryTool::SearchEntity,
        RegistryTool::CompanyFullProfile,
        RegistryTool::EntrepreneurProfile,
    ];

    fn name(&self) -> &'static str {
        match self {
            RegistryTool::SearchEntity => "search_entity",
            RegistryTool::CompanyFullProfile => "get_company_full_profile",
            RegistryTool::EntrepreneurProfile => "get_entrepreneur_profile",
        }
    }

    fn path(&self) -> &'static str {
        self.name()
    }

    fn description(&self) -> &'static str {
        match self {
            RegistryTool::SearchEntity => {
                "Search companies and entrepreneurs by name or INN. \"obj\" is \"org\" for organisations, \"ent\" for entrepreneurs."
            }
            RegistryTool::CompanyFullProfile => {
                "Full business profile of a company by INN: status, management, financials, legal risks."
            }
            RegistryTool::EntrepreneurProfile => {
                "Profile of an individual entrepreneur by INN."
            }
        }
    }

    fn required_args(&self) -> &'static [&'static str] {
        match self {
            RegistryTool::SearchEntity => &["query", "obj"],
            RegistryTool::CompanyFullProfile | RegistryTool::EntrepreneurProfile => &["inn"],
        }
    }
}

/// Provider-search tools available to the referral stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SupportTool {
    SearchProviders,
}

impl Capability for SupportTool {
    const ALL: &'static [Self] = &[SupportTool::SearchProviders];

    fn name(&self) -> &'static str {
        match self {
            SupportTool::SearchProviders => "support.search_providers",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            SupportTool::SearchProviders => "providers/search",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            SupportTool::SearchProviders => {
                "Find legal service providers matching the user's situation."
            }
        }
    }

    fn required_args(&self) -> &'static [&'static str] {
        &["situation"]
    }

    /// Provider search answers 200 with `{providers}`; anything else is a failure
    fn accepts_status(&self, status: StatusCode) -> bool {
        status == StatusCode::OK
    }
}

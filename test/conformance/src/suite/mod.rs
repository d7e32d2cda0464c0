//! Case registry and the sequential runner.


use std::time::Instant;

use computest_model::{Microversion, MicroversionRange};
use tracing::{info, warn};

use crate::case::{CaseError, CaseInfo, ConformanceCase};
use crate::config::ConformanceConfig;
use crate::env::{CaseContext, SuiteEnv};
use crate::report::{CaseReport, GroupReport, Outcome, SuiteReport};

/// Cases sharing one environment and one requested microversion.
pub struct CaseGroup {
    pub name: &'static str,
    /// Versions the group's checks apply to.
    pub range: MicroversionRange,
    /// Create `s1`/`s2` before the first case.
    pub uses_fixtures: bool,
    pub cases: Vec<Box<dyn ConformanceCase>>,
}

/// Every group, in run order.
pub fn registry() -> Vec<CaseGroup> {
    vec![
        CaseGroup {
            name: admin_servers::GROUP,
            range: MicroversionRange::default(),
            uses_fixtures: true,
            cases: admin_servers::cases(),
        },
        CaseGroup {
            name: admin_servers_275::GROUP,
            range: MicroversionRange::at_least(Microversion::V2_75),
            uses_fixtures: false,
            cases: admin_servers_275::cases(),
        },
    ]
}

/// Which groups and cases to run. Empty lists select everything.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub groups: Vec<String>,
    pub cases: Vec<String>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            groups: vec![name.into()],
            cases: Vec::new(),
        }
    }

    pub fn includes_group(&self, group: &str) -> bool {
        self.groups.is_empty() || self.groups.iter().any(|g| g == group)
    }

    pub fn includes_case(&self, case: &str) -> bool {
        self.cases.is_empty() || self.cases.iter().any(|c| c == case)
    }

    /// Names that match no registered group or case.
    pub fn unknown_names(&self, registry: &[CaseGroup]) -> Vec<String> {
        let groups = self
            .groups
            .iter()
            .filter(|g| !registry.iter().any(|r| r.name == g.as_str()));
        let cases = self.cases.iter().filter(|c| {
            !registry
                .iter()
                .flat_map(|r| r.cases.iter())
                .any(|case| case.info().name == c.as_str())
        });
        groups.chain(cases).cloned().collect()
    }
}

pub struct SuiteRunner {
    config: ConformanceConfig,
    groups: Vec<CaseGroup>,
}

impl SuiteRunner {
    pub fn new(config: ConformanceConfig) -> Self {
        Self {
            config,
            groups: registry(),
        }
    }

    pub fn config(&self) -> &ConformanceConfig {
        &self.config
    }

    pub fn groups(&self) -> &[CaseGroup] {
        &self.groups
    }

    pub async fn run(&self, selection: &Selection) -> SuiteReport {
        let mut report = SuiteReport::default();
        for group in &self.groups {
            if !selection.includes_group(group.name) {
                continue;
            }
            let cases: Vec<&dyn ConformanceCase> = group
                .cases
                .iter()
                .map(|c| c.as_ref())
                .filter(|c| selection.includes_case(c.info().name))
                .collect();
            if cases.is_empty() {
                continue;
            }
            report.groups.push(self.run_group(group, &cases).await);
        }
        report
    }

    async fn run_group(&self, group: &CaseGroup, cases: &[&dyn ConformanceCase]) -> GroupReport {
        let deployment = self.config.deployment_range();
        let microversion = group.range.select_request(&deployment);
        let mut report = GroupReport {
            name: group.name,
            microversion: microversion.map(|v| v.to_string()),
            cases: Vec::new(),
            errors: Vec::new(),
        };

        if !group.range.overlaps(&deployment) {
            let reason = format!(
                "requires microversion {} or later; deployment allows up to {}",
                group.range.min.unwrap_or(Microversion::V2_1),
                deployment.max
            );
            info!(group = group.name, reason = %reason, "skipping group");
            report.cases = settled(group.name, cases, Outcome::Skipped, &reason);
            return report;
        }

        let mut env = match SuiteEnv::new(&self.config, group.name, microversion) {
            Ok(env) => env,
            Err(e) => {
                let reason = format!("failed to build clients: {e}");
                report.cases = settled(group.name, cases, Outcome::Errored, &reason);
                return report;
            }
        };

        info!(
            group = group.name,
            microversion = report.microversion.as_deref().unwrap_or("none"),
            cases = cases.len(),
            "running group"
        );

        let setup = if group.uses_fixtures {
            env.setup_fixtures().await
        } else {
            Ok(())
        };

        match setup {
            Ok(()) => {
                for case in cases {
                    report.cases.push(run_case(group.name, *case, &mut env).await);
                }
            }
            Err(e) => {
                let reason = CaseError::Setup(e.to_string()).to_string();
                warn!(group = group.name, error = %e, "group setup failed");
                report.cases = settled(group.name, cases, Outcome::Errored, &reason);
            }
        }

        report.errors = env.teardown().await;
        report
    }
}

fn settled(
    group: &'static str,
    cases: &[&dyn ConformanceCase],
    outcome: Outcome,
    reason: &str,
) -> Vec<CaseReport> {
    cases
        .iter()
        .map(|case| case_report(group, case.info(), outcome, 0, Some(reason.to_string())))
        .collect()
}

fn case_report(
    group: &'static str,
    info: CaseInfo,
    outcome: Outcome,
    duration_ms: u64,
    reason: Option<String>,
) -> CaseReport {
    CaseReport {
        group,
        name: info.name,
        idempotent_id: info.idempotent_id,
        outcome,
        duration_ms,
        reason,
    }
}

/// Runs one case body, then its cleanups. A cleanup failure turns a pass
/// into an error but never hides the body's own failure.
async fn run_case(
    group: &'static str,
    case: &dyn ConformanceCase,
    env: &mut SuiteEnv,
) -> CaseReport {
    let info = case.info();
    info!(group, case = info.name, id = info.idempotent_id, "case started");
    let start = Instant::now();

    let mut ctx = CaseContext::new(env);
    let result = case.run(&mut ctx).await;
    let cleanup_errors = ctx.run_cleanups().await;

    let (outcome, mut reasons) = match result {
        Ok(()) if cleanup_errors.is_empty() => (Outcome::Passed, Vec::new()),
        Ok(()) => (Outcome::Errored, Vec::new()),
        Err(e) if e.is_assertion() => (Outcome::Failed, vec![e.to_string()]),
        Err(e) => (Outcome::Errored, vec![e.to_string()]),
    };
    reasons.extend(cleanup_errors);

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let reason = (!reasons.is_empty()).then(|| reasons.join("; "));

    match outcome {
        Outcome::Passed => info!(group, case = info.name, duration_ms, "case passed"),
        _ => info!(
            group,
            case = info.name,
            duration_ms,
            outcome = %outcome,
            reason = reason.as_deref().unwrap_or(""),
            "case did not pass"
        ),
    }

    case_report(group, info, outcome, duration_ms, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_groups() {
        let groups = registry();
        let names: Vec<_> = groups.iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["servers-admin", "servers-admin-2.75"]);
        assert_eq!(groups[0].cases.len(), 10);
        assert_eq!(groups[1].cases.len(), 1);
    }

    #[test]
    fn test_selection_filters() {
        let selection = Selection {
            groups: vec!["servers-admin".to_string()],
            cases: vec!["reset_state_server".to_string()],
        };
        assert!(selection.includes_group("servers-admin"));
        assert!(!selection.includes_group("servers-admin-2.75"));
        assert!(selection.includes_case("reset_state_server"));
        assert!(!selection.includes_case("inject_network_info"));
        assert!(Selection::all().includes_case("anything"));
    }

    #[test]
    fn test_unknown_names_are_reported() {
        let selection = Selection {
            groups: vec!["servers-admin".to_string(), "nope".to_string()],
            cases: vec!["inject_network_info".to_string(), "missing".to_string()],
        };
        assert_eq!(selection.unknown_names(&registry()), vec!["nope", "missing"]);
    }

    #[test]
    fn test_275_group_requests_at_least_275() {
        let group = &registry()[1];
        let deployment = MicroversionRange::new(Some(Microversion::new(2, 80)), Default::default());
        assert_eq!(
            group.range.select_request(&deployment),
            Some(Microversion::new(2, 80))
        );
        assert_eq!(
            group.range.select_request(&MicroversionRange::default()),
            Some(Microversion::V2_75)
        );
    }
}

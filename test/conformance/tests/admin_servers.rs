//! Runs the conformance suite against the simulated compute API.
//!
//! Clean runs must pass at several requested microversions; runs against a
//! simulator with injected contract violations must report the matching
//! cases as failed.

use std::time::Duration;

use computest_client::{wait_for_server_status, WaitError, WaitPolicy};
use computest_conformance::config::{ComputeSection, CredentialSection};
use computest_conformance::{ConformanceConfig, Outcome, Selection, SuiteReport, SuiteRunner};
use computest_id::FlavorId;
use computest_model::{
    CreateServerBody, CreateServerRequest, ListServersQuery, Microversion, ResetState,
    ServerStatus, VersionBound,
};
use computest_sim::config::Identity;
use computest_sim::{Faults, SimConfig};
use computest_testing::{init_tracing, SimHarness};
use rstest::rstest;

fn fast_sim() -> SimConfig {
    SimConfig {
        build_time: Duration::from_millis(40),
        rebuild_time: Duration::from_millis(40),
        delete_time: Duration::from_millis(20),
        ..SimConfig::default()
    }
}

fn with_faults(faults: Faults) -> SimConfig {
    SimConfig {
        faults,
        ..fast_sim()
    }
}

fn credential_section(identity: &Identity) -> CredentialSection {
    CredentialSection {
        token: identity.token.clone(),
        project_id: identity.project_id.clone(),
        user_id: Some(identity.user_id.clone()),
    }
}

fn suite_config(harness: &SimHarness) -> ConformanceConfig {
    let sim = harness.config();
    let identity = |admin: bool| {
        sim.identities
            .iter()
            .find(|i| i.admin == admin)
            .expect("simulator seeds both roles")
    };

    ConformanceConfig {
        compute: ComputeSection {
            build_interval_ms: 10,
            build_timeout_secs: 10,
            ..ComputeSection::new(
                harness.endpoint(),
                sim.images[0].clone(),
                sim.images[1].clone(),
                sim.flavors[0].id.clone(),
            )
        },
        admin: credential_section(identity(true)),
        tenant: credential_section(identity(false)),
    }
}

/// Starts a simulator, runs `selection` with the adjusted config and
/// returns the report together with the still-running harness.
async fn run_suite(
    sim: SimConfig,
    adjust: impl FnOnce(&mut ConformanceConfig),
    selection: Selection,
) -> (SuiteReport, SimHarness) {
    init_tracing();
    let harness = SimHarness::start(sim).await.unwrap();
    let mut config = suite_config(&harness);
    adjust(&mut config);
    config.validate().unwrap();

    let report = SuiteRunner::new(config).run(&selection).await;
    (report, harness)
}

fn outcome(report: &SuiteReport, case: &str) -> Outcome {
    report
        .case(case)
        .unwrap_or_else(|| panic!("{case} missing from report"))
        .outcome
}

#[rstest]
#[case::no_version_header(None)]
#[case::status_filter_rejected(Some(Microversion::V2_38))]
#[case::embedded_flavor(Some(Microversion::V2_47))]
#[case::full_update_body(Some(Microversion::V2_75))]
#[tokio::test]
async fn suite_passes_against_simulator(#[case] min: Option<Microversion>) {
    let (report, harness) = run_suite(
        fast_sim(),
        |config| config.compute.min_microversion = min,
        Selection::all(),
    )
    .await;

    assert!(report.success(), "{report:#?}");
    let summary = report.summary();
    assert_eq!(summary.passed, 11, "{report:#?}");
    assert_eq!(summary.skipped, 0);

    let versions: Vec<_> = report.groups.iter().map(|g| g.microversion.clone()).collect();
    let expected_275 = min.unwrap_or(Microversion::V2_75).max(Microversion::V2_75);
    assert_eq!(
        versions,
        vec![min.map(|v| v.to_string()), Some(expected_275.to_string())]
    );

    harness.shutdown().await;
}

#[tokio::test]
async fn teardown_removes_every_server() {
    let (report, harness) = run_suite(fast_sim(), |_| {}, Selection::all()).await;
    assert!(report.success(), "{report:#?}");

    let admin = harness.admin_client().unwrap();
    let leftover = admin
        .list_servers(&ListServersQuery::new().all_tenants("1"))
        .await
        .unwrap();
    assert!(leftover.is_empty(), "left behind: {leftover:?}");

    harness.shutdown().await;
}

#[tokio::test]
async fn group_275_skipped_below_275() {
    let (report, harness) = run_suite(
        fast_sim(),
        |config| {
            config.compute.max_microversion = VersionBound::Version(Microversion::new(2, 74));
        },
        Selection::all(),
    )
    .await;

    assert!(report.success(), "{report:#?}");
    assert_eq!(outcome(&report, "rebuild_update_server_275"), Outcome::Skipped);
    assert_eq!(report.summary().passed, 10);

    harness.shutdown().await;
}

#[tokio::test]
async fn single_case_selection_still_builds_fixtures() {
    let selection = Selection {
        groups: Vec::new(),
        cases: vec!["reset_state_server".to_string()],
    };
    let (report, harness) = run_suite(fast_sim(), |_| {}, selection).await;

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.summary().passed, 1);
    assert_eq!(outcome(&report, "reset_state_server"), Outcome::Passed);

    harness.shutdown().await;
}

#[tokio::test]
async fn fixture_setup_failure_errors_every_case() {
    let (report, harness) = run_suite(
        fast_sim(),
        |config| config.compute.flavor_ref = FlavorId::from_trusted("does-not-exist"),
        Selection::group("servers-admin"),
    )
    .await;

    assert!(!report.success());
    let cases: Vec<_> = report.cases().collect();
    assert_eq!(cases.len(), 10);
    for case in cases {
        assert_eq!(case.outcome, Outcome::Errored, "{case:?}");
        assert!(
            case.reason.as_deref().unwrap_or("").contains("setup failed"),
            "{case:?}"
        );
    }

    harness.shutdown().await;
}

/// Rebuilding out of ERROR may pass through ERROR once more before the
/// server settles.
fn transient_rebuild_sim() -> SimConfig {
    SimConfig {
        rebuild_time: Duration::from_millis(200),
        transient_rebuild_error: true,
        ..fast_sim()
    }
}

#[tokio::test]
async fn rebuild_from_error_tolerates_transient_error() {
    let (report, harness) = run_suite(
        transient_rebuild_sim(),
        |_| {},
        Selection::group("servers-admin"),
    )
    .await;

    assert!(report.success(), "{report:#?}");
    assert_eq!(
        outcome(&report, "rebuild_server_in_error_state"),
        Outcome::Passed
    );

    harness.shutdown().await;
}

#[tokio::test]
async fn default_wait_policy_rejects_transient_rebuild_error() {
    init_tracing();
    let harness = SimHarness::start(transient_rebuild_sim()).await.unwrap();
    let admin = harness.admin_client().unwrap();
    let tenant = harness.tenant_client().unwrap();
    let sim = harness.config();
    let policy = WaitPolicy::new(Duration::from_millis(10), Duration::from_secs(10));

    let body = CreateServerBody {
        server: CreateServerRequest::new(
            "transient-rebuild",
            sim.images[0].clone(),
            sim.flavors[0].id.clone(),
        ),
        scheduler_hints: None,
    };
    let created = tenant.create_server(&body).await.unwrap();
    wait_for_server_status(&tenant, &created.id, ServerStatus::Active, &policy)
        .await
        .unwrap();

    admin.reset_state(&created.id, ResetState::Error).await.unwrap();
    tenant
        .rebuild_server(&created.id, &sim.images[1])
        .await
        .unwrap();

    let err = wait_for_server_status(&tenant, &created.id, ServerStatus::Active, &policy)
        .await
        .unwrap_err();
    assert!(matches!(err, WaitError::BuildError { .. }), "{err:?}");

    // A tolerant wait rides it out.
    wait_for_server_status(
        &tenant,
        &created.id,
        ServerStatus::Active,
        &policy.tolerating_errors(),
    )
    .await
    .unwrap();

    harness.shutdown().await;
}

#[tokio::test]
async fn detects_listing_across_projects() {
    let faults = Faults {
        ignore_tenant_scope: true,
        ..Faults::default()
    };
    let (report, harness) =
        run_suite(with_faults(faults), |_| {}, Selection::group("servers-admin")).await;

    assert!(!report.success());
    assert_eq!(outcome(&report, "list_servers_by_admin"), Outcome::Failed);
    assert_eq!(
        outcome(&report, "list_servers_by_admin_with_specified_tenant"),
        Outcome::Failed
    );
    assert_eq!(
        outcome(&report, "list_servers_by_admin_with_all_tenants"),
        Outcome::Passed
    );

    harness.shutdown().await;
}

#[tokio::test]
async fn detects_leak_hidden_behind_relabelled_tenant() {
    let faults = Faults {
        ignore_tenant_scope: true,
        report_caller_tenant: true,
        ..Faults::default()
    };
    let (report, harness) =
        run_suite(with_faults(faults), |_| {}, Selection::group("servers-admin")).await;

    let case = report
        .case("list_servers_by_admin_with_specified_tenant")
        .unwrap();
    assert_eq!(case.outcome, Outcome::Failed, "{case:?}");
    assert!(
        case.reason.as_deref().unwrap_or("").contains("tenant_id detail"),
        "{case:?}"
    );

    harness.shutdown().await;
}

#[tokio::test]
async fn detects_rebuild_keeping_old_image() {
    let faults = Faults {
        keep_image_on_rebuild: true,
        ..Faults::default()
    };
    let (report, harness) =
        run_suite(with_faults(faults), |_| {}, Selection::group("servers-admin")).await;

    assert_eq!(
        outcome(&report, "rebuild_server_in_error_state"),
        Outcome::Failed
    );
    assert_eq!(outcome(&report, "reset_state_server"), Outcome::Passed);

    harness.shutdown().await;
}

#[tokio::test]
async fn detects_invalid_status_accepted_at_238() {
    let faults = Faults {
        ignore_invalid_status: true,
        ..Faults::default()
    };
    let (report, harness) = run_suite(
        with_faults(faults),
        |config| config.compute.min_microversion = Some(Microversion::V2_38),
        Selection::group("servers-admin"),
    )
    .await;

    assert_eq!(
        outcome(&report, "list_servers_detailed_filter_by_invalid_status"),
        Outcome::Failed
    );

    harness.shutdown().await;
}

#[tokio::test]
async fn detects_short_update_body_at_275() {
    let faults = Faults {
        short_update_body: true,
        ..Faults::default()
    };
    let (report, harness) = run_suite(
        with_faults(faults),
        |_| {},
        Selection::group("servers-admin-2.75"),
    )
    .await;

    let case = report.case("rebuild_update_server_275").unwrap();
    assert_eq!(case.outcome, Outcome::Errored, "{case:?}");
    assert!(
        case.reason.as_deref().unwrap_or("").contains("schema"),
        "{case:?}"
    );

    harness.shutdown().await;
}

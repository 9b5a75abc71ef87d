//! End-to-end admission tests
//!
//! Exercises the full request path: tenant resolution, capability
//! authorization, then quota and rate admission, with all the in-memory
//! stores wired together the way a service would wire their durable
//! counterparts.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use atelier_org::{
    MembershipRegistry, MemoryRegistry, Organization, OrganizationMembership, OrganizationRole,
};
use atelier_quota::{
    AdmissionController, AdmissionError, MemoryRateCounter, MemoryUsageLedger,
    ProviderDirectory, RateWindow, ResourceProvider, UsageLedger,
};
use atelier_rbac::Capability;
use atelier_tenancy::{OrganizationSelector, TenantResolver};

struct Platform {
    resolver: TenantResolver,
    controller: AdmissionController,
    org: Organization,
    provider_id: Uuid,
}

/// One organization with a generation limit, one designer member, one
/// active provider.
async fn platform(limit: u64, per_minute: u32, per_hour: u32) -> (Platform, Uuid) {
    let registry = Arc::new(MemoryRegistry::new());
    let org = Organization::new("Acme Studio", "acme-studio", Uuid::now_v7())
        .with_generation_limit(limit);
    registry.create_organization(org.clone()).await.unwrap();

    let designer = Uuid::now_v7();
    registry
        .add_membership(OrganizationMembership::new(
            org.id,
            designer,
            OrganizationRole::Designer,
        ))
        .await
        .unwrap();

    let ledger = Arc::new(MemoryUsageLedger::new());
    ledger.register(&org).await;

    let providers = Arc::new(ProviderDirectory::new());
    let provider =
        ResourceProvider::new("Flux Renderer", "flux").with_rate_limits(per_minute, per_hour);
    let provider_id = provider.id;
    providers.register(provider).await;

    let platform = Platform {
        resolver: TenantResolver::new(registry),
        controller: AdmissionController::new(
            providers,
            ledger,
            Arc::new(MemoryRateCounter::new()),
        ),
        org,
        provider_id,
    };
    (platform, designer)
}

#[tokio::test]
async fn test_designer_generates_until_quota_exhausted() {
    let (p, designer) = platform(3, 100, 1000).await;

    let ctx = p
        .resolver
        .resolve(Some(designer), Some(OrganizationSelector::Id(p.org.id)))
        .await
        .unwrap();

    for expected in 1..=3u64 {
        ctx.authorize(Capability::GenerateAiContent).unwrap();
        let admission = p
            .controller
            .admit(ctx.organization_id(), p.provider_id, 1)
            .await
            .unwrap();
        assert_eq!(admission.usage.used, expected);
        assert_eq!(admission.usage.limit, 3);
    }

    // The fourth attempt passes authorization but the quota gate
    // rejects it, and the counter stays where it was.
    ctx.authorize(Capability::GenerateAiContent).unwrap();
    assert!(matches!(
        p.controller
            .admit(ctx.organization_id(), p.provider_id, 1)
            .await,
        Err(AdmissionError::QuotaExceeded {
            used: 3,
            limit: 3,
            requested: 1
        })
    ));
    assert_eq!(p.controller.usage(p.org.id).await.unwrap().used, 3);
}

#[tokio::test]
async fn test_forbidden_capability_stops_before_admission() {
    let (p, designer) = platform(3, 100, 1000).await;

    let ctx = p
        .resolver
        .resolve(Some(designer), Some(OrganizationSelector::Id(p.org.id)))
        .await
        .unwrap();

    // A designer cannot manage billing; the request dies at the
    // authorization gate and no consumption is ever recorded.
    assert!(ctx.authorize(Capability::ManageBilling).is_err());
    assert_eq!(p.controller.usage(p.org.id).await.unwrap().used, 0);
    assert_eq!(
        p.controller
            .stats()
            .admitted
            .load(std::sync::atomic::Ordering::Relaxed),
        0
    );
}

#[tokio::test]
async fn test_concurrent_admissions_never_exceed_quota() {
    let limit = 8u64;
    let (p, _designer) = platform(limit, 1000, 10000).await;
    let controller = Arc::new(p.controller);

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..(limit + 5) {
        let controller = controller.clone();
        let org_id = p.org.id;
        let provider_id = p.provider_id;
        tasks.spawn(async move { controller.admit(org_id, provider_id, 1).await });
    }

    let mut admitted = 0u64;
    let mut rejected = 0u64;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => admitted += 1,
            Err(AdmissionError::QuotaExceeded { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(admitted, limit);
    assert_eq!(rejected, 5);
    assert_eq!(controller.usage(p.org.id).await.unwrap().used, limit);
}

#[tokio::test]
async fn test_minute_rate_window_slides() {
    let (p, _designer) = platform(1000, 10, 1000).await;
    let t0 = Utc::now();

    for _ in 0..10 {
        p.controller
            .admit_at(p.org.id, p.provider_id, 1, t0)
            .await
            .unwrap();
    }

    // The 11th inside the same minute is rejected without consuming.
    assert_eq!(
        p.controller
            .admit_at(p.org.id, p.provider_id, 1, t0)
            .await,
        Err(AdmissionError::RateLimited {
            window: RateWindow::Minute
        })
    );
    assert_eq!(p.controller.usage(p.org.id).await.unwrap().used, 10);

    // 61 seconds later the window has rolled past the burst.
    let t1 = t0 + Duration::seconds(61);
    assert!(p
        .controller
        .admit_at(p.org.id, p.provider_id, 1, t1)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_rejections_are_idempotent() {
    let (p, _designer) = platform(1, 5, 1000).await;
    let t0 = Utc::now();

    p.controller
        .admit_at(p.org.id, p.provider_id, 1, t0)
        .await
        .unwrap();

    // Hammering an exhausted quota changes nothing: the counter holds
    // and the rate windows hold only the one granted admission.
    for _ in 0..20 {
        assert!(matches!(
            p.controller.admit_at(p.org.id, p.provider_id, 1, t0).await,
            Err(AdmissionError::QuotaExceeded { .. })
        ));
    }
    assert_eq!(p.controller.usage(p.org.id).await.unwrap().used, 1);
}

#[tokio::test]
async fn test_provider_outage_and_recovery() {
    let (p, designer) = platform(10, 100, 1000).await;

    let ctx = p
        .resolver
        .resolve(Some(designer), Some(OrganizationSelector::Id(p.org.id)))
        .await
        .unwrap();
    ctx.authorize(Capability::GenerateAiContent).unwrap();

    let providers = Arc::new(ProviderDirectory::new());
    let provider = ResourceProvider::new("Flaky", "flaky");
    let provider_id = provider.id;
    providers.register(provider).await;

    let ledger = Arc::new(MemoryUsageLedger::new());
    ledger.register(&p.org).await;
    let controller = AdmissionController::new(
        providers.clone(),
        ledger,
        Arc::new(MemoryRateCounter::new()),
    );

    providers.deactivate(provider_id).await;
    assert_eq!(
        controller.admit(p.org.id, provider_id, 1).await,
        Err(AdmissionError::ProviderUnavailable)
    );
    assert_eq!(controller.usage(p.org.id).await.unwrap().used, 0);

    providers.activate(provider_id).await;
    assert!(controller.admit(p.org.id, provider_id, 1).await.is_ok());
}

#[tokio::test]
async fn test_raising_limit_restores_admission() {
    let (p, _designer) = platform(2, 100, 1000).await;

    // Keep a handle on the ledger so the test can raise the limit.
    let ledger = Arc::new(MemoryUsageLedger::new());
    ledger.register(&p.org).await;
    let providers = Arc::new(ProviderDirectory::new());
    let provider = ResourceProvider::new("Flux", "flux");
    let provider_id = provider.id;
    providers.register(provider).await;
    let controller = AdmissionController::new(
        providers,
        ledger.clone(),
        Arc::new(MemoryRateCounter::new()),
    );

    controller.admit(p.org.id, provider_id, 1).await.unwrap();
    controller.admit(p.org.id, provider_id, 1).await.unwrap();
    assert!(controller.admit(p.org.id, provider_id, 1).await.is_err());

    ledger.set_limit(p.org.id, 5).await.unwrap();
    assert!(controller.admit(p.org.id, provider_id, 1).await.is_ok());
}

//! End-to-end service tests against an in-memory SurrealDB: tenant
//! isolation, list visibility, the full lifecycle walk, expiry gating,
//! and exactly-once conversion.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use worksmith_core::context::AuthorizationContext;
use worksmith_core::error::WorksmithError;
use worksmith_core::lifecycle::QuoteStatus;
use worksmith_core::models::quote::{CreateQuote, UpdateQuote};
use worksmith_core::models::tenant::CreateTenant;
use worksmith_core::models::user::{Principal, Role};
use worksmith_core::repository::{Clock, Pagination, TenantRepository, WorkOrderRepository};
use worksmith_core::scope::TenantFilter;
use worksmith_db::repository::{
    SurrealQuoteRepository, SurrealTenantRepository, SurrealWorkOrderRepository,
};
use worksmith_quotes::notify::{EventKind, NotificationEvent, NotificationSink};
use worksmith_quotes::service::QuoteService;

/// Sink that records every published event.
#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl RecordingSink {
    fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: NotificationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Clock pinned to a fixed instant.
#[derive(Clone, Copy)]
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

struct Fixture {
    db: Surreal<Db>,
    service: QuoteService<SurrealQuoteRepository<Db>, RecordingSink, FixedClock>,
    sink: RecordingSink,
    now: DateTime<Utc>,
    tenant_a: Uuid,
    tenant_b: Uuid,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    worksmith_db::run_migrations(&db).await.unwrap();

    let tenants = SurrealTenantRepository::new(db.clone());
    let tenant_a = tenants
        .create(CreateTenant {
            code: "ALPHA".into(),
            name: "Alpha Property Group".into(),
        })
        .await
        .unwrap()
        .id;
    let tenant_b = tenants
        .create(CreateTenant {
            code: "BRAVO".into(),
            name: "Bravo Estates".into(),
        })
        .await
        .unwrap()
        .id;

    let sink = RecordingSink::default();
    let now = Utc::now();
    let service = QuoteService::new(
        SurrealQuoteRepository::new(db.clone()),
        sink.clone(),
        FixedClock(now),
    );

    Fixture {
        db,
        service,
        sink,
        now,
        tenant_a,
        tenant_b,
    }
}

fn principal(role: Role, home: Uuid, email: &str) -> Principal {
    Principal {
        id: Uuid::new_v4(),
        role,
        home_tenant_id: home,
        email: email.into(),
    }
}

fn staff_ctx(home: Uuid) -> AuthorizationContext {
    AuthorizationContext::home(principal(Role::Staff, home, "staff@worksmith.example"))
}

fn sample_quote() -> CreateQuote {
    CreateQuote {
        contact_email: "owner@example.com".into(),
        contact_name: "Olive Owner".into(),
        property_address: "12 Harbour Rd".into(),
        description: "Roof repair after storm damage".into(),
        estimated_cost: Some(4200.0),
        quote_valid_until: None,
    }
}

/// Walk a quote along `path` using an unswitched staff context.
async fn drive(fixture: &Fixture, id: Uuid, path: &[QuoteStatus]) {
    let ctx = staff_ctx(fixture.tenant_a);
    for &status in path {
        fixture
            .service
            .request_transition(&ctx, id, status)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn creation_stamps_effective_tenant() {
    let f = setup().await;

    // Home context: the principal's own tenant.
    let ctx = AuthorizationContext::home(principal(
        Role::ClientAdmin,
        f.tenant_a,
        "admin@alpha.example",
    ));
    let quote = f.service.create(&ctx, sample_quote()).await.unwrap();
    assert_eq!(quote.tenant_id, f.tenant_a);
    assert_eq!(quote.status, QuoteStatus::Draft);
    assert!(quote.quote_number.starts_with("QTE-"));

    // Switched context: the target tenant, not the home tenant.
    let switched = AuthorizationContext::switched(
        principal(Role::Staff, f.tenant_a, "staff@worksmith.example"),
        f.tenant_b,
    );
    let quote = f.service.create(&switched, sample_quote()).await.unwrap();
    assert_eq!(quote.tenant_id, f.tenant_b);
}

#[tokio::test]
async fn client_admin_cannot_read_foreign_tenant_quote() {
    let f = setup().await;

    let quote = f
        .service
        .create(&staff_ctx(f.tenant_a), sample_quote())
        .await
        .unwrap();

    let foreign = AuthorizationContext::home(principal(
        Role::ClientAdmin,
        f.tenant_b,
        "admin@bravo.example",
    ));
    let err = f.service.get(&foreign, quote.id).await.unwrap_err();
    assert!(matches!(err, WorksmithError::Forbidden { .. }));

    // Staff with no override reads it fine, regardless of home tenant.
    let staff = staff_ctx(f.tenant_b);
    let fetched = f.service.get(&staff, quote.id).await.unwrap();
    assert_eq!(fetched.id, quote.id);
}

#[tokio::test]
async fn client_is_gated_on_contact_email() {
    let f = setup().await;

    let quote = f
        .service
        .create(&staff_ctx(f.tenant_a), sample_quote())
        .await
        .unwrap();

    // Same tenant, different email.
    let stranger =
        AuthorizationContext::home(principal(Role::Client, f.tenant_a, "other@example.com"));
    let err = f.service.get(&stranger, quote.id).await.unwrap_err();
    assert!(matches!(err, WorksmithError::Forbidden { .. }));

    // The contact themselves, with different casing.
    let owner = AuthorizationContext::home(principal(Role::Client, f.tenant_a, "Owner@Example.COM"));
    let fetched = f.service.get(&owner, quote.id).await.unwrap();
    assert_eq!(fetched.id, quote.id);
}

#[tokio::test]
async fn list_visibility_follows_context() {
    let f = setup().await;

    f.service
        .create(&staff_ctx(f.tenant_a), sample_quote())
        .await
        .unwrap();
    f.service
        .create(&staff_ctx(f.tenant_a), sample_quote())
        .await
        .unwrap();
    let staff_b = AuthorizationContext::switched(
        principal(Role::Staff, f.tenant_a, "staff@worksmith.example"),
        f.tenant_b,
    );
    f.service.create(&staff_b, sample_quote()).await.unwrap();

    // Unswitched staff sees every tenant's quotes.
    let all = f
        .service
        .list(&staff_ctx(f.tenant_a), Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.total, 3);

    // Switched staff sees only the target tenant.
    let scoped = f.service.list(&staff_b, Pagination::default()).await.unwrap();
    assert_eq!(scoped.total, 1);
    assert!(scoped.items.iter().all(|q| q.tenant_id == f.tenant_b));

    // A client admin sees only their own tenant.
    let admin = AuthorizationContext::home(principal(
        Role::ClientAdmin,
        f.tenant_a,
        "admin@alpha.example",
    ));
    let own = f.service.list(&admin, Pagination::default()).await.unwrap();
    assert_eq!(own.total, 2);
    assert!(own.items.iter().all(|q| q.tenant_id == f.tenant_a));
}

#[tokio::test]
async fn full_lifecycle_walk_publishes_each_step() {
    let f = setup().await;

    let quote = f
        .service
        .create(&staff_ctx(f.tenant_a), sample_quote())
        .await
        .unwrap();
    assert!(f.sink.kinds().is_empty(), "creating a draft is silent");

    drive(
        &f,
        quote.id,
        &[
            QuoteStatus::Submitted,
            QuoteStatus::InformationRequested,
            QuoteStatus::Submitted,
            QuoteStatus::Quoted,
            QuoteStatus::UnderDiscussion,
            QuoteStatus::Quoted,
            QuoteStatus::Approved,
            QuoteStatus::Converted,
        ],
    )
    .await;

    assert_eq!(
        f.sink.kinds(),
        vec![
            EventKind::Submitted,
            EventKind::InformationRequested,
            EventKind::Submitted,
            EventKind::Quoted,
            EventKind::UnderDiscussion,
            EventKind::Quoted,
            EventKind::Approved,
            EventKind::Converted,
        ]
    );

    let done = f
        .service
        .get(&staff_ctx(f.tenant_a), quote.id)
        .await
        .unwrap();
    assert_eq!(done.status, QuoteStatus::Converted);
    assert!(done.converted_to_work_order_id.is_some());
}

#[tokio::test]
async fn illegal_transition_is_rejected_and_silent() {
    let f = setup().await;

    let quote = f
        .service
        .create(&staff_ctx(f.tenant_a), sample_quote())
        .await
        .unwrap();

    let err = f
        .service
        .request_transition(&staff_ctx(f.tenant_a), quote.id, QuoteStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, WorksmithError::InvalidTransition { .. }));
    assert!(f.sink.kinds().is_empty());
}

#[tokio::test]
async fn lapsed_validity_blocks_approval() {
    let f = setup().await;

    let quote = f
        .service
        .create(
            &staff_ctx(f.tenant_a),
            CreateQuote {
                quote_valid_until: Some(f.now - Duration::days(1)),
                ..sample_quote()
            },
        )
        .await
        .unwrap();
    drive(&f, quote.id, &[QuoteStatus::Submitted, QuoteStatus::Quoted]).await;

    let err = f
        .service
        .request_transition(&staff_ctx(f.tenant_a), quote.id, QuoteStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, WorksmithError::QuoteExpired));

    // The quote can be re-quoted with a fresh window and then approved.
    f.service
        .request_transition(&staff_ctx(f.tenant_a), quote.id, QuoteStatus::Expired)
        .await
        .unwrap();
    f.service
        .request_transition(&staff_ctx(f.tenant_a), quote.id, QuoteStatus::Quoted)
        .await
        .unwrap();
    f.service
        .update(
            &staff_ctx(f.tenant_a),
            quote.id,
            UpdateQuote {
                quote_valid_until: Some(Some(f.now + Duration::days(14))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let approved = f
        .service
        .request_transition(&staff_ctx(f.tenant_a), quote.id, QuoteStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, QuoteStatus::Approved);
}

#[tokio::test]
async fn conversion_happens_exactly_once() {
    let f = setup().await;

    let quote = f
        .service
        .create(&staff_ctx(f.tenant_a), sample_quote())
        .await
        .unwrap();
    drive(
        &f,
        quote.id,
        &[
            QuoteStatus::Submitted,
            QuoteStatus::Quoted,
            QuoteStatus::Approved,
        ],
    )
    .await;

    let (converted, work_order) = f
        .service
        .convert_to_work_order(&staff_ctx(f.tenant_a), quote.id)
        .await
        .unwrap();
    assert_eq!(converted.status, QuoteStatus::Converted);
    assert_eq!(converted.converted_to_work_order_id, Some(work_order.id));
    assert_eq!(work_order.tenant_id, f.tenant_a);
    assert_eq!(work_order.quote_id, Some(quote.id));
    assert_eq!(work_order.authorized_email, "owner@example.com");

    // A repeat call is an error, never a silent success.
    let err = f
        .service
        .convert_to_work_order(&staff_ctx(f.tenant_a), quote.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorksmithError::AlreadyConverted));

    // Exactly one work order exists for the tenant.
    let work_orders = SurrealWorkOrderRepository::new(f.db.clone());
    let listed = work_orders
        .list(&TenantFilter::Tenant(f.tenant_a), Pagination::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 1);

    // One Converted event for the one successful conversion.
    let converted_events = f
        .sink
        .kinds()
        .into_iter()
        .filter(|k| *k == EventKind::Converted)
        .count();
    assert_eq!(converted_events, 1);
}

#[tokio::test]
async fn declined_is_terminal() {
    let f = setup().await;

    let quote = f
        .service
        .create(&staff_ctx(f.tenant_a), sample_quote())
        .await
        .unwrap();
    drive(
        &f,
        quote.id,
        &[
            QuoteStatus::Submitted,
            QuoteStatus::Quoted,
            QuoteStatus::Declined,
        ],
    )
    .await;

    for target in [
        QuoteStatus::Submitted,
        QuoteStatus::Quoted,
        QuoteStatus::Approved,
        QuoteStatus::Converted,
    ] {
        let err = f
            .service
            .request_transition(&staff_ctx(f.tenant_a), quote.id, target)
            .await
            .unwrap_err();
        assert!(
            matches!(err, WorksmithError::InvalidTransition { .. }),
            "Declined -> {target:?} must not succeed"
        );
    }
}

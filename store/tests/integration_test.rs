use std::sync::Arc;
use std::time::Duration;

use riziq_console::{
    guard, Backends, Command, ConsoleConfig, Deployment, Gate, LocalMutation, LocalStoreAdapter,
    Notice, RenderSink, Route, View, ViewController, ViewKind,
};
use riziq_store::db::{init_pool, DbPool};
use riziq_store::{DirectoryIdentity, SqliteCollection, SqliteDirectory, SqliteSlots};
use riziq_types::{Fields, Kind, Origin, RecordKey};
use serde_json::{json, Value};
use tokio::time::timeout;

const POLL: Duration = Duration::from_millis(10);

#[derive(Default)]
struct Recorder {
    renders: Vec<View>,
    notices: Vec<Notice>,
}

impl RenderSink for Recorder {
    fn render(&mut self, view: &View) {
        self.renders.push(view.clone());
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(fields) => fields,
        _ => panic!("expected an object"),
    }
}

async fn signed_in_admin(pool: &DbPool) -> Arc<DirectoryIdentity> {
    let directory = SqliteDirectory::new(pool.clone());
    let user = directory.create_user("admin@riziq.in").await.unwrap();
    directory
        .set_custom_claims(&user.uid, &fields(json!({ "admin": true })))
        .await
        .unwrap();

    let identity = Arc::new(DirectoryIdentity::new(directory));
    identity.sign_in("admin@riziq.in").await.unwrap();
    identity
}

async fn open(
    pool: &DbPool,
    identity: Arc<DirectoryIdentity>,
    view: ViewKind,
    config: &ConsoleConfig,
) -> ViewController<Recorder> {
    let backends = Backends::new(Arc::new(SqliteSlots::new(pool.clone(), POLL)))
        .with_collection(
            Kind::Application,
            Arc::new(SqliteCollection::new(pool.clone(), "applications", POLL)),
        )
        .with_collection(
            Kind::JobPosting,
            Arc::new(SqliteCollection::new(pool.clone(), "jobs", POLL)),
        );

    let Gate::Enter { session, .. } = guard(identity, Route::View(view)).await else {
        panic!("admin should pass the gate");
    };
    ViewController::open(session, view, &backends, config, Recorder::default())
        .await
        .unwrap()
}

async fn pump(controller: &mut ViewController<Recorder>) {
    let delivered = timeout(Duration::from_secs(2), controller.pump())
        .await
        .expect("no event arrived");
    assert!(delivered);
}

#[tokio::test]
async fn test_applications_follow_the_database() {
    let pool = init_pool("sqlite::memory:").await.unwrap();
    let identity = signed_in_admin(&pool).await;
    let site = SqliteCollection::new(pool.clone(), "applications", POLL);
    site.put(
        "a1",
        &fields(json!({ "fullName": "Older", "createdAt": "2024-03-01T09:00:00Z" })),
    )
    .await
    .unwrap();

    let mut controller = open(&pool, identity, ViewKind::Applications, &ConsoleConfig::default()).await;
    pump(&mut controller).await;
    assert_eq!(controller.current().len(), 1);

    site.put(
        "a2",
        &fields(json!({ "fullName": "Newer", "createdAt": "2024-03-02T09:00:00Z" })),
    )
    .await
    .unwrap();
    pump(&mut controller).await;

    let ids: Vec<_> = controller.current().rows().iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, ["a2", "a1"]);
}

#[tokio::test]
async fn test_status_change_round_trips() {
    let pool = init_pool("sqlite::memory:").await.unwrap();
    let identity = signed_in_admin(&pool).await;
    let site = SqliteCollection::new(pool.clone(), "applications", POLL);
    site.put(
        "a1",
        &fields(json!({ "fullName": "Amina", "status": "Viewed", "createdAt": "2024-03-01T09:00:00Z" })),
    )
    .await
    .unwrap();

    let mut controller = open(&pool, identity, ViewKind::Applications, &ConsoleConfig::default()).await;
    pump(&mut controller).await;

    let key = RecordKey::new(Kind::Application, Origin::Remote, "a1");
    controller
        .dispatch(Command::AdvanceStatus { key })
        .await
        .unwrap();
    pump(&mut controller).await;

    assert_eq!(controller.current().rows()[0].status.label(), "Shortlisted");
    assert_eq!(
        site.snapshot("createdAt").await.unwrap()[0].fields["status"],
        "Shortlisted"
    );
}

#[tokio::test]
async fn test_message_from_another_context() {
    let pool = init_pool("sqlite::memory:").await.unwrap();
    let identity = signed_in_admin(&pool).await;
    let config = ConsoleConfig {
        deployment: Deployment {
            applications: Origin::Local,
            jobs: Origin::Local,
        },
        ..ConsoleConfig::default()
    };

    let mut controller = open(&pool, identity, ViewKind::Messages, &config).await;

    let other_tab = LocalStoreAdapter::new(
        Arc::new(SqliteSlots::new(pool.clone(), POLL)),
        Kind::ContactMessage,
    );
    other_tab
        .mutate(LocalMutation::Insert(fields(json!({
            "name": "Omar",
            "email": "omar@example.com",
            "subject": "Visa",
        }))))
        .await
        .unwrap();

    pump(&mut controller).await;
    assert_eq!(controller.current().len(), 1);
    assert_eq!(
        controller.sink().notices.last(),
        Some(&Notice::info("New message received!"))
    );
}

#[tokio::test]
async fn test_non_admin_is_signed_out() {
    let pool = init_pool("sqlite::memory:").await.unwrap();
    let directory = SqliteDirectory::new(pool.clone());
    directory.create_user("visitor@example.com").await.unwrap();

    let identity = Arc::new(DirectoryIdentity::new(directory));
    identity.sign_in("visitor@example.com").await.unwrap();

    let gate = guard(identity.clone(), Route::Login).await;
    assert!(matches!(gate, Gate::Denied));
    assert!(riziq_console::IdentityProvider::current_user(identity.as_ref()).is_none());
}

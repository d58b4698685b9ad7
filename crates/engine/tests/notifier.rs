use std::time::Duration;

use api_types::{purchasing::PurchasingEvent, user::Role};
use sea_orm::Database;
use serde_json::Value;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

use engine::{
    CreatePurchasingCmd, DispatchOutcome, Engine, Money, NewItemCmd, Notifier, NotifierConfig,
    PurchasingRecord, SupplierCmd,
};
use migration::MigratorTrait;

async fn engine_with_notifier(config: NotifierConfig) -> (Engine, Notifier) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let notifier = Notifier::spawn(config).unwrap();
    let engine = Engine::builder()
        .database(db)
        .notifier(notifier.clone())
        .build()
        .await
        .unwrap();
    (engine, notifier)
}

fn record_event(record: &PurchasingRecord) -> PurchasingEvent {
    record.created_event(chrono::Utc::now())
}

fn config(default_url: Option<String>) -> NotifierConfig {
    NotifierConfig {
        default_url,
        timeout: Duration::from_secs(2),
        ..NotifierConfig::default()
    }
}

/// Returns a purchase command buying 3 units of a 10.00 item.
async fn seed(engine: &Engine) -> CreatePurchasingCmd {
    let user = engine
        .register_user("alice", "password123", Role::Staff)
        .await
        .unwrap();
    let supplier = engine
        .new_supplier(SupplierCmd::new("Acme", "sales@acme.test"))
        .await
        .unwrap();
    let item = engine
        .new_item(NewItemCmd::new("Item A", Money::new(10_00), supplier.id).stock(5))
        .await
        .unwrap();
    CreatePurchasingCmd::new(supplier.id, user.id).line(item.id, 3)
}

#[tokio::test]
async fn committed_purchase_is_posted_to_default_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, notifier) = engine_with_notifier(config(Some(format!("{}/hook", server.uri())))).await;
    let cmd = seed(&engine).await;
    let record = engine.create_purchasing(cmd).await.unwrap();
    notifier.shutdown().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["event"], "purchasing.created");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(body["purchasing"]["id"], record.purchasing.id);
    assert_eq!(body["purchasing"]["grandTotal"], "30.00");
    assert_eq!(body["purchasing"]["supplier"]["name"], "Acme");
    assert_eq!(body["purchasing"]["user"]["username"], "alice");
    assert_eq!(body["details"][0]["subTotal"], "30.00");
    assert_eq!(body["details"][0]["item"]["stock"], 8);
    assert_eq!(notifier.stats().delivered, 1);
}

#[tokio::test]
async fn request_override_wins_over_default() {
    let default_server = MockServer::start().await;
    let override_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&default_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/custom"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&override_server)
        .await;

    let (engine, notifier) = engine_with_notifier(config(Some(default_server.uri()))).await;
    let cmd = seed(&engine)
        .await
        .webhook_url(format!("{}/custom", override_server.uri()));
    engine.create_purchasing(cmd).await.unwrap();
    notifier.shutdown().await;

    assert_eq!(notifier.stats().delivered, 1);
}

#[tokio::test]
async fn failing_endpoint_does_not_affect_purchase() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (engine, notifier) = engine_with_notifier(config(Some(server.uri()))).await;
    let cmd = seed(&engine).await;
    let item_id = cmd.lines[0].item_id;
    let record = engine.create_purchasing(cmd).await.unwrap();
    notifier.shutdown().await;

    assert_eq!(record.purchasing.grand_total, Money::new(30_00));
    assert_eq!(engine.item(item_id).await.unwrap().stock, 8);
    let stats = notifier.stats();
    assert_eq!(stats.delivered, 0);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn unreachable_endpoint_is_counted_as_failure() {
    let (engine, notifier) =
        engine_with_notifier(config(Some("http://127.0.0.1:9/hook".to_string()))).await;
    let cmd = seed(&engine).await;
    engine.create_purchasing(cmd).await.unwrap();
    notifier.shutdown().await;

    assert_eq!(notifier.stats().failed, 1);
}

#[tokio::test]
async fn no_endpoint_skips_delivery() {
    let (engine, notifier) = engine_with_notifier(config(None)).await;
    let cmd = seed(&engine).await;
    engine.create_purchasing(cmd).await.unwrap();
    notifier.shutdown().await;

    let stats = notifier.stats();
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.delivered + stats.failed, 0);
}

#[tokio::test]
async fn dispatch_after_shutdown_is_dropped() {
    let (engine, notifier) = engine_with_notifier(config(Some("http://127.0.0.1:9".to_string()))).await;
    let cmd = seed(&engine).await;
    let record = engine.create_purchasing(cmd).await.unwrap();
    notifier.shutdown().await;

    let outcome = notifier.dispatch(None, record.created_event(chrono::Utc::now()));
    assert_eq!(outcome, DispatchOutcome::Dropped);
    assert_eq!(notifier.stats().dropped, 1);
}

#[tokio::test]
async fn slow_endpoint_times_out_without_affecting_purchase() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, notifier) = engine_with_notifier(NotifierConfig {
        default_url: Some(server.uri()),
        timeout: Duration::from_millis(200),
        ..NotifierConfig::default()
    })
    .await;
    let cmd = seed(&engine).await;
    let item_id = cmd.lines[0].item_id;
    let record = engine.create_purchasing(cmd).await.unwrap();
    notifier.shutdown().await;

    assert_eq!(record.purchasing.grand_total, Money::new(30_00));
    assert_eq!(engine.item(item_id).await.unwrap().stock, 8);
    let stats = notifier.stats();
    assert_eq!(stats.delivered, 0);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn saturated_worker_drops_events_beyond_capacity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(1)))
        .mount(&server)
        .await;
    let url = format!("{}/slow", server.uri());

    let (engine, notifier) = engine_with_notifier(NotifierConfig {
        default_url: None,
        timeout: Duration::from_secs(5),
        queue_capacity: 2,
    })
    .await;
    let cmd = seed(&engine).await;
    let record = engine.create_purchasing(cmd).await.unwrap();

    // Two deliveries start and hold the worker at its limit.
    for _ in 0..2 {
        assert_eq!(notifier.dispatch(Some(&url), record_event(&record)), DispatchOutcome::Queued);
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    // Two more wait in the queue, the next one has nowhere to go.
    for _ in 0..2 {
        assert_eq!(notifier.dispatch(Some(&url), record_event(&record)), DispatchOutcome::Queued);
    }
    assert_eq!(notifier.dispatch(Some(&url), record_event(&record)), DispatchOutcome::Dropped);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(server.received_requests().await.unwrap().len() <= 2);

    notifier.shutdown().await;
    let stats = notifier.stats();
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.delivered, 4);
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

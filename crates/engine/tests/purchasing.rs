use std::sync::Arc;

use api_types::user::Role;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CreatePurchasingCmd, Engine, EngineError, ErrorKind, Item, Money, NewItemCmd, SupplierCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

struct Fixture {
    user_id: i32,
    supplier_id: i32,
    item_a: Item,
    item_b: Item,
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db, path)
}

/// Supplier with item A (price 10.00, stock 5) and item B (price 5.00,
/// stock 2), plus one staff user.
async fn seed(engine: &Engine) -> Fixture {
    let user = engine
        .register_user("alice", "password123", Role::Staff)
        .await
        .unwrap();
    let supplier = engine
        .new_supplier(SupplierCmd::new("Acme", "sales@acme.test").address("Main St 1"))
        .await
        .unwrap();
    let item_a = engine
        .new_item(NewItemCmd::new("Item A", Money::new(10_00), supplier.id).stock(5))
        .await
        .unwrap();
    let item_b = engine
        .new_item(NewItemCmd::new("Item B", Money::new(5_00), supplier.id).stock(2))
        .await
        .unwrap();
    Fixture {
        user_id: user.id,
        supplier_id: supplier.id,
        item_a,
        item_b,
    }
}

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn successful_purchase_prices_lines_and_adds_stock() {
    let (engine, db) = engine_with_db().await;
    let fx = seed(&engine).await;

    let record = engine
        .create_purchasing(
            CreatePurchasingCmd::new(fx.supplier_id, fx.user_id)
                .line(fx.item_a.id, 3)
                .line(fx.item_b.id, 4),
        )
        .await
        .unwrap();

    assert_eq!(record.purchasing.grand_total, Money::new(50_00));
    assert_eq!(record.purchasing.grand_total.to_string(), "50.00");
    assert_eq!(record.purchasing.supplier_id, fx.supplier_id);
    assert_eq!(record.purchasing.user_id, fx.user_id);
    assert_eq!(record.supplier.name, "Acme");
    assert_eq!(record.user.username, "alice");

    assert_eq!(record.details.len(), 2);
    assert_eq!(record.details[0].detail.item_id, fx.item_a.id);
    assert_eq!(record.details[0].detail.sub_total, Money::new(30_00));
    assert_eq!(record.details[0].item.stock, 8);
    assert_eq!(record.details[1].detail.item_id, fx.item_b.id);
    assert_eq!(record.details[1].detail.sub_total, Money::new(20_00));
    assert_eq!(record.details[1].item.stock, 6);

    assert_eq!(engine.item(fx.item_a.id).await.unwrap().stock, 8);
    assert_eq!(engine.item(fx.item_b.id).await.unwrap().stock, 6);
    assert_eq!(count(&db, "purchasings").await, 1);
    assert_eq!(count(&db, "purchasing_details").await, 2);
}

#[tokio::test]
async fn unknown_item_rejects_whole_request() {
    let (engine, db) = engine_with_db().await;
    let fx = seed(&engine).await;

    let err = engine
        .create_purchasing(
            CreatePurchasingCmd::new(fx.supplier_id, fx.user_id)
                .line(fx.item_a.id, 3)
                .line(fx.item_b.id, 4)
                .line(999, 1),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(engine.item(fx.item_a.id).await.unwrap().stock, 5);
    assert_eq!(engine.item(fx.item_b.id).await.unwrap().stock, 2);
    assert_eq!(count(&db, "purchasings").await, 0);
    assert_eq!(count(&db, "purchasing_details").await, 0);
}

#[tokio::test]
async fn item_of_other_supplier_is_rejected_before_writing() {
    let (engine, db) = engine_with_db().await;
    let fx = seed(&engine).await;
    let other = engine
        .new_supplier(SupplierCmd::new("Globex", "buy@globex.test"))
        .await
        .unwrap();
    let foreign = engine
        .new_item(NewItemCmd::new("Widget", Money::new(1_00), other.id).stock(1))
        .await
        .unwrap();

    let err = engine
        .create_purchasing(
            CreatePurchasingCmd::new(fx.supplier_id, fx.user_id)
                .line(fx.item_a.id, 1)
                .line(foreign.id, 1),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::SupplierMismatch {
            item_id: foreign.id,
            supplier_id: fx.supplier_id
        }
    );
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(engine.item(foreign.id).await.unwrap().stock, 1);
    assert_eq!(engine.item(fx.item_a.id).await.unwrap().stock, 5);
    assert_eq!(count(&db, "purchasings").await, 0);
}

#[tokio::test]
async fn shape_errors_are_validation() {
    let (engine, _db) = engine_with_db().await;
    let fx = seed(&engine).await;

    let empty = engine
        .create_purchasing(CreatePurchasingCmd::new(fx.supplier_id, fx.user_id))
        .await
        .unwrap_err();
    assert_eq!(empty.kind(), ErrorKind::Validation);

    let zero = engine
        .create_purchasing(CreatePurchasingCmd::new(fx.supplier_id, fx.user_id).line(fx.item_a.id, 0))
        .await
        .unwrap_err();
    assert_eq!(zero.kind(), ErrorKind::Validation);

    let unknown_supplier = engine
        .create_purchasing(CreatePurchasingCmd::new(777, fx.user_id).line(fx.item_a.id, 1))
        .await
        .unwrap_err();
    assert_eq!(unknown_supplier.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn stored_price_wins_and_later_changes_do_not_rewrite_history() {
    let (engine, _db) = engine_with_db().await;
    let fx = seed(&engine).await;

    let first = engine
        .create_purchasing(CreatePurchasingCmd::new(fx.supplier_id, fx.user_id).line(fx.item_b.id, 2))
        .await
        .unwrap();
    assert_eq!(first.purchasing.grand_total, Money::new(10_00));

    engine
        .update_item(
            fx.item_b.id,
            engine::UpdateItemCmd {
                name: "Item B".to_string(),
                price: Money::new(7_50),
                supplier_id: fx.supplier_id,
            },
        )
        .await
        .unwrap();

    let second = engine
        .create_purchasing(CreatePurchasingCmd::new(fx.supplier_id, fx.user_id).line(fx.item_b.id, 2))
        .await
        .unwrap();
    assert_eq!(second.purchasing.grand_total, Money::new(15_00));

    let reloaded = engine.purchasing(first.purchasing.id).await.unwrap();
    assert_eq!(reloaded.purchasing.grand_total, Money::new(10_00));
    assert_eq!(reloaded.details[0].detail.sub_total, Money::new(10_00));
}

#[tokio::test]
async fn repeated_item_lines_each_add_stock() {
    let (engine, _db) = engine_with_db().await;
    let fx = seed(&engine).await;

    let record = engine
        .create_purchasing(
            CreatePurchasingCmd::new(fx.supplier_id, fx.user_id)
                .line(fx.item_a.id, 1)
                .line(fx.item_a.id, 2),
        )
        .await
        .unwrap();

    assert_eq!(record.details.len(), 2);
    assert_eq!(record.purchasing.grand_total, Money::new(30_00));
    assert_eq!(engine.item(fx.item_a.id).await.unwrap().stock, 8);
}

#[tokio::test]
async fn purchasings_are_listed_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let fx = seed(&engine).await;

    let mut ids = Vec::new();
    for qty in 1..=3 {
        let record = engine
            .create_purchasing(CreatePurchasingCmd::new(fx.supplier_id, fx.user_id).line(fx.item_a.id, qty))
            .await
            .unwrap();
        ids.push(record.purchasing.id);
    }

    let listed: Vec<_> = engine
        .purchasings()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    ids.reverse();
    assert_eq!(listed, ids);

    let missing = engine.purchasing(12345).await.unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn referenced_catalog_rows_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;
    let fx = seed(&engine).await;
    engine
        .create_purchasing(CreatePurchasingCmd::new(fx.supplier_id, fx.user_id).line(fx.item_a.id, 1))
        .await
        .unwrap();

    let err = engine.delete_item(fx.item_a.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let err = engine.delete_supplier(fx.supplier_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    engine.delete_item(fx.item_b.id).await.unwrap();
    assert_eq!(
        engine.item(fx.item_b.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn duplicate_username_and_bad_credentials() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register_user("bob", "hunter2hunter2", Role::Admin)
        .await
        .unwrap();

    let dup = engine
        .register_user("bob", "anotherpass", Role::Staff)
        .await
        .unwrap_err();
    assert_eq!(dup.kind(), ErrorKind::Conflict);

    let user = engine
        .verify_credentials("bob", "hunter2hunter2")
        .await
        .unwrap();
    assert_eq!(user.role, Role::Admin);

    let bad = engine.verify_credentials("bob", "wrong").await.unwrap_err();
    assert_eq!(bad.kind(), ErrorKind::Unauthorized);
    let nobody = engine.verify_credentials("carol", "whatever").await.unwrap_err();
    assert_eq!(nobody.kind(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn concurrent_purchases_of_same_item_do_not_lose_stock() {
    let (engine, db, path) = engine_with_file_db().await;
    let fx = seed(&engine).await;
    let engine = Arc::new(engine);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        let cmd = CreatePurchasingCmd::new(fx.supplier_id, fx.user_id).line(fx.item_a.id, 2);
        handles.push(tokio::spawn(async move { engine.create_purchasing(cmd).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(engine.item(fx.item_a.id).await.unwrap().stock, 5 + 8 * 2);
    assert_eq!(count(&db, "purchasings").await, 8);

    db.close().await.unwrap();
    let _ = std::fs::remove_file(path);
}

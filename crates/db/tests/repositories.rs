//! Repository behaviour against a real MySQL database.

use chrono::NaiveDate;
use mj_core::packing::AutoSaveKey;
use mj_core::types::DbId;
use mj_db::models::logistic_payment::UpsertLogisticPayment;
use mj_db::models::packing_list::CreatePackingListItem;
use mj_core::payment::{AdditionalCostItem, PaymentSchedule};
use mj_db::models::project::{CreateProject, PaymentUpdate, UpdateOutcome, UpdateProject};
use mj_db::models::project_image::CreateProjectImage;
use mj_db::models::user::CreateUser;
use mj_db::models::warehouse::CreateWarehouseEntry;
use mj_db::repositories::{
    LogisticPaymentRepo, PackingListRepo, ProjectImageRepo, ProjectRepo, UserRepo, WarehouseRepo,
};
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use uuid::Uuid;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

async fn seed_user(pool: &MySqlPool) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            username: "owner".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            name: "Owner".to_string(),
            email: None,
            is_admin: true,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_project(pool: &MySqlPool, user_id: DbId, quantity: i32) -> DbId {
    ProjectRepo::create(
        pool,
        &CreateProject {
            name: "Acrylic stand".to_string(),
            quantity,
            target_price: None,
            description: None,
            user_id: None,
        },
        user_id,
    )
    .await
    .unwrap()
    .id
}

fn packing_item(code: &str, product: &str, client_id: Option<Uuid>) -> CreatePackingListItem {
    CreatePackingListItem {
        client_id,
        project_id: None,
        pl_date: date(1),
        packing_code: code.to_string(),
        box_count: 2,
        product_name: product.to_string(),
        product_sku: None,
        product_image: None,
        packaging_method: None,
        packaging_count: 0,
        quantity_per_box: 10,
        logistic_company: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a MySQL DATABASE_URL"]
async fn project_update_checks_version(pool: MySqlPool) {
    let user_id = seed_user(&pool).await;
    let id = seed_project(&pool, user_id, 10).await;

    let rename = |version| UpdateProject {
        name: Some("Renamed".to_string()),
        version,
        ..Default::default()
    };

    let outcome = ProjectRepo::update(&pool, id, &rename(Some(1))).await.unwrap();
    let UpdateOutcome::Updated(project) = outcome else {
        panic!("first update should apply");
    };
    assert_eq!(project.version, 2);
    assert_eq!(project.name, "Renamed");

    let outcome = ProjectRepo::update(&pool, id, &rename(Some(1))).await.unwrap();
    assert!(matches!(
        outcome,
        UpdateOutcome::VersionConflict { current_version: 2 }
    ));

    let outcome = ProjectRepo::update(&pool, 9_999, &rename(None)).await.unwrap();
    assert!(matches!(outcome, UpdateOutcome::NotFound));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a MySQL DATABASE_URL"]
async fn quantity_change_rederives_payment_amounts(pool: MySqlPool) {
    let user_id = seed_user(&pool).await;
    let id = seed_project(&pool, user_id, 100).await;

    // 2.00 x 100 = 200.00, fee 10% = 20.00, + 5.00 shipping + 3.00 extra.
    let payment = |quantity| PaymentUpdate {
        quantity,
        unit_price: Decimal::new(200, 2),
        fee_rate: Decimal::new(10, 0),
        fee: Decimal::new(2000, 2),
        subtotal: Decimal::new(20000, 2),
        shipping_cost: Decimal::new(500, 2),
        total_amount: Decimal::new(22800, 2),
        additional_costs: vec![AdditionalCostItem {
            description: "Mold".to_string(),
            cost: Decimal::new(300, 2),
        }],
        payment_schedule: PaymentSchedule::default(),
        version: None,
    };
    let outcome = ProjectRepo::update_payment(&pool, id, &payment(100)).await.unwrap();
    assert!(matches!(outcome, UpdateOutcome::Updated(_)));

    let resize = UpdateProject {
        quantity: Some(500),
        ..Default::default()
    };
    let UpdateOutcome::Updated(project) = ProjectRepo::update(&pool, id, &resize).await.unwrap()
    else {
        panic!("quantity change should apply");
    };
    assert_eq!(project.quantity, 500);
    assert_eq!(project.subtotal, Some(Decimal::new(100000, 2)));
    assert_eq!(project.fee, Some(Decimal::new(10000, 2)));
    assert_eq!(project.total_amount, Some(Decimal::new(110800, 2)));

    // Amounts computed for the old quantity are refused.
    let outcome = ProjectRepo::update_payment(&pool, id, &payment(100)).await.unwrap();
    assert!(matches!(outcome, UpdateOutcome::VersionConflict { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a MySQL DATABASE_URL"]
async fn quantity_change_without_payment_leaves_amounts_empty(pool: MySqlPool) {
    let user_id = seed_user(&pool).await;
    let id = seed_project(&pool, user_id, 10).await;

    let resize = UpdateProject {
        quantity: Some(20),
        ..Default::default()
    };
    let UpdateOutcome::Updated(project) = ProjectRepo::update(&pool, id, &resize).await.unwrap()
    else {
        panic!("quantity change should apply");
    };
    assert_eq!(project.quantity, 20);
    assert_eq!(project.subtotal, None);
    assert_eq!(project.total_amount, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a MySQL DATABASE_URL"]
async fn auto_save_matches_natural_key_and_client_id(pool: MySqlPool) {
    let user_id = seed_user(&pool).await;

    let item = packing_item("A-1", "Cup", None);
    let key = AutoSaveKey::resolve(None, item.pl_date, &item.packing_code, &item.product_name);
    let first = PackingListRepo::auto_save(&pool, &key, &item, false, user_id)
        .await
        .unwrap();
    assert!(first.created);

    let mut edited = item.clone();
    edited.box_count = 5;
    let second = PackingListRepo::auto_save(&pool, &key, &edited, false, user_id)
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.item.id, first.item.id);
    assert_eq!(second.item.box_count, 5);

    let client_id = Uuid::new_v4();
    let tracked = packing_item("A-1", "Plate", Some(client_id));
    let key = AutoSaveKey::ClientId(client_id);
    let created = PackingListRepo::auto_save(&pool, &key, &tracked, false, user_id)
        .await
        .unwrap();
    let updated = PackingListRepo::auto_save(&pool, &key, &tracked, false, user_id)
        .await
        .unwrap();
    assert!(created.created);
    assert_eq!(updated.item.id, created.item.id);
    assert_eq!(
        updated.item.client_id.as_deref(),
        Some(client_id.to_string().as_str())
    );

    let rows = PackingListRepo::list(&pool, &Default::default()).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a MySQL DATABASE_URL"]
async fn logistic_payments_overwrite_and_cascade_with_group(pool: MySqlPool) {
    let user_id = seed_user(&pool).await;
    let rows = PackingListRepo::create_many(&pool, &[packing_item("B-7", "Pin", None)], user_id)
        .await
        .unwrap();
    let packing_list_id = rows[0].id;

    let fee = |amount: i64, is_paid| UpsertLogisticPayment {
        packing_list_id,
        packing_code: "B-7".to_string(),
        box_no: 1,
        box_fee: Decimal::new(amount, 2),
        is_paid,
    };

    LogisticPaymentRepo::upsert_many(&pool, &[fee(500, false)]).await.unwrap();
    LogisticPaymentRepo::upsert_many(&pool, &[fee(650, true)]).await.unwrap();

    let listed = LogisticPaymentRepo::list_by_date(&pool, date(1)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].box_fee, Decimal::new(650, 2));
    assert!(listed[0].is_paid);
    assert_eq!(listed[0].product_name, "Pin");

    let removed = PackingListRepo::delete_group(&pool, date(1), " B-7 ").await.unwrap();
    assert_eq!(removed, 1);
    assert!(LogisticPaymentRepo::all_fees(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a MySQL DATABASE_URL"]
async fn deleting_project_cascades_and_unlinks_packing_rows(pool: MySqlPool) {
    let user_id = seed_user(&pool).await;
    let project_id = seed_project(&pool, user_id, 100).await;

    ProjectImageRepo::create_many(
        &pool,
        &[CreateProjectImage {
            project_id,
            file_name: "a.png".to_string(),
            original_name: "front.png".to_string(),
            file_path: "project/mj/1/images/a.png".to_string(),
            file_size: 3,
            sha256: "0".repeat(64),
        }],
    )
    .await
    .unwrap();

    for quantity in [30, 45] {
        WarehouseRepo::create_entry(
            &pool,
            &CreateWarehouseEntry {
                project_id,
                entry_date: date(3),
                quantity,
                note: None,
            },
            user_id,
        )
        .await
        .unwrap();
    }
    assert_eq!(WarehouseRepo::received_total(&pool, project_id).await.unwrap(), 75);

    let with_received = ProjectRepo::find_with_received(&pool, project_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(with_received.received_quantity, 75);

    let mut linked = packing_item("C-1", "Mug", None);
    linked.project_id = Some(project_id);
    let packing = PackingListRepo::create_many(&pool, &[linked], user_id).await.unwrap();

    let paths = ProjectRepo::delete(&pool, project_id).await.unwrap().unwrap();
    assert_eq!(paths, vec!["project/mj/1/images/a.png".to_string()]);

    assert!(ProjectRepo::find_by_id(&pool, project_id).await.unwrap().is_none());
    assert_eq!(WarehouseRepo::received_total(&pool, project_id).await.unwrap(), 0);
    let survivor = PackingListRepo::find_by_id(&pool, packing[0].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(survivor.project_id, None);

    assert!(ProjectRepo::delete(&pool, project_id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a MySQL DATABASE_URL"]
async fn shrinking_box_count_drops_fees_for_removed_boxes(pool: MySqlPool) {
    let user_id = seed_user(&pool).await;
    let mut item = packing_item("D-2", "Badge", None);
    item.box_count = 3;
    let key = AutoSaveKey::resolve(None, item.pl_date, &item.packing_code, &item.product_name);
    let saved = PackingListRepo::auto_save(&pool, &key, &item, false, user_id)
        .await
        .unwrap();

    let fees: Vec<_> = (1..=3)
        .map(|box_no| UpsertLogisticPayment {
            packing_list_id: saved.item.id,
            packing_code: "D-2".to_string(),
            box_no,
            box_fee: Decimal::new(400, 2),
            is_paid: false,
        })
        .collect();
    LogisticPaymentRepo::upsert_many(&pool, &fees).await.unwrap();

    item.box_count = 1;
    PackingListRepo::auto_save(&pool, &key, &item, false, user_id)
        .await
        .unwrap();

    let listed = LogisticPaymentRepo::list_by_date(&pool, date(1)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].box_no, 1);
    assert_eq!(LogisticPaymentRepo::all_fees(&pool).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a MySQL DATABASE_URL"]
async fn image_batch_is_recorded_all_or_nothing(pool: MySqlPool) {
    let user_id = seed_user(&pool).await;
    let project_id = seed_project(&pool, user_id, 10).await;

    let image = |project_id, name: &str| CreateProjectImage {
        project_id,
        file_name: name.to_string(),
        original_name: name.to_string(),
        file_path: format!("project/mj/{project_id}/images/{name}"),
        file_size: 3,
        sha256: "0".repeat(64),
    };

    // The second row references a project that does not exist.
    let result =
        ProjectImageRepo::create_many(&pool, &[image(project_id, "a.png"), image(9_999, "b.png")])
            .await;
    assert!(result.is_err());
    assert!(ProjectImageRepo::list_by_project(&pool, project_id)
        .await
        .unwrap()
        .is_empty());

    let images =
        ProjectImageRepo::create_many(&pool, &[image(project_id, "a.png"), image(project_id, "b.png")])
            .await
            .unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[1].original_name, "b.png");
}

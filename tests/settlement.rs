use commissiond::{
	commission::*,
	common::*,
	db::{Error, PersistenceHandle},
	entity::commission as commission_entity,
	network::register_member,
	report,
	test::*,
};
use sea_orm::{EntityTrait, PaginatorTrait};


#[ctor::ctor]
fn initialize() { env_logger::init(); }

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_settlement_pays_once() {
	let db = load_database("concurrent-settlement").await;
	let root = register_member(&db, "root", None).await.unwrap();
	let left = place(&db, "left", root, NodePosition::Left).await;
	let right = place(&db, "right", root, NodePosition::Right).await;
	let package = package(&db, "basic", 10_000).await;
	paid_purchase(&db, right, package).await;
	let purchase = paid_purchase(&db, left, package).await;

	let (db1, db2) = (db.clone(), db.clone());
	let (r1, r2) = tokio::join!(
		tokio::spawn(async move { settle_purchase(&db1, purchase).await }),
		tokio::spawn(async move { settle_purchase(&db2, purchase).await })
	);
	let results = [r1.unwrap(), r2.unwrap()];
	let successes: Vec<&CommissionPlan> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
	assert_eq!(successes.len(), 1, "exactly one settlement must succeed");
	let plan = successes[0];

	// A level commission and a binary bonus for the root
	assert_eq!(plan.total(), 1_000 + 1_000);
	let stored = commission_entity::Entity::find()
		.count(db.inner())
		.await
		.unwrap();
	assert_eq!(stored, 2);

	let earnings = report::node_earnings(&db, root).await.unwrap();
	assert_eq!(earnings.total, 2_000);
	assert_eq!(earnings.binary_bonus_total, 1_000);
}

#[tokio::test]
async fn test_settled_purchases_keep_counting_as_volume() {
	let db = load_database("settled-volume").await;
	let root = register_member(&db, "root", None).await.unwrap();
	let left = place(&db, "left", root, NodePosition::Left).await;
	let right = place(&db, "right", root, NodePosition::Right).await;
	let package = package(&db, "basic", 10_000).await;

	let p1 = paid_purchase(&db, left, package).await;
	let plan = settle_purchase(&db, p1).await.unwrap();
	assert_eq!(plan.binary_bonus, None);

	let p2 = paid_purchase(&db, right, package).await;
	let plan = settle_purchase(&db, p2).await.unwrap();
	let bonus = plan.binary_bonus.expect("no binary bonus");
	assert_eq!(bonus.node_id, root);
	assert_eq!(bonus.node_position, NodePosition::Right);
	assert_eq!(bonus.amount, 1_000);

	let e = settle_purchase(&db, p2).await.unwrap_err();
	assert!(matches!(*e, Error::PurchaseAlreadySettled(_)));
}

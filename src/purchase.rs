//! The package catalogue, and the purchases that nodes make from it.

use log::*;
use sea_orm::{prelude::*, ActiveValue::*};

use crate::{
	common::*,
	db::{self, Database, Error, PersistenceHandle},
	entity::*,
	trace,
};


pub async fn create_package(db: &Database, name: &str, price: Amount) -> db::Result<package::Model> {
	if price <= 0 {
		return trace::err(Error::InvalidAmount(price));
	}
	let existing = package::Entity::find()
		.filter(package::Column::Name.eq(name))
		.count(db.inner())
		.await?;
	if existing > 0 {
		return trace::err(Error::PackageNameTaken(name.to_owned()));
	}

	let record = package::ActiveModel {
		id: NotSet,
		name: Set(name.to_owned()),
		price: Set(price),
		is_active: Set(true),
	};
	let package = record.insert(db.inner()).await?;
	info!("Created package {} ({}) at {}.", package.id, name, price);
	Ok(package)
}

/// Takes a package out of the catalogue. Existing purchases are not affected.
pub async fn deactivate_package(db: &Database, package_id: i64) -> db::Result<()> {
	let package = match package::Entity::find_by_id(package_id).one(db.inner()).await? {
		Some(p) => p,
		None => return trace::err(Error::PackageNotFound(package_id)),
	};
	let mut record: package::ActiveModel = package.into();
	record.is_active = Set(false);
	record.update(db.inner()).await?;
	Ok(())
}

/// Records the purchase of a package by a node. The purchase starts out
/// unpaid, at the price the package has right now.
pub async fn purchase_package(
	db: &Database, node_id: i64, package_id: i64,
) -> db::Result<node_package::Model> {
	match db.find_node(node_id).await? {
		None => return trace::err(Error::NodeNotFound(node_id)),
		Some(n) if n.status == NodeStatus::Suspended => {
			return trace::err(Error::NodeSuspended(node_id))
		}
		Some(_) => {}
	}
	let package = match package::Entity::find_by_id(package_id).one(db.inner()).await? {
		Some(p) => p,
		None => return trace::err(Error::PackageNotFound(package_id)),
	};
	if !package.is_active {
		return trace::err(Error::PackageInactive(package_id));
	}

	let record = node_package::ActiveModel {
		id: NotSet,
		node_id: Set(node_id),
		package_id: Set(package_id),
		price: Set(package.price),
		is_paid: Set(false),
		is_settled: Set(false),
		created: Set(current_timestamp()),
	};
	let purchase = record.insert(db.inner()).await?;
	debug!(
		"Node {} purchased package {} as purchase {}.",
		node_id, package_id, purchase.id
	);
	Ok(purchase)
}

/// Marks a purchase as paid. Marking an already paid purchase does nothing.
pub async fn mark_purchase_paid(db: &Database, purchase_id: i64) -> db::Result<node_package::Model> {
	let purchase = match db.find_purchase(purchase_id).await? {
		Some(p) => p,
		None => return trace::err(Error::PurchaseNotFound(purchase_id)),
	};
	if purchase.is_paid {
		return Ok(purchase);
	}

	let mut record: node_package::ActiveModel = purchase.into();
	record.is_paid = Set(true);
	let purchase = record.update(db.inner()).await?;
	info!("Purchase {} has been paid.", purchase_id);
	Ok(purchase)
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::{network, test};

	#[tokio::test]
	async fn test_purchase_snapshots_price() {
		let db = test::load_database("purchase-price").await;
		let node = network::register_member(&db, "buyer", None).await.unwrap();
		let package = create_package(&db, "gold", 20_000).await.unwrap();

		let purchase = purchase_package(&db, node, package.id).await.unwrap();
		assert_eq!(purchase.price, 20_000);
		assert!(!purchase.is_paid);
		assert!(!purchase.is_settled);

		let paid = mark_purchase_paid(&db, purchase.id).await.unwrap();
		assert!(paid.is_paid);
		// Idempotent
		assert!(mark_purchase_paid(&db, purchase.id).await.unwrap().is_paid);
	}

	#[tokio::test]
	async fn test_invalid_packages() {
		let db = test::load_database("purchase-invalid").await;
		let node = network::register_member(&db, "buyer", None).await.unwrap();

		let e = create_package(&db, "free", 0).await.unwrap_err();
		assert!(matches!(*e, Error::InvalidAmount(0)));

		let package = create_package(&db, "silver", 1_000).await.unwrap();
		let e = create_package(&db, "silver", 2_000).await.unwrap_err();
		assert!(matches!(*e, Error::PackageNameTaken(_)));

		deactivate_package(&db, package.id).await.unwrap();
		let e = purchase_package(&db, node, package.id).await.unwrap_err();
		assert!(matches!(*e, Error::PackageInactive(_)));

		let e = purchase_package(&db, node, package.id + 100).await.unwrap_err();
		assert!(matches!(*e, Error::PackageNotFound(_)));
		let e = purchase_package(&db, node + 100, package.id).await.unwrap_err();
		assert!(matches!(*e, Error::NodeNotFound(_)));
		let e = mark_purchase_paid(&db, 12345).await.unwrap_err();
		assert!(matches!(*e, Error::PurchaseNotFound(12345)));
	}

	#[tokio::test]
	async fn test_suspended_node_cannot_purchase() {
		let db = test::load_database("purchase-suspended").await;
		let node = network::register_member(&db, "buyer", None).await.unwrap();
		let package = create_package(&db, "gold", 20_000).await.unwrap();

		network::set_node_status(&db, node, NodeStatus::Suspended)
			.await
			.unwrap();
		let e = purchase_package(&db, node, package.id).await.unwrap_err();
		assert!(matches!(*e, Error::NodeSuspended(_)));

		network::set_node_status(&db, node, NodeStatus::Active)
			.await
			.unwrap();
		assert!(purchase_package(&db, node, package.id).await.is_ok());
	}
}

use sea_orm::{prelude::*, QueryOrder};
use serde::Serialize;

use crate::{
	common::*,
	db::{self, Error, PersistenceHandle},
	entity::*,
	trace,
};


#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Earnings {
	pub node_id: i64,
	pub total: Amount,
	pub level_total: Amount,
	pub binary_bonus_total: Amount,
	pub commission_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommissionRecord {
	pub id: i64,
	pub purchase_id: i64,
	pub kind: CommissionKind,
	pub level: Option<i32>,
	pub amount: Amount,
	pub reason: String,
	pub created: i64,
}


/// Loads all commissions ever paid out to the given node, newest first.
pub async fn list_commissions<H>(handle: &H, node_id: i64) -> db::Result<Vec<CommissionRecord>>
where
	H: PersistenceHandle + Sync,
{
	if handle.find_node(node_id).await?.is_none() {
		return trace::err(Error::NodeNotFound(node_id));
	}

	let results = commission::Entity::find()
		.filter(commission::Column::NodeId.eq(node_id))
		.order_by_desc(commission::Column::Created)
		.order_by_desc(commission::Column::Id)
		.all(handle.inner())
		.await?;
	Ok(results.into_iter().map(CommissionRecord::from).collect())
}

pub async fn node_earnings<H>(handle: &H, node_id: i64) -> db::Result<Earnings>
where
	H: PersistenceHandle + Sync,
{
	let commissions = list_commissions(handle, node_id).await?;

	let total_of = |kind: CommissionKind| -> db::Result<Amount> {
		let amounts = commissions.iter().filter(|c| c.kind == kind).map(|c| c.amount);
		match checked_sum(amounts) {
			Some(total) => Ok(total),
			None => trace::err(Error::AmountOverflow(format!(
				"the commissions of node {}",
				node_id
			))),
		}
	};
	let level_total = total_of(CommissionKind::Level)?;
	let binary_bonus_total = total_of(CommissionKind::BinaryBonus)?;
	let total = match level_total.checked_add(binary_bonus_total) {
		Some(t) => t,
		None => return trace::err(Error::AmountOverflow(format!("the earnings of node {}", node_id))),
	};

	let earnings = Earnings {
		node_id,
		total,
		level_total,
		binary_bonus_total,
		commission_count: commissions.len(),
	};
	Ok(earnings)
}


impl From<commission::Model> for CommissionRecord {
	fn from(other: commission::Model) -> Self {
		Self {
			id: other.id,
			purchase_id: other.node_package_id,
			kind: other.kind,
			level: other.level,
			amount: other.amount,
			reason: other.reason,
			created: other.created,
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use sea_orm::ActiveValue::*;

	use crate::{commission::settle_purchase, network::register_member, purchase, test};

	#[tokio::test]
	async fn test_earnings_add_up() {
		let db = test::load_database("report-earnings").await;
		let root = register_member(&db, "root", None).await.unwrap();
		let left = test::place(&db, "left", root, NodePosition::Left).await;
		let right = test::place(&db, "right", root, NodePosition::Right).await;
		let package = test::package(&db, "basic", 10_000).await;

		let p1 = test::paid_purchase(&db, left, package).await;
		settle_purchase(&db, p1).await.unwrap();
		let p2 = test::paid_purchase(&db, right, package).await;
		settle_purchase(&db, p2).await.unwrap();

		let earnings = node_earnings(&db, root).await.unwrap();
		// Two level commissions, and a bonus on the second purchase only
		assert_eq!(earnings.level_total, 2_000);
		assert_eq!(earnings.binary_bonus_total, 1_000);
		assert_eq!(earnings.total, 3_000);
		assert_eq!(earnings.commission_count, 3);

		let records = list_commissions(&db, root).await.unwrap();
		assert_eq!(records.len(), 3);
		assert_eq!(records[0].purchase_id, p2);
		assert!(list_commissions(&db, left).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_earnings_overflow() {
		let db = test::load_database("report-overflow").await;
		let node = register_member(&db, "whale", None).await.unwrap();
		let package = test::package(&db, "basic", 10_000).await;
		let purchase = purchase::purchase_package(&db, node, package)
			.await
			.unwrap();

		for _ in 0..2 {
			let record = commission::ActiveModel {
				id: NotSet,
				node_package_id: Set(purchase.id),
				node_id: Set(node),
				kind: Set(CommissionKind::Level),
				level: Set(Some(1)),
				amount: Set(i64::MAX / 2 + 1),
				reason: Set("Level 1 commission".into()),
				created: Set(current_timestamp()),
			};
			commission::Entity::insert(record)
				.exec(db.inner())
				.await
				.unwrap();
		}

		let e = node_earnings(&db, node).await.unwrap_err();
		assert!(matches!(*e, Error::AmountOverflow(_)));
		assert_eq!(list_commissions(&db, node).await.unwrap().len(), 2);
	}

	#[tokio::test]
	async fn test_unknown_node() {
		let db = test::load_database("report-unknown").await;
		let e = node_earnings(&db, 42).await.unwrap_err();
		assert!(matches!(*e, Error::NodeNotFound(42)));
	}
}

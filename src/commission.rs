//! Calculation and settlement of the commissions that a package purchase
//! pays out to the upline of the purchasing node.
//!
//! Two kinds of commissions exist:
//! * Level commissions: every ancestor up to `MAX_UPLINE_DEPTH` levels up gets
//!   a share of the purchase price, which shrinks with the distance.
//! * The binary bonus: the direct parent of the purchasing node gets a share of
//!   the volume of its weaker leg.

use log::*;
use sea_orm::{prelude::*, ActiveValue::*};
use serde::Serialize;

use crate::{
	common::*,
	db::{self, Database, Error, PersistenceHandle},
	entity::*,
	network::{self, UplineEntry},
	trace,
};


/// The level commission rates of the closest ancestors, closest first.
pub const LEVEL_COMMISSION_RATES: [BasisPoints; 4] = [1000, 500, 300, 200];
/// The level commission rate of every ancestor beyond the ones in
/// `LEVEL_COMMISSION_RATES`.
pub const DEEP_LEVEL_COMMISSION_RATE: BasisPoints = 100;
pub const BINARY_BONUS_RATE: BasisPoints = 1000;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Commission {
	pub node_id: i64,
	pub node_position: NodePosition,
	pub node_username: String,
	pub amount: Amount,
	pub reason: String,
	pub kind: CommissionKind,
	pub level: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommissionPlan {
	pub purchase_id: i64,
	pub price: Amount,
	pub commissions: Vec<Commission>,
	pub binary_bonus: Option<Commission>,
}


/// The share of the purchase price for the ancestor at the given index of the
/// upline, closest ancestor being 0.
pub fn level_commission_rate(index: usize) -> BasisPoints {
	LEVEL_COMMISSION_RATES
		.get(index)
		.copied()
		.unwrap_or(DEEP_LEVEL_COMMISSION_RATE)
}

/// Produces one level commission for every ancestor in the upline.
pub fn assign_level_commissions(upline: &[UplineEntry], price: Amount) -> Vec<Commission> {
	upline
		.iter()
		.enumerate()
		.map(|(i, ancestor)| {
			let level = i as i32 + 1;
			Commission {
				node_id: ancestor.node_id,
				node_position: ancestor.position,
				node_username: ancestor.username.clone(),
				amount: share_of(price, level_commission_rate(i)),
				reason: format!("Level {} commission", level),
				kind: CommissionKind::Level,
				level: Some(level),
			}
		})
		.collect()
}

/// Works out all commissions that the given purchase pays out, without
/// storing anything.
pub async fn calculate_commissions<H>(handle: &H, purchase_id: i64) -> db::Result<CommissionPlan>
where
	H: PersistenceHandle + Sync,
{
	let purchase = match handle.find_purchase(purchase_id).await? {
		Some(p) => p,
		None => return trace::err(Error::PurchaseNotFound(purchase_id)),
	};

	let upline = network::find_upline(handle, purchase.node_id).await?;
	let commissions = assign_level_commissions(&upline, purchase.price);
	let binary_bonus = calculate_binary_bonus(handle, purchase.node_id).await;

	Ok(CommissionPlan {
		purchase_id,
		price: purchase.price,
		commissions,
		binary_bonus,
	})
}

/// Sums up the paid purchases of the direct children on one side of the given
/// node.
///
/// Only the children themselves are counted, not the rest of the leg below
/// them.
pub async fn calculate_team_volume<H>(
	handle: &H, parent_node_id: i64, position: NodePosition,
) -> db::Result<Amount>
where
	H: PersistenceHandle + Sync,
{
	let child_ids: Vec<i64> = handle
		.find_child_links(parent_node_id, Some(position))
		.await?
		.into_iter()
		.map(|l| l.child_node_id)
		.collect();
	handle.sum_paid_purchases(&child_ids).await
}

/// Calculates the binary bonus that the parent of the given node receives.
///
/// Returns `None` when the node has no parent, when the weaker leg has no
/// volume, and also when the calculation fails for any reason. Failures are
/// only logged.
pub async fn calculate_binary_bonus<H>(handle: &H, node_id: i64) -> Option<Commission>
where
	H: PersistenceHandle + Sync,
{
	match try_calculate_binary_bonus(handle, node_id).await {
		Ok(bonus) => bonus,
		Err(e) => {
			warn!("Unable to calculate binary bonus for node {}: {:?}", node_id, e);
			None
		}
	}
}

async fn try_calculate_binary_bonus<H>(handle: &H, node_id: i64) -> db::Result<Option<Commission>>
where
	H: PersistenceHandle + Sync,
{
	let parent_link = match handle.find_parent_link(node_id).await? {
		Some(l) => l,
		None => return Ok(None),
	};
	let parent_id = parent_link.parent_node_id;

	let left = calculate_team_volume(handle, parent_id, NodePosition::Left).await?;
	let right = calculate_team_volume(handle, parent_id, NodePosition::Right).await?;
	let weaker_leg = left.min(right);
	let amount = share_of(weaker_leg, BINARY_BONUS_RATE);
	debug!(
		"Leg volumes of node {}: left {}, right {}, bonus {}.",
		parent_id,
		left,
		right,
		amount
	);
	if amount <= 0 {
		return Ok(None);
	}

	Ok(Some(Commission {
		node_id: parent_id,
		node_position: parent_link.parent_node_position,
		node_username: handle.find_node_username(parent_id).await?,
		amount,
		reason: format!("Binary bonus on weaker leg volume of {}", weaker_leg),
		kind: CommissionKind::BinaryBonus,
		level: None,
	}))
}

/// Calculates the commissions of a paid purchase and stores them, all in one
/// transaction.
///
/// A purchase can only be settled once. Settling it again fails with
/// `PurchaseAlreadySettled` without storing anything.
pub async fn settle_purchase(db: &Database, purchase_id: i64) -> db::Result<CommissionPlan> {
	let tx = db.transaction().await?;

	// Claim the purchase first, so that the write lock is taken before anything
	// is read.
	let mut changes = <node_package::ActiveModel as Default>::default();
	changes.is_settled = Set(true);
	let result = node_package::Entity::update_many()
		.set(changes)
		.filter(node_package::Column::Id.eq(purchase_id))
		.filter(node_package::Column::IsPaid.eq(true))
		.filter(node_package::Column::IsSettled.eq(false))
		.exec(tx.inner())
		.await?;
	if result.rows_affected == 0 {
		let error = match tx.find_purchase(purchase_id).await? {
			None => Error::PurchaseNotFound(purchase_id),
			Some(p) if !p.is_paid => Error::PurchaseNotPaid(purchase_id),
			Some(_) => Error::PurchaseAlreadySettled(purchase_id),
		};
		tx.rollback().await?;
		return trace::err(error);
	}

	let plan = calculate_commissions(&tx, purchase_id).await?;
	let now = current_timestamp();
	for entry in plan.entries() {
		let record = commission::ActiveModel {
			id: NotSet,
			node_package_id: Set(purchase_id),
			node_id: Set(entry.node_id),
			kind: Set(entry.kind),
			level: Set(entry.level),
			amount: Set(entry.amount),
			reason: Set(entry.reason.clone()),
			created: Set(now),
		};
		commission::Entity::insert(record).exec(tx.inner()).await?;
	}
	tx.commit().await?;

	info!(
		"Settled purchase {}: {} commissions for a total of {}.",
		purchase_id,
		plan.entries().count(),
		plan.total()
	);
	Ok(plan)
}


impl CommissionPlan {
	/// All level commissions, followed by the binary bonus if there is one.
	pub fn entries(&self) -> impl Iterator<Item = &Commission> {
		self.commissions.iter().chain(self.binary_bonus.iter())
	}

	/// Saturates at `Amount::MAX` instead of overflowing.
	pub fn total(&self) -> Amount {
		self.entries()
			.fold(0 as Amount, |total, c| total.saturating_add(c.amount))
	}
}

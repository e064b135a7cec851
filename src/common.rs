use std::fmt;

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};


/// An amount of money, in minor currency units.
pub type Amount = i64;

/// One hundredth of a percent.
pub type BasisPoints = i64;

pub const BASIS_POINTS_WHOLE: BasisPoints = 10_000;

/// The side of a parent node that a child hangs on.
#[derive(
	Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(5))")]
#[serde(rename_all = "UPPERCASE")]
pub enum NodePosition {
	#[sea_orm(string_value = "LEFT")]
	Left,
	#[sea_orm(string_value = "RIGHT")]
	Right,
}

#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(9))")]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeStatus {
	#[default]
	#[sea_orm(string_value = "ACTIVE")]
	Active,
	#[sea_orm(string_value = "SUSPENDED")]
	Suspended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(12))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionKind {
	#[sea_orm(string_value = "LEVEL")]
	Level,
	#[sea_orm(string_value = "BINARY_BONUS")]
	BinaryBonus,
}


/// Milliseconds since the unix epoch.
pub fn current_timestamp() -> i64 { Utc::now().timestamp_millis() }

/// Takes the given share of an amount, rounding towards zero.
pub fn share_of(amount: Amount, share: BasisPoints) -> Amount {
	((amount as i128 * share as i128) / BASIS_POINTS_WHOLE as i128) as Amount
}

/// Adds up the given amounts, or returns `None` if the sum doesn't fit in an
/// `Amount`.
pub fn checked_sum<I>(amounts: I) -> Option<Amount>
where
	I: IntoIterator<Item = Amount>,
{
	amounts
		.into_iter()
		.try_fold(0 as Amount, |total, a| total.checked_add(a))
}


impl fmt::Display for NodePosition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Left => write!(f, "LEFT"),
			Self::Right => write!(f, "RIGHT"),
		}
	}
}

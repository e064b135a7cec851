use sea_orm::entity::prelude::*;

use crate::common::CommissionKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "commission")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = true)]
	pub id: i64,
	pub node_package_id: i64,
	/// The node that receives the commission.
	pub node_id: i64,
	pub kind: CommissionKind,
	/// Distance from the purchasing node, starting at 1. Not set for binary
	/// bonuses.
	pub level: Option<i32>,
	pub amount: i64,
	pub reason: String,
	pub created: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::node_package::Entity",
		from = "Column::NodePackageId",
		to = "super::node_package::Column::Id"
	)]
	NodePackage,
	#[sea_orm(
		belongs_to = "super::node::Entity",
		from = "Column::NodeId",
		to = "super::node::Column::Id"
	)]
	Node,
}

impl ActiveModelBehavior for ActiveModel {}

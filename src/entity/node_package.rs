//! A package purchase made by a node.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "node_package")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = true)]
	pub id: i64,
	pub node_id: i64,
	pub package_id: i64,
	/// The package price at the moment of purchase.
	pub price: i64,
	pub is_paid: bool,
	/// Set once the commissions of this purchase have been written out.
	pub is_settled: bool,
	pub created: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::node::Entity",
		from = "Column::NodeId",
		to = "super::node::Column::Id",
		on_update = "Cascade",
		on_delete = "Cascade"
	)]
	Node,
	#[sea_orm(
		belongs_to = "super::package::Entity",
		from = "Column::PackageId",
		to = "super::package::Column::Id"
	)]
	Package,
}

impl Related<super::node::Entity> for Entity {
	fn to() -> RelationDef { Relation::Node.def() }
}

impl Related<super::package::Entity> for Entity {
	fn to() -> RelationDef { Relation::Package.def() }
}

impl ActiveModelBehavior for ActiveModel {}

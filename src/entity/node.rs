//! A node is a member's seat in the binary tree. Its place in the tree is not
//! stored here but in `node_children`.

use sea_orm::entity::prelude::*;

use crate::common::NodeStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "node")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = true)]
	pub id: i64,
	pub user_id: i64,
	pub status: NodeStatus,
	pub created: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::user::Entity",
		from = "Column::UserId",
		to = "super::user::Column::Id",
		on_update = "Cascade",
		on_delete = "Cascade"
	)]
	User,
	#[sea_orm(has_many = "super::node_package::Entity")]
	NodePackage,
}

impl Related<super::user::Entity> for Entity {
	fn to() -> RelationDef { Relation::User.def() }
}

impl Related<super::node_package::Entity> for Entity {
	fn to() -> RelationDef { Relation::NodePackage.def() }
}

impl ActiveModelBehavior for ActiveModel {}

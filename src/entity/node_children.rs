//! Parent links of the binary tree. A link is never removed, only flagged with
//! `is_deleted`, so that the history of placements is kept.

use sea_orm::entity::prelude::*;

use crate::common::NodePosition;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "node_children")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = true)]
	pub id: i64,
	pub parent_node_id: i64,
	pub child_node_id: i64,
	/// The side of the parent that the child hangs on.
	pub parent_node_position: NodePosition,
	pub is_deleted: bool,
	pub created: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::node::Entity",
		from = "Column::ParentNodeId",
		to = "super::node::Column::Id"
	)]
	Parent,
	#[sea_orm(
		belongs_to = "super::node::Entity",
		from = "Column::ChildNodeId",
		to = "super::node::Column::Id"
	)]
	Child,
}

impl ActiveModelBehavior for ActiveModel {}

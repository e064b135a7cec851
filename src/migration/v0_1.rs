use async_trait::async_trait;
use sea_orm::{prelude::*, ConnectionTrait, DatabaseTransaction};

use super::MigrationTrait;
use crate::trace;


/// Adds the indexes that the commission engine relies on, and lets the
/// database enforce the shape of the binary tree.
pub struct Migration;


#[async_trait]
impl MigrationTrait for Migration {
	async fn run(&self, tx: &DatabaseTransaction) -> trace::Result<(), DbErr> {
		tx.execute_unprepared(
			r#"
			CREATE INDEX node_children_child ON node_children (child_node_id, is_deleted);
			CREATE INDEX node_children_parent
				ON node_children (parent_node_id, parent_node_position, is_deleted);

			CREATE UNIQUE INDEX node_children_single_parent
				ON node_children (child_node_id) WHERE is_deleted = 0;
			CREATE UNIQUE INDEX node_children_single_child_per_side
				ON node_children (parent_node_id, parent_node_position) WHERE is_deleted = 0;

			CREATE INDEX node_package_node ON node_package (node_id, is_paid);
			CREATE INDEX commission_node ON commission (node_id);
			"#,
		)
		.await?;
		Ok(())
	}
}

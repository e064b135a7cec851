//! The binary tree that members are placed in.
//!
//! Every node has at most one parent, and every parent has at most one child
//! on each side. The parent links live in the `node_children` table, and are
//! soft-deleted when a node is detached.

use std::collections::HashSet;

use log::*;
use sea_orm::{prelude::*, ActiveValue::*};
use serde::{Deserialize, Serialize};

use crate::{
	common::*,
	db::{self, Database, Error, PersistenceHandle},
	entity::*,
	trace,
};


/// The number of ancestors that the upline walk will visit at most.
pub const MAX_UPLINE_DEPTH: usize = 10;

/// An ancestor of a node, as found by the upline walk.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UplineEntry {
	pub link_id: i64,
	pub node_id: i64,
	pub username: String,
	/// The side of this ancestor that the walk came up from.
	pub position: NodePosition,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Placement {
	pub parent_node_id: i64,
	pub position: NodePosition,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Children {
	pub left: Option<i64>,
	pub right: Option<i64>,
}


/// Walks up the tree from the given node, and returns its ancestors, closest
/// one first.
///
/// The walk stops at the root, or after `MAX_UPLINE_DEPTH` ancestors, whichever
/// comes first. Ancestors further up are not returned.
pub async fn find_upline<H>(handle: &H, node_id: i64) -> db::Result<Vec<UplineEntry>>
where
	H: PersistenceHandle + Sync,
{
	let mut upline = Vec::with_capacity(MAX_UPLINE_DEPTH);
	let mut current = node_id;
	for _ in 0..MAX_UPLINE_DEPTH {
		let link = match handle.find_parent_link(current).await? {
			Some(l) => l,
			None => break,
		};
		let username = handle.find_node_username(link.parent_node_id).await?;

		current = link.parent_node_id;
		upline.push(UplineEntry {
			link_id: link.id,
			node_id: link.parent_node_id,
			username,
			position: link.parent_node_position,
		});
	}
	Ok(upline)
}

pub async fn find_children<H>(handle: &H, node_id: i64) -> db::Result<Children>
where
	H: PersistenceHandle + Sync,
{
	if handle.find_node(node_id).await?.is_none() {
		return trace::err(Error::NodeNotFound(node_id));
	}

	let mut children = Children::default();
	for link in handle.find_child_links(node_id, None).await? {
		match link.parent_node_position {
			NodePosition::Left => children.left = Some(link.child_node_id),
			NodePosition::Right => children.right = Some(link.child_node_id),
		}
	}
	Ok(children)
}

/// Creates a new user with a node of its own. If a placement is given, the
/// node is put into the tree right away.
///
/// Returns the ID of the new node.
pub async fn register_member(
	db: &Database, username: &str, placement: Option<Placement>,
) -> db::Result<i64> {
	let tx = db.transaction().await?;
	if !tx.is_username_available(username).await? {
		return trace::err(Error::UsernameTaken(username.to_owned()));
	}

	let now = current_timestamp();
	let user_record = user::ActiveModel {
		id: NotSet,
		username: Set(username.to_owned()),
		created: Set(now),
	};
	let user_id = user::Entity::insert(user_record)
		.exec(tx.inner())
		.await?
		.last_insert_id;

	let node_record = node::ActiveModel {
		id: NotSet,
		user_id: Set(user_id),
		status: Set(NodeStatus::Active),
		created: Set(now),
	};
	let node_id = node::Entity::insert(node_record)
		.exec(tx.inner())
		.await?
		.last_insert_id;

	if let Some(p) = placement {
		if tx.find_node(p.parent_node_id).await?.is_none() {
			return trace::err(Error::NodeNotFound(p.parent_node_id));
		}
		store_link(&tx, node_id, &p).await?;
	}
	tx.commit().await?;

	match placement {
		Some(p) => info!(
			"Registered {} as node {}, placed {} of node {}.",
			username, node_id, p.position, p.parent_node_id
		),
		None => info!("Registered {} as root node {}.", username, node_id),
	}
	Ok(node_id)
}

/// Places a node that has no parent yet under the given parent.
pub async fn attach_node(db: &Database, node_id: i64, placement: Placement) -> db::Result<()> {
	let tx = db.transaction().await?;
	for id in [node_id, placement.parent_node_id] {
		if tx.find_node(id).await?.is_none() {
			return trace::err(Error::NodeNotFound(id));
		}
	}
	if tx.find_parent_link(node_id).await?.is_some() {
		return trace::err(Error::NodeAlreadyPlaced(node_id));
	}
	if is_descendant_or_self(&tx, placement.parent_node_id, node_id).await? {
		return trace::err(Error::WouldCreateCycle(node_id, placement.parent_node_id));
	}

	store_link(&tx, node_id, &placement).await?;
	tx.commit().await?;
	info!(
		"Attached node {} to the {} of node {}.",
		node_id, placement.position, placement.parent_node_id
	);
	Ok(())
}

/// Removes a node, together with its whole subtree, from its parent.
///
/// Returns false if the node didn't have a parent.
pub async fn detach_node(db: &Database, node_id: i64) -> db::Result<bool> {
	let mut changes = <node_children::ActiveModel as Default>::default();
	changes.is_deleted = Set(true);
	let result = node_children::Entity::update_many()
		.set(changes)
		.filter(node_children::Column::ChildNodeId.eq(node_id))
		.filter(node_children::Column::IsDeleted.eq(false))
		.exec(db.inner())
		.await?;

	let detached = result.rows_affected > 0;
	if detached {
		info!("Detached node {} from its parent.", node_id);
	}
	Ok(detached)
}

/// Suspends or reactivates a node. Suspended nodes can't purchase packages,
/// but stay in the tree.
pub async fn set_node_status(
	db: &Database, node_id: i64, status: NodeStatus,
) -> db::Result<node::Model> {
	let node = match db.find_node(node_id).await? {
		Some(n) => n,
		None => return trace::err(Error::NodeNotFound(node_id)),
	};
	if node.status == status {
		return Ok(node);
	}

	let mut record: node::ActiveModel = node.into();
	record.status = Set(status);
	let node = record.update(db.inner()).await?;
	info!("Node {} is now {:?}.", node_id, status);
	Ok(node)
}

/// Whether `node_id` is `ancestor_id` itself or lies somewhere below it.
async fn is_descendant_or_self<H>(handle: &H, node_id: i64, ancestor_id: i64) -> db::Result<bool>
where
	H: PersistenceHandle + Sync,
{
	let mut visited = HashSet::new();
	let mut current = node_id;
	loop {
		if current == ancestor_id {
			return Ok(true);
		}
		if !visited.insert(current) {
			warn!("Encountered a cycle in the tree at node {}.", current);
			return Ok(true);
		}
		match handle.find_parent_link(current).await? {
			Some(link) => current = link.parent_node_id,
			None => return Ok(false),
		}
	}
}

async fn store_link<H>(handle: &H, node_id: i64, placement: &Placement) -> db::Result<()>
where
	H: PersistenceHandle + Sync,
{
	let occupied = handle
		.find_child_links(placement.parent_node_id, Some(placement.position))
		.await?;
	if occupied.len() > 0 {
		return trace::err(Error::PositionOccupied(
			placement.parent_node_id,
			placement.position,
		));
	}

	let record = node_children::ActiveModel {
		id: NotSet,
		parent_node_id: Set(placement.parent_node_id),
		child_node_id: Set(node_id),
		parent_node_position: Set(placement.position),
		is_deleted: Set(false),
		created: Set(current_timestamp()),
	};
	node_children::Entity::insert(record)
		.exec(handle.inner())
		.await?;
	Ok(())
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::test;

	#[tokio::test]
	async fn test_upline_closest_first() {
		let db = test::load_database("network-upline").await;
		let chain = test::build_chain(&db, "u", 4).await;

		let upline = find_upline(&db, chain[3]).await.unwrap();
		let ids: Vec<i64> = upline.iter().map(|e| e.node_id).collect();
		assert_eq!(ids, vec![chain[2], chain[1], chain[0]]);
		assert_eq!(upline[0].username, "u2");
		assert_eq!(upline[2].username, "u0");

		assert!(find_upline(&db, chain[0]).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_upline_is_capped() {
		let db = test::load_database("network-cap").await;
		let chain = test::build_chain(&db, "deep", 15).await;

		let upline = find_upline(&db, chain[14]).await.unwrap();
		assert_eq!(upline.len(), MAX_UPLINE_DEPTH);
		assert_eq!(upline.last().unwrap().node_id, chain[4]);
	}

	#[tokio::test]
	async fn test_upline_reports_sides() {
		let db = test::load_database("network-sides").await;
		let root = register_member(&db, "root", None).await.unwrap();
		let right = test::place(&db, "right", root, NodePosition::Right).await;
		let leaf = test::place(&db, "leaf", right, NodePosition::Left).await;

		let upline = find_upline(&db, leaf).await.unwrap();
		assert_eq!(upline[0].position, NodePosition::Left);
		assert_eq!(upline[1].position, NodePosition::Right);
	}

	#[tokio::test]
	async fn test_upline_stops_at_detached_link() {
		let db = test::load_database("network-detached").await;
		let chain = test::build_chain(&db, "d", 4).await;

		assert!(detach_node(&db, chain[2]).await.unwrap());
		assert!(!detach_node(&db, chain[2]).await.unwrap());
		let upline = find_upline(&db, chain[3]).await.unwrap();
		assert_eq!(upline.len(), 1);
		assert_eq!(upline[0].node_id, chain[2]);
	}

	#[tokio::test]
	async fn test_occupied_position() {
		let db = test::load_database("network-occupied").await;
		let root = register_member(&db, "root", None).await.unwrap();
		test::place(&db, "first", root, NodePosition::Left).await;

		let placement = Placement {
			parent_node_id: root,
			position: NodePosition::Left,
		};
		let e = register_member(&db, "second", Some(placement)).await.unwrap_err();
		assert!(matches!(*e, Error::PositionOccupied(id, NodePosition::Left) if id == root));

		// The failed registration must not leave a user behind
		assert!(db.is_username_available("second").await.unwrap());
	}

	#[tokio::test]
	async fn test_username_taken() {
		let db = test::load_database("network-username").await;
		register_member(&db, "bob", None).await.unwrap();
		let e = register_member(&db, "bob", None).await.unwrap_err();
		assert!(matches!(*e, Error::UsernameTaken(_)));
	}

	#[tokio::test]
	async fn test_attach_rejects_cycles() {
		let db = test::load_database("network-cycle").await;
		let chain = test::build_chain(&db, "c", 3).await;
		let loose = register_member(&db, "loose", None).await.unwrap();

		// The root can't be placed under its own grandchild
		let e = attach_node(
			&db,
			chain[0],
			Placement {
				parent_node_id: chain[2],
				position: NodePosition::Right,
			},
		)
		.await
		.unwrap_err();
		assert!(matches!(*e, Error::WouldCreateCycle(..)));

		let e = attach_node(
			&db,
			loose,
			Placement {
				parent_node_id: loose,
				position: NodePosition::Left,
			},
		)
		.await
		.unwrap_err();
		assert!(matches!(*e, Error::WouldCreateCycle(..)));

		let e = attach_node(
			&db,
			chain[1],
			Placement {
				parent_node_id: loose,
				position: NodePosition::Left,
			},
		)
		.await
		.unwrap_err();
		assert!(matches!(*e, Error::NodeAlreadyPlaced(_)));

		attach_node(
			&db,
			loose,
			Placement {
				parent_node_id: chain[2],
				position: NodePosition::Right,
			},
		)
		.await
		.unwrap();
		assert_eq!(find_upline(&db, loose).await.unwrap().len(), 3);
	}

	#[tokio::test]
	async fn test_reattach_after_detach() {
		let db = test::load_database("network-reattach").await;
		let root = register_member(&db, "root", None).await.unwrap();
		let child = test::place(&db, "child", root, NodePosition::Left).await;

		detach_node(&db, child).await.unwrap();
		assert_eq!(find_children(&db, root).await.unwrap(), Children::default());

		attach_node(
			&db,
			child,
			Placement {
				parent_node_id: root,
				position: NodePosition::Right,
			},
		)
		.await
		.unwrap();
		let children = find_children(&db, root).await.unwrap();
		assert_eq!(children.left, None);
		assert_eq!(children.right, Some(child));
	}

	#[tokio::test]
	async fn test_suspended_node_stays_in_tree() {
		let db = test::load_database("network-status").await;
		let root = register_member(&db, "root", None).await.unwrap();
		let child = test::place(&db, "child", root, NodePosition::Left).await;

		let node = set_node_status(&db, root, NodeStatus::Suspended)
			.await
			.unwrap();
		assert_eq!(node.status, NodeStatus::Suspended);
		assert_eq!(find_upline(&db, child).await.unwrap()[0].node_id, root);

		let e = set_node_status(&db, child + 1, NodeStatus::Active)
			.await
			.unwrap_err();
		assert!(matches!(*e, Error::NodeNotFound(_)));
	}
}

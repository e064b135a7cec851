mod install;

use std::{path::*, time::Duration};

use async_trait::async_trait;
use log::*;
use sea_orm::{prelude::*, *};
use thiserror::Error;

use crate::{
	common::*,
	entity::{node, node_children, node_package, user},
	trace::{self, Traceable, Traced},
};


#[derive(Clone)]
pub struct Database {
	path: PathBuf,
	orm: DatabaseConnection,
}

pub struct Transaction(pub(crate) sea_orm::DatabaseTransaction);

#[derive(Debug, Error)]
pub enum Error {
	#[error("{0}")]
	OrmError(sea_orm::DbErr),

	#[error("node {0} not found")]
	NodeNotFound(i64),
	#[error("node {0} doesn't belong to any user")]
	NodeWithoutUser(i64),
	#[error("username \"{0}\" is already taken")]
	UsernameTaken(String),
	#[error("the {1} position of node {0} is already occupied")]
	PositionOccupied(i64, NodePosition),
	#[error("node {0} already has a parent")]
	NodeAlreadyPlaced(i64),
	#[error("placing node {0} under node {1} would create a cycle")]
	WouldCreateCycle(i64, i64),
	#[error("node {0} is suspended")]
	NodeSuspended(i64),

	#[error("package {0} not found")]
	PackageNotFound(i64),
	#[error("package {0} is not available for purchase")]
	PackageInactive(i64),
	#[error("package name \"{0}\" is already taken")]
	PackageNameTaken(String),
	#[error("invalid amount: {0}")]
	InvalidAmount(Amount),
	#[error("amounts of {0} don't fit in a sum")]
	AmountOverflow(String),

	#[error("purchase {0} not found")]
	PurchaseNotFound(i64),
	#[error("purchase {0} has not been paid")]
	PurchaseNotPaid(i64),
	#[error("commissions of purchase {0} have already been settled")]
	PurchaseAlreadySettled(i64),
}

pub type Result<T> = trace::Result<T, self::Error>;


/// Queries that can be run either directly on the database, or inside a
/// transaction.
#[async_trait]
pub trait PersistenceHandle {
	type Inner: ConnectionTrait;

	fn inner(&self) -> &Self::Inner;

	async fn find_node(&self, node_id: i64) -> Result<Option<node::Model>> {
		Ok(node::Entity::find_by_id(node_id).one(self.inner()).await?)
	}

	/// Loads the username of the user that owns the given node.
	async fn find_node_username(&self, node_id: i64) -> Result<String> {
		let result = node::Entity::find_by_id(node_id)
			.find_also_related(user::Entity)
			.one(self.inner())
			.await?;
		match result {
			None => trace::err(Error::NodeNotFound(node_id)),
			Some((_, None)) => trace::err(Error::NodeWithoutUser(node_id)),
			Some((_, Some(user))) => Ok(user.username),
		}
	}

	/// Finds the link to the parent of the given node, ignoring deleted links.
	async fn find_parent_link(&self, child_node_id: i64) -> Result<Option<node_children::Model>> {
		Ok(node_children::Entity::find()
			.filter(node_children::Column::ChildNodeId.eq(child_node_id))
			.filter(node_children::Column::IsDeleted.eq(false))
			.one(self.inner())
			.await?)
	}

	/// Finds the links to the direct children of the given node, ignoring
	/// deleted links. If a position is given, only the children on that side
	/// are returned.
	async fn find_child_links(
		&self, parent_node_id: i64, position: Option<NodePosition>,
	) -> Result<Vec<node_children::Model>> {
		let mut query = node_children::Entity::find()
			.filter(node_children::Column::ParentNodeId.eq(parent_node_id))
			.filter(node_children::Column::IsDeleted.eq(false));
		if let Some(p) = position {
			query = query.filter(node_children::Column::ParentNodePosition.eq(p));
		}
		Ok(query
			.order_by_asc(node_children::Column::Id)
			.all(self.inner())
			.await?)
	}

	async fn find_purchase(&self, purchase_id: i64) -> Result<Option<node_package::Model>> {
		Ok(node_package::Entity::find_by_id(purchase_id)
			.one(self.inner())
			.await?)
	}

	/// Sums up the prices of all paid purchases made by the given nodes.
	///
	/// Fails with `AmountOverflow` rather than wrapping around.
	async fn sum_paid_purchases(&self, node_ids: &[i64]) -> Result<Amount> {
		if node_ids.len() == 0 {
			return Ok(0);
		}

		let purchases = node_package::Entity::find()
			.filter(node_package::Column::NodeId.is_in(node_ids.iter().copied()))
			.filter(node_package::Column::IsPaid.eq(true))
			.all(self.inner())
			.await?;
		match checked_sum(purchases.iter().map(|p| p.price)) {
			Some(total) => Ok(total),
			None => trace::err(Error::AmountOverflow(format!(
				"the paid purchases of nodes {:?}",
				node_ids
			))),
		}
	}

	async fn is_username_available(&self, username: &str) -> Result<bool> {
		let count = user::Entity::find()
			.filter(user::Column::Username.eq(username))
			.count(self.inner())
			.await?;
		Ok(count == 0)
	}
}


impl Database {
	async fn install(orm: &DatabaseConnection) -> Result<()> {
		let tx = orm.begin().await?;
		tx.execute_unprepared(install::QUERY).await?;
		tx.commit().await?;
		Ok(())
	}

	async fn is_installed(orm: &DatabaseConnection) -> Result<bool> {
		let stat = Statement::from_sql_and_values(
			orm.get_database_backend(),
			"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'version'",
			[],
		);
		let count: i64 = match orm.query_one(stat).await? {
			Some(row) => row.try_get_by_index(0)?,
			None => 0,
		};
		Ok(count > 0)
	}

	/// Opens the database at the given path, creating and installing it if it
	/// doesn't exist yet.
	pub async fn load(path: PathBuf) -> Result<Self> {
		let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
		opts.idle_timeout(Duration::from_secs(10));
		opts.acquire_timeout(Duration::from_secs(1));
		opts.sqlx_logging_level(LevelFilter::Trace);
		let orm = sea_orm::Database::connect(opts).await?;

		if !Self::is_installed(&orm).await? {
			info!("Installing new database at {}.", path.display());
			Self::install(&orm).await?;
		}

		Ok(Self { path, orm })
	}

	pub fn path(&self) -> &Path { &self.path }

	pub async fn transaction(&self) -> Result<Transaction> {
		let tx = self.orm.begin().await?;
		Ok(Transaction(tx))
	}
}

impl PersistenceHandle for Database {
	type Inner = sea_orm::DatabaseConnection;

	fn inner(&self) -> &Self::Inner { &self.orm }
}

impl PersistenceHandle for Transaction {
	type Inner = sea_orm::DatabaseTransaction;

	fn inner(&self) -> &Self::Inner { &self.0 }
}

impl Transaction {
	pub async fn commit(self) -> Result<()> {
		self.0.commit().await?;
		Ok(())
	}

	pub async fn rollback(self) -> Result<()> {
		self.0.rollback().await?;
		Ok(())
	}
}

impl From<sea_orm::DbErr> for Error {
	fn from(other: sea_orm::DbErr) -> Self { Self::OrmError(other) }
}

impl From<sea_orm::DbErr> for Traced<Error> {
	fn from(other: sea_orm::DbErr) -> Self { Error::OrmError(other).trace() }
}

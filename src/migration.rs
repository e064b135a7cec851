//! Versioned changes to the database schema.
//!
//! A freshly installed database starts at v0.0. Every migration newer than the
//! version stored in the `version` table is run in its own transaction, which
//! also bumps the stored version.

use std::fmt;

use async_trait::async_trait;
use log::info;
use sea_orm::{prelude::*, DatabaseTransaction, Statement, TransactionTrait, Value};

use crate::{
	db::{Database, PersistenceHandle},
	trace,
};

mod v0_1;


pub const LATEST_VERSION: Version = Version::new(0, 1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
	major: u32,
	minor: u32,
}

pub struct Migrations {
	/// Ordered from oldest to newest.
	list: Vec<(Version, Box<dyn MigrationTrait + Send + Sync>)>,
}

#[async_trait]
trait MigrationTrait {
	async fn run(&self, tx: &DatabaseTransaction) -> trace::Result<(), DbErr>;
}


impl Migrations {
	pub fn load() -> Self {
		Self {
			list: vec![(Version::new(0, 1), Box::new(v0_1::Migration))],
		}
	}

	pub async fn load_version<C>(&self, connection: &C) -> trace::Result<Version, DbErr>
	where
		C: ConnectionTrait,
	{
		let stat = Statement::from_string(
			connection.get_database_backend(),
			"SELECT major, minor FROM version",
		);
		let row = match connection.query_one(stat).await? {
			Some(r) => r,
			None => return trace::err(DbErr::RecordNotFound("no version in the database".into())),
		};
		Ok(Version::new(
			row.try_get_by_index(0)?,
			row.try_get_by_index(1)?,
		))
	}

	async fn store_version(
		&self, tx: &DatabaseTransaction, version: Version,
	) -> trace::Result<(), DbErr> {
		tx.execute(Statement::from_sql_and_values(
			tx.get_database_backend(),
			"UPDATE version SET major = ?, minor = ?",
			[Value::from(version.major), Value::from(version.minor)],
		))
		.await?;
		Ok(())
	}

	/// Brings the database up to the latest version. Does nothing if it already
	/// is.
	pub async fn run(&self, db: &Database) -> trace::Result<(), DbErr> {
		let mut current = self.load_version(db.inner()).await?;

		for (version, migration) in &self.list {
			if *version <= current {
				continue;
			}
			info!("Migrating database from {} to {}...", current, version);
			let tx = db.inner().begin().await?;
			migration.run(&tx).await?;
			self.store_version(&tx, *version).await?;
			tx.commit().await?;
			current = *version;
		}

		if current != LATEST_VERSION {
			return trace::err(DbErr::Migration(format!(
				"database is at {}, which is newer than {}",
				current, LATEST_VERSION
			)));
		}
		Ok(())
	}
}

impl Version {
	pub const fn new(major: u32, minor: u32) -> Self { Self { major, minor } }
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "v{}.{}", self.major, self.minor)
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::test;

	#[tokio::test]
	async fn test_migrations_reach_latest_version() {
		// `load_database` already migrates
		let db = test::load_database("migration").await;
		let migrations = Migrations::load();
		assert_eq!(
			migrations.load_version(db.inner()).await.unwrap(),
			LATEST_VERSION
		);

		// Running them again is a no-op
		migrations.run(&db).await.unwrap();
		assert_eq!(
			migrations.load_version(db.inner()).await.unwrap(),
			LATEST_VERSION
		);
	}

	#[tokio::test]
	async fn test_newer_database_is_refused() {
		let db = test::load_database("migration-newer").await;
		db.inner()
			.execute_unprepared("UPDATE version SET major = 1, minor = 0")
			.await
			.unwrap();

		let e = Migrations::load().run(&db).await.unwrap_err();
		assert!(matches!(*e, DbErr::Migration(_)));
	}

	#[test]
	fn test_version_ordering() {
		assert!(Version::new(0, 1) > Version::new(0, 0));
		assert!(Version::new(1, 0) > Version::new(0, 9));
		assert_eq!(Version::new(0, 1), LATEST_VERSION);
	}
}

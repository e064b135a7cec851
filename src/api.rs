use crate::{
	commission::{self, CommissionPlan},
	common::*,
	db::{self, Database},
	entity::*,
	network::{self, Children, Placement, UplineEntry},
	purchase,
	report::{self, CommissionRecord, Earnings},
};


/// Everything the daemon can do, on top of one database.
#[derive(Clone)]
pub struct Api {
	pub db: Database,
}


impl Api {
	pub fn new(db: Database) -> Self { Self { db } }

	pub async fn register_member(
		&self, username: &str, placement: Option<Placement>,
	) -> db::Result<i64> {
		network::register_member(&self.db, username, placement).await
	}

	pub async fn attach_node(&self, node_id: i64, placement: Placement) -> db::Result<()> {
		network::attach_node(&self.db, node_id, placement).await
	}

	pub async fn detach_node(&self, node_id: i64) -> db::Result<bool> {
		network::detach_node(&self.db, node_id).await
	}

	pub async fn find_children(&self, node_id: i64) -> db::Result<Children> {
		network::find_children(&self.db, node_id).await
	}

	pub async fn find_upline(&self, node_id: i64) -> db::Result<Vec<UplineEntry>> {
		network::find_upline(&self.db, node_id).await
	}

	pub async fn set_node_status(&self, node_id: i64, status: NodeStatus) -> db::Result<node::Model> {
		network::set_node_status(&self.db, node_id, status).await
	}

	pub async fn create_package(&self, name: &str, price: Amount) -> db::Result<package::Model> {
		purchase::create_package(&self.db, name, price).await
	}

	pub async fn deactivate_package(&self, package_id: i64) -> db::Result<()> {
		purchase::deactivate_package(&self.db, package_id).await
	}

	pub async fn purchase_package(
		&self, node_id: i64, package_id: i64,
	) -> db::Result<node_package::Model> {
		purchase::purchase_package(&self.db, node_id, package_id).await
	}

	pub async fn mark_purchase_paid(&self, purchase_id: i64) -> db::Result<node_package::Model> {
		purchase::mark_purchase_paid(&self.db, purchase_id).await
	}

	/// Shows what a purchase would pay out, without paying anything.
	pub async fn preview_commissions(&self, purchase_id: i64) -> db::Result<CommissionPlan> {
		commission::calculate_commissions(&self.db, purchase_id).await
	}

	pub async fn settle_purchase(&self, purchase_id: i64) -> db::Result<CommissionPlan> {
		commission::settle_purchase(&self.db, purchase_id).await
	}

	pub async fn node_earnings(&self, node_id: i64) -> db::Result<Earnings> {
		report::node_earnings(&self.db, node_id).await
	}

	pub async fn list_commissions(&self, node_id: i64) -> db::Result<Vec<CommissionRecord>> {
		report::list_commissions(&self.db, node_id).await
	}
}

//! The JSON API of the daemon.

pub mod common;

use std::{
	net::*,
	sync::{atomic::*, Arc},
	time::Duration,
};

use ::serde::*;
use axum::{
	extract::*,
	response::Response,
	routing::{get, post},
	Json, Router,
};
use log::*;
use tokio::time::sleep;

use self::common::*;
use crate::{
	api::Api,
	common::*,
	config::Config,
	network::Placement,
};


pub struct Global {
	pub config: Config,
	pub api: Api,
}

#[derive(Deserialize)]
struct RegisterMemberData {
	username: String,
	placement: Option<Placement>,
}

#[derive(Deserialize)]
struct CreatePackageData {
	name: String,
	price: Amount,
}

#[derive(Deserialize)]
struct NodeStatusData {
	status: NodeStatus,
}

#[derive(Deserialize)]
struct PurchaseData {
	node_id: i64,
	package_id: i64,
}

#[derive(Serialize)]
struct IdResponse {
	id: i64,
}

#[derive(Serialize)]
struct NodeStatusResponse {
	id: i64,
	status: NodeStatus,
}

#[derive(Serialize)]
struct DetachResponse {
	detached: bool,
}


pub fn router(global: Arc<Global>) -> Router {
	Router::new()
		.route("/member", post(register_member))
		.route("/node/:id/upline", get(node_upline))
		.route("/node/:id/children", get(node_children))
		.route("/node/:id/attach", post(node_attach))
		.route("/node/:id/detach", post(node_detach))
		.route("/node/:id/status", post(node_status))
		.route("/node/:id/earnings", get(node_earnings))
		.route("/node/:id/commissions", get(node_commissions))
		.route("/package", post(create_package))
		.route("/package/:id/deactivate", post(package_deactivate))
		.route("/purchase", post(purchase))
		.route("/purchase/:id/paid", post(purchase_paid))
		.route("/purchase/:id/commissions", get(purchase_commissions))
		.route("/purchase/:id/settle", post(purchase_settle))
		.with_state(global)
}

/// Serves the API until the stop flag is raised.
pub async fn serve(stop_flag: Arc<AtomicBool>, api: Api, config: Config) -> std::io::Result<()> {
	let ip = if config.is_exposed() {
		Ipv4Addr::UNSPECIFIED
	} else {
		Ipv4Addr::LOCALHOST
	};
	let addr = SocketAddrV4::new(ip, config.web_api_port());
	let app = router(Arc::new(Global { config, api }));

	let listener = tokio::net::TcpListener::bind(addr).await?;
	info!("Serving web API on {}.", addr);
	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.with_graceful_shutdown(async move {
		while !stop_flag.load(Ordering::Relaxed) {
			sleep(Duration::from_secs(1)).await;
		}
	})
	.await
}

async fn register_member(
	State(g): State<Arc<Global>>, Json(data): Json<RegisterMemberData>,
) -> Response {
	match g.api.register_member(&data.username, data.placement).await {
		Ok(id) => json_response(&IdResponse { id }, 201),
		Err(e) => db_error_response(e, "Unable to register member"),
	}
}

async fn node_upline(State(g): State<Arc<Global>>, Path(node_id): Path<i64>) -> Response {
	match g.api.find_upline(node_id).await {
		Ok(upline) => json_response(&upline, 200),
		Err(e) => db_error_response(e, "Unable to load upline"),
	}
}

async fn node_children(State(g): State<Arc<Global>>, Path(node_id): Path<i64>) -> Response {
	match g.api.find_children(node_id).await {
		Ok(children) => json_response(&children, 200),
		Err(e) => db_error_response(e, "Unable to load children"),
	}
}

async fn node_attach(
	State(g): State<Arc<Global>>, Path(node_id): Path<i64>, Json(placement): Json<Placement>,
) -> Response {
	match g.api.attach_node(node_id, placement).await {
		Ok(()) => json_response(&IdResponse { id: node_id }, 200),
		Err(e) => db_error_response(e, "Unable to attach node"),
	}
}

async fn node_detach(State(g): State<Arc<Global>>, Path(node_id): Path<i64>) -> Response {
	match g.api.detach_node(node_id).await {
		Ok(detached) => json_response(&DetachResponse { detached }, 200),
		Err(e) => db_error_response(e, "Unable to detach node"),
	}
}

async fn node_status(
	State(g): State<Arc<Global>>, Path(node_id): Path<i64>, Json(data): Json<NodeStatusData>,
) -> Response {
	match g.api.set_node_status(node_id, data.status).await {
		Ok(node) => json_response(
			&NodeStatusResponse {
				id: node.id,
				status: node.status,
			},
			200,
		),
		Err(e) => db_error_response(e, "Unable to change node status"),
	}
}

async fn node_earnings(State(g): State<Arc<Global>>, Path(node_id): Path<i64>) -> Response {
	match g.api.node_earnings(node_id).await {
		Ok(earnings) => json_response(&earnings, 200),
		Err(e) => db_error_response(e, "Unable to load earnings"),
	}
}

async fn node_commissions(State(g): State<Arc<Global>>, Path(node_id): Path<i64>) -> Response {
	match g.api.list_commissions(node_id).await {
		Ok(records) => json_response(&records, 200),
		Err(e) => db_error_response(e, "Unable to load commissions"),
	}
}

async fn create_package(
	State(g): State<Arc<Global>>, Json(data): Json<CreatePackageData>,
) -> Response {
	match g.api.create_package(&data.name, data.price).await {
		Ok(package) => json_response(&package, 201),
		Err(e) => db_error_response(e, "Unable to create package"),
	}
}

async fn package_deactivate(State(g): State<Arc<Global>>, Path(package_id): Path<i64>) -> Response {
	match g.api.deactivate_package(package_id).await {
		Ok(()) => json_response(&IdResponse { id: package_id }, 200),
		Err(e) => db_error_response(e, "Unable to deactivate package"),
	}
}

async fn purchase(State(g): State<Arc<Global>>, Json(data): Json<PurchaseData>) -> Response {
	match g.api.purchase_package(data.node_id, data.package_id).await {
		Ok(purchase) => json_response(&purchase, 201),
		Err(e) => db_error_response(e, "Unable to purchase package"),
	}
}

async fn purchase_paid(State(g): State<Arc<Global>>, Path(purchase_id): Path<i64>) -> Response {
	match g.api.mark_purchase_paid(purchase_id).await {
		Ok(purchase) => json_response(&purchase, 200),
		Err(e) => db_error_response(e, "Unable to mark purchase as paid"),
	}
}

async fn purchase_commissions(
	State(g): State<Arc<Global>>, Path(purchase_id): Path<i64>,
) -> Response {
	match g.api.preview_commissions(purchase_id).await {
		Ok(plan) => json_response(&plan, 200),
		Err(e) => db_error_response(e, "Unable to calculate commissions"),
	}
}

async fn purchase_settle(State(g): State<Arc<Global>>, Path(purchase_id): Path<i64>) -> Response {
	match g.api.settle_purchase(purchase_id).await {
		Ok(plan) => json_response(&plan, 200),
		Err(e) => db_error_response(e, "Unable to settle purchase"),
	}
}

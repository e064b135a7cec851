use std::fmt::{Debug, Display};

use ::serde::Serialize;
use axum::{body::Body, response::Response};
use log::*;

use crate::{db, trace::Traced};


pub fn json_response(json: &impl Serialize, status_code: u16) -> Response {
	match serde_json::to_string(json) {
		Ok(string) => Response::builder()
			.status(status_code)
			.header("Content-Type", "application/json")
			.body(Body::from(string))
			.unwrap(),
		Err(e) => server_error_response(e, "JSON serialization issue"),
	}
}

pub fn error_response<S>(status_code: u16, message: S) -> Response
where
	S: Into<String>,
{
	let string: String = message.into();
	if status_code >= 400 {
		warn!("HTTP {} error: {}", status_code, &string);
	}
	Response::builder()
		.status(status_code)
		.header("Content-Type", "text/plain")
		.body(Body::from(string))
		.unwrap()
}

pub fn server_error_response<E>(e: E, message: &str) -> Response
where
	E: Debug + Display,
{
	error!("{}: {:?}", message, e);
	error_response(500, format!("{}: {}", message, e))
}

/// Responds with the status code that fits the kind of database error.
pub fn db_error_response(e: Traced<db::Error>, message: &str) -> Response {
	use db::Error::*;

	let status_code = match &*e {
		OrmError(_) => return server_error_response(e, message),
		NodeWithoutUser(_) | AmountOverflow(_) => return server_error_response(e, message),
		NodeNotFound(_) | PackageNotFound(_) | PurchaseNotFound(_) => 404,
		UsernameTaken(_)
		| PositionOccupied(..)
		| NodeAlreadyPlaced(_)
		| WouldCreateCycle(..)
		| PackageNameTaken(_)
		| PurchaseAlreadySettled(_) => 409,
		NodeSuspended(_) | PackageInactive(_) | InvalidAmount(_) | PurchaseNotPaid(_) => 400,
	};
	error_response(status_code, format!("{}: {}", message, &*e))
}

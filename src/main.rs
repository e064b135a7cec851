mod api;
mod commission;
mod common;
mod config;
mod db;
mod entity;
mod migration;
mod network;
mod purchase;
mod report;
mod trace;
mod web;

use std::{
	env, fmt,
	fs::File,
	io::{self, prelude::*},
	path::{Path, PathBuf},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use api::Api;
use config::Config;
use db::Database;
use log::*;
use signal_hook::flag;

use crate::migration::Migrations;


fn config_path() -> PathBuf {
	match env::var_os("COMMISSIOND_CONFIG") {
		Some(path) => PathBuf::from(path),
		None => PathBuf::from(config::CONFIG_FILE_PATH),
	}
}

fn initialize_logging() {
	let result = env::var_os("SYSTEM_LOG_FILE").map(|os| PathBuf::from(os));

	if let Some(filename) = result {
		if let Err(e) = simple_logging::log_to_file(&filename, LevelFilter::Info) {
			eprintln!("Unable to log to {}: {}", filename.display(), e);
			env_logger::init();
		}
	} else {
		env_logger::init()
	}
}

fn load_config<P>(path: P) -> Option<Config>
where
	P: AsRef<Path> + fmt::Debug,
{
	let mut file = match File::open(&path) {
		Err(e) => match e.kind() {
			io::ErrorKind::NotFound => {
				error!("Config file {:?} not found!", path);
				return None;
			}
			_ => {
				error!("Unable to open config file {:?}: {}", path, e);
				return None;
			}
		},
		Ok(f) => f,
	};

	let mut content = String::new();
	if let Err(e) = file.read_to_string(&mut content) {
		error!("Unable to read config file {:?}: {}", path, e);
		return None;
	}

	match toml::from_str(&content) {
		Err(e) => {
			error!("Unable to parse config file {:?}: {}", path, e);
			None
		}
		Ok(c) => Some(c),
	}
}

async fn load_database(config: &Config) -> io::Result<Database> {
	// If the path doesn't exist yet, create it
	let db_path = PathBuf::from(&config.database_path);
	if let Some(folder) = db_path.parent() {
		tokio::fs::create_dir_all(folder).await?;
	}

	let db = Database::load(db_path)
		.await
		.map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
	Ok(db)
}

#[tokio::main]
async fn main() {
	initialize_logging();

	// Load config
	let config_path = config_path();
	let config = match load_config(&config_path) {
		Some(c) => c,
		None => return,
	};

	// Catch signals
	let stop_flag = Arc::new(AtomicBool::new(false));
	for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
		if let Err(e) = flag::register(signal, stop_flag.clone()) {
			error!("Unable to register signal handler: {}", e);
			return;
		}
	}
	let stop_flag2 = stop_flag.clone();
	if let Err(e) = ctrlc::set_handler(move || {
		stop_flag2.store(true, Ordering::Relaxed);
	}) {
		error!("Error setting Ctrl-C handler: {}", e);
		return;
	}

	// Load database
	let db = match load_database(&config).await {
		Ok(db) => db,
		Err(e) => {
			error!("Unable to load database: {}", e);
			return;
		}
	};

	// Run migrations (does nothing if there is nothing to migrate)
	if let Err(e) = Migrations::load().run(&db).await {
		error!("Unable to migrate database: {:?}", e);
		return;
	}

	let api = Api::new(db);
	if let Err(e) = web::serve(stop_flag, api, config).await {
		error!("Web API stopped unexpectedly: {}", e);
		return;
	}
	info!("Exiting...");
}

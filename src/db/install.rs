pub const QUERY: &'static str = r#"
	CREATE TABLE version (
		major INTEGER NOT NULL,
		minor INTEGER NOT NULL
	);
	INSERT INTO version VALUES (0, 0);

	CREATE TABLE user (
		id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
		username TEXT NOT NULL UNIQUE,
		created INTEGER NOT NULL
	);

	CREATE TABLE node (
		id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
		user_id INTEGER NOT NULL,
		status TEXT NOT NULL DEFAULT 'ACTIVE',
		created INTEGER NOT NULL,
		FOREIGN KEY(user_id) REFERENCES user(id)
	);

	CREATE TABLE node_children (
		id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
		parent_node_id INTEGER NOT NULL,
		child_node_id INTEGER NOT NULL,
		parent_node_position TEXT NOT NULL,
		is_deleted INTEGER NOT NULL DEFAULT 0,
		created INTEGER NOT NULL,
		FOREIGN KEY(parent_node_id) REFERENCES node(id),
		FOREIGN KEY(child_node_id) REFERENCES node(id)
	);

	CREATE TABLE package (
		id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
		name TEXT NOT NULL UNIQUE,
		price INTEGER NOT NULL,
		is_active INTEGER NOT NULL DEFAULT 1
	);

	CREATE TABLE node_package (
		id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
		node_id INTEGER NOT NULL,
		package_id INTEGER NOT NULL,
		price INTEGER NOT NULL,
		is_paid INTEGER NOT NULL DEFAULT 0,
		is_settled INTEGER NOT NULL DEFAULT 0,
		created INTEGER NOT NULL,
		FOREIGN KEY(node_id) REFERENCES node(id),
		FOREIGN KEY(package_id) REFERENCES package(id)
	);

	CREATE TABLE commission (
		id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
		node_package_id INTEGER NOT NULL,
		node_id INTEGER NOT NULL,
		kind TEXT NOT NULL,
		level INTEGER,
		amount INTEGER NOT NULL,
		reason TEXT NOT NULL,
		created INTEGER NOT NULL,
		FOREIGN KEY(node_package_id) REFERENCES node_package(id),
		FOREIGN KEY(node_id) REFERENCES node(id)
	);
"#;

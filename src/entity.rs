pub mod commission;
pub mod node;
pub mod node_children;
pub mod node_package;
pub mod package;
pub mod user;


// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod admin;
mod health;
mod metrics;
mod predictions;
mod registries;
mod reveal;
mod root;
mod shared_types;
mod view;


// Core handlers
pub use health::health_check;
pub use metrics::{metrics_handler, track_requests};
pub use root::root_handler;

// Guest handlers
pub use predictions::{find_prediction, get_stats, get_view, submit_prediction};
pub use registries::list_registries;
pub use reveal::{get_reveal, reveal_events};

// Admin handlers
pub use admin::{
    add_registry, dashboard, delete_prediction, login, logout, remove_registry, require_admin,
    update_reveal,
};

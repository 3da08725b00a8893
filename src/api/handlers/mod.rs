mod admin;
mod assets;
mod certificates;
mod customers;

pub use admin::{admin_purge, health};
pub use assets::{
    append_test_entry, create_asset, delete_asset, get_asset, list_assets, list_test_history,
};
pub use certificates::{get_certificate, save_certificate};
pub use customers::{get_counter, next_asset_id};

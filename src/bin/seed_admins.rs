//! Creates the initial admin accounts. Safe to run repeatedly.

use std::env;

use chedcom_console::{
    create_db_pool, init_tracing,
    seed::{seed_admins, DEFAULT_ACCOUNTS},
    store::Store,
    Config,
};
use tracing::{error, info};

fn main() {
    let config = Config::from_env();
    init_tracing(&config);

    let password = match env::var("SEED_ADMIN_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ => {
            error!("SEED_ADMIN_PASSWORD must be set");
            std::process::exit(1);
        }
    };

    let db_pool = create_db_pool(&config).unwrap_or_else(|e| {
        error!(error = %e, "Failed to create database pool");
        std::process::exit(1);
    });
    let store = Store::postgres(db_pool);

    match seed_admins(
        store.users.as_ref(),
        &DEFAULT_ACCOUNTS,
        &password,
        config.security.password_hash_cost,
    ) {
        Ok(report) => info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            "Admin seeding complete"
        ),
        Err(e) => {
            error!(error = %e, "Admin seeding failed");
            std::process::exit(1);
        }
    }
}

//! Bootstrap of the well-known admin accounts.

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    auth::password::PasswordService,
    models::{NewUser, Role},
    store::{Repository, StoreError, UserRepository},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedAccount {
    pub name: &'static str,
    pub email: &'static str,
    pub role: Role,
}

pub const DEFAULT_ACCOUNTS: [SeedAccount; 5] = [
    SeedAccount {
        name: "Super Admin",
        email: "superadmin@chedcom.org",
        role: Role::Superadmin,
    },
    SeedAccount {
        name: "Chief Executive Officer",
        email: "ceo@chedcom.org",
        role: Role::Superadmin,
    },
    SeedAccount {
        name: "Executive Director",
        email: "ed@chedcom.org",
        role: Role::Superadmin,
    },
    SeedAccount {
        name: "Programs Manager",
        email: "pm@chedcom.org",
        role: Role::Admin,
    },
    SeedAccount {
        name: "Field Officer",
        email: "fo@chedcom.org",
        role: Role::Admin,
    },
];

#[derive(Debug, Default, PartialEq)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Creates every account whose e-mail is not registered yet. Existing
/// accounts are left untouched, so running it twice is harmless.
pub fn seed_admins(
    users: &dyn UserRepository,
    accounts: &[SeedAccount],
    password: &str,
    hash_cost: u32,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for account in accounts {
        if users.find_by_email(account.email)?.is_some() {
            info!(email = account.email, "Admin already exists, skipping");
            report.skipped.push(account.email.to_string());
            continue;
        }

        let password_hash = PasswordService::hash_password_with_cost(password, hash_cost)
            .map_err(|e| SeedError::Hash(e.to_string()))?;

        match users.insert(NewUser {
            name: account.name.to_string(),
            email: account.email.to_string(),
            password_hash,
            role: account.role,
        }) {
            Ok(user) => {
                info!(admin_id = %user.id, email = account.email, role = %account.role, "Admin seeded");
                report.created.push(account.email.to_string());
            }
            // Created concurrently by someone else.
            Err(StoreError::Conflict(_)) => {
                warn!(email = account.email, "Admin appeared while seeding, skipping");
                report.skipped.push(account.email.to_string());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}

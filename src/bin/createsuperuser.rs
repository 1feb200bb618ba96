use std::env;

use anyhow::{Context, Result};
use uuid::Uuid;

use normcontrol::{config::AppConfig, db, users};

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let mut args = env::args().skip(1);
    let username = match args.next() {
        Some(value) => value,
        None => {
            eprintln!("Usage: createsuperuser <username> <password> [person-id]");
            std::process::exit(1);
        }
    };
    let password = match args.next() {
        Some(value) => value,
        None => {
            eprintln!("Usage: createsuperuser <username> <password> [person-id]");
            std::process::exit(1);
        }
    };
    let person_id = match args.next() {
        Some(raw) => Some(Uuid::parse_str(&raw).context("person-id must be a UUID")?),
        None => None,
    };

    let config = AppConfig::from_env()?;
    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    let mut conn = pool.get().context("failed to get database connection")?;

    match users::create_superuser(&mut conn, &username, person_id, &password) {
        Ok(user) => {
            println!("Superuser '{}' created ({}).", user.username, user.id);
            Ok(())
        }
        Err(err) => {
            eprintln!("Failed to create superuser: {err}");
            std::process::exit(1);
        }
    }
}

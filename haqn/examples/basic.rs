//! Basic example of the Haqn DI container.
//!
//! Run with `RUST_LOG=haqn_container=debug` to see registrations and scopes.

use std::sync::Arc;

use haqn::Injectable;
use haqn::prelude::*;
use tracing_subscriber::EnvFilter;

// === Define your traits and types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

#[derive(Clone)]
struct Config {
    database_url: String,
    debug: bool,
}

struct Database {
    url: String,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

#[derive(Injectable)]
#[injectable(lifetime = "scoped")]
struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

#[derive(Injectable)]
struct UserService {
    repo: Arc<UserRepository>,
    logger: Arc<dyn Logger>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.logger.log(&format!("Getting user {id}"));
        self.repo.find_user(id)
    }
}

fn main() -> haqn::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("haqn_container=debug")))
        .init();

    let container = Container::builder()
        // Config: a ready value
        .instance(Config {
            database_url: "postgres://localhost/myapp".to_string(),
            debug: true,
        })
        // Logger: singleton, resolved through its interface
        .singleton::<ConsoleLogger, _>(|| Ok(ConsoleLogger))
        .implements::<ConsoleLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
        // Database: singleton, depends on Config + Logger
        .singleton::<Database, _>(|config: Arc<Config>, logger: Arc<dyn Logger>| {
            Ok(Database {
                url: config.database_url.clone(),
                logger,
            })
        })
        // UserRepository: one per request
        .injectable::<UserRepository>()
        // UserService: new each time
        .injectable::<UserService>()
        .build()?;

    println!("Container built: {container:?}");

    let config: Config = container.resolve_owned()?;
    println!("Config: database_url={}, debug={}", config.database_url, config.debug);

    // One scope per request
    for request in ["req-42", "req-43"] {
        let scope = container.begin_scope(request);

        let service = scope.resolve::<UserService>()?;
        println!("{request}: {}", service.get_user(42));

        // Same scope, same UserRepository
        let again = scope.resolve::<UserService>()?;
        println!("{request}: {}", again.get_user(7));
        assert!(Arc::ptr_eq(&service.repo, &again.repo));

        scope.end();
    }

    match container.resolve::<UserRepository>() {
        Err(err) => println!("Outside a request: {err}"),
        Ok(_) => unreachable!("UserRepository is scoped"),
    }

    Ok(())
}

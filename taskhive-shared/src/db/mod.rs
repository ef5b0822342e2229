/// Database layer for TaskHive
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Embedded schema migrations
///
/// Row mapping lives next to each record type in the `models` module.

pub mod migrations;
pub mod pool;

//! SQL DDL for the record table.

/// Idempotent MySQL schema for `records`:
/// - `id` BIGINT AUTO_INCREMENT primary key (never reused after delete)
/// - `email` under a UNIQUE constraint (duplicates raise `ER_DUP_ENTRY`)
/// - `role` defaults to `User`
/// - `created_at` defaults to insertion time
pub const MYSQL_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    id BIGINT NOT NULL AUTO_INCREMENT,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    role VARCHAR(50) NOT NULL DEFAULT 'User',
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (id),
    CONSTRAINT uq_records_email UNIQUE (email)
)
"#;

/// Liveness query issued before the schema is ensured.
pub const LIVENESS_QUERY: &str = "SELECT 1";

//! Shared database structure: registry schema, utility schema and the
//! tenant provisioning procedure

use super::catalog::{
    CREATE_CUSTOMER_SCHEMA_PROCEDURE, CUSTOMERS, SHARED_CONFIG_SCHEMA, SHARED_UTILS_SCHEMA,
    TENANT_TABLES,
};
use crate::domain::tenant::NAMESPACE_PREFIX;
use crate::domain::warehouse::Statement;

/// Escape text for use inside a single-quoted SQL literal
pub fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Statements that create the shared structure, in dependency order
pub fn database_structure(database: &str) -> Vec<Statement> {
    vec![
        Statement::new(
            "create database",
            format!("CREATE DATABASE IF NOT EXISTS {}", database),
        ),
        Statement::new(
            "create shared config schema",
            format!("CREATE SCHEMA IF NOT EXISTS {}.{}", database, SHARED_CONFIG_SCHEMA),
        ),
        Statement::new(
            "create shared utils schema",
            format!("CREATE SCHEMA IF NOT EXISTS {}.{}", database, SHARED_UTILS_SCHEMA),
        ),
        Statement::new(
            "create customer registry",
            CUSTOMERS.create_sql(&format!("{}.{}", database, SHARED_CONFIG_SCHEMA)),
        ),
        Statement::new(
            "create provisioning procedure",
            create_customer_schema_procedure(database),
        ),
    ]
}

/// Procedure that creates a tenant namespace and registers the tenant.
/// Safe to call twice for the same tenant: every object uses IF NOT EXISTS and
/// the registry insert is a MERGE.
pub fn create_customer_schema_procedure(database: &str) -> String {
    let mut body = String::new();
    body.push_str("    schema_name := '");
    body.push_str(NAMESPACE_PREFIX);
    body.push_str("' || UPPER(CUSTOMER_ID);\n");
    body.push_str("    ddl := 'CREATE SCHEMA IF NOT EXISTS ' || schema_name;\n");
    body.push_str("    EXECUTE IMMEDIATE :ddl;\n");

    for table in TENANT_TABLES {
        body.push_str(&format!(
            "    ddl := 'CREATE TABLE IF NOT EXISTS ' || schema_name || '.{} ({})';\n",
            table.name,
            quote_literal(&table.columns_sql())
        ));
        body.push_str("    EXECUTE IMMEDIATE :ddl;\n");
    }

    format!(
        r#"CREATE OR REPLACE PROCEDURE {db}.{utils}.{proc}(CUSTOMER_ID STRING, CUSTOMER_NAME STRING)
RETURNS STRING
LANGUAGE SQL
EXECUTE AS CALLER
AS
$$
DECLARE
    schema_name STRING;
    ddl STRING;
BEGIN
{body}    MERGE INTO {config}.{registry} c
        USING (SELECT :schema_name AS schema_name) s
        ON c.schema_name = s.schema_name
        WHEN NOT MATCHED THEN
            INSERT (customer_id, customer_name, schema_name, status)
            VALUES (UPPER(:CUSTOMER_ID), :CUSTOMER_NAME, :schema_name, 'CREATED');
    RETURN 'Schema ' || schema_name || ' ready';
END;
$$"#,
        db = database,
        utils = SHARED_UTILS_SCHEMA,
        proc = CREATE_CUSTOMER_SCHEMA_PROCEDURE,
        config = SHARED_CONFIG_SCHEMA,
        registry = CUSTOMERS.name,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_order() {
        let statements = database_structure("CALL_CENTER_ANALYTICS");
        let labels: Vec<_> = statements.iter().map(|s| s.label.as_str()).collect();

        assert_eq!(
            labels,
            vec![
                "create database",
                "create shared config schema",
                "create shared utils schema",
                "create customer registry",
                "create provisioning procedure"
            ]
        );
        assert_eq!(
            statements[0].sql,
            "CREATE DATABASE IF NOT EXISTS CALL_CENTER_ANALYTICS"
        );
        assert!(statements[3]
            .sql
            .contains("CALL_CENTER_ANALYTICS.SHARED_CONFIG.CUSTOMERS"));
    }

    #[test]
    fn test_procedure_creates_every_tenant_table() {
        let sql = create_customer_schema_procedure("DB");

        assert!(sql.starts_with(
            "CREATE OR REPLACE PROCEDURE DB.SHARED_UTILS.CREATE_CUSTOMER_SCHEMA(CUSTOMER_ID STRING, CUSTOMER_NAME STRING)"
        ));
        for table in TENANT_TABLES {
            assert!(
                sql.contains(&format!("|| '.{} (", table.name)),
                "missing {}",
                table.name
            );
        }
        assert_eq!(sql.matches("EXECUTE IMMEDIATE :ddl;").count(), TENANT_TABLES.len() + 1);
        assert!(sql.contains("schema_name := 'CUSTOMER_' || UPPER(CUSTOMER_ID);"));
    }

    #[test]
    fn test_procedure_registers_once_per_namespace() {
        let sql = create_customer_schema_procedure("DB");

        assert!(sql.contains("ON c.schema_name = s.schema_name"));
        assert!(!sql.contains("ON c.customer_id"));
        assert!(sql.contains("VALUES (UPPER(:CUSTOMER_ID), :CUSTOMER_NAME, :schema_name, 'CREATED')"));
    }

    #[test]
    fn test_procedure_escapes_defaults() {
        let sql = create_customer_schema_procedure("DB");
        assert!(sql.contains("processing_status STRING DEFAULT ''PENDING''"));
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("O'Brien"), "O''Brien");
        assert_eq!(quote_literal("plain"), "plain");
    }
}

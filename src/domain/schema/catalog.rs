//! Table layouts for the shared registry and for every tenant namespace

/// A column definition rendered verbatim into DDL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub definition: &'static str,
}

const fn col(name: &'static str, definition: &'static str) -> Column {
    Column { name, definition }
}

/// A table and its columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableDef {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Column list on one line, e.g. `a STRING, b FLOAT DEFAULT 0.8`
    pub fn columns_sql(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.definition))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `CREATE TABLE IF NOT EXISTS <schema>.<name> (...)`
    pub fn create_sql(&self, schema: &str) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("    {} {}", c.name, c.definition))
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            "CREATE TABLE IF NOT EXISTS {}.{} (\n{}\n)",
            schema, self.name, columns
        )
    }
}

pub const SHARED_CONFIG_SCHEMA: &str = "SHARED_CONFIG";
pub const SHARED_UTILS_SCHEMA: &str = "SHARED_UTILS";
pub const CREATE_CUSTOMER_SCHEMA_PROCEDURE: &str = "CREATE_CUSTOMER_SCHEMA";

/// Registry of provisioned tenants
pub const CUSTOMERS: TableDef = TableDef {
    name: "CUSTOMERS",
    columns: &[
        col("customer_id", "STRING NOT NULL PRIMARY KEY"),
        col("customer_name", "STRING NOT NULL"),
        col("schema_name", "STRING NOT NULL"),
        col("status", "STRING DEFAULT 'CREATED'"),
        col("created_at", "TIMESTAMP_NTZ DEFAULT CURRENT_TIMESTAMP()"),
    ],
};

pub const TRANSCRIPTS: TableDef = TableDef {
    name: "TRANSCRIPTS",
    columns: &[
        col("transcript_id", "STRING NOT NULL PRIMARY KEY"),
        col("transcript_text", "STRING"),
        col("processing_status", "STRING DEFAULT 'PENDING'"),
        col("call_date", "TIMESTAMP_NTZ"),
        col("processed_at", "TIMESTAMP_NTZ"),
    ],
};

pub const USE_CASES: TableDef = TableDef {
    name: "USE_CASES",
    columns: &[
        col("use_case_id", "STRING NOT NULL PRIMARY KEY"),
        col("use_case_name", "STRING NOT NULL"),
        col("description", "STRING"),
        col("topics_to_track", "VARIANT"),
        col("business_value_context", "STRING"),
        col("confidence_threshold", "FLOAT DEFAULT 0.8"),
        col("is_active", "BOOLEAN DEFAULT TRUE"),
    ],
};

pub const TOPIC_SIGNALS: TableDef = TableDef {
    name: "TOPIC_SIGNALS",
    columns: &[
        col("signal_id", "STRING NOT NULL PRIMARY KEY"),
        col("transcript_id", "STRING NOT NULL"),
        col("use_case_id", "STRING NOT NULL"),
        col("topic", "STRING"),
        col("confidence_score", "FLOAT"),
        col("match_snippet", "STRING"),
        col("model_used", "STRING"),
        col("detected_at", "TIMESTAMP_NTZ DEFAULT CURRENT_TIMESTAMP()"),
    ],
};

pub const TOPIC_ANALYTICS: TableDef = TableDef {
    name: "TOPIC_ANALYTICS",
    columns: &[
        col("analytics_id", "STRING NOT NULL PRIMARY KEY"),
        col("use_case_id", "STRING NOT NULL"),
        col("topic", "STRING"),
        col("date_period", "DATE"),
        col("total_mentions", "NUMBER"),
        col("unique_transcripts", "NUMBER"),
        col("avg_confidence_score", "FLOAT"),
    ],
};

pub const PROCESSING_LOGS: TableDef = TableDef {
    name: "PROCESSING_LOGS",
    columns: &[
        col("log_id", "STRING NOT NULL PRIMARY KEY"),
        col("processing_stage", "STRING"),
        col("status", "STRING"),
        col("logged_at", "TIMESTAMP_NTZ DEFAULT CURRENT_TIMESTAMP()"),
    ],
};

/// Tables created inside every `CUSTOMER_<ID>` namespace, in creation order
pub const TENANT_TABLES: &[TableDef] = &[
    TRANSCRIPTS,
    USE_CASES,
    TOPIC_SIGNALS,
    TOPIC_ANALYTICS,
    PROCESSING_LOGS,
];

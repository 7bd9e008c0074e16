//! Per-tenant topic-detection DAG: three chained tasks plus their activation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stage::{PipelineStage, ProcessingStatus, REDRIVE_LOG_STAGE};
use crate::domain::schema::{PROCESSING_LOGS, TOPIC_ANALYTICS, TOPIC_SIGNALS, TRANSCRIPTS, USE_CASES};
use crate::domain::tenant::TenantId;
use crate::domain::warehouse::Statement;

/// Knobs that vary per deployment, not per tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub warehouse: String,
    /// Schedule clause for the root task, e.g. `USING CRON 0 */1 * * * UTC`
    pub schedule: String,
    /// Recorded in `TOPIC_SIGNALS.model_used`
    pub classifier_model: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            warehouse: "COMPUTE_WH".to_string(),
            schedule: "USING CRON 0 */1 * * * UTC".to_string(),
            classifier_model: "CORTEX_CLASSIFY".to_string(),
        }
    }
}

/// When a task fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TaskSchedule {
    Cron(String),
    /// Fully qualified name of the predecessor task
    After(String),
}

impl TaskSchedule {
    fn clause(&self) -> String {
        match self {
            Self::Cron(expr) => format!("SCHEDULE = '{}'", expr.replace('\'', "''")),
            Self::After(task) => format!("AFTER {}", task),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub stage: PipelineStage,
    pub qualified_name: String,
    pub warehouse: String,
    pub schedule: TaskSchedule,
    /// Snowflake Scripting block run by the task
    pub body: String,
}

impl TaskDefinition {
    pub fn create_statement(&self) -> Statement {
        Statement::new(
            format!("create task {}", self.stage.task_name()),
            format!(
                "CREATE OR REPLACE TASK {}\n    WAREHOUSE = {}\n    {}\nAS\nEXECUTE IMMEDIATE\n$$\n{}\n$$",
                self.qualified_name,
                self.warehouse,
                self.schedule.clause(),
                self.body
            ),
        )
    }

    pub fn resume_statement(&self) -> Statement {
        Statement::new(
            format!("resume task {}", self.stage.task_name()),
            format!("ALTER TASK {} RESUME", self.qualified_name),
        )
    }
}

/// The generated DAG for one tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub tenant_id: TenantId,
    pub namespace: String,
    pub generated_at: DateTime<Utc>,
    /// Tasks in execution order
    pub tasks: Vec<TaskDefinition>,
}

impl PipelineDefinition {
    /// Build the DAG for a tenant. Pure: the only input that varies between
    /// calls for the same tenant and settings is `now`.
    pub fn generate(tenant_id: &TenantId, settings: &PipelineSettings, now: DateTime<Utc>) -> Self {
        let namespace = tenant_id.namespace();
        let qualified = |stage: PipelineStage| format!("{}.{}", namespace, stage.task_name());

        let tasks = PipelineStage::ALL
            .iter()
            .map(|&stage| {
                let schedule = match stage.predecessor() {
                    None => TaskSchedule::Cron(settings.schedule.clone()),
                    Some(prev) => TaskSchedule::After(qualified(prev)),
                };

                TaskDefinition {
                    stage,
                    qualified_name: qualified(stage),
                    warehouse: settings.warehouse.clone(),
                    schedule,
                    body: stage_body(stage, &namespace, settings),
                }
            })
            .collect();

        Self {
            tenant_id: tenant_id.clone(),
            namespace,
            generated_at: now,
            tasks,
        }
    }

    /// Task creation statements in execution order, followed by the resume
    /// statements. Children are resumed before the root so the root never
    /// fires into suspended successors.
    pub fn statements(&self) -> Vec<Statement> {
        let mut statements: Vec<Statement> =
            self.tasks.iter().map(TaskDefinition::create_statement).collect();
        statements.extend(self.tasks.iter().rev().map(TaskDefinition::resume_statement));
        statements
    }

    /// Human-readable script of every statement
    pub fn render(&self) -> String {
        let mut out = format!(
            "-- Topic detection pipeline for customer: {}\n-- Generated on: {}\n",
            self.tenant_id,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        for (i, task) in self.tasks.iter().enumerate() {
            out.push_str(&format!(
                "\n-- Task {}: {}\n{};\n",
                i + 1,
                task.stage.description(),
                task.create_statement().sql
            ));
        }

        out.push_str("\n-- Start the pipeline\n");
        for task in self.tasks.iter().rev() {
            out.push_str(&format!("{};\n", task.resume_statement().sql));
        }

        out
    }
}

fn log_insert(namespace: &str, stage: &str, status: &str) -> String {
    format!(
        "INSERT INTO {}.{} (log_id, processing_stage, status)\n    VALUES (UUID_STRING(), '{}', '{}');",
        namespace, PROCESSING_LOGS.name, stage, status
    )
}

fn failure_handler(namespace: &str, stage: PipelineStage, extra: &str) -> String {
    format!(
        "EXCEPTION\n    WHEN OTHER THEN\n{}        {}\n        RAISE;\nEND;",
        extra,
        log_insert(namespace, stage.log_stage(), "FAILED")
    )
}

fn stage_body(stage: PipelineStage, ns: &str, settings: &PipelineSettings) -> String {
    let success_log = log_insert(ns, stage.log_stage(), "SUCCESS");

    match stage {
        PipelineStage::Ingest => format!(
            "BEGIN\n    UPDATE {ns}.{transcripts}\n    SET processing_status = '{processing}', processed_at = CURRENT_TIMESTAMP()\n    WHERE processing_status = '{pending}';\n    {success_log}\n{handler}",
            transcripts = TRANSCRIPTS.name,
            processing = ProcessingStatus::Processing,
            pending = ProcessingStatus::Pending,
            handler = failure_handler(ns, stage, ""),
        ),
        PipelineStage::Classify => {
            let mark_failed = format!(
                "        UPDATE {ns}.{transcripts}\n        SET processing_status = '{failed}'\n        WHERE processing_status = '{processing}';\n",
                transcripts = TRANSCRIPTS.name,
                failed = ProcessingStatus::Failed,
                processing = ProcessingStatus::Processing,
            );

            format!(
                "BEGIN
    INSERT INTO {ns}.{signals} (signal_id, transcript_id, use_case_id, topic, confidence_score, match_snippet, model_used)
    SELECT
        UUID_STRING(),
        t.transcript_id,
        uc.use_case_id,
        topic.value::STRING,
        {score},
        SUBSTRING(t.transcript_text, 1, 500),
        '{model}'
    FROM {ns}.{transcripts} t
    CROSS JOIN {ns}.{use_cases} uc
    CROSS JOIN TABLE(FLATTEN(input => uc.topics_to_track)) topic
    WHERE t.processing_status = '{processing}'
      AND uc.is_active = TRUE;
    UPDATE {ns}.{transcripts}
    SET processing_status = '{completed}'
    WHERE processing_status = '{processing}';
    {success_log}
{handler}",
                signals = TOPIC_SIGNALS.name,
                transcripts = TRANSCRIPTS.name,
                use_cases = USE_CASES.name,
                score = classifier_score("t.transcript_text", "topic.value::STRING"),
                model = settings.classifier_model.replace('\'', "''"),
                processing = ProcessingStatus::Processing,
                completed = ProcessingStatus::Completed,
                handler = failure_handler(ns, stage, &mark_failed),
            )
        }
        PipelineStage::Aggregate => format!(
            "BEGIN
    DELETE FROM {ns}.{analytics} WHERE date_period = CURRENT_DATE();
    INSERT INTO {ns}.{analytics} (analytics_id, use_case_id, topic, date_period, total_mentions, unique_transcripts, avg_confidence_score)
    SELECT
        UUID_STRING(),
        ts.use_case_id,
        ts.topic,
        CURRENT_DATE(),
        COUNT(*),
        COUNT(DISTINCT ts.transcript_id),
        AVG(ts.confidence_score)
    FROM {ns}.{signals} ts
    JOIN {ns}.{transcripts} t ON ts.transcript_id = t.transcript_id
    WHERE DATE(t.call_date) = CURRENT_DATE()
    GROUP BY ts.use_case_id, ts.topic;
    {success_log}
{handler}",
            analytics = TOPIC_ANALYTICS.name,
            signals = TOPIC_SIGNALS.name,
            transcripts = TRANSCRIPTS.name,
            handler = failure_handler(ns, stage, ""),
        ),
    }
}

/// `1.0` when the classifier picks the topic label over `other`, else `0.0`.
/// The classifier returns a label, not a probability.
fn classifier_score(text: &str, topic: &str) -> String {
    format!(
        "IFF(SNOWFLAKE.CORTEX.CLASSIFY_TEXT({text}, ARRAY_CONSTRUCT({topic}, 'other')):label::STRING = {topic}, 1.0, 0.0)"
    )
}

/// Requeue every `FAILED` transcript of a tenant. Re-running it when nothing is
/// `FAILED` updates zero rows.
pub fn redrive_failed(tenant_id: &TenantId) -> Statement {
    Statement::new(
        format!("redrive {}", tenant_id),
        format!(
            "UPDATE {}.{} SET processing_status = ?, processed_at = NULL WHERE processing_status = ?",
            tenant_id.namespace(),
            TRANSCRIPTS.name
        ),
    )
    .bind(ProcessingStatus::Pending.as_str())
    .bind(ProcessingStatus::Failed.as_str())
}

/// Processing log entry for a completed re-drive
pub fn redrive_log(tenant_id: &TenantId) -> Statement {
    Statement::new(
        format!("log redrive {}", tenant_id),
        log_insert(&tenant_id.namespace(), REDRIVE_LOG_STAGE, "SUCCESS")
            .trim_end_matches(';')
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::warehouse::SqlValue;
    use chrono::TimeZone;

    fn tenant() -> TenantId {
        TenantId::new("TEST001").unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_generates_six_statements() {
        let def = PipelineDefinition::generate(&tenant(), &PipelineSettings::default(), at(9));
        let statements = def.statements();

        assert_eq!(statements.len(), 6);
        for stmt in &statements[..3] {
            assert!(stmt.sql.starts_with("CREATE OR REPLACE TASK CUSTOMER_TEST001."));
        }
        for stmt in &statements[3..] {
            assert!(stmt.sql.starts_with("ALTER TASK CUSTOMER_TEST001."));
            assert!(stmt.sql.ends_with(" RESUME"));
        }
    }

    #[test]
    fn test_tasks_are_chained() {
        let def = PipelineDefinition::generate(&tenant(), &PipelineSettings::default(), at(9));
        let statements = def.statements();

        assert!(statements[0]
            .sql
            .contains("SCHEDULE = 'USING CRON 0 */1 * * * UTC'"));
        assert!(statements[1]
            .sql
            .contains("AFTER CUSTOMER_TEST001.PROCESS_TRANSCRIPTS"));
        assert!(statements[2]
            .sql
            .contains("AFTER CUSTOMER_TEST001.DETECT_TOPICS"));
        assert_eq!(
            statements[5].sql,
            "ALTER TASK CUSTOMER_TEST001.PROCESS_TRANSCRIPTS RESUME"
        );
    }

    #[test]
    fn test_classify_body_marks_failures() {
        let def = PipelineDefinition::generate(&tenant(), &PipelineSettings::default(), at(9));
        let classify = &def.tasks[1].body;

        assert!(classify.contains("CROSS JOIN TABLE(FLATTEN(input => uc.topics_to_track)) topic"));
        assert!(classify.contains("uc.is_active = TRUE"));
        assert!(classify.contains("SET processing_status = 'COMPLETED'"));
        assert!(classify.contains("WHEN OTHER THEN"));
        assert!(classify.contains("SET processing_status = 'FAILED'"));
        assert!(classify.contains("'CLASSIFICATION', 'FAILED'"));
        assert!(classify.contains("'CORTEX_CLASSIFY'"));
    }

    #[test]
    fn test_each_stage_logs_success() {
        let def = PipelineDefinition::generate(&tenant(), &PipelineSettings::default(), at(9));

        for (task, stage) in def.tasks.iter().zip(["INGESTION", "CLASSIFICATION", "AGGREGATION"]) {
            assert!(task.body.contains(&format!("'{}', 'SUCCESS'", stage)));
        }
        assert!(def.tasks[2].body.contains("WHERE DATE(t.call_date) = CURRENT_DATE()"));
    }

    #[test]
    fn test_render_identical_apart_from_timestamp() {
        let settings = PipelineSettings::default();
        let first = PipelineDefinition::generate(&tenant(), &settings, at(9)).render();
        let second = PipelineDefinition::generate(&tenant(), &settings, at(17)).render();

        assert_ne!(first, second);

        let strip = |s: &str| {
            s.lines()
                .filter(|l| !l.starts_with("-- Generated on:"))
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&first), strip(&second));
        assert!(first.contains("-- Generated on: 2024-06-10 09:00:00 UTC"));
    }

    #[test]
    fn test_custom_settings() {
        let settings = PipelineSettings {
            warehouse: "ANALYTICS_WH".to_string(),
            schedule: "USING CRON 0 2 * * * UTC".to_string(),
            classifier_model: "MY_MODEL".to_string(),
        };
        let def = PipelineDefinition::generate(&tenant(), &settings, at(9));
        let statements = def.statements();

        assert!(statements
            .iter()
            .take(3)
            .all(|s| s.sql.contains("WAREHOUSE = ANALYTICS_WH")));
        assert!(statements[1].sql.contains("'MY_MODEL'"));
    }

    #[test]
    fn test_redrive_statement() {
        let stmt = redrive_failed(&tenant());

        assert_eq!(
            stmt.sql,
            "UPDATE CUSTOMER_TEST001.TRANSCRIPTS SET processing_status = ?, processed_at = NULL WHERE processing_status = ?"
        );
        assert_eq!(
            stmt.bindings,
            vec![SqlValue::text("PENDING"), SqlValue::text("FAILED")]
        );
        assert!(redrive_log(&tenant()).sql.contains("'REDRIVE', 'SUCCESS'"));
    }
}

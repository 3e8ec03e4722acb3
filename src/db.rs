use std::path::Path;

use anyhow::Context;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::models::{JournalEntry, Response, ScoreRecord};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .with_context(|| format!("failed to open assessment database {database_url}"))
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).ok()
}

fn decode_timestamp(raw: Option<String>, table: &str) -> Option<NaiveDateTime> {
    let raw = raw?;
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        tracing::warn!(table, timestamp = %raw, "unparsable timestamp treated as missing");
    }
    parsed
}

pub async fn fetch_scores(pool: &SqlitePool, username: &str) -> anyhow::Result<Vec<ScoreRecord>> {
    let rows = sqlx::query(
        "SELECT id, username, age, total_score, timestamp \
         FROM scores WHERE username = ?1 ORDER BY id",
    )
    .bind(username)
    .fetch_all(pool)
    .await
    .context("failed to load score history")?;

    let mut history = Vec::with_capacity(rows.len());
    for row in rows {
        history.push(ScoreRecord {
            id: row.get("id"),
            username: row.get("username"),
            age: row.get("age"),
            total_score: row.get("total_score"),
            timestamp: decode_timestamp(row.get("timestamp"), "scores"),
        });
    }

    tracing::debug!(username, attempts = history.len(), "loaded score history");
    Ok(history)
}

pub async fn fetch_responses(pool: &SqlitePool, username: &str) -> anyhow::Result<Vec<Response>> {
    let rows = sqlx::query(
        "SELECT question_id, response_value, timestamp \
         FROM responses WHERE username = ?1 ORDER BY id",
    )
    .bind(username)
    .fetch_all(pool)
    .await
    .context("failed to load responses")?;

    let mut responses = Vec::with_capacity(rows.len());
    for row in rows {
        let raw_value: i64 = row.get("response_value");
        let Ok(value) = u8::try_from(raw_value) else {
            tracing::warn!(username, value = raw_value, "skipping response outside answer range");
            continue;
        };
        responses.push(Response {
            question_id: row.get("question_id"),
            value,
            timestamp: decode_timestamp(row.get("timestamp"), "responses"),
        });
    }

    Ok(responses)
}

pub async fn fetch_journal(
    pool: &SqlitePool,
    username: &str,
) -> anyhow::Result<Vec<JournalEntry>> {
    let rows = sqlx::query(
        "SELECT sentiment_score, emotional_patterns \
         FROM journal_entries WHERE username = ?1 ORDER BY rowid",
    )
    .bind(username)
    .fetch_all(pool)
    .await
    .context("failed to load journal entries")?;

    let entries = rows
        .into_iter()
        .filter_map(|row| {
            let sentiment: Option<f64> = row.get("sentiment_score");
            sentiment.map(|sentiment_score| JournalEntry {
                sentiment_score,
                emotional_patterns: row.get("emotional_patterns"),
            })
        })
        .collect();

    Ok(entries)
}

/// Appends score history rows from a CSV file. Rows already present
/// (same user, score and timestamp) are skipped.
pub async fn import_csv(pool: &SqlitePool, csv_path: &Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        username: String,
        age: Option<i64>,
        total_score: i64,
        timestamp: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid CSV record {}", index + 1))?;
        let timestamp = match row.timestamp.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_timestamp(raw).with_context(|| {
                    format!("record {}: timestamp '{raw}' is not {TIMESTAMP_FORMAT}", index + 1)
                })?;
                Some(parsed.format(TIMESTAMP_FORMAT).to_string())
            }
        };

        let result = sqlx::query(
            r#"
            INSERT INTO scores (username, age, total_score, timestamp)
            SELECT ?1, ?2, ?3, ?4
            WHERE NOT EXISTS (
                SELECT 1 FROM scores
                WHERE username = ?1 AND total_score = ?3 AND timestamp IS ?4
            )
            "#,
        )
        .bind(&row.username)
        .bind(row.age)
        .bind(row.total_score)
        .bind(timestamp)
        .execute(pool)
        .await
        .context("failed to insert score")?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    tracing::info!(inserted, path = %csv_path.display(), "imported score history");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fixture_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory database");

        for statement in [
            "CREATE TABLE scores (id INTEGER PRIMARY KEY AUTOINCREMENT, username TEXT, \
             age INTEGER, total_score INTEGER, timestamp TEXT)",
            "CREATE TABLE responses (id INTEGER PRIMARY KEY AUTOINCREMENT, username TEXT, \
             question_id INTEGER, response_value INTEGER, age_group TEXT, timestamp TEXT)",
            "CREATE TABLE journal_entries (id INTEGER PRIMARY KEY AUTOINCREMENT, username TEXT, \
             sentiment_score REAL, emotional_patterns TEXT)",
        ] {
            sqlx::query(statement).execute(&pool).await.expect("fixture table");
        }
        pool
    }

    #[tokio::test]
    async fn fetch_scores_orders_by_id_and_tolerates_bad_timestamps() {
        let pool = fixture_pool().await;
        sqlx::query(
            "INSERT INTO scores (username, age, total_score, timestamp) VALUES \
             ('riley', 31, 20, '2026-01-05 09:30:00'), \
             ('sam', 40, 18, '2026-01-06 10:00:00'), \
             ('riley', 31, 25, 'yesterday'), \
             ('riley', NULL, 28, NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let history = fetch_scores(&pool, "riley").await.unwrap();
        let scores: Vec<i64> = history.iter().map(|r| r.total_score).collect();
        assert_eq!(scores, vec![20, 25, 28]);
        assert_eq!(history[0].age, Some(31));
        assert_eq!(history[0].timestamp, parse_timestamp("2026-01-05 09:30:00"));
        assert!(history[1].timestamp.is_none());
        assert!(history[2].age.is_none());
    }

    #[tokio::test]
    async fn fetch_responses_and_journal() {
        let pool = fixture_pool().await;
        sqlx::query(
            "INSERT INTO responses (username, question_id, response_value, timestamp) VALUES \
             ('riley', 1, 4, '2026-01-05 09:30:00'), ('riley', 2, 5, NULL), ('sam', 1, 2, NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO journal_entries (username, sentiment_score, emotional_patterns) VALUES \
             ('riley', 42.5, 'calm; focus'), ('riley', NULL, NULL), ('riley', -3.0, NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let responses = fetch_responses(&pool, "riley").await.unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[1].question_id, 2);
        assert_eq!(responses[1].value, 5);

        let journal = fetch_journal(&pool, "riley").await.unwrap();
        assert_eq!(journal.len(), 2);
        assert_eq!(journal[0].emotional_patterns.as_deref(), Some("calm; focus"));
        assert_eq!(journal[1].sentiment_score, -3.0);
    }

    #[tokio::test]
    async fn import_skips_rows_already_present() {
        let pool = fixture_pool().await;
        let path = std::env::temp_dir().join(format!("eq-import-{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "username,age,total_score,timestamp\n\
             riley,31,20,2026-01-05 09:30:00\n\
             riley,31,24,\n\
             sam,,18,2026-02-01 08:00:00\n",
        )
        .unwrap();

        let first = import_csv(&pool, &path).await.unwrap();
        let second = import_csv(&pool, &path).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(first, 3);
        assert_eq!(second, 0);
        let history = fetch_scores(&pool, "riley").await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[1].timestamp.is_none());
    }

    #[test]
    fn timestamps_use_app_format() {
        assert!(parse_timestamp("2026-03-01 12:00:00").is_some());
        assert!(parse_timestamp("2026-03-01T12:00:00").is_none());
    }
}

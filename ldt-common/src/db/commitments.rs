//! Commitment persistence
//!
//! Commitments own milestones, KPIs, context entries (with their resources)
//! and attachments; agents and thematics are linked through typed join tables.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use crate::db::models::{
    Agent, Attachment, Commitment, CommitmentDetail, Context, Institution, Kpi, Milestone,
    NewCommitment, Resource, Thematic,
};
use crate::vocabulary::{Governance, KpiType, Ministry, Vocabulary};
use crate::Result;

const COMMITMENT_COLUMNS: &str =
    "id, title, ministry, summary, body, start_date, end_date, budget, institution_id";

/// Milestone fields supplied on insert
#[derive(Debug, Clone)]
pub struct NewMilestone {
    pub title: String,
    pub summary: String,
    pub body: String,
    pub due_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub budget: i64,
    pub notes: String,
}

pub(crate) fn commitment_from_row(row: &SqliteRow) -> Result<Commitment> {
    let ministry: String = row.try_get("ministry")?;
    Ok(Commitment {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        ministry: ministry.parse()?,
        summary: row.try_get("summary")?,
        body: row.try_get("body")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        budget: row.try_get("budget")?,
        institution_id: row.try_get("institution_id")?,
    })
}

pub async fn insert_institution(
    conn: &mut SqliteConnection,
    name: &str,
    kind: &str,
    party: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO institution (name, kind, party) VALUES (?, ?, ?)")
        .bind(name)
        .bind(kind)
        .bind(party)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_commitment(conn: &mut SqliteConnection, commitment: &NewCommitment) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO commitment (title, ministry, summary, body, start_date, end_date, budget, institution_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&commitment.title)
    .bind(commitment.ministry.as_str())
    .bind(&commitment.summary)
    .bind(&commitment.body)
    .bind(commitment.start_date)
    .bind(commitment.end_date)
    .bind(commitment.budget)
    .bind(commitment.institution_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_milestone(
    conn: &mut SqliteConnection,
    commitment_id: i64,
    milestone: &NewMilestone,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO milestone (commitment_id, title, summary, body, due_date, completion_date, budget, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(commitment_id)
    .bind(&milestone.title)
    .bind(&milestone.summary)
    .bind(&milestone.body)
    .bind(milestone.due_date)
    .bind(milestone.completion_date)
    .bind(milestone.budget)
    .bind(&milestone.notes)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_kpi(
    conn: &mut SqliteConnection,
    commitment_id: i64,
    kpi_type: KpiType,
    value: f64,
    unit: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO kpi (commitment_id, kpi_type, value, unit) VALUES (?, ?, ?, ?)")
        .bind(commitment_id)
        .bind(kpi_type.as_str())
        .bind(value)
        .bind(unit)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_context(
    conn: &mut SqliteConnection,
    commitment_id: i64,
    title: &str,
    subtitle: Option<&str>,
    body: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO context (commitment_id, title, subtitle, body) VALUES (?, ?, ?, ?)")
        .bind(commitment_id)
        .bind(title)
        .bind(subtitle)
        .bind(body)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_resource(conn: &mut SqliteConnection, context_id: i64, title: &str, url: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO resources (context_id, title, url) VALUES (?, ?, ?)")
        .bind(context_id)
        .bind(title)
        .bind(url)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_attachment(
    conn: &mut SqliteConnection,
    commitment_id: i64,
    title: &str,
    file_url: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO attachment (commitment_id, title, file_url) VALUES (?, ?, ?)")
        .bind(commitment_id)
        .bind(title)
        .bind(file_url)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_agent(conn: &mut SqliteConnection, name: &str, gov_level: Governance) -> Result<i64> {
    let result = sqlx::query("INSERT INTO agent (name, gov_level) VALUES (?, ?)")
        .bind(name)
        .bind(gov_level.as_str())
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn link_agent(conn: &mut SqliteConnection, commitment_id: i64, agent_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO commitment_agent (commitment_id, agent_id) VALUES (?, ?)")
        .bind(commitment_id)
        .bind(agent_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn get_commitment(pool: &SqlitePool, id: i64) -> Result<Option<Commitment>> {
    let sql = format!("SELECT {COMMITMENT_COLUMNS} FROM commitment WHERE id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(commitment_from_row).transpose()
}

fn push_ministry(builder: &mut QueryBuilder<'_, Sqlite>, ministry: Option<Ministry>) {
    if let Some(ministry) = ministry {
        builder.push(" WHERE ministry = ").push_bind(ministry.as_str());
    }
}

/// Number of commitments, optionally restricted to one ministry
pub async fn count_commitments(pool: &SqlitePool, ministry: Option<Ministry>) -> Result<i64> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM commitment");
    push_ministry(&mut count, ministry);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    Ok(total)
}

/// Page of commitments ordered by id
pub async fn list_commitments(
    pool: &SqlitePool,
    ministry: Option<Ministry>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Commitment>> {
    let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {COMMITMENT_COLUMNS} FROM commitment"));
    push_ministry(&mut select, ministry);
    select
        .push(" ORDER BY id LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows = select.build().fetch_all(pool).await?;
    rows.iter().map(commitment_from_row).collect()
}

async fn institution(pool: &SqlitePool, id: i64) -> Result<Option<Institution>> {
    let row = sqlx::query("SELECT id, name, kind, party FROM institution WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(|row| -> Result<_> {
        Ok(Institution {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            kind: row.try_get("kind")?,
            party: row.try_get("party")?,
        })
    })
    .transpose()
}

async fn milestones(pool: &SqlitePool, commitment_id: i64) -> Result<Vec<Milestone>> {
    let rows = sqlx::query(
        r#"
        SELECT id, commitment_id, title, summary, body, due_date, completion_date, budget, notes
        FROM milestone WHERE commitment_id = ?
        ORDER BY due_date IS NULL, due_date, id
        "#,
    )
    .bind(commitment_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<_> {
            Ok(Milestone {
                id: row.try_get("id")?,
                commitment_id: row.try_get("commitment_id")?,
                title: row.try_get("title")?,
                summary: row.try_get("summary")?,
                body: row.try_get("body")?,
                due_date: row.try_get("due_date")?,
                completion_date: row.try_get("completion_date")?,
                budget: row.try_get("budget")?,
                notes: row.try_get("notes")?,
            })
        })
        .collect()
}

async fn kpis(pool: &SqlitePool, commitment_id: i64) -> Result<Vec<Kpi>> {
    let rows = sqlx::query("SELECT id, commitment_id, kpi_type, value, unit FROM kpi WHERE commitment_id = ? ORDER BY id")
        .bind(commitment_id)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<_> {
            let kpi_type: String = row.try_get("kpi_type")?;
            Ok(Kpi {
                id: row.try_get("id")?,
                commitment_id: row.try_get("commitment_id")?,
                kpi_type: kpi_type.parse()?,
                value: row.try_get("value")?,
                unit: row.try_get("unit")?,
            })
        })
        .collect()
}

async fn contexts(pool: &SqlitePool, commitment_id: i64) -> Result<Vec<Context>> {
    let rows = sqlx::query("SELECT id, commitment_id, title, subtitle, body FROM context WHERE commitment_id = ? ORDER BY id")
        .bind(commitment_id)
        .fetch_all(pool)
        .await?;

    let mut contexts = Vec::with_capacity(rows.len());
    for row in &rows {
        let id: i64 = row.try_get("id")?;
        let resources = sqlx::query("SELECT id, context_id, title, url FROM resources WHERE context_id = ? ORDER BY id")
            .bind(id)
            .fetch_all(pool)
            .await?
            .iter()
            .map(|r| -> Result<_> {
                Ok(Resource {
                    id: r.try_get("id")?,
                    context_id: r.try_get("context_id")?,
                    title: r.try_get("title")?,
                    url: r.try_get("url")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        contexts.push(Context {
            id,
            commitment_id: row.try_get("commitment_id")?,
            title: row.try_get("title")?,
            subtitle: row.try_get("subtitle")?,
            body: row.try_get("body")?,
            resources,
        });
    }
    Ok(contexts)
}

async fn attachments(pool: &SqlitePool, commitment_id: i64) -> Result<Vec<Attachment>> {
    let rows = sqlx::query("SELECT id, commitment_id, title, file_url FROM attachment WHERE commitment_id = ? ORDER BY id")
        .bind(commitment_id)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<_> {
            Ok(Attachment {
                id: row.try_get("id")?,
                commitment_id: row.try_get("commitment_id")?,
                title: row.try_get("title")?,
                file_url: row.try_get("file_url")?,
            })
        })
        .collect()
}

async fn agents(pool: &SqlitePool, commitment_id: i64) -> Result<Vec<Agent>> {
    let rows = sqlx::query(
        r#"
        SELECT a.id, a.name, a.gov_level
        FROM agent a JOIN commitment_agent ca ON ca.agent_id = a.id
        WHERE ca.commitment_id = ?
        ORDER BY a.name
        "#,
    )
    .bind(commitment_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<_> {
            let gov_level: String = row.try_get("gov_level")?;
            Ok(Agent {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                gov_level: gov_level.parse()?,
            })
        })
        .collect()
}

async fn thematics(pool: &SqlitePool, commitment_id: i64) -> Result<Vec<Thematic>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.name, t.slug, t.description
        FROM thematic t JOIN commitment_thematic ct ON ct.thematic_id = t.id
        WHERE ct.commitment_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(commitment_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(crate::db::thematics::thematic_from_row).collect()
}

/// Load a commitment with everything it owns or is linked to
pub async fn get_commitment_detail(pool: &SqlitePool, id: i64) -> Result<Option<CommitmentDetail>> {
    let Some(commitment) = get_commitment(pool, id).await? else {
        return Ok(None);
    };

    let institution = match commitment.institution_id {
        Some(institution_id) => institution(pool, institution_id).await?,
        None => None,
    };

    Ok(Some(CommitmentDetail {
        institution,
        milestones: milestones(pool, id).await?,
        kpis: kpis(pool, id).await?,
        context: contexts(pool, id).await?,
        attachments: attachments(pool, id).await?,
        agents: agents(pool, id).await?,
        thematics: thematics(pool, id).await?,
        draft_laws: crate::db::links::draft_laws_for_commitment(pool, id).await?,
        commitment,
    }))
}

//! Demonstration data
//!
//! Two commitments with their institutions, milestones, KPIs, context,
//! attachments, agents, thematics and deliberation threads, written in one
//! transaction.

use chrono::{Days, Local, NaiveDate};
use ldt_common::db::commitments::{
    insert_agent, insert_attachment, insert_commitment, insert_context, insert_institution,
    insert_kpi, insert_milestone, insert_resource, link_agent, NewMilestone,
};
use ldt_common::db::models::NewCommitment;
use ldt_common::db::thematics::{insert_polis_thread, insert_thematic, link_thematic};
use ldt_common::vocabulary::{Governance, KpiType, Ministry};
use ldt_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

/// Rows written by [`seed_demo`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub institutions: usize,
    pub commitments: usize,
    pub milestones: usize,
    pub kpis: usize,
    pub contexts: usize,
    pub resources: usize,
    pub attachments: usize,
    pub agents: usize,
    pub thematics: usize,
    pub polis_threads: usize,
}

fn offset(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    let delta = Days::new(days.unsigned_abs());
    if days >= 0 {
        today.checked_add_days(delta)
    } else {
        today.checked_sub_days(delta)
    }
}

/// Insert the demonstration data set unless commitments already exist
///
/// Returns `None` when the store was already populated.
pub async fn seed_demo(pool: &SqlitePool) -> Result<Option<SeedSummary>> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commitment")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!("Store already holds {existing} commitment(s), not seeding");
        return Ok(None);
    }

    let today = Local::now().date_naive();
    let mut summary = SeedSummary::default();
    let mut tx = pool.begin().await?;

    // Institutions
    let city = insert_institution(&mut tx, "Ville de Luxembourg", "Municipality", Some("DP")).await?;
    let environment = insert_institution(
        &mut tx,
        "Ministère de l'Environnement, du Climat et de la Biodiversité",
        "Ministry",
        Some("CSV"),
    )
    .await?;
    summary.institutions = 2;

    // Commitments
    let tram = insert_commitment(
        &mut tx,
        &NewCommitment {
            title: "Tram Network Extension".to_string(),
            ministry: Ministry::Mmtp,
            summary: Some("Extend the tram line to new districts to reduce congestion.".to_string()),
            body: Some("Background, stakeholders, funding and indicators.".to_string()),
            start_date: offset(today, -120),
            end_date: offset(today, 480),
            budget: Some(120_000_000),
            institution_id: Some(city),
        },
    )
    .await?;
    let roofs = insert_commitment(
        &mut tx,
        &NewCommitment {
            title: "Green Roofs Program".to_string(),
            ministry: Ministry::Mecb,
            summary: Some("Subsidies for green roofs on public buildings for urban cooling.".to_string()),
            body: Some("Programme details, eligibility and monitoring indicators.".to_string()),
            start_date: offset(today, -30),
            end_date: offset(today, 335),
            budget: Some(12_500_000),
            institution_id: Some(environment),
        },
    )
    .await?;
    summary.commitments = 2;

    // Milestones
    let milestones = [
        (
            tram,
            NewMilestone {
                title: "Feasibility Study".to_string(),
                summary: "Finalize multi-criteria analysis and align with mobility plan.".to_string(),
                body: "Scope, constraints, and first stakeholder workshop.".to_string(),
                due_date: offset(today, -60),
                completion_date: offset(today, -62),
                budget: 500_000,
                notes: "On time".to_string(),
            },
        ),
        (
            tram,
            NewMilestone {
                title: "Tender Publication".to_string(),
                summary: "Publish construction tender in the EU journal.".to_string(),
                body: "Lots A/B/C; includes track, power, signaling.".to_string(),
                due_date: offset(today, 45),
                completion_date: None,
                budget: 1_200_000,
                notes: "Draft in review".to_string(),
            },
        ),
        (
            roofs,
            NewMilestone {
                title: "Pilot Roof Installations".to_string(),
                summary: "Complete pilots on 5 buildings to validate specs.".to_string(),
                body: "Monitoring sensors and maintenance procedures included.".to_string(),
                due_date: offset(today, 90),
                completion_date: None,
                budget: 1_000_000,
                notes: "Risk: contractor capacity".to_string(),
            },
        ),
    ];
    for (commitment_id, milestone) in &milestones {
        insert_milestone(&mut tx, *commitment_id, milestone).await?;
        summary.milestones += 1;
    }

    // KPIs
    for (commitment_id, kpi_type, value, unit) in [
        (tram, KpiType::Progress, 25.0, "%"),
        (tram, KpiType::InfoAvailability, 3.0, "/5"),
        (roofs, KpiType::Progress, 10.0, "%"),
        (roofs, KpiType::Impact, 1.5, "°C"),
    ] {
        insert_kpi(&mut tx, commitment_id, kpi_type, value, unit).await?;
        summary.kpis += 1;
    }

    // Context and studies
    let tram_context = insert_context(
        &mut tx,
        tram,
        "Congestion on the main axes",
        Some("Why a tram extension"),
        Some("Commuter flows have grown steadily over the last decade."),
    )
    .await?;
    insert_resource(
        &mut tx,
        tram_context,
        "Mobility survey",
        "https://example.org/studies/mobility-survey.pdf",
    )
    .await?;
    let roofs_context = insert_context(&mut tx, roofs, "Urban heat islands", None, None).await?;
    insert_resource(
        &mut tx,
        roofs_context,
        "Urban heat map",
        "https://example.org/studies/heat-map.pdf",
    )
    .await?;
    summary.contexts = 2;
    summary.resources = 2;

    // Attachments
    insert_attachment(
        &mut tx,
        tram,
        "Feasibility Report (PDF)",
        Some("https://example.org/files/tram-feasibility.pdf"),
    )
    .await?;
    insert_attachment(
        &mut tx,
        roofs,
        "Green Roofs Guidelines",
        Some("https://example.org/files/green-roofs-guidelines.pdf"),
    )
    .await?;
    summary.attachments = 2;

    // Agents
    let mayor = insert_agent(&mut tx, "Lydie Polfer", Governance::Municipal).await?;
    let alderman = insert_agent(&mut tx, "Patrick Goldschmidt", Governance::Municipal).await?;
    let council = insert_agent(&mut tx, "Conseil d'État", Governance::CouncilOfState).await?;
    link_agent(&mut tx, tram, mayor).await?;
    link_agent(&mut tx, tram, alderman).await?;
    link_agent(&mut tx, roofs, council).await?;
    summary.agents = 3;

    // Thematics and deliberation
    let mobility = insert_thematic(&mut tx, "Mobilité", "mobilite", Some("Transport and public space")).await?;
    let climate = insert_thematic(&mut tx, "Climat", "climat", Some("Climate adaptation and biodiversity")).await?;
    link_thematic(&mut tx, tram, mobility).await?;
    link_thematic(&mut tx, roofs, climate).await?;
    summary.thematics = 2;

    insert_polis_thread(
        &mut tx,
        mobility,
        Some("Public consultation on tram extension routing."),
        "https://pol.is/example-tram",
    )
    .await?;
    insert_polis_thread(
        &mut tx,
        climate,
        Some("Ideas for green roofs maintenance partnerships."),
        "https://pol.is/example-green-roofs",
    )
    .await?;
    summary.polis_threads = 2;

    tx.commit().await?;
    info!(?summary, "Seeded demonstration data");
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldt_common::db::commitments::{count_commitments, get_commitment_detail, list_commitments};
    use ldt_common::db::init::init_database;
    use ldt_common::db::thematics::list_thematics;

    #[test]
    fn offsets_both_directions() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(offset(today, 1), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(offset(today, -31), NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[tokio::test]
    async fn seeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("seed.db")).await.unwrap();

        let summary = seed_demo(&pool).await.unwrap().unwrap();
        assert_eq!(summary.commitments, 2);
        assert_eq!(summary.milestones, 3);

        assert_eq!(count_commitments(&pool, None).await.unwrap(), 2);
        let commitments = list_commitments(&pool, None, 10, 0).await.unwrap();
        let detail = get_commitment_detail(&pool, commitments[0].id).await.unwrap().unwrap();
        assert_eq!(detail.milestones.len(), 2);
        assert_eq!(detail.agents.len(), 2);
        assert_eq!(detail.context[0].resources.len(), 1);
        assert_eq!(list_thematics(&pool).await.unwrap().len(), 2);

        assert!(seed_demo(&pool).await.unwrap().is_none());
    }
}

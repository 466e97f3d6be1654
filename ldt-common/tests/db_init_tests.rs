//! Integration tests for database bootstrap and the repositories built on it

use chrono::NaiveDate;
use ldt_common::db::commitments::{
    get_commitment_detail, insert_commitment, insert_context, insert_institution, insert_kpi,
    insert_resource, list_commitments, count_commitments,
};
use ldt_common::db::draft_laws::{count_draft_laws, get_draft_law_detail, insert_draft_laws};
use ldt_common::db::init::init_database;
use ldt_common::db::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use ldt_common::db::models::{NewCommitment, NewDraftLaw};
use ldt_common::db::thematics::{get_thematic_detail, insert_polis_thread, insert_thematic, link_thematic};
use ldt_common::db::{link_draft_law, unlink_draft_law};
use ldt_common::vocabulary::{KpiType, LawKind, LawStatus, Ministry};
use ldt_common::Error;
use sqlx::SqlitePool;

async fn fresh_pool() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("store").join("ldt.db"))
        .await
        .unwrap();
    (dir, pool)
}

fn draft_law(number: u32) -> NewDraftLaw {
    NewDraftLaw {
        law_number: number,
        kind: LawKind::PropositionDeLoi,
        deposit_date: NaiveDate::from_ymd_opt(2022, 11, 15),
        evacuation_date: None,
        status: LawStatus::EnCommission,
        title: format!("Proposition {number}"),
        content: String::new(),
        authors: None,
    }
}

fn commitment(title: &str, ministry: Ministry) -> NewCommitment {
    NewCommitment {
        title: title.to_string(),
        ministry,
        summary: None,
        body: None,
        start_date: None,
        end_date: None,
        budget: Some(1_500_000),
        institution_id: None,
    }
}

#[tokio::test]
async fn test_database_created_with_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("deeper").join("ldt.db");

    let pool = init_database(&db_path).await.unwrap();
    assert!(db_path.exists(), "Database file was not created");

    let version = get_schema_version(&pool).await.unwrap();
    assert_eq!(version, CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ldt.db");

    let pool = init_database(&db_path).await.unwrap();
    insert_draft_laws(&pool, &[draft_law(1)]).await.unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(count_draft_laws(&pool).await.unwrap(), 1);
    assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let (_dir, pool) = fresh_pool().await;

    let result = sqlx::query("INSERT INTO milestone (commitment_id, title) VALUES (4242, 'orphan')")
        .execute(&pool)
        .await;
    assert!(result.is_err(), "orphan milestone must be rejected");
}

#[tokio::test]
async fn test_duplicate_link_rejected() {
    let (_dir, pool) = fresh_pool().await;
    let ids = insert_draft_laws(&pool, &[draft_law(8000)]).await.unwrap();
    let mut conn = pool.acquire().await.unwrap();
    let commitment_id = insert_commitment(&mut conn, &commitment("Logement abordable", Ministry::Mlogat))
        .await
        .unwrap();
    drop(conn);

    let linked = link_draft_law(&pool, ids[0], commitment_id).await.unwrap();
    assert_eq!(linked.draft_law_id, ids[0]);
    assert_eq!(linked.commitment_id, commitment_id);

    match link_draft_law(&pool, ids[0], commitment_id).await {
        Err(Error::DuplicateLink {
            draft_law_id,
            commitment_id: c,
        }) => {
            assert_eq!(draft_law_id, ids[0]);
            assert_eq!(c, commitment_id);
        }
        other => panic!("expected DuplicateLink, got {other:?}"),
    }

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM draft_law_commitment_link")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 1);

    let detail = get_draft_law_detail(&pool, ids[0]).await.unwrap().unwrap();
    assert_eq!(detail.commitments.len(), 1);
    assert_eq!(detail.commitments[0].title, "Logement abordable");
}

#[tokio::test]
async fn test_link_to_missing_records_is_not_found() {
    let (_dir, pool) = fresh_pool().await;
    let ids = insert_draft_laws(&pool, &[draft_law(12)]).await.unwrap();

    assert!(matches!(
        link_draft_law(&pool, ids[0], 999).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        unlink_draft_law(&pool, ids[0], 999).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_unlink_then_relink() {
    let (_dir, pool) = fresh_pool().await;
    let ids = insert_draft_laws(&pool, &[draft_law(77)]).await.unwrap();
    let mut conn = pool.acquire().await.unwrap();
    let commitment_id = insert_commitment(&mut conn, &commitment("Mobilité", Ministry::Mmtp))
        .await
        .unwrap();
    drop(conn);

    link_draft_law(&pool, ids[0], commitment_id).await.unwrap();
    unlink_draft_law(&pool, ids[0], commitment_id).await.unwrap();
    link_draft_law(&pool, ids[0], commitment_id).await.unwrap();
}

#[tokio::test]
async fn test_commitment_detail_bundle() {
    let (_dir, pool) = fresh_pool().await;
    let mut tx = pool.begin().await.unwrap();
    let institution_id = insert_institution(&mut tx, "Gouvernement", "Executive", None)
        .await
        .unwrap();
    let mut new = commitment("Transition énergétique", Ministry::Meco);
    new.institution_id = Some(institution_id);
    let commitment_id = insert_commitment(&mut tx, &new).await.unwrap();
    insert_kpi(&mut tx, commitment_id, KpiType::Progress, 42.5, "%")
        .await
        .unwrap();
    let context_id = insert_context(&mut tx, commitment_id, "Contexte", None, Some("Historique"))
        .await
        .unwrap();
    insert_resource(&mut tx, context_id, "Étude", "https://example.org/etude.pdf")
        .await
        .unwrap();
    let thematic_id = insert_thematic(&mut tx, "Climat", "climat", None).await.unwrap();
    link_thematic(&mut tx, commitment_id, thematic_id).await.unwrap();
    insert_polis_thread(&mut tx, thematic_id, Some("Débat"), "https://pol.is/climat")
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let detail = get_commitment_detail(&pool, commitment_id).await.unwrap().unwrap();
    assert_eq!(detail.institution.as_ref().map(|i| i.name.as_str()), Some("Gouvernement"));
    assert_eq!(detail.kpis.len(), 1);
    assert_eq!(detail.kpis[0].kpi_type, KpiType::Progress);
    assert_eq!(detail.context.len(), 1);
    assert_eq!(detail.context[0].resources.len(), 1);
    assert_eq!(detail.thematics.len(), 1);
    assert!(detail.draft_laws.is_empty());

    let page = list_commitments(&pool, Some(Ministry::Meco), 10, 0).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, commitment_id);
    assert_eq!(count_commitments(&pool, Some(Ministry::Meco)).await.unwrap(), 1);
    assert_eq!(count_commitments(&pool, Some(Ministry::Mlogat)).await.unwrap(), 0);

    let thematic = get_thematic_detail(&pool, "climat").await.unwrap().unwrap();
    assert_eq!(thematic.commitments.len(), 1);
    assert_eq!(thematic.polis_threads.len(), 1);
    assert!(get_thematic_detail(&pool, "absent").await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleting_commitment_cascades() {
    let (_dir, pool) = fresh_pool().await;
    let ids = insert_draft_laws(&pool, &[draft_law(5)]).await.unwrap();
    let mut conn = pool.acquire().await.unwrap();
    let commitment_id = insert_commitment(&mut conn, &commitment("Santé", Ministry::M3s))
        .await
        .unwrap();
    insert_kpi(&mut conn, commitment_id, KpiType::Impact, 1.0, "pts")
        .await
        .unwrap();
    drop(conn);
    link_draft_law(&pool, ids[0], commitment_id).await.unwrap();

    sqlx::query("DELETE FROM commitment WHERE id = ?")
        .bind(commitment_id)
        .execute(&pool)
        .await
        .unwrap();

    let kpis: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kpi").fetch_one(&pool).await.unwrap();
    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM draft_law_commitment_link")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(kpis, 0);
    assert_eq!(links, 0);
    // the draft law itself survives
    assert_eq!(count_draft_laws(&pool).await.unwrap(), 1);
}

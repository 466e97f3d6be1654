//! End-to-end import runs against temporary workbooks and databases

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ldt_common::db::draft_laws::{count_draft_laws, get_draft_law};
use ldt_common::db::init::init_database;
use ldt_common::vocabulary::{LawKind, LawStatus};
use ldt_import::{ImportError, ImportOptions, ImportOutcome, Importer};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use sqlx::SqlitePool;
use tempfile::TempDir;

const HEADERS: [&str; 8] = [
    "law_number",
    "law_type",
    "law_deposit_date",
    "law_evacuation_date",
    "law_status",
    "law_title",
    "law_content",
    "law_authors",
];

enum Cell {
    Text(&'static str),
    Number(f64),
    Date(u16, u8, u8),
    Blank,
}

use Cell::{Blank, Date, Number, Text};

/// Write a workbook: each sheet is a header row followed by data rows
fn write_xlsx(path: &Path, sheets: &[(&str, Vec<Vec<Cell>>)]) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");

    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Text(s) => {
                        worksheet.write_string(r, c, *s).unwrap();
                    }
                    Number(n) => {
                        worksheet.write_number(r, c, *n).unwrap();
                    }
                    Date(y, m, d) => {
                        let date = ExcelDateTime::from_ymd(*y, *m, *d).unwrap();
                        worksheet.write_datetime_with_format(r, c, &date, &date_format).unwrap();
                    }
                    Blank => {}
                }
            }
        }
    }

    workbook.save(path).unwrap();
}

fn reference_row() -> Vec<Cell> {
    vec![
        Text("112/A"),
        Text("Projet de loi"),
        Text("01/03/2023"),
        Blank,
        Text("Cree"),
        Text("Test"),
    ]
}

fn row(number: &'static str, status: &'static str, title: &'static str) -> Vec<Cell> {
    vec![
        Text(number),
        Text("Proposition de loi"),
        Blank,
        Blank,
        Text(status),
        Text(title),
        Text("Contenu"),
        Text("Commission juridique"),
    ]
}

async fn setup() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("ldt.db")).await.unwrap();
    (dir, pool)
}

fn workbook_path(dir: &TempDir) -> PathBuf {
    dir.path().join("draft_laws.xlsx")
}

async fn run(
    pool: &SqlitePool,
    path: &Path,
    options: ImportOptions,
) -> (Result<ldt_import::ImportReport, ImportError>, String) {
    let mut out = Vec::new();
    let result = Importer::default().run(pool, path, &options, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn imports_reference_row() {
    let (dir, pool) = setup().await;
    let path = workbook_path(&dir);
    write_xlsx(&path, &[("Sheet1", vec![reference_row()])]);

    let (result, out) = run(&pool, &path, ImportOptions::default()).await;
    let report = result.unwrap();

    assert_eq!(report.rows_processed, 1);
    assert_eq!(report.valid_count, 1);
    assert!(report.warnings.is_empty());
    let ImportOutcome::Inserted { ids } = &report.outcome else {
        panic!("expected insert, got {:?}", report.outcome);
    };
    assert_eq!(ids.len(), 1);

    let law = get_draft_law(&pool, ids[0]).await.unwrap().unwrap();
    assert_eq!(law.law_number, 112);
    assert_eq!(law.kind, LawKind::ProjetDeLoi);
    assert_eq!(law.status, LawStatus::Created);
    assert_eq!(law.deposit_date, NaiveDate::from_ymd_opt(2023, 3, 1));
    assert_eq!(law.evacuation_date, None);
    assert_eq!(law.title, "Test");

    let canonical = std::fs::canonicalize(&path).unwrap();
    let expected = format!(
        "Processed 1 row(s) from {}.\n1 row(s) are valid.\nInserted 1 draft law(s) into the database.\n",
        canonical.display()
    );
    assert_eq!(out, expected);
}

#[tokio::test]
async fn iso_date_is_a_row_warning() {
    let (dir, pool) = setup().await;
    let path = workbook_path(&dir);
    let mut cells = reference_row();
    cells[2] = Text("2023-03-01");
    write_xlsx(&path, &[("Sheet1", vec![cells])]);

    let (result, out) = run(&pool, &path, ImportOptions::default()).await;
    let report = result.unwrap();

    assert_eq!(report.valid_count, 0);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].row_number, 2);
    assert!(report.warnings[0].message.contains("law_deposit_date"));
    assert_eq!(report.outcome, ImportOutcome::NothingToInsert);
    assert!(out.contains("Warnings for skipped rows:\n  - Row 2: law_deposit_date"));
    assert!(out.ends_with("0 row(s) are valid.\nNo valid draft laws to insert.\n"));
    assert_eq!(count_draft_laws(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let (dir, pool) = setup().await;
    let path = workbook_path(&dir);
    write_xlsx(
        &path,
        &[(
            "Sheet1",
            vec![
                row("7001", "Créé", "Un"),
                row("", "Créé", "Sans numéro"),
                row("7003", "Vote accepté", "Trois"),
            ],
        )],
    );

    let (dry, out) = run(
        &pool,
        &path,
        ImportOptions {
            dry_run: true,
            ..Default::default()
        },
    )
    .await;
    let dry = dry.unwrap();
    assert_eq!(dry.outcome, ImportOutcome::DryRun);
    assert!(out.ends_with("2 row(s) are valid.\nDry run enabled; nothing was written to the database.\n"));
    assert_eq!(count_draft_laws(&pool).await.unwrap(), 0);

    let (real, _) = run(&pool, &path, ImportOptions::default()).await;
    let real = real.unwrap();
    assert_eq!(real.valid_count, dry.valid_count);
    assert_eq!(real.warnings, dry.warnings);
    assert_eq!(count_draft_laws(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn failed_persistence_rolls_back_whole_batch() {
    let (dir, pool) = setup().await;
    sqlx::query(
        r#"
        CREATE TRIGGER reject_poison BEFORE INSERT ON draft_law
        WHEN NEW.law_title = 'Poison'
        BEGIN
            SELECT RAISE(ABORT, 'poisoned row');
        END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let path = workbook_path(&dir);
    write_xlsx(
        &path,
        &[(
            "Sheet1",
            vec![
                row("1", "Publié", "Sain"),
                row("2", "Publié", "Aussi sain"),
                row("3", "Publié", "Poison"),
            ],
        )],
    );

    let (result, out) = run(&pool, &path, ImportOptions::default()).await;
    assert!(matches!(result, Err(ImportError::PersistenceFailure(_))));
    // the report was written before the failed commit
    assert!(out.contains("3 row(s) are valid."));
    assert!(!out.contains("Inserted"));
    assert_eq!(count_draft_laws(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn blank_rows_leave_gaps_in_row_numbers() {
    let (dir, pool) = setup().await;
    let path = workbook_path(&dir);
    write_xlsx(
        &path,
        &[(
            "Sheet1",
            vec![
                row("10", "En commission", "Deux"),
                vec![Blank, Blank, Blank],
                vec![Blank],
                row("13", "Inconnu", "Cinq"),
            ],
        )],
    );

    let (result, out) = run(&pool, &path, ImportOptions::default()).await;
    let report = result.unwrap();
    assert_eq!(report.rows_processed, 2);
    assert_eq!(report.valid_count, 1);
    assert_eq!(report.warnings[0].row_number, 5);
    assert!(out.contains("  - Row 5: law_status"));
}

#[tokio::test]
async fn typed_cells_are_normalized() {
    let (dir, pool) = setup().await;
    let path = workbook_path(&dir);
    write_xlsx(
        &path,
        &[(
            "Sheet1",
            vec![vec![
                Number(8123.0),
                Text("Draft"),
                Date(2022, 12, 24),
                Text("15/01/2023"),
                Text("Vote refusé"),
                Text("  Réforme  "),
            ]],
        )],
    );

    let (result, _) = run(&pool, &path, ImportOptions::default()).await;
    let ImportOutcome::Inserted { ids } = result.unwrap().outcome else {
        panic!("expected insert");
    };
    let law = get_draft_law(&pool, ids[0]).await.unwrap().unwrap();
    assert_eq!(law.law_number, 8123);
    assert_eq!(law.deposit_date, NaiveDate::from_ymd_opt(2022, 12, 24));
    assert_eq!(law.evacuation_date, NaiveDate::from_ymd_opt(2023, 1, 15));
    assert_eq!(law.status, LawStatus::VoteRefuse);
    assert_eq!(law.title, "Réforme");
}

#[tokio::test]
async fn sheet_selection() {
    let (dir, pool) = setup().await;
    let path = workbook_path(&dir);
    write_xlsx(
        &path,
        &[
            ("Archive", vec![row("1", "Publié", "Ancien")]),
            ("Projets", vec![row("2", "Créé", "Nouveau"), row("3", "Créé", "Autre")]),
        ],
    );

    let first = Importer::default().validate(&path, None).unwrap();
    assert_eq!(first.valid.len(), 1);
    assert_eq!(first.valid[0].title, "Ancien");

    let named = Importer::default().validate(&path, Some("Projets")).unwrap();
    assert_eq!(named.valid.len(), 2);

    let (result, out) = run(
        &pool,
        &path,
        ImportOptions {
            sheet: Some("Missing".to_string()),
            dry_run: false,
        },
    )
    .await;
    match result {
        Err(ImportError::SheetNotFound { sheet, .. }) => assert_eq!(sheet, "Missing"),
        other => panic!("expected SheetNotFound, got {other:?}"),
    }
    assert!(out.is_empty());
}

#[tokio::test]
async fn missing_document_is_fatal() {
    let (dir, pool) = setup().await;
    let (result, out) = run(&pool, &dir.path().join("absent.xlsx"), ImportOptions::default()).await;
    assert!(matches!(result, Err(ImportError::SourceNotFound(_))));
    assert!(out.is_empty());
}

#[tokio::test]
async fn unreadable_workbook_is_malformed() {
    let (dir, pool) = setup().await;
    let path = workbook_path(&dir);
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let (result, _) = run(&pool, &path, ImportOptions::default()).await;
    assert!(matches!(result, Err(ImportError::Malformed { .. })));
}

#[tokio::test]
async fn csv_documents_import() {
    let (dir, pool) = setup().await;
    let path = dir.path().join("draft_laws.csv");
    std::fs::write(
        &path,
        "law_number,law_type,law_deposit_date,law_status,law_title,law_authors\n\
         112/A,Projet de loi,01/03/2023,Cree,Test,\n\
         ,,,,,\n\
         N° 8000,Proposition,,\"Vote accepté, puis rejeté\",\"Titre, avec virgule\",  Députés  \n",
    )
    .unwrap();

    let (result, _) = run(
        &pool,
        &path,
        ImportOptions {
            sheet: Some("ignored".to_string()),
            dry_run: false,
        },
    )
    .await;
    let report = result.unwrap();
    assert_eq!(report.rows_processed, 2);
    assert!(report.warnings.is_empty());

    let ImportOutcome::Inserted { ids } = report.outcome else {
        panic!("expected insert");
    };
    let second = get_draft_law(&pool, ids[1]).await.unwrap().unwrap();
    assert_eq!(second.law_number, 8000);
    assert_eq!(second.kind, LawKind::PropositionDeLoi);
    assert_eq!(second.status, LawStatus::VoteRefuse);
    assert_eq!(second.title, "Titre, avec virgule");
    assert_eq!(second.authors.as_deref(), Some("Députés"));
}

#[tokio::test]
async fn reimport_inserts_duplicates() {
    let (dir, pool) = setup().await;
    let path = workbook_path(&dir);
    write_xlsx(&path, &[("Sheet1", vec![reference_row()])]);

    run(&pool, &path, ImportOptions::default()).await.0.unwrap();
    run(&pool, &path, ImportOptions::default()).await.0.unwrap();
    assert_eq!(count_draft_laws(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn csv_warnings_cite_document_lines_after_empty_lines() {
    let (dir, pool) = setup().await;
    let path = dir.path().join("draft_laws.csv");
    std::fs::write(
        &path,
        "law_number,law_type,law_deposit_date,law_status\n\
         1,Projet,01/03/2023,Cree\n\
         \n\
         \n\
         4,Projet,,Nonsense\n\
         \n\
         6,Projet,01/03/23,Cree\n",
    )
    .unwrap();

    let batch = Importer::default().validate(&path, None).unwrap();

    assert_eq!(batch.rows_processed, 3);
    assert_eq!(batch.valid.len(), 1);
    let rows: Vec<usize> = batch.warnings.iter().map(|w| w.row_number).collect();
    assert_eq!(rows, vec![5, 7]);
    assert!(batch.warnings[0].message.contains("law_status"));
    // two-digit years are not silently widened
    assert!(batch.warnings[1].message.contains("law_deposit_date"));
    assert_eq!(count_draft_laws(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn store_is_opened_only_when_rows_are_written() {
    let (dir, pool) = setup().await;
    let path = workbook_path(&dir);
    write_xlsx(&path, &[("Sheet1", vec![reference_row()])]);
    let opened = std::cell::Cell::new(0);
    let (counter, store) = (&opened, &pool);

    let dry_run = ImportOptions {
        sheet: None,
        dry_run: true,
    };
    let report = Importer::default()
        .run_with_store(&path, &dry_run, &mut Vec::new(), move || async move {
            counter.set(counter.get() + 1);
            Ok(store.clone())
        })
        .await
        .unwrap();
    assert_eq!(report.outcome, ImportOutcome::DryRun);
    assert_eq!(opened.get(), 0);

    let report = Importer::default()
        .run_with_store(&path, &ImportOptions::default(), &mut Vec::new(), move || async move {
            counter.set(counter.get() + 1);
            Ok(store.clone())
        })
        .await
        .unwrap();
    assert!(matches!(report.outcome, ImportOutcome::Inserted { .. }));
    assert_eq!(opened.get(), 1);
    assert_eq!(count_draft_laws(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn unavailable_store_fails_after_summary() {
    let (dir, _pool) = setup().await;
    let path = workbook_path(&dir);
    write_xlsx(&path, &[("Sheet1", vec![reference_row()])]);

    let mut out = Vec::new();
    let result = Importer::default()
        .run_with_store(&path, &ImportOptions::default(), &mut out, || async {
            Err::<sqlx::SqlitePool, _>(ldt_common::Error::Config("no database configured".to_string()))
        })
        .await;

    assert!(matches!(result, Err(ImportError::StoreUnavailable(_))));
    let out = String::from_utf8(out).unwrap();
    assert!(out.ends_with("1 row(s) are valid.\n"));
}

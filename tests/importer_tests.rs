// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use goldclip::store::{PurchaseFilter, list_purchases};
use goldclip::{cli, commands::importer, db};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file.flush().unwrap();
    file
}

fn run_import(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["goldclip", "import", "purchases"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(conn, import_m)
    } else {
        panic!("no import subcommand");
    }
}

#[test]
fn importer_recomputes_total_cost_and_ignores_ids() {
    let mut conn = base_conn();
    let file = csv_file(
        "id,date,karat,weight,price_per_gram,manufacturing,other_expenses,total_cost\n\
         99,2025-01-10,21,10,3500,500,0,1\n\
         7,2025-02-01,18,5.5,3000,,25,\n",
    );
    let path = file.path().to_str().unwrap().to_string();
    let padded = format!("  {}  ", path);
    run_import(&mut conn, &["--path", &padded]).unwrap();

    let rows = list_purchases(&conn, "local", &PurchaseFilter::default()).unwrap();
    assert_eq!(rows.len(), 2);
    // newest first
    assert_eq!(rows[0].date.to_string(), "2025-02-01");
    assert_eq!(rows[0].total_cost, dec!(16525));
    assert_eq!(rows[0].manufacturing, dec!(0));
    assert_eq!(rows[1].total_cost, dec!(35500));
    assert!(rows.iter().all(|p| p.id != 99 && p.id != 7));
}

#[test]
fn importer_assigns_rows_to_owner_flag() {
    let mut conn = base_conn();
    let file = csv_file(
        "id,date,karat,weight,price_per_gram,manufacturing,other_expenses,total_cost\n\
         1,2025-03-03,24,2,4000,0,0,8000\n",
    );
    let path = file.path().to_str().unwrap().to_string();
    run_import(&mut conn, &["--path", &path, "--owner", "mona"]).unwrap();

    assert!(
        list_purchases(&conn, "local", &PurchaseFilter::default())
            .unwrap()
            .is_empty()
    );
    let rows = list_purchases(&conn, "mona", &PurchaseFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_cost, dec!(8000));
}

#[test]
fn importer_rolls_back_on_bad_row() {
    let mut conn = base_conn();
    let file = csv_file(
        "id,date,karat,weight,price_per_gram,manufacturing,other_expenses,total_cost\n\
         1,2025-01-10,21,10,3500,0,0,35000\n\
         2,2025-01-11,22,10,3500,0,0,35000\n",
    );
    let path = file.path().to_str().unwrap().to_string();
    let err = run_import(&mut conn, &["--path", &path]).unwrap_err();
    assert!(format!("{:#}", err).contains("invalid karat"));

    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM purchases", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn importer_rejects_non_positive_weight() {
    let mut conn = base_conn();
    let file = csv_file(
        "id,date,karat,weight,price_per_gram,manufacturing,other_expenses,total_cost\n\
         1,2025-01-10,21,0,3500,0,0,0\n",
    );
    let path = file.path().to_str().unwrap().to_string();
    let err = run_import(&mut conn, &["--path", &path]).unwrap_err();
    assert!(format!("{:#}", err).contains("weight must be greater than zero"));
}

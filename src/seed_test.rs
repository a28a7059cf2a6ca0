use crate::{
    datasource::UserDataSource,
    seed::{ensure_schema, import_csv, SeedOutcome},
};
use std::io::Write;

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut tmp_csv_file = tempfile::NamedTempFile::new().unwrap();
    write!(tmp_csv_file, "{}", contents).unwrap();
    tmp_csv_file
}

fn open_seeded_source() -> (tempfile::NamedTempFile, UserDataSource) {
    let tmp_db_file = tempfile::NamedTempFile::new().unwrap();
    let mut source = UserDataSource::open(tmp_db_file.path().to_str().unwrap()).unwrap();
    ensure_schema(&mut source).unwrap();
    (tmp_db_file, source)
}

#[test]
fn test_import_csv() {
    let (_tmp_db_file, mut source) = open_seeded_source();
    let tmp_csv_file = write_csv(
        "user_id,name,email,age\n\
         550e8400-e29b-41d4-a716-446655440000,Alice,alice@example.com,20\n\
         550e8400-e29b-41d4-a716-446655440001,Bob,bob@example.com,25\n",
    );

    assert_eq!(
        import_csv(&mut source, tmp_csv_file.path().to_str().unwrap()).unwrap(),
        SeedOutcome::Imported {
            inserted: 2,
            skipped: 0
        }
    );

    // Check the imported data.
    assert_eq!(
        serde_json::to_string(&source.fetch_page(0, 10).unwrap()).unwrap(),
        r#"[{"user_id":"550e8400-e29b-41d4-a716-446655440000","name":"Alice","email":"alice@example.com","age":20},{"user_id":"550e8400-e29b-41d4-a716-446655440001","name":"Bob","email":"bob@example.com","age":25}]"#
    );
}

#[test]
fn test_import_csv_skips_invalid_uuids() {
    let (_tmp_db_file, mut source) = open_seeded_source();
    let tmp_csv_file = write_csv(
        "user_id,name,email,age\n\
         not-a-uuid,Alice,alice@example.com,20\n\
         550e8400-e29b-41d4-a716-446655440001,Bob,bob@example.com,25\n",
    );

    assert_eq!(
        import_csv(&mut source, tmp_csv_file.path().to_str().unwrap()).unwrap(),
        SeedOutcome::Imported {
            inserted: 1,
            skipped: 1
        }
    );
    assert_eq!(source.count().unwrap(), 1);
}

#[test]
fn test_import_csv_is_idempotent() {
    let (_tmp_db_file, mut source) = open_seeded_source();
    let tmp_csv_file = write_csv(
        "user_id,name,email,age\n\
         550e8400-e29b-41d4-a716-446655440000,Alice,alice@example.com,20\n\
         550e8400-e29b-41d4-a716-446655440001,Bob,bob@example.com,25\n",
    );
    let tmp_csv_filepath = tmp_csv_file.path().to_str().unwrap();

    assert_eq!(
        import_csv(&mut source, tmp_csv_filepath).unwrap(),
        SeedOutcome::Imported {
            inserted: 2,
            skipped: 0
        }
    );
    // The second run is a no-op against the populated table.
    assert_eq!(
        import_csv(&mut source, tmp_csv_filepath).unwrap(),
        SeedOutcome::AlreadyPopulated { rows: 2 }
    );
    assert_eq!(source.count().unwrap(), 2);
}

#[test]
fn test_import_csv_header_only() {
    let (_tmp_db_file, mut source) = open_seeded_source();
    let tmp_csv_file = write_csv("user_id,name,email,age\n");

    assert_eq!(
        import_csv(&mut source, tmp_csv_file.path().to_str().unwrap()).unwrap(),
        SeedOutcome::Imported {
            inserted: 0,
            skipped: 0
        }
    );
}

#[test]
fn test_import_csv_missing_file() {
    let (_tmp_db_file, mut source) = open_seeded_source();
    assert!(import_csv(&mut source, "/nonexistent-dir/users.csv")
        .unwrap_err()
        .to_string()
        .contains("Failed to open the CSV file"));
}

#[test]
fn test_import_csv_bad_age_rolls_the_whole_import_back() {
    let (_tmp_db_file, mut source) = open_seeded_source();
    let tmp_csv_file = write_csv(
        "user_id,name,email,age\n\
         550e8400-e29b-41d4-a716-446655440000,Alice,alice@example.com,20\n\
         550e8400-e29b-41d4-a716-446655440001,Bob,bob@example.com,twenty\n",
    );

    assert!(import_csv(&mut source, tmp_csv_file.path().to_str().unwrap()).is_err());
    // Nothing half-imported.
    assert_eq!(source.count().unwrap(), 0);
}

#[test]
fn test_ensure_schema_is_repeatable() {
    let (_tmp_db_file, mut source) = open_seeded_source();
    ensure_schema(&mut source).unwrap();
    assert_eq!(source.count().unwrap(), 0);
}

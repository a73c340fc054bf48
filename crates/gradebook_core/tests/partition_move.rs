use gradebook_core::{
    EditOutcome, PartitionKey, ServiceError, StoreConfig, StudentRecord, StudentRepository,
    StudentSession,
};
use tempfile::TempDir;

fn student(id: &str, name: &str, program: &str, term: &str) -> StudentRecord {
    StudentRecord {
        name: name.to_string(),
        id: id.to_string(),
        score: 7.0,
        term: term.to_string(),
        age: 22,
        program: program.to_string(),
        ..StudentRecord::default()
    }
}

fn setup(dir: &TempDir) -> StudentSession {
    let config = StoreConfig::with_root(dir.path().join("Alumnos"));
    let session =
        StudentSession::open_at(&config, PartitionKey::new("Engineering", "Term5")).expect("open session");
    for (id, name) in [("A100", "Ana Ruiz"), ("B200", "Bob Stone"), ("C300", "Cy Moss")] {
        session
            .insert(&student(id, name, "Engineering", "Term5"))
            .expect("insert student");
    }
    session
}

fn ids(records: Vec<StudentRecord>) -> Vec<String> {
    records.into_iter().map(|record| record.id).collect()
}

#[test]
fn in_place_edit_preserves_positions() {
    let dir = TempDir::new().expect("create temp dir");
    let mut session = setup(&dir);

    let mut edited = student("B201", "Bob Stone Jr", "Engineering", "Term5");
    edited.score = 9.5;
    let outcome = session.update("b200", &edited).expect("edit student");

    assert_eq!(outcome, EditOutcome::UpdatedInPlace);
    let records = session.list_records().expect("list active partition");
    assert_eq!(
        ids(records.clone()),
        vec!["A100".to_string(), "B201".to_string(), "C300".to_string()]
    );
    assert_eq!(records[1].score, 9.5);
}

#[test]
fn in_place_edit_of_missing_id_is_not_found() {
    let dir = TempDir::new().expect("create temp dir");
    let mut session = setup(&dir);

    let err = session
        .update("Z999", &student("Z999", "Zed", "Engineering", "Term5"))
        .expect_err("edit student should fail");
    assert!(matches!(err, ServiceError::NotFound { .. }));
    assert_eq!(session.list_records().expect("list active partition").len(), 3);
}

#[test]
fn changing_partition_moves_record() {
    let dir = TempDir::new().expect("create temp dir");
    let mut session = setup(&dir);
    let law_key = PartitionKey::new("Law", "Term3");

    let outcome = session
        .update("A100", &student("A100", "Ana Ruiz", "Law", "Term3"))
        .expect("edit student");

    assert_eq!(
        outcome,
        EditOutcome::Moved {
            from: PartitionKey::new("Engineering", "Term5"),
            to: law_key.clone(),
        }
    );
    assert_eq!(
        session.active_key(),
        &PartitionKey::new("Engineering", "Term5")
    );
    assert!(session.find_by_id("A100").expect("find by id").is_none());
    assert_eq!(session.list_records().expect("list active partition").len(), 2);

    let law = session.router().select(&law_key).expect("select partition");
    assert!(law.exists("A100").expect("check id"));
}

#[test]
fn move_conflict_leaves_source_untouched() {
    let dir = TempDir::new().expect("create temp dir");
    let mut session = setup(&dir);
    session
        .insert(&student("A100", "Other Ana", "Law", "Term3"))
        .expect("insert student");

    let err = session
        .update("A100", &student("A100", "Ana Ruiz", "Law", "Term3"))
        .expect_err("edit student should fail");

    assert!(matches!(
        err,
        ServiceError::Conflict { ref partition, .. } if partition == &PartitionKey::new("Law", "Term3")
    ));
    assert!(session.find_by_id("A100").expect("find by id").is_some());
    let law = session
        .router()
        .select(&PartitionKey::new("Law", "Term3"))
        .expect("select partition");
    assert_eq!(law.list().expect("list partition").len(), 1);
}

#[test]
fn move_of_missing_source_id_is_not_found_and_writes_nothing() {
    let dir = TempDir::new().expect("create temp dir");
    let mut session = setup(&dir);

    let err = session
        .update("Z999", &student("Z999", "Zed", "Law", "Term3"))
        .expect_err("edit student should fail");

    assert!(matches!(err, ServiceError::NotFound { .. }));
    let law = session
        .router()
        .select(&PartitionKey::new("Law", "Term3"))
        .expect("select partition");
    assert!(law.list().expect("list partition").is_empty());
}

#[test]
fn invalid_edit_aborts_before_any_io() {
    let dir = TempDir::new().expect("create temp dir");
    let mut session = setup(&dir);

    let mut invalid = student("A100", "Ana Ruiz", "Medicine", "Term1");
    invalid.age = 7;
    let err = session.update("A100", &invalid).expect_err("edit student should fail");

    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(!session.router().root().join("Medicine").exists());
    assert_eq!(session.list_records().expect("list active partition").len(), 3);
}

#[cfg(unix)]
#[test]
fn key_aliasing_same_file_edits_in_place() {
    let dir = TempDir::new().expect("create temp dir");
    let mut session = setup(&dir);
    let root = session.router().root().to_path_buf();
    std::os::unix::fs::symlink(root.join("Engineering"), root.join("Eng"))
        .expect("create program alias");

    let outcome = session
        .update("B200", &student("B200", "Bob Renamed", "Eng", "Term5"))
        .expect("aliased edit succeeds");

    assert_eq!(outcome, EditOutcome::UpdatedInPlace);
    assert_eq!(
        session.active_key(),
        &PartitionKey::new("Engineering", "Term5")
    );
    let records = session.list_records().expect("list active partition");
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].name, "Bob Renamed");
}

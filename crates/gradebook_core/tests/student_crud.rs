use gradebook_core::{
    FileStudentRepository, PartitionKey, ReadMode, ServiceError, StoreConfig, StudentRecord,
    StudentRepository, StudentSession,
};
use tempfile::TempDir;

fn student(id: &str, name: &str, program: &str, term: &str) -> StudentRecord {
    StudentRecord {
        name: name.to_string(),
        id: id.to_string(),
        score: 8.5,
        term: term.to_string(),
        age: 20,
        program: program.to_string(),
        email: format!("{}@uni.edu", id.to_lowercase()),
        phone: "555-0100".to_string(),
        address: "Main St".to_string(),
    }
}

fn session_at(dir: &TempDir, program: &str, term: &str) -> StudentSession {
    let config = StoreConfig::with_root(dir.path().join("Alumnos"));
    StudentSession::open_at(&config, PartitionKey::new(program, term)).expect("open session")
}

#[test]
fn insert_into_empty_partition_lists_one_record() {
    let dir = TempDir::new().expect("create temp dir");
    let session = session_at(&dir, "Engineering", "Term5");

    let ana = StudentRecord {
        name: "Ana Ruiz".to_string(),
        id: "A100".to_string(),
        score: 9.2,
        age: 21,
        program: "Engineering".to_string(),
        term: "Term5".to_string(),
        ..StudentRecord::default()
    };
    session.insert(&ana).expect("insert student");

    let records = session.list_records().expect("list active partition");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "A100");
    assert_eq!(records[0].score, 9.2);
}

#[test]
fn insert_marks_id_present_only_in_its_own_partition() {
    let dir = TempDir::new().expect("create temp dir");
    let session = session_at(&dir, "Engineering", "Term5");
    let router = session.router().clone();

    let law = router.select(&PartitionKey::new("Law", "Term3")).expect("select partition");
    session
        .insert(&student("A1", "Ana", "Engineering", "Term5"))
        .expect("insert student");

    let engineering = router
        .select(&PartitionKey::new("Engineering", "Term5"))
        .expect("select partition");
    assert!(engineering.exists("a1").expect("check id"));
    assert!(!law.exists("A1").expect("check id"));
}

#[test]
fn insert_routes_to_record_partition_not_active_one() {
    let dir = TempDir::new().expect("create temp dir");
    let session = session_at(&dir, "Engineering", "Term5");

    session.insert(&student("L1", "Lia", "Law", "Term3")).expect("insert student");

    assert!(session.list_records().expect("list active partition").is_empty());
    let law = session
        .router()
        .select(&PartitionKey::new("Law", "Term3"))
        .expect("select partition");
    assert_eq!(law.list().expect("list partition").len(), 1);
}

#[test]
fn duplicate_insert_conflicts_and_keeps_count() {
    let dir = TempDir::new().expect("create temp dir");
    let session = session_at(&dir, "Engineering", "Term5");
    session
        .insert(&student("A1", "Ana", "Engineering", "Term5"))
        .expect("insert student");

    let err = session
        .insert(&student("a1", "Other Ana", "Engineering", "Term5"))
        .expect_err("insert student should fail");
    assert!(matches!(err, ServiceError::Conflict { ref id, .. } if id == "a1"));
    assert_eq!(session.list_records().expect("list active partition").len(), 1);
}

#[test]
fn same_id_is_allowed_in_different_partitions() {
    let dir = TempDir::new().expect("create temp dir");
    let session = session_at(&dir, "Engineering", "Term5");

    session
        .insert(&student("A1", "Ana", "Engineering", "Term5"))
        .expect("insert student");
    session.insert(&student("A1", "Ana", "Law", "Term3")).expect("insert student");
}

#[test]
fn invalid_insert_reports_all_messages_and_writes_nothing() {
    let dir = TempDir::new().expect("create temp dir");
    let session = session_at(&dir, "Engineering", "Term5");

    let mut bad = student("A 1", "", "Engineering", "Term5");
    bad.score = 11.0;
    bad.age = 10;
    bad.email = "nope".to_string();

    assert_eq!(session.validate(&bad).len(), 5);
    let err = session.insert(&bad).expect_err("insert student should fail");
    match err {
        ServiceError::Validation(validation) => assert_eq!(validation.violations().len(), 5),
        other => panic!("unexpected error: {other}"),
    }
    assert!(session.list_records().expect("list active partition").is_empty());
}

#[test]
fn delete_missing_id_is_not_found_and_keeps_count() {
    let dir = TempDir::new().expect("create temp dir");
    let session = session_at(&dir, "Engineering", "Term5");
    session
        .insert(&student("A1", "Ana", "Engineering", "Term5"))
        .expect("insert student");

    let err = session.delete("Z9").expect_err("delete student should fail");
    assert!(matches!(err, ServiceError::NotFound { .. }));
    assert_eq!(session.list_records().expect("list active partition").len(), 1);

    session.delete("a1").expect("delete student");
    assert!(session.list_records().expect("list active partition").is_empty());
}

#[test]
fn lookups_only_see_active_partition() {
    let dir = TempDir::new().expect("create temp dir");
    let mut session = session_at(&dir, "Engineering", "Term5");
    session
        .insert(&student("A1", "Ana Ruiz", "Engineering", "Term5"))
        .expect("insert student");
    session
        .insert(&student("B2", "Mariana Paz", "Engineering", "Term5"))
        .expect("insert student");
    session
        .insert(&student("C3", "Ana Law", "Law", "Term3"))
        .expect("insert student");

    let found = session.find_by_id("a1").expect("find by id");
    assert_eq!(found.expect("record present").name, "Ana Ruiz");
    assert!(session.find_by_id("C3").expect("find by id").is_none());

    let names = session
        .find_by_name_fragment("ANA")
        .expect("find by name")
        .into_iter()
        .map(|record| record.id)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["A1", "B2"]);

    session
        .select_partition(PartitionKey::new("Law", "Term3"))
        .expect("select partition");
    assert!(session.find_by_id("C3").expect("find by id").is_some());
}

#[test]
fn repository_remove_drops_every_match_and_rewrites() {
    let dir = TempDir::new().expect("create temp dir");
    let repo = FileStudentRepository::new(dir.path().join("Eng").join("T1.txt"), ReadMode::Strict);
    repo.insert(&student("A1", "Ana", "Eng", "T1")).expect("insert student");
    repo.insert(&student("B2", "Bob", "Eng", "T1")).expect("insert student");
    // Repository insert does not check uniqueness.
    repo.insert(&student("a1", "Ana Dup", "Eng", "T1")).expect("insert student");

    assert_eq!(repo.remove("A1").expect("remove record"), 2);
    let ids = repo
        .list()
        .expect("list partition")
        .into_iter()
        .map(|record| record.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["B2"]);
}

#[test]
fn repository_update_without_match_leaves_partition_untouched() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("Eng").join("T1.txt");
    let repo = FileStudentRepository::new(&path, ReadMode::Strict);
    repo.insert(&student("A1", "Ana", "Eng", "T1")).expect("insert student");
    let before = std::fs::read_to_string(&path).expect("read partition file");

    assert!(!repo.update("Z9", &student("Z9", "Zed", "Eng", "T1")).expect("edit student"));
    assert_eq!(std::fs::read_to_string(&path).expect("read partition file"), before);
}

#[test]
fn active_path_tracks_selection() {
    let dir = TempDir::new().expect("create temp dir");
    let mut session = session_at(&dir, "Engineering", "Term5");
    assert!(session.active_path().ends_with("Engineering/Term5.txt"));

    let path = session
        .select_partition(PartitionKey::new("Law", "Term3"))
        .expect("select partition")
        .to_path_buf();
    assert!(path.ends_with("Law/Term3.txt"));
    assert_eq!(session.active_path(), path);
    assert_eq!(
        session.list_programs().expect("list programs"),
        vec!["Engineering".to_string(), "Law".to_string()]
    );
}

#[test]
fn legacy_latin1_line_keeps_partition_readable_and_unique() {
    let dir = TempDir::new().expect("create temp dir");
    let session = session_at(&dir, "Engineering", "Term5");
    std::fs::write(
        session.active_path(),
        b"Ana|A1|8|Term5|20|Engineering|||\nJos\xe9|J1|7|Term5|22|Engineering|||\n",
    )
    .expect("write legacy partition");

    let err = session
        .insert(&student("a1", "Ana Dup", "Engineering", "Term5"))
        .expect_err("id already stored");
    assert!(matches!(err, ServiceError::Conflict { .. }));

    let records = session.list_records().expect("list partition");
    assert_eq!(records.len(), 2);
    assert!(records[1].name.starts_with("Jos"));
    assert_eq!(session.search_all_partitions("ana").len(), 1);
    assert_eq!(session.search_all_partitions("j1").len(), 1);

    let raw = std::fs::read(session.active_path()).expect("read raw partition");
    let copies = raw.windows(4).filter(|window| *window == b"|A1|").count();
    assert_eq!(copies, 1);
}

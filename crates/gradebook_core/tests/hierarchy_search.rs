use gradebook_core::{search_partitions, PartitionKey, StoreConfig, StudentRecord, StudentSession};
use tempfile::TempDir;

fn student(id: &str, name: &str, program: &str, term: &str) -> StudentRecord {
    StudentRecord {
        name: name.to_string(),
        id: id.to_string(),
        score: 6.5,
        term: term.to_string(),
        age: 19,
        program: program.to_string(),
        ..StudentRecord::default()
    }
}

fn open(dir: &TempDir) -> StudentSession {
    let config = StoreConfig::with_root(dir.path().join("Alumnos"));
    StudentSession::open_at(&config, PartitionKey::new("Engineering", "Term5")).expect("open session")
}

#[test]
fn id_search_across_two_programs_returns_single_match() {
    let dir = TempDir::new().expect("create temp dir");
    let session = open(&dir);
    session
        .insert(&student("A100", "Ana Ruiz", "Engineering", "Term5"))
        .expect("insert student");
    session
        .insert(&student("L200", "Luis Mora", "Law", "Term3"))
        .expect("insert student");

    let hits = session.search_all_partitions("a100");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record.name, "Ana Ruiz");
    assert_eq!(hits[0].partition, PartitionKey::new("Engineering", "Term5"));
    assert!(hits[0].path.ends_with("Engineering/Term5.txt"));
}

#[test]
fn name_search_returns_every_partition_without_dedup() {
    let dir = TempDir::new().expect("create temp dir");
    let session = open(&dir);
    session
        .insert(&student("A1", "Ana Ruiz", "Engineering", "Term5"))
        .expect("insert student");
    session
        .insert(&student("A1", "Ana Ruiz", "Engineering", "Term6"))
        .expect("insert student");
    session
        .insert(&student("B2", "Bob Stone", "Law", "Term3"))
        .expect("insert student");

    let hits = session.search_all_partitions("ruiz");
    let partitions = hits
        .iter()
        .map(|hit| hit.partition.to_string())
        .collect::<Vec<_>>();
    assert_eq!(partitions, vec!["Engineering/Term5", "Engineering/Term6"]);
}

#[test]
fn search_ignores_active_selection() {
    let dir = TempDir::new().expect("create temp dir");
    let mut session = open(&dir);
    session
        .insert(&student("M9", "Marta Gil", "Medicine", "Term1"))
        .expect("insert student");
    session
        .select_partition(PartitionKey::new("Law", "Term3"))
        .expect("select partition");

    assert_eq!(session.search_all_partitions("marta").len(), 1);
}

#[test]
fn search_of_missing_root_is_empty() {
    let dir = TempDir::new().expect("create temp dir");
    assert!(search_partitions(&dir.path().join("nowhere"), "txt", "ana").is_empty());
}

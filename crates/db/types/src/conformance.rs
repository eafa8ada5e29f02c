//! Behavior every backend must share. Each backend's test module runs these
//! against a fresh instance.

use conduit_primitives::{ActorRef, Command, CommandRecord, CommandStatus, Priority};

use crate::{
    traits::{CommandDatabase, SecretPersistence, StorageClient},
    DbError,
};

pub async fn storage_client_tests<S: StorageClient>(store: &S) {
    test_read_missing_is_none(store).await;
    test_write_then_read(store).await;
    test_last_write_wins(store).await;
    test_delete(store).await;
}

async fn test_read_missing_is_none<S: StorageClient>(store: &S) {
    assert_eq!(store.read("never-written").await.unwrap(), None);
}

async fn test_write_then_read<S: StorageClient>(store: &S) {
    store.write("job-1", "{\"a\":1}").await.unwrap();
    assert_eq!(
        store.read("job-1").await.unwrap().as_deref(),
        Some("{\"a\":1}")
    );
}

async fn test_last_write_wins<S: StorageClient>(store: &S) {
    store.write("job-2", "first").await.unwrap();
    store.write("job-2", "second").await.unwrap();
    assert_eq!(store.read("job-2").await.unwrap().as_deref(), Some("second"));
}

async fn test_delete<S: StorageClient>(store: &S) {
    store.write("job-3", "x").await.unwrap();
    assert!(store.delete("job-3").await.unwrap());
    assert!(!store.delete("job-3").await.unwrap());
    assert_eq!(store.read("job-3").await.unwrap(), None);
}

pub fn secret_persistence_tests<P: SecretPersistence>(persistence: &P) {
    assert_eq!(persistence.read_secret("missing").unwrap(), None);

    persistence.write_secret("coord_v1", "hunter2").unwrap();
    assert_eq!(
        persistence.read_secret("coord_v1").unwrap().as_deref(),
        Some("hunter2")
    );

    persistence.write_secret("coord_v1", "hunter3").unwrap();
    assert_eq!(
        persistence.read_secret("coord_v1").unwrap().as_deref(),
        Some("hunter3")
    );

    assert!(persistence.delete_secret("coord_v1").unwrap());
    assert!(!persistence.delete_secret("coord_v1").unwrap());
    assert_eq!(persistence.read_secret("coord_v1").unwrap(), None);
}

fn sample_record(id: &str) -> CommandRecord {
    let actor = ActorRef {
        actor_id: "actor-1".to_string(),
        job_id: None,
        attempt_number: None,
    };
    CommandRecord::new(Command::discover(
        id.into(),
        actor,
        Priority::Default,
        None,
        Default::default(),
    ))
}

pub fn command_db_tests<D: CommandDatabase>(db: &D) {
    test_put_and_get_command(db);
    test_put_existing_command_fails(db);
    test_update_status(db);
    test_guarded_update_leaves_record_untouched(db);
    test_update_unknown_command_fails(db);
}

fn any_status(_: CommandStatus) -> bool {
    true
}

fn not_terminal(status: CommandStatus) -> bool {
    !status.is_terminal()
}

fn test_put_and_get_command<D: CommandDatabase>(db: &D) {
    let record = sample_record("cmd-put");
    db.put_command(record.clone()).unwrap();

    let stored = db.get_command(record.command.id()).unwrap();
    assert_eq!(stored, Some(record));
    assert_eq!(db.get_command(&"cmd-missing".into()).unwrap(), None);
}

fn test_put_existing_command_fails<D: CommandDatabase>(db: &D) {
    let record = sample_record("cmd-dup");
    db.put_command(record.clone()).unwrap();

    let res = db.put_command(record);
    assert_eq!(res, Err(DbError::EntryAlreadyExists));
}

fn test_update_status<D: CommandDatabase>(db: &D) {
    let record = sample_record("cmd-update");
    let id = record.command.id().clone();
    db.put_command(record).unwrap();

    let updated = db
        .update_status(&id, CommandStatus::Running, any_status)
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, CommandStatus::Running);

    let stored = db.get_command(&id).unwrap().unwrap();
    assert_eq!(stored.status, CommandStatus::Running);
    assert!(stored.updated_at >= stored.created_at);
}

fn test_guarded_update_leaves_record_untouched<D: CommandDatabase>(db: &D) {
    let record = sample_record("cmd-guarded");
    let id = record.command.id().clone();
    db.put_command(record).unwrap();

    let cancelled = db
        .update_status(&id, CommandStatus::Cancelled, not_terminal)
        .unwrap();
    assert_eq!(cancelled.map(|r| r.status), Some(CommandStatus::Cancelled));
    let before = db.get_command(&id).unwrap().unwrap();

    let res = db
        .update_status(&id, CommandStatus::Completed, not_terminal)
        .unwrap();
    assert_eq!(res, None);
    assert_eq!(db.get_command(&id).unwrap(), Some(before));
}

fn test_update_unknown_command_fails<D: CommandDatabase>(db: &D) {
    let res = db.update_status(
        &"cmd-unknown".into(),
        CommandStatus::Cancelled,
        not_terminal,
    );
    assert_eq!(res.unwrap_err(), DbError::NonExistentEntry);
}

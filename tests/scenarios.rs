// End-to-end scenarios across storage backends

use tempfile::TempDir;
use todostore::{FileStorage, Filter, MemoryStorage, SqliteStorage, Storage, TodoItem, TodoStore};

#[test]
fn test_add_toggle_filter_scenario() {
    let mut store = TodoStore::open(MemoryStorage::new()).unwrap();

    let id = store.add("buy milk").unwrap().unwrap();
    assert_eq!(store.items(), [TodoItem::new(id, "buy milk")]);

    store.toggle(id).unwrap();
    assert!(store.get(id).unwrap().completed);

    store.set_filter(Filter::Active);
    assert!(store.visible_items().is_empty());

    store.set_filter(Filter::Completed);
    let visible = store.visible_items();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, id);
    assert!(visible[0].completed);
}

#[test]
fn test_edit_scenario() {
    let mut store = TodoStore::open(MemoryStorage::new()).unwrap();
    let id = store.add("buy milk").unwrap().unwrap();

    store.begin_edit(id);
    let edit = store.editing().unwrap();
    assert_eq!(edit.id, id);
    assert_eq!(edit.text, "buy milk");

    store.cancel_edit();
    assert_eq!(store.get(id).unwrap().text, "buy milk");

    store.begin_edit(id);
    store.set_edit_text("buy bread");
    assert!(store.commit_edit(id).unwrap());
    assert_eq!(store.get(id).unwrap().text, "buy bread");
}

fn exercise<S: Storage>(store: &mut TodoStore<S>) -> Vec<TodoItem> {
    let a = store.add("write report").unwrap().unwrap();
    let b = store.add("water plants").unwrap().unwrap();
    store.add("call the bank").unwrap();
    store.toggle(b).unwrap();
    store.begin_edit(a);
    store.set_edit_text("write final report");
    store.commit_edit(a).unwrap();
    store.items().to_vec()
}

#[test]
fn test_file_backend_survives_reopen() {
    let temp = TempDir::new().unwrap();

    let mut store = TodoStore::open(FileStorage::open(temp.path(), "todos").unwrap()).unwrap();
    let expected = exercise(&mut store);
    drop(store);

    let reopened = TodoStore::open(FileStorage::open(temp.path(), "todos").unwrap()).unwrap();
    assert_eq!(reopened.items(), expected.as_slice());
    assert_eq!(reopened.items()[0].text, "write final report");
    assert!(reopened.items()[1].completed);
}

#[test]
fn test_sqlite_backend_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("todostore.db");

    let mut store = TodoStore::open(SqliteStorage::open(&db_path, "todos").unwrap()).unwrap();
    let expected = exercise(&mut store);
    drop(store);

    let reopened = TodoStore::open(SqliteStorage::open(&db_path, "todos").unwrap()).unwrap();
    assert_eq!(reopened.items(), expected.as_slice());
}

#[test]
fn test_corrupt_file_slot_recovers() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("todos.json"), "not json at all").unwrap();

    let mut store = TodoStore::open(FileStorage::open(temp.path(), "todos").unwrap()).unwrap();
    assert!(store.items().is_empty());

    let id = store.add("start over").unwrap().unwrap();
    drop(store);

    let reopened = TodoStore::open(FileStorage::open(temp.path(), "todos").unwrap()).unwrap();
    assert_eq!(reopened.items(), [TodoItem::new(id, "start over")]);
}

#[test]
fn test_ids_stay_unique_across_rapid_adds() {
    let mut store = TodoStore::open(MemoryStorage::new()).unwrap();
    let ids: Vec<i64> = (0..50)
        .map(|i| store.add(&format!("task {}", i)).unwrap().unwrap())
        .collect();

    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

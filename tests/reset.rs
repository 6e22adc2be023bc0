mod support;

use persistive_rust::{
    CollectionOptions, InMemoryStore, JournalStore, KeyValueStore, PersistiveCollection, StoreOp,
};
use support::Todo;

type Todos = PersistiveCollection<Todo, JournalStore<InMemoryStore>>;

fn todos_with(records: Vec<Todo>) -> Todos {
    PersistiveCollection::open(
        JournalStore::new(InMemoryStore::new()),
        CollectionOptions::new().records(records),
    )
    .unwrap()
}

fn get(todos: &Todos, key: &str) -> Option<String> {
    todos.store().inner().get(key).unwrap()
}

#[test]
fn reset_replaces_membership() {
    let a = Todo::new("A", "alpha");
    let b = Todo::new("B", "beta");
    let c = Todo::new("C", "gamma");
    let mut todos = todos_with(vec![a.clone(), b.clone()]);
    todos.store().clear();

    let previous = todos.reset(vec![b.clone(), c.clone()]).unwrap();
    assert_eq!(previous, vec![a, b.clone()]);

    assert!(get(&todos, "todos-A").is_none());
    assert_eq!(get(&todos, "todos-B"), Some(b.stored()));
    assert_eq!(get(&todos, "todos-C"), Some(c.stored()));
    assert_eq!(get(&todos, "todos"), Some("B,C".to_string()));

    // B was already current, so it is neither rewritten nor deleted.
    assert_eq!(
        todos.store().writes(),
        vec![
            StoreOp::Remove("todos-A".into()),
            StoreOp::Set("todos-C".into(), c.stored()),
            StoreOp::Set("todos".into(), "B,C".into()),
        ]
    );
}

#[test]
fn reset_rewrites_members_whose_data_changed() {
    let b = Todo::new("B", "beta");
    let mut todos = todos_with(vec![b.clone()]);
    todos.store().clear();

    let mut newer = b.clone();
    newer.done = true;
    todos.reset(vec![newer.clone()]).unwrap();

    assert_eq!(
        todos.store().writes(),
        vec![
            StoreOp::Set("todos-B".into(), newer.stored()),
            StoreOp::Set("todos".into(), "B".into()),
        ]
    );
}

#[test]
fn reset_moves_observation_to_new_members() {
    let mut todos = todos_with(vec![Todo::new("A", "alpha"), Todo::new("B", "beta")]);
    todos
        .reset(vec![Todo::new("B", "beta"), Todo::new("C", "gamma")])
        .unwrap();

    assert!(!todos.is_observing("A"));
    assert!(todos.is_observing("B"));
    assert!(todos.is_observing("C"));

    todos.store().clear();
    todos.update("C", |t| t.done = true).unwrap();
    assert_eq!(
        todos.store().writes(),
        vec![StoreOp::Set(
            "todos-C".into(),
            todos.get("C").unwrap().stored()
        )]
    );
}

#[test]
fn clear_prunes_everything() {
    let mut todos = todos_with(vec![Todo::new("A", "alpha"), Todo::new("B", "beta")]);
    todos.clear().unwrap();

    assert!(todos.is_empty());
    assert!(get(&todos, "todos-A").is_none());
    assert!(get(&todos, "todos-B").is_none());
    assert_eq!(get(&todos, "todos"), Some(String::new()));
    assert!(!todos.is_observing("A"));
}

#[test]
fn reset_prunes_ids_only_the_stored_index_knew() {
    let store = JournalStore::new(InMemoryStore::new());
    store.set("todos", "ghost").unwrap();
    store.set("todos-ghost", r#"{"id":"ghost"}"#).unwrap();

    let mut todos = PersistiveCollection::<Todo, _>::open(
        store.clone(),
        CollectionOptions::new().records(vec![]),
    )
    .unwrap();
    assert!(store.inner().get("todos-ghost").unwrap().is_none());

    todos.reset(vec![Todo::new("A", "alpha")]).unwrap();
    assert_eq!(store.inner().get("todos").unwrap().as_deref(), Some("A"));
}

#[test]
fn initial_records_are_persisted_on_open() {
    let store = JournalStore::new(InMemoryStore::new());
    store.set("todos", "stale").unwrap();
    store.set("todos-stale", r#"{"id":"stale","title":"x","done":false}"#).unwrap();
    store.clear();

    let a = Todo::new("A", "alpha");
    let todos = PersistiveCollection::<Todo, _>::open(
        store.clone(),
        CollectionOptions::new().records(vec![a.clone()]),
    )
    .unwrap();

    assert_eq!(
        store.writes(),
        vec![
            StoreOp::Remove("todos-stale".into()),
            StoreOp::Set("todos-A".into(), a.stored()),
            StoreOp::Set("todos".into(), "A".into()),
        ]
    );
    assert!(todos.is_observing("A"));
}

#[test]
fn duplicate_ids_in_reset_are_rejected() {
    let mut todos = todos_with(vec![Todo::new("A", "alpha")]);
    todos.store().clear();

    let err = todos
        .reset(vec![Todo::new("B", "beta"), Todo::new("B", "again")])
        .unwrap_err();
    assert_eq!(err, persistive_rust::Error::DuplicateId("B".into()));
    assert_eq!(todos.ids(), vec!["A"]);
    assert!(todos.store().writes().is_empty());
}

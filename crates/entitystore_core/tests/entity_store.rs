use entitystore_core::{
    EntitiesRepository, Entity, JsonFileEntitiesRepository, RepoError, StoreConfig,
    DEFAULT_FILE_NAME,
};
use std::collections::BTreeSet;
use tempfile::TempDir;

fn open_store() -> (TempDir, JsonFileEntitiesRepository) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let repo = JsonFileEntitiesRepository::try_new(dir.path()).expect("store should open");
    (dir, repo)
}

#[test]
fn saved_entity_round_trips() {
    let (_dir, repo) = open_store();
    let entity = Entity::new("trees", "t-1", 5)
        .with_label("Oak")
        .with_property("height", "12")
        .with_property("species", "quercus")
        .with_offline(true);

    repo.save(&[entity.clone()]).expect("save");

    let stored = repo.get_entities("trees").expect("get entities");
    assert_eq!(stored, vec![entity]);
}

#[test]
fn first_access_creates_backing_file_and_parents() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let base = dir.path().join("nested").join("store");
    let repo = JsonFileEntitiesRepository::try_new(&base).expect("store should open");

    assert!(!repo.backing_file().exists());
    assert!(repo.get_lists().expect("get lists").is_empty());
    assert_eq!(repo.backing_file(), base.join(DEFAULT_FILE_NAME));
    assert!(repo.backing_file().is_file());
}

#[test]
fn saving_same_key_twice_merges_properties() {
    let (_dir, repo) = open_store();
    repo.save(&[Entity::new("trees", "a", 1).with_property("x", "1")])
        .expect("first save");
    repo.save(&[Entity::new("trees", "a", 2).with_property("y", "2")])
        .expect("second save");

    let stored = repo.get_entities("trees").expect("get entities");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].version, 2);
    assert_eq!(
        stored[0].properties,
        vec![
            ("x".to_string(), "1".to_string()),
            ("y".to_string(), "2".to_string())
        ]
    );
}

#[test]
fn online_entity_cannot_be_downgraded_to_offline() {
    let (_dir, repo) = open_store();
    repo.save(&[Entity::new("trees", "a", 1)]).expect("save online");
    repo.save(&[Entity::new("trees", "a", 2).with_offline(true)])
        .expect("save offline update");

    let stored = repo.get_entities("trees").expect("get entities");
    assert!(!stored[0].offline);
}

#[test]
fn offline_entity_takes_incoming_flag() {
    let (_dir, repo) = open_store();
    repo.save(&[Entity::new("trees", "a", 1).with_offline(true)])
        .expect("save offline");
    repo.save(&[Entity::new("trees", "a", 2)]).expect("save synced");

    let stored = repo.get_entities("trees").expect("get entities");
    assert!(!stored[0].offline);
}

#[test]
fn label_survives_update_without_label() {
    let (_dir, repo) = open_store();
    repo.save(&[Entity::new("trees", "a", 1).with_label("Oak")])
        .expect("save labelled");
    repo.save(&[Entity::new("trees", "a", 2)]).expect("save unlabelled");

    let stored = repo.get_entities("trees").expect("get entities");
    assert_eq!(stored[0].label.as_deref(), Some("Oak"));
}

#[test]
fn one_batch_applies_upserts_in_argument_order() {
    let (_dir, repo) = open_store();
    repo.save(&[
        Entity::new("trees", "a", 1).with_property("x", "1"),
        Entity::new("trees", "b", 1),
        Entity::new("trees", "a", 3).with_property("x", "2"),
    ])
    .expect("batch save");

    let stored = repo.get_entities("trees").expect("get entities");
    let ids: Vec<&str> = stored.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(stored[0].version, 3);
    assert_eq!(stored[0].property("x"), Some("2"));
}

#[test]
fn duplicate_keys_in_new_entity_are_collapsed() {
    let (_dir, repo) = open_store();
    repo.save(&[Entity::new("trees", "a", 1)
        .with_property("x", "1")
        .with_property("x", "2")])
        .expect("save");

    let stored = repo.get_entities("trees").expect("get entities");
    assert_eq!(
        stored[0].properties,
        vec![("x".to_string(), "2".to_string())]
    );
}

#[test]
fn get_entities_filters_by_list() {
    let (_dir, repo) = open_store();
    repo.save(&[Entity::new("trees", "a", 1), Entity::new("shrubs", "b", 1)])
        .expect("save");

    let trees = repo.get_entities("trees").expect("trees");
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].id, "a");
    assert!(repo.get_entities("rocks").expect("rocks").is_empty());
}

#[test]
fn added_list_is_reported_without_entities() {
    let (_dir, repo) = open_store();
    repo.add_list("x").expect("add list");
    repo.add_list("x").expect("add list again");

    let lists = repo.get_lists().expect("get lists");
    assert_eq!(lists, BTreeSet::from(["x".to_string()]));
    assert!(repo.get_entities("x").expect("get entities").is_empty());
}

#[test]
fn empty_lists_survive_saves_and_deletes() {
    let (_dir, repo) = open_store();
    repo.add_list("empty").expect("add list");
    repo.save(&[Entity::new("trees", "a", 1)]).expect("save");
    repo.delete("a").expect("delete");

    let lists = repo.get_lists().expect("get lists");
    assert!(lists.contains("empty"));
    assert!(lists.contains("trees"));
}

#[test]
fn empty_list_name_is_rejected() {
    let (_dir, repo) = open_store();
    let err = repo.add_list("").unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn whitespace_names_are_stored_verbatim() {
    let (_dir, repo) = open_store();
    repo.add_list(" ").expect("add whitespace list");
    repo.save(&[Entity::new("trees", " ", 1)])
        .expect("save whitespace id");

    let lists = repo.get_lists().expect("get lists");
    assert!(lists.contains(" "));
    assert_eq!(repo.get_entities("trees").expect("trees")[0].id, " ");
}

#[test]
fn invalid_entity_aborts_batch_before_writing() {
    let (_dir, repo) = open_store();
    repo.save(&[Entity::new("trees", "a", 1)]).expect("save");

    let err = repo
        .save(&[Entity::new("trees", "b", 1), Entity::new("", "c", 1)])
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let stored = repo.get_entities("trees").expect("get entities");
    assert_eq!(stored.len(), 1);
}

#[test]
fn delete_removes_id_across_all_lists() {
    let (_dir, repo) = open_store();
    repo.save(&[
        Entity::new("trees", "shared", 1),
        Entity::new("shrubs", "shared", 1),
        Entity::new("shrubs", "other", 1),
    ])
    .expect("save");

    repo.delete("shared").expect("delete");

    assert!(repo.get_entities("trees").expect("trees").is_empty());
    let shrubs = repo.get_entities("shrubs").expect("shrubs");
    assert_eq!(shrubs.len(), 1);
    assert_eq!(shrubs[0].id, "other");
}

#[test]
fn delete_unknown_id_is_noop() {
    let (_dir, repo) = open_store();
    repo.save(&[Entity::new("trees", "a", 1)]).expect("save");
    repo.delete("missing").expect("delete");
    assert_eq!(repo.get_entities("trees").expect("trees").len(), 1);
}

#[test]
fn clear_removes_everything_and_store_stays_usable() {
    let (_dir, repo) = open_store();
    repo.add_list("x").expect("add list");
    repo.save(&[Entity::new("trees", "a", 1)]).expect("save");

    repo.clear().expect("clear");
    assert!(!repo.backing_file().exists());
    assert!(repo.get_lists().expect("get lists").is_empty());
    assert!(repo.backing_file().exists());

    repo.save(&[Entity::new("trees", "b", 1)]).expect("save after clear");
    assert_eq!(repo.get_entities("trees").expect("trees").len(), 1);
}

#[test]
fn clear_without_backing_file_is_ok() {
    let (_dir, repo) = open_store();
    repo.clear().expect("clear on fresh store");
}

#[test]
fn data_persists_across_store_instances() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let config = StoreConfig::new(dir.path()).with_pretty(true);

    let first = JsonFileEntitiesRepository::open(&config).expect("first open");
    first
        .save(&[Entity::new("trees", "a", 1).with_label("Oak")])
        .expect("save");
    drop(first);

    let second = JsonFileEntitiesRepository::open(&config).expect("second open");
    let stored = second.get_entities("trees").expect("get entities");
    assert_eq!(stored[0].label.as_deref(), Some("Oak"));
}

#[test]
fn backing_file_uses_documented_json_shape() {
    let (_dir, repo) = open_store();
    repo.add_list("empty").expect("add list");
    repo.save(&[Entity::new("trees", "a", 2)
        .with_label("Oak")
        .with_property("height", "12")])
        .expect("save");

    let raw = std::fs::read_to_string(repo.backing_file()).expect("read backing file");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(json["empty"], serde_json::json!([]));
    assert_eq!(
        json["trees"][0],
        serde_json::json!({
            "id": "a",
            "label": "Oak",
            "version": 2,
            "properties": {"height": "12"},
            "offline": false
        })
    );
}

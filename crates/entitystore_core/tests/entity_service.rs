use entitystore_core::{
    Entity, EntityService, InMemoryEntitiesRepository, JsonFileEntitiesRepository, RepoError,
};

#[test]
fn create_offline_entity_persists_and_returns_stored_copy() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let repo = JsonFileEntitiesRepository::try_new(dir.path()).expect("store should open");
    let service = EntityService::new(repo);

    let created = service
        .create_offline_entity(
            "trees",
            "New oak",
            vec![
                ("height".to_string(), "1".to_string()),
                ("height".to_string(), "2".to_string()),
            ],
        )
        .expect("create offline entity");

    assert!(created.offline);
    assert_eq!(created.version, 1);
    assert_eq!(created.properties.len(), 1);

    let stored = service.entities("trees").expect("entities");
    assert_eq!(stored, vec![created]);
}

#[test]
fn synced_copy_clears_offline_flag() {
    let service = EntityService::new(InMemoryEntitiesRepository::new());
    let created = service
        .create_offline_entity("trees", "Draft", Vec::new())
        .expect("create offline entity");

    let synced = Entity::new("trees", created.id.clone(), 2).with_property("server", "yes");
    service.save(synced).expect("save synced copy");

    let stored = service.entities("trees").expect("entities");
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].offline);
    assert_eq!(stored[0].label.as_deref(), Some("Draft"));
    assert_eq!(stored[0].property("server"), Some("yes"));
}

#[test]
fn empty_list_is_rejected_for_offline_entities() {
    let service = EntityService::new(InMemoryEntitiesRepository::new());
    let err = service
        .create_offline_entity("", "Nowhere", Vec::new())
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn service_exposes_list_and_clear_operations() {
    let service = EntityService::new(InMemoryEntitiesRepository::new());
    service.add_list("trees").expect("add list");
    service
        .save_all(&[Entity::new("shrubs", "a", 1), Entity::new("trees", "a", 1)])
        .expect("save all");

    assert_eq!(service.lists().expect("lists").len(), 2);

    service.delete("a").expect("delete");
    assert!(service.entities("trees").expect("trees").is_empty());

    service.clear().expect("clear");
    assert!(service.lists().expect("lists").is_empty());
}

//! Loads a schema file and derives the relation graph and validators from it.

use relshape_core::{Cardinality, ValidationErrorCode, Validator};
use relshape_schema::{
    build_validator_registry, check, extract_relation_graph, GraphConfig, SchemaDocument,
    SchemaError,
};
use serde_json::json;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn blog() -> SchemaDocument {
    SchemaDocument::load(fixture("blog.json"))
        .unwrap()
        .validated()
        .unwrap()
}

#[test]
fn test_fixture_is_clean() {
    let schema = SchemaDocument::load(fixture("blog.json")).unwrap();
    assert!(check(&schema).is_empty());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SchemaDocument::load(fixture("missing.json")).unwrap_err();
    assert!(matches!(err, SchemaError::Io { .. }));
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn test_graph_covers_every_model() {
    let graph = extract_relation_graph(&blog(), &GraphConfig::default());
    let entities: Vec<_> = graph.entities().map(|(e, _)| e.as_str()).collect();
    assert_eq!(entities, ["user", "profile", "post", "comment"]);

    let user = graph.relations("user").unwrap();
    assert_eq!(user["posts"].cardinality, Cardinality::Many);
    assert!(user["profile"].is_nullable());
    assert!(!user["posts"].is_nullable());

    let author = &user["posts"].nested_relations()["author"];
    assert_eq!(author.target_entity, "user");
    assert!(!author.is_nullable());
}

#[test]
fn test_graph_depth_follows_config() {
    let schema = blog();
    for depth in 1..=4 {
        let graph = extract_relation_graph(&schema, &GraphConfig::new().with_max_depth(depth));
        assert_eq!(graph.depth(), depth);
    }
}

#[test]
fn test_graph_serializes_as_nested_maps() {
    let graph = extract_relation_graph(&blog(), &GraphConfig::new().with_max_depth(1));
    let json = serde_json::to_value(&graph).unwrap();
    assert_eq!(
        json["comment"],
        json!({
            "parent": { "targetEntity": "comment", "cardinality": "one", "optional": true },
            "replies": { "targetEntity": "comment", "cardinality": "many" }
        })
    );
}

#[test]
fn test_generated_validators_check_data() {
    let validators = build_validator_registry(&blog()).unwrap();
    assert_eq!(validators.len(), 4);

    let user = validators.get("user").unwrap();
    let valid = json!({
        "id": "u1",
        "email": "ada@example.com",
        "role": "ADMIN",
        "createdAt": "2024-05-01T10:00:00Z",
        "posts": [],
        "internal": true
    });
    assert_eq!(
        user.validate(&valid).unwrap(),
        json!({
            "id": "u1",
            "email": "ada@example.com",
            "role": "ADMIN",
            "createdAt": "2024-05-01T10:00:00Z"
        })
    );

    let errors = user
        .validate(&json!({
            "id": "u1",
            "email": "nope",
            "role": "OWNER",
            "age": -1,
            "createdAt": "yesterday"
        }))
        .unwrap_err();
    let codes: Vec<_> = errors.errors.iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        [
            ValidationErrorCode::InvalidEmail,
            ValidationErrorCode::InvalidEnumValue,
            ValidationErrorCode::Min,
            ValidationErrorCode::InvalidFormat,
        ]
    );

    let post = validators.get("post").unwrap();
    let errors = post
        .validate(&json!({ "id": "p1", "title": "t", "slug": "Not A Slug", "tags": ["a", 1] }))
        .unwrap_err();
    let paths: Vec<_> = errors.errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, ["slug", "tags[1]"]);
}

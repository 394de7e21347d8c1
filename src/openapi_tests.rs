use crate::schemas::ApiDoc;
use utoipa::openapi::{schema::Schema, PathItemType, RefOr};
use utoipa::OpenApi;

fn object_properties(name: &str) -> Vec<String> {
    let openapi = ApiDoc::openapi();
    let components = openapi.components.expect("components should be generated");
    match components.schemas.get(name) {
        Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
        _ => panic!("{name} should be an object schema"),
    }
}

#[test]
fn test_openapi_schema_generation() {
    let openapi = ApiDoc::openapi();

    let components = openapi.components.as_ref().unwrap();
    for schema in [
        "ErrorResponse",
        "HealthResponse",
        "UserView",
        "TeammateView",
        "TeamListView",
        "TeamDetailView",
        "TeamApplicationStatusView",
        "CommentView",
        "ChildCommentView",
        "TokenApiResponse",
    ] {
        assert!(components.schemas.contains_key(schema), "missing schema {schema}");
    }
    assert!(components.security_schemes.contains_key("bearer"));

    assert!(serde_json::to_string(&openapi).is_ok());
}

#[test]
fn test_error_response_schema_structure() {
    let properties = object_properties("ErrorResponse");
    for field in ["error", "code", "success", "fields"] {
        assert!(properties.contains(&field.to_string()), "missing {field}");
    }
}

#[test]
fn test_user_view_never_exposes_password() {
    let properties = object_properties("UserView");
    assert!(properties.contains(&"is_github_authenticated".to_string()));
    assert!(!properties.contains(&"password".to_string()));
}

#[test]
fn test_comment_view_structure() {
    let parent = object_properties("CommentView");
    assert!(parent.contains(&"child_comments_count".to_string()));
    assert!(parent.contains(&"child_comments".to_string()));

    let child = object_properties("ChildCommentView");
    assert!(!child.contains(&"child_comments".to_string()));
}

#[test]
fn test_openapi_paths() {
    let openapi = ApiDoc::openapi();
    let paths = &openapi.paths.paths;

    let expect = [
        ("/health", PathItemType::Get),
        ("/api/v1/token", PathItemType::Post),
        ("/api/v1/users", PathItemType::Post),
        ("/api/v1/users/{user_id}", PathItemType::Get),
        ("/api/v1/users/{user_id}", PathItemType::Put),
        ("/api/v1/users/{user_id}", PathItemType::Patch),
        ("/api/v1/users/{user_id}", PathItemType::Delete),
        ("/api/v1/teams", PathItemType::Get),
        ("/api/v1/teams", PathItemType::Post),
        ("/api/v1/teams/applied", PathItemType::Get),
        ("/api/v1/teams/{team_id}", PathItemType::Get),
        ("/api/v1/teams/{team_id}", PathItemType::Put),
        ("/api/v1/teams/{team_id}", PathItemType::Delete),
        ("/api/v1/teams/{team_id}/like", PathItemType::Post),
        ("/api/v1/teams/{team_id}/comments", PathItemType::Post),
        ("/api/v1/tags", PathItemType::Get),
    ];
    for (path, method) in expect {
        let item = paths.get(path).unwrap_or_else(|| panic!("missing path {path}"));
        assert!(item.operations.contains_key(&method), "missing operation on {path}");
    }

    let token = paths["/api/v1/token"].operations.get(&PathItemType::Post).unwrap();
    assert!(token.responses.responses.contains_key("200"));
    assert!(token.responses.responses.contains_key("401"));
}

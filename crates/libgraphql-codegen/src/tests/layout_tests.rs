use crate::DefaultLayout;
use crate::FilePathPackageName;
use crate::FlatPackageName;
use crate::OperationDescriptor;
use crate::OperationKind;
use crate::layout::pascal_case;
use crate::layout::snake_case;
use std::path::PathBuf;

fn descriptor(name: &str, kind: OperationKind, file_path: Option<&str>) -> OperationDescriptor {
    OperationDescriptor::new(name, kind, "", 0, file_path.map(PathBuf::from))
}

#[test]
fn default_layout_appends_the_operation_kind() {
    let package = FlatPackageName("com.example".to_string());
    let layout = DefaultLayout::new(&package);

    let decision = layout.resolve_layout(&descriptor("getUser", OperationKind::Query, None));
    assert_eq!(decision.package_name, "com.example");
    assert_eq!(decision.class_name, "GetUserQuery");
    assert_eq!(decision.file_name, "get_user_query.rs");

    let decision = layout.resolve_layout(&descriptor("Logout", OperationKind::Mutation, None));
    assert_eq!(decision.class_name, "LogoutMutation");
}

#[test]
fn default_layout_does_not_repeat_the_suffix() {
    let package = FlatPackageName("com.example".to_string());
    let layout = DefaultLayout::new(&package);

    let decision = layout.resolve_layout(
        &descriptor("OnMessageSubscription", OperationKind::Subscription, None),
    );
    assert_eq!(decision.class_name, "OnMessageSubscription");
    assert_eq!(decision.file_name, "on_message_subscription.rs");
}

#[test]
fn file_path_packages_follow_the_document_directory() {
    let package = FilePathPackageName {
        root_dir: PathBuf::from("/project/graphql"),
        root_package: "com.example".to_string(),
    };

    let nested = descriptor(
        "GetUser",
        OperationKind::Query,
        Some("/project/graphql/user-profile/queries/get_user.graphql"),
    );
    assert_eq!(package.package_name(&nested), "com.example.user_profile.queries");

    let at_root = descriptor(
        "GetUser",
        OperationKind::Query,
        Some("/project/graphql/get_user.graphql"),
    );
    assert_eq!(package.package_name(&at_root), "com.example");

    let outside = descriptor("GetUser", OperationKind::Query, Some("/elsewhere/get_user.graphql"));
    assert_eq!(package.package_name(&outside), "com.example");

    let from_str = descriptor("GetUser", OperationKind::Query, None);
    assert_eq!(package.package_name(&from_str), "com.example");
}

#[test]
fn case_conversions() {
    assert_eq!(pascal_case("get_user"), "GetUser");
    assert_eq!(pascal_case("getUser"), "GetUser");
    assert_eq!(pascal_case("GetUser"), "GetUser");
    assert_eq!(snake_case("GetUserQuery"), "get_user_query");
    assert_eq!(snake_case("FetchHTTPStatus2Query"), "fetch_http_status2_query");
}

#[test]
fn file_path_packages_match_differently_spelled_roots() {
    let project = tempfile::tempdir().unwrap();
    let users_dir = project.path().join("graphql").join("users");
    std::fs::create_dir_all(&users_dir).unwrap();
    std::fs::create_dir(project.path().join("config")).unwrap();
    let doc_path = users_dir.join("get_user.graphql");
    std::fs::write(&doc_path, "query GetUser { user { id } }").unwrap();

    let package = FilePathPackageName {
        root_dir: project.path().join("config").join("..").join("graphql"),
        root_package: "com.example".to_string(),
    };
    let canonical_doc_path = std::fs::canonicalize(&doc_path).unwrap();
    let descriptor = OperationDescriptor::new(
        "GetUser",
        OperationKind::Query,
        "",
        0,
        Some(canonical_doc_path),
    );
    assert_eq!(package.package_name(&descriptor), "com.example.users");
}

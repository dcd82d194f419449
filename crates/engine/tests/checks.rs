//! Declaration-driven checks: forgery protection, configuration, routes,
//! validations, mass assignment, and the version advisory table.

use engine::{scan, Confidence, Report, ScanConfig, Warning};
use ir::{FileRole, FileSyntax, SyntaxNode};
use serde_json::json;

fn self_recv(line: usize) -> SyntaxNode {
    SyntaxNode::leaf("self", json!(null), line)
}

fn params(key: &str, line: usize) -> SyntaxNode {
    SyntaxNode::leaf("params", json!(key), line)
}

fn call(recv: SyntaxNode, name: &str, args: Vec<SyntaxNode>, line: usize) -> SyntaxNode {
    let mut children = vec![recv];
    children.extend(args);
    SyntaxNode::new("call", json!(name), children, line)
}

fn def_node(name: &str, body: Vec<SyntaxNode>, line: usize) -> SyntaxNode {
    let mut children = vec![SyntaxNode::leaf("args", json!([]), line)];
    children.extend(body);
    SyntaxNode::new("def", json!(name), children, line)
}

fn class_file(path: &str, role: FileRole, name: &str, members: Vec<SyntaxNode>) -> FileSyntax {
    let mut file = FileSyntax::new(path, role);
    file.push(SyntaxNode::new("class", json!(name), members, 1));
    file.assign_ids();
    file
}

fn config_file(path: &str, settings: Vec<(&str, serde_json::Value, usize)>) -> FileSyntax {
    let mut file = FileSyntax::new(path, FileRole::Config);
    for (key, value, line) in settings {
        file.push(SyntaxNode::leaf(
            "setting",
            json!({"path": key, "value": value}),
            line,
        ));
    }
    file.assign_ids();
    file
}

fn run(files: Vec<FileSyntax>) -> Report {
    scan(&files, &ScanConfig::default())
}

fn by_check<'a>(report: &'a Report, name: &str) -> Vec<&'a Warning> {
    report
        .warnings
        .iter()
        .filter(|w| w.check_name == name)
        .collect()
}

#[test]
fn missing_forgery_protection_is_flagged_per_controller() {
    let file = class_file(
        "app/controllers/posts_controller.rb",
        FileRole::Controller,
        "PostsController",
        vec![],
    );
    let report = run(vec![file]);
    let csrf = by_check(&report, "Csrf");
    assert_eq!(csrf.len(), 1);
    assert_eq!(csrf[0].warning_type, "Cross-Site Request Forgery");
    assert!(csrf[0].message.contains("PostsController"));
}

#[test]
fn inherited_forgery_protection_suppresses_the_warning() {
    let base = class_file(
        "app/controllers/application_controller.rb",
        FileRole::Controller,
        "ApplicationController",
        vec![SyntaxNode::leaf("csrf_protect", json!(null), 2)],
    );
    let child = class_file(
        "app/controllers/posts_controller.rb",
        FileRole::Controller,
        "PostsController",
        vec![SyntaxNode::leaf("superclass", json!("ApplicationController"), 1)],
    );
    let report = run(vec![base, child]);
    assert!(by_check(&report, "Csrf").is_empty());
}

#[test]
fn weak_session_settings_are_each_flagged() {
    let config = config_file(
        "config/initializers/session_store.rb",
        vec![
            ("session.httponly", json!(false), 2),
            ("session.secure", json!(false), 3),
            ("session.secret", json!("too short"), 4),
        ],
    );
    let report = run(vec![config]);
    let session = by_check(&report, "SessionSettings");
    assert_eq!(session.len(), 3);
    assert!(session.iter().all(|w| w.warning_type == "Session Setting"));
    assert!(session.iter().any(|w| w.message.contains("HTTP only")));
    assert!(session.iter().any(|w| w.message.contains("HTTPS")));
    assert!(session.iter().any(|w| w.message.contains("30 characters")));
}

#[test]
fn long_secret_and_enabled_flags_pass() {
    let config = config_file(
        "config/initializers/session_store.rb",
        vec![
            ("session.httponly", json!(true), 2),
            ("session.secure", json!(true), 3),
            (
                "session.secret",
                json!("0123456789abcdef0123456789abcdef"),
                4,
            ),
        ],
    );
    let report = run(vec![config]);
    assert!(by_check(&report, "SessionSettings").is_empty());
}

#[test]
fn advisories_fire_below_the_fixed_version() {
    let config = config_file(
        "config/environment.rb",
        vec![("framework.version", json!("2.3.11"), 1)],
    );
    let report = run(vec![config]);
    let advisories = by_check(&report, "VersionAdvisories");
    assert_eq!(advisories.len(), 3);
    assert!(advisories
        .iter()
        .any(|w| w.warning_type == "Cross-Site Scripting"));
    assert!(advisories
        .iter()
        .any(|w| w.warning_type == "Response Splitting"));
    assert!(advisories
        .iter()
        .any(|w| w.warning_type == "Remote Code Execution"));
}

#[test]
fn workaround_method_suppresses_the_rce_advisory() {
    let config = config_file(
        "config/environment.rb",
        vec![("framework.version", json!("2.3.14"), 1)],
    );
    let controller = class_file(
        "app/controllers/application_controller.rb",
        FileRole::Controller,
        "ApplicationController",
        vec![
            SyntaxNode::leaf("csrf_protect", json!(null), 2),
            def_node("reject_xml_params", vec![], 3),
        ],
    );
    let report = run(vec![config, controller]);
    let advisories = by_check(&report, "VersionAdvisories");
    assert!(advisories
        .iter()
        .all(|w| w.warning_type != "Remote Code Execution"));
}

#[test]
fn advisories_stay_quiet_at_the_fixed_version() {
    let config = config_file(
        "config/environment.rb",
        vec![("framework.version", json!("2.3.15"), 1)],
    );
    let report = run(vec![config]);
    assert!(by_check(&report, "VersionAdvisories").is_empty());
}

#[test]
fn malformed_version_fails_only_the_advisory_check() {
    let config = config_file(
        "config/environment.rb",
        vec![
            ("framework.version", json!("2.3.x"), 1),
            ("session.httponly", json!(false), 2),
        ],
    );
    let report = run(vec![config]);
    assert!(report.errors.is_empty());
    assert!(by_check(&report, "VersionAdvisories").is_empty());
    assert_eq!(by_check(&report, "SessionSettings").len(), 1);
}

#[test]
fn catch_all_route_is_flagged() {
    let mut routes = FileSyntax::new("config/routes.rb", FileRole::Routes);
    routes.push(SyntaxNode::leaf(
        "route",
        json!({"pattern": ":controller/:action/:id", "controller": ":controller", "action": ":action"}),
        14,
    ));
    routes.push(SyntaxNode::leaf(
        "route",
        json!({"pattern": "/posts/:id", "controller": "posts", "action": "show"}),
        3,
    ));
    routes.assign_ids();
    let report = run(vec![routes]);
    let defaults = by_check(&report, "DefaultRoutes");
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].warning_type, "Default Routes");
    assert_eq!(defaults[0].line, Some(14));
}

#[test]
fn line_anchored_format_validation_is_a_weak_warning() {
    let model = class_file(
        "app/models/user.rb",
        FileRole::Model,
        "User",
        vec![
            SyntaxNode::leaf("attr_accessible", json!(["name"]), 2),
            SyntaxNode::leaf(
                "validates",
                json!({"attribute": "name", "format": "^[a-z]+$"}),
                3,
            ),
        ],
    );
    let report = run(vec![model]);
    let format = by_check(&report, "FormatValidation");
    assert_eq!(format.len(), 1);
    assert_eq!(format[0].confidence, Confidence::Weak);
    assert!(format[0].message.contains("name"));
    assert_eq!(format[0].line, Some(3));
}

#[test]
fn string_anchored_format_validation_passes() {
    let model = class_file(
        "app/models/user.rb",
        FileRole::Model,
        "User",
        vec![
            SyntaxNode::leaf("attr_accessible", json!(["name"]), 2),
            SyntaxNode::leaf(
                "validates",
                json!({"attribute": "name", "format": r"\A[a-z]+\z"}),
                3,
            ),
        ],
    );
    let report = run(vec![model]);
    assert!(by_check(&report, "FormatValidation").is_empty());
}

#[test]
fn raw_parameter_hash_in_mass_assignment_is_high_confidence() {
    let model = class_file("app/models/user.rb", FileRole::Model, "User", vec![]);
    let controller = class_file(
        "app/controllers/users_controller.rb",
        FileRole::Controller,
        "UsersController",
        vec![def_node(
            "create",
            vec![call(
                SyntaxNode::leaf("const", json!("User"), 3),
                "new",
                vec![params("user", 3)],
                3,
            )],
            2,
        )],
    );
    let report = run(vec![model, controller]);
    let mass = by_check(&report, "MassAssignment");
    assert_eq!(mass.len(), 1);
    assert_eq!(mass[0].confidence, Confidence::High);
    assert_eq!(mass[0].warning_type, "Mass Assignment");
}

#[test]
fn model_without_attribute_whitelist_is_flagged_once() {
    let model = class_file("app/models/user.rb", FileRole::Model, "User", vec![]);
    let report = run(vec![model]);
    let restriction = by_check(&report, "AttributeRestriction");
    assert_eq!(restriction.len(), 1);
    assert_eq!(restriction[0].warning_type, "Attribute Restriction");
    assert!(restriction[0].message.contains("User"));
}

#[test]
fn whitelisted_model_passes_attribute_restriction() {
    let model = class_file(
        "app/models/user.rb",
        FileRole::Model,
        "User",
        vec![SyntaxNode::leaf("attr_accessible", json!(["name"]), 2)],
    );
    let report = run(vec![model]);
    assert!(by_check(&report, "AttributeRestriction").is_empty());
}

#[test]
fn dynamic_render_path_from_parameter_is_flagged() {
    let controller = class_file(
        "app/controllers/pages_controller.rb",
        FileRole::Controller,
        "PagesController",
        vec![def_node(
            "show",
            vec![SyntaxNode::new("render", json!(null), vec![params("page", 3)], 3)],
            2,
        )],
    );
    let report = run(vec![controller]);
    let renders = by_check(&report, "DynamicRenderPath");
    assert_eq!(renders.len(), 1);
    assert_eq!(renders[0].warning_type, "Dynamic Render Path");
    assert_eq!(renders[0].line, Some(3));
}

#[test]
fn static_render_path_passes() {
    let controller = class_file(
        "app/controllers/pages_controller.rb",
        FileRole::Controller,
        "PagesController",
        vec![def_node(
            "show",
            vec![SyntaxNode::leaf("render", json!("pages/about"), 3)],
            2,
        )],
    );
    let report = run(vec![controller]);
    assert!(by_check(&report, "DynamicRenderPath").is_empty());
}

#[test]
fn find_on_owned_model_keyed_by_parameter_is_unscoped() {
    let account = class_file(
        "app/models/account.rb",
        FileRole::Model,
        "Account",
        vec![
            SyntaxNode::leaf("attr_accessible", json!(["name"]), 2),
            SyntaxNode::leaf("belongs_to", json!("user"), 3),
        ],
    );
    let controller = class_file(
        "app/controllers/accounts_controller.rb",
        FileRole::Controller,
        "AccountsController",
        vec![def_node(
            "show",
            vec![call(
                SyntaxNode::leaf("const", json!("Account"), 3),
                "find",
                vec![params("id", 3)],
                3,
            )],
            2,
        )],
    );
    let report = run(vec![account, controller]);
    let unscoped = by_check(&report, "UnscopedFind");
    assert_eq!(unscoped.len(), 1);
    assert_eq!(unscoped[0].warning_type, "Unscoped Find");
    assert_eq!(unscoped[0].confidence, Confidence::Weak);
    assert!(unscoped[0].message.contains("Account"));
}

#[test]
fn find_on_unowned_model_is_not_unscoped() {
    let account = class_file(
        "app/models/account.rb",
        FileRole::Model,
        "Account",
        vec![SyntaxNode::leaf("attr_accessible", json!(["name"]), 2)],
    );
    let controller = class_file(
        "app/controllers/accounts_controller.rb",
        FileRole::Controller,
        "AccountsController",
        vec![def_node(
            "show",
            vec![call(
                SyntaxNode::leaf("const", json!("Account"), 3),
                "find",
                vec![params("id", 3)],
                3,
            )],
            2,
        )],
    );
    let report = run(vec![account, controller]);
    assert!(by_check(&report, "UnscopedFind").is_empty());
}

#[test]
fn finder_bound_local_receiver_is_mass_assignment() {
    let model = class_file(
        "app/models/user.rb",
        FileRole::Model,
        "User",
        vec![SyntaxNode::leaf("attr_accessible", json!(["name"]), 2)],
    );
    let controller = class_file(
        "app/controllers/users_controller.rb",
        FileRole::Controller,
        "UsersController",
        vec![def_node(
            "update",
            vec![
                SyntaxNode::new(
                    "lasgn",
                    json!("u"),
                    vec![call(
                        SyntaxNode::leaf("const", json!("User"), 3),
                        "find",
                        vec![params("id", 3)],
                        3,
                    )],
                    3,
                ),
                call(
                    SyntaxNode::leaf("lvar", json!("u"), 4),
                    "update_attributes",
                    vec![params("user", 4)],
                    4,
                ),
            ],
            2,
        )],
    );
    let report = run(vec![model, controller]);
    let mass = by_check(&report, "MassAssignment");
    assert_eq!(mass.len(), 1);
    assert_eq!(mass[0].confidence, Confidence::High);
    assert_eq!(mass[0].line, Some(4));
}

#[test]
fn command_and_file_and_dispatch_sinks_are_flagged() {
    let dstr = SyntaxNode::new(
        "dstr",
        json!(null),
        vec![
            SyntaxNode::leaf("str", json!("convert "), 2),
            params("file", 2),
        ],
        2,
    );
    let controller = class_file(
        "app/controllers/tools_controller.rb",
        FileRole::Controller,
        "ToolsController",
        vec![def_node(
            "run",
            vec![
                call(self_recv(2), "system", vec![dstr], 2),
                call(
                    SyntaxNode::leaf("const", json!("File"), 3),
                    "read",
                    vec![params("path", 3)],
                    3,
                ),
                call(self_recv(4), "send", vec![params("action", 4)], 4),
                call(params("key", 5), "to_sym", vec![], 5),
            ],
            2,
        )],
    );
    let report = run(vec![controller]);
    assert_eq!(by_check(&report, "CommandInjection").len(), 1);
    assert_eq!(by_check(&report, "FileAccess").len(), 1);
    assert_eq!(by_check(&report, "DangerousSend").len(), 1);
    assert_eq!(by_check(&report, "SymbolDos").len(), 1);
}

#[test]
fn report_tally_counts_by_category() {
    let model = class_file("app/models/user.rb", FileRole::Model, "User", vec![]);
    let controller = class_file(
        "app/controllers/posts_controller.rb",
        FileRole::Controller,
        "PostsController",
        vec![],
    );
    let report = run(vec![model, controller]);
    let tally = report.tally();
    assert!(tally.contains(&("controller", 1)));
    assert!(tally.contains(&("model", 1)));
}

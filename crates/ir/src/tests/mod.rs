use super::*;
use serde_json::json;

fn call(name: &str, recv: SyntaxNode, args: Vec<SyntaxNode>, line: usize) -> SyntaxNode {
    let mut children = vec![recv];
    children.extend(args);
    SyntaxNode::new("call", json!(name), children, line)
}

#[test]
fn assign_ids_numbers_preorder() {
    let mut file = FileSyntax::new("app/models/user.rb", FileRole::Model);
    file.push(SyntaxNode::new(
        "lasgn",
        json!("x"),
        vec![SyntaxNode::leaf("params", json!("q"), 1)],
        1,
    ));
    file.push(SyntaxNode::leaf("lvar", json!("x"), 2));
    file.assign_ids();
    assert_eq!(file.nodes[0].id, 0);
    assert_eq!(file.nodes[0].children[0].id, 1);
    assert_eq!(file.nodes[1].id, 2);
}

#[test]
fn render_call_with_receiver_and_args() {
    let node = call(
        "find",
        SyntaxNode::leaf("const", json!("User"), 3),
        vec![SyntaxNode::leaf("params", json!("id"), 3)],
        3,
    );
    assert_eq!(node.render(), "User.find(params[:id])");
}

#[test]
fn render_interpolation() {
    let node = SyntaxNode::new(
        "dstr",
        json!(null),
        vec![
            SyntaxNode::leaf("str", json!("select * from t where id = "), 1),
            SyntaxNode::leaf("params", json!("id"), 1),
        ],
        1,
    );
    assert_eq!(
        node.render(),
        "\"select * from t where id = #{params[:id]}\""
    );
}

#[test]
fn skeleton_elides_literals_but_keeps_shape() {
    let a = SyntaxNode::new(
        "dstr",
        json!(null),
        vec![
            SyntaxNode::leaf("str", json!("one literal"), 1),
            SyntaxNode::leaf("params", json!("id"), 1),
        ],
        1,
    );
    let b = SyntaxNode::new(
        "dstr",
        json!(null),
        vec![
            SyntaxNode::leaf("str", json!("a different literal"), 9),
            SyntaxNode::leaf("params", json!("id"), 9),
        ],
        9,
    );
    assert_eq!(a.skeleton(), b.skeleton());
    assert_ne!(a.render(), b.render());
}

#[test]
fn serialization_roundtrip_preserves_tree() {
    let mut file = FileSyntax::new("config/routes.rb", FileRole::Routes);
    file.push(SyntaxNode::leaf(
        "route",
        json!({"pattern": ":controller/:action/:id", "controller": "*", "action": "*"}),
        54,
    ));
    file.assign_ids();
    let text = serde_json::to_string(&file).unwrap();
    let back: FileSyntax = serde_json::from_str(&text).unwrap();
    assert_eq!(back.nodes.len(), 1);
    assert_eq!(back.nodes[0].tag, "route");
    assert_eq!(back.nodes[0].line, 54);
}

use std::path::PathBuf;
use userflow_core::{FlowConfig, decode_payload, normalize_links};
use userflow_render::events::{FlowHit, hit_test};
use userflow_render::layout::layout_user_flow;
use userflow_render::scene::build_scene;
use userflow_render::svg::{SvgRenderOptions, render_flow_svg};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture_scene(name: &str) -> userflow_render::FlowScene {
    let path = workspace_root().join("fixtures").join("userflow").join(name);
    let text = std::fs::read_to_string(&path).expect("fixture");
    let payload: serde_json::Value = serde_json::from_str(&text).expect("fixture json");
    let mut graph = decode_payload(&payload).expect("decode ok");
    normalize_links(&mut graph);
    let config = FlowConfig::default();
    let layout = layout_user_flow(&graph, &config).expect("layout ok");
    build_scene(&layout, &config)
}

#[test]
fn two_column_dataset_yields_one_bar_and_no_ribbon_for_the_dropout_link() {
    let scene = fixture_scene("nested.json");
    // Landing -> Signup is the only ribbon; Landing -> dropout becomes a bar.
    assert_eq!(scene.dropout_bars.len(), 1);
    assert_eq!(scene.ribbons.len(), 1);
    assert_eq!(scene.interactions, 2);

    let bar = &scene.dropout_bars[0];
    assert!(bar.tooltip.contains("Dropouts"));
    assert!(bar.tooltip.contains("session(s)"));
    assert!(scene.ribbons.iter().all(|r| r.link_index != bar.link_index));
}

#[test]
fn ribbon_stroke_width_is_at_least_one() {
    let scene = fixture_scene("basic.json");
    assert!(!scene.ribbons.is_empty());
    for ribbon in &scene.ribbons {
        assert!(ribbon.stroke_width >= 1.0);
        assert!(ribbon.path.starts_with('M'));
        assert!(ribbon.path.contains('C'));
    }
}

#[test]
fn headers_count_interactions_in_order() {
    let scene = fixture_scene("basic.json");
    let texts: Vec<&str> = scene.headers.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["1st interaction", "2nd interaction", "3rd interaction"]
    );
    assert!(scene.headers.windows(2).all(|w| w[0].x < w[1].x));
}

#[test]
fn dropout_nodes_have_no_rect_or_label() {
    let scene = fixture_scene("basic.json");
    // basic.json has 4 nodes, one of them the sentinel.
    assert_eq!(scene.node_rects.len(), 3);
    assert_eq!(scene.node_labels.len(), 3);
    assert!(scene.node_labels.iter().all(|l| !l.full_text.eq_ignore_ascii_case("dropout")));
}

#[test]
fn labels_are_truncated_but_keep_the_full_name() {
    let payload = serde_json::json!({
        "nodes": [
            {"name": "A very long page title exceeding limit"},
            {"name": "Next"}
        ],
        "links": [{"source": 0, "target": 1, "value": 10}]
    });
    let mut graph = decode_payload(&payload).expect("decode ok");
    normalize_links(&mut graph);
    let config = FlowConfig::default();
    let layout = layout_user_flow(&graph, &config).expect("layout ok");
    let scene = build_scene(&layout, &config);

    let label = &scene.node_labels[0];
    assert_eq!(label.text, "A very long page ti...");
    assert_eq!(label.full_text, "A very long page title exceeding limit");
}

#[test]
fn svg_document_carries_the_expected_structure() {
    let scene = fixture_scene("basic.json");
    let svg = render_flow_svg(
        &scene,
        &SvgRenderOptions {
            diagram_id: Some("flow-1".to_string()),
        },
    );
    assert!(svg.starts_with("<svg id=\"flow-1\""));
    assert!(svg.contains("dropout-node"));
    assert!(svg.contains("1st interaction"));
    assert!(svg.contains("session(s)"));
    assert!(svg.contains("class=\"link\""));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn svg_exposes_node_identities_for_host_side_hover_wiring() {
    let scene = fixture_scene("basic.json");
    let svg = render_flow_svg(&scene, &SvgRenderOptions::default());

    let ribbon = &scene.ribbons[0];
    assert!(svg.contains(&format!(
        "data-source=\"{}\" data-target=\"{}\"",
        ribbon.source, ribbon.target
    )));
    let bar = &scene.dropout_bars[0];
    assert!(svg.contains(&format!("data-source=\"{}\"", bar.source)));
    assert!(svg.contains("data-node=\"0\""));
}

#[test]
fn hit_testing_resolves_nodes_and_bars() {
    let scene = fixture_scene("basic.json");

    let rect = &scene.node_rects[0];
    let hit = hit_test(&scene, rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);
    assert_eq!(
        hit,
        Some(FlowHit::Node {
            node_index: rect.node_index
        })
    );

    let bar = &scene.dropout_bars[0];
    let hit = hit_test(&scene, bar.x + bar.width / 2.0, bar.y + bar.height / 2.0);
    assert_eq!(
        hit,
        Some(FlowHit::DropoutBar {
            link_index: bar.link_index,
            target: bar.target
        })
    );

    assert_eq!(hit_test(&scene, -1000.0, -1000.0), None);
}

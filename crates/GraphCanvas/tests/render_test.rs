use glam::{DVec2, Vec2, Vec4};
use graph_canvas::{
    Camera, Canvas, CanvasConfig, CanvasError,
    background::Background,
    input::PointerEvent,
    model::{Edge, Label, Node, NodeStyle, Shape, StyleSet},
    render::{DrawCommand, RecordingSurface, SubPath},
};

const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);
const BACKGROUND: Vec4 = Vec4::new(0.05, 0.05, 0.05, 1.0);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// A canvas on a solid background, so the only strokes are the scene's.
fn create_canvas(nodes: Vec<Node>, edges: Vec<Edge>) -> (Canvas, RecordingSurface) {
    init_tracing();
    let config = CanvasConfig {
        background: Background::Solid { color: BACKGROUND },
        ..Default::default()
    };
    let mut canvas = Canvas::new(config).unwrap();
    canvas.set_nodes(nodes).unwrap();
    canvas.set_edges(edges).unwrap();
    (canvas, RecordingSurface::new(Vec2::new(800.0, 600.0)))
}

fn polyline(path: &[SubPath]) -> &[Vec2] {
    match path {
        [SubPath::Polyline { points, .. }] => points.as_slice(),
        other => panic!("Expected a single polyline, got {other:?}"),
    }
}

#[test]
fn test_basic_rendering() {
    let (mut canvas, mut surface) = create_canvas(
        vec![Node::rect("r", Vec2::new(100.0, 100.0), Vec2::new(100.0, 50.0))],
        vec![],
    );

    let report = canvas.tick(&mut surface);
    assert_eq!(report.stats.nodes_drawn, 1);

    // 1. Background fills the viewport first
    let mut fills = surface.fills();
    let (background, color) = fills.next().unwrap();
    assert_eq!(color, BACKGROUND);
    assert_eq!(
        polyline(background),
        &[
            Vec2::new(0.0, 0.0),
            Vec2::new(800.0, 0.0),
            Vec2::new(800.0, 600.0),
            Vec2::new(0.0, 600.0),
        ]
    );

    // 2. Then the node, in screen space
    let (node, color) = fills.next().unwrap();
    assert_eq!(color, NodeStyle::default().fill_color);
    assert_eq!(
        polyline(node),
        &[
            Vec2::new(100.0, 100.0),
            Vec2::new(200.0, 100.0),
            Vec2::new(200.0, 150.0),
            Vec2::new(100.0, 150.0),
        ]
    );
}

#[test]
fn test_first_frame_resizes_then_clears() {
    let (mut canvas, _) = create_canvas(vec![], vec![]);
    let mut surface = RecordingSurface::new(Vec2::new(300.0, 150.0));

    canvas.tick(&mut surface);
    assert_eq!(
        surface.commands.first(),
        Some(&DrawCommand::Resize {
            size: Vec2::new(800.0, 600.0)
        })
    );

    canvas.tick(&mut surface);
    assert_eq!(surface.commands.first(), Some(&DrawCommand::Clear));

    canvas.update_viewport_size(Vec2::new(1024.0, 768.0));
    canvas.tick(&mut surface);
    assert_eq!(
        surface.commands.first(),
        Some(&DrawCommand::Resize {
            size: Vec2::new(1024.0, 768.0)
        })
    );
}

#[test]
fn test_offscreen_nodes_are_culled() {
    let (mut canvas, mut surface) = create_canvas(
        vec![
            // Fully outside, left of the viewport.
            Node::circle("out", Vec2::new(-100.0, 300.0), 20.0),
            // Straddles the left border.
            Node::circle("edge", Vec2::new(5.0, 300.0), 20.0),
            // Rect whose top-left is off screen but whose body is visible.
            Node::rect("rect", Vec2::new(-30.0, -30.0), Vec2::new(60.0, 60.0)),
            // Fully below the viewport.
            Node::rect("below", Vec2::new(100.0, 620.0), Vec2::new(60.0, 60.0)),
        ],
        vec![],
    );

    let report = canvas.tick(&mut surface);
    assert_eq!(report.stats.nodes_drawn, 2);
    assert_eq!(report.stats.nodes_culled, 2);

    // Panning right brings the first node into view.
    canvas.camera.pan(DVec2::new(150.0, 0.0));
    let report = canvas.tick(&mut surface);
    assert_eq!(report.stats.nodes_culled, 1);
}

#[test]
fn test_culling_when_zoomed_out() {
    let (mut canvas, mut surface) = create_canvas(
        vec![
            // Off screen at 1x, inside the viewport at 0.5x.
            Node::circle("far", Vec2::new(1000.0, 500.0), 10.0),
            // Screen circle at (800, 300) radius 20 straddles the right border.
            Node::circle("straddle", Vec2::new(1600.0, 600.0), 40.0),
            // Screen circle at (850, 300) radius 20 is fully past it.
            Node::circle("out", Vec2::new(1700.0, 600.0), 40.0),
        ],
        vec![],
    );
    canvas.camera = Camera::new(DVec2::ZERO, 0.5);

    let report = canvas.tick(&mut surface);
    assert_eq!(report.stats.nodes_drawn, 2);
    assert_eq!(report.stats.nodes_culled, 1);
}

#[test]
fn test_culling_when_zoomed_in() {
    let (mut canvas, mut surface) = create_canvas(
        vec![
            // Screen rect (750..810, 300..360) straddles the right border.
            Node::rect("straddle", Vec2::new(250.0, 100.0), Vec2::new(20.0, 20.0)),
            // Centered past the border, but its radius reaches back in.
            Node::circle("wide", Vec2::new(300.0, 100.0), 50.0),
            // Screen circle at (840, 300) radius 15 is fully outside.
            Node::circle("out", Vec2::new(280.0, 100.0), 5.0),
            // Visible at 1x, pushed off screen at 3x.
            Node::circle("pushed", Vec2::new(400.0, 100.0), 10.0),
        ],
        vec![],
    );
    canvas.camera = Camera::new(DVec2::ZERO, 3.0);

    let report = canvas.tick(&mut surface);
    assert_eq!(report.stats.nodes_drawn, 2);
    assert_eq!(report.stats.nodes_culled, 2);

    let drawn: Vec<Vec2> = surface
        .fills()
        .skip(1)
        .flat_map(|(path, _)| path.iter())
        .filter_map(|sub| match sub {
            SubPath::Circle { center, .. } => Some(*center),
            _ => None,
        })
        .collect();
    assert_eq!(drawn, vec![Vec2::new(900.0, 300.0)]);
}

#[test]
fn test_offscreen_edges_are_culled() {
    let (mut canvas, mut surface) = create_canvas(
        vec![
            Node::circle("a", Vec2::new(-300.0, -300.0), 10.0),
            Node::circle("b", Vec2::new(-100.0, -50.0), 10.0),
            Node::circle("c", Vec2::new(400.0, 300.0), 10.0),
        ],
        vec![Edge::new("ab", "a", "b"), Edge::new("ac", "a", "c")],
    );

    let report = canvas.tick(&mut surface);
    assert_eq!(report.stats.edges_culled, 1);
    assert_eq!(report.stats.edges_drawn, 1);
}

#[test]
fn test_edge_is_clipped_at_both_nodes() {
    let (mut canvas, mut surface) = create_canvas(
        vec![
            Node::circle("a", Vec2::new(100.0, 100.0), 20.0),
            Node::circle("b", Vec2::new(300.0, 100.0), 20.0),
        ],
        vec![Edge::new("ab", "a", "b")],
    );

    canvas.tick(&mut surface);

    // The line stops one arrow length short of node B's rim.
    let (path, _, width) = surface.strokes().next().unwrap();
    let points = polyline(path);
    assert_eq!(points.len(), 2);
    assert!(points[0].abs_diff_eq(Vec2::new(120.0, 100.0), 1e-3));
    assert!(points[1].abs_diff_eq(Vec2::new(270.0, 100.0), 1e-3));
    assert_eq!(width, 2.0);

    // The arrow head's tip touches the rim.
    let (arrow, _) = surface
        .fills()
        .find(|(path, _)| matches!(path, [SubPath::Polyline { closed: true, points }] if points.len() == 3))
        .unwrap();
    let arrow = polyline(arrow);
    assert!(arrow[0].abs_diff_eq(Vec2::new(280.0, 100.0), 1e-3));
    assert!((arrow[1].x - 270.0).abs() < 1e-3);
    assert!(((arrow[1].y - arrow[2].y).abs() - 8.0).abs() < 1e-3);
}

#[test]
fn test_edge_is_clipped_at_rect_border() {
    let (mut canvas, mut surface) = create_canvas(
        vec![
            // Centered on (20, 100).
            Node::rect("r", Vec2::new(0.0, 80.0), Vec2::new(40.0, 40.0)),
            Node::circle("c", Vec2::new(300.0, 100.0), 20.0),
        ],
        vec![Edge::new("rc", "r", "c")],
    );

    canvas.tick(&mut surface);

    let (path, _, _) = surface.strokes().next().unwrap();
    let points = polyline(path);
    assert!(points[0].abs_diff_eq(Vec2::new(40.0, 100.0), 1e-3));
}

#[test]
fn test_edge_hover_follows_stroke() {
    let (mut canvas, mut surface) = create_canvas(
        vec![
            Node::circle("a", Vec2::new(100.0, 100.0), 20.0),
            Node::circle("b", Vec2::new(300.0, 100.0), 20.0),
        ],
        vec![Edge::new("ab", "a", "b")],
    );
    let ab = canvas.scene.edge_key(&"ab".into());

    canvas.handle_pointer(PointerEvent::moved(Vec2::new(200.0, 100.0)));
    canvas.tick(&mut surface);
    assert_eq!(canvas.scene.hovered_edge, ab);

    canvas.handle_pointer(PointerEvent::moved(Vec2::new(200.0, 110.0)));
    canvas.tick(&mut surface);
    assert_eq!(canvas.scene.hovered_edge, None);
}

#[test]
fn test_hover_and_select_styles() {
    let styled = StyleSet::new(NodeStyle::default())
        .with_hover(NodeStyle {
            fill_color: RED,
            ..NodeStyle::default()
        })
        .with_select(NodeStyle {
            fill_color: BLUE,
            ..NodeStyle::default()
        });
    let (mut canvas, mut surface) = create_canvas(
        vec![Node::circle("a", Vec2::new(100.0, 100.0), 20.0).with_style(styled)],
        vec![],
    );

    // 1. Not hovered
    canvas.tick(&mut surface);
    let (_, color) = surface.fills().last().unwrap();
    assert_eq!(color, NodeStyle::default().fill_color);

    // 2. Hovered: the style switches in the same frame
    canvas.handle_pointer(PointerEvent::moved(Vec2::new(100.0, 100.0)));
    canvas.tick(&mut surface);
    let (_, color) = surface.fills().last().unwrap();
    assert_eq!(color, RED);

    // 3. Selected and hovered: selection wins
    canvas.handle_pointer(PointerEvent::down(Vec2::new(100.0, 100.0)));
    canvas.tick(&mut surface);
    let (_, color) = surface.fills().last().unwrap();
    assert_eq!(color, BLUE);
}

#[test]
fn test_overlapping_nodes_last_drawn_wins() {
    let (mut canvas, mut surface) = create_canvas(
        vec![
            Node::circle("below", Vec2::new(100.0, 100.0), 30.0),
            Node::circle("above", Vec2::new(110.0, 100.0), 30.0),
        ],
        vec![],
    );

    canvas.handle_pointer(PointerEvent::moved(Vec2::new(105.0, 100.0)));
    canvas.tick(&mut surface);
    assert_eq!(
        canvas.scene.hovered_node,
        canvas.scene.node_key(&"above".into())
    );

    // Only the lower node covers this point.
    canvas.handle_pointer(PointerEvent::moved(Vec2::new(75.0, 100.0)));
    canvas.tick(&mut surface);
    assert_eq!(
        canvas.scene.hovered_node,
        canvas.scene.node_key(&"below".into())
    );
}

#[test]
fn test_hover_respects_zoom() {
    let (mut canvas, mut surface) = create_canvas(
        vec![Node::circle("a", Vec2::new(50.0, 50.0), 10.0)],
        vec![],
    );
    canvas.camera = Camera::new(DVec2::ZERO, 2.0);

    // On screen the node sits at (100, 100) with radius 20.
    canvas.handle_pointer(PointerEvent::moved(Vec2::new(115.0, 100.0)));
    canvas.tick(&mut surface);
    assert!(canvas.scene.hovered_node.is_some());

    canvas.handle_pointer(PointerEvent::moved(Vec2::new(55.0, 50.0)));
    canvas.tick(&mut surface);
    assert!(canvas.scene.hovered_node.is_none());
}

#[test]
fn test_node_label_is_elided_to_shape_width() {
    let mut label = Label::new("abcdefghijkl");
    label.font = "10px sans-serif".to_string();
    let (mut canvas, mut surface) = create_canvas(
        vec![Node::rect("r", Vec2::new(100.0, 100.0), Vec2::new(40.0, 20.0)).with_label(label)],
        vec![],
    );

    canvas.tick(&mut surface);

    // 5px per glyph at 10px: eight glyphs fill the 40px width.
    assert_eq!(surface.texts().collect::<Vec<_>>(), vec!["abcdefg…"]);
    let anchor = surface.commands.iter().find_map(|cmd| match cmd {
        DrawCommand::Text { pos, .. } => Some(*pos),
        _ => None,
    });
    assert_eq!(anchor, Some(Vec2::new(120.0, 110.0)));
}

#[test]
fn test_edge_label_sits_at_midpoint() {
    let (mut canvas, mut surface) = create_canvas(
        vec![
            Node::circle("a", Vec2::new(100.0, 100.0), 20.0),
            Node::circle("b", Vec2::new(300.0, 100.0), 20.0),
        ],
        vec![Edge::new("ab", "a", "b").with_label(Label::new("a very long edge label"))],
    );

    canvas.tick(&mut surface);

    let (text, pos) = surface
        .commands
        .iter()
        .find_map(|cmd| match cmd {
            DrawCommand::Text { text, pos, .. } => Some((text.clone(), *pos)),
            _ => None,
        })
        .unwrap();
    assert_eq!(text, "a very long edge label");
    assert!(pos.abs_diff_eq(Vec2::new(200.0, 100.0), 1e-3));
}

#[test]
fn test_draw_order() {
    let nodes = vec![
        Node::circle("a", Vec2::new(100.0, 100.0), 20.0),
        Node::circle("b", Vec2::new(300.0, 100.0), 20.0),
    ];
    let edges = vec![Edge::new("ab", "a", "b")];

    let is_node_fill = |cmd: &DrawCommand| {
        matches!(cmd, DrawCommand::Fill { path, .. } if matches!(path.as_slice(), [SubPath::Circle { .. }]))
    };
    let is_edge_stroke = |cmd: &DrawCommand| {
        matches!(cmd, DrawCommand::Stroke { path, .. } if matches!(path.as_slice(), [SubPath::Polyline { .. }]))
    };

    // 1. Edges below nodes by default
    let (mut canvas, mut surface) = create_canvas(nodes.clone(), edges.clone());
    canvas.tick(&mut surface);
    let edge_at = surface.commands.iter().position(is_edge_stroke).unwrap();
    let node_at = surface.commands.iter().position(is_node_fill).unwrap();
    assert!(edge_at < node_at);

    // 2. Edges above nodes when configured
    let (mut canvas, mut surface) = create_canvas(nodes, edges);
    canvas.update_config(|config| config.edges_above_nodes = true).unwrap();
    canvas.tick(&mut surface);
    let edge_at = surface.commands.iter().position(is_edge_stroke).unwrap();
    let node_at = surface.commands.iter().position(is_node_fill).unwrap();
    assert!(node_at < edge_at);
}

#[test]
fn test_pointer_crosshair() {
    let (mut canvas, mut surface) = create_canvas(vec![], vec![]);
    canvas.update_config(|config| config.show_pointer = true).unwrap();
    canvas.camera = Camera::new(DVec2::ZERO, 2.0);

    canvas.handle_pointer(PointerEvent::moved(Vec2::new(200.0, 100.0)));
    canvas.tick(&mut surface);

    let (path, color, width) = surface.strokes().last().unwrap();
    assert_eq!(color, RED);
    assert_eq!(width, 1.0);
    // Ten world units either side of the pointer, i.e. twenty pixels at 2x.
    assert_eq!(
        path,
        &[
            SubPath::Polyline {
                points: vec![Vec2::new(180.0, 100.0), Vec2::new(220.0, 100.0)],
                closed: false,
            },
            SubPath::Polyline {
                points: vec![Vec2::new(200.0, 80.0), Vec2::new(200.0, 120.0)],
                closed: false,
            },
        ]
    );
}

#[test]
fn test_grid_and_dots_backgrounds_draw() {
    let (mut canvas, mut surface) = create_canvas(vec![], vec![]);

    canvas.set_background(Background::default()).unwrap();
    canvas.tick(&mut surface);
    let (lines, _, width) = surface.strokes().next().unwrap();
    assert!(!lines.is_empty());
    assert_eq!(width, 1.0);

    canvas
        .set_background(Background::Dots {
            line_width: 2.0,
            gap: 20.0,
            color: Vec4::ONE,
        })
        .unwrap();
    canvas.tick(&mut surface);
    let (dots, _) = surface.fills().next().unwrap();
    assert!(dots.iter().all(|sub| matches!(sub, SubPath::Circle { radius, .. } if *radius == 1.0)));
    // 800x600 at a 20px gap: at least 40 columns by 30 rows.
    assert!(dots.len() >= 40 * 30);

    assert!(
        canvas
            .set_background(Background::Grid {
                cell_size: -1.0,
                limit: 64,
                adaptive: true,
                stroke_color: Vec4::ONE,
            })
            .is_err()
    );
}

#[test]
fn test_shape_extent() {
    assert_eq!(Shape::Circle { radius: 5.0 }.extent(), Vec2::new(10.0, 10.0));
    assert_eq!(
        Shape::Rect {
            width: 3.0,
            height: 4.0
        }
        .extent(),
        Vec2::new(3.0, 4.0)
    );
}

#[test]
fn test_update_config_replaces_background() {
    let (mut canvas, mut surface) = create_canvas(vec![], vec![]);

    // 1. A valid edit takes effect on the next frame
    canvas
        .update_config(|config| config.background = Background::Solid { color: RED })
        .unwrap();
    canvas.tick(&mut surface);
    assert_eq!(surface.fills().next().map(|(_, color)| color), Some(RED));

    // 2. An invalid edit is rejected and changes nothing
    let result = canvas.update_config(|config| {
        config.background = Background::Dots {
            line_width: 1.0,
            gap: 0.0,
            color: BLUE,
        }
    });
    assert!(matches!(result, Err(CanvasError::InvalidConfig(_))));
    assert_eq!(canvas.config().background, Background::Solid { color: RED });
    canvas.tick(&mut surface);
    assert_eq!(surface.fills().next().map(|(_, color)| color), Some(RED));
}

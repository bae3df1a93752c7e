use glam::Vec2;
use graph_canvas::input::PointerEvent;
use graph_canvas::model::{Edge, Label, Node};
use graph_canvas::render::RecordingSurface;
use graph_canvas::{Canvas, CanvasConfig};

fn main() -> Result<(), graph_canvas::CanvasError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== GraphCanvas Headless Demo ===");

    // 1. Initialize Canvas
    let mut canvas = Canvas::new(CanvasConfig::default())?;
    canvas.update_viewport_size(Vec2::new(1280.0, 720.0));
    canvas.on_select(|element| println!("  Selected: {element:?}"));
    canvas.on_hover(|element| println!("  Hovering: {element:?}"));

    // 2. Populate the scene
    canvas.set_nodes(vec![
        Node::circle("a", Vec2::new(200.0, 200.0), 40.0).with_label(Label::new("Node A")),
        Node::rect("b", Vec2::new(500.0, 150.0), Vec2::new(150.0, 100.0))
            .with_label(Label::new("Node B")),
    ])?;
    canvas.set_edges(vec![Edge::new("a->b", "a", "b")])?;

    let mut surface = RecordingSurface::new(Vec2::ZERO);

    // 3. Scripted input: hover A, drag it, release, then zoom in over B
    let script = [
        PointerEvent::moved(Vec2::new(200.0, 200.0)),
        PointerEvent::down(Vec2::new(200.0, 200.0)),
        PointerEvent::moved(Vec2::new(260.0, 320.0)),
        PointerEvent::up(Vec2::new(260.0, 320.0)),
        PointerEvent::wheel(Vec2::new(575.0, 200.0), -120.0),
    ];

    for (frame, event) in script.into_iter().enumerate() {
        println!("\n--- Frame {frame} ---");
        canvas.handle_pointer(event);
        let report = canvas.tick(&mut surface);

        println!("  Events: {:?}", report.events);
        println!("  Stats: {:?}", report.stats);
        println!("  Cursor: {}", report.cursor.as_str());
        println!("  Commands recorded: {}", surface.commands.len());
        if let Some(node) = canvas.scene.node(&"a".into()) {
            println!("  Node A at {}", node.position);
        }
    }

    // 4. Let the wheel momentum run out
    let mut frames = 0;
    while canvas.pointer.wheel != 0.0 {
        canvas.tick(&mut surface);
        frames += 1;
    }
    println!("\nZoom settled after {frames} more frames at scale {:.3}", canvas.camera.scale);

    println!("\nDemo Complete.");
    Ok(())
}

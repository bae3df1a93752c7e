use anyhow::Context;
use glam::{Vec2, Vec4};
use graph_canvas::input::PointerEvent;
use graph_canvas::model::{Edge, Label, Node, NodeStyle, StyleSet};
use graph_canvas::render::{DrawCommand, RecordingSurface, SubPath};
use graph_canvas::surface::TextAlign;
use graph_canvas::{Canvas, CanvasConfig, CanvasEvent, CursorHint};
use macroquad::miniquad::CursorIcon;
use macroquad::prelude as mq;

#[macroquad::main("GraphCanvas Playground")]
async fn main() {
    tracing_subscriber::fmt().init();

    if let Err(err) = run().await {
        tracing::error!("Playground failed: {err:#}");
    }
}

async fn run() -> anyhow::Result<()> {
    // 1. Configuration, optionally from a JSON file given on the command line
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config from {path}"))?;
            CanvasConfig::from_json(&json).with_context(|| format!("loading config {path}"))?
        }
        None => CanvasConfig::default(),
    };

    // 2. Canvas and demo scene
    let mut canvas = Canvas::new(config).context("creating canvas")?;
    canvas.set_nodes(demo_nodes()).context("adding demo nodes")?;
    canvas.set_edges(demo_edges()).context("adding demo edges")?;
    canvas.on_select(|element| tracing::info!(?element, "Selected"));

    let mut surface = RecordingSurface::new(Vec2::ZERO);
    let mut last_mouse = Vec2::NAN;

    loop {
        canvas.update_viewport_size(Vec2::new(mq::screen_width(), mq::screen_height()));

        // 3. Input: map macroquad state onto pointer events
        let (mx, my) = mq::mouse_position();
        let mouse = Vec2::new(mx, my);
        if mouse != last_mouse {
            canvas.handle_pointer(PointerEvent::moved(mouse));
            last_mouse = mouse;
        }
        if mq::is_mouse_button_pressed(mq::MouseButton::Left) {
            canvas.handle_pointer(PointerEvent::down(mouse));
        }
        if mq::is_mouse_button_released(mq::MouseButton::Left) {
            canvas.handle_pointer(PointerEvent::up(mouse));
        }
        let (_, wheel) = mq::mouse_wheel();
        if wheel != 0.0 {
            // Macroquad reports scrolling up as positive.
            canvas.handle_pointer(PointerEvent::wheel(mouse, -wheel));
        }

        if mq::is_key_pressed(mq::KeyCode::P) {
            canvas
                .update_config(|config| config.show_pointer = !config.show_pointer)
                .context("toggling the pointer overlay")?;
        }
        if mq::is_key_pressed(mq::KeyCode::Delete)
            && let Some(key) = canvas.scene.selected_node
            && let Some(id) = canvas.scene.nodes.get(key).map(|n| n.id.clone())
        {
            canvas.scene.remove_node(&id);
        }

        // 4. Frame
        let report = canvas.tick(&mut surface);
        macroquad::miniquad::window::set_mouse_cursor(cursor_icon(report.cursor));
        for event in &report.events {
            match event {
                CanvasEvent::ViewChanged => {}
                other => tracing::debug!(?other, "Canvas event"),
            }
        }

        // 5. Render
        mq::clear_background(mq::BLACK);
        for cmd in &surface.commands {
            replay(cmd);
        }

        mq::next_frame().await
    }
}

fn cursor_icon(hint: CursorHint) -> CursorIcon {
    match hint {
        CursorHint::Default => CursorIcon::Default,
        CursorHint::Pointer => CursorIcon::Pointer,
        CursorHint::Grab => CursorIcon::Move,
        CursorHint::Crosshair => CursorIcon::Crosshair,
    }
}

fn demo_nodes() -> Vec<Node> {
    let highlighted = StyleSet::new(NodeStyle::default())
        .with_hover(NodeStyle {
            stroke_color: Vec4::new(1.0, 0.8, 0.2, 1.0),
            stroke_width: 2.0,
            ..NodeStyle::default()
        })
        .with_select(NodeStyle {
            fill_color: Vec4::new(0.2, 0.3, 0.6, 1.0),
            stroke_color: Vec4::new(0.6, 0.8, 1.0, 1.0),
            stroke_width: 3.0,
        });

    vec![
        Node::circle(1, Vec2::new(200.0, 200.0), 30.0)
            .with_style(highlighted.clone())
            .with_label(Label::new("Start")),
        Node::rect("decide", Vec2::new(380.0, 170.0), Vec2::new(120.0, 60.0))
            .with_style(highlighted.clone())
            .with_label(Label::new("A long decision label")),
        Node::circle(3, Vec2::new(650.0, 120.0), 25.0)
            .with_style(highlighted.clone())
            .with_label(Label::new("Yes")),
        Node::circle(4, Vec2::new(650.0, 320.0), 25.0)
            .with_style(highlighted)
            .with_label(Label::new("No")),
    ]
}

fn demo_edges() -> Vec<Edge> {
    vec![
        Edge::new("start", 1, "decide"),
        Edge::new("yes", "decide", 3).with_label(Label::new("yes")),
        Edge::new("no", "decide", 4).with_label(Label::new("no")),
    ]
}

fn color(c: Vec4, alpha: f32) -> mq::Color {
    mq::Color::new(c.x, c.y, c.z, c.w * alpha)
}

fn point(p: Vec2) -> mq::Vec2 {
    mq::vec2(p.x, p.y)
}

/// Draws one recorded command. Coordinates are already in screen pixels.
fn replay(cmd: &DrawCommand) {
    match cmd {
        DrawCommand::Resize { .. } | DrawCommand::Clear => {}
        DrawCommand::Fill { path, color: c, alpha } => {
            let c = color(*c, *alpha);
            for sub in path {
                match sub {
                    SubPath::Circle { center, radius } => {
                        mq::draw_circle(center.x, center.y, *radius, c)
                    }
                    // Triangle fan; every polygon the canvas fills is convex.
                    SubPath::Polyline { points, .. } => {
                        if let Some((&first, rest)) = points.split_first() {
                            for pair in rest.windows(2) {
                                mq::draw_triangle(point(first), point(pair[0]), point(pair[1]), c);
                            }
                        }
                    }
                }
            }
        }
        DrawCommand::Stroke {
            path,
            color: c,
            width,
            alpha,
        } => {
            let c = color(*c, *alpha);
            for sub in path {
                match sub {
                    SubPath::Circle { center, radius } => {
                        mq::draw_circle_lines(center.x, center.y, *radius, *width, c)
                    }
                    SubPath::Polyline { points, closed } => {
                        for pair in points.windows(2) {
                            mq::draw_line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, *width, c);
                        }
                        if *closed
                            && let (Some(first), Some(last)) = (points.first(), points.last())
                        {
                            mq::draw_line(last.x, last.y, first.x, first.y, *width, c);
                        }
                    }
                }
            }
        }
        DrawCommand::Text {
            text,
            pos,
            font,
            color: c,
            align,
            ..
        } => {
            let size = font_px(font);
            let dims = mq::measure_text(text, None, size, 1.0);
            let x = match align {
                TextAlign::Left => pos.x,
                TextAlign::Center => pos.x - dims.width * 0.5,
                TextAlign::Right => pos.x - dims.width,
            };
            // Canvas labels are vertically centered on their anchor.
            let y = pos.y + dims.offset_y * 0.5;
            mq::draw_text(text, x, y, size as f32, color(*c, 1.0));
        }
    }
}

fn font_px(font: &str) -> u16 {
    font.split_whitespace()
        .find_map(|token| token.strip_suffix("px")?.parse::<f32>().ok())
        .map_or(12, |px| px.round() as u16)
}

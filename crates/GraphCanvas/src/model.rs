//! # Core Data Models
//!
//! This module defines the scene: nodes, edges, their styles, and the store
//! that owns them.
//! It uses `SlotMap` for stable entity storage without pointers. Hover and
//! selection are kept as arena keys, so removing an element can never leave a
//! dangling reference behind.

use std::collections::{HashMap, HashSet};
use std::fmt;

use bitflags::bitflags;
use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::error::{CanvasError, Result};
use crate::math::Rect;
use crate::surface::{TextAlign, TextBaseline};

new_key_type! {
    /// Arena key of a Node.
    pub struct NodeKey;
    /// Arena key of an Edge.
    pub struct EdgeKey;
}

/// Caller-supplied identity of a node or edge. Unique within its arena.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
    Int(i64),
    Str(String),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Int(n) => write!(f, "{n}"),
            ElementId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ElementId {
    fn from(n: i64) -> Self {
        ElementId::Int(n)
    }
}

impl From<i32> for ElementId {
    fn from(n: i32) -> Self {
        ElementId::Int(n.into())
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        ElementId::Str(s.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        ElementId::Str(s)
    }
}

/// Which element a notification is about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementRef {
    Node(ElementId),
    Edge(ElementId),
}

bitflags! {
    /// Interaction state of an element during the current frame.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ElementState: u8 {
        /// The pointer is over the element.
        const HOVERED = 1 << 0;
        /// The element is the current selection.
        const SELECTED = 1 << 1;
    }
}

/// Geometry of a node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    /// A circle centered on the node position.
    Circle { radius: f32 },
    /// An axis-aligned rectangle whose top-left corner is the node position.
    Rect { width: f32, height: f32 },
}

impl Shape {
    /// Width and height of the shape's own bounds.
    pub fn extent(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius * 2.0),
            Shape::Rect { width, height } => Vec2::new(width, height),
        }
    }
}

/// Fill and stroke of a node in one interaction state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub fill_color: Vec4,
    pub stroke_color: Vec4,
    /// Stroke width in world units.
    pub stroke_width: f32,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            fill_color: Vec4::new(0.15, 0.15, 0.15, 1.0),
            stroke_color: Vec4::new(0.5, 0.5, 0.5, 1.0),
            stroke_width: 1.0,
        }
    }
}

/// Stroke of an edge in one interaction state. The arrow head is filled with
/// the stroke color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub stroke_color: Vec4,
    /// Stroke width in world units.
    pub stroke_width: f32,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke_color: Vec4::new(0.8, 0.8, 0.8, 1.0),
            stroke_width: 2.0,
        }
    }
}

/// A default style with optional hover and selection variants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSet<S> {
    pub default: S,
    #[serde(default)]
    pub on_hover: Option<S>,
    #[serde(default)]
    pub on_select: Option<S>,
}

impl<S> StyleSet<S> {
    pub fn new(default: S) -> Self {
        Self {
            default,
            on_hover: None,
            on_select: None,
        }
    }

    pub fn with_hover(mut self, style: S) -> Self {
        self.on_hover = Some(style);
        self
    }

    pub fn with_select(mut self, style: S) -> Self {
        self.on_select = Some(style);
        self
    }

    /// The style to paint with. Selection wins over hover, hover over default.
    pub fn resolve(&self, state: ElementState) -> &S {
        let selected = state
            .contains(ElementState::SELECTED)
            .then_some(self.on_select.as_ref())
            .flatten();
        let hovered = state
            .contains(ElementState::HOVERED)
            .then_some(self.on_hover.as_ref())
            .flatten();
        selected.or(hovered).unwrap_or(&self.default)
    }
}

/// Text drawn on top of a node or next to an edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    #[serde(default = "Label::default_font")]
    pub font: String,
    #[serde(default = "Label::default_color")]
    pub color: Vec4,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub baseline: TextBaseline,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: Self::default_font(),
            color: Self::default_color(),
            align: TextAlign::default(),
            baseline: TextBaseline::default(),
        }
    }

    fn default_font() -> String {
        "12px sans-serif".to_string()
    }

    fn default_color() -> Vec4 {
        Vec4::ONE
    }
}

/// Arrow sizing of an edge, in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeShape {
    /// Distance from the arrow tip back to its base.
    pub arrow_length: f32,
    /// Width of the arrow base.
    pub arrow_width: f32,
}

impl Default for EdgeShape {
    fn default() -> Self {
        Self {
            arrow_length: 10.0,
            arrow_width: 8.0,
        }
    }
}

/// A Node in the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: ElementId,
    /// World-space position: the center of a circle, the top-left of a rect.
    pub position: Vec2,
    pub shape: Shape,
    /// Overrides the canvas-wide node style.
    #[serde(default)]
    pub style: Option<StyleSet<NodeStyle>>,
    #[serde(default)]
    pub label: Option<Label>,
}

impl Node {
    pub fn circle(id: impl Into<ElementId>, position: Vec2, radius: f32) -> Self {
        Self {
            id: id.into(),
            position,
            shape: Shape::Circle { radius },
            style: None,
            label: None,
        }
    }

    pub fn rect(id: impl Into<ElementId>, position: Vec2, size: Vec2) -> Self {
        Self {
            id: id.into(),
            position,
            shape: Shape::Rect {
                width: size.x,
                height: size.y,
            },
            style: None,
            label: None,
        }
    }

    pub fn with_style(mut self, style: StyleSet<NodeStyle>) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    /// World-space center of the node's shape.
    pub fn center(&self) -> Vec2 {
        match self.shape {
            Shape::Circle { .. } => self.position,
            Shape::Rect { width, height } => self.position + Vec2::new(width, height) * 0.5,
        }
    }

    /// World-space axis-aligned bounds of the node's shape.
    pub fn bounds(&self) -> Rect {
        match self.shape {
            Shape::Circle { radius } => Rect::around(self.position, radius),
            Shape::Rect { width, height } => Rect::new(self.position, Vec2::new(width, height)),
        }
    }

    /// Moves the node so that its center lands on `center`.
    pub fn set_center(&mut self, center: Vec2) {
        self.position = match self.shape {
            Shape::Circle { .. } => center,
            Shape::Rect { width, height } => center - Vec2::new(width, height) * 0.5,
        };
    }
}

/// A directed Edge between two nodes, drawn as a line with an arrow head at
/// the `to` end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: ElementId,
    pub from: ElementId,
    pub to: ElementId,
    /// Overrides the canvas-wide arrow sizing.
    #[serde(default)]
    pub shape: Option<EdgeShape>,
    /// Overrides the canvas-wide edge style.
    #[serde(default)]
    pub style: Option<StyleSet<EdgeStyle>>,
    #[serde(default)]
    pub label: Option<Label>,
}

impl Edge {
    pub fn new(
        id: impl Into<ElementId>,
        from: impl Into<ElementId>,
        to: impl Into<ElementId>,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            shape: None,
            style: None,
            label: None,
        }
    }

    pub fn with_shape(mut self, shape: EdgeShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_style(mut self, style: StyleSet<EdgeStyle>) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }
}

/// The scene store.
///
/// Owns every node and edge in flat arenas and remembers insertion order,
/// which is also draw order: when shapes overlap, the one inserted last is
/// drawn on top and wins hover.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Arena for Nodes.
    pub nodes: SlotMap<NodeKey, Node>,
    /// Arena for Edges.
    pub edges: SlotMap<EdgeKey, Edge>,
    node_order: Vec<NodeKey>,
    edge_order: Vec<EdgeKey>,
    node_index: HashMap<ElementId, NodeKey>,
    edge_index: HashMap<ElementId, EdgeKey>,

    /// Node under the pointer, re-derived every frame.
    pub hovered_node: Option<NodeKey>,
    /// Edge under the pointer, re-derived every frame.
    pub hovered_edge: Option<EdgeKey>,
    pub selected_node: Option<NodeKey>,
    pub selected_edge: Option<EdgeKey>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every node. Edges are dropped too, since they may point at
    /// nodes that no longer exist.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) -> Result<()> {
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(&node.id) {
                return Err(CanvasError::DuplicateId {
                    kind: "node",
                    id: node.id.clone(),
                });
            }
        }

        self.clear();
        for node in nodes {
            self.push_node(node);
        }
        Ok(())
    }

    /// Replaces every edge. Nothing changes if any edge is invalid.
    pub fn set_edges(&mut self, edges: Vec<Edge>) -> Result<()> {
        let mut seen = HashSet::with_capacity(edges.len());
        for edge in &edges {
            self.check_endpoints(edge)?;
            if !seen.insert(&edge.id) {
                return Err(CanvasError::DuplicateId {
                    kind: "edge",
                    id: edge.id.clone(),
                });
            }
        }

        self.edges.clear();
        self.edge_order.clear();
        self.edge_index.clear();
        self.hovered_edge = None;
        self.selected_edge = None;
        for edge in edges {
            self.push_edge(edge);
        }
        Ok(())
    }

    /// Appends a node on top of the draw order.
    pub fn insert_node(&mut self, node: Node) -> Result<NodeKey> {
        if self.node_index.contains_key(&node.id) {
            return Err(CanvasError::DuplicateId {
                kind: "node",
                id: node.id,
            });
        }
        Ok(self.push_node(node))
    }

    /// Appends an edge on top of the edge draw order.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<EdgeKey> {
        self.check_endpoints(&edge)?;
        if self.edge_index.contains_key(&edge.id) {
            return Err(CanvasError::DuplicateId {
                kind: "edge",
                id: edge.id,
            });
        }
        Ok(self.push_edge(edge))
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &ElementId) -> Option<Node> {
        let key = self.node_index.remove(id)?;
        let node = self.nodes.remove(key)?;
        self.node_order.retain(|&k| k != key);
        if self.hovered_node == Some(key) {
            self.hovered_node = None;
        }
        if self.selected_node == Some(key) {
            self.selected_node = None;
        }

        let incident: Vec<ElementId> = self
            .edges
            .values()
            .filter(|e| e.from == node.id || e.to == node.id)
            .map(|e| e.id.clone())
            .collect();
        for edge_id in &incident {
            self.remove_edge(edge_id);
        }

        Some(node)
    }

    pub fn remove_edge(&mut self, id: &ElementId) -> Option<Edge> {
        let key = self.edge_index.remove(id)?;
        let edge = self.edges.remove(key)?;
        self.edge_order.retain(|&k| k != key);
        if self.hovered_edge == Some(key) {
            self.hovered_edge = None;
        }
        if self.selected_edge == Some(key) {
            self.selected_edge = None;
        }
        Some(edge)
    }

    /// Removes everything, including hover and selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn node_key(&self, id: &ElementId) -> Option<NodeKey> {
        self.node_index.get(id).copied()
    }

    pub fn edge_key(&self, id: &ElementId) -> Option<EdgeKey> {
        self.edge_index.get(id).copied()
    }

    pub fn node(&self, id: &ElementId) -> Option<&Node> {
        self.node_key(id).and_then(|k| self.nodes.get(k))
    }

    pub fn node_mut(&mut self, id: &ElementId) -> Option<&mut Node> {
        let key = self.node_key(id)?;
        self.nodes.get_mut(key)
    }

    pub fn edge(&self, id: &ElementId) -> Option<&Edge> {
        self.edge_key(id).and_then(|k| self.edges.get(k))
    }

    /// Node keys in draw order (bottom to top).
    pub fn node_order(&self) -> &[NodeKey] {
        &self.node_order
    }

    /// Edge keys in draw order (bottom to top).
    pub fn edge_order(&self) -> &[EdgeKey] {
        &self.edge_order
    }

    /// The two nodes an edge connects.
    pub fn endpoints(&self, edge: &Edge) -> Option<(&Node, &Node)> {
        Some((self.node(&edge.from)?, self.node(&edge.to)?))
    }

    /// Forgets the per-frame hover fields.
    pub fn clear_hover(&mut self) {
        self.hovered_node = None;
        self.hovered_edge = None;
    }

    /// Interaction state of a node this frame.
    pub fn node_state(&self, key: NodeKey) -> ElementState {
        let mut state = ElementState::empty();
        state.set(ElementState::HOVERED, self.hovered_node == Some(key));
        state.set(ElementState::SELECTED, self.selected_node == Some(key));
        state
    }

    /// Interaction state of an edge this frame.
    pub fn edge_state(&self, key: EdgeKey) -> ElementState {
        let mut state = ElementState::empty();
        state.set(ElementState::HOVERED, self.hovered_edge == Some(key));
        state.set(ElementState::SELECTED, self.selected_edge == Some(key));
        state
    }

    /// The hovered element; a hovered node hides a hovered edge beneath it.
    pub fn hovered(&self) -> Option<ElementRef> {
        self.node_ref(self.hovered_node)
            .or_else(|| self.edge_ref(self.hovered_edge))
    }

    /// The selected element. Node and edge selection never coexist.
    pub fn selected(&self) -> Option<ElementRef> {
        self.node_ref(self.selected_node)
            .or_else(|| self.edge_ref(self.selected_edge))
    }

    fn node_ref(&self, key: Option<NodeKey>) -> Option<ElementRef> {
        let node = self.nodes.get(key?)?;
        Some(ElementRef::Node(node.id.clone()))
    }

    fn edge_ref(&self, key: Option<EdgeKey>) -> Option<ElementRef> {
        let edge = self.edges.get(key?)?;
        Some(ElementRef::Edge(edge.id.clone()))
    }

    fn check_endpoints(&self, edge: &Edge) -> Result<()> {
        for end in [&edge.from, &edge.to] {
            if !self.node_index.contains_key(end) {
                return Err(CanvasError::UnknownNode {
                    edge: edge.id.clone(),
                    node: end.clone(),
                });
            }
        }
        Ok(())
    }

    fn push_node(&mut self, node: Node) -> NodeKey {
        let id = node.id.clone();
        let key = self.nodes.insert(node);
        self.node_order.push(key);
        self.node_index.insert(id, key);
        key
    }

    fn push_edge(&mut self, edge: Edge) -> EdgeKey {
        let id = edge.id.clone();
        let key = self.edges.insert(edge);
        self.edge_order.push(key);
        self.edge_index.insert(id, key);
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_triangle() -> Scene {
        let mut scene = Scene::new();
        scene
            .set_nodes(vec![
                Node::circle("a", Vec2::ZERO, 5.0),
                Node::circle("b", Vec2::new(50.0, 0.0), 5.0),
                Node::rect(3, Vec2::new(0.0, 50.0), Vec2::new(20.0, 10.0)),
            ])
            .unwrap();
        scene
            .set_edges(vec![
                Edge::new("ab", "a", "b"),
                Edge::new("b3", "b", 3),
                Edge::new("3a", 3, "a"),
            ])
            .unwrap();
        scene
    }

    #[test]
    fn duplicate_node_ids_are_rejected() {
        let mut scene = Scene::new();
        let err = scene
            .set_nodes(vec![
                Node::circle("a", Vec2::ZERO, 1.0),
                Node::circle("a", Vec2::ONE, 1.0),
            ])
            .unwrap_err();
        assert!(matches!(err, CanvasError::DuplicateId { kind: "node", .. }));
        assert!(scene.nodes.is_empty());
    }

    #[test]
    fn dangling_edges_leave_the_scene_untouched() {
        let mut scene = scene_with_triangle();
        let err = scene
            .set_edges(vec![Edge::new("x", "a", "missing")])
            .unwrap_err();
        assert!(matches!(err, CanvasError::UnknownNode { .. }));
        assert_eq!(scene.edges.len(), 3);
    }

    #[test]
    fn removing_a_node_drops_incident_edges_and_selection() {
        let mut scene = scene_with_triangle();
        let b = scene.node_key(&"b".into()).unwrap();
        scene.selected_node = Some(b);
        scene.hovered_node = Some(b);

        scene.remove_node(&"b".into()).unwrap();

        assert_eq!(scene.selected_node, None);
        assert_eq!(scene.hovered_node, None);
        assert_eq!(scene.edges.len(), 1);
        assert!(scene.edge(&"3a".into()).is_some());
        assert_eq!(scene.node_order().len(), 2);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let scene = scene_with_triangle();
        let ids: Vec<_> = scene
            .node_order()
            .iter()
            .map(|&k| scene.nodes[k].id.to_string())
            .collect();
        assert_eq!(ids, ["a", "b", "3"]);
    }

    #[test]
    fn style_resolution_prefers_selection() {
        let set = StyleSet::new(1).with_hover(2).with_select(3);
        assert_eq!(*set.resolve(ElementState::empty()), 1);
        assert_eq!(*set.resolve(ElementState::HOVERED), 2);
        assert_eq!(*set.resolve(ElementState::HOVERED | ElementState::SELECTED), 3);

        let hover_only = StyleSet::new(1).with_hover(2);
        assert_eq!(*hover_only.resolve(ElementState::SELECTED), 1);
    }

    #[test]
    fn rect_center_accounts_for_anchor() {
        let mut node = Node::rect("r", Vec2::new(10.0, 20.0), Vec2::new(40.0, 20.0));
        assert_eq!(node.center(), Vec2::new(30.0, 30.0));
        node.set_center(Vec2::ZERO);
        assert_eq!(node.position, Vec2::new(-20.0, -10.0));
    }
}

use crate::anatomy::bounds::Bounds3;
use bevy::math::{Affine3A, Vec3};
use bevy::transform::components::Transform;

#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub name: Option<String>,
    pub transform: Transform,
    /// Vertex positions of every mesh primitive attached to this node.
    pub positions: Vec<Vec3>,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawAsset {
    pub label: String,
    pub nodes: Vec<RawNode>,
    pub roots: Vec<usize>,
}

impl RawAsset {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Single root node holding `positions` with an identity transform.
    pub fn from_positions(label: impl Into<String>, positions: Vec<Vec3>) -> Self {
        let mut asset = Self::new(label);
        asset.add_node(None, Transform::IDENTITY, positions);
        asset
    }

    /// Appends a node and links it under `parent`, or as a root when `None`.
    pub fn add_node(
        &mut self,
        parent: Option<usize>,
        transform: Transform,
        positions: Vec<Vec3>,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(RawNode {
            name: None,
            transform,
            positions,
            children: Vec::new(),
        });
        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(index),
            None => self.roots.push(index),
        }
        index
    }

    /// Nodes that carry geometry.
    pub fn surface_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.positions.is_empty()).count()
    }

    /// Bounding box of all geometry in the asset's own space, with every
    /// node transform along the path applied. `None` when nothing has vertices.
    pub fn local_bounds(&self) -> Option<Bounds3> {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, Affine3A)> = self
            .roots
            .iter()
            .map(|&root| (root, Affine3A::IDENTITY))
            .collect();
        let mut bounds: Option<Bounds3> = None;

        while let Some((index, parent_affine)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            // glTF hierarchies are trees; a revisit means bad input, skip it.
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }

            let affine = parent_affine * node.transform.compute_affine();
            let node_bounds =
                Bounds3::from_points(node.positions.iter().map(|p| affine.transform_point3(*p)));
            bounds = match (bounds, node_bounds) {
                (Some(acc), Some(b)) => Some(acc.union(b)),
                (acc, b) => acc.or(b),
            };

            stack.extend(node.children.iter().map(|&child| (child, affine)));
        }

        bounds
    }
}

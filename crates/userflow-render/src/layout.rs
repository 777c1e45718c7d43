//! Left-aligned Sankey layout.
//!
//! A port of the d3-sankey algorithm restricted to what the user-flow diagram
//! uses: left node alignment over a fixed extent starting at `(1, 1)`, six
//! relaxation sweeps, and per-link breadth assignment. Node columns map 1:1 to
//! interaction steps, so the caller sizes the extent from the column count:
//! [`layout_user_flow`] runs a probe pass over a nominal extent first and then
//! lays out over `interactions * column_span`.

use crate::model::{LayoutLink, LayoutNode, SankeyLayout};
use crate::presentation::column_order;
use crate::{Error, Result};
use std::cmp::Ordering;
use userflow_core::{FlowConfig, UserFlowGraph};

const RELAX_ITERATIONS: usize = 6;
const EXTENT_ORIGIN: f64 = 1.0;

/// Lays out `graph` sized from its own interaction count, the way the
/// production diagram did: a probe layout counts the interaction columns
/// (dropout-only trailing columns excluded), then the real pass runs over
/// `interactions * column_span` by `config.height`.
pub fn layout_user_flow(graph: &UserFlowGraph, config: &FlowConfig) -> Result<SankeyLayout> {
    let probe = solve(graph, config, 100.0, 100.0)?;
    let interactions = column_order(&probe).len().max(1);
    let width = interactions as f64 * config.column_span;
    tracing::debug!(interactions, width, "sizing user-flow layout");
    solve(graph, config, width, config.height)
}

/// Lays out `graph` over a caller-chosen extent.
pub fn solve(
    graph: &UserFlowGraph,
    config: &FlowConfig,
    width: f64,
    height: f64,
) -> Result<SankeyLayout> {
    let mut solver = Solver::build(graph, config, width, height)?;
    solver.run()?;
    Ok(solver.into_layout(graph))
}

struct LNode {
    source_links: Vec<usize>,
    target_links: Vec<usize>,
    value: f64,
    layer: usize,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

struct LLink {
    index: usize,
    source: usize,
    target: usize,
    value: f64,
    width: f64,
    y0: f64,
    y1: f64,
}

struct Solver {
    nodes: Vec<LNode>,
    links: Vec<LLink>,
    columns: Vec<Vec<usize>>,
    node_width: f64,
    width: f64,
    height: f64,
    py: f64,
    node_padding: f64,
}

impl Solver {
    fn build(graph: &UserFlowGraph, config: &FlowConfig, width: f64, height: f64) -> Result<Self> {
        let n = graph.nodes.len();
        let mut nodes: Vec<LNode> = (0..n)
            .map(|_| LNode {
                source_links: Vec::new(),
                target_links: Vec::new(),
                value: 0.0,
                layer: 0,
                x0: 0.0,
                x1: 0.0,
                y0: 0.0,
                y1: 0.0,
            })
            .collect();

        let mut links = Vec::with_capacity(graph.links.len());
        for (i, l) in graph.links.iter().enumerate() {
            if l.source >= n || l.target >= n {
                return Err(Error::InvalidModel {
                    message: format!("link {i} references a node outside the graph"),
                });
            }
            links.push(LLink {
                index: i,
                source: l.source,
                target: l.target,
                value: l.value,
                width: 0.0,
                y0: 0.0,
                y1: 0.0,
            });
            nodes[l.source].source_links.push(i);
            nodes[l.target].target_links.push(i);
        }

        for node in &mut nodes {
            let out_sum: f64 = node.source_links.iter().map(|&li| links[li].value).sum();
            let in_sum: f64 = node.target_links.iter().map(|&li| links[li].value).sum();
            node.value = out_sum.max(in_sum);
        }

        Ok(Self {
            nodes,
            links,
            columns: Vec::new(),
            node_width: config.node_width,
            width,
            height,
            py: 0.0,
            node_padding: config.node_padding,
        })
    }

    fn run(&mut self) -> Result<()> {
        if self.nodes.is_empty() {
            return Ok(());
        }
        self.assign_layers()?;
        self.assign_breadths();
        self.relax();
        self.assign_link_positions();
        Ok(())
    }

    /// BFS from the sources assigns each node its depth; left alignment means
    /// the layer is the depth directly. Revisiting more often than there are
    /// nodes means the graph loops.
    fn assign_layers(&mut self) -> Result<()> {
        let n = self.nodes.len();
        let mut current: Vec<usize> = (0..n).collect();
        let mut next: Vec<usize> = Vec::new();
        let mut next_seen = vec![false; n];
        let mut depth = 0usize;
        while !current.is_empty() {
            for &ni in &current {
                self.nodes[ni].layer = depth;
                for &li in &self.nodes[ni].source_links {
                    let t = self.links[li].target;
                    if !next_seen[t] {
                        next_seen[t] = true;
                        next.push(t);
                    }
                }
            }
            depth += 1;
            if depth > n {
                return Err(Error::InvalidModel {
                    message: "circular link".to_string(),
                });
            }
            current = std::mem::take(&mut next);
            next_seen.fill(false);
        }

        let column_count = self.nodes.iter().map(|nd| nd.layer).max().unwrap_or(0) + 1;
        let kx = if column_count <= 1 {
            0.0
        } else {
            (self.width - EXTENT_ORIGIN - self.node_width) / (column_count as f64 - 1.0)
        };

        self.columns = vec![Vec::new(); column_count];
        for i in 0..self.nodes.len() {
            let layer = self.nodes[i].layer;
            self.nodes[i].x0 = EXTENT_ORIGIN + layer as f64 * kx;
            self.nodes[i].x1 = self.nodes[i].x0 + self.node_width;
            self.columns[layer].push(i);
        }
        Ok(())
    }

    /// Seeds vertical positions column by column, then spreads leftover space
    /// evenly. Link widths are value * ky, the shared vertical scale.
    fn assign_breadths(&mut self) {
        let dy = self.node_padding;
        let max_len = self.columns.iter().map(|c| c.len()).max().unwrap_or(0);
        let extent_h = self.height - EXTENT_ORIGIN;
        self.py = if max_len <= 1 {
            dy
        } else {
            dy.min(extent_h / (max_len as f64 - 1.0))
        };

        let mut ky = f64::INFINITY;
        for col in &self.columns {
            if col.is_empty() {
                continue;
            }
            let sum_values: f64 = col.iter().map(|&ni| self.nodes[ni].value).sum();
            if sum_values <= 0.0 {
                continue;
            }
            let denom = extent_h - (col.len() as f64 - 1.0) * self.py;
            ky = ky.min(denom / sum_values);
        }
        if !ky.is_finite() {
            ky = 0.0;
        }

        for ci in 0..self.columns.len() {
            let col = self.columns[ci].clone();
            let mut y = EXTENT_ORIGIN;
            for &ni in &col {
                self.nodes[ni].y0 = y;
                self.nodes[ni].y1 = y + self.nodes[ni].value * ky;
                y = self.nodes[ni].y1 + self.py;
                for &li in &self.nodes[ni].source_links.clone() {
                    self.links[li].width = self.links[li].value * ky;
                }
            }
            if !col.is_empty() {
                let offset = (self.height - y + self.py) / (col.len() as f64 + 1.0);
                for (i, &ni) in col.iter().enumerate() {
                    let adj = offset * (i as f64 + 1.0);
                    self.nodes[ni].y0 += adj;
                    self.nodes[ni].y1 += adj;
                }
                self.reorder_column_links(&col);
            }
        }
    }

    fn sort_source_links(&mut self, ni: usize) {
        let node_y0: Vec<f64> = self.nodes.iter().map(|nd| nd.y0).collect();
        let links = &self.links;
        self.nodes[ni].source_links.sort_by(|&a, &b| {
            f64_cmp(node_y0[links[a].target], node_y0[links[b].target])
                .then_with(|| links[a].index.cmp(&links[b].index))
        });
    }

    fn sort_target_links(&mut self, ni: usize) {
        let node_y0: Vec<f64> = self.nodes.iter().map(|nd| nd.y0).collect();
        let links = &self.links;
        self.nodes[ni].target_links.sort_by(|&a, &b| {
            f64_cmp(node_y0[links[a].source], node_y0[links[b].source])
                .then_with(|| links[a].index.cmp(&links[b].index))
        });
    }

    fn reorder_column_links(&mut self, column: &[usize]) {
        for &ni in column {
            self.sort_source_links(ni);
            self.sort_target_links(ni);
        }
    }

    fn reorder_node_links(&mut self, ni: usize) {
        for li in self.nodes[ni].target_links.clone() {
            let source = self.links[li].source;
            self.sort_source_links(source);
        }
        for li in self.nodes[ni].source_links.clone() {
            let target = self.links[li].target;
            self.sort_target_links(target);
        }
    }

    /// Ideal top for `target` seen from the link stack of `source`.
    fn target_top(&self, source: usize, target: usize) -> f64 {
        let fan_out = self.nodes[source].source_links.len() as f64;
        let mut y = self.nodes[source].y0 - (fan_out - 1.0) * self.py / 2.0;
        for &li in &self.nodes[source].source_links {
            if self.links[li].target == target {
                break;
            }
            y += self.links[li].width + self.py;
        }
        for &li in &self.nodes[target].target_links {
            if self.links[li].source == source {
                break;
            }
            y -= self.links[li].width;
        }
        y
    }

    fn source_top(&self, source: usize, target: usize) -> f64 {
        let fan_in = self.nodes[target].target_links.len() as f64;
        let mut y = self.nodes[target].y0 - (fan_in - 1.0) * self.py / 2.0;
        for &li in &self.nodes[target].target_links {
            if self.links[li].source == source {
                break;
            }
            y += self.links[li].width + self.py;
        }
        for &li in &self.nodes[source].source_links {
            if self.links[li].target == target {
                break;
            }
            y -= self.links[li].width;
        }
        y
    }

    fn relax(&mut self) {
        for i in 0..RELAX_ITERATIONS {
            let alpha = 0.99_f64.powi(i as i32);
            let beta = (1.0 - alpha).max((i as f64 + 1.0) / RELAX_ITERATIONS as f64);
            self.relax_right_to_left(alpha, beta);
            self.relax_left_to_right(alpha, beta);
        }
    }

    fn relax_left_to_right(&mut self, alpha: f64, beta: f64) {
        for ci in 1..self.columns.len() {
            let column = self.columns[ci].clone();
            for &target in &column {
                let mut y = 0.0;
                let mut w = 0.0;
                for &li in &self.nodes[target].target_links.clone() {
                    let source = self.links[li].source;
                    let v = self.links[li].value
                        * (self.nodes[target].layer as f64 - self.nodes[source].layer as f64);
                    y += self.target_top(source, target) * v;
                    w += v;
                }
                if !(w > 0.0) {
                    continue;
                }
                let dy = (y / w - self.nodes[target].y0) * alpha;
                self.nodes[target].y0 += dy;
                self.nodes[target].y1 += dy;
                self.reorder_node_links(target);
            }
            self.finish_column(ci, beta);
        }
    }

    fn relax_right_to_left(&mut self, alpha: f64, beta: f64) {
        if self.columns.len() < 2 {
            return;
        }
        for ci in (0..=(self.columns.len() - 2)).rev() {
            let column = self.columns[ci].clone();
            for &source in &column {
                let mut y = 0.0;
                let mut w = 0.0;
                for &li in &self.nodes[source].source_links.clone() {
                    let target = self.links[li].target;
                    let v = self.links[li].value
                        * (self.nodes[target].layer as f64 - self.nodes[source].layer as f64);
                    y += self.source_top(source, target) * v;
                    w += v;
                }
                if !(w > 0.0) {
                    continue;
                }
                let dy = (y / w - self.nodes[source].y0) * alpha;
                self.nodes[source].y0 += dy;
                self.nodes[source].y1 += dy;
                self.reorder_node_links(source);
            }
            self.finish_column(ci, beta);
        }
    }

    fn finish_column(&mut self, ci: usize, beta: f64) {
        let nodes = &self.nodes;
        self.columns[ci]
            .sort_by(|&a, &b| f64_cmp(nodes[a].y0, nodes[b].y0).then_with(|| a.cmp(&b)));
        let column = self.columns[ci].clone();
        self.resolve_collisions(&column, beta);
    }

    fn resolve_collisions(&mut self, column: &[usize], alpha: f64) {
        if column.is_empty() {
            return;
        }
        let i = column.len() >> 1;
        let subject = column[i];
        let subject_y0 = self.nodes[subject].y0;
        let subject_y1 = self.nodes[subject].y1;
        self.push_up(column, subject_y0 - self.py, i as isize - 1, alpha);
        self.push_down(column, subject_y1 + self.py, i as isize + 1, alpha);
        self.push_up(column, self.height, column.len() as isize - 1, alpha);
        self.push_down(column, EXTENT_ORIGIN, 0, alpha);
    }

    fn push_down(&mut self, column: &[usize], mut y: f64, mut i: isize, alpha: f64) {
        while i < column.len() as isize {
            let ni = column[i as usize];
            let dy = (y - self.nodes[ni].y0) * alpha;
            if dy > 1e-6 {
                self.nodes[ni].y0 += dy;
                self.nodes[ni].y1 += dy;
            }
            y = self.nodes[ni].y1 + self.py;
            i += 1;
        }
    }

    fn push_up(&mut self, column: &[usize], mut y: f64, mut i: isize, alpha: f64) {
        while i >= 0 {
            let ni = column[i as usize];
            let dy = (self.nodes[ni].y1 - y) * alpha;
            if dy > 1e-6 {
                self.nodes[ni].y0 -= dy;
                self.nodes[ni].y1 -= dy;
            }
            y = self.nodes[ni].y0 - self.py;
            i -= 1;
        }
    }

    fn assign_link_positions(&mut self) {
        for ni in 0..self.nodes.len() {
            let mut y0 = self.nodes[ni].y0;
            let mut y1 = self.nodes[ni].y0;
            for &li in &self.nodes[ni].source_links.clone() {
                self.links[li].y0 = y0 + self.links[li].width / 2.0;
                y0 += self.links[li].width;
            }
            for &li in &self.nodes[ni].target_links.clone() {
                self.links[li].y1 = y1 + self.links[li].width / 2.0;
                y1 += self.links[li].width;
            }
        }
    }

    fn into_layout(self, graph: &UserFlowGraph) -> SankeyLayout {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, nd)| LayoutNode {
                name: graph.nodes[i].name.clone(),
                index: i,
                layer: nd.layer,
                value: nd.value,
                drop: graph.nodes[i].drop,
                source_links: nd.source_links.clone(),
                x0: nd.x0,
                x1: nd.x1,
                y0: nd.y0,
                y1: nd.y1,
            })
            .collect();
        let links = self
            .links
            .iter()
            .map(|l| LayoutLink {
                index: l.index,
                source: l.source,
                target: l.target,
                value: l.value,
                width: l.width,
                y0: l.y0,
                y1: l.y1,
            })
            .collect();
        SankeyLayout {
            width: self.width,
            height: self.height,
            node_width: self.node_width,
            node_padding: self.py,
            nodes,
            links,
        }
    }
}

fn f64_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

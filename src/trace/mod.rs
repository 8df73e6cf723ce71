//! Network trace puzzle: a grid of typed nodes with sparse random links.
//!
//! The player rebuilds a route from the entry node (left column) to the exit
//! node (right column), hopping only along links and only between nodes of the
//! same kind, except for the final hop onto the exit. Construction proves that
//! at least one such route over links exists before the puzzle is handed out.

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{BaseMap, DistanceAlg, a_star_search};
use log::{debug, info, warn};
use smallvec::SmallVec;

use crate::{
    config::{TraceConfig, TraceParams},
    error::TraceError,
    rng::RandomSequence,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub grid: Point,
    /// Board position relative to the board centre.
    pub x: f32,
    pub y: f32,
    pub kind: u8,
    pub links: SmallVec<[NodeId; 4]>,
}

impl GraphNode {
    pub fn is_linked(&self, other: NodeId) -> bool {
        self.links.contains(&other)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailReason {
    Timeout,
    Aborted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceStatus {
    Active,
    Completed,
    Failed(FailReason),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    Inactive,
    UnknownNode,
    AlreadyInPath,
    NotLinked,
    KindMismatch,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Accepted,
    Completed,
    Rejected(RejectReason),
}

#[derive(Clone, Debug)]
pub struct NetworkGraph {
    params: TraceParams,
    nodes: Vec<GraphNode>,
    entry: NodeId,
    exit: NodeId,
    target_path: Vec<NodeId>,
    current_path: Vec<NodeId>,
    status: TraceStatus,
    time_left_ms: u64,
    link_generations: u32,
    seed: u64,
}

impl NetworkGraph {
    /// Builds the puzzle. If no route exists after the configured number of
    /// link generations the target path is left empty; use
    /// [`NetworkGraph::try_new`] to get an error instead.
    pub fn new(config: &TraceConfig) -> Self {
        let params = config.params();
        let mut rng = match config.seed {
            Some(seed) => RandomSequence::new(seed),
            None => RandomSequence::from_entropy(),
        };
        let seed = rng.seed();
        let n = params.grid_size;
        let cell_w = config.board_width / (n as f32 + 1.0);
        let cell_h = config.board_height / (n as f32 + 1.0);
        let half = (n as f32 - 1.0) / 2.0;

        let mut nodes = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                let kind = rng.next_in_range(0, params.node_types as i32 - 1) as u8;
                nodes.push(GraphNode {
                    id: NodeId(y * n + x),
                    grid: Point::new(x as i32, y as i32),
                    x: (x as f32 - half) * cell_w,
                    y: (y as f32 - half) * cell_h,
                    kind,
                    links: SmallVec::new(),
                });
            }
        }

        let mut graph = Self {
            params,
            nodes,
            entry: NodeId(0),
            exit: NodeId(n.saturating_sub(1)),
            target_path: Vec::new(),
            current_path: Vec::new(),
            status: TraceStatus::Active,
            time_left_ms: params.time_limit_secs as u64 * 1000,
            link_generations: 0,
            seed,
        };

        graph.generate_links(&mut rng);
        let entry_row = rng.next_index(n);
        let exit_row = rng.next_index(n);
        graph.entry = NodeId(entry_row * n);
        graph.exit = NodeId(exit_row * n + n.saturating_sub(1));
        graph.current_path.push(graph.entry);

        graph.target_path = graph.find_path();
        while graph.target_path.is_empty() && graph.link_generations < config.link_attempts {
            debug!(
                "trace: no route after generation {}, relinking",
                graph.link_generations
            );
            graph.clear_links();
            graph.generate_links(&mut rng);
            graph.target_path = graph.find_path();
        }

        if graph.target_path.is_empty() {
            warn!(
                "trace: unsolvable after {} link generations (seed {seed})",
                graph.link_generations
            );
        } else {
            info!(
                "trace: {}x{} grid, route of {} nodes (seed {seed})",
                n,
                n,
                graph.target_path.len()
            );
        }
        graph
    }

    /// Rejects configurations that fail [`TraceConfig::validate`] as well as
    /// boards with no route.
    pub fn try_new(config: &TraceConfig) -> Result<Self, TraceError> {
        config
            .validate()
            .map_err(|err| TraceError::InvalidConfig(err.to_string()))?;
        let graph = Self::new(config);
        if graph.target_path.is_empty() {
            return Err(TraceError::Unsolvable {
                attempts: graph.link_generations,
            });
        }
        Ok(graph)
    }

    fn generate_links(&mut self, rng: &mut RandomSequence) {
        let n = self.params.grid_size;
        for y in 0..n {
            for x in 0..n {
                let id = NodeId(y * n + x);
                let mut candidates: SmallVec<[NodeId; 4]> = SmallVec::new();
                if y > 0 {
                    candidates.push(NodeId((y - 1) * n + x));
                }
                if y < n - 1 {
                    candidates.push(NodeId((y + 1) * n + x));
                }
                if x > 0 {
                    candidates.push(NodeId(y * n + x - 1));
                }
                if x < n - 1 {
                    candidates.push(NodeId(y * n + x + 1));
                }
                rng.shuffle(&mut candidates);

                let wanted = self.params.connections.min(candidates.len());
                for &neighbor in candidates.iter().take(wanted) {
                    if !self.nodes[id.0].is_linked(neighbor) {
                        self.nodes[id.0].links.push(neighbor);
                        self.nodes[neighbor.0].links.push(id);
                    }
                }
            }
        }
        self.link_generations += 1;
    }

    fn clear_links(&mut self) {
        for node in &mut self.nodes {
            node.links.clear();
        }
    }

    /// Depth-first search from entry to exit over links, visiting neighbours
    /// in link order. Returns the first route found, or an empty path.
    fn find_path(&self) -> Vec<NodeId> {
        if self.nodes.is_empty() {
            return Vec::new();
        }
        let mut visited = vec![false; self.nodes.len()];
        // Each frame is a node on the current route and the next link to try.
        let mut stack: Vec<(NodeId, usize)> = vec![(self.entry, 0)];
        visited[self.entry.0] = true;

        while let Some(frame) = stack.last_mut() {
            let current = frame.0;
            if current == self.exit {
                return stack.iter().map(|(id, _)| *id).collect();
            }
            let links = &self.nodes[current.0].links;
            let mut descended = None;
            while frame.1 < links.len() {
                let candidate = links[frame.1];
                frame.1 += 1;
                if !visited[candidate.0] {
                    descended = Some(candidate);
                    break;
                }
            }
            match descended {
                Some(next) => {
                    visited[next.0] = true;
                    stack.push((next, 0));
                }
                None => {
                    stack.pop();
                }
            }
        }
        Vec::new()
    }

    pub fn select_node(&mut self, id: NodeId) -> Selection {
        if self.status != TraceStatus::Active {
            return Selection::Rejected(RejectReason::Inactive);
        }
        if id.0 >= self.nodes.len() {
            return Selection::Rejected(RejectReason::UnknownNode);
        }
        if self.current_path.contains(&id) {
            return Selection::Rejected(RejectReason::AlreadyInPath);
        }
        let Some(&last) = self.current_path.last() else {
            return Selection::Rejected(RejectReason::Inactive);
        };
        if let Some(reason) = self.hop_rejection(last, id) {
            return Selection::Rejected(reason);
        }

        self.current_path.push(id);
        if id == self.exit {
            self.status = TraceStatus::Completed;
            info!("trace: route completed in {} hops", self.current_path.len() - 1);
            return Selection::Completed;
        }
        Selection::Accepted
    }

    fn hop_rejection(&self, from: NodeId, to: NodeId) -> Option<RejectReason> {
        if !self.nodes[from.0].is_linked(to) {
            return Some(RejectReason::NotLinked);
        }
        if self.nodes[to.0].kind != self.nodes[from.0].kind && to != self.exit {
            return Some(RejectReason::KindMismatch);
        }
        None
    }

    /// Shortest run of selections that would finish the puzzle from the
    /// current route, or `None` if the route has painted itself into a corner.
    ///
    /// The target path only proves a route over links exists; it may still
    /// cross kinds, so this is the one to use for hints and autoplay.
    pub fn solution(&self) -> Option<Vec<NodeId>> {
        if self.status != TraceStatus::Active {
            return None;
        }
        let last = *self.current_path.last()?;
        let path = a_star_search(last.0, self.exit.0, self);
        if !path.success {
            return None;
        }
        Some(
            path.steps
                .into_iter()
                .skip_while(|&idx| idx == last.0)
                .map(NodeId)
                .collect(),
        )
    }

    pub fn select_at(&mut self, grid: Point) -> Selection {
        match self.node_at(grid) {
            Some(id) => self.select_node(id),
            None => Selection::Rejected(RejectReason::UnknownNode),
        }
    }

    /// Counts the time limit down. Expiry fails an active puzzle; a finished
    /// one is left untouched.
    pub fn tick(&mut self, elapsed_ms: u64) -> TraceStatus {
        if self.status == TraceStatus::Active {
            self.time_left_ms = self.time_left_ms.saturating_sub(elapsed_ms);
            if self.time_left_ms == 0 {
                self.status = TraceStatus::Failed(FailReason::Timeout);
                info!("trace: timed out");
            }
        }
        self.status
    }

    pub fn abort(&mut self) {
        if self.status == TraceStatus::Active {
            self.status = TraceStatus::Failed(FailReason::Aborted);
        }
    }

    pub fn node_at(&self, grid: Point) -> Option<NodeId> {
        let n = self.params.grid_size as i32;
        if grid.x < 0 || grid.y < 0 || grid.x >= n || grid.y >= n {
            return None;
        }
        Some(NodeId((grid.y * n + grid.x) as usize))
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn params(&self) -> TraceParams {
        self.params
    }

    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub fn exit(&self) -> NodeId {
        self.exit
    }

    pub fn target_path(&self) -> &[NodeId] {
        &self.target_path
    }

    pub fn current_path(&self) -> &[NodeId] {
        &self.current_path
    }

    pub fn is_solvable(&self) -> bool {
        !self.target_path.is_empty()
    }

    pub fn status(&self) -> TraceStatus {
        self.status
    }

    pub fn time_left_ms(&self) -> u64 {
        self.time_left_ms
    }

    pub fn link_generations(&self) -> u32 {
        self.link_generations
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current route length against the precomputed one, in percent.
    pub fn progress(&self) -> f32 {
        if self.target_path.is_empty() {
            return 0.0;
        }
        self.current_path.len() as f32 / self.target_path.len() as f32 * 100.0
    }

    /// Each undirected link once, lower id first.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::new();
        for node in &self.nodes {
            for &other in &node.links {
                if node.id < other {
                    edges.push((node.id, other));
                }
            }
        }
        edges
    }
}

impl BaseMap for NetworkGraph {
    fn is_opaque(&self, _idx: usize) -> bool {
        false
    }

    /// Hops `select_node` would accept, never back onto the current route.
    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let Some(node) = self.nodes.get(idx) else {
            return exits;
        };
        for &link in &node.links {
            if self.current_path.contains(&link) || self.hop_rejection(node.id, link).is_some() {
                continue;
            }
            exits.push((link.0, 1.0));
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        match (self.nodes.get(idx1), self.nodes.get(idx2)) {
            (Some(a), Some(b)) => DistanceAlg::Manhattan.distance2d(a.grid, b.grid),
            _ => f32::MAX,
        }
    }
}

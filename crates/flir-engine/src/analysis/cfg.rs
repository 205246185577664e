//! Statement-level control-flow graphs
//!
//! One graph per function, method and constructor body. Each source
//! statement becomes one node; `if`, `switch` and `try` become decision
//! nodes whose branches converge on a synthesized join, and loops become a
//! loop node with a loop-back edge from the end of the body. Closures are
//! part of the enclosing expression and get no graph of their own.

use std::collections::VecDeque;

use serde::Serialize;

use crate::ir::{NodeId, Stmt, StmtKind};
use crate::source::SourceLocation;

/// Index of a node within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CfgNodeId(pub u32);

impl CfgNodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CfgNodeKind {
    Entry,
    Exit,
    /// Straight-line statement
    Statement,
    /// `if`, `switch` or `try` head
    Decision,
    /// Synthesized convergence point
    Join,
    /// Loop head
    Loop,
}

impl CfgNodeKind {
    /// Nodes that stand for a statement written in source.
    pub fn is_source(self) -> bool {
        matches!(
            self,
            CfgNodeKind::Statement | CfgNodeKind::Decision | CfgNodeKind::Loop
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Normal,
    Then,
    Else,
    LoopBack,
    LoopExit,
    Case,
    Exception,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CfgNode {
    pub id: CfgNodeId,
    pub kind: CfgNodeKind,
    /// Statement this node stands for; `None` for synthesized nodes.
    pub stmt: Option<NodeId>,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CfgEdge {
    pub from: CfgNodeId,
    pub to: CfgNodeId,
    pub kind: EdgeKind,
}

/// Control-flow graph of one body.
#[derive(Debug, Clone, Serialize)]
pub struct ControlFlowGraph {
    /// `main`, `Counter.build`, `Point.origin`
    pub owner: String,
    /// Declaration the body belongs to.
    pub owner_id: NodeId,
    pub nodes: Vec<CfgNode>,
    pub edges: Vec<CfgEdge>,
    pub entry: CfgNodeId,
    pub exit: CfgNodeId,
}

impl ControlFlowGraph {
    pub fn node(&self, id: CfgNodeId) -> &CfgNode {
        &self.nodes[id.index()]
    }

    pub fn successors(&self, id: CfgNodeId) -> impl Iterator<Item = (CfgNodeId, EdgeKind)> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.from == id)
            .map(|e| (e.to, e.kind))
    }

    pub fn predecessors(&self, id: CfgNodeId) -> impl Iterator<Item = CfgNodeId> + '_ {
        self.edges.iter().filter(move |e| e.to == id).map(|e| e.from)
    }

    /// Node for a source statement.
    pub fn node_for(&self, stmt: NodeId) -> Option<&CfgNode> {
        self.nodes.iter().find(|n| n.stmt == Some(stmt))
    }

    /// Breadth-first reachability from the entry node, indexed by node id.
    pub fn reachable(&self) -> Vec<bool> {
        let mut successors: Vec<Vec<CfgNodeId>> = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            successors[edge.from.index()].push(edge.to);
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        visited[self.entry.index()] = true;
        queue.push_back(self.entry);
        while let Some(id) = queue.pop_front() {
            for &next in &successors[id.index()] {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
        visited
    }

    /// Source statements not reachable from the entry node.
    pub fn unreachable_statements(&self) -> Vec<&CfgNode> {
        let visited = self.reachable();
        self.nodes
            .iter()
            .filter(|n| n.kind.is_source() && !visited[n.id.index()])
            .collect()
    }

    /// Number of source statement nodes.
    pub fn statement_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind.is_source()).count()
    }
}

/// Build the graph for a body. A missing body yields `entry -> exit`.
pub fn build_cfg(owner: impl Into<String>, owner_id: NodeId, body: &[Stmt]) -> ControlFlowGraph {
    let mut builder = CfgBuilder::new(owner.into(), owner_id);
    let entry = builder.graph.entry;
    let exit = builder.graph.exit;
    let frontier = builder.lower_block(body, vec![(entry, EdgeKind::Normal)]);
    builder.connect(&frontier, exit, None);

    let graph = builder.graph;
    tracing::trace!(
        owner = %graph.owner,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "built cfg"
    );
    graph
}

/// Dangling edges waiting for their target: the source node and the kind
/// the edge will have.
type Frontier = Vec<(CfgNodeId, EdgeKind)>;

/// Break / continue target
struct JumpContext {
    /// Loop head for `continue`; `None` for a switch or labeled statement.
    continue_to: Option<CfgNodeId>,
    break_to: CfgNodeId,
    labels: Vec<String>,
    /// Loops and switches; a plain labeled statement only takes `break label`.
    unlabeled_target: bool,
}

impl JumpContext {
    fn is_named(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

struct CfgBuilder {
    graph: ControlFlowGraph,
    jumps: Vec<JumpContext>,
}

impl CfgBuilder {
    fn new(owner: String, owner_id: NodeId) -> Self {
        let mut graph = ControlFlowGraph {
            owner,
            owner_id,
            nodes: Vec::new(),
            edges: Vec::new(),
            entry: CfgNodeId(0),
            exit: CfgNodeId(1),
        };
        for kind in [CfgNodeKind::Entry, CfgNodeKind::Exit] {
            let id = CfgNodeId(graph.nodes.len() as u32);
            graph.nodes.push(CfgNode {
                id,
                kind,
                stmt: None,
                location: None,
            });
        }
        Self {
            graph,
            jumps: Vec::new(),
        }
    }

    fn add_node(&mut self, kind: CfgNodeKind, stmt: Option<&Stmt>) -> CfgNodeId {
        let id = CfgNodeId(self.graph.nodes.len() as u32);
        self.graph.nodes.push(CfgNode {
            id,
            kind,
            stmt: stmt.map(|s| s.id),
            location: stmt.map(|s| s.location.clone()),
        });
        id
    }

    fn add_edge(&mut self, from: CfgNodeId, to: CfgNodeId, kind: EdgeKind) {
        self.graph.edges.push(CfgEdge { from, to, kind });
    }

    /// Attach every dangling edge to `to`, optionally forcing the kind.
    fn connect(&mut self, frontier: &[(CfgNodeId, EdgeKind)], to: CfgNodeId, kind: Option<EdgeKind>) {
        for &(from, pending) in frontier {
            self.add_edge(from, to, kind.unwrap_or(pending));
        }
    }

    /// Node with all of `frontier` flowing into it.
    fn enter(&mut self, kind: CfgNodeKind, stmt: &Stmt, frontier: &[(CfgNodeId, EdgeKind)]) -> CfgNodeId {
        let node = self.add_node(kind, Some(stmt));
        self.connect(frontier, node, None);
        node
    }

    fn lower_block(&mut self, stmts: &[Stmt], mut frontier: Frontier) -> Frontier {
        for stmt in stmts {
            frontier = self.lower_stmt(stmt, frontier);
        }
        frontier
    }

    /// Innermost context a `break` with `label` leaves.
    fn break_target(&self, label: Option<&str>) -> Option<CfgNodeId> {
        let mut jumps = self.jumps.iter().rev();
        match label {
            Some(label) => jumps.find(|j| j.is_named(label)).map(|j| j.break_to),
            None => jumps.find(|j| j.unlabeled_target).map(|j| j.break_to),
        }
    }

    /// Loop head a `continue` with `label` jumps to.
    fn continue_target(&self, label: Option<&str>) -> Option<CfgNodeId> {
        let mut jumps = self.jumps.iter().rev();
        match label {
            Some(label) => jumps.find(|j| j.is_named(label)).and_then(|j| j.continue_to),
            None => jumps.find_map(|j| j.continue_to),
        }
    }

    fn lower_stmt(&mut self, stmt: &Stmt, frontier: Frontier) -> Frontier {
        let own_context = stmt.is_loop() || matches!(stmt.kind, StmtKind::Switch { .. });
        if stmt.labels.is_empty() || own_context {
            return self.lower_kind(stmt, frontier);
        }
        let exit = self.add_node(CfgNodeKind::Join, None);
        self.jumps.push(JumpContext {
            continue_to: None,
            break_to: exit,
            labels: stmt.labels.clone(),
            unlabeled_target: false,
        });
        let end = self.lower_kind(stmt, frontier);
        self.jumps.pop();
        self.connect(&end, exit, None);
        vec![(exit, EdgeKind::Normal)]
    }

    fn lower_kind(&mut self, stmt: &Stmt, frontier: Frontier) -> Frontier {
        match &stmt.kind {
            StmtKind::Block { statements } => self.lower_block(statements, frontier),

            StmtKind::Return { .. } | StmtKind::Throw { .. } => {
                let node = self.enter(CfgNodeKind::Statement, stmt, &frontier);
                let exit = self.graph.exit;
                self.add_edge(node, exit, EdgeKind::Normal);
                Vec::new()
            }

            StmtKind::Break { label } => {
                let node = self.enter(CfgNodeKind::Statement, stmt, &frontier);
                match self.break_target(label.as_deref()) {
                    Some(target) => {
                        self.add_edge(node, target, EdgeKind::Normal);
                        Vec::new()
                    }
                    None => vec![(node, EdgeKind::Normal)],
                }
            }

            StmtKind::Continue { label } => {
                let node = self.enter(CfgNodeKind::Statement, stmt, &frontier);
                match self.continue_target(label.as_deref()) {
                    Some(target) => {
                        self.add_edge(node, target, EdgeKind::LoopBack);
                        Vec::new()
                    }
                    None => vec![(node, EdgeKind::Normal)],
                }
            }

            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                let decision = self.enter(CfgNodeKind::Decision, stmt, &frontier);
                let mut merged = self.lower_stmt(then_branch, vec![(decision, EdgeKind::Then)]);
                match else_branch {
                    Some(else_branch) => {
                        merged.extend(self.lower_stmt(else_branch, vec![(decision, EdgeKind::Else)]))
                    }
                    None => merged.push((decision, EdgeKind::Else)),
                }
                let join = self.add_node(CfgNodeKind::Join, None);
                self.connect(&merged, join, None);
                vec![(join, EdgeKind::Normal)]
            }

            StmtKind::For {
                initializers,
                condition,
                body,
                ..
            } => {
                let frontier = self.lower_block(initializers, frontier);
                let infinite = condition.as_ref().map_or(true, |c| c.is_literal_true());
                self.lower_loop(stmt, body, frontier, infinite)
            }
            StmtKind::While { condition, body } | StmtKind::DoWhile { body, condition } => {
                self.lower_loop(stmt, body, frontier, condition.is_literal_true())
            }
            StmtKind::ForEach { body, .. } => self.lower_loop(stmt, body, frontier, false),

            StmtKind::Switch { cases, default, .. } => {
                let decision = self.enter(CfgNodeKind::Decision, stmt, &frontier);
                let join = self.add_node(CfgNodeKind::Join, None);
                self.jumps.push(JumpContext {
                    continue_to: None,
                    break_to: join,
                    labels: stmt.labels.clone(),
                    unlabeled_target: true,
                });
                let mut merged = Frontier::new();
                for case in cases {
                    merged.extend(self.lower_block(&case.body, vec![(decision, EdgeKind::Case)]));
                }
                match default {
                    Some(body) => merged.extend(self.lower_block(body, vec![(decision, EdgeKind::Case)])),
                    None => merged.push((decision, EdgeKind::Else)),
                }
                self.jumps.pop();
                self.connect(&merged, join, None);
                vec![(join, EdgeKind::Normal)]
            }

            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                let decision = self.enter(CfgNodeKind::Decision, stmt, &frontier);
                let mut merged = self.lower_block(body, vec![(decision, EdgeKind::Normal)]);
                for catch in catches {
                    merged.extend(self.lower_block(&catch.body, vec![(decision, EdgeKind::Exception)]));
                }
                let join = self.add_node(CfgNodeKind::Join, None);
                self.connect(&merged, join, None);
                let after = vec![(join, EdgeKind::Normal)];
                match finally {
                    Some(finally) => self.lower_block(finally, after),
                    None => after,
                }
            }

            StmtKind::VariableDecl { .. }
            | StmtKind::Expression { .. }
            | StmtKind::Assert { .. }
            | StmtKind::Empty => {
                let node = self.enter(CfgNodeKind::Statement, stmt, &frontier);
                vec![(node, EdgeKind::Normal)]
            }
        }
    }

    fn lower_loop(&mut self, stmt: &Stmt, body: &Stmt, frontier: Frontier, infinite: bool) -> Frontier {
        let head = self.enter(CfgNodeKind::Loop, stmt, &frontier);
        let exit = self.add_node(CfgNodeKind::Join, None);

        self.jumps.push(JumpContext {
            continue_to: Some(head),
            break_to: exit,
            labels: stmt.labels.clone(),
            unlabeled_target: true,
        });
        let body_end = self.lower_stmt(body, vec![(head, EdgeKind::Normal)]);
        self.jumps.pop();
        self.connect(&body_end, head, Some(EdgeKind::LoopBack));

        if !infinite {
            self.add_edge(head, exit, EdgeKind::LoopExit);
        }
        vec![(exit, EdgeKind::Normal)]
    }
}

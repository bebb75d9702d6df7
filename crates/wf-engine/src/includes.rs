//! Flattening of script include graphs.
//!
//! A script's includes are concatenated ahead of its own body. Flattening
//! walks the include edges depth-first in edge order, emitting each
//! included script after everything it includes itself. Each script is
//! emitted at most once. Edges back onto the current path and edges to
//! deleted scripts are skipped and reported as warnings.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::warn;
use wf_core::{Script, ScriptId, ScriptInclude};
use wf_store::{ScriptIncludeRepo, ScriptRepo};

use crate::error::EngineResult;

/// A soft problem met while flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeWarning {
    /// An edge points at a script that no longer exists.
    Missing {
        /// The script holding the edge.
        included_in: ScriptId,
        /// The missing target.
        script: ScriptId,
    },
    /// An edge points back onto the script currently being expanded.
    Cycle {
        /// The script holding the edge.
        included_in: ScriptId,
        /// The script already on the path.
        script: ScriptId,
    },
}

impl fmt::Display for IncludeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing {
                included_in,
                script,
            } => write!(f, "script {included_in} includes missing script {script}"),
            Self::Cycle {
                included_in,
                script,
            } => write!(
                f,
                "script {included_in} includes {script}, which is already being included"
            ),
        }
    }
}

/// Result of flattening one script.
#[derive(Debug, Clone, Default)]
pub struct Flattened {
    /// Included scripts in concatenation order. Never contains the root.
    pub scripts: Vec<Script>,
    /// Edges skipped along the way.
    pub warnings: Vec<IncludeWarning>,
}

impl Flattened {
    /// Ids of the included scripts, in order.
    pub fn ids(&self) -> Vec<ScriptId> {
        self.scripts.iter().map(|s| s.id).collect()
    }

    /// Whether nothing is included.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

struct Frame {
    script: Option<Script>,
    edges: Vec<ScriptInclude>,
    next: usize,
}

/// Resolves include graphs through the script ports.
#[derive(Clone)]
pub struct IncludeResolver {
    scripts: Arc<dyn ScriptRepo>,
    includes: Arc<dyn ScriptIncludeRepo>,
}

impl IncludeResolver {
    /// Resolve through the script and include ports.
    pub fn new(scripts: Arc<dyn ScriptRepo>, includes: Arc<dyn ScriptIncludeRepo>) -> Self {
        Self { scripts, includes }
    }

    /// A script's own edges sorted by `order`. Ties keep storage order.
    pub async fn edges(&self, script: ScriptId) -> EngineResult<Vec<ScriptInclude>> {
        let mut edges = self.includes.includes_of(script).await?;
        edges.sort_by_key(|e| e.order);
        Ok(edges)
    }

    /// Flatten the transitive includes of `root`.
    pub async fn flatten(&self, root: ScriptId) -> EngineResult<Flattened> {
        let mut out = Flattened::default();
        let mut resolved: HashSet<ScriptId> = HashSet::new();
        let mut on_path: HashSet<ScriptId> = HashSet::from([root]);
        let mut stack = vec![Frame {
            script: None,
            edges: self.edges(root).await?,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next >= frame.edges.len() {
                if let Some(done) = stack.pop().and_then(|f| f.script) {
                    on_path.remove(&done.id);
                    resolved.insert(done.id);
                    out.scripts.push(done);
                }
                continue;
            }

            let edge = frame.edges[frame.next].clone();
            frame.next += 1;
            let target = edge.includes_id;

            if resolved.contains(&target) {
                continue;
            }
            if on_path.contains(&target) {
                let warning = IncludeWarning::Cycle {
                    included_in: edge.included_in_id,
                    script: target,
                };
                warn!("{warning}");
                out.warnings.push(warning);
                continue;
            }

            let Some(script) = self.scripts.get(target).await? else {
                let warning = IncludeWarning::Missing {
                    included_in: edge.included_in_id,
                    script: target,
                };
                warn!("{warning}");
                out.warnings.push(warning);
                continue;
            };

            on_path.insert(target);
            let edges = self.edges(target).await?;
            stack.push(Frame {
                script: Some(script),
                edges,
                next: 0,
            });
        }

        Ok(out)
    }

    /// Every group of `scripts` that include each other, directly or
    /// through other scripts. Members are listed in discovery order; a script
    /// that includes itself is a group of one.
    pub async fn find_cycles(&self, scripts: &[Script]) -> EngineResult<Vec<Vec<ScriptId>>> {
        let mut graph: HashMap<ScriptId, Vec<ScriptId>> = HashMap::new();
        for script in scripts {
            let targets = self
                .edges(script.id)
                .await?
                .into_iter()
                .map(|e| e.includes_id)
                .collect();
            graph.insert(script.id, targets);
        }
        let roots: Vec<ScriptId> = scripts.iter().map(|s| s.id).collect();
        Ok(cyclic_components(&roots, &graph))
    }
}

/// Strongly connected components with a cycle in them, found with an
/// explicit work stack so include depth never touches the call stack.
fn cyclic_components(
    roots: &[ScriptId],
    graph: &HashMap<ScriptId, Vec<ScriptId>>,
) -> Vec<Vec<ScriptId>> {
    // (discovery index, lowest index reachable)
    let mut visits: HashMap<ScriptId, (usize, usize)> = HashMap::new();
    let mut on_stack: HashSet<ScriptId> = HashSet::new();
    let mut stack: Vec<ScriptId> = Vec::new();
    let mut components = Vec::new();
    let no_edges = Vec::new();

    for &root in roots {
        if visits.contains_key(&root) {
            continue;
        }
        let mut work = vec![(root, 0usize)];
        while let Some((node, next)) = work.pop() {
            if next == 0 {
                let index = visits.len();
                visits.insert(node, (index, index));
                stack.push(node);
                on_stack.insert(node);
            }

            let targets = graph.get(&node).unwrap_or(&no_edges);
            if let Some(&target) = targets.get(next) {
                work.push((node, next + 1));
                match visits.get(&target) {
                    None => work.push((target, 0)),
                    Some(&(index, _)) if on_stack.contains(&target) => {
                        lower(&mut visits, node, index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            let (index, low) = visits.get(&node).copied().unwrap_or_default();
            if let Some(&(parent, _)) = work.last() {
                lower(&mut visits, parent, low);
            }
            if low == index {
                let at = stack.iter().rposition(|id| *id == node).unwrap_or(0);
                let members = stack.split_off(at);
                for member in &members {
                    on_stack.remove(member);
                }
                if members.len() > 1 || targets.contains(&node) {
                    components.push(members);
                }
            }
        }
    }
    components
}

fn lower(visits: &mut HashMap<ScriptId, (usize, usize)>, node: ScriptId, to: usize) {
    if let Some(visit) = visits.get_mut(&node) {
        visit.1 = visit.1.min(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;
    use wf_core::AdventureId;
    use wf_store::MemoryStore;

    struct Graph {
        resolver: IncludeResolver,
        store: Arc<MemoryStore>,
        scripts: Vec<Script>,
    }

    async fn graph(count: usize, edges: &[(usize, usize, i32)]) -> Graph {
        let store = Arc::new(MemoryStore::new());
        let adventure = AdventureId::new();
        let mut scripts = Vec::new();
        for i in 0..count {
            let script = Script::new(adventure, format!("s{i}"), format!("-- s{i}"));
            ScriptRepo::add(store.as_ref(), &script).await.unwrap();
            scripts.push(script);
        }
        for &(from, to, order) in edges {
            let edge = ScriptInclude::new(scripts[from].id, scripts[to].id, order);
            ScriptIncludeRepo::add(store.as_ref(), &edge).await.unwrap();
        }
        Graph {
            resolver: IncludeResolver::new(store.clone(), store.clone()),
            store,
            scripts,
        }
    }

    fn names(flat: &Flattened) -> Vec<&str> {
        flat.scripts.iter().map(|s| s.name.as_str()).collect()
    }

    #[tokio::test]
    async fn no_includes() {
        let g = graph(1, &[]).await;
        let flat = g.resolver.flatten(g.scripts[0].id).await.unwrap();
        assert!(flat.is_empty());
        assert!(flat.warnings.is_empty());
    }

    #[tokio::test]
    async fn nested_includes_come_first() {
        // s0 -> s1 -> s2, s0 -> s3
        let g = graph(4, &[(0, 1, 0), (1, 2, 0), (0, 3, 1)]).await;
        let flat = g.resolver.flatten(g.scripts[0].id).await.unwrap();
        assert_eq!(names(&flat), vec!["s2", "s1", "s3"]);
    }

    #[tokio::test]
    async fn edge_order_is_respected() {
        let g = graph(3, &[(0, 1, 5), (0, 2, 1)]).await;
        let flat = g.resolver.flatten(g.scripts[0].id).await.unwrap();
        assert_eq!(names(&flat), vec!["s2", "s1"]);
    }

    #[tokio::test]
    async fn shared_include_appears_once() {
        // Diamond: s0 -> s1 -> s3, s0 -> s2 -> s3
        let g = graph(4, &[(0, 1, 0), (0, 2, 1), (1, 3, 0), (2, 3, 0)]).await;
        let flat = g.resolver.flatten(g.scripts[0].id).await.unwrap();
        assert_eq!(names(&flat), vec!["s3", "s1", "s2"]);
    }

    #[tokio::test]
    async fn cycle_terminates() {
        // X includes Y includes X
        let g = graph(2, &[(0, 1, 0), (1, 0, 0)]).await;
        let flat = g.resolver.flatten(g.scripts[0].id).await.unwrap();
        assert_eq!(names(&flat), vec!["s1"]);
        assert_eq!(
            flat.warnings,
            vec![IncludeWarning::Cycle {
                included_in: g.scripts[1].id,
                script: g.scripts[0].id,
            }]
        );
    }

    #[tokio::test]
    async fn self_include_terminates() {
        let g = graph(1, &[(0, 0, 0)]).await;
        let flat = g.resolver.flatten(g.scripts[0].id).await.unwrap();
        assert!(flat.is_empty());
        assert_eq!(flat.warnings.len(), 1);
    }

    #[tokio::test]
    async fn missing_include_is_skipped() {
        let g = graph(3, &[(0, 1, 0), (0, 2, 1)]).await;
        ScriptRepo::remove(g.store.as_ref(), g.scripts[1].id)
            .await
            .unwrap();
        let flat = g.resolver.flatten(g.scripts[0].id).await.unwrap();
        assert_eq!(names(&flat), vec!["s2"]);
        assert!(matches!(
            flat.warnings.as_slice(),
            [IncludeWarning::Missing { .. }]
        ));
    }

    #[tokio::test]
    async fn cycles_are_found() {
        let g = graph(4, &[(0, 1, 0), (1, 2, 0), (2, 0, 0), (3, 3, 0)]).await;
        let cycles = g.resolver.find_cycles(&g.scripts).await.unwrap();
        assert_eq!(cycles.len(), 2);
        assert!(cycles.iter().any(|c| c.len() == 3));
        assert!(cycles.contains(&vec![g.scripts[3].id]));
    }

    #[tokio::test]
    async fn loops_sharing_a_script_form_one_group() {
        // 0 -> 1 -> 0 and 1 -> 2 -> 1, plus 0 -> 2 closing 0 -> 2 -> 1 -> 0.
        let g = graph(4, &[(0, 1, 0), (1, 0, 0), (1, 2, 1), (2, 1, 0), (0, 2, 1), (3, 0, 0)]).await;
        let cycles = g.resolver.find_cycles(&g.scripts).await.unwrap();
        assert_eq!(cycles.len(), 1);
        let members: HashSet<ScriptId> = cycles[0].iter().copied().collect();
        let expected: HashSet<ScriptId> = g.scripts[..3].iter().map(|s| s.id).collect();
        assert_eq!(members, expected);
    }

    #[test]
    fn deep_include_chain_is_walked_without_recursion() {
        let ids: Vec<ScriptId> = (0..200_000).map(|_| ScriptId::new()).collect();
        let mut graph: HashMap<ScriptId, Vec<ScriptId>> = ids
            .windows(2)
            .map(|pair| (pair[0], vec![pair[1]]))
            .collect();
        assert!(cyclic_components(&ids, &graph).is_empty());

        graph.insert(ids[ids.len() - 1], vec![ids[0]]);
        let cycles = cyclic_components(&ids, &graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), ids.len());
        assert_eq!(cycles[0][0], ids[0]);
    }

    #[tokio::test]
    async fn acyclic_graph_has_no_cycles() {
        let g = graph(3, &[(0, 1, 0), (0, 2, 0), (1, 2, 0)]).await;
        assert!(g.resolver.find_cycles(&g.scripts).await.unwrap().is_empty());
    }

    fn reachable(count: usize, edges: &[(usize, usize, i32)], root: usize) -> HashSet<usize> {
        let mut seen = HashSet::new();
        let mut todo = vec![root];
        while let Some(node) = todo.pop() {
            for &(from, to, _) in edges {
                if from == node && to < count && seen.insert(to) {
                    todo.push(to);
                }
            }
        }
        seen.remove(&root);
        seen
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn dag_flatten_orders_dependencies(
            raw in prop::collection::vec((0usize..8, 0usize..8, 0i32..4), 0..24)
        ) {
            // Only forward edges, so the graph is acyclic.
            let edges: Vec<_> = raw.into_iter().filter(|(a, b, _)| a < b).collect();
            runtime().block_on(async {
                let g = graph(8, &edges).await;
                let flat = g.resolver.flatten(g.scripts[0].id).await.unwrap();
                let index: HashMap<ScriptId, usize> =
                    g.scripts.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
                let order: Vec<usize> = flat.ids().iter().map(|id| index[id]).collect();

                let unique: HashSet<usize> = order.iter().copied().collect();
                prop_assert_eq!(unique.len(), order.len());
                prop_assert_eq!(unique, reachable(8, &edges, 0));
                prop_assert!(flat.warnings.is_empty());

                for (pos, script) in order.iter().enumerate() {
                    for dep in reachable(8, &edges, *script) {
                        let dep_pos = order.iter().position(|s| *s == dep);
                        prop_assert!(dep_pos.is_some_and(|p| p < pos));
                    }
                }
                Ok::<(), TestCaseError>(())
            })?;
        }

        #[test]
        fn cyclic_flatten_terminates_without_duplicates(
            edges in prop::collection::vec((0usize..6, 0usize..6, 0i32..3), 0..30)
        ) {
            runtime().block_on(async {
                let g = graph(6, &edges).await;
                let first = g.resolver.flatten(g.scripts[0].id).await.unwrap();
                let again = g.resolver.flatten(g.scripts[0].id).await.unwrap();

                let ids = first.ids();
                let unique: HashSet<ScriptId> = ids.iter().copied().collect();
                prop_assert_eq!(unique.len(), ids.len());
                prop_assert!(!unique.contains(&g.scripts[0].id));
                prop_assert_eq!(ids, again.ids());
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}

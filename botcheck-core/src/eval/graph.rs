//! Dependency graph of named checks

use std::collections::{HashMap, HashSet};

use crate::error::{BotcheckError, Result};

/// A check and the checks it depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckNode {
    pub name: String,
    pub depends_on: Vec<String>,
}

impl CheckNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends_on: Vec::new(),
        }
    }

    /// Add a prerequisite
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }
}

/// Validated DAG of checks with a fixed execution order.
///
/// Construction fails on duplicate names, unknown or self prerequisites,
/// and cycles, so a built graph always has a complete topological order.
#[derive(Debug, Clone)]
pub struct CheckGraph {
    nodes: Vec<CheckNode>,
    index: HashMap<String, usize>,
    order: Vec<usize>,
}

impl CheckGraph {
    pub fn new(nodes: Vec<CheckNode>) -> Result<Self> {
        let mut index = HashMap::new();
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.name.clone(), i).is_some() {
                return Err(BotcheckError::Graph(format!(
                    "duplicate check name '{}'",
                    node.name
                )));
            }
        }

        for node in &nodes {
            for dep in &node.depends_on {
                if dep == &node.name {
                    return Err(BotcheckError::Graph(format!(
                        "check '{}' depends on itself",
                        node.name
                    )));
                }
                if !index.contains_key(dep) {
                    return Err(BotcheckError::Graph(format!(
                        "check '{}' depends on unknown check '{}'",
                        node.name, dep
                    )));
                }
            }
        }

        let order = Self::topological_order(&nodes)?;
        Ok(Self {
            nodes,
            index,
            order,
        })
    }

    /// Declaration order is kept among checks that become ready together.
    fn topological_order(nodes: &[CheckNode]) -> Result<Vec<usize>> {
        let mut order = Vec::with_capacity(nodes.len());
        let mut completed: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<usize> = (0..nodes.len()).collect();

        while !remaining.is_empty() {
            let ready: Vec<usize> = remaining
                .iter()
                .copied()
                .filter(|&i| {
                    nodes[i]
                        .depends_on
                        .iter()
                        .all(|d| completed.contains(d.as_str()))
                })
                .collect();

            if ready.is_empty() {
                let stuck: Vec<&str> = remaining.iter().map(|&i| nodes[i].name.as_str()).collect();
                return Err(BotcheckError::Graph(format!(
                    "dependency cycle among checks: {}",
                    stuck.join(", ")
                )));
            }

            for &i in &ready {
                completed.insert(nodes[i].name.as_str());
                order.push(i);
            }
            remaining.retain(|i| !ready.contains(i));
        }

        Ok(order)
    }

    /// Checks in execution order
    pub fn ordered(&self) -> impl Iterator<Item = &CheckNode> {
        self.order.iter().map(|&i| &self.nodes[i])
    }

    pub fn get(&self, name: &str) -> Option<&CheckNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All transitive prerequisites of `name`, in execution order
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut found: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = self
            .get(name)
            .map(|n| n.depends_on.iter().map(String::as_str).collect())
            .unwrap_or_default();

        while let Some(current) = stack.pop() {
            if found.insert(current) {
                if let Some(node) = self.get(current) {
                    stack.extend(node.depends_on.iter().map(String::as_str));
                }
            }
        }

        self.ordered()
            .map(|n| n.name.as_str())
            .filter(|n| found.contains(n))
            .collect()
    }

    /// All checks that transitively depend on `name`, in execution order
    pub fn descendants(&self, name: &str) -> Vec<&str> {
        let mut found: HashSet<&str> = HashSet::new();
        for node in self.ordered() {
            let blocked = node
                .depends_on
                .iter()
                .any(|d| d == name || found.contains(d.as_str()));
            if blocked {
                found.insert(node.name.as_str());
            }
        }

        self.ordered()
            .map(|n| n.name.as_str())
            .filter(|n| found.contains(n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suite_nodes() -> Vec<CheckNode> {
        vec![
            CheckNode::new("format"),
            CheckNode::new("validity").depends_on("containment"),
            CheckNode::new("containment").depends_on("format"),
            CheckNode::new("time").depends_on("format"),
        ]
    }

    fn names(graph: &CheckGraph) -> Vec<&str> {
        graph.ordered().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_topological_order() {
        let graph = CheckGraph::new(suite_nodes()).unwrap();
        assert_eq!(names(&graph), vec!["format", "containment", "time", "validity"]);
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let result = CheckGraph::new(vec![CheckNode::new("a").depends_on("missing")]);
        assert!(matches!(result, Err(BotcheckError::Graph(ref m)) if m.contains("missing")));
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = CheckGraph::new(vec![CheckNode::new("a"), CheckNode::new("a")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_self_dependency_rejected() {
        let result = CheckGraph::new(vec![CheckNode::new("a").depends_on("a")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cycle_rejected() {
        let result = CheckGraph::new(vec![
            CheckNode::new("root"),
            CheckNode::new("a").depends_on("b"),
            CheckNode::new("b").depends_on("a"),
        ]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cycle"));
        assert!(err.contains("a, b"));
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let graph = CheckGraph::new(suite_nodes()).unwrap();

        assert_eq!(graph.ancestors("validity"), vec!["format", "containment"]);
        assert!(graph.ancestors("format").is_empty());

        assert_eq!(graph.descendants("format"), vec!["containment", "time", "validity"]);
        assert_eq!(graph.descendants("containment"), vec!["validity"]);
        assert!(graph.descendants("time").is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let graph = CheckGraph::new(Vec::new()).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.ordered().count(), 0);
    }
}

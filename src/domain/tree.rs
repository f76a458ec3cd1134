use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::options::OptionTable;

/// Option name of the domain sequence-awareness flag.
pub const SEQUENCE_AWARE: &str = "sequenceAware";

/// Closed set of node variants a domain description is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    GroupDomain,
    Domain,
    GroupConfiguration,
    Configuration,
    GroupPath,
    Path,
    Rule,
    Operator,
}

impl NodeKind {
    /// Element tag used by the XML and raw dumps.
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::GroupDomain => "groupDomain",
            NodeKind::Domain => "domain",
            NodeKind::GroupConfiguration => "GroupConfiguration",
            NodeKind::Configuration => "configuration",
            NodeKind::GroupPath => "component",
            NodeKind::Path => "path",
            NodeKind::Rule => "rule",
            NodeKind::Operator => "operator",
        }
    }

    /// Declared option names; their order is the column order on the source line.
    pub fn option_names(self) -> &'static [&'static str] {
        match self {
            NodeKind::Domain | NodeKind::GroupDomain => &["Name", SEQUENCE_AWARE],
            NodeKind::Path => &["Name", "value"],
            NodeKind::Rule => &["criterion", "type", "element"],
            NodeKind::Root
            | NodeKind::GroupConfiguration
            | NodeKind::Configuration
            | NodeKind::GroupPath
            | NodeKind::Operator => &["Name"],
        }
    }

    /// Child whitelist.
    pub fn allows_child(self, child: NodeKind) -> bool {
        use NodeKind::*;
        match self {
            Root => matches!(child, Domain | GroupDomain),
            GroupDomain => matches!(
                child,
                GroupDomain | Domain | GroupConfiguration | Rule | Operator
            ),
            Domain => matches!(child, Configuration | GroupConfiguration | Rule | Operator),
            GroupConfiguration => matches!(
                child,
                Rule | Operator | GroupConfiguration | Configuration | GroupPath
            ),
            Configuration => matches!(child, Rule | Operator | Path | GroupPath),
            GroupPath => matches!(child, Path | GroupPath),
            Operator => matches!(child, Rule | Operator),
            Path | Rule => false,
        }
    }

    /// Rules and operators are inherited by descendant configurations.
    pub fn is_rule_like(self) -> bool {
        matches!(self, NodeKind::Rule | NodeKind::Operator)
    }

    pub fn is_domain_like(self) -> bool {
        matches!(self, NodeKind::Domain | NodeKind::GroupDomain)
    }

    /// Root and the group domain/configuration wrappers render only their children.
    pub fn is_transparent(self) -> bool {
        matches!(
            self,
            NodeKind::Root | NodeKind::GroupDomain | NodeKind::GroupConfiguration
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Tree node in the arena-based domain hierarchy.
#[derive(Debug, Clone)]
pub struct DomainNode {
    pub kind: NodeKind,
    pub options: OptionTable,
    /// Node this one was declared under, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in declaration order
    pub children: Vec<Index>,
}

impl DomainNode {
    pub fn name(&self) -> &str {
        self.options.name()
    }
}

/// Arena-based tree holding one parsed domain description.
///
/// After propagation a rule or operator may be listed as a child of several
/// nodes (inherited and composed rules are shared by index); its declaring
/// `parent` still identifies a single node.
#[derive(Debug)]
pub struct DomainTree {
    arena: Arena<DomainNode>,
    root: Index,
}

impl Default for DomainTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Attachment failure; the builder adds the line context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotPermitted {
    pub parent: NodeKind,
    pub child: NodeKind,
}

impl DomainTree {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(DomainNode {
            kind: NodeKind::Root,
            options: OptionTable::from_pairs(&["Name"], ["root"]),
            parent: None,
            children: Vec::new(),
        });
        Self { arena, root }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn get(&self, idx: Index) -> Option<&DomainNode> {
        self.arena.get(idx)
    }

    pub fn get_mut(&mut self, idx: Index) -> Option<&mut DomainNode> {
        self.arena.get_mut(idx)
    }

    pub fn kind(&self, idx: Index) -> Option<NodeKind> {
        self.get(idx).map(|node| node.kind)
    }

    /// Number of nodes stored, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() <= 1
    }

    /// Create a node and append it to `parent`'s children if the whitelist allows it.
    #[instrument(level = "trace", skip(self, options))]
    pub fn attach(
        &mut self,
        parent: Index,
        kind: NodeKind,
        options: OptionTable,
    ) -> Result<Index, NotPermitted> {
        let parent_kind = self.kind(parent).unwrap_or(NodeKind::Root);
        if !parent_kind.allows_child(kind) {
            return Err(NotPermitted {
                parent: parent_kind,
                child: kind,
            });
        }
        let idx = self.arena.insert(DomainNode {
            kind,
            options,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(idx);
        }
        Ok(idx)
    }

    /// Children of `idx` whose kind satisfies `pred`, in tree order.
    pub fn children_where(&self, idx: Index, pred: impl Fn(NodeKind) -> bool) -> Vec<Index> {
        self.get(idx)
            .map(|node| {
                node.children
                    .iter()
                    .copied()
                    .filter(|&child| self.kind(child).is_some_and(&pred))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn children(&self, idx: Index) -> &[Index] {
        self.get(idx).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn name(&self, idx: Index) -> &str {
        self.get(idx).map(DomainNode::name).unwrap_or("")
    }

    pub fn options(&self, idx: Index) -> Option<&OptionTable> {
        self.get(idx).map(|node| &node.options)
    }

    /// Pre-order traversal yielding `(index, depth, node)`, root at depth 0.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Path nodes under `idx`, flattened through group paths in tree order.
    pub fn path_leaves(&self, idx: Index) -> Vec<Index> {
        let mut leaves = Vec::new();
        self.collect_path_leaves(idx, &mut leaves);
        leaves
    }

    fn collect_path_leaves(&self, idx: Index, leaves: &mut Vec<Index>) {
        for &child in self.children(idx) {
            match self.kind(child) {
                Some(NodeKind::Path) => leaves.push(child),
                Some(NodeKind::GroupPath) => self.collect_path_leaves(child, leaves),
                _ => {}
            }
        }
    }

    /// Path names a configuration sets: its own paths first, then those of
    /// its group paths, recursively.
    pub fn configurable_element_names(&self, idx: Index) -> Vec<String> {
        let mut names: Vec<String> = self
            .children_where(idx, |kind| kind == NodeKind::Path)
            .into_iter()
            .map(|path| self.name(path).to_string())
            .collect();
        for group in self.children_where(idx, |kind| kind == NodeKind::GroupPath) {
            names.extend(self.configurable_element_names(group));
        }
        names
    }

    /// One element list per configuration of a domain: direct configurations
    /// first, then those of each group configuration, recursively.
    pub fn configurable_elements(&self, idx: Index) -> Vec<Vec<String>> {
        let mut lists: Vec<Vec<String>> = self
            .children_where(idx, |kind| kind == NodeKind::Configuration)
            .into_iter()
            .map(|conf| self.configurable_element_names(conf))
            .collect();
        for group in self.children_where(idx, |kind| kind == NodeKind::GroupConfiguration) {
            lists.extend(self.configurable_elements(group));
        }
        lists
    }

    /// Configuration nodes of a domain, descending through group configurations.
    pub fn configurations(&self, idx: Index) -> Vec<Index> {
        let mut configurations = Vec::new();
        self.collect_configurations(idx, &mut configurations);
        configurations
    }

    fn collect_configurations(&self, idx: Index, out: &mut Vec<Index>) {
        for &child in self.children(idx) {
            match self.kind(child) {
                Some(NodeKind::Configuration) => out.push(child),
                Some(NodeKind::GroupConfiguration) => self.collect_configurations(child, out),
                _ => {}
            }
        }
    }

    /// Domain nodes, descending through group domains.
    pub fn domains(&self) -> Vec<Index> {
        let mut domains = Vec::new();
        self.collect_domains(self.root, &mut domains);
        domains
    }

    fn collect_domains(&self, idx: Index, out: &mut Vec<Index>) {
        for &child in self.children(idx) {
            match self.kind(child) {
                Some(NodeKind::Domain) => out.push(child),
                Some(NodeKind::GroupDomain) => self.collect_domains(child, out),
                _ => {}
            }
        }
    }
}

pub struct TreeIterator<'a> {
    tree: &'a DomainTree,
    stack: Vec<(Index, usize)>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a DomainTree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root, 0)],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, usize, &'a DomainNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, depth)) = self.stack.pop() {
            if let Some(node) = self.tree.get(idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some((idx, depth, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> OptionTable {
        OptionTable::from_pairs(&["Name"], [name])
    }

    #[test]
    fn test_new_tree_has_named_root() {
        let tree = DomainTree::new();
        assert_eq!(tree.name(tree.root()), "root");
        assert_eq!(tree.kind(tree.root()), Some(NodeKind::Root));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_attach_enforces_whitelist() {
        let mut tree = DomainTree::new();
        let root = tree.root();
        let result = tree.attach(root, NodeKind::Configuration, named("C"));
        assert_eq!(
            result,
            Err(NotPermitted {
                parent: NodeKind::Root,
                child: NodeKind::Configuration
            })
        );
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn test_attach_records_parent_and_order() {
        let mut tree = DomainTree::new();
        let root = tree.root();
        let d = tree.attach(root, NodeKind::Domain, named("D")).unwrap();
        let c1 = tree.attach(d, NodeKind::Configuration, named("C1")).unwrap();
        let c2 = tree.attach(d, NodeKind::Configuration, named("C2")).unwrap();
        assert_eq!(tree.children(d), &[c1, c2]);
        assert_eq!(tree.get(c1).unwrap().parent, Some(d));
    }

    #[test]
    fn test_path_leaves_flatten_in_tree_order() {
        let mut tree = DomainTree::new();
        let root = tree.root();
        let d = tree.attach(root, NodeKind::Domain, named("D")).unwrap();
        let c = tree.attach(d, NodeKind::Configuration, named("C")).unwrap();
        let g = tree.attach(c, NodeKind::GroupPath, named("/g")).unwrap();
        tree.attach(g, NodeKind::Path, named("/g/a")).unwrap();
        tree.attach(c, NodeKind::Path, named("/b")).unwrap();
        let names: Vec<&str> = tree
            .path_leaves(c)
            .into_iter()
            .map(|leaf| tree.name(leaf))
            .collect();
        assert_eq!(names, vec!["/g/a", "/b"]);
    }

    #[test]
    fn test_configurable_elements_list_direct_children_first() {
        let mut tree = DomainTree::new();
        let root = tree.root();
        let d = tree.attach(root, NodeKind::Domain, named("D")).unwrap();
        let g = tree.attach(d, NodeKind::GroupConfiguration, named("G")).unwrap();
        let a = tree.attach(g, NodeKind::Configuration, named("A")).unwrap();
        tree.attach(a, NodeKind::Path, named("/b")).unwrap();
        let b = tree.attach(d, NodeKind::Configuration, named("B")).unwrap();
        let gp = tree.attach(b, NodeKind::GroupPath, named("/g")).unwrap();
        tree.attach(gp, NodeKind::Path, named("/g/a")).unwrap();
        tree.attach(b, NodeKind::Path, named("/c")).unwrap();
        assert_eq!(
            tree.configurable_elements(d),
            vec![vec!["/c".to_string(), "/g/a".to_string()], vec!["/b".to_string()]]
        );
    }

    #[test]
    fn test_iter_is_preorder_with_depth() {
        let mut tree = DomainTree::new();
        let root = tree.root();
        let gd = tree.attach(root, NodeKind::GroupDomain, named("G")).unwrap();
        tree.attach(gd, NodeKind::Domain, named("A")).unwrap();
        tree.attach(root, NodeKind::Domain, named("B")).unwrap();
        let visited: Vec<_> = tree
            .iter()
            .map(|(_, depth, node)| (depth, node.name().to_string()))
            .collect();
        assert_eq!(
            visited,
            vec![
                (0, "root".to_string()),
                (1, "G".to_string()),
                (2, "A".to_string()),
                (1, "B".to_string())
            ]
        );
        assert_eq!(tree.domains().len(), 2);
    }

    #[test]
    fn test_transparent_kinds() {
        assert!(NodeKind::Root.is_transparent());
        assert!(NodeKind::GroupDomain.is_transparent());
        assert!(NodeKind::GroupConfiguration.is_transparent());
        assert!(!NodeKind::Domain.is_transparent());
        assert!(!NodeKind::GroupPath.is_transparent());
    }
}

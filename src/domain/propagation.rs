//! Top-down propagation of names, flags and rules, plus group-configuration composition.

use std::rc::Rc;

use generational_arena::Index;
use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::domain::error::DomainError;
use crate::domain::options::{OptionTable, OptionValue};
use crate::domain::tree::{DomainTree, NodeKind, SEQUENCE_AWARE};

/// A group configuration as it was declared, kept for later same-name composition.
#[derive(Debug)]
pub struct GroupConfigurationCopy {
    pub name: String,
    pub rules: Vec<Index>,
}

/// Inherited context handed down the tree.
///
/// Cloning copies only pointers and indices, so each subtree gets its own
/// context without copying option tables.
#[derive(Debug, Clone, Default)]
pub struct PropagationContext {
    pub domain_options: Vec<Rc<OptionTable>>,
    pub configurations: Vec<Rc<GroupConfigurationCopy>>,
    pub configuration_options: Vec<Rc<OptionTable>>,
    pub rules: Vec<Index>,
    pub path_options: Vec<Rc<OptionTable>>,
}

impl PropagationContext {
    fn joined_names(options: &[Rc<OptionTable>], separator: &str) -> String {
        options.iter().map(|o| o.name()).join(separator)
    }
}

/// Propagate inherited state through the whole tree, then check every domain.
///
/// Each call starts from an empty context.
#[instrument(level = "debug", skip_all)]
pub fn propagate(tree: &mut DomainTree) -> Result<(), DomainError> {
    let root = tree.root();
    let mut context = PropagationContext::default();
    Propagator { tree }.visit(root, &mut context)
}

struct Propagator<'a> {
    tree: &'a mut DomainTree,
}

impl Propagator<'_> {
    fn visit(&mut self, idx: Index, context: &mut PropagationContext) -> Result<(), DomainError> {
        let Some(kind) = self.tree.kind(idx) else {
            return Ok(());
        };
        match kind {
            NodeKind::Root => self.visit_children(idx, context),
            NodeKind::Rule | NodeKind::Operator => Ok(()),
            NodeKind::Domain | NodeKind::GroupDomain => {
                let mut local = context.clone();
                self.inherit_domain_options(idx, &mut local);
                self.inherit_rules(idx, &mut local);
                self.visit_children(idx, &mut local)?;
                self.check_configurable_elements(idx)
            }
            NodeKind::Configuration | NodeKind::GroupConfiguration => {
                self.compose(idx, kind, context);
                let mut local = context.clone();
                self.inherit_configuration_name(idx, &mut local);
                self.inherit_rules(idx, &mut local);
                self.visit_children(idx, &mut local)
            }
            NodeKind::Path | NodeKind::GroupPath => {
                let mut local = context.clone();
                self.inherit_path_name(idx, &mut local);
                self.visit_children(idx, &mut local)
            }
        }
    }

    /// Children share one context, so a group configuration registered by
    /// one child is seen by the siblings after it.
    fn visit_children(
        &mut self,
        idx: Index,
        context: &mut PropagationContext,
    ) -> Result<(), DomainError> {
        let children = self.tree.children(idx).to_vec();
        for child in children {
            self.visit(child, context)?;
        }
        Ok(())
    }

    fn rule_children(&self, idx: Index) -> Vec<Index> {
        self.tree.children_where(idx, NodeKind::is_rule_like)
    }

    fn prepend_children(&mut self, idx: Index, front: &[Index]) {
        if front.is_empty() {
            return;
        }
        if let Some(node) = self.tree.get_mut(idx) {
            node.children.splice(0..0, front.iter().copied());
        }
    }

    fn own_options(&self, idx: Index) -> Rc<OptionTable> {
        Rc::new(self.tree.options(idx).cloned().unwrap_or_default())
    }

    /// Same-named group configurations seen so far give their rules to this node.
    fn compose(&mut self, idx: Index, kind: NodeKind, context: &mut PropagationContext) {
        let name = self.tree.name(idx).to_string();
        let declared = (kind == NodeKind::GroupConfiguration).then(|| GroupConfigurationCopy {
            name: name.clone(),
            rules: self.rule_children(idx),
        });

        let matching: Vec<Rc<GroupConfigurationCopy>> = context
            .configurations
            .iter()
            .filter(|group| group.name == name)
            .cloned()
            .collect();
        for group in matching.iter().rev() {
            trace!(name = %name, rules = group.rules.len(), "composing");
            self.prepend_children(idx, &group.rules);
        }

        if let Some(copy) = declared {
            context.configurations.push(Rc::new(copy));
        }
    }

    fn inherit_domain_options(&mut self, idx: Index, context: &mut PropagationContext) {
        context.domain_options.push(self.own_options(idx));
        let name = PropagationContext::joined_names(&context.domain_options, ".");
        let aware = context
            .domain_options
            .iter()
            .any(|options| options.flag(SEQUENCE_AWARE));
        if let Some(node) = self.tree.get_mut(idx) {
            node.options.set_name(name);
            node.options.set(SEQUENCE_AWARE, OptionValue::Flag(aware));
        }
    }

    fn inherit_configuration_name(&mut self, idx: Index, context: &mut PropagationContext) {
        context.configuration_options.push(self.own_options(idx));
        let name = PropagationContext::joined_names(&context.configuration_options, ".");
        if let Some(node) = self.tree.get_mut(idx) {
            node.options.set_name(name);
        }
    }

    fn inherit_path_name(&mut self, idx: Index, context: &mut PropagationContext) {
        context.path_options.push(self.own_options(idx));
        let name = PropagationContext::joined_names(&context.path_options, "/");
        if let Some(node) = self.tree.get_mut(idx) {
            node.options.set_name(name);
        }
    }

    /// Ancestor rules go in front of this node's children; this node's rules
    /// are then handed down.
    fn inherit_rules(&mut self, idx: Index, context: &mut PropagationContext) {
        let own = self.rule_children(idx);
        let inherited = context.rules.clone();
        self.prepend_children(idx, &inherited);
        context.rules.extend(own);
    }

    /// All configurations of a domain must set the same configurable elements.
    fn check_configurable_elements(&self, idx: Index) -> Result<(), DomainError> {
        let mut element_lists = self
            .tree
            .configurable_elements(idx)
            .into_iter()
            .map(|mut names| {
                names.sort();
                names
            });
        let Some(first) = element_lists.next() else {
            return Ok(());
        };
        for elements in element_lists {
            if elements != first {
                let domain = self.tree.name(idx).to_string();
                debug!(domain = %domain, "configurable elements differ");
                return Err(DomainError::UndefinedParameter { domain });
            }
        }
        Ok(())
    }
}

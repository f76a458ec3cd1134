//! Command-script generator for the parameter-management runtime.
//!
//! Generation produces typed [`Command`]s per domain; [`render`] turns them
//! into the text the runtime reads.

use generational_arena::Index;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{DomainTree, NodeKind, SEQUENCE_AWARE};

/// Applicability expression of a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleExpr {
    Criterion {
        criterion: String,
        kind: String,
        element: String,
    },
    Combinator {
        name: String,
        children: Vec<RuleExpr>,
    },
}

impl RuleExpr {
    pub fn all(children: Vec<RuleExpr>) -> Self {
        RuleExpr::Combinator {
            name: "ALL".to_string(),
            children,
        }
    }

    /// Runtime spelling of a combinator name.
    pub fn keyword(name: &str) -> &str {
        match name {
            "ANY" => "Any",
            "ALL" => "All",
            other => other,
        }
    }
}

/// One runtime command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateDomain {
        domain: String,
    },
    AddElement {
        domain: String,
        element: String,
    },
    CreateConfiguration {
        domain: String,
        configuration: String,
    },
    SetRule {
        domain: String,
        configuration: String,
        rule: RuleExpr,
    },
    RestoreConfiguration {
        domain: String,
        configuration: String,
    },
    SetParameter {
        path: String,
        value: String,
    },
    SaveConfiguration {
        domain: String,
        configuration: String,
    },
    SetElementSequence {
        domain: String,
        configuration: String,
        elements: Vec<String>,
    },
    SetSequenceAwareness {
        domain: String,
    },
}

impl Command {
    pub fn verb(&self) -> &'static str {
        match self {
            Command::CreateDomain { .. } => "createDomain",
            Command::AddElement { .. } => "addElement",
            Command::CreateConfiguration { .. } => "createConfiguration",
            Command::SetRule { .. } => "setRule",
            Command::RestoreConfiguration { .. } => "restoreConfiguration",
            Command::SetParameter { .. } => "setParameter",
            Command::SaveConfiguration { .. } => "saveConfiguration",
            Command::SetElementSequence { .. } => "setElementSequence",
            Command::SetSequenceAwareness { .. } => "setSequenceAwareness",
        }
    }

    /// Nesting level in the indented layout.
    fn level(&self) -> usize {
        match self {
            Command::CreateDomain { .. } => 0,
            Command::AddElement { .. } | Command::CreateConfiguration { .. } => 1,
            Command::SetParameter { .. } => 3,
            _ => 2,
        }
    }
}

/// Commands recreating one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScript {
    pub domain: String,
    pub commands: Vec<Command>,
}

/// Text layout of a rendered script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One command per line, no indentation
    #[default]
    Flat,
    /// Nested indentation, rules and sequences spread over continuation lines
    Indented,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStyle {
    pub layout: Layout,
    pub indent: String,
}

impl Default for ScriptStyle {
    fn default() -> Self {
        Self {
            layout: Layout::Flat,
            indent: "    ".to_string(),
        }
    }
}

/// Walks a propagated tree and emits the commands of every domain.
pub struct ScriptGenerator<'a> {
    tree: &'a DomainTree,
}

impl<'a> ScriptGenerator<'a> {
    pub fn new(tree: &'a DomainTree) -> Self {
        Self { tree }
    }

    /// Domains in tree order, flattened through group domains.
    #[instrument(level = "debug", skip_all)]
    pub fn generate(&self) -> Vec<DomainScript> {
        self.tree
            .domains()
            .into_iter()
            .map(|domain| self.domain_script(domain))
            .collect()
    }

    fn domain_script(&self, idx: Index) -> DomainScript {
        let tree = self.tree;
        let domain = tree.name(idx).to_string();
        let aware = tree
            .options(idx)
            .is_some_and(|options| options.flag(SEQUENCE_AWARE));
        let configurations = tree.configurations(idx);
        debug!(domain = %domain, configurations = configurations.len(), aware, "domain");

        let mut commands = vec![Command::CreateDomain {
            domain: domain.clone(),
        }];
        // elements of the first listed configuration, direct ones before grouped ones
        if let Some(elements) = tree.configurable_elements(idx).into_iter().next() {
            commands.extend(elements.into_iter().map(|element| Command::AddElement {
                domain: domain.clone(),
                element,
            }));
        }

        for conf in configurations {
            let configuration = tree.name(conf).to_string();
            let paths = tree.path_leaves(conf);

            commands.push(Command::CreateConfiguration {
                domain: domain.clone(),
                configuration: configuration.clone(),
            });
            commands.push(Command::SetRule {
                domain: domain.clone(),
                configuration: configuration.clone(),
                rule: self.root_rule(conf),
            });
            commands.push(Command::RestoreConfiguration {
                domain: domain.clone(),
                configuration: configuration.clone(),
            });
            for &path in &paths {
                commands.push(Command::SetParameter {
                    path: tree.name(path).to_string(),
                    value: tree
                        .options(path)
                        .map(|options| options.get("value").to_string())
                        .unwrap_or_default(),
                });
            }
            commands.push(Command::SaveConfiguration {
                domain: domain.clone(),
                configuration: configuration.clone(),
            });
            if aware {
                commands.push(Command::SetElementSequence {
                    domain: domain.clone(),
                    configuration,
                    elements: paths
                        .iter()
                        .map(|&path| tree.name(path).to_string())
                        .collect(),
                });
                commands.push(Command::SetSequenceAwareness {
                    domain: domain.clone(),
                });
            }
        }

        DomainScript { domain, commands }
    }

    /// A lone operator is the root as-is; anything else is wrapped in `ALL`.
    fn root_rule(&self, conf: Index) -> RuleExpr {
        let rules = self.tree.children_where(conf, NodeKind::is_rule_like);
        match rules.as_slice() {
            [single] if self.tree.kind(*single) == Some(NodeKind::Operator) => {
                self.rule_expr(*single)
            }
            _ => RuleExpr::all(rules.iter().map(|&r| self.rule_expr(r)).collect()),
        }
    }

    fn rule_expr(&self, idx: Index) -> RuleExpr {
        let options = self.tree.options(idx);
        let get = |name: &str| {
            options
                .map(|options| options.get(name).to_string())
                .unwrap_or_default()
        };
        match self.tree.kind(idx) {
            Some(NodeKind::Operator) => RuleExpr::Combinator {
                name: get("Name"),
                children: self
                    .tree
                    .children_where(idx, NodeKind::is_rule_like)
                    .into_iter()
                    .map(|child| self.rule_expr(child))
                    .collect(),
            },
            _ => RuleExpr::Criterion {
                criterion: get("criterion"),
                kind: get("type"),
                element: get("element"),
            },
        }
    }
}

/// Render generated scripts as runtime command text.
pub fn render(scripts: &[DomainScript], style: &ScriptStyle) -> String {
    let mut out = String::new();
    for script in scripts {
        match style.layout {
            Layout::Flat => render_flat(script, &mut out),
            Layout::Indented => render_indented(script, &style.indent, &mut out),
        }
    }
    out
}

fn render_flat(script: &DomainScript, out: &mut String) {
    for command in &script.commands {
        out.push_str(&render_command(command, "", ""));
        out.push('\n');
    }
    out.push('\n');
}

fn render_indented(script: &DomainScript, indent: &str, out: &mut String) {
    let mut commands = script.commands.iter().peekable();
    while let Some(command) = commands.next() {
        let prefix = indent.repeat(command.level());
        let continuation = format!("\\\n{}{}", indent, " ".repeat(prefix.len()));
        out.push_str(&prefix);
        out.push_str(&render_command(command, &continuation, indent));
        out.push('\n');

        // blank line after the element block and after each configuration
        let next = commands.peek();
        let block_ends = match command {
            Command::CreateDomain { .. } | Command::AddElement { .. } => {
                !matches!(next, Some(Command::AddElement { .. }))
            }
            _ => matches!(next, Some(Command::CreateConfiguration { .. }) | None),
        };
        if block_ends {
            out.push('\n');
        }
    }
    out.push('\n');
}

/// `continuation` starts every wrapped line (empty for flat output),
/// `step` indents nested rules one level further.
fn render_command(command: &Command, continuation: &str, step: &str) -> String {
    let verb = command.verb();
    match command {
        Command::CreateDomain { domain } => format!("{verb} {domain}"),
        Command::SetSequenceAwareness { domain } => format!("{verb} {domain} true"),
        Command::AddElement { domain, element } => format!("{verb} {domain} {element}"),
        Command::CreateConfiguration {
            domain,
            configuration,
        }
        | Command::RestoreConfiguration {
            domain,
            configuration,
        }
        | Command::SaveConfiguration {
            domain,
            configuration,
        } => format!("{verb} {domain} {configuration}"),
        Command::SetRule {
            domain,
            configuration,
            rule,
        } => format!(
            "{verb} {domain} {configuration} {}",
            render_rule(rule, continuation, step)
        ),
        Command::SetParameter { path, value } => format!("{verb} {path} {value}"),
        Command::SetElementSequence {
            domain,
            configuration,
            elements,
        } => {
            let head = format!("{verb} {domain} {configuration}");
            if continuation.is_empty() {
                std::iter::once(head.as_str())
                    .chain(elements.iter().map(String::as_str))
                    .join(" ")
            } else {
                let wrapped: String = elements
                    .iter()
                    .map(|element| format!("{continuation}{element}"))
                    .collect();
                format!("{head} {wrapped}")
            }
        }
    }
}

/// `prefix` precedes every criterion and closing brace; children get `prefix + step`.
pub fn render_rule(rule: &RuleExpr, prefix: &str, step: &str) -> String {
    match rule {
        RuleExpr::Criterion {
            criterion,
            kind,
            element,
        } => format!("{prefix}{criterion} {kind} {element}"),
        RuleExpr::Combinator { name, children } => {
            let inner = format!("{prefix}{step}");
            let rendered = children
                .iter()
                .map(|child| render_rule(child, &inner, step))
                .join(" , ");
            format!("{prefix}{}{{ {rendered}{prefix} }}", RuleExpr::keyword(name))
        }
    }
}

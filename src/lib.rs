//! pfwgen: compiles tab-indented parameter-framework domain descriptions
//! into the runtime's command script, or into an XML dump of the tree.
//!
//! Pipeline: [`domain::DomainParser`] builds a [`domain::DomainTree`],
//! [`domain::propagate`] pushes inherited options and rules down to the
//! configurations, and [`application::Compiler`] emits the requested format.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

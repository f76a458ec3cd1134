//! Structural dumps of a tree: XML and the raw debug listing.

use generational_arena::Index;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tracing::instrument;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::DomainTree;

/// Serialize the tree as nested XML elements, one tag per node variant.
///
/// Root, group domains and group configurations are transparent: only
/// their children are written.
#[instrument(level = "debug", skip_all)]
pub fn to_xml(tree: &DomainTree) -> ApplicationResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
    write_node(tree, tree.root(), &mut writer)?;
    let mut xml = String::from_utf8(writer.into_inner()).map_err(|e| ApplicationError::Xml {
        message: e.to_string(),
    })?;
    if !xml.is_empty() {
        xml.push('\n');
    }
    Ok(xml)
}

fn write_node(
    tree: &DomainTree,
    idx: Index,
    writer: &mut Writer<Vec<u8>>,
) -> ApplicationResult<()> {
    let Some(node) = tree.get(idx) else {
        return Ok(());
    };
    if node.kind.is_transparent() {
        for &child in &node.children {
            write_node(tree, child, writer)?;
        }
        return Ok(());
    }

    let tag = node.kind.tag();
    let mut start = BytesStart::new(tag);
    for (key, value) in node.options.iter() {
        start.push_attribute((key, value));
    }

    if !node.children.iter().any(|&child| renders(tree, child)) {
        write(writer, Event::Empty(start))?;
    } else {
        write(writer, Event::Start(start))?;
        for &child in &node.children {
            write_node(tree, child, writer)?;
        }
        write(writer, Event::End(BytesEnd::new(tag)))?;
    }
    Ok(())
}

/// Whether a node contributes any element; empty wrappers contribute none.
fn renders(tree: &DomainTree, idx: Index) -> bool {
    match tree.get(idx) {
        Some(node) if node.kind.is_transparent() => {
            node.children.iter().any(|&child| renders(tree, child))
        }
        Some(_) => true,
        None => false,
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> ApplicationResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ApplicationError::Xml {
            message: e.to_string(),
        })
}

/// Indentation-reproducing listing of the tree, one node per line.
pub fn to_raw(tree: &DomainTree) -> String {
    let mut out = String::new();
    for (_, depth, node) in tree.iter() {
        out.push_str(&"\t".repeat(depth));
        out.push(' ');
        out.push_str(node.kind.tag());
        out.push(' ');
        out.push_str(&node.options.to_string());
        out.push('\n');
    }
    out
}

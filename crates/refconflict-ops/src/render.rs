//! Presenters for analysed reference graphs.
//!
//! Presenters only read the graph; they never change categories.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use refconflict_resolver::conflict::ConflictReport;
use refconflict_resolver::graph::{Category, ModuleNode, ReferenceGraph};
use refconflict_util::errors::RefConflictError;
use serde::Serialize;

const DGML_NAMESPACE: &str = "http://schemas.microsoft.com/vs/2009/dgml";

/// Background colour of a category in DGML output.
pub fn category_color(category: Category) -> &'static str {
    match category {
        Category::EntryPoint => "LightGreen",
        Category::Normal => "White",
        Category::ConflictResolved => "Khaki",
        Category::Conflicted => "LightSalmon",
        Category::Missing => "LightGray",
    }
}

/// Plain listing: every reference, then every module with its category.
pub fn text(graph: &ReferenceGraph) -> String {
    let mut out = String::from("References:\n");
    for (from, to, edge) in graph.edges() {
        out.push_str(&format!(
            "{} -> {} (requested {})\n",
            graph.node(from),
            graph.node(to),
            edge.requested
        ));
    }
    out.push_str("\nModules:\n");
    for (_, node) in graph.nodes() {
        out.push_str(&format!("{node}: {}", node.category().description()));
        if let Some(reason) = node.failure() {
            out.push_str(&format!(" ({reason})"));
        }
        out.push('\n');
    }
    out
}

fn dgml_id(node: &ModuleNode) -> String {
    node.key().to_lowercase()
}

fn xml_error(e: impl std::fmt::Display) -> RefConflictError {
    RefConflictError::Render {
        message: e.to_string(),
    }
}

/// Directed Graph Markup Language document for the graph.
pub fn dgml(graph: &ReferenceGraph) -> Result<String, RefConflictError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;

    let mut root = BytesStart::new("DirectedGraph");
    root.push_attribute(("xmlns", DGML_NAMESPACE));
    root.push_attribute(("GraphDirection", "BottomToTop"));
    root.push_attribute(("Layout", "Sugiyama"));
    writer.write_event(Event::Start(root)).map_err(xml_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("Nodes")))
        .map_err(xml_error)?;
    for (_, node) in graph.nodes() {
        let id = dgml_id(node);
        let label = node.to_string();
        let mut elem = BytesStart::new("Node");
        elem.push_attribute(("Id", id.as_str()));
        elem.push_attribute(("Label", label.as_str()));
        elem.push_attribute(("Category", node.category().as_str()));
        if let Some(reason) = node.failure() {
            elem.push_attribute(("Description", reason));
        }
        writer.write_event(Event::Empty(elem)).map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("Nodes")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("Links")))
        .map_err(xml_error)?;
    for (from, to, edge) in graph.edges() {
        let source = dgml_id(graph.node(from));
        let target = dgml_id(graph.node(to));
        let label = edge.requested.to_string();
        let mut elem = BytesStart::new("Link");
        elem.push_attribute(("Source", source.as_str()));
        elem.push_attribute(("Target", target.as_str()));
        elem.push_attribute(("Label", label.as_str()));
        writer.write_event(Event::Empty(elem)).map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("Links")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("Categories")))
        .map_err(xml_error)?;
    for category in Category::ALL {
        let mut elem = BytesStart::new("Category");
        elem.push_attribute(("Id", category.as_str()));
        elem.push_attribute(("Label", category.description()));
        writer.write_event(Event::Empty(elem)).map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("Categories")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("Styles")))
        .map_err(xml_error)?;
    for category in Category::ALL {
        let mut style = BytesStart::new("Style");
        style.push_attribute(("TargetType", "Node"));
        style.push_attribute(("GroupLabel", category.description()));
        style.push_attribute(("ValueLabel", "True"));
        writer.write_event(Event::Start(style)).map_err(xml_error)?;

        let expression = format!("HasCategory('{}')", category.as_str());
        let mut condition = BytesStart::new("Condition");
        condition.push_attribute(("Expression", expression.as_str()));
        writer.write_event(Event::Empty(condition)).map_err(xml_error)?;

        let mut setter = BytesStart::new("Setter");
        setter.push_attribute(("Property", "Background"));
        setter.push_attribute(("Value", category_color(category)));
        writer.write_event(Event::Empty(setter)).map_err(xml_error)?;

        writer
            .write_event(Event::End(BytesEnd::new("Style")))
            .map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("Styles")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::End(BytesEnd::new("DirectedGraph")))
        .map_err(xml_error)?;

    let mut out = String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)?;
    out.push('\n');
    Ok(out)
}

#[derive(Serialize)]
struct JsonGraph<'a> {
    entry: &'a str,
    nodes: Vec<JsonNode<'a>>,
    edges: Vec<JsonEdge<'a>>,
    conflicts: Vec<JsonConflict>,
}

#[derive(Serialize)]
struct JsonNode<'a> {
    name: &'a str,
    version: String,
    full_name: &'a str,
    category: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonEdge<'a> {
    from: &'a str,
    to: &'a str,
    requested: String,
}

#[derive(Serialize)]
struct JsonConflict {
    name: String,
    versions: Vec<String>,
    highest: String,
    resolved: bool,
}

/// JSON document with the entry point, nodes, edges and conflict groups.
pub fn json(graph: &ReferenceGraph, report: &ConflictReport) -> Result<String, RefConflictError> {
    let doc = JsonGraph {
        entry: graph.node(graph.entry()).key(),
        nodes: graph
            .nodes()
            .map(|(_, n)| JsonNode {
                name: n.name(),
                version: n.version().to_string(),
                full_name: n.key(),
                category: n.category().as_str(),
                failure: n.failure(),
            })
            .collect(),
        edges: graph
            .edges()
            .map(|(from, to, edge)| JsonEdge {
                from: graph.node(from).key(),
                to: graph.node(to).key(),
                requested: edge.requested.to_string(),
            })
            .collect(),
        conflicts: report
            .groups
            .iter()
            .map(|g| JsonConflict {
                name: g.name.clone(),
                versions: g.versions.iter().map(|v| v.to_string()).collect(),
                highest: g.highest.to_string(),
                resolved: g.is_resolved(),
            })
            .collect(),
    };
    let mut out = serde_json::to_string_pretty(&doc).map_err(|e| RefConflictError::Render {
        message: e.to_string(),
    })?;
    out.push('\n');
    Ok(out)
}

/// The reference chain from the entry point to `module`, one module per
/// line with increasing indentation.
pub fn why(graph: &ReferenceGraph, module: &str) -> Option<String> {
    let path = graph.find_path(module)?;
    let mut out = String::new();
    for (depth, node) in path.iter().enumerate() {
        let indent = "  ".repeat(depth);
        out.push_str(&format!("{indent}{node}"));
        if node.category() != Category::Normal {
            out.push_str(&format!(" [{}]", node.category()));
        }
        out.push('\n');
    }
    Some(out)
}

/// Modules that reference `module` directly, each with the version it
/// requested. Empty for the entry point.
pub fn referrers(graph: &ReferenceGraph, module: &str) -> Option<String> {
    let idx = graph
        .find(module)
        .or_else(|| graph.find_by_name(module).into_iter().next())?;
    let mut out = String::new();
    for (from, edge) in graph.dependents_of(idx) {
        out.push_str(&format!(
            "  {} (requested {})\n",
            graph.node(from),
            edge.requested
        ));
    }
    Some(out)
}

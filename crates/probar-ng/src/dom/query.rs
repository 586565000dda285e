//! Native rendition of the DOM query library.
//!
//! Each function mirrors its script counterpart in `scripts/` over a parsed
//! [`Document`], so the local browser answers exactly what a real page would.

use super::document::{Document, NodeId, COMMENT_NODE, TEXT_NODE};
use super::testability::{self, DIRECTIVE_PREFIXES};
use crate::script::bridge::Thrown;

/// Sort nodes into document order and drop repeated references
#[must_use]
pub fn dedup_dom_nodes(mut nodes: Vec<NodeId>) -> Vec<NodeId> {
    if nodes.is_empty() {
        return nodes;
    }
    let mut no_dupes = true;
    nodes.sort_by(|a, b| {
        if a == b {
            no_dupes = false;
        }
        a.cmp(b)
    });
    if !no_dupes {
        nodes.dedup();
    }
    nodes
}

/// Replace text nodes with their parent element, deduplicating only when a
/// replacement happened
#[must_use]
pub fn ensure_elements(doc: &Document, mut nodes: Vec<NodeId>) -> Vec<NodeId> {
    let mut had_text = false;
    for node in &mut nodes {
        if doc.node_type(*node) == TEXT_NODE {
            if let Some(parent) = doc.parent(*node) {
                had_text = true;
                *node = parent;
            }
        }
    }
    if had_text {
        dedup_dom_nodes(nodes)
    } else {
        nodes
    }
}

/// Rows of one repeater under a scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeaterScan {
    /// Rows produced by a single repeated element, one element each
    pub rows: Vec<NodeId>,
    /// Rows produced by start/end segments, every element of the segment
    pub multi_rows: Vec<Vec<NodeId>>,
}

impl RepeaterScan {
    /// Elements of row `index`: the single-element row followed by the segment
    #[must_use]
    pub fn row(&self, index: usize) -> Vec<NodeId> {
        let mut row: Vec<NodeId> = self.rows.get(index).copied().into_iter().collect();
        if let Some(segment) = self.multi_rows.get(index) {
            row.extend_from_slice(segment);
        }
        row
    }

    /// Every row, single-element rows first
    pub fn all_rows(&self) -> impl Iterator<Item = Vec<NodeId>> + '_ {
        self.rows
            .iter()
            .map(|row| vec![*row])
            .chain(self.multi_rows.iter().cloned())
    }
}

fn attribute_matches(doc: &Document, scope: NodeId, attr: &str, repeater: &str) -> Vec<NodeId> {
    doc.elements(scope)
        .filter(|element| doc.attr(*element, attr).is_some_and(|value| value.contains(repeater)))
        .collect()
}

/// Collect every row of `repeater` under `scope`, in both repeat styles
pub fn repeater_rows(doc: &Document, repeater: &str, scope: NodeId) -> Result<RepeaterScan, Thrown> {
    let mut scan = RepeaterScan::default();
    for prefix in DIRECTIVE_PREFIXES {
        scan.rows
            .extend(attribute_matches(doc, scope, &format!("{prefix}repeat"), repeater));
    }
    for prefix in DIRECTIVE_PREFIXES {
        for start in attribute_matches(doc, scope, &format!("{prefix}repeat-start"), repeater) {
            scan.multi_rows.push(segment(doc, start, repeater)?);
        }
    }
    Ok(scan)
}

fn is_repeat_end(doc: &Document, element: NodeId) -> bool {
    DIRECTIVE_PREFIXES
        .iter()
        .any(|prefix| doc.attr(element, &format!("{prefix}repeat-end")).is_some())
}

/// Sibling elements from `start` up to the element marked `repeat-end` or
/// the comment closing the segment
fn segment(doc: &Document, start: NodeId, repeater: &str) -> Result<Vec<NodeId>, Thrown> {
    let mut row = Vec::new();
    let mut node = start;
    loop {
        let closes = doc.node_type(node) == COMMENT_NODE
            && doc.node_value(node).is_some_and(|text| text.contains(repeater));
        if closes {
            return Ok(row);
        }
        if doc.is_element(node) {
            row.push(node);
            if is_repeat_end(doc, node) {
                return Ok(row);
            }
        }
        node = doc.next_sibling(node).ok_or_else(|| {
            Thrown::error(format!("unterminated repeat segment for \"{repeater}\""))
        })?;
    }
}

/// `findBindings`
pub fn find_bindings(
    doc: &Document,
    binding: &str,
    exact: bool,
    scope: NodeId,
) -> Result<Vec<NodeId>, Thrown> {
    let nodes = testability::find_bindings(doc, scope, binding, exact)?;
    Ok(ensure_elements(doc, nodes))
}

/// `findByModel`
#[must_use]
pub fn find_by_model(doc: &Document, model: &str, scope: NodeId) -> Vec<NodeId> {
    testability::find_models(doc, scope, model)
}

/// `findRepeaterRows`: the elements making up row `index`
pub fn find_repeater_rows(
    doc: &Document,
    repeater: &str,
    index: Option<usize>,
    scope: NodeId,
) -> Result<Vec<NodeId>, Thrown> {
    let scan = repeater_rows(doc, repeater, scope)?;
    Ok(index.map(|index| scan.row(index)).unwrap_or_default())
}

/// `findAllRepeaterRows`: every row element of every instance of `repeater`
pub fn find_all_repeater_rows(
    doc: &Document,
    repeater: &str,
    scope: NodeId,
) -> Result<Vec<NodeId>, Thrown> {
    let scan = repeater_rows(doc, repeater, scope)?;
    let mut rows: Vec<NodeId> = scan.multi_rows.into_iter().flatten().collect();
    rows.extend(scan.rows);
    Ok(dedup_dom_nodes(rows))
}

/// Drop one surrounding `{{ }}` from a binding
fn strip_braces(binding: &str) -> &str {
    let binding = binding.strip_prefix("{{").unwrap_or(binding);
    binding.strip_suffix("}}").unwrap_or(binding)
}

/// Bindings on the row elements themselves and anywhere beneath them
fn bindings_within(doc: &Document, elements: &[NodeId], binding: &str) -> Result<Vec<NodeId>, Thrown> {
    let mut matches = Vec::new();
    for element in elements {
        if testability::is_bound_to(doc, *element, binding) {
            matches.push(*element);
        }
        matches.extend(testability::find_bindings(doc, *element, binding, false)?);
    }
    Ok(matches)
}

/// `findRepeaterElement`: the elements bound to `binding` inside row `index`
pub fn find_repeater_element(
    doc: &Document,
    repeater: &str,
    index: Option<usize>,
    binding: &str,
    scope: NodeId,
) -> Result<Vec<NodeId>, Thrown> {
    let binding = strip_braces(binding);
    let scan = repeater_rows(doc, repeater, scope)?;
    let row = index.map(|index| scan.row(index)).unwrap_or_default();
    let matches = bindings_within(doc, &row, binding)?;
    Ok(ensure_elements(doc, matches))
}

/// `findRepeaterColumn`: the elements bound to `binding` in every row
pub fn find_repeater_column(
    doc: &Document,
    repeater: &str,
    binding: &str,
    scope: NodeId,
) -> Result<Vec<NodeId>, Thrown> {
    let binding = strip_braces(binding);
    let scan = repeater_rows(doc, repeater, scope)?;
    let mut matches = Vec::new();
    for row in scan.all_rows() {
        matches.extend(bindings_within(doc, &row, binding)?);
    }
    Ok(dedup_dom_nodes(ensure_elements(doc, matches)))
}

fn button_text(doc: &Document, element: NodeId) -> Option<String> {
    match doc.tag(element)? {
        "button" => {
            let rendered = doc.rendered_text(element);
            Some(if rendered.is_empty() {
                doc.text_content(element)
            } else {
                rendered
            })
        }
        "input" => {
            let kind = doc.attr(element, "type")?.to_ascii_lowercase();
            (kind == "button" || kind == "submit")
                .then(|| doc.attr(element, "value").unwrap_or("").to_string())
        }
        _ => None,
    }
}

fn buttons_where(doc: &Document, scope: NodeId, accept: impl Fn(&str) -> bool) -> Vec<NodeId> {
    doc.elements(scope)
        .filter(|element| button_text(doc, *element).is_some_and(|text| accept(&text)))
        .collect()
}

/// `findByButtonText`: buttons whose text equals `search_text`
#[must_use]
pub fn find_by_button_text(doc: &Document, search_text: &str, scope: NodeId) -> Vec<NodeId> {
    buttons_where(doc, scope, |text| text == search_text)
}

/// `findByPartialButtonText`: buttons whose text contains `search_text`
#[must_use]
pub fn find_by_partial_button_text(doc: &Document, search_text: &str, scope: NodeId) -> Vec<NodeId> {
    buttons_where(doc, scope, |text| text.contains(search_text))
}

/// `findByCssContainingText`
pub fn find_by_css_containing_text(
    doc: &Document,
    selector: &str,
    search_text: &str,
    scope: NodeId,
) -> Result<Vec<NodeId>, Thrown> {
    Ok(doc
        .select(scope, selector)?
        .into_iter()
        .filter(|element| {
            let rendered = doc.rendered_text(*element);
            let text = if rendered.is_empty() {
                doc.text_content(*element)
            } else {
                rendered
            };
            text.contains(search_text)
        })
        .collect())
}

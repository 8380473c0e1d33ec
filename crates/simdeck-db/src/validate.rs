//! Recursive domain-rule validation over active fields.
//!
//! Validation walks the tree the same way the flattener does (active
//! fields only), evaluates each field's domain rules, and produces a
//! [`ValidationReport`]: the subtree's total error count plus rendered
//! diagnostic lines. A field whose value still equals its default is
//! skipped unless it is mandatory. Diagnostic lines for clean fields
//! appear only under `verbose`; container headers appear when verbose or
//! when the subtree below them reported errors.

use crate::context::DeckContext;
use crate::node::{Deck, Entry, FieldSlot, NodeId};
use simdeck_schema::{check_domains, render_violations, DomainContext, FsProbe, Value};

/// Options for a validation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Emit a line for every active field, not just failing ones.
    pub verbose: bool,
}

/// Outcome of a validation pass over a subtree.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Total domain-rule violations in the subtree. 0 = structurally valid.
    pub error_count: usize,
    lines: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    /// Diagnostic lines, indented two spaces per tree depth.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All diagnostic lines joined with newlines.
    pub fn rendered(&self) -> String {
        self.lines.join("\n")
    }
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.render(),
        None => "(unset)".to_string(),
    }
}

/// Evaluate one slot, skipping default-valued optional fields.
fn check_slot(slot: &FieldSlot, domain_ctx: &DomainContext<'_>) -> (usize, String) {
    if slot.is_default() && !slot.spec().mandatory() {
        return (0, display_value(slot.value()));
    }
    let violations = check_domains(slot.value(), &slot.spec().domains, domain_ctx);
    if violations.is_empty() {
        (0, display_value(slot.value()))
    } else {
        (
            violations.len(),
            format!(
                "{}  ERROR: {}",
                display_value(slot.value()),
                render_violations(&violations)
            ),
        )
    }
}

/// Validate the subtree rooted at `node`.
pub fn validate(
    deck: &Deck,
    node: NodeId,
    options: &ValidateOptions,
    ctx: &DeckContext,
) -> ValidationReport {
    let probe = FsProbe;
    let domain_ctx = DomainContext::new(ctx.working_directory.as_deref(), &probe);
    let mut report = ValidationReport::default();
    if deck.size(node) == 0 {
        return report;
    }
    validate_node(deck, node, options, &domain_ctx, 1, &mut report);
    report
}

fn validate_node(
    deck: &Deck,
    id: NodeId,
    options: &ValidateOptions,
    domain_ctx: &DomainContext<'_>,
    depth: usize,
    report: &mut ValidationReport,
) {
    let indent = "  ".repeat(depth);
    let node = deck.node(id);
    let active: Vec<String> = deck.keys(id, true).map(|s| s.to_string()).collect();

    for name in active {
        match node.entry(&name) {
            Some(Entry::Child(child)) => {
                if deck.size(*child) == 0 {
                    continue;
                }
                let child_node = deck.node(*child);
                if let Some(wrapped) = child_node.wrapped() {
                    let (errors, rendered) = check_slot(wrapped, domain_ctx);
                    if errors > 0 || options.verbose {
                        report.lines.push(format!("{}{}: {}", indent, name, rendered));
                    }
                    report.error_count += errors;

                    validate_node(deck, *child, options, domain_ctx, depth + 1, report);
                } else {
                    // Build the child's report first so the header can be
                    // emitted only when something below it needs showing.
                    let mut child_report = ValidationReport::default();
                    validate_node(deck, *child, options, domain_ctx, depth + 1, &mut child_report);
                    if options.verbose || child_report.error_count > 0 {
                        report.lines.push(format!("{}{}:", indent, name));
                        report.lines.extend(child_report.lines);
                    }
                    report.error_count += child_report.error_count;
                }
            }
            Some(Entry::Leaf(slot)) => {
                let (errors, rendered) = check_slot(slot, domain_ctx);
                if errors > 0 || options.verbose {
                    report.lines.push(format!("{}{}: {}", indent, name, rendered));
                }
                report.error_count += errors;
            }
            Some(Entry::Extra(value)) => {
                // No metadata to check; shown only when asked for.
                if options.verbose {
                    report
                        .lines
                        .push(format!("{}{}: {}", indent, name, value.render()));
                }
            }
            None => {}
        }
    }
}

//! SPARQL 1.1 renderer.
//!
//! Renders a [`Query`] to `SELECT` text with:
//! - full IRIs (no `PREFIX` declarations)
//! - `FROM <graph>` for the graph restriction
//! - `EXISTS` / `NOT EXISTS` for scoped tests

use crate::expr::Expr;
use crate::pattern::{Element, GroupPattern};
use crate::query::Query;
use crate::render::QueryRenderer;

const INDENT: &str = "  ";

/// Renders queries as SPARQL text
#[derive(Debug, Clone, Copy, Default)]
pub struct SparqlRenderer;

impl SparqlRenderer {
    fn render_group(&self, group: &GroupPattern, depth: usize, out: &mut String) {
        let pad = INDENT.repeat(depth);
        for element in group.elements() {
            match element {
                Element::Triple(t) => {
                    out.push_str(&format!("{}{} {} {} .\n", pad, t.subject, t.predicate, t.object));
                }
                Element::Group(inner) => {
                    out.push_str(&pad);
                    self.render_block(inner, depth, out);
                    out.push('\n');
                }
                Element::Union(branches) => {
                    out.push_str(&pad);
                    for (i, branch) in branches.iter().enumerate() {
                        if i > 0 {
                            out.push_str(" UNION ");
                        }
                        self.render_block(branch, depth, out);
                    }
                    out.push('\n');
                }
                Element::Optional(inner) => {
                    out.push_str(&pad);
                    out.push_str("OPTIONAL ");
                    self.render_block(inner, depth, out);
                    out.push('\n');
                }
                Element::Filter(expr) => {
                    out.push_str(&format!("{}FILTER({})\n", pad, self.render_expr(expr, depth)));
                }
                Element::Bind { expr, var } => {
                    out.push_str(&format!(
                        "{}BIND({} AS {})\n",
                        pad,
                        self.render_expr(expr, depth),
                        var
                    ));
                }
            }
        }
    }

    /// `{ ... }` with the closing brace at `depth`, no trailing newline
    fn render_block(&self, group: &GroupPattern, depth: usize, out: &mut String) {
        out.push_str("{\n");
        self.render_group(group, depth + 1, out);
        out.push_str(&INDENT.repeat(depth));
        out.push('}');
    }

    fn render_expr(&self, expr: &Expr, depth: usize) -> String {
        match expr {
            Expr::True => "true".to_string(),
            Expr::Term(term) => term.to_string(),
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Exists(group) => format!("NOT {}", self.render_exists(group, depth)),
                other => format!("!{}", self.render_operand(other, depth)),
            },
            Expr::And(l, r) => format!(
                "({} && {})",
                self.render_expr(l, depth),
                self.render_expr(r, depth)
            ),
            Expr::Or(l, r) => format!(
                "({} || {})",
                self.render_expr(l, depth),
                self.render_expr(r, depth)
            ),
            Expr::Compare { op, left, right } => format!(
                "({} {} {})",
                self.render_expr(left, depth),
                op.symbol(),
                self.render_expr(right, depth)
            ),
            Expr::Exists(group) => self.render_exists(group, depth),
            Expr::Coalesce(args) => format!("COALESCE({})", self.render_args(args, depth)),
            Expr::Call { function, args } => {
                format!("{}({})", function.sparql_name(), self.render_args(args, depth))
            }
        }
    }

    fn render_exists(&self, group: &GroupPattern, depth: usize) -> String {
        let mut out = String::from("EXISTS ");
        self.render_block(group, depth, &mut out);
        out
    }

    /// Operand of `!`: parenthesized unless already atomic or bracketed
    fn render_operand(&self, expr: &Expr, depth: usize) -> String {
        match expr {
            Expr::True
            | Expr::Term(_)
            | Expr::And(..)
            | Expr::Or(..)
            | Expr::Compare { .. }
            | Expr::Coalesce(_)
            | Expr::Call { .. } => self.render_expr(expr, depth),
            other => format!("({})", self.render_expr(other, depth)),
        }
    }

    fn render_args(&self, args: &[Expr], depth: usize) -> String {
        args.iter()
            .map(|arg| self.render_expr(arg, depth))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl QueryRenderer for SparqlRenderer {
    fn name(&self) -> &str {
        "sparql"
    }

    fn render(&self, query: &Query) -> String {
        let mut out = String::new();

        out.push_str("SELECT ");
        if query.distinct {
            out.push_str("DISTINCT ");
        }
        out.push_str(&format!("{}\n", query.projection));

        if let Some(graph) = &query.graph {
            out.push_str(&format!("FROM {}\n", graph));
        }

        out.push_str("WHERE ");
        self.render_block(&query.pattern, 0, &mut out);
        out.push('\n');

        if !query.order_by.is_empty() {
            let keys: Vec<_> = query
                .order_by
                .iter()
                .map(|o| format!("{}({})", o.direction.as_str(), o.var))
                .collect();
            out.push_str(&format!("ORDER BY {}\n", keys.join(" ")));
        }
        if let Some(limit) = query.limit {
            out.push_str(&format!("LIMIT {}\n", limit));
        }
        if let Some(offset) = query.offset {
            out.push_str(&format!("OFFSET {}\n", offset));
        }

        out.truncate(out.trim_end().len());
        out
    }
}

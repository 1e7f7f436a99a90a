/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Sheet rendering.
//!
//! A [`SheetNode`] is walked in order against a [`ContextStack`]. The render
//! cursor (anchor cell plus the number of grid rows emitted since the anchor)
//! lives only for the duration of one sheet.

use std::collections::BTreeMap;

use gxl_markup::{
    ChartNode, Conditional, ForLoop, Grid, GridRow, ImageNode, Node, PivotNode, ShapeNode,
    SheetNode, SheetSettings, StyleRule,
};
use gxl_model::{
    Cell, CellRange, CellRef, Chart, Image, Merge, PivotTable, Shape, Sheet, SheetConfig, Style,
    merge_styles,
};

use crate::context::{ContextStack, Scope, Value};
use crate::error::{RenderError, RenderResult};
use crate::eval_context::DiagnosticCollector;
use crate::expand::{expand_cell, expand_text, resolve_value};
use crate::styling::resolve_style;

/// Where the next sequential grid row lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    anchor_row: u32,
    anchor_col: u32,
    row_offset: u32,
}

impl Cursor {
    fn at(cell: CellRef) -> Self {
        Self {
            anchor_row: cell.row,
            anchor_col: cell.col,
            row_offset: 0,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::at(CellRef::new(1, 1))
    }
}

/// Render one sheet node into a [`Sheet`].
pub fn render_sheet(
    node: &SheetNode,
    stack: &mut ContextStack,
    diagnostics: &mut DiagnosticCollector,
) -> RenderResult<Sheet> {
    let mut renderer = SheetRenderer {
        sheet: Sheet::new(node.name.clone()),
        cursor: Cursor::default(),
        style_rules: Vec::new(),
        diagnostics,
    };
    renderer.sheet.config = renderer.sheet_config(&node.settings)?;
    renderer.render_nodes(&node.nodes, stack)?;
    renderer.apply_style_rules();

    let sheet = renderer.sheet;
    tracing::debug!(
        sheet = %sheet.name,
        cells = sheet.cells.len(),
        merges = sheet.merges.len(),
        "rendered sheet"
    );
    Ok(sheet)
}

struct SheetRenderer<'a> {
    sheet: Sheet,
    cursor: Cursor,
    style_rules: Vec<(CellRange, Style)>,
    diagnostics: &'a mut DiagnosticCollector,
}

impl SheetRenderer<'_> {
    fn sheet_config(&self, settings: &SheetSettings) -> RenderResult<SheetConfig> {
        let mut config = SheetConfig::default();
        if let Some(width) = settings.col_width {
            config.default_column_width = width;
        }
        if let Some(height) = settings.row_height {
            config.default_row_height = height;
        }
        if let Some(freeze) = &settings.freeze_pane {
            config.freeze_pane = Some(self.cell_ref(freeze)?);
        }
        if let Some(show) = settings.show_grid_lines {
            config.show_grid_lines = show;
        }
        if let Some(show) = settings.show_headers {
            config.show_row_col_headers = show;
        }
        config.column_widths = settings.columns.clone();
        config.row_heights = settings.rows.clone();
        Ok(config)
    }

    fn cell_ref(&self, reference: &str) -> RenderResult<CellRef> {
        CellRef::from_a1(reference).map_err(|source| self.invalid_reference(reference, source))
    }

    fn cell_range(&self, reference: &str) -> RenderResult<CellRange> {
        CellRange::from_a1(reference).map_err(|source| self.invalid_reference(reference, source))
    }

    fn invalid_reference(&self, reference: &str, source: gxl_model::A1ParseError) -> RenderError {
        RenderError::InvalidReference {
            reference: reference.to_string(),
            sheet: self.sheet.name.clone(),
            source,
        }
    }

    fn render_nodes(&mut self, nodes: &[Node], stack: &mut ContextStack) -> RenderResult<()> {
        for node in nodes {
            self.render_node(node, stack)?;
        }
        Ok(())
    }

    fn render_node(&mut self, node: &Node, stack: &mut ContextStack) -> RenderResult<()> {
        match node {
            Node::Anchor(anchor) => {
                let reference = expand_text(&anchor.reference, stack);
                self.cursor = Cursor::at(self.cell_ref(&reference)?);
            }
            Node::Grid(grid) => self.render_grid(grid, stack)?,
            Node::Merge(merge) => self.sheet.merges.push(Merge {
                range: merge.range.clone(),
            }),
            Node::Image(image) => {
                let image = self.image(image, stack);
                self.sheet.images.push(image);
            }
            Node::Shape(shape) => {
                let shape = self.shape(shape, stack);
                self.sheet.shapes.push(shape);
            }
            Node::Chart(chart) => {
                let chart = self.chart(chart, stack);
                self.sheet.charts.push(chart);
            }
            Node::Pivot(pivot) => {
                let pivot = pivot_table(pivot, stack);
                self.sheet.pivots.push(pivot);
            }
            Node::For(for_loop) => self.render_for(for_loop, stack)?,
            Node::If(conditional) => self.render_if(conditional, stack)?,
            Node::Style(rule) => self.record_style_rule(rule, stack)?,
        }
        Ok(())
    }

    fn render_grid(&mut self, grid: &Grid, stack: &mut ContextStack) -> RenderResult<()> {
        let base_style = resolve_style(&grid.style, stack, &self.sheet.name, self.diagnostics);

        match &grid.reference {
            Some(reference) => {
                let reference = expand_text(reference, stack);
                let start = self.cell_ref(&reference)?;
                let saved = std::mem::replace(&mut self.cursor, Cursor::at(start));
                for row in &grid.rows {
                    self.render_grid_row(row, base_style.as_ref(), stack);
                }
                self.cursor = saved;
            }
            None => {
                for row in &grid.rows {
                    self.render_grid_row(row, base_style.as_ref(), stack);
                }
            }
        }
        Ok(())
    }

    fn render_grid_row(&mut self, row: &GridRow, base_style: Option<&Style>, stack: &ContextStack) {
        let row_index = self.cursor.anchor_row + self.cursor.row_offset;
        for (i, template) in row.cells.iter().enumerate() {
            let col_index = self.cursor.anchor_col + i as u32;
            let content = expand_cell(template, stack);
            let style = merge_styles(base_style, content.style.as_ref());
            tracing::trace!(
                cell = %CellRef::new(row_index, col_index),
                value = %content.text,
                "emit cell"
            );
            self.sheet.cells.push(
                Cell::new(
                    CellRef::new(row_index, col_index),
                    content.text,
                    content.cell_type,
                )
                .with_style(style),
            );
        }
        self.cursor.row_offset += 1;
    }

    fn render_for(&mut self, for_loop: &ForLoop, stack: &mut ContextStack) -> RenderResult<()> {
        let (var, path) = parse_loop_header(&for_loop.header)?;

        let items = match resolve_value(stack, path).as_deref() {
            Some(Value::List(items)) => items.clone(),
            _ => {
                self.diagnostics.warn(
                    Some(self.sheet.name.as_str()),
                    format!("loop source '{}' is not a list; skipping loop", path),
                );
                Vec::new()
            }
        };

        for (index, item) in items.into_iter().enumerate() {
            let mut loop_info = Scope::new();
            loop_info.insert("index".to_string(), Value::Integer(index as i64));
            loop_info.insert("number".to_string(), Value::Integer(index as i64 + 1));

            let mut scope = Scope::new();
            scope.insert(var.to_string(), item);
            scope.insert("loop".to_string(), Value::Map(loop_info));

            stack.push(scope);
            let result = self.render_nodes(&for_loop.body, stack);
            stack.pop();
            result?;
        }
        Ok(())
    }

    fn render_if(&mut self, conditional: &Conditional, stack: &mut ContextStack) -> RenderResult<()> {
        let condition = strip_braces(&conditional.condition);
        let truthy = !condition.is_empty()
            && resolve_value(stack, condition).is_some_and(|value| value.is_truthy());

        if truthy {
            self.render_nodes(&conditional.then_nodes, stack)
        } else {
            self.render_nodes(&conditional.else_nodes, stack)
        }
    }

    fn record_style_rule(&mut self, rule: &StyleRule, stack: &ContextStack) -> RenderResult<()> {
        let Some(reference) = &rule.reference else {
            self.diagnostics.warn(
                Some(self.sheet.name.as_str()),
                format!(
                    "style rule '{}' has no ref and was ignored",
                    rule.name.as_deref().unwrap_or_default()
                ),
            );
            return Ok(());
        };
        let range = self.cell_range(&expand_text(reference, stack))?;
        if let Some(style) = resolve_style(&rule.style, stack, &self.sheet.name, self.diagnostics) {
            self.style_rules.push((range, style));
        }
        Ok(())
    }

    /// Overlay every recorded style rule onto the cells inside its range.
    fn apply_style_rules(&mut self) {
        for (range, style) in &self.style_rules {
            for cell in self
                .sheet
                .cells
                .iter_mut()
                .filter(|c| range.contains(c.reference))
            {
                cell.style = merge_styles(cell.style.as_ref(), Some(style));
            }
        }
    }

    fn size(&mut self, raw: &Option<String>, stack: &ContextStack) -> Option<u32> {
        let text = expand_text(raw.as_deref()?, stack);
        match text.trim().parse::<u32>() {
            Ok(size) => Some(size),
            Err(_) => {
                self.diagnostics
                    .warn(Some(self.sheet.name.as_str()), format!("ignoring size '{}'", text));
                None
            }
        }
    }

    fn image(&mut self, node: &ImageNode, stack: &ContextStack) -> Image {
        Image {
            reference: expand_text(&node.reference, stack),
            source: expand_text(&node.src, stack),
            width: self.size(&node.width, stack),
            height: self.size(&node.height, stack),
        }
    }

    fn shape(&mut self, node: &ShapeNode, stack: &ContextStack) -> Shape {
        Shape {
            reference: expand_text(&node.reference, stack),
            kind: expand_text(&node.kind, stack),
            text: expand_text(&node.text, stack),
            style: expand_text(&node.style, stack),
            width: self.size(&node.width, stack),
            height: self.size(&node.height, stack),
        }
    }

    fn chart(&mut self, node: &ChartNode, stack: &ContextStack) -> Chart {
        Chart {
            reference: expand_text(&node.reference, stack),
            chart_type: expand_text(&node.chart_type, stack),
            data_range: expand_text(&node.data_range, stack),
            title: expand_text(&node.title, stack),
            width: self.size(&node.width, stack),
            height: self.size(&node.height, stack),
        }
    }
}

fn pivot_table(node: &PivotNode, stack: &ContextStack) -> PivotTable {
    PivotTable {
        reference: expand_text(&node.reference, stack),
        source_range: expand_text(&node.source_range, stack),
        rows: split_list(&expand_text(&node.rows, stack)),
        columns: split_list(&expand_text(&node.columns, stack)),
        values: split_list(&expand_text(&node.values, stack)),
        filters: split_list(&expand_text(&node.filters, stack)),
        options: parse_options(&expand_text(&node.options, stack)),
    }
}

/// Split on commas, trimming and dropping empty tokens.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `key=value, flag` pairs. A bare key maps to `"true"`.
fn parse_options(text: &str) -> BTreeMap<String, String> {
    split_list(text)
        .into_iter()
        .map(|token| match token.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (token, "true".to_string()),
        })
        .collect()
}

/// Split a loop header into (variable, path). It must be exactly
/// `<name> in <path>`.
pub fn parse_loop_header(header: &str) -> RenderResult<(&str, &str)> {
    let parts: Vec<&str> = header.split_whitespace().collect();
    match parts.as_slice() {
        [var, "in", path] => Ok((*var, *path)),
        _ => Err(RenderError::InvalidSyntax {
            header: header.to_string(),
        }),
    }
}

/// Accept `cond="{{ flag }}"` as well as `cond="flag"`.
fn strip_braces(condition: &str) -> &str {
    let trimmed = condition.trim();
    trimmed
        .strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
        .map_or(trimmed, str::trim)
}

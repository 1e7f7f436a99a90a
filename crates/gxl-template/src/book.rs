/*
 * book.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Book rendering and import resolution.
//!
//! Book nodes are rendered in declaration order. An `<Import src sheet>` loads
//! another template relative to the importing file, resolves that file's own
//! imports first, and then takes the named sheet from it: a sheet declared
//! locally in the file wins over one the file itself imported.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use gxl_markup::{BookNode, Import, Template};
use gxl_model::{Sheet, Workbook};

use crate::context::{ContextStack, Scope};
use crate::error::{RenderError, RenderResult};
use crate::eval_context::{DiagnosticCollector, RenderOptions};
use crate::evaluator::render_sheet;
use crate::resolver::{SourceLoader, normalize_path, resolve_import_path};

/// Render every sheet of `template` (imports included) against `data`.
pub fn render_book(
    template: &Template,
    data: Scope,
    options: &RenderOptions,
    loader: &dyn SourceLoader,
    diagnostics: &mut DiagnosticCollector,
) -> RenderResult<Workbook> {
    let mut renderer = BookRenderer {
        loader,
        options,
        diagnostics,
        visited: HashSet::new(),
        depth: 0,
    };
    let mut stack = ContextStack::new(data);
    let base_dir = renderer.base_dir(template);

    if let Some(path) = &template.source_path {
        renderer.visited.insert(normalize_path(path));
    }

    let mut workbook = Workbook::new();
    for node in &template.nodes {
        let sheet = match node {
            BookNode::Sheet(sheet) => render_sheet(sheet, &mut stack, renderer.diagnostics)?,
            BookNode::Import(import) => renderer.import(import, &base_dir, &mut stack)?,
        };
        workbook.sheets.push(sheet);
    }

    tracing::debug!(
        book = %template.book.name,
        sheets = workbook.sheets.len(),
        "rendered workbook"
    );
    Ok(workbook)
}

struct BookRenderer<'a> {
    loader: &'a dyn SourceLoader,
    options: &'a RenderOptions,
    diagnostics: &'a mut DiagnosticCollector,
    /// Files on the current import chain.
    visited: HashSet<PathBuf>,
    depth: usize,
}

impl BookRenderer<'_> {
    fn base_dir(&self, template: &Template) -> PathBuf {
        if let Some(parent) = template.source_path.as_deref().and_then(Path::parent) {
            return normalize_path(parent);
        }
        match &self.options.base_dir {
            Some(dir) => normalize_path(dir),
            None => normalize_path(Path::new(".")),
        }
    }

    fn import(
        &mut self,
        import: &Import,
        base_dir: &Path,
        stack: &mut ContextStack,
    ) -> RenderResult<Sheet> {
        let path = resolve_import_path(&import.src, base_dir);

        if self.visited.contains(&path) {
            return Err(RenderError::CircularImport { path });
        }
        if self.depth >= self.options.max_import_depth {
            return Err(RenderError::ImportDepthExceeded {
                path,
                max_depth: self.options.max_import_depth,
            });
        }

        tracing::debug!(path = %path.display(), sheet = %import.sheet, depth = self.depth, "import");
        self.visited.insert(path.clone());
        self.depth += 1;
        let result = self.render_imported(&path, &import.sheet, stack);
        self.depth -= 1;
        self.visited.remove(&path);
        result
    }

    fn render_imported(
        &mut self,
        path: &Path,
        sheet_name: &str,
        stack: &mut ContextStack,
    ) -> RenderResult<Sheet> {
        let bytes = self.loader.load(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => RenderError::MissingFile {
                path: path.to_path_buf(),
            },
            _ => RenderError::Io(err),
        })?;
        let mut template = gxl_markup::parse_bytes(&bytes).map_err(|source| RenderError::Markup {
            path: path.to_path_buf(),
            source,
        })?;
        template.source_path = Some(path.to_path_buf());

        let dir = path.parent().map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
        let mut imported = Vec::new();
        for nested in template.imports() {
            imported.push(self.import(nested, &dir, stack)?);
        }

        if let Some(node) = template.sheet(sheet_name) {
            return render_sheet(node, stack, self.diagnostics);
        }
        imported
            .into_iter()
            .find(|sheet| sheet.name == sheet_name)
            .ok_or_else(|| RenderError::SheetNotFound {
                sheet: sheet_name.to_string(),
                path: path.to_path_buf(),
            })
    }
}

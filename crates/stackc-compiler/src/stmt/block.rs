//! Block compilation and local collection.

use rustc_hash::FxHashMap;
use stackc_ast::{Block, Stmt, TypedefDecl, VarDeclStmt};
use stackc_core::{CompilationError, Span, Type};

use crate::scope::{BlockFrame, BlockScope, Local, Resolver};
use crate::types::resolve_type_with;

use super::{Result, StmtCompiler};

/// Gathers the direct declarations of one block into the [`BlockFrame`]
/// handed to the function node on entry.
///
/// Declarations are resolved in order, so a typedef is usable by the
/// declarations that follow it. Problems are collected rather than
/// returned; the block is still entered with whatever could be laid out.
pub(crate) struct FrameCollector<'s> {
    scope: &'s dyn Resolver,
    frame: BlockFrame,
    /// First declaration of every name in this block.
    declared: FxHashMap<String, Span>,
    typedef_spans: FxHashMap<String, Span>,
    errors: Vec<CompilationError>,
}

impl<'s> FrameCollector<'s> {
    pub fn new(scope: &'s dyn Resolver) -> Self {
        Self {
            scope,
            frame: BlockFrame::new(),
            declared: FxHashMap::default(),
            typedef_spans: FxHashMap::default(),
            errors: Vec::new(),
        }
    }

    pub fn collect(&mut self, stmts: &[Stmt<'_>]) {
        for stmt in stmts {
            match stmt {
                Stmt::VarDecl(decl) => self.add_var_decl(decl),
                Stmt::Typedef(typedef) => self.add_typedef(typedef),
                _ => {}
            }
        }
    }

    pub fn add_var_decl(&mut self, decl: &VarDeclStmt<'_>) {
        let ty = match resolve_type_with(self.scope, &decl.ty, &self.frame.typedefs) {
            Ok(ty) => ty,
            Err(error) => {
                self.errors.push(error);
                return;
            }
        };

        let width = match self.local_width(&ty, decl.span) {
            Ok(width) => width,
            Err(error) => {
                self.errors.push(error);
                return;
            }
        };

        for var in decl.vars {
            let name = var.name.name;
            if let Some(&original_span) = self.declared.get(name) {
                self.errors.push(CompilationError::DuplicateLocalDeclaration {
                    name: name.to_string(),
                    original_span,
                    new_span: var.span,
                });
            } else {
                self.declared.insert(name.to_string(), var.span);
            }
            self.frame
                .locals
                .push(Local::new(name, ty.clone(), width, var.span));
        }
    }

    pub fn add_typedef(&mut self, typedef: &TypedefDecl<'_>) {
        let name = typedef.name.name;
        if self.typedef_spans.contains_key(name) {
            self.errors.push(CompilationError::DuplicateDefinition {
                name: name.to_string(),
                span: typedef.span,
            });
            return;
        }
        match resolve_type_with(self.scope, &typedef.ty, &self.frame.typedefs) {
            Ok(ty) => {
                self.typedef_spans.insert(name.to_string(), typedef.span);
                self.frame.typedefs.push((name.to_string(), ty));
            }
            Err(error) => self.errors.push(error),
        }
    }

    fn local_width(&self, ty: &Type, span: Span) -> Result<u32> {
        if ty.is_void() {
            return Err(CompilationError::InvalidOperation {
                message: "variable declared void".to_string(),
                span,
            });
        }
        self.scope
            .width_of(ty)
            .ok_or_else(|| CompilationError::IncompleteType {
                name: self.scope.describe(ty),
                span,
            })
    }

    pub fn finish(self) -> (BlockFrame, Vec<CompilationError>) {
        (self.frame, self.errors)
    }
}

impl StmtCompiler<'_> {
    /// Compile a block in a scope of its own.
    ///
    /// The block's locals are visible, and hold their frame offsets, from
    /// block entry to block exit.
    pub fn compile_block(&mut self, block: &Block<'_>) -> Result<()> {
        let (frame, errors) = {
            let mut collector = FrameCollector::new(&*self.scope);
            collector.collect(block.stmts);
            collector.finish()
        };
        self.report_all(errors);
        self.compile_in_frame(frame, block.stmts)
    }

    /// Enter `frame`, compile `stmts` inside it, and leave it again.
    pub(crate) fn compile_in_frame(&mut self, frame: BlockFrame, stmts: &[Stmt<'_>]) -> Result<()> {
        let mut block = BlockScope::enter(&mut *self.scope, frame)?;
        let result = StmtCompiler::new(&mut block).compile_statements(stmts);
        block.exit()?;
        result
    }
}

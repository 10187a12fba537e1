//! Shared fixtures: a small reference backend and compiler helpers.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use stencil::{
    Backend, CompilationFailed, CompileError, CompilerOptions, Error, EvalContext, EvalError,
    Evaluate, ExpressionDefinition, LoadedUnit, Profile, SharedBackend, SourceUnit,
    TemplateExpressionCompiler, TemplateShape, Type, Value, parse_template,
};

/// Backend for a toy language: identifiers are variable lookups, integers
/// and single-quoted strings are constants. Templates may only contain
/// such expressions inside `${...}`.
#[derive(Debug, Default)]
pub struct VariableBackend {
    /// Expression texts passed to `compile_expression`, in order.
    pub submitted: Vec<String>,
    pub unit_compiles: usize,
    pub resets: usize,
    /// Variable whose compilation fails with a non-diagnosable error.
    pub explode_on: Option<String>,
}

#[derive(Debug)]
enum Node {
    Constant(Value),
    Variable(String),
    Concat(Vec<String>, Vec<Node>),
}

impl Node {
    fn eval(&self, ctx: &EvalContext) -> Result<Value, EvalError> {
        match self {
            Node::Constant(value) => Ok(value.clone()),
            Node::Variable(name) => ctx
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
            Node::Concat(parts, nodes) => {
                let mut out = parts[0].clone();
                for (node, part) in nodes.iter().zip(&parts[1..]) {
                    out.push_str(&node.eval(ctx)?.to_string());
                    out.push_str(part);
                }
                Ok(Value::Str(out))
            }
        }
    }
}

struct Compiled(Node);

impl Evaluate for Compiled {
    fn evaluate(&self, ctx: &EvalContext) -> Result<Value, EvalError> {
        self.0.eval(ctx)
    }
}

impl VariableBackend {
    fn compile_term(
        &self,
        def: &ExpressionDefinition,
        text: &str,
        offset: usize,
        snippet: &str,
    ) -> Result<Node, Error> {
        let term = text.trim();
        let start = offset + (text.len() - text.trim_start().len());
        if self.explode_on.as_deref() == Some(term) {
            return Err(Error::Backend(format!("out of memory compiling '{}'", term)));
        }
        if let Ok(i) = term.parse::<i64>() {
            return Ok(Node::Constant(Value::Int(i)));
        }
        if term.len() >= 2 && term.starts_with('\'') && term.ends_with('\'') {
            return Ok(Node::Constant(Value::str(&term[1..term.len() - 1])));
        }
        if def.variable_types().contains_key(term) {
            return Ok(Node::Variable(term.to_string()));
        }
        let error = CompileError::new(snippet, 1, format!("Undefined variable '{}'", term))
            .with_span(stencil::Span::new(start, start + term.len()));
        Err(CompilationFailed::single(error, def.expression_text()).into())
    }

    fn compile_node(&self, def: &ExpressionDefinition) -> Result<Node, Error> {
        let text = def.expression_text();
        if !def.is_template() {
            return self.compile_term(def, text, 0, text);
        }

        let parsed = parse_template(text);
        match parsed.shape() {
            TemplateShape::Wrapper(sub) => {
                return self.compile_term(def, sub.body_text(), sub.body.start(), &sub.text);
            }
            // Native integer literal.
            TemplateShape::Literal(literal) => {
                if let Ok(i) = literal.trim().parse::<i64>() {
                    return Ok(Node::Constant(Value::Int(i)));
                }
            }
            TemplateShape::Mixed => {}
        }

        let mut nodes = Vec::new();
        let mut errors = Vec::new();
        for sub in &parsed.expressions {
            match self.compile_term(def, sub.body_text(), sub.body.start(), &sub.text) {
                Ok(node) => nodes.push(node),
                Err(Error::Compilation(failed)) => errors.extend(failed.errors),
                Err(other) => return Err(other),
            }
        }
        if !errors.is_empty() {
            return Err(CompilationFailed::new(errors, text).into());
        }
        Ok(Node::Concat(parsed.literals.clone(), nodes))
    }
}

impl Backend for VariableBackend {
    fn compile(&mut self, unit: &SourceUnit) -> Result<LoadedUnit, Error> {
        self.unit_compiles += 1;
        Ok(LoadedUnit::new(unit.name()))
    }

    fn compile_expression(&mut self, def: &ExpressionDefinition) -> Result<Arc<dyn Evaluate>, Error> {
        self.submitted.push(def.expression_text().to_string());
        let node = self.compile_node(def)?;
        Ok(Arc::new(Compiled(node)))
    }

    fn get_errors(&mut self, def: &ExpressionDefinition) -> Result<Vec<CompileError>, Error> {
        match self.compile_node(def) {
            Ok(_) => Ok(Vec::new()),
            Err(Error::Compilation(failed)) => Ok(failed.errors),
            Err(other) => Err(other),
        }
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}

pub fn compiler() -> TemplateExpressionCompiler<VariableBackend> {
    compiler_with(VariableBackend::default())
}

pub fn compiler_with(backend: VariableBackend) -> TemplateExpressionCompiler<VariableBackend> {
    TemplateExpressionCompiler::new(
        SharedBackend::new(backend),
        CompilerOptions {
            conversion_cache_idle: Duration::from_secs(300),
            ..CompilerOptions::default()
        },
    )
}

pub fn profile() -> Arc<Profile> {
    Arc::new(Profile::new("greeting", Type::named("Person")))
}

/// A template getter over the variables `name`, `age` and `city`.
pub fn template(text: &str, result_type: Type) -> ExpressionDefinition {
    ExpressionDefinition::new(profile(), text)
        .template()
        .with_result_type(result_type)
        .with_variable("name", Type::Str)
        .with_variable("age", Type::Str)
        .with_variable("city", Type::Str)
}

pub fn person() -> EvalContext {
    EvalContext::new()
        .with_variable("name", Value::str("Ann"))
        .with_variable("age", Value::str("5"))
        .with_variable("city", Value::str("Lisbon"))
}

pub fn submitted(compiler: &TemplateExpressionCompiler<VariableBackend>) -> Vec<String> {
    compiler.backend().with_backend(|b| b.submitted.clone())
}

pub fn unit_compiles(compiler: &TemplateExpressionCompiler<VariableBackend>) -> usize {
    compiler.backend().with_backend(|b| b.unit_compiles)
}

/// Compile `$input` as a template of `$ty`, evaluate it against [`person`]
/// and compare, or compare the snippets of the reported errors.
#[macro_export]
macro_rules! test_case {
    (name: $name:ident, input: $input:expr, result_type: $ty:expr, value: $expected:expr $(,)?) => {
        #[test]
        fn $name() {
            use stencil::ExpressionCompiler;
            let compiler = $crate::cases::compiler();
            let expr = compiler
                .compile_expression(&$crate::cases::template($input, $ty))
                .expect("compilation should succeed");
            pretty_assertions::assert_eq!(expr.evaluate(&$crate::cases::person()), Ok($expected));
        }
    };
    (name: $name:ident, input: $input:expr, result_type: $ty:expr, errors: [$($snippet:expr),* $(,)?] $(,)?) => {
        #[test]
        fn $name() {
            use stencil::ExpressionCompiler;
            let compiler = $crate::cases::compiler();
            let err = compiler
                .compile_expression(&$crate::cases::template($input, $ty))
                .expect_err("compilation should fail");
            let snippets: Vec<&str> = err
                .compile_errors()
                .iter()
                .map(|e| e.source_snippet.as_str())
                .collect();
            pretty_assertions::assert_eq!(snippets, vec![$($snippet),*]);
        }
    };
}

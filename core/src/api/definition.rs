//! Compile requests: what to compile, and under which profile.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::conversion::ConversionRegistry;
use crate::position::PositionMapping;
use crate::template::SubExpression;
use crate::types::Type;

/// A named bundle of conversions and a context type shared by a class of
/// expressions.
#[derive(Debug)]
pub struct Profile {
    name: String,
    context_type: Type,
    conversions: ConversionRegistry,
}

impl Profile {
    /// A profile with the standard conversions.
    pub fn new(name: impl Into<String>, context_type: Type) -> Self {
        Self {
            name: name.into(),
            context_type,
            conversions: ConversionRegistry::standard(),
        }
    }

    pub fn with_conversions(mut self, conversions: ConversionRegistry) -> Self {
        self.conversions = conversions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context_type(&self) -> &Type {
        &self.context_type
    }

    pub fn conversions(&self) -> &ConversionRegistry {
        &self.conversions
    }
}

/// Immutable description of one expression to compile.
///
/// # Example
///
/// ```ignore
/// let profile = Arc::new(Profile::new("mail", Type::named("Message")));
/// let def = ExpressionDefinition::new(profile, "Hello ${name}")
///     .template()
///     .with_result_type(Type::Str)
///     .with_variable("name", Type::Str);
/// ```
#[derive(Debug, Clone)]
pub struct ExpressionDefinition {
    profile: Arc<Profile>,
    is_template: bool,
    is_setter: bool,
    expression_text: String,
    header: String,
    context_type: Type,
    result_type: Type,
    variable_types: IndexMap<String, Type>,
    original_expression_text: String,
    position_mapping: PositionMapping,
    root_object_type: Type,
}

impl ExpressionDefinition {
    /// A plain (non-template, getter) expression of result type `Any`. The
    /// text is its own original, with an identity mapping.
    pub fn new(profile: Arc<Profile>, expression_text: impl Into<String>) -> Self {
        let expression_text = expression_text.into();
        let context_type = profile.context_type().clone();
        Self {
            profile,
            is_template: false,
            is_setter: false,
            original_expression_text: expression_text.clone(),
            expression_text,
            header: String::new(),
            root_object_type: context_type.clone(),
            context_type,
            result_type: Type::Any,
            variable_types: IndexMap::new(),
            position_mapping: PositionMapping::identity(),
        }
    }

    pub fn template(mut self) -> Self {
        self.is_template = true;
        self
    }

    pub fn setter(mut self) -> Self {
        self.is_setter = true;
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_result_type(mut self, result_type: Type) -> Self {
        self.result_type = result_type;
        self
    }

    pub fn with_context_type(mut self, context_type: Type) -> Self {
        self.context_type = context_type;
        self
    }

    pub fn with_root_object_type(mut self, root_object_type: Type) -> Self {
        self.root_object_type = root_object_type;
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.variable_types.insert(name.into(), ty);
        self
    }

    /// Definition for one occurrence of this template: a string-typed
    /// template getter whose offsets map back through this definition's
    /// mapping.
    pub fn sub_expression(&self, sub: &SubExpression) -> Self {
        Self {
            profile: Arc::clone(&self.profile),
            is_template: true,
            is_setter: false,
            expression_text: sub.text.clone(),
            header: self.header.clone(),
            context_type: self.context_type.clone(),
            result_type: Type::Str,
            variable_types: self.variable_types.clone(),
            original_expression_text: self.original_expression_text.clone(),
            position_mapping: self.position_mapping.nested(sub.begin()),
            root_object_type: self.root_object_type.clone(),
        }
    }

    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    pub fn is_template(&self) -> bool {
        self.is_template
    }

    pub fn is_setter(&self) -> bool {
        self.is_setter
    }

    pub fn expression_text(&self) -> &str {
        &self.expression_text
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn context_type(&self) -> &Type {
        &self.context_type
    }

    pub fn result_type(&self) -> &Type {
        &self.result_type
    }

    pub fn variable_types(&self) -> &IndexMap<String, Type> {
        &self.variable_types
    }

    pub fn original_expression_text(&self) -> &str {
        &self.original_expression_text
    }

    pub fn position_mapping(&self) -> &PositionMapping {
        &self.position_mapping
    }

    pub fn root_object_type(&self) -> &Type {
        &self.root_object_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parse_template;

    #[test]
    fn sub_expression_composes_mapping() {
        let profile = Arc::new(Profile::new("test", Type::Any));
        let def = ExpressionDefinition::new(profile, "Hi ${name}!")
            .template()
            .setter()
            .with_header("use strings;")
            .with_result_type(Type::Any)
            .with_variable("name", Type::Str);

        let parsed = parse_template(def.expression_text());
        let sub = def.sub_expression(&parsed.expressions[0]);

        assert_eq!(sub.expression_text(), "${name}");
        assert!(sub.is_template());
        assert!(!sub.is_setter());
        assert_eq!(sub.result_type(), &Type::Str);
        assert_eq!(sub.header(), "use strings;");
        assert_eq!(sub.original_expression_text(), "Hi ${name}!");
        assert_eq!(sub.position_mapping().to_original(0), 3);
        assert_eq!(sub.variable_types().get("name"), Some(&Type::Str));
    }
}

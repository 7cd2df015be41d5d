//! Hooks and plain function signatures.

use super::components::unwrap_initializer;
use super::{ClassifyContext, Classified};
use crate::comment::{interpret, ModifierFlag};
use crate::model::{FunctionOrigin, FunctionSignature, Hook, Parameter, VOID_TYPE};
use crate::oracle::{
    declared_return_type, final_return_expression, is_async, is_function_expression, parameters_of,
    type_parameters_of,
};
use crate::type_syntax::{is_hook_name, normalize_whitespace, strip_annotation, CallSignature, TypeShape};
use anyhow::{Context, Result};
use log::debug;
use tree_sitter::Node;

/// Return type of a function-like node: its annotation, else the oracle's type
/// for the final returned expression, else `void`.
fn infer_return_type(ctx: &ClassifyContext<'_>, function: Node<'_>) -> String {
    if let Some(declared) = declared_return_type(function, ctx.source()) {
        return declared;
    }
    let Some(expression) = final_return_expression(function) else {
        return VOID_TYPE.to_string();
    };
    match ctx.oracle.type_of_expression(expression, ctx.source()) {
        Some(inferred) => {
            let is_promise = TypeShape::parse(&inferred)
                .map(|s| s.base_name() == "Promise")
                .unwrap_or(false);
            if is_async(function) && !is_promise {
                format!("Promise<{}>", inferred)
            } else {
                inferred
            }
        }
        None => {
            debug!("Could not infer a return type, using {}", VOID_TYPE);
            VOID_TYPE.to_string()
        }
    }
}

fn is_hook(name: &str, comment: &str) -> bool {
    is_hook_name(name) || interpret(comment).has_flag(ModifierFlag::HookMarker)
}

/// `function name(...) { ... }`: a Hook when the name (or `@hook`) says so, and
/// a Function Signature in every case.
pub fn classify_function_declaration(ctx: &ClassifyContext<'_>, node: Node<'_>) -> Result<Vec<Classified>> {
    let Some(name) = ctx.name_of(node) else {
        return Ok(Vec::new());
    };
    let comment = ctx.leading_comment(node);
    let parameters = parameters_of(node, ctx.source());
    let type_parameters = type_parameters_of(node, ctx.source());
    let return_type = infer_return_type(ctx, node);

    let mut records = Vec::new();
    if is_hook(&name, &comment) {
        debug!("Found hook {}", name);
        records.push(Classified::Hook(Hook {
            name: name.clone(),
            type_parameters: type_parameters.clone(),
            parameters: parameters.clone(),
            return_type: return_type.clone(),
            comment: comment.clone(),
        }));
    }
    records.push(Classified::Function(FunctionSignature {
        name,
        type_parameters,
        parameters,
        return_type,
        comment,
        source_text: ctx.text(node).to_string(),
        origin: FunctionOrigin::Declaration,
    }));
    Ok(records)
}

/// Call signature implied by a declared annotation: a previously registered
/// function type or alias of that name, else the annotation parsed as a call
/// signature.
fn declared_signature(ctx: &ClassifyContext<'_>, declared: &str) -> Option<CallSignature> {
    if let Some(shape) = TypeShape::parse(declared).filter(|s| s.args.is_empty()) {
        if let Some(function) = ctx.model.functions().get(&shape.name) {
            return Some(CallSignature {
                type_parameters: function.type_parameters.clone(),
                parameters: function.parameters.clone(),
                return_type: function.return_type.clone(),
            });
        }
        if let Some(alias) = ctx.model.aliases().get(&shape.name) {
            if let Some(signature) = CallSignature::parse(&alias.type_text) {
                return Some(signature);
            }
        }
    }
    CallSignature::parse(declared)
}

/// Fills parameter types left unannotated from a contextual signature.
fn fill_parameter_types(mut parameters: Vec<Parameter>, signature: Option<&CallSignature>) -> Vec<Parameter> {
    let Some(signature) = signature else {
        return parameters;
    };
    for (index, parameter) in parameters.iter_mut().enumerate() {
        if parameter.type_text.is_none() {
            parameter.type_text = signature
                .parameters
                .get(index)
                .and_then(|p| p.type_text.clone());
        }
    }
    parameters
}

/// Hook and function paths of a variable declarator (after the component
/// paths found nothing).
pub fn classify_function_variable(ctx: &ClassifyContext<'_>, declarator: Node<'_>) -> Result<Vec<Classified>> {
    let name = ctx.name_of(declarator).context("declarator without a name")?;
    let Some(value) = declarator.child_by_field_name("value") else {
        return Ok(Vec::new());
    };
    let comment = ctx.leading_comment(declarator);
    let declared = declarator
        .child_by_field_name("type")
        .map(|t| normalize_whitespace(strip_annotation(ctx.text(t))));
    let signature = declared.as_deref().and_then(|d| declared_signature(ctx, d));

    let innermost = unwrap_initializer(value, ctx.source()).innermost;
    let function = Some(innermost).filter(|n| is_function_expression(n.kind()));

    if is_hook(&name, &comment) {
        let parameters = match function {
            Some(f) => fill_parameter_types(parameters_of(f, ctx.source()), signature.as_ref()),
            None => signature.as_ref().map(|s| s.parameters.clone()).unwrap_or_default(),
        };
        let return_type = function
            .and_then(|f| declared_return_type(f, ctx.source()))
            .or_else(|| signature.as_ref().map(|s| s.return_type.clone()))
            .or_else(|| function.map(|f| infer_return_type(ctx, f)))
            .unwrap_or_else(|| VOID_TYPE.to_string());
        let type_parameters = function
            .and_then(|f| type_parameters_of(f, ctx.source()))
            .or_else(|| signature.as_ref().and_then(|s| s.type_parameters.clone()));

        debug!("Found hook {}", name);
        return Ok(vec![Classified::Hook(Hook {
            name,
            type_parameters,
            parameters,
            return_type,
            comment,
        })]);
    }

    let Some(function) = function else {
        return Ok(Vec::new());
    };

    let return_type = signature
        .as_ref()
        .map(|s| s.return_type.clone())
        .or_else(|| declared_return_type(function, ctx.source()))
        .unwrap_or_else(|| infer_return_type(ctx, function));
    let parameters = fill_parameter_types(parameters_of(function, ctx.source()), signature.as_ref());
    let type_parameters = type_parameters_of(function, ctx.source())
        .or_else(|| signature.as_ref().and_then(|s| s.type_parameters.clone()));
    let statement = declarator
        .parent()
        .filter(|p| matches!(p.kind(), "lexical_declaration" | "variable_declaration"))
        .unwrap_or(declarator);

    Ok(vec![Classified::Function(FunctionSignature {
        name,
        type_parameters,
        parameters,
        return_type,
        comment,
        source_text: ctx.text(statement).to_string(),
        origin: FunctionOrigin::Expression,
    })])
}

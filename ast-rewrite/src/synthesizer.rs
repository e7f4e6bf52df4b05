//! Lowers semantic [`Type`]s into decl-spec and declarator subtrees.
//!
//! A declaration splits a type in two: the decl-spec carries the underlying
//! named or basic type with its qualifiers, the declarator carries the
//! pointer / reference / array / function wrapping around the name. The
//! declarator is built by peeling the type from the outside in.
//!
//! Synthesis is best effort. A type that cannot be classified yields a
//! `void` decl-spec or a bare named declarator, never an error.

use std::collections::VecDeque;

use tracing::warn;

use crate::ast::{NodeKind, NodeRef, PointerOp};
use crate::config::{DeclaratorStyle, RewriteConfig};
use crate::factory::NodeFactory;
use crate::types::{ArraySize, BasicType, Binding, CvQualifiers, Type};

/// Progress of the one-shot decays applied to the outermost layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecayState {
    /// Nothing peeled yet; the outermost layer may still decay.
    Initial,
    /// The outermost array became a pointer to its element.
    PastArrayDecay,
    /// The outermost function became a pointer; the function itself is
    /// peeled next.
    PastFunctionDecay,
    Steady,
}

impl DecayState {
    fn allows_decay(self) -> bool {
        self == DecayState::Initial
    }
}

/// Underlying type of a decl-spec.
enum BaseSpec<'t> {
    Basic(BasicType),
    Named(&'t [String]),
}

/// Pointer operators waiting to be attached to their declarator. Operators
/// are discovered outermost first but render innermost first.
#[derive(Default)]
struct DeferredOperators {
    pending: Vec<(NodeRef, VecDeque<NodeRef>)>,
}

impl DeferredOperators {
    fn push(&mut self, declarator: NodeRef, op: NodeRef) {
        match self.pending.iter_mut().find(|(d, _)| *d == declarator) {
            Some((_, ops)) => ops.push_front(op),
            None => self.pending.push((declarator, VecDeque::from([op]))),
        }
    }

    fn flush(self, factory: &mut NodeFactory) {
        for (declarator, ops) in self.pending {
            factory.prepend_children(declarator, ops.into());
        }
    }
}

pub struct DeclaratorSynthesizer<'f> {
    factory: &'f mut NodeFactory,
    style: DeclaratorStyle,
    max_depth: usize,
}

impl<'f> DeclaratorSynthesizer<'f> {
    pub fn new(factory: &'f mut NodeFactory) -> Self {
        Self::with_config(factory, &RewriteConfig::default())
    }

    pub fn with_config(factory: &'f mut NodeFactory, config: &RewriteConfig) -> Self {
        Self {
            factory,
            style: config.declarator_style,
            max_depth: config.max_type_depth,
        }
    }

    /// Decl-spec for the type underlying `ty`.
    pub fn synthesize_decl_spec(&mut self, ty: &Type) -> NodeRef {
        match self.underlying(ty, 0) {
            Some((BaseSpec::Basic(basic), cv)) => self.factory.simple_decl_spec(basic, cv),
            Some((BaseSpec::Named(segments), cv)) => {
                let name = self.name_node(segments);
                self.factory
                    .add(NodeKind::NamedTypeSpec { cv }, vec![name])
            }
            None => {
                warn!(?ty, "cannot derive decl-spec, falling back to void");
                self.factory
                    .simple_decl_spec(BasicType::VOID, CvQualifiers::NONE)
            }
        }
    }

    /// Declarator naming `name`, in the configured style.
    pub fn synthesize_declarator(&mut self, ty: &Type, name: &str) -> NodeRef {
        let decay_array = self.style == DeclaratorStyle::Assignable;
        self.declarator(ty, Some(name), decay_array)
    }

    /// Declarator for something that must be assignable or returnable: an
    /// outermost array decays to a pointer to its element.
    pub fn synthesize_assignable_declarator(&mut self, ty: &Type, name: &str) -> NodeRef {
        self.declarator(ty, Some(name), true)
    }

    /// `decl-spec declarator;`
    pub fn synthesize_declaration(&mut self, ty: &Type, name: &str) -> NodeRef {
        let spec = self.synthesize_decl_spec(ty);
        let declarator = self.synthesize_declarator(ty, name);
        self.factory
            .add(NodeKind::SimpleDeclaration, vec![spec, declarator])
    }

    pub fn synthesize_parameter(&mut self, ty: &Type, name: &str) -> NodeRef {
        self.parameter(ty, Some(name))
    }

    fn parameter(&mut self, ty: &Type, name: Option<&str>) -> NodeRef {
        let spec = self.synthesize_decl_spec(ty);
        let declarator = if ty.needs_nontrivial_declarator() {
            self.declarator(ty, name, false)
        } else {
            self.bare_declarator(name)
        };
        self.factory
            .add(NodeKind::ParameterDeclaration, vec![spec, declarator])
    }

    fn underlying<'t>(&self, ty: &'t Type, depth: usize) -> Option<(BaseSpec<'t>, CvQualifiers)> {
        if depth > self.max_depth {
            return None;
        }
        match ty {
            Type::Pointer { target, .. }
            | Type::Reference { target, .. }
            | Type::PointerToMember { target, .. } => self.underlying(target, depth + 1),
            Type::Array { element, .. } => self.underlying(element, depth + 1),
            Type::Function { return_type, .. } => self.underlying(return_type, depth + 1),
            Type::Qualifier { target, cv } => {
                let (base, inner) = self.underlying(target, depth + 1)?;
                if strip_qualifiers(target).is_pointer_like() {
                    // cv belongs to the pointer operator
                    Some((base, inner))
                } else {
                    Some((base, inner.merge(*cv)))
                }
            }
            Type::Basic(basic) => Some((BaseSpec::Basic(*basic), CvQualifiers::NONE)),
            Type::Binding(binding) if is_well_formed(binding) => {
                Some((BaseSpec::Named(&binding.qualified_name), CvQualifiers::NONE))
            }
            Type::Binding(_) | Type::Problem { .. } => None,
        }
    }

    fn declarator(&mut self, ty: &Type, name: Option<&str>, decay_array: bool) -> NodeRef {
        match self.peel(ty, name, decay_array) {
            Some(Some(declarator)) => declarator,
            Some(None) => self.bare_declarator(name),
            None => {
                warn!(?ty, "declarator synthesis gave up, using bare name");
                self.bare_declarator(name)
            }
        }
    }

    /// Runs the peeling loop. `Some(None)` means the type needed no
    /// declarator wrapping; `None` means synthesis gave up.
    fn peel(
        &mut self,
        ty: &Type,
        name: Option<&str>,
        decay_array: bool,
    ) -> Option<Option<NodeRef>> {
        let mut deferred = DeferredOperators::default();
        let mut current: Option<NodeRef> = None;
        let mut state = DecayState::Initial;
        let mut pending_cv = CvQualifiers::NONE;
        let mut ty = ty;
        let mut layers = 0;

        while ty.needs_nontrivial_declarator() {
            layers += 1;
            if layers > self.max_depth {
                return None;
            }
            let next_state = match ty {
                Type::Qualifier { target, cv } => {
                    pending_cv = pending_cv.merge(*cv);
                    ty = target;
                    continue;
                }
                Type::Array { element, .. } if decay_array && state.allows_decay() => {
                    current = Some(self.decayed_declarator(name));
                    ty = element;
                    DecayState::PastArrayDecay
                }
                Type::Function { .. } if state.allows_decay() => {
                    // The function itself is peeled on the next pass.
                    current = Some(self.decayed_declarator(name));
                    DecayState::PastFunctionDecay
                }
                Type::Array { .. } => {
                    let mut modifiers = Vec::new();
                    loop {
                        match ty {
                            Type::Array { element, size } => {
                                modifiers.push(self.array_modifier(size.as_ref()));
                                ty = element;
                            }
                            Type::Qualifier { target, .. }
                                if matches!(strip_qualifiers(target), Type::Array { .. }) =>
                            {
                                ty = target;
                            }
                            _ => break,
                        }
                    }
                    let inner = self.inner_child(current, name);
                    let mut children = vec![inner];
                    children.extend(modifiers);
                    current = Some(self.factory.add(NodeKind::ArrayDeclarator, children));
                    DecayState::Steady
                }
                Type::Pointer { target, cv } => {
                    let op = self
                        .factory
                        .pointer_operator(PointerOp::Pointer(cv.merge(pending_cv)), None);
                    let declarator = self.current_or_named(&mut current, name);
                    deferred.push(declarator, op);
                    ty = target;
                    DecayState::Steady
                }
                Type::Reference { target, rvalue } => {
                    let op = self
                        .factory
                        .pointer_operator(PointerOp::Reference { rvalue: *rvalue }, None);
                    let declarator = self.current_or_named(&mut current, name);
                    deferred.push(declarator, op);
                    ty = target;
                    DecayState::Steady
                }
                Type::PointerToMember { target, class, cv } => {
                    if !is_well_formed(class) {
                        return None;
                    }
                    let class_name = self.name_node(&class.qualified_name);
                    let op = self.factory.pointer_operator(
                        PointerOp::PointerToMember(cv.merge(pending_cv)),
                        Some(class_name),
                    );
                    let declarator = self.current_or_named(&mut current, name);
                    deferred.push(declarator, op);
                    ty = target;
                    DecayState::Steady
                }
                Type::Function {
                    return_type,
                    parameters,
                    varargs,
                } => {
                    let params: Vec<NodeRef> = parameters
                        .iter()
                        .map(|param| self.parameter(param, None))
                        .collect();
                    let inner = self.inner_child(current, name);
                    let mut children = vec![inner];
                    children.extend(params);
                    current = Some(self.factory.add(
                        NodeKind::FunctionDeclarator { varargs: *varargs },
                        children,
                    ));
                    ty = return_type;
                    DecayState::Steady
                }
                Type::Basic(_) | Type::Binding(_) | Type::Problem { .. } => return None,
            };
            pending_cv = CvQualifiers::NONE;
            state = next_state;
        }

        deferred.flush(self.factory);
        Some(current)
    }

    /// `*name`, with the operator attached immediately.
    fn decayed_declarator(&mut self, name: Option<&str>) -> NodeRef {
        let op = self
            .factory
            .pointer_operator(PointerOp::Pointer(CvQualifiers::NONE), None);
        let name = self.name_or_placeholder(name);
        self.factory.add(NodeKind::Declarator, vec![op, name])
    }

    fn current_or_named(&mut self, current: &mut Option<NodeRef>, name: Option<&str>) -> NodeRef {
        match current {
            Some(declarator) => *declarator,
            None => {
                let declarator = self.bare_declarator(name);
                *current = Some(declarator);
                declarator
            }
        }
    }

    /// The requested name when nothing was built yet, the declarator built
    /// so far otherwise (which then nests inside the new one).
    fn inner_child(&mut self, current: Option<NodeRef>, name: Option<&str>) -> NodeRef {
        match current {
            Some(nested) => nested,
            None => self.name_or_placeholder(name),
        }
    }

    fn bare_declarator(&mut self, name: Option<&str>) -> NodeRef {
        let name = self.name_or_placeholder(name);
        self.factory.add(NodeKind::Declarator, vec![name])
    }

    fn name_or_placeholder(&mut self, name: Option<&str>) -> NodeRef {
        match name {
            Some(name) => self.factory.name(name),
            None => self.factory.placeholder_name(),
        }
    }

    fn array_modifier(&mut self, size: Option<&ArraySize>) -> NodeRef {
        let size = size.map(|size| match size {
            ArraySize::Value { value } => self.factory.token(value.to_string()),
            ArraySize::Expression { text } => self.factory.token(text.clone()),
        });
        self.factory
            .add(NodeKind::ArrayModifier, size.into_iter().collect())
    }

    fn name_node(&mut self, segments: &[String]) -> NodeRef {
        if let [single] = segments {
            return self.factory.name(single.clone());
        }
        let names = segments
            .iter()
            .map(|segment| self.factory.name(segment.clone()))
            .collect();
        self.factory.add(NodeKind::QualifiedName, names)
    }
}

fn strip_qualifiers(mut ty: &Type) -> &Type {
    while let Type::Qualifier { target, .. } = ty {
        ty = target;
    }
    ty
}

fn is_well_formed(binding: &Binding) -> bool {
    !binding.qualified_name.is_empty() && binding.qualified_name.iter().all(|s| !s.is_empty())
}

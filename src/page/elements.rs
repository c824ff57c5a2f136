use bevy::prelude::*;

/// What kind of element a page entity stands for.
///
/// Only the tags the cursor cares about are distinguished; everything else
/// is a plain container or inline span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Anchor,
    Button,
    Input,
    TextArea,
    Select,
    Div,
    Span,
    Section,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AriaRole {
    Button,
    Presentation,
}

/// A laid-out element of the page
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PageElement {
    pub kind: ElementKind,
    /// Carries the "magnetic" marker
    pub magnetic: bool,
    pub role: Option<AriaRole>,
    /// Layout box in page coordinates (top-left of the document)
    pub bounds: Rect,
    /// Stacking order; higher paints (and hit-tests) on top
    pub layer: u32,
}

impl PageElement {
    pub fn new(kind: ElementKind, bounds: Rect) -> Self {
        Self {
            kind,
            magnetic: false,
            role: None,
            bounds,
            layer: 0,
        }
    }

    pub fn magnetic(mut self) -> Self {
        self.magnetic = true;
        self
    }

    pub fn with_role(mut self, role: AriaRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn on_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// Does this element itself match the interactive predicate?
    pub fn is_interactive(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Anchor
                | ElementKind::Button
                | ElementKind::Input
                | ElementKind::TextArea
                | ElementKind::Select
        ) || self.magnetic
            || self.role == Some(AriaRole::Button)
    }
}

/// The element this one is nested in
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainedBy(pub Entity);

/// True if the element or any of its containers is interactive.
///
/// `chain` starts at the event target and walks outwards.
pub fn closest_interactive<'a>(chain: impl IntoIterator<Item = &'a PageElement>) -> bool {
    chain.into_iter().any(PageElement::is_interactive)
}

/// Collect the target and its containers, innermost first
pub fn ancestor_chain<'a>(
    target: Entity,
    elements: &'a Query<(&PageElement, Option<&ContainedBy>)>,
) -> Vec<&'a PageElement> {
    let mut chain = Vec::new();
    let mut current = Some(target);

    while let Some(entity) = current {
        let Ok((element, contained_by)) = elements.get(entity) else {
            break;
        };
        chain.push(element);
        current = contained_by.map(|c| c.0);

        // guard against accidental cycles
        if chain.len() > 64 {
            break;
        }
    }

    chain
}

/// Topmost element under `point`, in page coordinates.
///
/// Highest layer wins; among equal layers the smallest box wins, since
/// nested elements sit inside their containers.
pub fn hit_test<'a, I>(point: Vec2, elements: I) -> Option<Entity>
where
    I: IntoIterator<Item = (Entity, &'a PageElement)>,
{
    elements
        .into_iter()
        .filter(|(_, element)| element.bounds.contains(point))
        .max_by(|(_, a), (_, b)| {
            a.layer.cmp(&b.layer).then_with(|| {
                let area_a = a.bounds.width() * a.bounds.height();
                let area_b = b.bounds.width() * b.bounds.height();
                area_b.total_cmp(&area_a)
            })
        })
        .map(|(entity, _)| entity)
}

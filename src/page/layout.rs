use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;

use crate::{
    camera::{BACKDROP_LAYER, ScreenSpace},
    input::ScrollState,
    page::elements::{AriaRole, ContainedBy, ElementKind, PageElement},
};

const INK: Color = Color::srgb(0.07, 0.07, 0.08);
const PAPER: Color = Color::srgb(0.98, 0.98, 0.98);
const RULE: Color = Color::srgba(0.0, 0.0, 0.0, 0.1);

const NAV_ITEMS: [&str; 5] = ["HOME", "ABOUT", "WORK", "PROJECTS", "CONTACT"];

/// Viewport-tall sections stacked below the hero
const FOLD_SECTIONS: [&str; 4] = ["ABOUT", "WORK", "PROJECTS", "CONTACT"];

/// Where an element sits on the page.
///
/// `anchor` is the fractional position of the element's center in
/// viewport units (0,0 = top-left of the page, 1,1 = bottom-right of the
/// first screen, y = 1.5 is the middle of the second screen); `size` is in
/// logical pixels.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct LayoutSlot {
    pub anchor: Vec2,
    pub size: Vec2,
}

impl LayoutSlot {
    pub fn new(anchor: Vec2, size: Vec2) -> Self {
        Self { anchor, size }
    }

    pub fn bounds(&self, screen: &ScreenSpace) -> Rect {
        Rect::from_center_size(self.anchor * screen.size, self.size)
    }
}

/// Visual displacement applied on top of the layout box (pixels, y down)
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct ElementOffset(pub Vec2);

/// The panel hosting the 3D doodle
#[derive(Component)]
pub struct DoodlePanel;

/// The span whose text the typewriter drives
#[derive(Component)]
pub struct RoleText;

/// Spawn the hero page. Pure presentation: boxes, labels and nesting.
pub fn spawn_page(
    mut commands: Commands,
    screen: Res<ScreenSpace>,
) {
    let screen = *screen;

    let hero = spawn_element(
        &mut commands,
        &screen,
        PageElement::new(ElementKind::Section, Rect::default()),
        LayoutSlot::new(Vec2::new(0.5, 0.5), screen.size),
        PAPER,
        None,
        None,
    );

    // Logo and navigation
    spawn_element(
        &mut commands,
        &screen,
        PageElement::new(ElementKind::Anchor, Rect::default()).on_layer(1),
        LayoutSlot::new(Vec2::new(0.12, 0.06), Vec2::new(48.0, 28.0)),
        PAPER,
        Some("VP"),
        Some(hero),
    );

    let nav = spawn_element(
        &mut commands,
        &screen,
        PageElement::new(ElementKind::Div, Rect::default()).on_layer(1),
        LayoutSlot::new(Vec2::new(0.7, 0.06), Vec2::new(460.0, 32.0)),
        PAPER,
        None,
        Some(hero),
    );

    for (i, item) in NAV_ITEMS.iter().enumerate() {
        let x = 0.7 + (i as f32 - 2.0) * (92.0 / screen.width());
        spawn_element(
            &mut commands,
            &screen,
            PageElement::new(ElementKind::Anchor, Rect::default()).on_layer(2),
            LayoutSlot::new(Vec2::new(x, 0.06), Vec2::new(84.0, 24.0)),
            PAPER,
            Some(item),
            Some(nav),
        );
    }

    spawn_element(
        &mut commands,
        &screen,
        PageElement::new(ElementKind::Div, Rect::default()).on_layer(1),
        LayoutSlot::new(Vec2::new(0.5, 0.1), Vec2::new(screen.width() * 0.8, 1.0)),
        RULE,
        None,
        Some(hero),
    );

    // Hero copy
    spawn_element(
        &mut commands,
        &screen,
        PageElement::new(ElementKind::Div, Rect::default()).on_layer(1),
        LayoutSlot::new(Vec2::new(0.3, 0.24), Vec2::new(520.0, 72.0)),
        PAPER,
        Some("VEDANT PATIL"),
        Some(hero),
    );

    let role = spawn_element(
        &mut commands,
        &screen,
        PageElement::new(ElementKind::Span, Rect::default()).on_layer(1),
        LayoutSlot::new(Vec2::new(0.3, 0.32), Vec2::new(360.0, 20.0)),
        PAPER,
        Some(""),
        Some(hero),
    );
    commands.entity(role).insert(RoleText);

    spawn_element(
        &mut commands,
        &screen,
        PageElement::new(ElementKind::Span, Rect::default()).on_layer(1),
        LayoutSlot::new(Vec2::new(0.3, 0.37), Vec2::new(420.0, 20.0)),
        PAPER,
        Some("\"Architecting the bridge between edge and cloud\""),
        Some(hero),
    );

    // Calls to action pull toward the pointer
    for (i, label) in ["View My Work", "Download Resume"].iter().enumerate() {
        spawn_element(
            &mut commands,
            &screen,
            PageElement::new(ElementKind::Anchor, Rect::default())
                .magnetic()
                .on_layer(1),
            LayoutSlot::new(
                Vec2::new(0.2 + i as f32 * (180.0 / screen.width()), 0.46),
                Vec2::new(160.0, 44.0),
            ),
            INK,
            Some(label),
            Some(hero),
        );
    }

    let doodle = spawn_element(
        &mut commands,
        &screen,
        PageElement::new(ElementKind::Div, Rect::default())
            .with_role(AriaRole::Presentation)
            .on_layer(1),
        LayoutSlot::new(Vec2::new(0.68, 0.62), Vec2::new(560.0, 420.0)),
        Color::NONE,
        None,
        Some(hero),
    );
    commands.entity(doodle).insert(DoodlePanel);

    for (i, heading) in FOLD_SECTIONS.iter().enumerate() {
        let section = spawn_element(
            &mut commands,
            &screen,
            PageElement::new(ElementKind::Section, Rect::default()),
            LayoutSlot::new(Vec2::new(0.5, i as f32 + 1.5), screen.size),
            PAPER,
            None,
            None,
        );
        spawn_element(
            &mut commands,
            &screen,
            PageElement::new(ElementKind::Div, Rect::default()).on_layer(1),
            LayoutSlot::new(Vec2::new(0.2, i as f32 + 1.12), Vec2::new(240.0, 40.0)),
            PAPER,
            Some(heading),
            Some(section),
        );
    }

    info!(
        "Page composed: {} nav items, {} sections",
        NAV_ITEMS.len(),
        FOLD_SECTIONS.len() + 1
    );
}

fn spawn_element(
    commands: &mut Commands,
    screen: &ScreenSpace,
    mut element: PageElement,
    slot: LayoutSlot,
    fill: Color,
    label: Option<&str>,
    parent: Option<Entity>,
) -> Entity {
    element.bounds = slot.bounds(screen);
    let center = screen.to_world(element.bounds.center());
    let z = element.layer as f32 * 0.1;
    let text_color = if fill == INK { PAPER } else { INK };
    let kind = element.kind;

    let mut entity = commands.spawn((
        Sprite::from_color(fill, slot.size),
        Transform::from_translation(center.extend(z)),
        ElementOffset::default(),
        slot,
        element,
    ));

    if let Some(label) = label {
        entity.with_child((
            Text2d::new(label),
            TextFont::from_font_size(14.0),
            TextColor(text_color),
            Transform::from_xyz(0.0, 0.0, 0.05),
        ));
    }
    if let Some(parent) = parent {
        entity.insert(ContainedBy(parent));
    }
    // Backgrounds go under the node canvas
    if kind == ElementKind::Section {
        entity.insert(RenderLayers::layer(BACKDROP_LAYER));
    }

    entity.id()
}

/// Recompute layout boxes after the viewport changes size
pub fn relayout_on_resize(
    screen: Res<ScreenSpace>,
    mut elements: Query<(&LayoutSlot, &mut PageElement, &mut Sprite)>,
) {
    if !screen.is_changed() {
        return;
    }

    for (slot, mut element, mut sprite) in &mut elements {
        // Sections always fill the viewport
        let size = if element.kind == ElementKind::Section {
            screen.size
        } else {
            slot.size
        };
        let slot = LayoutSlot::new(slot.anchor, size);
        element.bounds = slot.bounds(&screen);
        sprite.custom_size = Some(size);
    }
}

/// Bottom edge of the laid-out page, never shorter than the viewport
pub fn content_height<'a>(
    elements: impl IntoIterator<Item = &'a PageElement>,
    viewport_height: f32,
) -> f32 {
    elements
        .into_iter()
        .map(|element| element.bounds.max.y)
        .fold(viewport_height, f32::max)
}

/// Keep the scrollable height in step with the layout
pub fn measure_content_height(
    screen: Res<ScreenSpace>,
    mut scroll: ResMut<ScrollState>,
    elements: Query<&PageElement>,
) {
    let height = content_height(&elements, screen.height());
    let max = (height - screen.height()).max(0.0);
    if scroll.content_height != height || scroll.offset > max {
        scroll.content_height = height;
        scroll.offset = scroll.offset.min(max);
    }
}

/// Place sprites at their layout box plus any applied offset, scrolled
pub fn sync_element_transforms(
    screen: Res<ScreenSpace>,
    scroll: Res<ScrollState>,
    mut elements: Query<(&PageElement, &ElementOffset, &mut Transform)>,
) {
    for (element, offset, mut transform) in &mut elements {
        let center = scroll.to_viewport(element.bounds.center() + offset.0);
        let world = screen.to_world(center);
        transform.translation.x = world.x;
        transform.translation.y = world.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_bounds_follow_screen() {
        let slot = LayoutSlot::new(Vec2::new(0.5, 0.25), Vec2::new(100.0, 40.0));

        let small = slot.bounds(&ScreenSpace::new(800.0, 600.0));
        assert_eq!(small.center(), Vec2::new(400.0, 150.0));
        assert_eq!(small.size(), Vec2::new(100.0, 40.0));

        let large = slot.bounds(&ScreenSpace::new(1600.0, 1200.0));
        assert_eq!(large.center(), Vec2::new(800.0, 300.0));
        assert_eq!(large.size(), Vec2::new(100.0, 40.0));
    }

    fn page_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(ScreenSpace::new(1000.0, 800.0))
            .init_resource::<ScrollState>()
            .add_systems(Startup, spawn_page)
            .add_systems(
                PostUpdate,
                (relayout_on_resize, measure_content_height, sync_element_transforms).chain(),
            );
        app.update();
        app
    }

    fn hero(app: &mut App) -> (Entity, Vec3) {
        let mut elements = app
            .world_mut()
            .query::<(Entity, &PageElement, &LayoutSlot, &Transform)>();
        elements
            .iter(app.world())
            .find(|(_, e, slot, _)| e.kind == ElementKind::Section && slot.anchor.y == 0.5)
            .map(|(entity, _, _, transform)| (entity, transform.translation))
            .unwrap()
    }

    #[test]
    fn test_content_height_comes_from_layout() {
        let mut app = page_app();
        // hero plus four sections, each a viewport tall
        assert_eq!(app.world().resource::<ScrollState>().content_height, 4000.0);

        app.insert_resource(ScreenSpace::new(1000.0, 600.0));
        app.update();
        assert_eq!(app.world().resource::<ScrollState>().content_height, 3000.0);
    }

    #[test]
    fn test_scrolling_moves_the_page() {
        let mut app = page_app();
        let (_, before) = hero(&mut app);
        assert_eq!(before.y, 0.0);

        app.world_mut()
            .resource_mut::<ScrollState>()
            .scroll_by(300.0, 800.0);
        app.update();

        // content moves up on screen as the page scrolls down
        let (_, after) = hero(&mut app);
        assert_eq!(after.y, 300.0);
    }

    #[test]
    fn test_shrinking_clamps_scroll_offset() {
        let mut app = page_app();
        app.world_mut().resource_mut::<ScrollState>().offset = 3200.0;
        app.update();
        assert_eq!(app.world().resource::<ScrollState>().offset, 3200.0);

        // 5 sections of 600 leave 2400 px to scroll
        app.insert_resource(ScreenSpace::new(1000.0, 600.0));
        app.update();
        assert_eq!(app.world().resource::<ScrollState>().offset, 2400.0);
    }

    #[test]
    fn test_sections_render_on_the_backdrop() {
        let mut app = page_app();
        let (hero, _) = hero(&mut app);
        let layers = app.world().get::<RenderLayers>(hero).unwrap();
        assert_eq!(*layers, RenderLayers::layer(BACKDROP_LAYER));
    }
}

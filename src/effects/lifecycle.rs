//! Subscription bookkeeping for effect views.
//!
//! Every effect that listens to input or redraws per frame is owned by a
//! view entity. Activating a view takes subscriptions from the
//! [`Subscriptions`] registry and parks the tokens on the view as
//! [`ViewSubscriptions`]. Tearing the view down cancels those tokens and the
//! registry sweeps them at the end of the frame. Per-frame systems are gated
//! with [`subscribed`], so once a view is gone nothing it started can run
//! again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    PointerMove,
    PointerOver,
    PointerLeave,
    AnimationFrame,
    Resize,
    Scroll,
    Timer,
}

/// Shared cancellation flag handed out with each subscription
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct Subscription {
    view: Entity,
    kind: SubscriptionKind,
    token: CancelToken,
}

/// Registry of every live subscription
#[derive(Resource, Debug, Default)]
pub struct Subscriptions {
    entries: Vec<Subscription>,
}

impl Subscriptions {
    pub fn subscribe(&mut self, view: Entity, kind: SubscriptionKind) -> CancelToken {
        let token = CancelToken::default();
        self.entries.push(Subscription {
            view,
            kind,
            token: token.clone(),
        });
        token
    }

    /// Take several subscriptions for one view
    #[must_use = "dropping the holder cancels the subscriptions"]
    pub fn subscribe_all(&mut self, view: Entity, kinds: &[SubscriptionKind]) -> ViewSubscriptions {
        ViewSubscriptions(kinds.iter().map(|&kind| self.subscribe(view, kind)).collect())
    }

    /// Cancel and drop every subscription owned by `view`.
    /// Returns how many were released.
    pub fn release_view(&mut self, view: Entity) -> usize {
        let before = self.entries.len();
        self.entries.retain(|sub| {
            if sub.view == view {
                sub.token.cancel();
                false
            } else {
                true
            }
        });
        before - self.entries.len()
    }

    pub fn release_all(&mut self) -> usize {
        for sub in &self.entries {
            sub.token.cancel();
        }
        let released = self.entries.len();
        self.entries.clear();
        released
    }

    /// Drop entries whose token was cancelled from the holder's side.
    /// Returns how many were dropped.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|sub| !sub.token.is_cancelled());
        before - self.entries.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_live(&self, kind: SubscriptionKind) -> bool {
        self.entries
            .iter()
            .any(|sub| sub.kind == kind && !sub.token.is_cancelled())
    }

    pub fn is_live_for(&self, view: Entity, kind: SubscriptionKind) -> bool {
        self.entries
            .iter()
            .any(|sub| sub.view == view && sub.kind == kind && !sub.token.is_cancelled())
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|sub| !sub.token.is_cancelled())
            .count()
    }

    #[cfg(test)]
    pub fn live_count_for(&self, view: Entity) -> usize {
        self.entries
            .iter()
            .filter(|sub| sub.view == view && !sub.token.is_cancelled())
            .count()
    }
}

/// Run condition: at least one live subscription of `kind`
pub fn subscribed(kind: SubscriptionKind) -> impl FnMut(Option<Res<Subscriptions>>) -> bool + Clone {
    move |subs: Option<Res<Subscriptions>>| subs.is_some_and(|subs| subs.is_live(kind))
}

/// Run condition: a view carrying `V` holds a live subscription of `kind`
pub fn view_subscribed<V: Component>(
    kind: SubscriptionKind,
) -> impl FnMut(Option<Res<Subscriptions>>, Query<Entity, With<V>>) -> bool + Clone {
    move |subs: Option<Res<Subscriptions>>, views: Query<Entity, With<V>>| {
        subs.is_some_and(|subs| views.iter().any(|view| subs.is_live_for(view, kind)))
    }
}

/// Marks an entity that owns effect subscriptions
#[derive(Component, Debug, Clone, Copy)]
pub struct EffectView {
    pub name: &'static str,
}

/// Tokens a view holds for its subscriptions.
///
/// Dropping the holder (despawning the view) cancels them.
#[derive(Component, Debug, Default)]
pub struct ViewSubscriptions(pub Vec<CancelToken>);

impl ViewSubscriptions {
    /// Cancel every token still live, returning how many that was
    pub fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        for token in self.0.iter().filter(|token| !token.is_cancelled()) {
            token.cancel();
            cancelled += 1;
        }
        cancelled
    }
}

impl Drop for ViewSubscriptions {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Request to tear down a view and everything it subscribed to
#[derive(Message, Debug, Clone, Copy)]
pub struct TeardownView(pub Entity);

pub fn teardown_views(
    mut requests: MessageReader<TeardownView>,
    views: Query<(&EffectView, Option<&ViewSubscriptions>)>,
    mut subs: ResMut<Subscriptions>,
    mut commands: Commands,
) {
    for TeardownView(view) in requests.read() {
        let (name, held) = match views.get(*view) {
            Ok((effect, held)) => (effect.name, held),
            Err(_) => ("unknown", None),
        };
        // Views that never parked their tokens are released through the registry
        let released = match held {
            Some(held) => held.cancel_all(),
            None => subs.release_view(*view),
        };
        info!("Tore down {} view, released {} subscriptions", name, released);

        if let Ok(mut entity) = commands.get_entity(*view) {
            entity.try_despawn();
        }
    }
}

/// Sweep subscriptions whose tokens were cancelled this frame
pub fn prune_cancelled(mut subs: ResMut<Subscriptions>) {
    let pruned = subs.prune();
    if pruned > 0 {
        debug!("Pruned {} cancelled subscriptions", pruned);
    }
}

pub fn teardown_on_exit(mut exit: MessageReader<AppExit>, mut subs: ResMut<Subscriptions>) {
    if exit.read().last().is_some() {
        let released = subs.release_all();
        debug!("App exiting, released {} subscriptions", released);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_view_cancels_tokens() {
        let mut world = World::new();
        let cursor = world.spawn_empty().id();
        let canvas = world.spawn_empty().id();

        let mut subs = Subscriptions::default();
        let move_token = subs.subscribe(cursor, SubscriptionKind::PointerMove);
        subs.subscribe(cursor, SubscriptionKind::AnimationFrame);
        let frame_token = subs.subscribe(canvas, SubscriptionKind::AnimationFrame);

        assert_eq!(subs.live_count(), 3);
        assert_eq!(subs.release_view(cursor), 2);

        assert!(move_token.is_cancelled());
        assert!(!frame_token.is_cancelled());
        assert!(!subs.is_live(SubscriptionKind::PointerMove));
        assert!(subs.is_live(SubscriptionKind::AnimationFrame));
        assert_eq!(subs.live_count_for(cursor), 0);

        subs.release_view(canvas);
        assert_eq!(subs.live_count(), 0);
    }

    #[test]
    fn test_holder_side_cancel_is_pruned() {
        let mut world = World::new();
        let view = world.spawn_empty().id();

        let mut subs = Subscriptions::default();
        let token = subs.subscribe(view, SubscriptionKind::Scroll);
        assert!(subs.is_live_for(view, SubscriptionKind::Scroll));

        token.cancel();
        assert!(!subs.is_live(SubscriptionKind::Scroll));
        assert_eq!(subs.live_count(), 0);

        subs.prune();
        assert_eq!(subs.release_view(view), 0);
    }

    #[test]
    fn test_teardown_message_despawns_view() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Subscriptions>()
            .add_message::<TeardownView>()
            .add_systems(Update, teardown_views);

        let view = app.world_mut().spawn(EffectView { name: "test" }).id();
        app.world_mut()
            .resource_mut::<Subscriptions>()
            .subscribe(view, SubscriptionKind::Resize);

        app.world_mut().write_message(TeardownView(view));
        app.update();

        assert_eq!(app.world().resource::<Subscriptions>().live_count(), 0);
        assert!(app.world().get_entity(view).is_err());
    }

    fn sweeping_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Subscriptions>()
            .add_message::<TeardownView>()
            .add_systems(Last, (teardown_views, prune_cancelled).chain());
        app
    }

    fn spawn_view(app: &mut App, kinds: &[SubscriptionKind]) -> (Entity, Vec<CancelToken>) {
        let view = app.world_mut().spawn(EffectView { name: "test" }).id();
        let held = app
            .world_mut()
            .resource_mut::<Subscriptions>()
            .subscribe_all(view, kinds);
        let tokens = held.0.clone();
        app.world_mut().entity_mut(view).insert(held);
        (view, tokens)
    }

    #[test]
    fn test_teardown_cancels_held_tokens_then_sweeps() {
        let mut app = sweeping_app();
        let (view, tokens) = spawn_view(
            &mut app,
            &[SubscriptionKind::PointerMove, SubscriptionKind::PointerLeave],
        );
        let (_other, _) = spawn_view(&mut app, &[SubscriptionKind::Scroll]);
        assert_eq!(app.world().resource::<Subscriptions>().len(), 3);

        app.world_mut().write_message(TeardownView(view));
        app.update();

        assert!(tokens.iter().all(CancelToken::is_cancelled));
        let subs = app.world().resource::<Subscriptions>();
        assert_eq!(subs.len(), 1);
        assert!(subs.is_live(SubscriptionKind::Scroll));
        assert!(!subs.is_live(SubscriptionKind::PointerLeave));
    }

    #[test]
    fn test_despawned_view_is_swept_without_teardown() {
        let mut app = sweeping_app();
        let (view, tokens) = spawn_view(&mut app, &[SubscriptionKind::AnimationFrame]);

        app.world_mut().despawn(view);
        assert!(tokens[0].is_cancelled());

        app.update();
        assert_eq!(app.world().resource::<Subscriptions>().len(), 0);
    }
}

use std::time::Duration;

use bevy::prelude::*;

use crate::{
    config::{EffectsConfig, TypewriterConfig},
    effects::lifecycle::{EffectView, SubscriptionKind, Subscriptions, ViewSubscriptions},
    page::RoleText,
};

/// Types a word one character at a time, holds, deletes it, then moves on
#[derive(Debug, Clone, PartialEq)]
pub struct Typewriter {
    words: Vec<String>,
    word: usize,
    /// Characters of the current word shown
    len: usize,
    deleting: bool,
    type_delay: Duration,
    delete_delay: Duration,
    hold: Duration,
}

impl Typewriter {
    /// Empty words are dropped; `None` if nothing is left to type
    pub fn new(config: &TypewriterConfig) -> Option<Self> {
        let words: Vec<String> = config
            .words
            .iter()
            .filter(|w| !w.is_empty())
            .cloned()
            .collect();
        if words.is_empty() {
            return None;
        }

        Some(Self {
            words,
            word: 0,
            len: 0,
            deleting: false,
            type_delay: Duration::from_millis(config.type_ms),
            delete_delay: Duration::from_millis(config.delete_ms),
            hold: Duration::from_millis(config.hold_ms),
        })
    }

    fn word_len(&self) -> usize {
        self.words[self.word].chars().count()
    }

    /// Advance by one character and return the delay before the next step
    pub fn step(&mut self) -> Duration {
        if !self.deleting {
            self.len += 1;
            if self.len >= self.word_len() {
                self.deleting = true;
                return self.hold;
            }
            return self.type_delay;
        }

        self.len = self.len.saturating_sub(1);
        if self.len == 0 {
            self.deleting = false;
            self.word = (self.word + 1) % self.words.len();
            return self.type_delay;
        }
        self.delete_delay
    }

    pub fn text(&self) -> String {
        self.words[self.word].chars().take(self.len).collect()
    }

    #[cfg(test)]
    pub fn word_index(&self) -> usize {
        self.word
    }
}

/// Typewriter state plus the timer for its next step
#[derive(Component, Debug)]
pub struct RoleTypewriter {
    pub typewriter: Typewriter,
    pub timer: Timer,
}

pub fn activate_typewriter(
    mut commands: Commands,
    mut subs: ResMut<Subscriptions>,
    config: Res<EffectsConfig>,
) {
    let Some(typewriter) = Typewriter::new(&config.typewriter) else {
        warn!("Typewriter has no words to type, staying off");
        return;
    };

    let view = commands
        .spawn((
            EffectView { name: "typewriter" },
            RoleTypewriter {
                typewriter,
                // first character goes out on the first tick
                timer: Timer::new(Duration::ZERO, TimerMode::Once),
            },
        ))
        .id();
    let token = subs.subscribe(view, SubscriptionKind::Timer);
    commands.entity(view).insert(ViewSubscriptions(vec![token]));
}

pub fn run_typewriter(
    time: Res<Time>,
    mut typewriters: Query<&mut RoleTypewriter>,
    roles: Query<&Children, With<RoleText>>,
    mut texts: Query<&mut Text2d>,
) {
    for mut role_typewriter in &mut typewriters {
        role_typewriter.timer.tick(time.delta());
        if !role_typewriter.timer.just_finished() {
            continue;
        }

        let next = role_typewriter.typewriter.step();
        role_typewriter.timer.set_duration(next);
        role_typewriter.timer.reset();

        let shown = role_typewriter.typewriter.text();
        for children in &roles {
            for child in children.iter() {
                if let Ok(mut text) = texts.get_mut(child) {
                    text.0.clone_from(&shown);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(words: &[&str]) -> TypewriterConfig {
        TypewriterConfig {
            words: words.iter().map(|w| w.to_string()).collect(),
            ..TypewriterConfig::default()
        }
    }

    #[test]
    fn test_types_holds_deletes_and_wraps() {
        let mut tw = Typewriter::new(&config(&["ab", "xyz"])).unwrap();
        let ms = Duration::from_millis;

        assert_eq!(tw.step(), ms(60));
        assert_eq!(tw.text(), "a");
        assert_eq!(tw.step(), ms(1200));
        assert_eq!(tw.text(), "ab");

        assert_eq!(tw.step(), ms(40));
        assert_eq!(tw.text(), "a");
        assert_eq!(tw.step(), ms(60));
        assert_eq!(tw.text(), "");
        assert_eq!(tw.word_index(), 1);

        for _ in 0..2 {
            tw.step();
        }
        assert_eq!(tw.step(), ms(1200));
        assert_eq!(tw.text(), "xyz");

        for _ in 0..3 {
            tw.step();
        }
        assert_eq!(tw.text(), "");
        assert_eq!(tw.word_index(), 0);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let mut tw = Typewriter::new(&config(&["né"])).unwrap();
        tw.step();
        assert_eq!(tw.text(), "n");
        assert_eq!(tw.step(), Duration::from_millis(1200));
        assert_eq!(tw.text(), "né");
    }

    #[test]
    fn test_empty_words_are_skipped() {
        assert!(Typewriter::new(&config(&[])).is_none());
        assert!(Typewriter::new(&config(&["", ""])).is_none());

        let mut tw = Typewriter::new(&config(&["", "go"])).unwrap();
        tw.step();
        assert_eq!(tw.text(), "g");
    }

    #[test]
    fn test_writes_role_text() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(EffectsConfig::default())
            .init_resource::<Subscriptions>()
            .add_systems(Startup, activate_typewriter)
            .add_systems(Update, run_typewriter);

        let label = app.world_mut().spawn(Text2d::new("")).id();
        app.world_mut().spawn(RoleText).add_child(label);

        app.update();

        let text = app.world().get::<Text2d>(label).unwrap();
        assert_eq!(text.0, "D");
        assert!(
            app.world()
                .resource::<Subscriptions>()
                .is_live(SubscriptionKind::Timer)
        );
    }
}

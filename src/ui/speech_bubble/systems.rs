// src/ui/speech_bubble/systems.rs
//
// Mirrors BubbleManager state onto UI nodes positioned over each speaker.

use bevy::prelude::*;
use bevy::text::Justify;

use crate::chatter::bubble::{render_bubble, Bubble, BubbleLayout, BubbleManager, GlyphEstimate};
use crate::chatter::config::{BubbleSettings, ChatterConfig};
use crate::colony::components::Vitality;
use crate::colony::systems::TILE_SIZE;
use crate::core::SimulationClock;
use crate::world::components::ColonyCamera;

use super::components::{SpeechBubbleNode, SpeechBubbleTracker, SpeechBubbleUiRoot};

/// Height of a colonist's head above its transform origin, in world units.
const HEAD_HEIGHT: f32 = 0.8;

/// Creates the full-screen overlay that bubble nodes are parented to.
pub fn setup_speech_bubble_root(mut commands: Commands) {
    let root = commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            ZIndex(100),
            BackgroundColor(Color::NONE),
            Name::new("Speech bubble root"),
        ))
        .id();

    commands.insert_resource(SpeechBubbleUiRoot(root));
    info!("Speech bubble UI root created");
}

/// Spawns nodes for new bubbles and despawns nodes whose bubble expired.
pub fn sync_bubble_nodes(
    mut commands: Commands,
    manager: Res<BubbleManager>,
    config: Res<ChatterConfig>,
    root: Res<SpeechBubbleUiRoot>,
    mut tracker: ResMut<SpeechBubbleTracker>,
) {
    for node in tracker.take_stale(|id| manager.get(id).is_some()) {
        if let Ok(mut entity) = commands.get_entity(node) {
            entity.despawn();
        }
    }

    let style = config.bubble.style;
    for bubble in manager.bubbles() {
        if tracker.by_bubble.contains_key(&bubble.id()) {
            continue;
        }

        let node = commands
            .spawn((
                Node {
                    position_type: PositionType::Absolute,
                    padding: UiRect::axes(Val::Px(style.padding.x), Val::Px(style.padding.y)),
                    display: Display::None,
                    ..default()
                },
                BackgroundColor(Color::NONE),
                ZIndex(101),
                Text::new(bubble.text()),
                TextFont {
                    font_size: style.font_size,
                    ..default()
                },
                TextLayout::new_with_justify(Justify::Center),
                TextColor(Color::NONE),
                SpeechBubbleNode {
                    bubble: bubble.id(),
                },
            ))
            .id();

        commands.entity(root.0).add_child(node);
        tracker.by_bubble.insert(bubble.id(), node);
    }
}

/// World position the bubble's bottom edge is anchored to.
pub fn head_anchor(speaker: Vec3, vertical_offset_tiles: f32) -> Vec3 {
    speaker + Vec3::Y * (HEAD_HEIGHT + vertical_offset_tiles * TILE_SIZE)
}

/// Layout for `bubble` given where its speaker stands, or `None` when the node
/// should be hidden. The bubble itself stays with the manager until it expires.
fn bubble_layout(
    bubble: &Bubble,
    speaker: Option<(Vec3, &Vitality)>,
    project: impl FnOnce(Vec3) -> Option<Vec2>,
    settings: &BubbleSettings,
    now: f32,
    measure: &GlyphEstimate,
) -> Option<BubbleLayout> {
    let (position, vitality) = speaker?;
    if !vitality.is_live() {
        return None;
    }
    let viewport = project(head_anchor(position, settings.vertical_offset_tiles))?;
    render_bubble(bubble, viewport, now, &settings.style, measure)
}

fn apply_layout(
    layout: &BubbleLayout,
    node: &mut Node,
    background: &mut BackgroundColor,
    text_color: &mut TextColor,
) {
    node.display = Display::Flex;
    node.left = Val::Px(layout.rect.min.x);
    node.top = Val::Px(layout.rect.min.y);
    node.width = Val::Px(layout.rect.width());
    background.0 = layout.background;
    text_color.0 = layout.foreground;
}

/// Projects each speaker into the viewport and lays its bubble out there.
///
/// Nodes are hidden while the speaker is gone, off screen or the bubble is
/// fully transparent.
pub fn position_bubble_nodes(
    clock: Res<SimulationClock>,
    manager: Res<BubbleManager>,
    config: Res<ChatterConfig>,
    camera_query: Query<(&Camera, &GlobalTransform), With<ColonyCamera>>,
    speakers: Query<(&GlobalTransform, &Vitality)>,
    mut nodes: Query<(
        &SpeechBubbleNode,
        &mut Node,
        &mut BackgroundColor,
        &mut TextColor,
    )>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    let now = clock.elapsed_secs();
    let measure = GlyphEstimate::for_font_size(config.bubble.style.font_size);

    for (marker, mut node, mut background, mut text_color) in nodes.iter_mut() {
        let layout = manager.get(marker.bubble).and_then(|bubble| {
            let speaker = speakers
                .get(bubble.speaker())
                .ok()
                .map(|(transform, vitality)| (transform.translation(), vitality));
            bubble_layout(
                bubble,
                speaker,
                |anchor| camera.world_to_viewport(camera_transform, anchor).ok(),
                &config.bubble,
                now,
                &measure,
            )
        });

        match layout {
            Some(layout) => apply_layout(&layout, &mut node, &mut background, &mut text_color),
            None => node.display = Display::None,
        }
    }
}

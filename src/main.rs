use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use rune_animation::types::{AnimatableProperty, AnimatableTransform};
use rune_animation::{
    AnimatableRef, AnimatorError, AnimatorEvent, AnimatorHandle, EasingFunction,
    HandoffBehavior, KeyframeAnimation, PropertyAnimation, RepeatBehavior, Storyboard, Timeline,
    Timing,
};
use rune_config::RuneConfig;

const TARGET: &str = "card";

fn fade_in() -> AnimatableRef {
    Timeline::from(
        PropertyAnimation::new("fade-in", AnimatableProperty::Opacity, 1.0)
            .from(0.0)
            .timing(Timing::with_duration(400.0).easing(EasingFunction::EaseOut)),
    )
    .into_ref()
}

fn dim() -> AnimatableRef {
    Timeline::from(
        PropertyAnimation::new("dim", AnimatableProperty::Opacity, 0.3)
            .timing(Timing::with_duration(200.0)),
    )
    .into_ref()
}

fn pulse() -> AnimatableRef {
    Timeline::from(
        KeyframeAnimation::new("pulse", AnimatableProperty::Width)
            .keyframe(0.0, 200.0)
            .keyframe(0.5, 240.0)
            .keyframe(1.0, 200.0)
            .timing(Timing::with_duration(300.0).repeat(RepeatBehavior::Count { count: 2 })),
    )
    .into_ref()
}

fn highlight() -> AnimatableRef {
    let slide = AnimatableTransform {
        translate_x: 24.0,
        ..AnimatableTransform::default()
    };
    Timeline::from(
        Storyboard::new("highlight")
            .child(
                PropertyAnimation::new(
                    "tint",
                    AnimatableProperty::BackgroundColor,
                    [0.2_f32, 0.5, 1.0, 1.0],
                )
                .from([1.0_f32, 1.0, 1.0, 1.0])
                .timing(Timing::with_duration(250.0).auto_reverse(true)),
            )
            .child(
                PropertyAnimation::new("slide", AnimatableProperty::Transform, slide)
                    .timing(Timing::with_duration(300.0).begin_ms(100.0)),
            )
            .child(
                PropertyAnimation::new("flash", AnimatableProperty::Opacity, 0.6)
                    .timing(Timing::with_duration(150.0)),
            ),
    )
    .into_ref()
}

/// Starts the demo animations from a separate thread, the way input handling
/// would while the frame loop keeps ticking.
fn spawn_control(handle: AnimatorHandle) -> thread::JoinHandle<()> {
    let script: Vec<(u64, &str, AnimatableRef, HandoffBehavior)> = vec![
        (0, "fade-in", fade_in(), HandoffBehavior::Compose),
        (100, "pulse", pulse(), HandoffBehavior::Compose),
        (150, "dim", dim(), HandoffBehavior::TemporaryReplace),
        (300, "highlight", highlight(), HandoffBehavior::SnapshotAndReplace),
        (100, "fade-in again", fade_in(), HandoffBehavior::Compose),
    ];

    thread::spawn(move || {
        for (delay_ms, label, animatable, handoff) in script {
            thread::sleep(Duration::from_millis(delay_ms));
            let id = handle.start(animatable, TARGET, handoff);
            log::info!("control: started {label} as {id} ({handoff})");
        }
    })
}

fn log_event(event: &AnimatorEvent) {
    match event {
        AnimatorEvent::Started { animation_id, name, .. } => {
            log::info!("{animation_id} {name}: started");
        }
        AnimatorEvent::Finished {
            animation_id,
            name,
            committed,
            ..
        } => {
            log::info!(
                "{animation_id} {name}: finished, committed {} value(s)",
                committed.len()
            );
        }
        AnimatorEvent::Replaced {
            animation_id,
            name,
            by,
            ..
        } => {
            log::info!("{animation_id} {name}: replaced by {by}");
        }
        AnimatorEvent::Stopped { animation_id, name, .. } => {
            log::info!("{animation_id} {name}: stopped");
        }
        AnimatorEvent::Failed {
            animation_id,
            name,
            error,
            ..
        } => {
            log::warn!("{animation_id} {name}: failed: {error}");
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = RuneConfig::load();
    if !config.demo.frame_ms.is_finite() || config.demo.frame_ms <= 0.0 {
        anyhow::bail!("demo.frame_ms must be positive, got {}", config.demo.frame_ms);
    }
    let handle = AnimatorHandle::with_config(&config.animation)
        .context("building animator from config")?;
    log::info!(
        "animator ready: default handoff {}, {} frames of {}ms",
        handle.lock().default_handoff(),
        config.demo.frames,
        config.demo.frame_ms
    );

    let control = spawn_control(handle.clone());
    let frame = Duration::from_secs_f32(config.demo.frame_ms / 1000.0);

    for frame_index in 0..config.demo.frames {
        thread::sleep(frame);
        match handle.advance(config.demo.frame_ms) {
            Ok(summary) if !summary.is_idle() => {
                log::debug!(
                    "frame {frame_index}: advanced {}, blocked {}, finished {}",
                    summary.advanced.len(),
                    summary.blocked.len(),
                    summary.finished.len()
                );
            }
            Ok(_) => {}
            Err(AnimatorError::AnimationsFailed { failures }) => {
                for failure in failures {
                    log::warn!(
                        "frame {frame_index}: {} on {} failed: {}",
                        failure.name,
                        failure.target,
                        failure.error
                    );
                }
            }
            Err(err) => return Err(err).context("advancing animations"),
        }

        for event in handle.drain_events() {
            log_event(&event);
        }
        for (key, value) in handle.take_pending_values().into_sorted_vec() {
            log::info!("apply {key} = {value:?}");
        }
    }

    control
        .join()
        .map_err(|_| anyhow::anyhow!("control thread panicked"))?;

    handle.stop_all();
    for event in handle.drain_events() {
        log_event(&event);
    }
    Ok(())
}

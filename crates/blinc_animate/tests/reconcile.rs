//! Reconciliation, batching, delays and lifecycle against a stub integrator

mod common;

use std::time::Duration;

use blinc_animate::{
    AnimatableProperty as P, AnimateConfig, PropertyBag, PropertyValue, StyleDeclaration,
};
use blinc_animation::SpringControl;
use common::{mount_stub, mount_stub_with, style_of, Call, Lifecycle, FRAME};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_new_property_is_created_seeded_and_listened() {
    let (factory, _frames, element) = mount_stub(AnimateConfig::default());
    element.declare(&PropertyBag::new().with(P::TranslateX, 200.0));

    assert_eq!(factory.spring_count(), 1);
    assert_eq!(factory.spring(0).listener_count(), 1);
    assert_eq!(
        factory.calls(),
        vec![
            Call::Create(0),
            Call::SetCurrentValue(0, 200.0),
            Call::SetEndValue(0, 200.0),
        ]
    );
    assert_eq!(factory.config(0), AnimateConfig::default().spring_config());
}

#[test]
fn test_baseline_seeds_from_computed_transform() {
    let style = StyleDeclaration::new().with("transform", "translate(40px, 0px)");
    let (factory, _frames, element) = mount_stub_with(style, AnimateConfig::default());
    element.declare(&PropertyBag::new().with(P::TranslateX, 200.0).with(P::ScaleX, 2.0));

    assert_eq!(
        factory.calls(),
        vec![
            Call::Create(0),
            Call::SetCurrentValue(0, 40.0),
            Call::SetEndValue(0, 200.0),
            Call::Create(1),
            Call::SetCurrentValue(1, 1.0),
            Call::SetEndValue(1, 2.0),
        ]
    );
}

#[test]
fn test_malformed_baseline_decodes_to_identity() {
    let style = StyleDeclaration::new().with("transform", "translate(40px");
    let (factory, _frames, element) = mount_stub_with(style, AnimateConfig::default());
    element.declare(&PropertyBag::new().with(P::ScaleY, 3.0));
    assert_eq!(factory.calls()[1], Call::SetCurrentValue(0, 1.0));
}

#[test]
fn test_handles_persist_and_absent_properties_are_untouched() {
    let (factory, _frames, element) = mount_stub(AnimateConfig::default());
    element.declare(&PropertyBag::new().with(P::Top, 1.0).with(P::Left, 2.0));
    factory.clear_calls();

    element.declare(&PropertyBag::new().with(P::Top, 10.0));
    assert_eq!(factory.calls(), vec![Call::SetEndValue(0, 10.0)]);
    assert_eq!(element.property_count(), 2);
    assert_eq!(factory.spring_count(), 2);
}

#[test]
fn test_idempotent_declarations() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default());
    let bag = PropertyBag::new().with(P::TranslateX, 200.0).with(P::Opacity, 0.5);

    element.declare(&bag);
    frames.advance(FRAME);
    let frames_before = frames.frames_run();
    let style_before = element.element().clone();

    element.declare(&bag);
    element.declare(&bag);
    frames.advance(FRAME);

    assert!(frames.frames_run() - frames_before <= 1);
    assert_eq!(*element.element(), style_before);
    assert_eq!(factory.spring_count(), 2);
}

#[test]
fn test_frame_coalescing_reads_values_at_the_boundary() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default());
    element.declare(&PropertyBag::new().with(P::Width, 0.0).with(P::Height, 0.0));
    frames.advance(FRAME);
    let before = frames.frames_run();

    let (width, height) = (factory.spring(0), factory.spring(1));
    for i in 1..=10 {
        width.step_to(i as f32);
        height.step_to(i as f32 * 2.0);
    }
    assert_eq!(frames.pending_frames(), 1);

    frames.advance(FRAME);
    assert_eq!(frames.frames_run() - before, 1);
    assert_eq!(style_of(&element, "width").as_deref(), Some("10px"));
    assert_eq!(style_of(&element, "height").as_deref(), Some("20px"));

    // the next notification schedules a fresh frame
    width.step_to(11.0);
    frames.advance(FRAME);
    assert_eq!(frames.frames_run() - before, 2);
    assert_eq!(style_of(&element, "width").as_deref(), Some("11px"));
}

#[test]
fn test_snap_applies_target_immediately() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default());
    let lifecycle = Lifecycle::default();
    lifecycle.attach(&element);
    element.declare(&PropertyBag::new().with(P::TranslateX, 0.0));
    factory.clear_calls();

    element.set_config(AnimateConfig::instant());
    element.declare(&PropertyBag::new().with(P::TranslateX, 200.0));

    assert_eq!(
        factory.calls(),
        vec![Call::SetCurrentValue(0, 200.0), Call::SetAtRest(0)]
    );
    let api = element.api();
    assert_eq!(api.current_value(P::TranslateX), Some(PropertyValue::Scalar(200.0)));
    assert!(factory.spring(0).is_at_rest());
    assert_eq!(lifecycle.counts(), (0, 0));

    frames.advance(FRAME);
    assert_eq!(
        style_of(&element, "transform").as_deref(),
        Some("translate(200px, 0px)")
    );
}

#[test]
fn test_delay_defers_end_value() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default().with_delay_ms(20));
    element.declare(&PropertyBag::new().with(P::TranslateX, 200.0));
    assert!(factory.end_values().is_empty());
    assert_eq!(element.pending_delays(), 1);

    frames.advance(ms(10));
    assert!(factory.end_values().is_empty());

    frames.advance(ms(10));
    assert_eq!(factory.end_values(), vec![(0, 200.0)]);
    assert_eq!(element.pending_delays(), 0);
}

#[test]
fn test_teardown_cancels_delayed_end_value() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default().with_delay_ms(20));
    element.declare(&PropertyBag::new().with(P::TranslateX, 200.0));

    frames.advance(ms(10));
    element.unmount();
    assert_eq!(frames.pending_timers(), 0);

    frames.advance(ms(20));
    frames.advance(ms(20));
    assert!(factory.end_values().is_empty());
    assert!(factory.spring(0).is_destroyed());
}

#[test]
fn test_late_timer_after_unmount_is_noop() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default().with_delay_ms(20));
    element.declare(&PropertyBag::new().with(P::Opacity, 1.0));
    drop(element);

    frames.advance(ms(40));
    assert!(factory.end_values().is_empty());
}

#[test]
fn test_last_declared_delay_wins() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default().with_delay_ms(20));
    element.declare(&PropertyBag::new().with(P::Left, 100.0));

    frames.advance(ms(10));
    element.declare(&PropertyBag::new().with(P::Left, 300.0));
    assert_eq!(frames.pending_timers(), 1);

    frames.advance(ms(10));
    assert!(factory.end_values().is_empty());

    frames.advance(ms(10));
    assert_eq!(factory.end_values(), vec![(0, 300.0)]);
}

#[test]
fn test_redeclaring_pending_target_keeps_timer() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default().with_delay_ms(20));
    element.declare(&PropertyBag::new().with(P::Left, 100.0));

    frames.advance(ms(10));
    element.declare(&PropertyBag::new().with(P::Left, 100.0));

    frames.advance(ms(10));
    assert_eq!(factory.end_values(), vec![(0, 100.0)]);
}

#[test]
fn test_snap_cancels_pending_delay() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default().with_delay_ms(20));
    element.declare(&PropertyBag::new().with(P::Left, 100.0));

    frames.advance(ms(10));
    element.set_config(AnimateConfig::instant());
    element.declare(&PropertyBag::new().with(P::Left, 50.0));

    frames.advance(ms(30));
    assert!(factory.end_values().is_empty());
    assert_eq!(
        element.api().current_value(P::Left),
        Some(PropertyValue::Scalar(50.0))
    );
}

#[test]
fn test_grouped_values_are_index_aligned() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default());
    element.declare(&PropertyBag::new().with(P::BackgroundColor, [10.0, 20.0, 30.0]));
    assert_eq!(factory.spring_count(), 3);
    for i in 0..3 {
        assert_eq!(factory.spring(i).listener_count(), 1);
    }

    let api = element.api();
    factory.spring(1).step_to(25.0);
    assert_eq!(
        api.current_value(P::BackgroundColor),
        Some(PropertyValue::rgb(10.0, 25.0, 30.0))
    );

    factory.spring(0).step_to(12.0);
    factory.spring(2).step_to(28.0);
    let value = api.current_value(P::BackgroundColor).unwrap();
    assert_eq!(value.as_slice(), &[12.0, 25.0, 28.0]);

    frames.advance(FRAME);
    assert_eq!(
        style_of(&element, "background-color").as_deref(),
        Some("rgba(12, 25, 28, 1)")
    );
}

#[test]
fn test_grouped_control_fans_out() {
    let (factory, _frames, element) = mount_stub(AnimateConfig::default().with_clamp(true));
    element.declare(&PropertyBag::new().with(P::Color, [0.0, 0.0, 0.0]));
    factory.clear_calls();

    element.declare(&PropertyBag::new().with(P::Color, [255.0, 128.0, 64.0]));
    element.api().set_velocity(P::Color, 3.0);

    assert_eq!(
        factory.calls(),
        vec![
            Call::SetEndValue(0, 255.0),
            Call::SetEndValue(1, 128.0),
            Call::SetEndValue(2, 64.0),
            Call::SetVelocity(0, 3.0),
            Call::SetVelocity(1, 3.0),
            Call::SetVelocity(2, 3.0),
        ]
    );
    for i in 0..3 {
        assert!(factory.spring(i).is_overshoot_clamping_enabled());
    }
}

#[test]
fn test_added_alpha_channel_is_seeded_before_retarget() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default());
    element.declare(&PropertyBag::new().with(P::Color, [10.0, 20.0, 30.0]));
    frames.advance(FRAME);
    factory.clear_calls();

    element.declare(&PropertyBag::new().with(P::Color, [10.0, 20.0, 30.0, 0.5]));
    assert_eq!(
        factory.calls(),
        vec![
            Call::Create(3),
            Call::SetCurrentValue(3, 1.0),
            Call::SetEndValue(0, 10.0),
            Call::SetEndValue(1, 20.0),
            Call::SetEndValue(2, 30.0),
            Call::SetEndValue(3, 0.5),
        ]
    );
    assert_eq!(factory.spring(3).listener_count(), 1);

    frames.advance(FRAME);
    assert_eq!(style_of(&element, "color").as_deref(), Some("rgba(10, 20, 30, 1)"));
}

/// Minimal xorshift so interleavings are reproducible
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

#[test]
fn test_activity_accounting_under_interleaving() {
    const PROPS: [P; 4] = [P::Top, P::Left, P::Width, P::Opacity];

    for seed in 1..=40u64 {
        let (factory, _frames, element) = mount_stub(AnimateConfig::default());
        let lifecycle = Lifecycle::default();
        lifecycle.attach(&element);

        let mut bag = PropertyBag::new();
        for p in PROPS {
            bag.insert(p, 0.0).unwrap();
        }
        element.declare(&bag);

        // each spring activates then rests, two rounds, in random order
        let mut remaining: Vec<(usize, u8)> = (0..PROPS.len()).map(|i| (i, 4)).collect();
        let mut moving = 0u32;
        let (mut want_starts, mut want_ends) = (0u32, 0u32);
        let mut rng = Rng(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15));

        while !remaining.is_empty() {
            let pick = (rng.next() % remaining.len() as u64) as usize;
            let (spring, left) = remaining[pick];
            let spring = factory.spring(spring);
            if left % 2 == 0 {
                spring.fire_activate();
                moving += 1;
                want_starts += (moving == 1) as u32;
            } else {
                spring.fire_at_rest();
                moving -= 1;
                want_ends += (moving == 0) as u32;
            }
            if left == 1 {
                remaining.remove(pick);
            } else {
                remaining[pick].1 -= 1;
            }
            assert_eq!(element.is_animating(), moving > 0);
        }

        assert_eq!(lifecycle.counts(), (want_starts, want_ends), "seed {seed}");
        assert!(want_starts >= 1);
    }
}

#[test]
fn test_redundant_rest_does_not_underflow() {
    let (factory, _frames, element) = mount_stub(AnimateConfig::default());
    let lifecycle = Lifecycle::default();
    lifecycle.attach(&element);
    element.declare(&PropertyBag::new().with(P::Top, 0.0).with(P::Left, 0.0));

    factory.spring(0).fire_at_rest();
    factory.spring(1).fire_at_rest();
    assert_eq!(lifecycle.counts(), (0, 0));

    factory.spring(0).fire_activate();
    assert!(element.is_animating());
    factory.spring(0).fire_at_rest();
    assert_eq!(lifecycle.counts(), (1, 1));
}

#[test]
fn test_imperative_calls_on_undeclared_property() {
    let (factory, _frames, element) = mount_stub(AnimateConfig::default());
    let api = element.api();

    assert_eq!(api.current_value(P::RotateZ), None);
    assert!(!api.set_current_value(P::RotateZ, 10.0));
    assert!(!api.set_velocity(P::RotateZ, 10.0));
    assert_eq!(factory.spring_count(), 0);
    assert!(!element.has_property(P::RotateZ));
}

#[test]
fn test_imperative_calls_bypass_reconciliation() {
    let (factory, _frames, element) =
        mount_stub(AnimateConfig::instant().with_delay_ms(50));
    element.declare(&PropertyBag::new().with(P::TranslateY, 0.0));
    factory.clear_calls();

    let api = element.api();
    assert!(api.set_current_value(P::TranslateY, 80.0));
    assert!(api.set_velocity(P::TranslateY, -400.0));
    assert_eq!(
        factory.calls(),
        vec![Call::SetCurrentValue(0, 80.0), Call::SetVelocity(0, -400.0)]
    );
    assert_eq!(api.velocity(P::TranslateY), Some(PropertyValue::Scalar(-400.0)));
    assert_eq!(element.pending_delays(), 0);
}

#[test]
fn test_unmount_rests_and_destroys_every_handle() {
    let (factory, frames, element) = mount_stub(AnimateConfig::default());
    let lifecycle = Lifecycle::default();
    lifecycle.attach(&element);
    element.declare(&PropertyBag::new().with(P::Top, 0.0).with(P::Color, [1.0, 2.0, 3.0]));
    factory.spring(0).fire_activate();
    factory.clear_calls();

    element.unmount();
    let calls = factory.calls();
    for i in 0..4 {
        let rest = calls.iter().position(|c| *c == Call::SetAtRest(i));
        let destroy = calls.iter().position(|c| *c == Call::Destroy(i));
        assert!(rest.is_some() && destroy.is_some() && rest < destroy, "spring {i}");
    }

    // notifications after teardown reach nobody
    factory.spring(0).fire_at_rest();
    frames.advance(FRAME);
    assert_eq!(lifecycle.counts(), (1, 0));
    assert!(!element.is_animating());
    assert_eq!(element.api().current_value(P::Top), None);
}

#[test]
fn test_declarations_from_json() {
    let (factory, _frames, element) = mount_stub(AnimateConfig::default());
    let bag: PropertyBag =
        serde_json::from_str(r#"{"translateX": 12, "zIndex": 3, "borderColor": [1, 2, 3, 0.5]}"#)
            .unwrap();
    element.declare(&bag);

    assert_eq!(element.property_count(), 2);
    assert!(element.has_property(P::BorderColor));
    assert_eq!(factory.spring_count(), 5);
}

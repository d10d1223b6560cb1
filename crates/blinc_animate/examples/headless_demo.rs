//! Headless Animation Demo
//!
//! Animates a card in memory and prints its style every few frames:
//! - slides and scales in with the standard spring
//! - fades its background to a new color
//! - gets flung sideways and springs back
//!
//! Run with: cargo run -p blinc_animate --example headless_demo
//! Set RUST_LOG=blinc_animate=trace to see every style write.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use blinc_animate::{
    AnimatableProperty as P, AnimateConfig, AnimatedElement, FrameLoop, PropertyBag,
    StyleDeclaration,
};

const FRAME: Duration = Duration::from_millis(16);

fn print_style(label: &str, frames: &FrameLoop, element: &AnimatedElement<StyleDeclaration>) {
    let style = element.element();
    let entries: Vec<String> = style.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    println!("[{:>5}ms] {label:<8} {}", frames.now().as_millis(), entries.join("; "));
}

fn run(label: &str, frames: &FrameLoop, element: &AnimatedElement<StyleDeclaration>) {
    let mut frame = 0;
    while !frames.is_idle() && frame < 600 {
        frames.advance(FRAME);
        if frame % 6 == 0 {
            print_style(label, frames, element);
        }
        frame += 1;
    }
    print_style(label, frames, element);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let frames = Rc::new(FrameLoop::new());
    let card = StyleDeclaration::new()
        .with("transform", "translate(-80px, 0px) scale(0.8, 0.8)")
        .with("opacity", "0")
        .with("background-color", "#1e293b");

    let config: AnimateConfig = serde_json::from_str(r#"{"tension": 180, "friction": 12}"#)
        .unwrap_or_else(|_| AnimateConfig::default());
    let element = AnimatedElement::mount(card, Rc::new(frames.factory()), frames.clone(), config);

    let moving = Rc::new(Cell::new(false));
    let m = Rc::clone(&moving);
    element.on_start(move || m.set(true));
    let m = Rc::clone(&moving);
    element.on_end(move || m.set(false));

    // Enter
    element.declare(
        &PropertyBag::new()
            .with(P::TranslateX, 0.0)
            .with(P::ScaleX, 1.0)
            .with(P::ScaleY, 1.0)
            .with(P::Opacity, 1.0),
    );
    run("enter", &frames, &element);

    // Recolor
    element.declare(&PropertyBag::new().with(P::BackgroundColor, [59.0, 130.0, 246.0]));
    run("recolor", &frames, &element);

    // Fling: jump to where the pointer let go, then release with momentum
    let api = element.api();
    api.set_current_value(P::TranslateX, 60.0);
    element.declare(&PropertyBag::new().with(P::TranslateX, 0.0));
    api.set_velocity(P::TranslateX, 900.0);
    run("fling", &frames, &element);

    println!("still moving: {}", moving.get());
    element.unmount();
}

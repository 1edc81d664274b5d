/// Print the configuration the animator would run with.
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    let config = rune_config::RuneConfig::load();

    println!("=== Rune Animator Configuration ===\n");

    println!("Animation Settings:");
    println!("  Default Handoff: {}", config.animation.default_handoff);
    println!("  Strict Invariants: {}", config.animation.strict_invariants);
    println!("  Max Queued Events: {:?}", config.animation.max_queued_events);
    println!("  Trace Ticks: {}", config.animation.trace_ticks);
    println!();

    println!("Demo Settings:");
    println!("  Frame: {}ms", config.demo.frame_ms);
    println!("  Frames: {}", config.demo.frames);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}

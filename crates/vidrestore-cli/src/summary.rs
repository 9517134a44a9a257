use std::path::Path;

use console::Style;
use vidrestore_core::pipeline::config::{Intensity, TaskConfig};
use vidrestore_core::quality::{QualityMetrics, Recommendations};
use vidrestore_core::restore::scheduler::build_plan;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();
}

fn print_group(s: &Styles, name: &str, enabled: bool, intensity: Intensity, items: &[(&str, bool)]) {
    if !enabled {
        println!("  {:<14}{}", s.header.apply_to(name), s.disabled.apply_to("disabled"));
        return;
    }
    println!("  {:<14}{}", s.header.apply_to(name), s.method.apply_to(intensity));
    let on: Vec<&str> = items.iter().filter(|(_, v)| *v).map(|(k, _)| *k).collect();
    if on.is_empty() {
        println!("    {}", s.disabled.apply_to("nothing selected"));
    } else {
        println!("    {}", s.value.apply_to(on.join(", ")));
    }
}

pub fn print_task_summary(config: &TaskConfig) {
    let s = Styles::new();
    let stages = &config.stages;
    print_title(&s, "Video Restoration");

    println!("  {:<14}{}", s.label.apply_to("Input"), s.path.apply_to(config.input.display()));
    println!("  {:<14}{}", s.label.apply_to("Output"), s.path.apply_to(config.output.display()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Smart mode"),
        s.value.apply_to(if stages.smart_mode { "on" } else { "off" })
    );
    match config.seed {
        Some(seed) => println!("  {:<14}{}", s.label.apply_to("Seed"), s.value.apply_to(seed)),
        None => println!("  {:<14}{}", s.label.apply_to("Seed"), s.disabled.apply_to("random")),
    }
    println!();

    let r = &stages.restoration;
    if r.enabled {
        println!("  {:<14}{}", s.header.apply_to("Restoration"), s.method.apply_to(r.intensity));
        for (i, step) in build_plan(r, stages.filters.sharpen).iter().enumerate() {
            println!("    {}. {}", s.label.apply_to(i + 1), s.value.apply_to(step));
        }
    } else {
        println!("  {:<14}{}", s.header.apply_to("Restoration"), s.disabled.apply_to("disabled"));
    }

    let b = &stages.basic;
    print_group(
        &s,
        "Basic",
        b.enabled,
        b.intensity,
        &[
            ("brightness", b.brightness),
            ("contrast", b.contrast),
            ("saturation", b.saturation),
            ("temperature", b.temperature),
            ("highlight", b.highlight),
        ],
    );

    let a = &stages.advanced;
    print_group(
        &s,
        "Advanced",
        a.enabled,
        a.intensity,
        &[
            ("white balance", a.auto_white_balance),
            ("levels", a.auto_levels),
            ("shadows", a.shadow_lift),
            ("highlights", a.highlight_recovery),
            ("denoise", a.denoise),
            ("dehaze", a.dehaze),
        ],
    );

    let f = &stages.filters;
    print_group(
        &s,
        "Filters",
        f.any(),
        f.intensity,
        &[
            ("sharpen", f.sharpen),
            ("landscape", f.landscape),
            ("vintage", f.vintage),
            ("cinematic", f.cinematic),
            ("anime", f.anime),
            ("grain", f.grain),
        ],
    );
    println!();
}

pub fn print_quality_report(
    file: &Path,
    frame: usize,
    metrics: &QualityMetrics,
    recommendations: &Recommendations,
) {
    let s = Styles::new();
    print_title(&s, "Quality Analysis");

    println!("  {:<14}{}", s.label.apply_to("File"), s.path.apply_to(file.display()));
    println!("  {:<14}{}", s.label.apply_to("Frame"), s.value.apply_to(frame));
    println!();

    println!("  {}", s.header.apply_to("Metrics"));
    let rows = [
        ("Brightness", metrics.brightness),
        ("Contrast", metrics.contrast),
        ("Saturation", metrics.saturation),
        ("Sharpness", metrics.sharpness),
        ("Noise", metrics.noise),
        ("Color temp", metrics.color_temp),
        ("Highlights", metrics.highlight_ratio),
        ("Shadows", metrics.shadow_ratio),
        ("Blocking", metrics.block_artifact),
        ("Aliasing", metrics.aliasing),
    ];
    for (label, value) in rows {
        println!("    {:<14}{}", s.label.apply_to(label), s.value.apply_to(format!("{value:.3}")));
    }
    println!();

    println!("  {}", s.header.apply_to("Recommendations"));
    for (adjustment, rec) in recommendations.iter() {
        let verdict = if rec.needed {
            s.method.apply_to("apply")
        } else if rec.skip {
            s.disabled.apply_to("skip")
        } else {
            s.label.apply_to("optional")
        };
        println!(
            "    {:<20}{:<10}{}",
            s.label.apply_to(adjustment),
            verdict,
            rec.reason
        );
    }
    println!();
}
